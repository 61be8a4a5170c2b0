pub mod macro_table;

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::Options;
use crate::diagnostics::{DiagnosticSink, TranslateError};
use crate::expr;
use crate::lexer::{NumericSuffix, OpFlags, Opcode, PrimitiveValue, Token, TokenKind, Tokenizer};
use crate::origin::Origin;
use macro_table::{Macro, MacroTable};

/// The four independent bits tracked per entry on the conditional-inclusion status stack
/// (`reading`/`ignoring` are mutually exclusive, so they're folded into the single `reading`
/// field here; `ignoring` is simply `!reading`).
#[derive(Debug, Clone, Copy)]
struct StatusFrame {
	reading: bool,
	found_if: bool,
	found_else: bool,
	finished_if: bool,
}

impl StatusFrame {
	const fn implicit_outer() -> Self {
		Self { reading: true, found_if: false, found_else: false, finished_if: true }
	}
}

/// A token tagged with the set of macro names that must not be re-expanded while rescanning it —
/// the standard "hide set" technique (Prosser's algorithm), which ensures a macro currently being
/// expanded is not expanded recursively on its own name, without tracking global expansion depth,
/// which breaks as soon as two independent macro calls are rescanned back to back.
#[derive(Debug, Clone)]
struct HiddenToken {
	token: Token,
	hide_set: Rc<HashSet<String>>,
}

fn empty_hide_set() -> Rc<HashSet<String>> {
	thread_local! {
		static EMPTY: Rc<HashSet<String>> = Rc::new(HashSet::new());
	}
	EMPTY.with(Rc::clone)
}

/// Sits between the tokenizer and the parser as a token-to-token transducer. Owns the
/// tokenizer it pulls from, the macro tables, the conditional-inclusion status stack, and the
/// include dependency list.
pub struct Preprocessor<'sink> {
	tokenizer: Tokenizer,
	macros: MacroTable,
	status_stack: Vec<StatusFrame>,
	/// Tokens pulled from the tokenizer (or pushed back after a macro expansion) but not yet
	/// fully processed into `output`.
	raw: VecDeque<HiddenToken>,
	/// Fully processed tokens ready to hand to the caller.
	output: VecDeque<Token>,
	at_line_start: bool,
	counter: u64,
	options: Options,
	sink: &'sink mut dyn DiagnosticSink,
	included_files: Vec<PathBuf>,
	session_timestamp: (String, String),
}

impl<'sink> Preprocessor<'sink> {
	pub fn new(tokenizer: Tokenizer, options: Options, sink: &'sink mut dyn DiagnosticSink) -> Self {
		Self {
			tokenizer,
			macros: MacroTable::new(),
			status_stack: vec![StatusFrame::implicit_outer()],
			raw: VecDeque::new(),
			output: VecDeque::new(),
			at_line_start: true,
			counter: 0,
			options,
			sink,
			included_files: Vec::new(),
			session_timestamp: session_timestamp(),
		}
	}

	#[must_use]
	pub fn included_files(&self) -> &[PathBuf] {
		&self.included_files
	}

	fn status(&self) -> StatusFrame {
		*self.status_stack.last().expect("the implicit outer frame is never popped")
	}

	fn status_mut(&mut self) -> &mut StatusFrame {
		self.status_stack.last_mut().expect("the implicit outer frame is never popped")
	}

	fn pull_one_raw(&mut self) -> anyhow::Result<Option<HiddenToken>> {
		if let Some(token) = self.raw.pop_front() {
			return Ok(Some(token));
		}
		Ok(self.tokenizer.next_token()?.map(|token| HiddenToken { token, hide_set: empty_hide_set() }))
	}

	fn push_front(&mut self, tokens: Vec<HiddenToken>) {
		for token in tokens.into_iter().rev() {
			self.raw.push_front(token);
		}
	}

	/// Peeks past any `Newline` tokens for the next significant token, without consuming it.
	/// Function-like macro invocations may have their argument list continue onto later physical
	/// lines, so the next non-whitespace token may sit past an intervening newline.
	fn peek_skip_newlines(&mut self) -> anyhow::Result<Option<Token>> {
		let mut skipped = Vec::new();
		let result = loop {
			match self.pull_one_raw()? {
				None => break None,
				Some(hidden) if matches!(hidden.token.kind, TokenKind::Newline) => skipped.push(hidden),
				Some(hidden) => {
					let token = hidden.token.clone();
					skipped.push(hidden);
					break Some(token);
				},
			}
		};
		self.push_front(skipped);
		Ok(result)
	}

	fn consume_skip_newlines(&mut self) -> anyhow::Result<Option<HiddenToken>> {
		loop {
			match self.pull_one_raw()? {
				None => return Ok(None),
				Some(hidden) if matches!(hidden.token.kind, TokenKind::Newline) => continue,
				Some(hidden) => return Ok(Some(hidden)),
			}
		}
	}

	/// Drives `output` until it has at least one token or the underlying source is exhausted.
	fn fill(&mut self) -> anyhow::Result<()> {
		while self.output.is_empty() {
			let Some(hidden) = self.pull_one_raw()? else { return Ok(()) };
			let HiddenToken { token, hide_set } = hidden;

			match &token.kind {
				TokenKind::Newline => {
					self.at_line_start = true;
				},
				TokenKind::Operator(Opcode::Hash) if self.at_line_start => {
					self.handle_directive(token.origin)?;
					self.at_line_start = true;
				},
				_ if !self.status().reading => {
					self.at_line_start = false;
				},
				TokenKind::Identifier(name) if self.options.expand_macros && !hide_set.contains(name) => {
					self.at_line_start = false;
					let name = name.clone();
					if let Some(expanded) = self.try_expand(&name, &token.origin, &hide_set)? {
						self.push_front(expanded);
					} else {
						self.output.push_back(token);
					}
				},
				_ => {
					self.at_line_start = false;
					self.output.push_back(token);
				},
			}
		}
		Ok(())
	}

	/// Attempts to expand an identifier token as a macro invocation. Returns `None` (the token
	/// should be emitted as a plain identifier) if it's not a macro name, or is a function-like
	/// macro name not followed by `(`.
	fn try_expand(&mut self, name: &str, origin: &Origin, invoking_hide_set: &Rc<HashSet<String>>) -> anyhow::Result<Option<Vec<HiddenToken>>> {
		if let Some(token) = self.expand_builtin(name, origin) {
			return Ok(Some(vec![HiddenToken { token, hide_set: invoking_hide_set.clone() }]));
		}

		let Some(definition) = self.macros.lookup(name).cloned() else { return Ok(None) };

		let mut new_hide_set = (**invoking_hide_set).clone();
		new_hide_set.insert(name.to_owned());
		let new_hide_set = Rc::new(new_hide_set);

		let body = if definition.is_function_like {
			let Some(next) = self.peek_skip_newlines()? else { return Ok(None) };
			if next.opcode() != Some(Opcode::LParen) {
				return Ok(None);
			}
			self.consume_skip_newlines()?;
			let args = self.collect_macro_args()?;
			substitute_function_like(&definition, &args)
		} else {
			definition.body.clone()
		};

		let pasted = apply_token_paste(body);
		Ok(Some(pasted.into_iter().map(|token| HiddenToken { token, hide_set: new_hide_set.clone() }).collect()))
	}

	fn expand_builtin(&mut self, name: &str, origin: &Origin) -> Option<Token> {
		match name {
			"__FILE__" => Some(Token::new(TokenKind::Str { encoding: String::new(), lexeme: format!("\"{}\"", origin.file) }, origin.clone())),
			"__LINE__" => Some(Token::new(TokenKind::Primitive(PrimitiveValue::Int { text: origin.line.to_string(), value: origin.line as i64, suffix: NumericSuffix::None }), origin.clone())),
			"__DATE__" => Some(Token::new(TokenKind::Str { encoding: String::new(), lexeme: format!("\"{}\"", self.session_timestamp.0) }, origin.clone())),
			"__TIME__" => Some(Token::new(TokenKind::Str { encoding: String::new(), lexeme: format!("\"{}\"", self.session_timestamp.1) }, origin.clone())),
			"__COUNTER__" => {
				let value = self.counter;
				self.counter += 1;
				Some(Token::new(TokenKind::Primitive(PrimitiveValue::Int { text: value.to_string(), value: value as i64, suffix: NumericSuffix::None }), origin.clone()))
			},
			_ => None,
		}
	}

	/// Collects a function-like macro invocation's comma-separated argument token runs, having
	/// already consumed the opening `(`. Respects nested `()`/`[]`/`{}` so a comma inside a
	/// nested call doesn't split an argument.
	fn collect_macro_args(&mut self) -> anyhow::Result<Vec<Vec<Token>>> {
		let mut args = vec![Vec::new()];
		let mut depth = 0i32;
		loop {
			let Some(hidden) = self.pull_one_raw()? else {
				anyhow::bail!(TranslateError::UnbalancedPair { origin: Origin::synthetic(self.tokenizer.current_file()), open: "(", close: ")" });
			};
			let token = hidden.token;
			match token.opcode() {
				Some(Opcode::LParen | Opcode::LBracket | Opcode::LBrace) => {
					depth += 1;
					args.last_mut().expect("always at least one argument slot").push(token);
				},
				Some(Opcode::RParen) if depth == 0 => break,
				Some(Opcode::RParen | Opcode::RBracket | Opcode::RBrace) => {
					depth -= 1;
					args.last_mut().expect("always at least one argument slot").push(token);
				},
				Some(Opcode::Comma) if depth == 0 => args.push(Vec::new()),
				_ if matches!(token.kind, TokenKind::Newline) => {},
				_ => args.last_mut().expect("always at least one argument slot").push(token),
			}
		}
		if args.len() == 1 && args[0].is_empty() {
			return Ok(Vec::new());
		}
		Ok(args)
	}

	/// Parses tokens from the start of the current logical line to the next `Newline`/EOF and
	/// dispatches on the directive name. While `ignoring`, only the directives that can affect
	/// conditional-inclusion state (`if/ifdef/ifndef/elif/else/endif`) have any effect; everything
	/// else is silently skipped.
	fn handle_directive(&mut self, hash_origin: Origin) -> anyhow::Result<()> {
		let mut line = Vec::new();
		loop {
			match self.pull_one_raw()? {
				None => break,
				Some(hidden) if matches!(hidden.token.kind, TokenKind::Newline) => break,
				Some(hidden) => line.push(hidden.token),
			}
		}

		let Some(first) = line.first() else { return Ok(()) };
		let Some(directive) = first.identifier_name().map(str::to_owned) else {
			self.sink.warning(hash_origin, "stray '#' with no directive name");
			return Ok(());
		};
		let rest = &line[1..];
		let reading = self.status().reading;

		match directive.as_str() {
			"if" if reading => self.push_conditional(self.evaluate_condition(rest)?),
			"if" => self.push_conditional(false),
			"ifdef" if reading => {
				let defined = rest.first().and_then(Token::identifier_name).is_some_and(|name| self.macros.is_defined(name));
				self.push_conditional(defined);
			},
			"ifdef" => self.push_conditional(false),
			"ifndef" if reading => {
				let defined = rest.first().and_then(Token::identifier_name).is_some_and(|name| self.macros.is_defined(name));
				self.push_conditional(!defined);
			},
			"ifndef" => self.push_conditional(false),
			"elif" => self.handle_elif(rest, &hash_origin)?,
			"else" => self.handle_else(&hash_origin),
			"endif" => self.handle_endif(&hash_origin),
			_ if !reading => {}, // every other directive is inert while ignoring
			"define" => self.handle_define(rest, &hash_origin),
			"undef" => {
				if let Some(name) = rest.first().and_then(Token::identifier_name) {
					self.macros.undef(name);
				}
			},
			"include" => self.handle_include(rest, &hash_origin)?,
			"pragma" => {
				let body = rest.iter().map(Token::lexeme).collect::<Vec<_>>().join(" ");
				self.output.push_back(Token::new(TokenKind::Pragma(body), hash_origin));
			},
			"line" => self.handle_line(rest),
			"error" => {
				let message = rest.iter().map(Token::lexeme).collect::<Vec<_>>().join(" ");
				self.sink.error(hash_origin, message);
			},
			"warning" => {
				let message = rest.iter().map(Token::lexeme).collect::<Vec<_>>().join(" ");
				self.sink.warning(hash_origin, message);
			},
			other => {
				self.sink.warning(hash_origin, format!("unrecognized directive #{other}"));
			},
		}
		Ok(())
	}

	fn push_conditional(&mut self, condition_true: bool) {
		let parent_reading = self.status().reading;
		self.status_stack.push(StatusFrame { reading: parent_reading && condition_true, found_if: true, found_else: false, finished_if: parent_reading && condition_true });
	}

	fn handle_elif(&mut self, rest: &[Token], origin: &Origin) -> anyhow::Result<()> {
		let Some(frame) = self.status_stack.last().copied() else { return Ok(()) };
		if frame.found_else {
			self.sink.error(origin.clone(), "#elif after #else");
			return Ok(());
		}
		let parent_reading = self.status_stack.get(self.status_stack.len().wrapping_sub(2)).is_none_or(|frame| frame.reading);
		let should_take = !frame.finished_if && parent_reading && self.evaluate_condition(rest)?;
		*self.status_mut() = StatusFrame { reading: should_take, found_if: true, found_else: false, finished_if: frame.finished_if || should_take };
		Ok(())
	}

	fn handle_else(&mut self, origin: &Origin) {
		let Some(frame) = self.status_stack.last().copied() else { return };
		if frame.found_else {
			self.sink.error(origin.clone(), "duplicate #else");
			return;
		}
		let parent_reading = self.status_stack.get(self.status_stack.len().wrapping_sub(2)).is_none_or(|frame| frame.reading);
		let should_take = !frame.finished_if && parent_reading;
		*self.status_mut() = StatusFrame { reading: should_take, found_if: frame.found_if, found_else: true, finished_if: true };
	}

	fn handle_endif(&mut self, origin: &Origin) {
		if self.status_stack.len() <= 1 {
			self.sink.error(origin.clone(), "#endif without matching #if");
			return;
		}
		self.status_stack.pop();
	}

	fn handle_define(&mut self, rest: &[Token], origin: &Origin) {
		let Some(name_token) = rest.first() else {
			self.sink.error(origin.clone(), "#define missing a macro name");
			return;
		};
		let Some(name) = name_token.identifier_name().map(str::to_owned) else {
			self.sink.error(origin.clone(), "#define macro name must be an identifier");
			return;
		};

		let is_function_like = rest.get(1).and_then(Token::opcode) == Some(Opcode::LParen) && name_token.origin.byte_end == rest[1].origin.byte_start;
		let (parameters, is_variadic, body_start) = if is_function_like {
			let mut parameters = Vec::new();
			let mut is_variadic = false;
			let mut index = 2;
			while let Some(token) = rest.get(index) {
				match token.opcode() {
					Some(Opcode::RParen) => {
						index += 1;
						break;
					},
					Some(Opcode::Comma) => index += 1,
					_ => {
						if token.lexeme() == "..." {
							is_variadic = true;
						} else if let Some(parameter) = token.identifier_name() {
							parameters.push(parameter.to_owned());
						}
						index += 1;
					},
				}
			}
			(parameters, is_variadic, index)
		} else {
			(Vec::new(), false, 1)
		};

		let body = rest.get(body_start..).unwrap_or_default().to_vec();
		let definition = Macro { name: name.clone(), is_function_like, parameters, is_variadic, body, is_builtin: false };

		if let Some(previous) = self.macros.peek(&name) {
			if previous.body != definition.body && self.options.strict_macro_redefinition {
				self.sink.warning(origin.clone(), format!("macro {name:?} redefined with a different body"));
			}
		}
		self.macros.define(definition);
	}

	fn handle_include(&mut self, rest: &[Token], origin: &Origin) -> anyhow::Result<()> {
		let (header, is_system) = if let Some(first) = rest.first() {
			if let TokenKind::Str { lexeme, .. } = &first.kind {
				(lexeme.trim_matches('"').to_owned(), false)
			} else if first.opcode() == Some(Opcode::Lt) {
				let path: String = rest[1..].iter().take_while(|token| token.opcode() != Some(Opcode::Gt)).map(Token::lexeme).collect();
				(path, true)
			} else {
				self.sink.error(origin.clone(), "#include expects \"file\" or <file>");
				return Ok(());
			}
		} else {
			self.sink.error(origin.clone(), "#include missing a header name");
			return Ok(());
		};

		if rest.len() > 2 && is_system {
			self.sink.warning(origin.clone(), "extra tokens after #include header name");
		}

		let Some(path) = self.tokenizer.resolve_include(&header, is_system) else {
			return Err(TranslateError::IncludeNotFound { origin: origin.clone(), header }.into());
		};
		self.included_files.push(path.clone());
		if self.options.inline_includes {
			self.tokenizer.push_source(&path)?;
		}
		Ok(())
	}

	fn handle_line(&mut self, rest: &[Token]) {
		let Some(line_token) = rest.first() else { return };
		let TokenKind::Primitive(PrimitiveValue::Int { value, .. }) = &line_token.kind else { return };
		let file = rest.get(1).and_then(|token| match &token.kind {
			TokenKind::Str { lexeme, .. } => Some(lexeme.trim_matches('"').to_owned()),
			_ => None,
		});
		self.tokenizer.set_line_origin(*value as usize, file);
	}

	/// Evaluates a `#if`/`#elif` condition: pre-expands macros (honoring `defined(X)` specially,
	/// which must *not* expand `X`) and hands the result to the expression parser for a constant
	/// fold — this is the only caller that requires the fold to actually succeed.
	fn evaluate_condition(&mut self, tokens: &[Token]) -> anyhow::Result<bool> {
		let expanded = self.expand_condition_tokens(tokens)?;
		if expanded.is_empty() {
			return Ok(false);
		}
		let ast = expr::parse_tokens(&expanded)?;
		let value = ast.evaluate().ok_or_else(|| anyhow::anyhow!("#if/#elif condition is not a compile-time-evaluable expression"))?;
		Ok(value != 0.0)
	}

	fn expand_condition_tokens(&mut self, tokens: &[Token]) -> anyhow::Result<Vec<Token>> {
		let mut result = Vec::new();
		let mut index = 0;
		while index < tokens.len() {
			let token = &tokens[index];
			if token.identifier_name() == Some("defined") {
				let (name, consumed) = if tokens.get(index + 1).and_then(Token::opcode) == Some(Opcode::LParen) {
					let name = tokens.get(index + 2).and_then(Token::identifier_name).unwrap_or_default().to_owned();
					(name, 4)
				} else {
					(tokens.get(index + 1).and_then(Token::identifier_name).unwrap_or_default().to_owned(), 2)
				};
				let value = i64::from(self.macros.is_defined(&name));
				result.push(Token::new(TokenKind::Primitive(PrimitiveValue::Int { text: value.to_string(), value, suffix: NumericSuffix::None }), token.origin.clone()));
				index += consumed;
				continue;
			}
			if token.identifier_name() == Some("__has_include") {
				let mut scan = index + 2;
				let mut header = String::new();
				let mut is_system = false;
				if tokens.get(index + 2).and_then(Token::opcode) == Some(Opcode::Lt) {
					is_system = true;
					scan = index + 3;
					while tokens.get(scan).and_then(Token::opcode) != Some(Opcode::Gt) && scan < tokens.len() {
						header.push_str(&tokens[scan].lexeme());
						scan += 1;
					}
					scan += 1;
				} else if let Some(TokenKind::Str { lexeme, .. }) = tokens.get(index + 2).map(|token| &token.kind) {
					header = lexeme.trim_matches('"').to_owned();
					scan += 1;
				}
				scan += 1; // closing ')'
				let found = i64::from(self.tokenizer.resolve_include(&header, is_system).is_some());
				result.push(Token::new(TokenKind::Primitive(PrimitiveValue::Int { text: found.to_string(), value: found, suffix: NumericSuffix::None }), token.origin.clone()));
				index = scan;
				continue;
			}
			if let Some(name) = token.identifier_name() {
				if self.options.expand_macros && self.macros.is_defined(name) {
					if let Some(expanded) = self.try_expand(name, &token.origin, &empty_hide_set())? {
						let mut extra = expanded.into_iter().map(|hidden| hidden.token).collect::<Vec<_>>();
						result.append(&mut extra);
						index += 1;
						continue;
					}
				}
			}
			result.push(token.clone());
			index += 1;
		}
		Ok(result)
	}
}

impl Iterator for Preprocessor<'_> {
	type Item = anyhow::Result<Token>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Err(error) = self.fill() {
			return Some(Err(error));
		}
		self.output.pop_front().map(Ok)
	}
}

/// Substitutes a function-like macro's parameters with its call-site arguments, applying `#`
/// (stringize) ahead of substitution. `##` (paste) is applied afterward by [`apply_token_paste`]
/// over the fully substituted body, matching the usual two-pass description of replacement.
fn substitute_function_like(definition: &Macro, args: &[Vec<Token>]) -> Vec<Token> {
	let mut output = Vec::new();
	let mut index = 0;
	while index < definition.body.len() {
		let token = &definition.body[index];
		if token.opcode() == Some(Opcode::Hash) {
			if let Some(parameter_index) = definition.body.get(index + 1).and_then(Token::identifier_name).and_then(|name| definition.parameters.iter().position(|parameter| parameter == name)) {
				let text = args.get(parameter_index).map(|tokens| tokens.iter().map(Token::lexeme).collect::<Vec<_>>().join(" ")).unwrap_or_default();
				output.push(Token::new(TokenKind::Str { encoding: String::new(), lexeme: format!("\"{}\"", text.replace('"', "\\\"")) }, token.origin.clone()));
				index += 2;
				continue;
			}
		}
		if let Some(parameter_index) = token.identifier_name().and_then(|name| definition.parameters.iter().position(|parameter| parameter == name)) {
			if let Some(argument) = args.get(parameter_index) {
				output.extend(argument.iter().cloned());
			}
			index += 1;
			continue;
		}
		if definition.is_variadic && token.identifier_name() == Some("__VA_ARGS__") {
			let extra = args.get(definition.parameters.len()..).unwrap_or_default();
			for (position, argument) in extra.iter().enumerate() {
				if position > 0 {
					output.push(Token::new(TokenKind::Operator(Opcode::Comma), token.origin.clone()));
				}
				output.extend(argument.iter().cloned());
			}
			index += 1;
			continue;
		}
		output.push(token.clone());
		index += 1;
	}
	output
}

/// Applies `##` token-paste over a flat token sequence: each operand is re-lexed as a single new
/// token built from the concatenated lexemes of its neighbors.
fn apply_token_paste(tokens: Vec<Token>) -> Vec<Token> {
	let mut output: Vec<Token> = Vec::new();
	let mut iter = tokens.into_iter().peekable();
	while let Some(token) = iter.next() {
		if iter.peek().and_then(Token::opcode) == Some(Opcode::HashHash) {
			iter.next(); // consume `##`
			let Some(right) = iter.next() else {
				output.push(token);
				continue;
			};
			let pasted_text = format!("{}{}", token.lexeme(), right.lexeme());
			let origin = token.origin.clone();
			output.push(crate::lexer::tokenize(&pasted_text, &origin.file).ok().and_then(|mut tokens| tokens.drain(..).next()).unwrap_or(Token::new(TokenKind::Identifier(pasted_text), origin)));
			continue;
		}
		output.push(token);
	}
	output
}

/// Formats a `(date, time)` pair for `__DATE__`/`__TIME__`, derived once at session start from
/// wall-clock time without pulling in a date/time crate the rest of the pack doesn't use for this.
fn session_timestamp() -> (String, String) {
	let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs();
	let days_since_epoch = now / 86_400;
	let seconds_of_day = now % 86_400;
	let (hours, minutes, seconds) = (seconds_of_day / 3600, (seconds_of_day % 3600) / 60, seconds_of_day % 60);

	// Civil-from-days (Howard Hinnant's algorithm), good enough for a build-timestamp macro.
	let z = days_since_epoch as i64 + 719_468;
	let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
	let doe = (z - era * 146_097) as u64;
	let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
	let year = yoe as i64 + era * 400;
	let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
	let mp = (5 * doy + 2) / 153;
	let day = doy - (153 * mp + 2) / 5 + 1;
	let month = if mp < 10 { mp + 3 } else { mp - 9 };
	let year = if month <= 2 { year + 1 } else { year };

	const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
	let month_name = MONTHS[(month - 1) as usize % 12];
	(format!("{month_name} {day:2} {year}"), format!("{hours:02}:{minutes:02}:{seconds:02}"))
}
