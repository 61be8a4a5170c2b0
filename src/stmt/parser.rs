use std::rc::Rc;

use crate::diagnostics::{DiagnosticSink, TranslateError};
use crate::expr::{self, ExprId};
use crate::lexer::{Opcode, Token, TokenKind};
use crate::origin::Origin;
use crate::resolve::{TypeInfo, VarInfo};

use super::ast::{Declarator, IfBranch, Param, Program, StmtId, StmtKind};

/// `return`/`break`/`continue` are semicolon-terminated and carry an optional expression;
/// `case`/`default` are colon-terminated and live inside a `switch` body. Both shapes share
/// one statement kind.
static FLOW_KEYWORDS: phf::Set<&'static str> = phf::phf_set! { "return", "break", "continue", "case", "default" };
static STRUCT_KEYWORDS: phf::Set<&'static str> = phf::phf_set! { "struct", "class", "union", "enum" };
/// Words that modify a declaration or signature without being the type itself — stripped into
/// `qualifiers` rather than folded into `type_name`/`return_type` text, matching how
/// `VarInfo`/`Param` keep qualifiers as an ordered multiset separate from the type. Includes the
/// OKL annotations (`@kernel`, `@shared`, ...), which the tokenizer lexes as ordinary identifiers
/// whose text happens to start with `@`.
static QUALIFIER_WORDS: phf::Set<&'static str> = phf::phf_set! {
	"const", "static", "volatile", "inline", "extern", "register", "unsigned", "signed", "restrict", "@restrict", "@kernel", "@shared", "@exclusive", "@constant", "@dim",
};

/// Parses a fully preprocessed token stream into a [`Program`]. Errors are reported to
/// `sink` and recovered from at the next statement boundary rather than aborting the whole parse,
/// so a single run surfaces every mistake in the source, not just the first.
pub fn parse_program(tokens: &[Token], sink: &mut dyn DiagnosticSink) -> Program {
	let mut parser = StmtParser::new(tokens, sink);
	let mut top_level = Vec::new();
	while parser.peek().is_some() {
		let before = parser.position;
		match parser.parse_statement(None) {
			Ok(ids) => top_level.extend(ids),
			Err(error) => {
				parser.report_and_recover(before, &error);
			},
		}
	}
	parser.program.top_level = top_level;
	parser.program
}

struct StmtParser<'a> {
	tokens: &'a [Token],
	position: usize,
	program: Program,
	sink: &'a mut dyn DiagnosticSink,
}

impl<'a> StmtParser<'a> {
	fn new(tokens: &'a [Token], sink: &'a mut dyn DiagnosticSink) -> Self {
		Self { tokens, position: 0, program: Program::default(), sink }
	}

	fn report_and_recover(&mut self, before: usize, error: &anyhow::Error) {
		let origin = self.tokens.get(before).map(|token| token.origin.clone()).unwrap_or_else(|| self.eof_origin());
		self.sink.error(origin, error.to_string());
		self.recover_to_next_statement(before);
	}

	fn eof_origin(&self) -> Origin {
		self.tokens.last().map(|token| token.origin.clone()).unwrap_or_else(|| Origin::synthetic(Rc::from("")))
	}

	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.position)
	}

	fn peek_at(&self, offset: usize) -> Option<&Token> {
		self.tokens.get(self.position + offset)
	}

	fn bump(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.position).cloned();
		if token.is_some() {
			self.position += 1;
		}
		token
	}

	fn peek_is_op(&self, op: Opcode) -> bool {
		self.peek().is_some_and(|token| token.opcode() == Some(op))
	}

	fn peek_is_word(&self, word: &str) -> bool {
		self.peek().and_then(Token::identifier_name) == Some(word)
	}

	fn expect_op(&mut self, op: Opcode, expected: &str) -> anyhow::Result<Origin> {
		match self.bump() {
			Some(token) if token.opcode() == Some(op) => Ok(token.origin),
			Some(token) => anyhow::bail!(TranslateError::UnexpectedToken { origin: token.origin, found: token.lexeme(), expected: expected.to_owned() }),
			None => anyhow::bail!(TranslateError::UnexpectedToken { origin: self.eof_origin(), found: "end of input".to_owned(), expected: expected.to_owned() }),
		}
	}

	fn expect_word(&mut self, word: &'static str) -> anyhow::Result<Origin> {
		match self.bump() {
			Some(token) if token.identifier_name() == Some(word) => Ok(token.origin),
			Some(token) => anyhow::bail!(TranslateError::UnexpectedToken { origin: token.origin, found: token.lexeme(), expected: word.to_owned() }),
			None => anyhow::bail!(TranslateError::UnexpectedToken { origin: self.eof_origin(), found: "end of input".to_owned(), expected: word.to_owned() }),
		}
	}

	/// Finds the next index at or after `from` where bracket depth (relative to `from`) is zero and
	/// `stop` matches, without consuming anything.
	fn find_top_level(&self, from: usize, stop: impl Fn(&TokenKind) -> bool) -> Option<usize> {
		find_in_slice(self.tokens, from, stop)
	}

	/// Slices `self.position..stop` (exclusive) where `stop` is the next top-level match, leaving
	/// the cursor on the matched token itself (the caller consumes it, e.g. via `expect_op`).
	fn collect_until(&mut self, stop: impl Fn(&TokenKind) -> bool) -> anyhow::Result<Vec<Token>> {
		let end = self.find_top_level(self.position, stop).unwrap_or(self.tokens.len());
		let collected = self.tokens[self.position..end].to_vec();
		self.position = end;
		Ok(collected)
	}

	/// Consumes tokens up to and including the matching `close`, given `open` was already consumed
	/// by the caller, and returns everything in between.
	fn collect_balanced(&mut self, open: Opcode, close: Opcode, open_lexeme: &'static str, close_lexeme: &'static str) -> anyhow::Result<Vec<Token>> {
		let mut depth = 1i32;
		let start = self.position;
		let open_origin = self.tokens.get(start.saturating_sub(1)).map_or_else(|| self.eof_origin(), |token| token.origin.clone());
		while let Some(token) = self.tokens.get(self.position) {
			match token.opcode() {
				Some(op) if op == open => depth += 1,
				Some(op) if op == close => {
					depth -= 1;
					if depth == 0 {
						let inner = self.tokens[start..self.position].to_vec();
						self.position += 1;
						return Ok(inner);
					}
				},
				_ => {},
			}
			self.position += 1;
		}
		anyhow::bail!(TranslateError::UnbalancedPair { origin: open_origin, open: open_lexeme, close: close_lexeme })
	}

	fn register_var(&mut self, parent: Option<StmtId>, info: VarInfo) {
		match parent {
			Some(id) => {
				self.program.stmts[id].scope_vars.insert(info.name.clone(), info);
			},
			None => {
				self.program.global_vars.insert(info.name.clone(), info);
			},
		}
	}

	fn register_type(&mut self, parent: Option<StmtId>, info: TypeInfo) {
		match parent {
			Some(id) => {
				self.program.stmts[id].scope_types.insert(info.name.clone(), info);
			},
			None => {
				self.program.global_types.insert(info.name.clone(), info);
			},
		}
	}

	/// Skips past the token that caused the error, then to the next `;`/`}` — a statement
	/// boundary a well-formed program is guaranteed to have one of.
	fn recover_to_next_statement(&mut self, before: usize) {
		self.position = self.position.max(before + 1);
		while let Some(token) = self.tokens.get(self.position) {
			let is_boundary = matches!(token.kind, TokenKind::Operator(Opcode::Semicolon | Opcode::RBrace));
			self.position += 1;
			if is_boundary {
				break;
			}
		}
	}

	fn parse_block_items(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let mut items = Vec::new();
		while let Some(token) = self.peek() {
			if matches!(token.kind, TokenKind::Operator(Opcode::RBrace)) {
				break;
			}
			let before = self.position;
			match self.parse_statement(parent) {
				Ok(ids) => items.extend(ids),
				Err(error) => self.report_and_recover(before, &error),
			}
		}
		Ok(items)
	}

	/// The body of a `for`/`while`/`if`/... header: either a braced block (its statements become
	/// direct children, with no extra `Block` wrapper) or a single statement.
	fn parse_controlled_body(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		if self.peek_is_op(Opcode::LBrace) {
			self.bump();
			let body = self.parse_block_items(parent)?;
			self.expect_op(Opcode::RBrace, "}")?;
			Ok(body)
		} else {
			self.parse_statement(parent)
		}
	}

	fn struct_has_body(&self) -> bool {
		let mut index = self.position + 1;
		if self.tokens.get(index).is_some_and(Token::is_identifier) {
			index += 1;
		}
		self.tokens.get(index).is_some_and(|token| token.opcode() == Some(Opcode::LBrace))
	}

	fn parse_statement(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let Some(token) = self.peek().cloned() else {
			anyhow::bail!("unexpected end of input while parsing a statement");
		};

		if let TokenKind::Pragma(body) = &token.kind {
			self.bump();
			return Ok(vec![self.program.push(StmtKind::Macro { directive: "pragma".to_owned(), body: body.clone() }, token.origin, parent)]);
		}

		if token.opcode() == Some(Opcode::LBrace) {
			self.bump();
			let block_id = self.program.push(StmtKind::Block { body: Vec::new() }, token.origin, parent);
			let body = self.parse_block_items(Some(block_id))?;
			self.expect_op(Opcode::RBrace, "}")?;
			if let StmtKind::Block { body: b } = &mut self.program.get_mut(block_id).kind {
				*b = body;
			}
			return Ok(vec![block_id]);
		}

		if token.opcode() == Some(Opcode::Semicolon) {
			// An empty statement (`;`) — harmless, matched by no other shape.
			self.bump();
			return Ok(vec![self.program.push(StmtKind::Block { body: Vec::new() }, token.origin, parent)]);
		}

		if let Some(name) = token.identifier_name() {
			match name {
				"typedef" => return self.parse_typedef(parent),
				"for" => return self.parse_for(parent),
				"while" => return self.parse_while(parent),
				"do" => return self.parse_do_while(parent),
				"if" => return self.parse_if_chain(parent),
				"switch" => return self.parse_switch(parent),
				"goto" => return self.parse_goto(parent),
				_ if FLOW_KEYWORDS.contains(name) => return self.parse_flow_keyword(parent),
				_ if STRUCT_KEYWORDS.contains(name) && self.struct_has_body() => return self.parse_struct(parent),
				_ if self.peek_at(1).is_some_and(|token| token.opcode() == Some(Opcode::Colon)) => return self.parse_label(parent),
				_ => {},
			}
		}

		self.parse_declare_or_function_or_update(parent)
	}

	fn parse_typedef(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("typedef keyword").origin;
		let tokens = self.collect_until(|kind| matches!(kind, TokenKind::Operator(Opcode::Semicolon)))?;
		self.expect_op(Opcode::Semicolon, ";")?;
		let Some(name_pos) = tokens.iter().rposition(Token::is_identifier) else {
			anyhow::bail!(TranslateError::UnexpectedToken { origin, found: "end of typedef".to_owned(), expected: "type name".to_owned() });
		};
		let name = tokens[name_pos].identifier_name().unwrap_or_default().to_owned();
		let underlying = join_lexemes(&tokens[..name_pos]);
		let stmt_id = self.program.push(StmtKind::Typedef { underlying, name: name.clone() }, origin.clone(), parent);
		self.register_type(parent, TypeInfo { name, defining_stmt: stmt_id, origin });
		Ok(vec![stmt_id])
	}

	fn parse_struct(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let keyword_token = self.bump().expect("struct-family keyword");
		let keyword = keyword_token.identifier_name().unwrap_or_default().to_owned();
		let name = if self.peek().is_some_and(Token::is_identifier) { self.bump().and_then(|token| token.identifier_name().map(str::to_owned)) } else { None };

		self.expect_op(Opcode::LBrace, "{")?;
		let struct_id = self.program.push(StmtKind::Struct { keyword, name: name.clone(), body: Vec::new() }, keyword_token.origin.clone(), parent);
		if let Some(name) = &name {
			self.register_type(parent, TypeInfo { name: name.clone(), defining_stmt: struct_id, origin: keyword_token.origin.clone() });
		}
		let body = self.parse_block_items(Some(struct_id))?;
		self.expect_op(Opcode::RBrace, "}")?;
		if let StmtKind::Struct { body: b, .. } = &mut self.program.get_mut(struct_id).kind {
			*b = body;
		}

		if self.peek_is_op(Opcode::Semicolon) {
			self.bump();
			return Ok(vec![struct_id]);
		}

		// `struct Point { ... } origin;` — a single declarator using the struct just defined as
		// its type, rather than a plain forward/definition statement.
		let declare_origin = self.peek().map_or_else(|| keyword_token.origin.clone(), |token| token.origin.clone());
		let declarator_tokens = self.collect_until(|kind| matches!(kind, TokenKind::Operator(Opcode::Semicolon)))?;
		self.expect_op(Opcode::Semicolon, ";")?;
		if declarator_tokens.is_empty() {
			return Ok(vec![struct_id]);
		}
		let type_name = name.unwrap_or_default();
		let declarator_name = declarator_tokens.last().and_then(Token::identifier_name).unwrap_or_default().to_owned();
		let is_pointer = declarator_tokens.iter().any(|token| token.opcode() == Some(Opcode::Asterisk));
		let declarator = Declarator { name: declarator_name.clone(), is_pointer, array_dims: Vec::new(), initializer: None };
		let declare_id = self.program.push(StmtKind::Declare { qualifiers: Vec::new(), type_name: type_name.clone(), declarators: vec![declarator] }, declare_origin.clone(), parent);
		self.register_var(parent, VarInfo { name: declarator_name, type_name, qualifiers: Vec::new(), is_pointer, defining_stmt: declare_id, origin: declare_origin });
		Ok(vec![struct_id, declare_id])
	}

	fn parse_for(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("for keyword").origin;
		self.expect_op(Opcode::LParen, "(")?;
		let inner = self.collect_balanced(Opcode::LParen, Opcode::RParen, "(", ")")?;
		let parts = split_top_level(&inner, Opcode::Semicolon);

		let for_id = self.program.push(StmtKind::For { init: None, condition: None, step: None, tag: None, body: Vec::new() }, origin, parent);

		let init_id = match parts.first() {
			Some(tokens) if !tokens.is_empty() => Some(self.parse_for_init(tokens, for_id)?),
			_ => None,
		};
		let condition = match parts.get(1) {
			Some(tokens) if !tokens.is_empty() => Some(graft(&mut self.program, expr::parse_tokens(tokens)?)),
			_ => None,
		};
		let step = match parts.get(2) {
			Some(tokens) if !tokens.is_empty() => Some(graft(&mut self.program, expr::parse_tokens(tokens)?)),
			_ => None,
		};
		// A fourth header expression tags this as an OKL loop (`@outerN`, `@innerN`, `@tileN`);
		// setup_ok_for verifies the rest of the shape later.
		let tag = parts.get(3).and_then(|tokens| tokens.first()).and_then(Token::identifier_name).map(str::to_owned);

		let body = self.parse_controlled_body(Some(for_id))?;

		if let StmtKind::For { init, condition: c, step: s, tag: t, body: b } = &mut self.program.get_mut(for_id).kind {
			*init = init_id;
			*c = condition;
			*s = step;
			*t = tag;
			*b = body;
		}
		Ok(vec![for_id])
	}

	/// A for-loop's init clause: either a single declarator (`T iter = start`, the only shape spec
	/// §4.6 step 4 requires for an OKL loop) or a bare expression (`i = 0`, for a plain C for-loop).
	fn parse_for_init(&mut self, tokens: &[Token], for_id: StmtId) -> anyhow::Result<StmtId> {
		let origin = tokens[0].origin.clone();
		let identifier_count = tokens.iter().filter(|token| token.is_identifier()).count();
		if identifier_count < 2 {
			let expr_id = graft(&mut self.program, expr::parse_tokens(tokens)?);
			return Ok(self.program.push(StmtKind::Update { expr: expr_id }, origin, Some(for_id)));
		}

		let bound = tokens.iter().position(|token| token.opcode() == Some(Opcode::Assign)).unwrap_or(tokens.len());
		let Some(name_pos) = tokens[..bound].iter().rposition(Token::is_identifier) else {
			anyhow::bail!(TranslateError::MalformedOklLoop { origin, reason: "init clause has no declarator name".to_owned() });
		};
		let type_name = join_lexemes(&tokens[..name_pos].iter().filter(|token| token.is_identifier()).cloned().collect::<Vec<_>>());
		let is_pointer = tokens[..name_pos].iter().any(|token| token.opcode() == Some(Opcode::Asterisk));
		let name = tokens[name_pos].identifier_name().unwrap_or_default().to_owned();
		let initializer = if bound < tokens.len() { Some(graft(&mut self.program, expr::parse_tokens(&tokens[bound + 1..])?)) } else { None };

		let declarator = Declarator { name: name.clone(), is_pointer, array_dims: Vec::new(), initializer };
		let stmt_id = self.program.push(StmtKind::Declare { qualifiers: Vec::new(), type_name: type_name.clone(), declarators: vec![declarator] }, origin.clone(), Some(for_id));
		self.register_var(Some(for_id), VarInfo { name, type_name, qualifiers: Vec::new(), is_pointer, defining_stmt: stmt_id, origin });
		Ok(stmt_id)
	}

	fn parse_while(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("while keyword").origin;
		self.expect_op(Opcode::LParen, "(")?;
		let inner = self.collect_balanced(Opcode::LParen, Opcode::RParen, "(", ")")?;
		let condition = graft(&mut self.program, expr::parse_tokens(&inner)?);
		let while_id = self.program.push(StmtKind::While { condition, body: Vec::new() }, origin, parent);
		let body = self.parse_controlled_body(Some(while_id))?;
		if let StmtKind::While { body: b, .. } = &mut self.program.get_mut(while_id).kind {
			*b = body;
		}
		Ok(vec![while_id])
	}

	fn parse_do_while(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("do keyword").origin;
		// The condition isn't known until after the body; reserve a throwaway arena slot now and
		// overwrite the statement's real condition once it's parsed, rather than invent a sentinel
		// `ExprId`.
		let placeholder = self.program.exprs.push(crate::expr::ExprKind::Primitive(crate::lexer::PrimitiveValue::Int { text: "0".to_owned(), value: 0, suffix: crate::lexer::NumericSuffix::None }), origin.clone());
		let do_id = self.program.push(StmtKind::DoWhile { condition: placeholder, body: Vec::new() }, origin, parent);

		let body = self.parse_controlled_body(Some(do_id))?;
		self.expect_word("while")?;
		self.expect_op(Opcode::LParen, "(")?;
		let inner = self.collect_balanced(Opcode::LParen, Opcode::RParen, "(", ")")?;
		self.expect_op(Opcode::Semicolon, ";")?;
		let condition = graft(&mut self.program, expr::parse_tokens(&inner)?);

		if let StmtKind::DoWhile { condition: c, body: b } = &mut self.program.get_mut(do_id).kind {
			*c = condition;
			*b = body;
		}
		Ok(vec![do_id])
	}

	fn parse_if_chain(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("if keyword").origin;
		let if_id = self.program.push(StmtKind::IfChain { branches: Vec::new() }, origin, parent);
		let mut branches = Vec::new();

		self.expect_op(Opcode::LParen, "(")?;
		let inner = self.collect_balanced(Opcode::LParen, Opcode::RParen, "(", ")")?;
		let condition = graft(&mut self.program, expr::parse_tokens(&inner)?);
		let body = self.parse_controlled_body(Some(if_id))?;
		branches.push(IfBranch { condition: Some(condition), body });

		while self.peek_is_word("else") {
			self.bump();
			if self.peek_is_word("if") {
				self.bump();
				self.expect_op(Opcode::LParen, "(")?;
				let inner = self.collect_balanced(Opcode::LParen, Opcode::RParen, "(", ")")?;
				let condition = graft(&mut self.program, expr::parse_tokens(&inner)?);
				let body = self.parse_controlled_body(Some(if_id))?;
				branches.push(IfBranch { condition: Some(condition), body });
			} else {
				let body = self.parse_controlled_body(Some(if_id))?;
				branches.push(IfBranch { condition: None, body });
				break;
			}
		}

		if let StmtKind::IfChain { branches: b } = &mut self.program.get_mut(if_id).kind {
			*b = branches;
		}
		Ok(vec![if_id])
	}

	fn parse_switch(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("switch keyword").origin;
		self.expect_op(Opcode::LParen, "(")?;
		let inner = self.collect_balanced(Opcode::LParen, Opcode::RParen, "(", ")")?;
		let subject = graft(&mut self.program, expr::parse_tokens(&inner)?);
		let switch_id = self.program.push(StmtKind::Switch { subject, body: Vec::new() }, origin, parent);
		self.expect_op(Opcode::LBrace, "{")?;
		let body = self.parse_block_items(Some(switch_id))?;
		self.expect_op(Opcode::RBrace, "}")?;
		if let StmtKind::Switch { body: b, .. } = &mut self.program.get_mut(switch_id).kind {
			*b = body;
		}
		Ok(vec![switch_id])
	}

	fn parse_goto(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.bump().expect("goto keyword").origin;
		let Some(label_token) = self.bump() else {
			anyhow::bail!(TranslateError::UnexpectedToken { origin, found: "end of input".to_owned(), expected: "label".to_owned() });
		};
		let label = label_token.identifier_name().unwrap_or_default().to_owned();
		self.expect_op(Opcode::Semicolon, ";")?;
		Ok(vec![self.program.push(StmtKind::Goto { label }, origin, parent)])
	}

	fn parse_label(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let name_token = self.bump().expect("label identifier");
		let name = name_token.identifier_name().unwrap_or_default().to_owned();
		self.expect_op(Opcode::Colon, ":")?;
		Ok(vec![self.program.push(StmtKind::Label { name }, name_token.origin, parent)])
	}

	fn parse_flow_keyword(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let keyword_token = self.bump().expect("flow keyword");
		let keyword = keyword_token.identifier_name().unwrap_or_default().to_owned();

		if keyword == "case" {
			let tokens = self.collect_until(|kind| matches!(kind, TokenKind::Operator(Opcode::Colon)))?;
			self.expect_op(Opcode::Colon, ":")?;
			let expr_id = graft(&mut self.program, expr::parse_tokens(&tokens)?);
			return Ok(vec![self.program.push(StmtKind::FlowKeyword { keyword, expr: Some(expr_id) }, keyword_token.origin, parent)]);
		}
		if keyword == "default" {
			self.expect_op(Opcode::Colon, ":")?;
			return Ok(vec![self.program.push(StmtKind::FlowKeyword { keyword, expr: None }, keyword_token.origin, parent)]);
		}

		let tokens = self.collect_until(|kind| matches!(kind, TokenKind::Operator(Opcode::Semicolon)))?;
		self.expect_op(Opcode::Semicolon, ";")?;
		let expr_id = if tokens.is_empty() { None } else { Some(graft(&mut self.program, expr::parse_tokens(&tokens)?)) };
		Ok(vec![self.program.push(StmtKind::FlowKeyword { keyword, expr: expr_id }, keyword_token.origin, parent)])
	}

	/// The catch-all shape: declare, function-definition/prototype, or a bare expression statement
	/// (update). Disambiguated purely by counting leading identifiers
	/// before the first top-level `(`/`;`/`=`/`[` — a type name followed by a declarator name is
	/// always at least two identifiers in a row, whereas an expression statement's leftmost
	/// identifier is immediately followed by an operator.
	fn parse_declare_or_function_or_update(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		match classify_header(self.tokens, self.position) {
			HeaderShape::Parenthesized { is_signature: true, .. } => self.parse_function_like(parent),
			HeaderShape::Parenthesized { is_signature: false, .. } | HeaderShape::Plain { declare: false } => self.parse_expr_statement(parent),
			HeaderShape::Plain { declare: true } => self.parse_declare(parent),
		}
	}

	fn parse_expr_statement(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.peek().expect("non-empty").origin.clone();
		let header = self.collect_until(|kind| matches!(kind, TokenKind::Operator(Opcode::Semicolon)))?;
		self.expect_op(Opcode::Semicolon, ";")?;
		let expr_id = graft(&mut self.program, expr::parse_tokens(&header)?);
		Ok(vec![self.program.push(StmtKind::Update { expr: expr_id }, origin, parent)])
	}

	fn parse_declare(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.peek().expect("non-empty").origin.clone();
		let header = self.collect_until(|kind| matches!(kind, TokenKind::Operator(Opcode::Semicolon)))?;
		self.expect_op(Opcode::Semicolon, ";")?;

		let chunks = split_top_level(&header, Opcode::Comma);
		let mut qualifiers = Vec::new();
		let mut type_name = String::new();
		let mut declarators = Vec::new();

		for (chunk_index, chunk) in chunks.iter().enumerate() {
			let mut idx = 0;
			let mut is_pointer = false;
			if chunk_index == 0 {
				while let Some(name) = chunk.get(idx).and_then(Token::identifier_name) {
					if QUALIFIER_WORDS.contains(name) {
						qualifiers.push(name.to_owned());
						idx += 1;
					} else {
						break;
					}
				}
				let bound = chunk[idx..].iter().position(|token| matches!(token.kind, TokenKind::Operator(Opcode::Assign | Opcode::LBracket))).map_or(chunk.len(), |pos| pos + idx);
				if let Some(name_pos) = chunk[idx..bound].iter().rposition(Token::is_identifier).map(|pos| pos + idx) {
					let type_tokens: Vec<Token> = chunk[idx..name_pos].iter().filter(|token| token.is_identifier()).cloned().collect();
					type_name = join_lexemes(&type_tokens);
					is_pointer = chunk[idx..name_pos].iter().any(|token| matches!(token.opcode(), Some(Opcode::Asterisk | Opcode::Ampersand)));
					idx = name_pos;
				}
			}

			let mut decl_idx = idx;
			while matches!(chunk.get(decl_idx).and_then(Token::opcode), Some(Opcode::Asterisk | Opcode::Ampersand)) {
				is_pointer = true;
				decl_idx += 1;
			}
			let Some(name_token) = chunk.get(decl_idx) else {
				anyhow::bail!(TranslateError::UnexpectedToken { origin, found: "end of declarator".to_owned(), expected: "declarator name".to_owned() });
			};
			let name = name_token.identifier_name().unwrap_or_default().to_owned();
			decl_idx += 1;

			let mut array_dims = Vec::new();
			while chunk.get(decl_idx).and_then(Token::opcode) == Some(Opcode::LBracket) {
				decl_idx += 1;
				let Some(close) = find_in_slice(chunk, decl_idx, |kind| matches!(kind, TokenKind::Operator(Opcode::RBracket))) else {
					anyhow::bail!(TranslateError::UnbalancedPair { origin, open: "[", close: "]" });
				};
				let dim_tokens = &chunk[decl_idx..close];
				array_dims.push(if dim_tokens.is_empty() { None } else { Some(graft(&mut self.program, expr::parse_tokens(dim_tokens)?)) });
				decl_idx = close + 1;
			}

			let initializer = if chunk.get(decl_idx).and_then(Token::opcode) == Some(Opcode::Assign) {
				Some(graft(&mut self.program, expr::parse_tokens(&chunk[decl_idx + 1..])?))
			} else {
				None
			};

			declarators.push(Declarator { name, is_pointer, array_dims, initializer });
		}

		let stmt_id = self.program.push(StmtKind::Declare { qualifiers: qualifiers.clone(), type_name: type_name.clone(), declarators: declarators.clone() }, origin.clone(), parent);
		for declarator in &declarators {
			self.register_var(parent, VarInfo { name: declarator.name.clone(), type_name: type_name.clone(), qualifiers: qualifiers.clone(), is_pointer: declarator.is_pointer, defining_stmt: stmt_id, origin: origin.clone() });
		}
		Ok(vec![stmt_id])
	}

	fn parse_function_like(&mut self, parent: Option<StmtId>) -> anyhow::Result<Vec<StmtId>> {
		let origin = self.peek().expect("non-empty").origin.clone();
		let HeaderShape::Parenthesized { paren_index, .. } = classify_header(self.tokens, self.position) else {
			unreachable!("caller only routes here for Parenthesized shapes")
		};
		let header_tokens = self.tokens[self.position..paren_index].to_vec();
		let Some(name_token) = header_tokens.last() else {
			anyhow::bail!(TranslateError::UnexpectedToken { origin, found: "(".to_owned(), expected: "function name".to_owned() });
		};
		let name = name_token.identifier_name().unwrap_or_default().to_owned();
		let return_tokens = &header_tokens[..header_tokens.len() - 1];
		let mut qualifiers = Vec::new();
		let mut return_type_tokens = Vec::new();
		for token in return_tokens {
			match token.identifier_name() {
				Some(word) if QUALIFIER_WORDS.contains(word) => qualifiers.push(word.to_owned()),
				_ => return_type_tokens.push(token.clone()),
			}
		}
		let return_type = join_lexemes(&return_type_tokens);

		self.position = paren_index;
		self.expect_op(Opcode::LParen, "(")?;
		let params = self.parse_param_list()?;
		self.expect_op(Opcode::RParen, ")")?;

		if self.peek_is_op(Opcode::LBrace) {
			let stmt_id = self.program.push(StmtKind::FunctionDefinition { qualifiers, return_type, name, params: params.clone(), body: Vec::new() }, origin, parent);
			for param in &params {
				self.register_var(Some(stmt_id), VarInfo { name: param.name.clone(), type_name: param.type_name.clone(), qualifiers: param.qualifiers.clone(), is_pointer: param.is_pointer, defining_stmt: stmt_id, origin: name_token.origin.clone() });
			}
			self.bump();
			let body = self.parse_block_items(Some(stmt_id))?;
			self.expect_op(Opcode::RBrace, "}")?;
			if let StmtKind::FunctionDefinition { body: b, .. } = &mut self.program.get_mut(stmt_id).kind {
				*b = body;
			}
			Ok(vec![stmt_id])
		} else {
			self.expect_op(Opcode::Semicolon, ";")?;
			Ok(vec![self.program.push(StmtKind::FunctionPrototype { qualifiers, return_type, name, params }, origin, parent)])
		}
	}

	fn parse_param_list(&mut self) -> anyhow::Result<Vec<Param>> {
		let mut params = Vec::new();
		if self.peek_is_op(Opcode::RParen) {
			return Ok(params);
		}
		loop {
			let end = self.find_top_level(self.position, |kind| matches!(kind, TokenKind::Operator(Opcode::Comma | Opcode::RParen))).unwrap_or(self.tokens.len());
			let param_tokens = self.tokens[self.position..end].to_vec();
			self.position = end;
			params.push(parse_single_param(&param_tokens));
			if self.peek_is_op(Opcode::Comma) {
				self.bump();
				continue;
			}
			break;
		}
		if params.len() == 1 && params[0].name.is_empty() && params[0].type_name == "void" {
			params.clear();
		}
		Ok(params)
	}
}

enum HeaderShape {
	Plain { declare: bool },
	Parenthesized { is_signature: bool, paren_index: usize },
}

/// Classifies the statement starting at `start` without consuming anything — see
/// `parse_declare_or_function_or_update`.
fn classify_header(tokens: &[Token], start: usize) -> HeaderShape {
	let mut i = start;
	let mut identifier_run = 0usize;
	loop {
		match tokens.get(i).map(|token| &token.kind) {
			Some(TokenKind::Identifier(_)) => {
				identifier_run += 1;
				i += 1;
			},
			Some(TokenKind::Operator(Opcode::Asterisk | Opcode::Ampersand)) => i += 1,
			Some(TokenKind::Operator(Opcode::LParen)) => return HeaderShape::Parenthesized { is_signature: identifier_run >= 2, paren_index: i },
			_ => return HeaderShape::Plain { declare: identifier_run >= 2 },
		}
	}
}

fn parse_single_param(tokens: &[Token]) -> Param {
	let mut qualifiers = Vec::new();
	let mut idx = 0;
	while let Some(name) = tokens.get(idx).and_then(Token::identifier_name) {
		if !QUALIFIER_WORDS.contains(name) {
			break;
		}
		qualifiers.push(name.to_owned());
		idx += 1;
	}
	let body = &tokens[idx..];
	let is_pointer = body.iter().any(|token| token.opcode() == Some(Opcode::Asterisk));
	let (type_tokens, name) = if body.len() > 1 && body.last().is_some_and(Token::is_identifier) {
		(&body[..body.len() - 1], body.last().and_then(Token::identifier_name).unwrap_or_default().to_owned())
	} else {
		(body, String::new())
	};
	Param { qualifiers, type_name: join_lexemes(type_tokens), is_pointer, name }
}

fn join_lexemes(tokens: &[Token]) -> String {
	tokens.iter().map(Token::lexeme).collect::<Vec<_>>().join(" ")
}

/// Splits `tokens` on every top-level occurrence of `sep` (ignoring ones nested inside
/// `()`/`[]`/`{}`, e.g. the comma inside `f(1, 2)` in a declarator's initializer).
fn split_top_level(tokens: &[Token], sep: Opcode) -> Vec<&[Token]> {
	let mut parts = Vec::new();
	let mut depth = 0i32;
	let mut start = 0;
	for (i, token) in tokens.iter().enumerate() {
		match token.opcode() {
			Some(Opcode::LParen | Opcode::LBracket | Opcode::LBrace) => depth += 1,
			Some(Opcode::RParen | Opcode::RBracket | Opcode::RBrace) => depth -= 1,
			Some(op) if op == sep && depth == 0 => {
				parts.push(&tokens[start..i]);
				start = i + 1;
			},
			_ => {},
		}
	}
	parts.push(&tokens[start..]);
	parts
}

fn find_in_slice(tokens: &[Token], from: usize, stop: impl Fn(&TokenKind) -> bool) -> Option<usize> {
	let mut depth = 0i32;
	let mut i = from;
	while let Some(token) = tokens.get(i) {
		let is_open = matches!(token.kind, TokenKind::Operator(Opcode::LParen | Opcode::LBracket | Opcode::LBrace));
		let is_close = matches!(token.kind, TokenKind::Operator(Opcode::RParen | Opcode::RBracket | Opcode::RBrace));
		if depth == 0 && stop(&token.kind) {
			return Some(i);
		}
		if is_open {
			depth += 1;
		} else if is_close {
			depth -= 1;
		}
		i += 1;
	}
	None
}

/// Splices a freshly parsed header expression into the statement parser's shared expression
/// arena, returning its new root id.
fn graft(program: &mut Program, tree: expr::ExprTree) -> ExprId {
	let offset = program.exprs.append(tree.arena);
	tree.root + offset
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diagnostics::CollectingSink;
	use crate::lexer::tokenize;

	fn tokens_for(source: &str) -> Vec<Token> {
		tokenize(source, "test.c").expect("tokenize").into_iter().filter(|token| !matches!(token.kind, TokenKind::Newline)).collect()
	}

	#[test]
	fn pointer_declarator_keeps_its_star() {
		let tokens = tokens_for("float *p = 0;\n");
		let mut sink = CollectingSink::new();
		let program = parse_program(&tokens, &mut sink);
		assert_eq!(sink.error_count(), 0, "{:?}", sink.diagnostics);
		let StmtKind::Declare { declarators, .. } = &program.get(program.top_level[0]).kind else {
			panic!("expected a Declare statement");
		};
		assert_eq!(declarators.len(), 1);
		assert!(declarators[0].is_pointer, "`float *p` must parse as a pointer declarator");
		assert_eq!(declarators[0].name, "p");
	}

	#[test]
	fn plain_declarator_is_not_a_pointer() {
		let tokens = tokens_for("int x = 0;\n");
		let mut sink = CollectingSink::new();
		let program = parse_program(&tokens, &mut sink);
		assert_eq!(sink.error_count(), 0, "{:?}", sink.diagnostics);
		let StmtKind::Declare { declarators, .. } = &program.get(program.top_level[0]).kind else {
			panic!("expected a Declare statement");
		};
		assert!(!declarators[0].is_pointer);
	}
}
