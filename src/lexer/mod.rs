pub mod operator;
pub mod token;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::diagnostics::TranslateError;
use crate::origin::Origin;

pub use operator::{OpFlags, Opcode, OperatorEntry};
pub use token::{NumericSuffix, PrimitiveValue, Token, TokenKind};

/// One `#include`d (or the root) source buffer being scanned. Tokenizer keeps a stack of these so
/// that `push_source` can splice a new file in and resume the caller's file at EOF: the include
/// splices in with file-origin updated, and the outer origin is restored once that frame hits EOF.
struct SourceFrame {
	file: Rc<str>,
	text: Vec<char>,
	pos: usize,
	line: usize,
	column: usize,
}

impl SourceFrame {
	fn new(file: Rc<str>, text: &str) -> Self {
		Self { file, text: text.chars().collect(), pos: 0, line: 1, column: 1 }
	}

	fn rest(&self) -> &[char] {
		&self.text[self.pos..]
	}

	fn starts_with(&self, prefix: &str) -> bool {
		let rest = self.rest();
		let mut prefix_chars = prefix.chars();
		for (index, expected) in prefix_chars.by_ref().enumerate() {
			match rest.get(index) {
				Some(actual) if *actual == expected => {},
				_ => return false,
			}
		}
		true
	}

	fn origin_at(&self, start_pos: usize, start_line: usize, start_column: usize) -> Origin {
		Origin::new(self.file.clone(), start_line, start_column, start_pos, self.pos)
	}

	/// Advances past `count` characters, tracking line/column. Line continuations (`\` followed
	/// immediately by a newline) are handled by the caller before this is invoked, since they
	/// join logical lines without producing any token at all.
	fn advance(&mut self, count: usize) {
		for _ in 0..count {
			let Some(char) = self.text.get(self.pos) else { break };
			if *char == '\n' {
				self.line += 1;
				self.column = 1;
			} else {
				self.column += 1;
			}
			self.pos += 1;
		}
	}
}

/// Scans a byte/char buffer (plus any `#include`d buffers spliced in along the way) into a token
/// stream. Implements `Iterator<Item = anyhow::Result<Token>>` so the preprocessor can drive it
/// lazily rather than materializing the whole token stream up front.
pub struct Tokenizer {
	stack: Vec<SourceFrame>,
	include_search_path: Vec<PathBuf>,
}

impl Tokenizer {
	#[must_use]
	pub fn new(source: &str, filename: &str, include_search_path: Vec<PathBuf>) -> Self {
		Self { stack: vec![SourceFrame::new(Rc::from(filename), source)], include_search_path }
	}

	/// Resolves `header` against the include search path, preferring the current file's own
	/// directory for `#include "..."` (non-system) headers, matching ordinary C search order.
	#[must_use]
	pub fn resolve_include(&self, header: &str, is_system: bool) -> Option<PathBuf> {
		if !is_system {
			if let Some(current) = self.stack.last() {
				if let Some(parent) = Path::new(current.file.as_ref()).parent() {
					let candidate = parent.join(header);
					if candidate.is_file() {
						return Some(candidate);
					}
				}
			}
		}
		self.include_search_path.iter().map(|dir| dir.join(header)).find(|candidate| candidate.is_file())
	}

	/// Splices a new file in as the active scan buffer. The frame it pushed over resumes,
	/// untouched, once this file reaches EOF.
	pub fn push_source(&mut self, path: &Path) -> anyhow::Result<()> {
		let text = std::fs::read_to_string(path).map_err(|error| anyhow::anyhow!("{error}\n\twhile reading {}", path.display()))?;
		self.stack.push(SourceFrame::new(Rc::from(path.to_string_lossy().as_ref()), &text));
		Ok(())
	}

	/// Rewrites the current frame's notion of file/line, for `#line N "file"` directives (spec
	/// §4.2).
	pub fn set_line_origin(&mut self, line: usize, file: Option<String>) {
		if let Some(frame) = self.stack.last_mut() {
			frame.line = line;
			if let Some(file) = file {
				frame.file = Rc::from(file.as_str());
			}
		}
	}

	#[must_use]
	pub fn current_file(&self) -> Rc<str> {
		self.stack.last().map_or_else(|| Rc::from(""), |frame| frame.file.clone())
	}

	/// Pulls the next raw token, recursing into/out of `#include` frames transparently. Returns
	/// `Ok(None)` only once every frame on the stack is exhausted.
	pub fn next_token(&mut self) -> anyhow::Result<Option<Token>> {
		loop {
			let Some(frame) = self.stack.last_mut() else { return Ok(None) };
			if frame.pos >= frame.text.len() {
				if self.stack.len() == 1 {
					return Ok(None);
				}
				self.stack.pop();
				continue;
			}
			if let Some(token) = scan_one(frame)? {
				return Ok(Some(token));
			}
			// `scan_one` returned `None` for skipped whitespace/comments; loop to scan the next.
		}
	}
}

impl Iterator for Tokenizer {
	type Item = anyhow::Result<Token>;

	fn next(&mut self) -> Option<Self::Item> {
		self.next_token().transpose()
	}
}

/// Scans exactly one token's worth of input from `frame`, or `None` if what was consumed was
/// whitespace/a comment (the caller loops around for the next real token). Recognizes, in
/// precedence order: whitespace/line-continuation, comments, pragmas, char/string literals,
/// numeric primitives, identifiers, operators.
fn scan_one(frame: &mut SourceFrame) -> anyhow::Result<Option<Token>> {
	let start_pos = frame.pos;
	let start_line = frame.line;
	let start_column = frame.column;
	let rest = frame.rest();
	let first = rest[0];

	// Line continuation: backslash immediately followed by a newline joins the two physical
	// lines into one logical line and produces no token at all.
	if first == '\\' && rest.get(1) == Some(&'\n') {
		frame.advance(2);
		return Ok(None);
	}

	if first == '\n' {
		frame.advance(1);
		return Ok(Some(Token::new(TokenKind::Newline, frame.origin_at(start_pos, start_line, start_column))));
	}

	if first.is_whitespace() {
		frame.advance(1);
		return Ok(None);
	}

	if first == '/' && rest.get(1) == Some(&'/') {
		let length = rest.iter().take_while(|char| **char != '\n').count();
		frame.advance(length);
		return Ok(None);
	}

	if first == '/' && rest.get(1) == Some(&'*') {
		let mut length = 2;
		loop {
			match (rest.get(length), rest.get(length + 1)) {
				(Some('*'), Some('/')) => {
					length += 2;
					break;
				},
				(Some(_), _) => length += 1,
				(None, _) => {
					return Err(TranslateError::Unterminated { origin: frame.origin_at(start_pos, start_line, start_column), what: "block comment" }.into());
				},
			}
		}
		frame.advance(length);
		return Ok(None);
	}

	// `#`/`##` tokenize as ordinary operators (`Opcode::Hash`/`Opcode::HashHash`); whether a
	// leading `#` on a logical line starts a directive is decided by the preprocessor, which
	// tracks line-start position itself, not by the tokenizer.

	if first == '\'' {
		let length = scan_quoted(rest, '\'').ok_or(TranslateError::Unterminated { origin: frame.origin_at(start_pos, start_line, start_column), what: "character literal" })?;
		let lexeme: String = rest[..length].iter().collect();
		frame.advance(length);
		return Ok(Some(Token::new(TokenKind::Char(lexeme), frame.origin_at(start_pos, start_line, start_column))));
	}

	if first == '"' {
		let length = scan_quoted(rest, '"').ok_or(TranslateError::Unterminated { origin: frame.origin_at(start_pos, start_line, start_column), what: "string literal" })?;
		let lexeme: String = rest[..length].iter().collect();
		frame.advance(length);
		return Ok(Some(Token::new(TokenKind::Str { encoding: String::new(), lexeme }, frame.origin_at(start_pos, start_line, start_column))));
	}

	// Encoding-prefixed strings/chars: u8"...", u"...", U"...", L"...", L'...'
	for prefix in ["u8", "u", "U", "L"] {
		if rest.starts_with_chars(prefix) {
			let after = &rest[prefix.len()..];
			if matches!(after.first(), Some('"') | Some('\'')) {
				let quote = after[0];
				let length = scan_quoted(after, quote).ok_or(TranslateError::Unterminated { origin: frame.origin_at(start_pos, start_line, start_column), what: "string literal" })?;
				let lexeme: String = after[..length].iter().collect();
				frame.advance(prefix.len() + length);
				let origin = frame.origin_at(start_pos, start_line, start_column);
				return Ok(Some(if quote == '"' {
					Token::new(TokenKind::Str { encoding: prefix.to_owned(), lexeme }, origin)
				} else {
					Token::new(TokenKind::Char(format!("{prefix}{lexeme}")), origin)
				}));
			}
		}
	}

	if first.is_ascii_digit() || (first == '.' && rest.get(1).is_some_and(char::is_ascii_digit)) {
		return scan_number(frame, start_pos, start_line, start_column).map(Some);
	}

	if first.is_alphabetic() || first == '_' {
		let length = rest.iter().take_while(|char| char.is_alphanumeric() || **char == '_').count();
		let text: String = rest[..length].iter().collect();
		frame.advance(length);
		return Ok(Some(Token::new(TokenKind::Identifier(text), frame.origin_at(start_pos, start_line, start_column))));
	}

	// OKL tags (`@outer0`, `@kernel`, `@shared`, ...) are lexed as a single identifier including
	// the leading `@` — they act as contextual keywords, never separated from their name by
	// whitespace, and nothing else in this dialect's grammar uses a bare `@`.
	if first == '@' && rest.get(1).is_some_and(|char| char.is_alphabetic() || *char == '_') {
		let length = 1 + rest[1..].iter().take_while(|char| char.is_alphanumeric() || **char == '_').count();
		let text: String = rest[..length].iter().collect();
		frame.advance(length);
		return Ok(Some(Token::new(TokenKind::Identifier(text), frame.origin_at(start_pos, start_line, start_column))));
	}

	let text: String = rest.iter().collect();
	if let Some(entry) = operator::match_operator(&text) {
		frame.advance(entry.lexeme.chars().count());
		return Ok(Some(Token::new(TokenKind::Operator(entry.opcode), frame.origin_at(start_pos, start_line, start_column))));
	}

	Err(TranslateError::StrayByte { origin: frame.origin_at(start_pos, start_line, start_column), byte: first as u8 }.into())
}

trait CharsExt {
	fn starts_with_chars(&self, prefix: &str) -> bool;
}

impl CharsExt for &[char] {
	fn starts_with_chars(&self, prefix: &str) -> bool {
		prefix.chars().enumerate().all(|(index, expected)| self.get(index) == Some(&expected))
	}
}

/// Scans a quoted literal (char or string) starting at `rest[0] == quote`, honoring backslash
/// escapes, and returns the total length of the literal including both quote characters, or
/// `None` if the quote never closes before EOF/newline.
fn scan_quoted(rest: &[char], quote: char) -> Option<usize> {
	let mut index = 1;
	while let Some(char) = rest.get(index) {
		match char {
			'\\' => index += 2,
			char if *char == quote => return Some(index + 1),
			'\n' => return None,
			_ => index += 1,
		}
	}
	None
}

fn scan_number(frame: &mut SourceFrame, start_pos: usize, start_line: usize, start_column: usize) -> anyhow::Result<Token> {
	let rest = frame.rest();
	let mut index = 0;
	let is_hex = rest.starts_with_chars("0x") || rest.starts_with_chars("0X");
	if is_hex {
		index = 2;
		index += rest[index..].iter().take_while(|char| char.is_ascii_hexdigit()).count();
	} else {
		index += rest[index..].iter().take_while(|char| char.is_ascii_digit()).count();
	}

	let mut is_float = false;
	if !is_hex && rest.get(index) == Some(&'.') {
		is_float = true;
		index += 1;
		index += rest[index..].iter().take_while(|char| char.is_ascii_digit()).count();
	}
	if !is_hex && matches!(rest.get(index), Some('e') | Some('E')) {
		is_float = true;
		let mut look = index + 1;
		if matches!(rest.get(look), Some('+') | Some('-')) {
			look += 1;
		}
		let exponent_digits = rest[look..].iter().take_while(|char| char.is_ascii_digit()).count();
		if exponent_digits > 0 {
			index = look + exponent_digits;
		}
	}

	let digits_end = index;
	let mut suffix = NumericSuffix::None;
	let mut suffix_len = 0;
	let suffix_text: String = rest[index..].iter().take_while(|char| char.is_alphabetic()).collect();
	match suffix_text.to_lowercase().as_str() {
		"" => {},
		"l" if is_float => suffix = NumericSuffix::LongDouble,
		"u" => suffix = NumericSuffix::Unsigned,
		"l" => suffix = NumericSuffix::Long,
		"ul" | "lu" => suffix = NumericSuffix::UnsignedLong,
		"ll" => suffix = NumericSuffix::LongLong,
		"ull" | "llu" => suffix = NumericSuffix::UnsignedLongLong,
		"f" => {
			suffix = NumericSuffix::Float;
			is_float = true;
		},
		other => {
			return Err(TranslateError::InvalidNumericSuffix { origin: frame.origin_at(start_pos, start_line, start_column), lexeme: other.to_owned() }.into());
		},
	}
	if !suffix_text.is_empty() {
		suffix_len = suffix_text.chars().count();
	}

	let total_len = digits_end + suffix_len;
	let text: String = rest[..total_len].iter().collect();
	let digits: String = rest[..digits_end].iter().collect();
	frame.advance(total_len);
	let origin = frame.origin_at(start_pos, start_line, start_column);

	let kind = if is_float {
		TokenKind::Primitive(PrimitiveValue::Float { value: digits.parse().unwrap_or(0.0), text, suffix })
	} else if is_hex {
		let value = i64::from_str_radix(digits.trim_start_matches("0x").trim_start_matches("0X"), 16).unwrap_or(0);
		TokenKind::Primitive(PrimitiveValue::Int { value, text, suffix })
	} else {
		TokenKind::Primitive(PrimitiveValue::Int { value: digits.parse().unwrap_or(0), text, suffix })
	};
	Ok(Token::new(kind, origin))
}

/// Convenience entry point for callers (tests, the preprocessor's `#if` pre-expansion) that just
/// want every token of a self-contained buffer with no `#include` support.
pub fn tokenize(source: &str, filename: &str) -> anyhow::Result<Vec<Token>> {
	Tokenizer::new(source, filename, Vec::new()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn float_literal_with_l_suffix_is_long_double_not_long() {
		let tokens = tokenize("1.0L;\n", "test.c").expect("tokenize");
		let TokenKind::Primitive(PrimitiveValue::Float { suffix, .. }) = &tokens[0].kind else {
			panic!("expected a float primitive, got {:?}", tokens[0].kind);
		};
		assert_eq!(*suffix, NumericSuffix::LongDouble);
	}

	#[test]
	fn int_literal_with_l_suffix_is_long() {
		let tokens = tokenize("1L;\n", "test.c").expect("tokenize");
		let TokenKind::Primitive(PrimitiveValue::Int { suffix, .. }) = &tokens[0].kind else {
			panic!("expected an int primitive, got {:?}", tokens[0].kind);
		};
		assert_eq!(*suffix, NumericSuffix::Long);
	}
}
