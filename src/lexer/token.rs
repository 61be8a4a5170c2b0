use crate::lexer::operator::Opcode;
use crate::origin::Origin;

/// A numeric literal's suffix, as written in source (`1u`, `2.0f`, `3L`, ...). Only tracked well
/// enough to round-trip the suffix on emission and to tell integers from floats — the translator
/// doesn't evaluate arbitrary constant expressions beyond the preprocessor's needs, so no further
/// numeric semantics are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericSuffix {
	None,
	Unsigned,
	Long,
	UnsignedLong,
	LongLong,
	UnsignedLongLong,
	Float,
	/// Explicit `double` suffix doesn't exist in C, but `f`/`F`/`l`/`L` on a literal containing a
	/// `.` or exponent does, and is tracked the same way as the integer suffixes above.
	LongDouble,
}

/// A primitive literal's value, kept as source text plus a parsed numeric payload. The parsed
/// payload backs constant-expression evaluation; the source text backs exact-text emission so
/// re-translating an already-translated buffer is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
	Int { text: String, value: i64, suffix: NumericSuffix },
	Float { text: String, value: f64, suffix: NumericSuffix },
}

impl PrimitiveValue {
	#[must_use]
	pub fn text(&self) -> &str {
		match self {
			Self::Int { text, .. } | Self::Float { text, .. } => text,
		}
	}
}

/// A token, tagged as one of `{identifier, primitive, char, string, operator, newline, pragma,
/// header}`. `Whitespace`/`LineComment`/`BlockComment` are consumed during scanning and never
/// reach the returned stream except where they cause a `Newline` to be emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
	Identifier(String),
	Primitive(PrimitiveValue),
	Char(String),
	/// `encoding` is the literal prefix (`""`, `u8`, `u`, `U`, `L`); `lexeme` is the quoted text
	/// including both quote characters, exactly as on the wire.
	Str { encoding: String, lexeme: String },
	Operator(Opcode),
	Newline,
	Pragma(String),
	Header { path: String, is_system: bool },
}

#[derive(Debug, Clone)]
pub struct Token {
	pub kind: TokenKind,
	pub origin: Origin,
}

impl Token {
	#[must_use]
	pub fn new(kind: TokenKind, origin: Origin) -> Self {
		Self { kind, origin }
	}

	/// The token's lexeme as it should be re-emitted verbatim. Operators look their lexeme up in
	/// the operator table; every other variant carries its own text directly.
	#[must_use]
	pub fn lexeme(&self) -> String {
		match &self.kind {
			TokenKind::Identifier(name) => name.clone(),
			TokenKind::Primitive(value) => value.text().to_owned(),
			TokenKind::Char(lexeme) => lexeme.clone(),
			TokenKind::Str { encoding, lexeme } => format!("{encoding}{lexeme}"),
			TokenKind::Operator(opcode) => opcode.lexeme().to_owned(),
			TokenKind::Newline => "\n".to_owned(),
			TokenKind::Pragma(body) => format!("#pragma {body}"),
			TokenKind::Header { path, is_system } => {
				if *is_system {
					format!("<{path}>")
				} else {
					format!("\"{path}\"")
				}
			},
		}
	}

	#[must_use]
	pub const fn is_identifier(&self) -> bool {
		matches!(self.kind, TokenKind::Identifier(_))
	}

	#[must_use]
	pub fn identifier_name(&self) -> Option<&str> {
		match &self.kind {
			TokenKind::Identifier(name) => Some(name),
			_ => None,
		}
	}

	#[must_use]
	pub fn opcode(&self) -> Option<Opcode> {
		match self.kind {
			TokenKind::Operator(opcode) => Some(opcode),
			_ => None,
		}
	}
}
