/// The opcode set, one variant per distinct operator lexeme recognized by the tokenizer. This is
/// a table-driven descriptor: the opcode identifies *which* operator, and `OperatorEntry`
/// (looked up via [`Opcode::entry`]) carries everything else — lexeme, arity, associativity,
/// precedence, and a set of disjoint-but-OR-able category flags (`leftUnary, rightUnary, binary,
/// ternary, assignment, pairStart, pairEnd, comma, scope, member, increment, decrement, plus,
/// minus, asterisk, ampersand, ambiguous`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumIter)]
pub enum Opcode {
	Plus,
	Minus,
	Asterisk,
	Ampersand,
	Increment,
	Decrement,
	Slash,
	Percent,
	Caret,
	Pipe,
	Tilde,
	Bang,
	Shl,
	Shr,
	Lt,
	Gt,
	Le,
	Ge,
	EqEq,
	Ne,
	LogicalAnd,
	LogicalOr,
	Assign,
	PlusEq,
	MinusEq,
	StarEq,
	SlashEq,
	PercentEq,
	AndEq,
	OrEq,
	XorEq,
	ShlEq,
	ShrEq,
	Comma,
	Question,
	Colon,
	Scope,
	Dot,
	Arrow,
	DotStar,
	ArrowStar,
	LParen,
	RParen,
	LBracket,
	RBracket,
	LBrace,
	RBrace,
	CudaLaunchOpen,
	CudaLaunchClose,
	Semicolon,
	/// The stringize operator, `#`. Only meaningful inside a function-like macro's replacement
	/// list; everywhere else — including at the head of a preprocessor directive line — it's the
	/// preprocessor, not the tokenizer, that decides what a leading `#` means.
	Hash,
	/// The token-paste operator, `##`.
	HashHash,
}

/// The operator category flags, as independent booleans rather than a packed bitmask — this
/// crate never needs to test more than one or two flags at a time, so a bitmask buys nothing but
/// ceremony over a plain struct of `bool`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpFlags {
	pub left_unary: bool,
	pub right_unary: bool,
	pub binary: bool,
	pub ternary: bool,
	pub assignment: bool,
	pub pair_start: bool,
	pub pair_end: bool,
	pub comma: bool,
	pub scope: bool,
	pub member: bool,
	pub increment: bool,
	pub decrement: bool,
	pub plus: bool,
	pub minus: bool,
	pub asterisk: bool,
	pub ampersand: bool,
	pub ambiguous: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorEntry {
	pub opcode: Opcode,
	pub lexeme: &'static str,
	pub flags: OpFlags,
	/// Higher binds tighter. Unused for unary-only operators (they bind by parser structure, not
	/// by precedence comparison).
	pub precedence: u8,
	pub right_associative: bool,
}

macro_rules! op {
	($opcode:ident, $lexeme:literal, $precedence:expr, $right_assoc:expr, { $($flag:ident),* $(,)? }) => {
		OperatorEntry {
			opcode: Opcode::$opcode,
			lexeme: $lexeme,
			precedence: $precedence,
			right_associative: $right_assoc,
			flags: OpFlags { $($flag: true,)* ..OpFlags { left_unary: false, right_unary: false, binary: false, ternary: false, assignment: false, pair_start: false, pair_end: false, comma: false, scope: false, member: false, increment: false, decrement: false, plus: false, minus: false, asterisk: false, ampersand: false, ambiguous: false } },
		}
	};
}

/// The operator table proper. Longest-lexeme-first isn't required here (the tokenizer handles
/// longest-match separately in `lexer::scan_operator`); this table is consulted by opcode, not by
/// scanning, once the tokenizer has already decided which lexeme matched.
pub static OPERATOR_TABLE: &[OperatorEntry] = &[
	op!(Increment, "++", 15, false, { increment, left_unary, right_unary, ambiguous }),
	op!(Decrement, "--", 15, false, { decrement, left_unary, right_unary, ambiguous }),
	op!(Plus, "+", 12, false, { plus, binary, left_unary, ambiguous }),
	op!(Minus, "-", 12, false, { minus, binary, left_unary, ambiguous }),
	op!(Asterisk, "*", 13, false, { asterisk, binary, left_unary, ambiguous }),
	op!(Ampersand, "&", 8, false, { ampersand, binary, left_unary, ambiguous }),
	op!(Slash, "/", 13, false, { binary }),
	op!(Percent, "%", 13, false, { binary }),
	op!(Caret, "^", 7, false, { binary }),
	op!(Pipe, "|", 6, false, { binary }),
	op!(Tilde, "~", 15, false, { left_unary }),
	op!(Bang, "!", 15, false, { left_unary }),
	op!(Shl, "<<", 11, false, { binary }),
	op!(Shr, ">>", 11, false, { binary }),
	op!(Lt, "<", 10, false, { binary }),
	op!(Gt, ">", 10, false, { binary }),
	op!(Le, "<=", 10, false, { binary }),
	op!(Ge, ">=", 10, false, { binary }),
	op!(EqEq, "==", 9, false, { binary }),
	op!(Ne, "!=", 9, false, { binary }),
	op!(LogicalAnd, "&&", 5, false, { binary }),
	op!(LogicalOr, "||", 4, false, { binary }),
	op!(Assign, "=", 2, true, { binary, assignment }),
	op!(PlusEq, "+=", 2, true, { binary, assignment }),
	op!(MinusEq, "-=", 2, true, { binary, assignment }),
	op!(StarEq, "*=", 2, true, { binary, assignment }),
	op!(SlashEq, "/=", 2, true, { binary, assignment }),
	op!(PercentEq, "%=", 2, true, { binary, assignment }),
	op!(AndEq, "&=", 2, true, { binary, assignment }),
	op!(OrEq, "|=", 2, true, { binary, assignment }),
	op!(XorEq, "^=", 2, true, { binary, assignment }),
	op!(ShlEq, "<<=", 2, true, { binary, assignment }),
	op!(ShrEq, ">>=", 2, true, { binary, assignment }),
	op!(Comma, ",", 1, false, { comma, binary }),
	op!(Question, "?", 3, true, { ternary }),
	op!(Colon, ":", 3, true, { ternary }),
	op!(Scope, "::", 16, false, { scope, binary }),
	op!(Dot, ".", 16, false, { member, binary }),
	op!(Arrow, "->", 16, false, { member, binary }),
	op!(DotStar, ".*", 16, false, { member, binary }),
	op!(ArrowStar, "->*", 16, false, { member, binary }),
	op!(LParen, "(", 0, false, { pair_start }),
	op!(RParen, ")", 0, false, { pair_end }),
	op!(LBracket, "[", 0, false, { pair_start }),
	op!(RBracket, "]", 0, false, { pair_end }),
	op!(LBrace, "{", 0, false, { pair_start }),
	op!(RBrace, "}", 0, false, { pair_end }),
	op!(CudaLaunchOpen, "<<<", 0, false, { pair_start }),
	op!(CudaLaunchClose, ">>>", 0, false, { pair_end }),
	op!(Semicolon, ";", 0, false, {}),
	op!(HashHash, "##", 0, false, {}),
	op!(Hash, "#", 0, false, {}),
];

impl Opcode {
	#[must_use]
	pub fn entry(self) -> &'static OperatorEntry {
		OPERATOR_TABLE.iter().find(|entry| entry.opcode == self).expect("every Opcode variant has a table entry")
	}

	#[must_use]
	pub fn lexeme(self) -> &'static str {
		self.entry().lexeme
	}

	#[must_use]
	pub fn flags(self) -> OpFlags {
		self.entry().flags
	}

	/// Returns the `Opcode` whose `pairEnd` mirrors this `pairStart`, or vice versa. Used by the
	/// expression parser's pair-matching and by the emitter's bracket spacing rules.
	#[must_use]
	pub fn mirror(self) -> Option<Opcode> {
		Some(match self {
			Self::LParen => Self::RParen,
			Self::RParen => Self::LParen,
			Self::LBracket => Self::RBracket,
			Self::RBracket => Self::LBracket,
			Self::LBrace => Self::RBrace,
			Self::RBrace => Self::LBrace,
			Self::CudaLaunchOpen => Self::CudaLaunchClose,
			Self::CudaLaunchClose => Self::CudaLaunchOpen,
			_ => return None,
		})
	}
}

/// Longest-match lookup against raw source text, used by the tokenizer. Operators are tried
/// longest-lexeme-first so that e.g. `<<=` is preferred over `<<` over `<`.
#[must_use]
pub fn match_operator(text: &str) -> Option<&'static OperatorEntry> {
	OPERATOR_TABLE.iter().filter(|entry| text.starts_with(entry.lexeme)).max_by_key(|entry| entry.lexeme.len())
}
