use std::rc::Rc;

/// A location in a source file. Attached to every token and, transitively, to every AST node
/// produced downstream. Created once by the tokenizer and copied (never mutated) through every
/// later phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
	pub file: Rc<str>,
	pub line: usize,
	pub column: usize,
	pub byte_start: usize,
	pub byte_end: usize,
}

impl Origin {
	#[must_use]
	pub fn new(file: Rc<str>, line: usize, column: usize, byte_start: usize, byte_end: usize) -> Self {
		Self { file, line, column, byte_start, byte_end }
	}

	/// A zero-width origin used for synthesized nodes that have no direct source counterpart
	/// (e.g. the `occaParallelFor{N}` marker statements inserted by the OKL pipeline). Synthesized
	/// nodes borrow the origin of whatever statement they were synthesized next to, so this is
	/// only a fallback for the rare case there's nothing to borrow from.
	#[must_use]
	pub fn synthetic(file: Rc<str>) -> Self {
		Self { file, line: 0, column: 0, byte_start: 0, byte_end: 0 }
	}
}

impl std::fmt::Display for Origin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}:{}", self.file, self.line, self.column)
	}
}
