use crate::origin::Origin;

/// An error severity level. A `Warning` variant exists because several diagnostic classes
/// (missing-barrier inference, redefinition of a macro with a different body, extra tokens after
/// `#else`/`#endif`) need to surface without aborting translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Error,
	Warning,
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Error => write!(f, "error"),
			Self::Warning => write!(f, "warning"),
		}
	}
}

/// One `(severity, origin, message)` record, the shape every diagnostic sink emits.
#[derive(Debug, Clone)]
pub struct Diagnostic {
	pub severity: Severity,
	pub origin: Origin,
	pub message: String,
}

impl std::fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}: {}", self.origin, self.severity, self.message)
	}
}

/// Receives diagnostics as the pipeline runs. The translator never aborts the moment an error is
/// raised; it keeps going so a single run can surface every mistake in the source, and only fails
/// the overall `translate()` call once the error count is non-zero at the end.
pub trait DiagnosticSink {
	fn report(&mut self, diagnostic: Diagnostic);

	fn error_count(&self) -> usize;
	fn warning_count(&self) -> usize;

	fn error(&mut self, origin: Origin, message: impl Into<String>) {
		self.report(Diagnostic { severity: Severity::Error, origin, message: message.into() });
	}

	fn warning(&mut self, origin: Origin, message: impl Into<String>) {
		self.report(Diagnostic { severity: Severity::Warning, origin, message: message.into() });
	}
}

/// The default sink: collects every diagnostic in arrival order. Good enough for the CLI binary
/// and for tests; embedders with their own logging story can provide their own `DiagnosticSink`
/// impl instead (e.g. one that forwards to `log::warn!`/`log::error!`).
#[derive(Debug, Default)]
pub struct CollectingSink {
	pub diagnostics: Vec<Diagnostic>,
	errors: usize,
	warnings: usize,
}

impl CollectingSink {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}

impl DiagnosticSink for CollectingSink {
	fn report(&mut self, diagnostic: Diagnostic) {
		match diagnostic.severity {
			Severity::Error => self.errors += 1,
			Severity::Warning => self.warnings += 1,
		}
		self.diagnostics.push(diagnostic);
	}

	fn error_count(&self) -> usize {
		self.errors
	}

	fn warning_count(&self) -> usize {
		self.warnings
	}
}

/// Structured, origin-carrying errors raised at fixed points in the pipeline. These are the
/// "fatal" diagnostics (unterminated literal, operator-arity mismatch, unresolved identifier in a
/// transformable kernel, malformed OKL loop header): each is reported to the sink *and* returned
/// as an `anyhow::Error` so the caller that detected it can still bail out with `?`.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
	#[error("{origin}: unterminated {what}")]
	Unterminated { origin: Origin, what: &'static str },

	#[error("{origin}: invalid numeric suffix {lexeme:?}")]
	InvalidNumericSuffix { origin: Origin, lexeme: String },

	#[error("{origin}: stray byte {byte:#04x}")]
	StrayByte { origin: Origin, byte: u8 },

	#[error("{origin}: unexpected token {found}, expected {expected}")]
	UnexpectedToken { origin: Origin, found: String, expected: String },

	#[error("{origin}: ambiguous operator {lexeme:?}")]
	AmbiguousOperator { origin: Origin, lexeme: String },

	#[error("{origin}: operator {lexeme:?} requires {arity} operand(s), but only {available} were available")]
	OperatorArityMismatch { origin: Origin, lexeme: String, arity: usize, available: usize },

	#[error("{origin}: unbalanced {open:?} / {close:?}")]
	UnbalancedPair { origin: Origin, open: &'static str, close: &'static str },

	#[error("{origin}: malformed #{directive} directive: {reason}")]
	MalformedDirective { origin: Origin, directive: &'static str, reason: String },

	#[error("{origin}: unresolved identifier {name:?}")]
	UnresolvedIdentifier { origin: Origin, name: String },

	#[error("{origin}: malformed OKL loop: {reason}")]
	MalformedOklLoop { origin: Origin, reason: String },

	#[error("{origin}: #include could not locate {header:?}")]
	IncludeNotFound { origin: Origin, header: String },
}
