use std::path::PathBuf;

use crate::config::Options;
use crate::diagnostics::DiagnosticSink;
use crate::lexer::{Token, TokenKind, Tokenizer};
use crate::okl::{self, KernelSummary};
use crate::preprocessor::Preprocessor;
use crate::resolve;
use crate::stmt;
use crate::{emit, origin};

/// Inputs to a single translation run. Owns nothing across calls — tokenizer, preprocessor,
/// and every AST arena are built fresh each time and torn down on return; there's no
/// suspension or cancellation point to model.
pub struct TranslateInput<'a> {
	pub source: &'a str,
	pub filename: String,
	pub include_search_path: Vec<PathBuf>,
	pub options: Options,
}

#[derive(Debug, Clone)]
pub struct TranslateOutput {
	pub text: String,
	pub included_files: Vec<PathBuf>,
	pub kernels: Vec<KernelSummary>,
}

/// Runs the full pipeline — tokenize, preprocess, parse, resolve, OKL-transform, emit — and
/// returns `Err` (with nothing emitted) iff `sink` has recorded at least one error by the end.
/// A run that only produced warnings still succeeds.
pub fn translate(input: TranslateInput<'_>, sink: &mut dyn DiagnosticSink) -> anyhow::Result<TranslateOutput> {
	let tokenizer = Tokenizer::new(input.source, &input.filename, input.include_search_path);
	let mut preprocessor = Preprocessor::new(tokenizer, input.options.clone(), sink);

	let mut tokens = Vec::new();
	for token in &mut preprocessor {
		match token {
			Ok(token) if matches!(token.kind, TokenKind::Newline) => {},
			Ok(token) => tokens.push(token),
			Err(error) => return Err(error),
		}
	}
	let included_files = preprocessor.included_files().to_vec();

	let mut program = stmt::parse_program(&tokens, sink);
	resolve::resolve(&mut program, sink);
	let kernels = okl::run_pipeline(&mut program, &input.options, sink);

	if sink.error_count() > 0 {
		anyhow::bail!("translation failed with {} error(s)", sink.error_count());
	}

	let text = emit::emit(&program);
	Ok(TranslateOutput { text, included_files, kernels })
}

/// A convenience wrapper for callers (the CLI, tests) that just want a self-contained buffer
/// translated with no includes and the default `Options`, without needing to pull the pieces above
/// together themselves.
pub fn translate_str(source: &str, filename: &str, sink: &mut dyn DiagnosticSink) -> anyhow::Result<TranslateOutput> {
	translate(TranslateInput { source, filename: filename.to_owned(), include_search_path: Vec::new(), options: Options::default() }, sink)
}

/// Re-exported for callers that only need the origin type (e.g. to construct their own
/// `DiagnosticSink` impl without depending on `crate::origin` directly).
pub use origin::Origin as SourceOrigin;

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diagnostics::CollectingSink;

	#[test]
	fn translates_a_trivial_kernel() {
		let source = "\
@kernel void add(float *a, float *b, float *c, int entries) {\n\
  for (int i = 0; i < entries; ++i; @outer0) {\n\
    c[i] = a[i] + b[i];\n\
  }\n\
}\n\
";
		let mut sink = CollectingSink::new();
		let result = translate_str(source, "add.okl", &mut sink);
		assert!(result.is_ok(), "unexpected failure: {:?}", sink.diagnostics);
		let output = result.unwrap();
		assert!(output.text.contains("occaOuterFor0"));
		assert!(output.text.contains("occaParallelFor0"));
		assert_eq!(output.kernels.len(), 1);
		assert_eq!(output.kernels[0].nested_kernel_count, 1);
	}

	#[test]
	fn reports_malformed_okl_loop_without_panicking() {
		let source = "\
@kernel void broken(float *a) {\n\
  for (;;; @outer0) {\n\
    a[0] = 1;\n\
  }\n\
}\n\
";
		let mut sink = CollectingSink::new();
		let result = translate_str(source, "broken.okl", &mut sink);
		assert!(result.is_err());
		assert!(sink.error_count() > 0);
	}
}
