//! Black-box integration tests driving `occa_translate::translate` end to end, covering the
//! concrete translation scenarios and the invariants the pipeline as a whole must uphold.

use occa_translate::diagnostics::{CollectingSink, DiagnosticSink as _};
use occa_translate::lexer::{tokenize, TokenKind};
use occa_translate::translate_str;

/// Retokenizes `text` and renders each non-whitespace token's lexeme, so two buffers that differ
/// only in emitter spacing compare equal.
fn token_lexemes(text: &str) -> Vec<String> {
	tokenize(text, "retokenize.c").expect("retokenizing emitted output must succeed").into_iter().filter(|token| !matches!(token.kind, TokenKind::Newline)).map(|token| token.lexeme()).collect()
}

fn translate_ok(source: &str) -> String {
	let mut sink = CollectingSink::new();
	let output = translate_str(source, "test.okl", &mut sink).unwrap_or_else(|error| panic!("translation failed: {error}\n{:?}", sink.diagnostics));
	output.text
}

#[test]
fn object_like_macro_expands() {
	let text = translate_ok("#define N 3\nint a[N];\n");
	assert!(text.contains("int a[3];"), "{text}");
}

#[test]
fn conditional_takes_the_true_branch() {
	let text = translate_ok("#define A 1\n#if A+1==2\nint x;\n#else\nint y;\n#endif\n");
	assert!(text.contains("int x;"), "{text}");
	assert!(!text.contains("int y;"), "{text}");
}

#[test]
fn function_like_macro_stringizes_its_argument() {
	let text = translate_ok("#define S(x) #x\nconst char *p = S(ab c);\n");
	assert!(text.contains("\"ab c\""), "{text}");
	assert!(text.contains('*'), "declarator must keep its pointer star:\n{text}");
}

#[test]
fn plain_pointer_declaration_keeps_its_star() {
	let text = translate_ok("float *p = 0;\n");
	assert!(text.contains("float *p = 0;"), "{text}");
}

#[test]
fn okl_kernel_gets_qualified_args_and_a_parallel_for_marker() {
	let source = "\
@kernel void add(const int N, const float *a, const float *b, float *c){\n\
  for(int i=0;i<N;++i; @outer0){ c[i]=a[i]+b[i]; }\n\
}\n\
";
	let text = translate_ok(source);
	assert_eq!(text.matches("occaOuterFor0").count(), 1, "{text}");
	assert_eq!(text.matches("occaParallelFor0").count(), 1, "{text}");
	let parallel_pos = text.find("occaParallelFor0").expect("marker present");
	let outer_pos = text.find("occaOuterFor0").expect("outer present");
	assert!(parallel_pos < outer_pos, "parallel-for marker must precede the outer loop:\n{text}");
	assert!(text.contains("occaKernelInfoArg"), "{text}");
	assert!(text.contains("a") && text.contains("occaPointer"), "{text}");
	assert!(text.contains("occaVariable"), "{text}");
}

#[test]
fn multi_outer_fission_produces_a_launcher_and_two_nested_kernels() {
	let source = "\
@kernel void step(float *a, float *b){\n\
  for(int i=0;i<10;++i; @outer0){ a[i]=0; }\n\
  for(int j=0;j<10;++j; @outer0){ b[j]=0; }\n\
}\n\
";
	let mut sink = CollectingSink::new();
	let output = translate_str(source, "fission.okl", &mut sink).unwrap_or_else(|error| panic!("translation failed: {error}\n{:?}", sink.diagnostics));
	assert_eq!(output.kernels.len(), 1);
	assert_eq!(output.kernels[0].nested_kernel_count, 2);
	assert!(output.text.contains("step0"), "{}", output.text);
	assert!(output.text.contains("step1"), "{}", output.text);
}

#[test]
fn adjacent_inner_loops_without_a_barrier_warn_and_get_one_inserted() {
	let source = "\
@kernel void needs_barrier(float *a){\n\
  for(int o=0;o<1;++o; @outer0){\n\
    for(int i=0;i<4;++i; @inner0){ a[i] = 1; }\n\
    for(int i=0;i<4;++i; @inner0){ a[i] = 2; }\n\
  }\n\
}\n\
";
	let mut sink = CollectingSink::new();
	let output = translate_str(source, "barrier.okl", &mut sink).unwrap_or_else(|error| panic!("translation failed: {error}\n{:?}", sink.diagnostics));
	assert!(sink.warning_count() > 0, "expected a missing-barrier warning");
	assert!(output.text.contains("occaBarrier(occaLocalMemFence);"), "{}", output.text);
}

#[test]
fn plain_c_with_no_okl_tags_round_trips_token_for_token() {
	let source = "int main(void) {\n  int x = 1 + 2;\n  return x;\n}\n";
	let text = translate_ok(source);
	assert_eq!(token_lexemes(&text), token_lexemes(source));
}

#[test]
fn translation_is_idempotent_once_macros_are_gone() {
	// Once a buffer has no directives or OKL tags left, re-translating its own output is a
	// no-op — there's nothing left for any pipeline stage to rewrite.
	let source = "#define N 3\nint a[N];\nint total = a[0] + a[1] + a[2];\n";
	let once = translate_ok(source);
	let twice = translate_ok(&once);
	assert_eq!(once, twice);
}

#[test]
fn malformed_okl_loop_fails_the_whole_translation() {
	let source = "\
@kernel void broken(float *a){\n\
  for(;;;@outer0){ a[0] = 1; }\n\
}\n\
";
	let mut sink = CollectingSink::new();
	let result = translate_str(source, "broken.okl", &mut sink);
	assert!(result.is_err());
	assert!(sink.error_count() > 0);
}
