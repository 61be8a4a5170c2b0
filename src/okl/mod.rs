pub mod add_parallel_fors;
pub mod fix_loop_order;
pub mod float_shared;
pub mod label_native;
pub mod lower_cuda_names;
pub mod mark_kernels;
pub mod qualify_kernel_args;
pub mod setup_ok_for;
pub mod split_kernels;

use crate::config::Options;
use crate::diagnostics::DiagnosticSink;
use crate::stmt::Program;

/// A kernel's post-fission summary.
#[derive(Debug, Clone)]
pub struct DimBounds {
	pub dim: usize,
	pub kind: crate::stmt::OklForKind,
}

#[derive(Debug, Clone)]
pub struct KernelSummary {
	pub base_name: String,
	pub nested_kernel_count: usize,
	pub dims: Vec<DimBounds>,
}

/// Runs the nine OKL transform passes in their fixed order — each pass takes and returns the
/// whole program so later passes can assume every earlier invariant holds.
pub fn run_pipeline(program: &mut Program, options: &Options, sink: &mut dyn DiagnosticSink) -> Vec<KernelSummary> {
	trace_pass("mark_kernels");
	mark_kernels::run(program);
	trace_pass("label_native");
	label_native::run(program);
	trace_pass("lower_cuda_names");
	lower_cuda_names::run(program);
	trace_pass("setup_ok_for");
	setup_ok_for::run(program, sink);
	trace_pass("fix_loop_order");
	fix_loop_order::run(program, options, sink);
	trace_pass("add_parallel_fors");
	add_parallel_fors::run(program);
	trace_pass("qualify_kernel_args");
	qualify_kernel_args::run(program);
	trace_pass("float_shared");
	float_shared::run(program);
	trace_pass("split_kernels");
	split_kernels::run(program)
}

/// Logs pass entry at debug level, rendering the pass's `snake_case` function name in
/// `Title Case` for readability.
fn trace_pass(name: &str) {
	use convert_case::Casing as _;
	log::debug!("running OKL pass: {}", name.to_case(convert_case::Case::Title));
}

/// Whether `stmt_id` (a `FunctionDefinition`) carries the `@kernel` tag.
#[must_use]
pub(crate) fn is_kernel(program: &Program, stmt_id: crate::stmt::StmtId) -> bool {
	program.get(stmt_id).tags.iter().any(|tag| tag == "@kernel")
}

/// Whether `stmt_id` carries the `native` tag `label_native` attaches — later passes skip
/// these bodies entirely.
#[must_use]
pub(crate) fn is_native(program: &Program, stmt_id: crate::stmt::StmtId) -> bool {
	program.get(stmt_id).tags.iter().any(|tag| tag == "native")
}

/// Parses the dimension suffix off an OKL for-tag (`@outer0` → `(Outer, 0)`, `@tile` → `(Tile, 0)`
/// — the tile tag has no digit suffix).
#[must_use]
pub(crate) fn parse_tag(tag: &str) -> Option<(crate::stmt::OklForKind, usize)> {
	use crate::stmt::OklForKind;
	if let Some(digits) = tag.strip_prefix("@outer") {
		return Some((OklForKind::Outer, digits.parse().unwrap_or(0)));
	}
	if let Some(digits) = tag.strip_prefix("@inner") {
		return Some((OklForKind::Inner, digits.parse().unwrap_or(0)));
	}
	if tag == "@tile" {
		return Some((OklForKind::Tile, 0));
	}
	None
}
