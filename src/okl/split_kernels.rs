use std::collections::HashSet;

use crate::expr::ExprKind;
use crate::stmt::{OklForKind, Program, StmtId, StmtKind};

use super::{DimBounds, KernelSummary};

/// Pass 9: fissions a kernel whose body contains more than one `@outer` nest into N
/// nested kernels (one per nest), replacing the original function with a launcher that calls each
/// in sequence. Returns a per-kernel summary, one entry per
/// original top-level kernel (native kernels included, with an empty `dims` list and a
/// `nested_kernel_count` of one — they never fission).
pub fn run(program: &mut Program) -> Vec<KernelSummary> {
	let mut taken_names: HashSet<String> = program.top_level.iter().map(|&id| function_name(program, id)).collect();
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id)).collect();

	let mut summaries = Vec::new();
	for kernel in kernels {
		summaries.push(split_one(program, kernel, &mut taken_names));
	}
	summaries
}

fn function_name(program: &Program, id: StmtId) -> String {
	match &program.get(id).kind {
		StmtKind::FunctionDefinition { name, .. } | StmtKind::FunctionPrototype { name, .. } => name.clone(),
		_ => String::new(),
	}
}

fn split_one(program: &mut Program, kernel: StmtId, taken_names: &mut HashSet<String>) -> KernelSummary {
	let base_name = function_name(program, kernel);
	if super::is_native(program, kernel) {
		return KernelSummary { base_name, nested_kernel_count: 1, dims: Vec::new() };
	}

	let StmtKind::FunctionDefinition { qualifiers, return_type, params, body, .. } = program.get(kernel).kind.clone() else {
		return KernelSummary { base_name, nested_kernel_count: 1, dims: Vec::new() };
	};

	let groups = outer_groups(program, &body);
	if groups.len() <= 1 {
		let dims = groups.first().map(|group| nest_dims(program, group.outer)).unwrap_or_default();
		return KernelSummary { base_name, nested_kernel_count: 1, dims };
	}

	let preamble: Vec<StmtId> = body.iter().copied().take(groups[0].marker_index).collect();
	let mut dims = Vec::new();
	let mut launcher_calls = Vec::new();
	let origin = program.get(kernel).origin.clone();

	for group in &groups {
		let nested_name = unique_name(&base_name, taken_names);
		let mut nested_body = preamble.clone();
		nested_body.push(group.marker);
		nested_body.push(group.outer);
		let nested_id = program.push(StmtKind::FunctionDefinition { qualifiers: qualifiers.clone(), return_type: return_type.clone(), name: nested_name.clone(), params: params.clone(), body: nested_body }, origin.clone(), None);
		program.get_mut(nested_id).tags.push("@kernel".to_owned());
		reparent_children(program, nested_id);
		dims.extend(nest_dims(program, group.outer));

		let args: Vec<_> = params.iter().map(|param| program.exprs.push(ExprKind::Identifier(param.name.clone()), origin.clone())).collect();
		let callee = program.exprs.push(ExprKind::Identifier(nested_name), origin.clone());
		let call = program.exprs.push(ExprKind::Call { callee, args }, origin.clone());
		launcher_calls.push(program.push(StmtKind::Update { expr: call }, origin.clone(), Some(kernel)));

		let position = program.top_level.iter().position(|&id| id == kernel).map_or(program.top_level.len(), |index| index + 1);
		program.top_level.insert(position, nested_id);
	}

	program.get_mut(kernel).kind = StmtKind::FunctionDefinition { qualifiers, return_type, name: base_name.clone(), params, body: launcher_calls };
	reparent_children(program, kernel);

	KernelSummary { base_name, nested_kernel_count: groups.len(), dims }
}

struct OuterGroup {
	marker_index: usize,
	marker: StmtId,
	outer: StmtId,
}

/// Finds each `(occaParallelFor, occaOuterFor)` pair `add_parallel_fors` leaves as adjacent
/// top-level entries in the kernel body.
fn outer_groups(program: &Program, body: &[StmtId]) -> Vec<OuterGroup> {
	let mut groups = Vec::new();
	for index in 0..body.len().saturating_sub(1) {
		let (marker, outer) = (body[index], body[index + 1]);
		if matches!(&program.get(marker).kind, StmtKind::ParallelForMarker { .. }) && matches!(&program.get(outer).kind, StmtKind::OklFor { kind: OklForKind::Outer, .. }) {
			groups.push(OuterGroup { marker_index: index, marker, outer });
		}
	}
	groups
}

fn nest_dims(program: &Program, outer: StmtId) -> Vec<DimBounds> {
	let mut dims = Vec::new();
	let mut cursor = Some(outer);
	while let Some(current) = cursor {
		let StmtKind::OklFor { kind, dim, body, .. } = &program.get(current).kind else { break };
		dims.push(DimBounds { dim: *dim, kind: *kind });
		cursor = body.iter().copied().find(|&id| matches!(&program.get(id).kind, StmtKind::OklFor { kind: OklForKind::Inner | OklForKind::Tile, .. }));
	}
	dims
}

fn unique_name(base: &str, taken_names: &mut HashSet<String>) -> String {
	let mut index = 0;
	loop {
		let candidate = format!("{base}{index}");
		if !taken_names.contains(&candidate) {
			taken_names.insert(candidate.clone());
			return candidate;
		}
		index += 1;
	}
}

fn reparent_children(program: &mut Program, parent: StmtId) {
	for child in program.children_of(parent) {
		program.get_mut(child).parent = Some(parent);
	}
}
