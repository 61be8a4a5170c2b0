use crate::expr::{ExprId, ExprKind};
use crate::stmt::Program;

/// Pass 3: rewrites `threadIdx.{x,y,z}` / `blockIdx.*` / `blockDim.*` / `gridDim.*`
/// member expressions to the backend-neutral `occaInnerId{N}` / `occaOuterId{N}` /
/// `occaInnerDim{N}` / `occaOuterDim{N}` identifiers, restricted to non-native kernel bodies (the
/// only place these CUDA names are meaningful).
pub fn run(program: &mut Program) {
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect();
	for kernel in kernels {
		for descendant in program.descendants(kernel) {
			let roots = crate::resolve::header_expr_roots(&program.get(descendant).kind);
			for root in roots {
				rewrite_subtree(program, root);
			}
		}
	}
}

fn rewrite_subtree(program: &mut Program, expr_id: ExprId) {
	let mut stack = vec![expr_id];
	while let Some(current) = stack.pop() {
		let kind = program.exprs.get(current).kind.clone();
		if let ExprKind::Member { base, name, .. } = &kind {
			if let ExprKind::Identifier(base_name) = &program.exprs.get(*base).kind {
				if let Some(replacement) = lowered_name(base_name, name) {
					program.exprs.get_mut(current).kind = ExprKind::Identifier(replacement);
					continue;
				}
			}
		}
		stack.extend(kind.child_ids());
	}
}

fn lowered_name(base: &str, member: &str) -> Option<String> {
	let dim = match member {
		"x" => 0,
		"y" => 1,
		"z" => 2,
		_ => return None,
	};
	let prefix = match base {
		"threadIdx" => "occaInnerId",
		"blockIdx" => "occaOuterId",
		"blockDim" => "occaInnerDim",
		"gridDim" => "occaOuterDim",
		_ => return None,
	};
	Some(format!("{prefix}{dim}"))
}
