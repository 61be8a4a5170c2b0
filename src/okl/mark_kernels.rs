use crate::expr::ExprKind;
use crate::stmt::{Program, StmtKind};

/// Pass 1: tags every top-level function whose body contains an `@outer` for-loop, or
/// a CUDA-style `blockIdx`/`gridDim` reference, with `@kernel`.
pub fn run(program: &mut Program) {
	let candidates: Vec<_> = program
		.top_level
		.iter()
		.copied()
		.filter(|&id| matches!(program.get(id).kind, StmtKind::FunctionDefinition { .. }))
		.filter(|&id| !super::is_kernel(program, id) && body_looks_like_kernel(program, id))
		.collect();
	for id in candidates {
		program.get_mut(id).tags.push("@kernel".to_owned());
	}
}

fn body_looks_like_kernel(program: &Program, id: crate::stmt::StmtId) -> bool {
	program.descendants(id).iter().any(|&descendant| match &program.get(descendant).kind {
		StmtKind::For { tag: Some(tag), .. } => tag.starts_with("@outer"),
		_ => expr_roots_reference_cuda_outer(program, descendant),
	})
}

fn expr_roots_reference_cuda_outer(program: &Program, stmt_id: crate::stmt::StmtId) -> bool {
	crate::resolve::header_expr_roots(&program.get(stmt_id).kind).into_iter().any(|root| {
		let mut stack = vec![root];
		while let Some(current) = stack.pop() {
			let kind = &program.exprs.get(current).kind;
			if let ExprKind::Member { base, name: member, .. } = kind {
				let base_is_cuda_outer = matches!(&program.exprs.get(*base).kind, ExprKind::Identifier(base_name) if base_name == "blockIdx" || base_name == "gridDim");
				if base_is_cuda_outer && matches!(member.as_str(), "x" | "y" | "z") {
					return true;
				}
			}
			stack.extend(kind.child_ids());
		}
		false
	})
}
