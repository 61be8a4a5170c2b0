use crate::stmt::{OklForKind, Program, StmtId, StmtKind};

/// Pass 6: inserts a sibling `occaParallelFor{N}` marker immediately before each
/// top-level `@outer` loop of a nest — the outermost `occaOuterFor{N}` that isn't itself nested
/// inside another `@outer` loop.
pub fn run(program: &mut Program) {
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect();
	for kernel in kernels {
		let Some(mut body) = body_of(program, kernel) else { continue };
		insert_markers(program, &mut body);
		set_body(program, kernel, body);
	}
}

fn insert_markers(program: &mut Program, body: &mut Vec<StmtId>) {
	let mut index = 0;
	while index < body.len() {
		let child = body[index];
		if let StmtKind::OklFor { kind: OklForKind::Outer, dim, .. } = &program.get(child).kind {
			let dim = *dim;
			let origin = program.get(child).origin.clone();
			let marker = program.push(StmtKind::ParallelForMarker { dim }, origin, program.get(child).parent);
			body.insert(index, marker);
			index += 1;
		}
		index += 1;
	}
}

fn body_of(program: &Program, id: StmtId) -> Option<Vec<StmtId>> {
	match &program.get(id).kind {
		StmtKind::FunctionDefinition { body, .. } => Some(body.clone()),
		_ => None,
	}
}

fn set_body(program: &mut Program, id: StmtId, new_body: Vec<StmtId>) {
	if let StmtKind::FunctionDefinition { body, .. } = &mut program.get_mut(id).kind {
		*body = new_body;
	}
}
