use crate::stmt::{Program, StmtKind};

/// Pass 2: kernels whose body has no OKL-tagged loop after `mark_kernels` ran are
/// "native" — the rest of the pipeline leaves their body untouched and passes it straight through
/// to the backend compiler.
pub fn run(program: &mut Program) {
	let candidates: Vec<_> = program
		.top_level
		.iter()
		.copied()
		.filter(|&id| super::is_kernel(program, id))
		.filter(|&id| !has_okl_loop(program, id))
		.collect();
	for id in candidates {
		program.get_mut(id).tags.push("native".to_owned());
	}
}

fn has_okl_loop(program: &Program, id: crate::stmt::StmtId) -> bool {
	program.descendants(id).iter().any(|&descendant| matches!(&program.get(descendant).kind, StmtKind::For { tag: Some(_), .. }))
}
