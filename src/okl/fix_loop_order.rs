use crate::config::Options;
use crate::diagnostics::DiagnosticSink;
use crate::expr::ExprKind;
use crate::stmt::{OklForKind, Program, StmtId, StmtKind};

/// Pass 5: renumbers nested `@inner` loops so dim descends from the outside in
/// (dim-2 outside dim-0), then inserts a warned `occaBarrier(occaLocalMemFence)` between adjacent
/// inner-loop groups that share no explicit barrier.
pub fn run(program: &mut Program, options: &Options, sink: &mut dyn DiagnosticSink) {
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect();
	for kernel in kernels {
		let outers: Vec<_> = program.descendants(kernel).into_iter().filter(|&id| matches!(&program.get(id).kind, StmtKind::OklFor { kind: OklForKind::Outer, .. })).collect();
		for outer in outers {
			renumber_inner_chain(program, outer);
		}
	}
	if options.warn_on_missing_barriers {
		for kernel in program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect::<Vec<_>>() {
			insert_missing_barriers(program, kernel, sink);
		}
	}
}

/// Follows the single-child nesting chain of `@inner` loops under `outer` and renumbers their
/// `dim` (and the `occaInnerId{N}`/`occaInnerDim{N}` identifiers the previous pass already
/// embedded in each loop's synthesized counter) so the outermost inner loop gets the highest dim.
fn renumber_inner_chain(program: &mut Program, outer: StmtId) {
	let mut chain = Vec::new();
	let mut cursor = sole_inner_child(program, outer);
	while let Some(inner) = cursor {
		cursor = sole_inner_child(program, inner);
		chain.push(inner);
	}
	let len = chain.len();
	for (position, &inner) in chain.iter().enumerate() {
		let new_dim = len - 1 - position;
		let StmtKind::OklFor { dim, body, .. } = &mut program.get_mut(inner).kind else { unreachable!() };
		let old_dim = *dim;
		*dim = new_dim;
		if old_dim != new_dim {
			if let Some(&synth) = body.first() {
				rename_inner_ids(program, synth, old_dim, new_dim);
			}
		}
	}
}

/// The one `@inner` loop directly inside `id`'s body, if `id`'s body contains exactly one.
/// Bodies with more than one nested inner loop are a sibling group, handled as barrier candidates
/// rather than a nesting chain.
fn sole_inner_child(program: &Program, id: StmtId) -> Option<StmtId> {
	let body = match &program.get(id).kind {
		StmtKind::OklFor { body, .. } => body,
		_ => return None,
	};
	let mut found = None;
	for &child in body {
		if matches!(&program.get(child).kind, StmtKind::OklFor { kind: OklForKind::Inner | OklForKind::Tile, .. }) {
			if found.is_some() {
				return None;
			}
			found = Some(child);
		}
	}
	found
}

fn rename_inner_ids(program: &mut Program, synth_declare: StmtId, old_dim: usize, new_dim: usize) {
	let StmtKind::Declare { declarators, .. } = &program.get(synth_declare).kind else { return };
	let Some(root) = declarators.first().and_then(|declarator| declarator.initializer) else { return };
	let old_id = format!("occaInnerId{old_dim}");
	let old_dim_name = format!("occaInnerDim{old_dim}");
	let new_id = format!("occaInnerId{new_dim}");
	let new_dim_name = format!("occaInnerDim{new_dim}");

	let mut stack = vec![root];
	while let Some(current) = stack.pop() {
		let kind = program.exprs.get(current).kind.clone();
		if let ExprKind::Identifier(name) = &kind {
			if *name == old_id {
				program.exprs.get_mut(current).kind = ExprKind::Identifier(new_id.clone());
				continue;
			}
			if *name == old_dim_name {
				program.exprs.get_mut(current).kind = ExprKind::Identifier(new_dim_name.clone());
				continue;
			}
		}
		stack.extend(kind.child_ids());
	}
}

/// Scans every statement body in the kernel for two `@inner` loops that sit next to each other
/// with nothing but other plain statements between them and no `BarrierMarker` — a cheap
/// over-approximation of "depend on each other" that never misses a real
/// barrier gap at the cost of occasionally warning on an independent pair.
fn insert_missing_barriers(program: &mut Program, kernel: StmtId, sink: &mut dyn DiagnosticSink) {
	for stmt_id in program.descendants(kernel) {
		let Some(body) = body_of(program, stmt_id) else { continue };
		let mut rewritten = Vec::with_capacity(body.len());
		let mut last_inner: Option<StmtId> = None;
		for child in body {
			if matches!(&program.get(child).kind, StmtKind::OklFor { kind: OklForKind::Inner | OklForKind::Tile, .. }) {
				if let Some(previous) = last_inner {
					let origin = program.get(previous).origin.clone();
					sink.warning(origin.clone(), "adjacent @inner loops with no barrier between them; inserting occaBarrier(occaLocalMemFence)");
					let marker = program.push(StmtKind::BarrierMarker { fence: "occaLocalMemFence".to_owned() }, origin, Some(stmt_id));
					rewritten.push(marker);
				}
				last_inner = Some(child);
			} else {
				last_inner = None;
			}
			rewritten.push(child);
		}
		set_body(program, stmt_id, rewritten);
	}
}

fn body_of(program: &Program, id: StmtId) -> Option<Vec<StmtId>> {
	match &program.get(id).kind {
		StmtKind::OklFor { body, .. } | StmtKind::Block { body, .. } | StmtKind::FunctionDefinition { body, .. } => Some(body.clone()),
		_ => None,
	}
}

fn set_body(program: &mut Program, id: StmtId, new_body: Vec<StmtId>) {
	match &mut program.get_mut(id).kind {
		StmtKind::OklFor { body, .. } | StmtKind::Block { body, .. } | StmtKind::FunctionDefinition { body, .. } => *body = new_body,
		_ => {}
	}
}
