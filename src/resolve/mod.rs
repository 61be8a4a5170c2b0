pub mod info;
pub mod scope;

use std::collections::HashMap;

use crate::diagnostics::{DiagnosticSink, TranslateError};
use crate::expr::ExprId;
use crate::stmt::{Program, StmtId, StmtKind};
pub use info::{TypeInfo, VarInfo};
pub use scope::{lookup_type, lookup_var};

/// The two global maps the resolver builds, on top of rewriting identifier leaves in place.
#[derive(Debug, Default)]
pub struct ResolutionMaps {
	pub var_origin: HashMap<String, StmtId>,
	pub var_uses: HashMap<String, Vec<StmtId>>,
}

/// Runs once after statement parsing: for every identifier leaf in every statement's header
/// expression(s), walks the statement chain looking it up in `scopeVars` then `scopeTypes`, and
/// rewrites the leaf to a `VariableRef`/`TypeRef` on a hit. Builds `varOrigin`/`varUses` along the
/// way.
pub fn resolve(program: &mut Program, sink: &mut dyn DiagnosticSink) -> ResolutionMaps {
	let mut maps = ResolutionMaps::default();
	for stmt in &program.stmts {
		for (name, info) in &stmt.scope_vars {
			maps.var_origin.entry(name.clone()).or_insert(info.defining_stmt);
		}
	}
	for (name, info) in &program.global_vars {
		maps.var_origin.entry(name.clone()).or_insert(info.defining_stmt);
	}

	for stmt_id in 0..program.stmts.len() {
		let in_kernel = enclosing_tagged_kernel(program, stmt_id);
		let roots = header_expr_roots(&program.stmts[stmt_id].kind);
		for root in roots {
			resolve_subtree(program, stmt_id, root, in_kernel, &mut maps, sink);
		}
	}
	maps
}

/// Whether `stmt_id` sits inside a function whose source already carries an explicit `@kernel`
/// tag. `okl::mark_kernels` may still add the tag to other functions later (inferred from an
/// `@outer` loop in their body), but that happens after this pass runs, so this is necessarily
/// an approximation of the final kernel set — see `DESIGN.md`.
fn enclosing_tagged_kernel(program: &Program, stmt_id: StmtId) -> bool {
	program.ancestors(stmt_id).any(|id| matches!(&program.stmts[id].kind, StmtKind::FunctionDefinition { .. } if program.stmts[id].tags.iter().any(|tag| tag == "@kernel")))
}

fn resolve_subtree(program: &mut Program, stmt_id: StmtId, expr_id: ExprId, in_kernel: bool, maps: &mut ResolutionMaps, sink: &mut dyn DiagnosticSink) {
	let mut stack = vec![expr_id];
	while let Some(current) = stack.pop() {
		let kind = program.exprs.get(current).kind.clone();
		stack.extend(kind.child_ids());

		let crate::expr::ExprKind::Identifier(name) = kind else { continue };
		if let Some(var) = lookup_var(program, stmt_id, &name) {
			maps.var_uses.entry(name.clone()).or_default().push(stmt_id);
			program.exprs.get_mut(current).kind = crate::expr::ExprKind::VariableRef { name };
		} else if lookup_type(program, stmt_id, &name).is_some() {
			program.exprs.get_mut(current).kind = crate::expr::ExprKind::TypeRef { name };
		} else {
			let origin = program.exprs.get(current).origin.clone();
			if in_kernel {
				sink.report(crate::diagnostics::Diagnostic { severity: crate::diagnostics::Severity::Error, origin: origin.clone(), message: TranslateError::UnresolvedIdentifier { origin, name }.to_string() });
			}
			// Outside a tagged kernel (global scope, native-language kernel body), an unresolved
			// identifier is left untouched and deferred to the external compiler.
		}
	}
}

/// The expression ids a statement's own header directly references — not its children
/// statements' headers, which `resolve` visits separately since they're their own arena entries.
pub(crate) fn header_expr_roots(kind: &StmtKind) -> Vec<ExprId> {
	match kind {
		StmtKind::Declare { declarators, .. } => declarators.iter().flat_map(|declarator| declarator.initializer.into_iter().chain(declarator.array_dims.iter().copied().flatten())).collect(),
		StmtKind::For { condition, step, .. } => condition.iter().chain(step.iter()).copied().collect(),
		StmtKind::While { condition, .. } | StmtKind::DoWhile { condition, .. } => vec![*condition],
		StmtKind::IfChain { branches } => branches.iter().filter_map(|branch| branch.condition).collect(),
		StmtKind::Switch { subject, .. } => vec![*subject],
		StmtKind::Update { expr } => vec![*expr],
		StmtKind::FlowKeyword { expr, .. } => expr.iter().copied().collect(),
		StmtKind::Typedef { .. }
		| StmtKind::Struct { .. }
		| StmtKind::FunctionDefinition { .. }
		| StmtKind::FunctionPrototype { .. }
		| StmtKind::Block { .. }
		| StmtKind::Goto { .. }
		| StmtKind::Label { .. }
		| StmtKind::Macro { .. }
		| StmtKind::OklFor { .. }
		| StmtKind::ParallelForMarker { .. }
		| StmtKind::BarrierMarker { .. } => Vec::new(),
	}
}
