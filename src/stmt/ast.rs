use std::collections::HashMap;

use crate::expr::{ExprArena, ExprId};
use crate::origin::Origin;

/// An index into a [`Program`]'s statement arena. See `expr::ExprId` for why this crate uses
/// plain indices instead of owned recursive nodes or parent pointers everywhere an AST needs to
/// reference another node.
pub type StmtId = usize;

#[derive(Debug, Clone)]
pub struct Param {
	pub qualifiers: Vec<String>,
	pub type_name: String,
	pub is_pointer: bool,
	pub name: String,
}

#[derive(Debug, Clone)]
pub struct Declarator {
	pub name: String,
	pub is_pointer: bool,
	pub array_dims: Vec<Option<ExprId>>,
	pub initializer: Option<ExprId>,
}

/// One branch of an if-chain: `None` condition marks the trailing `else`.
#[derive(Debug, Clone)]
pub struct IfBranch {
	pub condition: Option<ExprId>,
	pub body: Vec<StmtId>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
	/// A directive-shaped line the preprocessor deliberately passed through (`#pragma`) rather
	/// than consuming.
	Macro { directive: String, body: String },
	Typedef { underlying: String, name: String },
	Struct { keyword: String, name: Option<String>, body: Vec<StmtId> },
	Declare { qualifiers: Vec<String>, type_name: String, declarators: Vec<Declarator> },
	FunctionDefinition { qualifiers: Vec<String>, return_type: String, name: String, params: Vec<Param>, body: Vec<StmtId> },
	FunctionPrototype { qualifiers: Vec<String>, return_type: String, name: String, params: Vec<Param> },
	For { init: Option<StmtId>, condition: Option<ExprId>, step: Option<ExprId>, tag: Option<String>, body: Vec<StmtId> },
	While { condition: ExprId, body: Vec<StmtId> },
	DoWhile { condition: ExprId, body: Vec<StmtId> },
	IfChain { branches: Vec<IfBranch> },
	Switch { subject: ExprId, body: Vec<StmtId> },
	Block { body: Vec<StmtId> },
	Update { expr: ExprId },
	Goto { label: String },
	Label { name: String },
	FlowKeyword { keyword: String, expr: Option<ExprId> },

	/// Synthesized by `okl::setup_ok_for`: an `@outerN`/`@innerN`/`@tileN` loop rewritten to its
	/// marker form. `iter`/`start`/`stride` back the body rewrite the pass performs; `dim` is the
	/// loop's nesting dimension (0, 1, or 2).
	OklFor { kind: OklForKind, dim: usize, iter: String, body: Vec<StmtId> },
	/// Inserted by `okl::add_parallel_fors` immediately before the outermost `occaOuterFor{N}` of
	/// a nest.
	ParallelForMarker { dim: usize },
	/// Inserted by `okl::fix_loop_order` between adjacent inner-loop groups that have no
	/// user-written barrier between them.
	BarrierMarker { fence: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OklForKind {
	Outer,
	Inner,
	Tile,
}

#[derive(Debug, Clone)]
pub struct Stmt {
	pub kind: StmtKind,
	pub origin: Origin,
	/// The enclosing statement, or `None` at the top level. A plain index, not a pointer — the
	/// resolver and the OKL passes only ever walk it upward (never mutate a parent's fields
	/// through it), so there's no aliasing concern an `Rc`/raw-pointer link would need to manage.
	pub parent: Option<StmtId>,
	/// Variables declared directly in this statement's scope. Populated at parse time for
	/// scope-owning kinds (`Block`, `FunctionDefinition`,
	/// `For`); empty for everything else.
	pub scope_vars: HashMap<String, crate::resolve::VarInfo>,
	/// Types (`typedef`s, `struct`/`union`/`enum` tags) declared directly in this statement's
	/// scope.
	pub scope_types: HashMap<String, crate::resolve::TypeInfo>,
	/// `@kernel`/`@outer0`/`@shared`/... tags attached to this statement by source annotations or
	/// by earlier OKL passes.
	pub tags: Vec<String>,
}

impl Stmt {
	#[must_use]
	pub fn new(kind: StmtKind, origin: Origin, parent: Option<StmtId>) -> Self {
		Self { kind, origin, parent, scope_vars: HashMap::new(), scope_types: HashMap::new(), tags: Vec::new() }
	}
}

/// The whole parsed/transformed program: a statement arena plus the expression arena every
/// statement's header/body expressions live in. Every pipeline stage (resolver, OKL passes,
/// emitter) takes and returns this as a unit, since later passes assume earlier invariants
/// already hold (none of them need more than one `Program` alive at a time).
#[derive(Debug, Clone, Default)]
pub struct Program {
	pub stmts: Vec<Stmt>,
	pub exprs: ExprArena,
	pub top_level: Vec<StmtId>,
	/// Declarations with no enclosing statement (global scope). There's no
	/// top-level `Stmt` to own these, so they live here instead; `resolve::scope`'s lookups fall
	/// back to them once a name's ancestor chain is exhausted.
	pub global_vars: HashMap<String, crate::resolve::VarInfo>,
	pub global_types: HashMap<String, crate::resolve::TypeInfo>,
}

impl Program {
	pub fn push(&mut self, kind: StmtKind, origin: Origin, parent: Option<StmtId>) -> StmtId {
		self.stmts.push(Stmt::new(kind, origin, parent));
		self.stmts.len() - 1
	}

	#[must_use]
	pub fn get(&self, id: StmtId) -> &Stmt {
		&self.stmts[id]
	}

	pub fn get_mut(&mut self, id: StmtId) -> &mut Stmt {
		&mut self.stmts[id]
	}

	/// The statement chain from `id` up to (and including) the nearest top-level ancestor, per
	/// used by the resolver to walk scope lookups outward.
	pub fn ancestors(&self, id: StmtId) -> impl Iterator<Item = StmtId> + '_ {
		std::iter::successors(Some(id), move |&current| self.stmts[current].parent)
	}

	/// Every statement id reachable from `id`'s body/children, `id` included, depth-first. Used by
	/// OKL passes that need to scan a kernel body for markers (e.g. "does this body contain any
	/// `@outer` loop").
	pub fn descendants(&self, id: StmtId) -> Vec<StmtId> {
		let mut out = Vec::new();
		let mut stack = vec![id];
		while let Some(current) = stack.pop() {
			out.push(current);
			for child in self.children_of(current) {
				stack.push(child);
			}
		}
		out
	}

	#[must_use]
	pub fn children_of(&self, id: StmtId) -> Vec<StmtId> {
		match &self.stmts[id].kind {
			StmtKind::Struct { body, .. }
			| StmtKind::FunctionDefinition { body, .. }
			| StmtKind::While { body, .. }
			| StmtKind::DoWhile { body, .. }
			| StmtKind::Switch { body, .. }
			| StmtKind::Block { body, .. }
			| StmtKind::OklFor { body, .. } => body.clone(),
			StmtKind::For { init, body, .. } => init.iter().copied().chain(body.iter().copied()).collect(),
			StmtKind::IfChain { branches } => branches.iter().flat_map(|branch| branch.body.iter().copied()).collect(),
			StmtKind::FunctionPrototype { .. }
			| StmtKind::Typedef { .. }
			| StmtKind::Declare { .. }
			| StmtKind::Macro { .. }
			| StmtKind::Update { .. }
			| StmtKind::Goto { .. }
			| StmtKind::Label { .. }
			| StmtKind::FlowKeyword { .. }
			| StmtKind::ParallelForMarker { .. }
			| StmtKind::BarrierMarker { .. } => Vec::new(),
		}
	}
}
