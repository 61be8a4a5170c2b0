use crate::lexer::{Opcode, PrimitiveValue};
use crate::origin::Origin;

/// An index into an [`ExprArena`]. Plain integers rather than owned recursive nodes or raw
/// parent-pointer links: the OKL transform passes walk expressions downward only and never need
/// to mutate a node's parent in place, so there's nothing an arena index buys less safely than a
/// pointer, and a lot it buys more simply (no lifetimes, no `unsafe`, trivially `Clone`).
pub type ExprId = usize;

#[derive(Debug, Clone)]
pub enum ExprKind {
	Primitive(PrimitiveValue),
	StringLiteral { encoding: String, lexeme: String },
	CharLiteral(String),
	/// An identifier the resolver hasn't looked at yet. By the time `resolve::resolve` has run
	/// over a tree, every leaf that resolved to something in scope has become a `VariableRef` or
	/// `TypeRef`; whatever's left `Identifier` either never resolved (global scope, native kernel
	/// body) or names something this crate doesn't track (a function callee, a macro).
	Identifier(String),
	/// Resolved to a variable declared in an enclosing scope.
	VariableRef { name: String },
	/// Resolved to a type declared in an enclosing scope (e.g. a `typedef` name used in
	/// a cast or a declaration that itself reads as an expression).
	TypeRef { name: String },
	/// `prefix` distinguishes `++x` from `x++` for the two operators that can appear on either
	/// side of their operand.
	Unary { op: Opcode, operand: ExprId, prefix: bool },
	Binary { op: Opcode, left: ExprId, right: ExprId },
	Ternary { condition: ExprId, if_true: ExprId, if_false: ExprId },
	Call { callee: ExprId, args: Vec<ExprId> },
	Subscript { base: ExprId, index: ExprId },
	/// Covers both `.` and `->` (and their pointer-to-member cousins): which one is recorded in
	/// `op` rather than split into separate variants, since every consumer treats them alike.
	Member { base: ExprId, op: Opcode, name: String },
	Paren(ExprId),
}

#[derive(Debug, Clone)]
pub struct Expr {
	pub kind: ExprKind,
	pub origin: Origin,
}

impl ExprKind {
	/// This node's immediate children, for callers (the resolver, the OKL passes) that need to
	/// walk a whole subtree without matching on every variant themselves.
	#[must_use]
	pub fn child_ids(&self) -> Vec<ExprId> {
		match self {
			Self::Primitive(_) | Self::StringLiteral { .. } | Self::CharLiteral(_) | Self::Identifier(_) | Self::VariableRef { .. } | Self::TypeRef { .. } => Vec::new(),
			Self::Unary { operand, .. } | Self::Paren(operand) => vec![*operand],
			Self::Binary { left, right, .. } => vec![*left, *right],
			Self::Ternary { condition, if_true, if_false } => vec![*condition, *if_true, *if_false],
			Self::Call { callee, args } => std::iter::once(*callee).chain(args.iter().copied()).collect(),
			Self::Subscript { base, index } => vec![*base, *index],
			Self::Member { base, .. } => vec![*base],
		}
	}
}

/// The arena an expression tree's nodes live in. `root` is the top-level node's id; every other id
/// referenced from it is guaranteed to resolve within the same arena.
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
	nodes: Vec<Expr>,
}

impl ExprArena {
	pub fn push(&mut self, kind: ExprKind, origin: Origin) -> ExprId {
		self.nodes.push(Expr { kind, origin });
		self.nodes.len() - 1
	}

	#[must_use]
	pub fn get(&self, id: ExprId) -> &Expr {
		&self.nodes[id]
	}

	pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
		&mut self.nodes[id]
	}

	/// Every node id currently in the arena, in insertion order (always a valid topological order
	/// since a node can only reference ids smaller than its own).
	pub fn ids(&self) -> impl Iterator<Item = ExprId> {
		0..self.nodes.len()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Appends another arena's nodes onto the end of this one, shifting every `ExprId` those nodes
	/// reference by the offset they land at. Returns that offset, so a caller holding a root id
	/// from the appended arena can find it afterward via `root + offset`. Used to splice a
	/// freshly shunting-yard-parsed header expression into a statement's shared `Program::exprs`
	/// arena.
	pub fn append(&mut self, other: ExprArena) -> usize {
		let offset = self.nodes.len();
		for expr in other.nodes {
			self.nodes.push(Expr { kind: remap_expr_kind(expr.kind, offset), origin: expr.origin });
		}
		offset
	}
}

fn remap_expr_kind(kind: ExprKind, offset: usize) -> ExprKind {
	let shift = |id: ExprId| id + offset;
	match kind {
		ExprKind::Primitive(_) | ExprKind::StringLiteral { .. } | ExprKind::CharLiteral(_) | ExprKind::Identifier(_) | ExprKind::VariableRef { .. } | ExprKind::TypeRef { .. } => kind,
		ExprKind::Unary { op, operand, prefix } => ExprKind::Unary { op, operand: shift(operand), prefix },
		ExprKind::Binary { op, left, right } => ExprKind::Binary { op, left: shift(left), right: shift(right) },
		ExprKind::Ternary { condition, if_true, if_false } => ExprKind::Ternary { condition: shift(condition), if_true: shift(if_true), if_false: shift(if_false) },
		ExprKind::Call { callee, args } => ExprKind::Call { callee: shift(callee), args: args.into_iter().map(shift).collect() },
		ExprKind::Subscript { base, index } => ExprKind::Subscript { base: shift(base), index: shift(index) },
		ExprKind::Member { base, op, name } => ExprKind::Member { base: shift(base), op, name },
		ExprKind::Paren(inner) => ExprKind::Paren(shift(inner)),
	}
}

/// A parsed expression: the arena plus which node is the top of the tree.
#[derive(Debug, Clone)]
pub struct ExprTree {
	pub arena: ExprArena,
	pub root: ExprId,
}

impl ExprTree {
	/// Whether this expression can be folded to a compile-time constant without consulting any
	/// symbol table — identifiers, calls, and subscripts can't be.
	#[must_use]
	pub fn can_evaluate(&self) -> bool {
		self.can_evaluate_node(self.root)
	}

	fn can_evaluate_node(&self, id: ExprId) -> bool {
		match &self.arena.get(id).kind {
			ExprKind::Primitive(_) => true,
			ExprKind::StringLiteral { .. } | ExprKind::CharLiteral(_) | ExprKind::Identifier(_) | ExprKind::VariableRef { .. } | ExprKind::TypeRef { .. } | ExprKind::Call { .. } | ExprKind::Subscript { .. } | ExprKind::Member { .. } => false,
			ExprKind::Unary { operand, .. } | ExprKind::Paren(operand) => self.can_evaluate_node(*operand),
			ExprKind::Binary { left, right, .. } => self.can_evaluate_node(*left) && self.can_evaluate_node(*right),
			ExprKind::Ternary { condition, if_true, if_false } => self.can_evaluate_node(*condition) && self.can_evaluate_node(*if_true) && self.can_evaluate_node(*if_false),
		}
	}

	/// Folds the tree to a single numeric value, or `None` if it's not evaluable or hits an
	/// operator this crate doesn't fold (e.g. `,`).
	#[must_use]
	pub fn evaluate(&self) -> Option<f64> {
		self.evaluate_node(self.root)
	}

	fn evaluate_node(&self, id: ExprId) -> Option<f64> {
		match &self.arena.get(id).kind {
			ExprKind::Primitive(PrimitiveValue::Int { value, .. }) => Some(*value as f64),
			ExprKind::Primitive(PrimitiveValue::Float { value, .. }) => Some(*value),
			ExprKind::Paren(inner) => self.evaluate_node(*inner),
			ExprKind::Unary { op, operand, .. } => {
				let value = self.evaluate_node(*operand)?;
				match op {
					Opcode::Minus => Some(-value),
					Opcode::Plus => Some(value),
					Opcode::Bang => Some(f64::from(value == 0.0)),
					Opcode::Tilde => Some(!(value as i64) as f64),
					_ => None,
				}
			},
			ExprKind::Binary { op, left, right } => {
				let left = self.evaluate_node(*left)?;
				let right = self.evaluate_node(*right)?;
				let (left_i, right_i) = (left as i64, right as i64);
				match op {
					Opcode::Plus => Some(left + right),
					Opcode::Minus => Some(left - right),
					Opcode::Asterisk => Some(left * right),
					Opcode::Slash if right != 0.0 => Some(left / right),
					Opcode::Percent if right_i != 0 => Some((left_i % right_i) as f64),
					Opcode::Shl => Some(((left_i) << (right_i & 63)) as f64),
					Opcode::Shr => Some(((left_i) >> (right_i & 63)) as f64),
					Opcode::Ampersand => Some((left_i & right_i) as f64),
					Opcode::Pipe => Some((left_i | right_i) as f64),
					Opcode::Caret => Some((left_i ^ right_i) as f64),
					Opcode::Lt => Some(f64::from(left < right)),
					Opcode::Gt => Some(f64::from(left > right)),
					Opcode::Le => Some(f64::from(left <= right)),
					Opcode::Ge => Some(f64::from(left >= right)),
					Opcode::EqEq => Some(f64::from(left == right)),
					Opcode::Ne => Some(f64::from(left != right)),
					Opcode::LogicalAnd => Some(f64::from(left != 0.0 && right != 0.0)),
					Opcode::LogicalOr => Some(f64::from(left != 0.0 || right != 0.0)),
					_ => None,
				}
			},
			ExprKind::Ternary { condition, if_true, if_false } => {
				if self.evaluate_node(*condition)? != 0.0 {
					self.evaluate_node(*if_true)
				} else {
					self.evaluate_node(*if_false)
				}
			},
			_ => None,
		}
	}
}
