use crate::expr::{ExprId, ExprKind};
use crate::lexer::Opcode;
use crate::stmt::{Declarator, IfBranch, Param, Program, StmtId, StmtKind};

/// Maps an OKL source annotation onto its backend-neutral sentinel identifier, or leaves an
/// ordinary C qualifier (`const`, `static`, ...) untouched. `@dim` carries no
/// emitted form of its own — it only exists to steer `setup_ok_for`'s array-dimension handling —
/// so it's dropped here.
fn qualifier_text(qualifier: &str) -> Option<&str> {
	Some(match qualifier {
		"@shared" => "occaShared",
		"@restrict" => "occaRestrict",
		"@constant" => "occaConstant",
		"@dim" | "@exclusive" => return None,
		other => other,
	})
}

/// A syntax-directed pretty-printer over a transformed [`Program`]. Indentation tracks
/// statement depth; newlines follow `;`, the opening `{` of a block/function/loop body, and
/// precede its closing `}`.
pub struct Emitter<'a> {
	program: &'a Program,
	out: String,
	depth: usize,
}

/// Renders every top-level statement of `program` as backend-agnostic OKL/C text.
#[must_use]
pub fn emit(program: &Program) -> String {
	let mut emitter = Emitter { program, out: String::new(), depth: 0 };
	emitter.emit_stmts(&program.top_level);
	collapse_blank_lines(&emitter.out)
}

/// Collapses runs of three or more consecutive newlines down to a single blank line, the one
/// cosmetic cleanup the newline-insertion rule above doesn't itself prevent once statements are
/// hoisted, split, or have markers spliced between them.
fn collapse_blank_lines(text: &str) -> String {
	let pattern = regex_macro::regex!(r"\n{3,}");
	pattern.replace_all(text, "\n\n").into_owned()
}

impl Emitter<'_> {
	fn indent(&mut self) {
		for _ in 0..self.depth {
			self.out.push_str("  ");
		}
	}

	fn emit_stmts(&mut self, ids: &[StmtId]) {
		for &id in ids {
			self.emit_stmt(id);
		}
	}

	fn emit_block(&mut self, body: &[StmtId]) {
		self.out.push_str("{\n");
		self.depth += 1;
		self.emit_stmts(body);
		self.depth -= 1;
		self.indent();
		self.out.push_str("}\n");
	}

	#[allow(clippy::too_many_lines)]
	fn emit_stmt(&mut self, id: StmtId) {
		let stmt = self.program.get(id);
		let kind = stmt.kind.clone();
		match kind {
			StmtKind::Macro { directive, body } => {
				self.indent();
				self.out.push('#');
				self.out.push_str(&directive);
				if !body.is_empty() {
					self.out.push(' ');
					self.out.push_str(&body);
				}
				self.out.push('\n');
			},
			StmtKind::Typedef { underlying, name } => {
				self.indent();
				self.out.push_str(&format!("typedef {underlying} {name};\n"));
			},
			StmtKind::Struct { keyword, name, body } => {
				self.indent();
				self.out.push_str(&keyword);
				if let Some(name) = &name {
					self.out.push(' ');
					self.out.push_str(name);
				}
				self.out.push(' ');
				self.emit_block(&body);
				self.backtrack_newline_to_semicolon();
			},
			StmtKind::Declare { qualifiers, type_name, declarators } => {
				self.indent();
				self.out.push_str(&self.declare_text(&qualifiers, &type_name, &declarators));
				self.out.push_str(";\n");
			},
			StmtKind::FunctionDefinition { qualifiers, return_type, name, params, body } => {
				self.indent();
				if stmt.tags.iter().any(|tag| tag == "@kernel") {
					self.out.push_str("occaKernel ");
				}
				self.emit_qualifiers(&qualifiers);
				self.out.push_str(&return_type);
				self.out.push(' ');
				self.out.push_str(&name);
				self.out.push('(');
				self.out.push_str(&params.iter().map(param_text).collect::<Vec<_>>().join(", "));
				self.out.push_str(") ");
				self.emit_block(&body);
			},
			StmtKind::FunctionPrototype { qualifiers, return_type, name, params } => {
				self.indent();
				self.emit_qualifiers(&qualifiers);
				self.out.push_str(&return_type);
				self.out.push(' ');
				self.out.push_str(&name);
				self.out.push('(');
				self.out.push_str(&params.iter().map(param_text).collect::<Vec<_>>().join(", "));
				self.out.push_str(");\n");
			},
			StmtKind::For { init, condition, step, tag: _, body } => {
				self.indent();
				self.out.push_str("for (");
				if let Some(init) = init {
					self.out.push_str(self.inline_stmt(init).trim_end_matches(';').trim_end());
				}
				self.out.push_str("; ");
				if let Some(condition) = condition {
					self.out.push_str(&self.expr_text(condition));
				}
				self.out.push_str("; ");
				if let Some(step) = step {
					self.out.push_str(&self.expr_text(step));
				}
				self.out.push_str(") ");
				self.emit_block(&body);
			},
			StmtKind::While { condition, body } => {
				self.indent();
				self.out.push_str(&format!("while ({}) ", self.expr_text(condition)));
				self.emit_block(&body);
			},
			StmtKind::DoWhile { condition, body } => {
				self.indent();
				self.out.push_str("do ");
				self.emit_block(&body);
				self.out.pop();
				self.out.push_str(&format!(" while ({});\n", self.expr_text(condition)));
			},
			StmtKind::IfChain { branches } => self.emit_if_chain(&branches),
			StmtKind::Switch { subject, body } => {
				self.indent();
				self.out.push_str(&format!("switch ({}) ", self.expr_text(subject)));
				self.emit_block(&body);
			},
			StmtKind::Block { body } => {
				self.indent();
				self.emit_block(&body);
			},
			StmtKind::Update { expr } => {
				self.indent();
				self.out.push_str(&self.expr_text(expr));
				self.out.push_str(";\n");
			},
			StmtKind::Goto { label } => {
				self.indent();
				self.out.push_str(&format!("goto {label};\n"));
			},
			StmtKind::Label { name } => {
				self.indent();
				self.out.push_str(&format!("{name}:\n"));
			},
			StmtKind::FlowKeyword { keyword, expr } => {
				self.indent();
				self.out.push_str(&keyword);
				if let Some(expr) = expr {
					self.out.push(' ');
					self.out.push_str(&self.expr_text(expr));
				}
				let terminator = if keyword == "case" || keyword == "default" { ":\n" } else { ";\n" };
				self.out.push_str(terminator);
			},
			StmtKind::OklFor { kind, dim, iter: _, body } => {
				self.indent();
				self.out.push_str(&format!("{} ", okl_for_identifier(kind, dim)));
				self.emit_block(&body);
			},
			StmtKind::ParallelForMarker { dim } => {
				self.indent();
				self.out.push_str(&format!("occaParallelFor{dim}\n"));
			},
			StmtKind::BarrierMarker { fence } => {
				self.indent();
				self.out.push_str(&format!("occaBarrier({fence});\n"));
			},
		}
	}

	/// `Struct`'s body is emitted via `emit_block`, which always appends a bare `}\n`; a struct
	/// declaration needs that closing brace followed by `;` instead, so this rewrites the trailing
	/// `}\n` this call just wrote into `};\n`.
	fn backtrack_newline_to_semicolon(&mut self) {
		if self.out.ends_with("}\n") {
			self.out.truncate(self.out.len() - 1);
			self.out.push_str(";\n");
		}
	}

	fn emit_if_chain(&mut self, branches: &[IfBranch]) {
		for (index, branch) in branches.iter().enumerate() {
			if index == 0 {
				self.indent();
			}
			match &branch.condition {
				Some(condition) if index == 0 => self.out.push_str(&format!("if ({}) ", self.expr_text(*condition))),
				Some(condition) => self.out.push_str(&format!("else if ({}) ", self.expr_text(*condition))),
				None => self.out.push_str("else "),
			}
			self.emit_block(&branch.body);
			// Pull the trailing newline back so a following `else`/`else if` continues on the same
			// line as this branch's closing brace, matching conventional C cuddled-else style.
			if index + 1 < branches.len() && self.out.ends_with('\n') {
				self.out.pop();
				self.out.push(' ');
			}
		}
	}

	fn emit_qualifiers(&mut self, qualifiers: &[String]) {
		for qualifier in qualifiers {
			if let Some(text) = qualifier_text(qualifier) {
				self.out.push_str(text);
				self.out.push(' ');
			}
		}
	}

	fn declare_text(&self, qualifiers: &[String], type_name: &str, declarators: &[Declarator]) -> String {
		if let Some(exclusive_text) = self.exclusive_declare_text(qualifiers, type_name, declarators) {
			return exclusive_text;
		}
		let mut text = String::new();
		for qualifier in qualifiers {
			if let Some(mapped) = qualifier_text(qualifier) {
				text.push_str(mapped);
				text.push(' ');
			}
		}
		text.push_str(type_name);
		text.push(' ');
		text.push_str(&declarators.iter().map(|declarator| self.declarator_text(declarator)).collect::<Vec<_>>().join(", "));
		text
	}

	/// An `@exclusive` declaration is rewritten to `occaPrivate(qualifiers type, name)` (or
	/// `occaPrivateArray(..., size)` for its one permitted array dimension) rather than emitted as
	/// an ordinary declaration.
	fn exclusive_declare_text(&self, qualifiers: &[String], type_name: &str, declarators: &[Declarator]) -> Option<String> {
		if !qualifiers.iter().any(|qualifier| qualifier == "@exclusive") {
			return None;
		}
		let rest: Vec<&str> = qualifiers.iter().filter(|qualifier| *qualifier != "@exclusive").filter_map(|qualifier| qualifier_text(qualifier)).collect();
		let qualified_type = if rest.is_empty() { type_name.to_owned() } else { format!("{} {type_name}", rest.join(" ")) };
		Some(
			declarators
				.iter()
				.map(|declarator| match declarator.array_dims.first() {
					Some(Some(size)) => format!("occaPrivateArray({qualified_type}, {}, {})", declarator.name, self.expr_text(*size)),
					_ => format!("occaPrivate({qualified_type}, {})", declarator.name),
				})
				.collect::<Vec<_>>()
				.join(", "),
		)
	}

	fn declarator_text(&self, declarator: &Declarator) -> String {
		let mut text = String::new();
		if declarator.is_pointer {
			text.push('*');
		}
		text.push_str(&declarator.name);
		for dim in &declarator.array_dims {
			text.push('[');
			if let Some(size) = dim {
				text.push_str(&self.expr_text(*size));
			}
			text.push(']');
		}
		if let Some(initializer) = declarator.initializer {
			text.push_str(" = ");
			text.push_str(&self.expr_text(initializer));
		}
		text
	}

	/// Renders a single statement (used for a `for`-loop's init clause) without the emitter's
	/// usual indentation/newline bookkeeping.
	fn inline_stmt(&self, id: StmtId) -> String {
		let StmtKind::Declare { qualifiers, type_name, declarators } = &self.program.get(id).kind else {
			return String::new();
		};
		format!("{};", self.declare_text(qualifiers, type_name, declarators))
	}

	fn expr_text(&self, id: ExprId) -> String {
		match &self.program.exprs.get(id).kind {
			ExprKind::Primitive(value) => value.text().to_owned(),
			ExprKind::StringLiteral { encoding, lexeme } => format!("{encoding}{lexeme}"),
			ExprKind::CharLiteral(text) => text.clone(),
			ExprKind::Identifier(name) | ExprKind::VariableRef { name } | ExprKind::TypeRef { name } => name.clone(),
			ExprKind::Unary { op, operand, prefix } => {
				let operand_text = self.expr_text(*operand);
				if *prefix { format!("{}{operand_text}", op.lexeme()) } else { format!("{operand_text}{}", op.lexeme()) }
			},
			ExprKind::Binary { op, left, right } => {
				let (left_text, right_text) = (self.expr_text(*left), self.expr_text(*right));
				if *op == Opcode::Comma { format!("{left_text}, {right_text}") } else { format!("{left_text} {} {right_text}", op.lexeme()) }
			},
			ExprKind::Ternary { condition, if_true, if_false } => format!("{} ? {} : {}", self.expr_text(*condition), self.expr_text(*if_true), self.expr_text(*if_false)),
			ExprKind::Call { callee, args } => format!("{}({})", self.expr_text(*callee), args.iter().map(|&arg| self.expr_text(arg)).collect::<Vec<_>>().join(", ")),
			ExprKind::Subscript { base, index } => format!("{}[{}]", self.expr_text(*base), self.expr_text(*index)),
			ExprKind::Member { base, op, name } => format!("{}{}{name}", self.expr_text(*base), op.lexeme()),
			ExprKind::Paren(inner) => format!("({})", self.expr_text(*inner)),
		}
	}
}

fn okl_for_identifier(kind: crate::stmt::OklForKind, dim: usize) -> String {
	match kind {
		crate::stmt::OklForKind::Outer => format!("occaOuterFor{dim}"),
		crate::stmt::OklForKind::Inner | crate::stmt::OklForKind::Tile => format!("occaInnerFor{dim}"),
	}
}

fn param_text(param: &Param) -> String {
	if param.type_name == "occaKernelInfoArg" && param.name.is_empty() {
		return param.type_name.clone();
	}
	let mut text = String::new();
	for qualifier in &param.qualifiers {
		if let Some(mapped) = qualifier_text(qualifier) {
			text.push_str(mapped);
			text.push(' ');
		}
	}
	text.push_str(&param.type_name);
	text.push(' ');
	if param.is_pointer {
		text.push('*');
	}
	text.push_str(&param.name);
	text
}
