use crate::diagnostics::{DiagnosticSink, TranslateError};
use crate::expr::{ExprId, ExprKind};
use crate::lexer::Opcode;
use crate::stmt::{Declarator, OklForKind, Program, StmtId, StmtKind};

/// Pass 4: every `for` whose fourth header expression names an OKL tag is verified
/// against the three required shapes (`T iter = start`, `iter <cmp> bound`, a unit or scaled
/// stride) and rewritten into an `OklFor` marker statement.
pub fn run(program: &mut Program, sink: &mut dyn DiagnosticSink) {
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect();
	for kernel in kernels {
		for stmt_id in program.descendants(kernel) {
			try_convert(program, stmt_id, sink);
		}
	}
}

fn try_convert(program: &mut Program, stmt_id: StmtId, sink: &mut dyn DiagnosticSink) {
	let StmtKind::For { init, condition, step, tag: Some(tag), body } = program.get(stmt_id).kind.clone() else { return };
	let origin = program.get(stmt_id).origin.clone();

	let Some((kind, dim)) = super::parse_tag(&tag) else {
		let reason = format!("unrecognized OKL tag {tag:?}");
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin, reason }.to_string());
		return;
	};

	let Some(shape) = validate_shape(program, init, condition, step, &origin, sink) else { return };

	let id_name = match kind {
		OklForKind::Outer => format!("occaOuterId{dim}"),
		OklForKind::Inner => format!("occaInnerId{dim}"),
		OklForKind::Tile => format!("occaInnerId{dim}"),
	};
	let id_ref = program.exprs.push(ExprKind::Identifier(id_name), origin.clone());
	let scaled = program.exprs.push(ExprKind::Binary { op: Opcode::Asterisk, left: id_ref, right: shape.stride }, origin.clone());
	let signed = if shape.negative_stride { program.exprs.push(ExprKind::Unary { op: Opcode::Minus, operand: scaled, prefix: true }, origin.clone()) } else { scaled };
	let value = program.exprs.push(ExprKind::Binary { op: Opcode::Plus, left: shape.start, right: signed }, origin.clone());

	let declarator = Declarator { name: shape.iter_name.clone(), is_pointer: false, array_dims: Vec::new(), initializer: Some(value) };
	let synth_id = program.push(StmtKind::Declare { qualifiers: vec!["const".to_owned()], type_name: shape.iter_type, declarators: vec![declarator] }, origin.clone(), Some(stmt_id));

	let mut new_body = vec![synth_id];
	new_body.extend(body);
	program.get_mut(stmt_id).kind = StmtKind::OklFor { kind, dim, iter: shape.iter_name, body: new_body };
}

struct ForShape {
	iter_name: String,
	iter_type: String,
	start: ExprId,
	stride: ExprId,
	negative_stride: bool,
}

fn validate_shape(program: &mut Program, init: Option<StmtId>, condition: Option<ExprId>, step: Option<ExprId>, origin: &crate::origin::Origin, sink: &mut dyn DiagnosticSink) -> Option<ForShape> {
	let Some(init_id) = init else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop is missing its init clause".to_owned() }.to_string());
		return None;
	};
	let StmtKind::Declare { type_name, declarators, .. } = &program.get(init_id).kind else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop init must be `T iter = start`".to_owned() }.to_string());
		return None;
	};
	let Some(declarator) = declarators.first() else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop init is missing a declarator".to_owned() }.to_string());
		return None;
	};
	let Some(start) = declarator.initializer else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop init must assign a start value".to_owned() }.to_string());
		return None;
	};

	let Some(condition) = condition else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop is missing its bound condition".to_owned() }.to_string());
		return None;
	};
	if !matches!(&program.exprs.get(condition).kind, ExprKind::Binary { op: Opcode::Lt | Opcode::Le | Opcode::Gt | Opcode::Ge, .. }) {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop bound must be `iter <cmp> bound`".to_owned() }.to_string());
		return None;
	}

	let Some(step) = step else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop is missing its stride clause".to_owned() }.to_string());
		return None;
	};
	let Some((stride, negative_stride)) = stride_of(program, step) else {
		sink.error(origin.clone(), TranslateError::MalformedOklLoop { origin: origin.clone(), reason: "OKL for-loop stride must be `++iter`, `iter++`, `--iter`, `iter--`, `iter += s`, or `iter -= s`".to_owned() }.to_string());
		return None;
	};

	Some(ForShape { iter_name: declarator.name.clone(), iter_type: type_name.clone(), start, stride, negative_stride })
}

/// Returns `(stride_expr, negative)` for a validated stride clause, synthesizing a literal `1`
/// node for the increment/decrement shorthand forms.
fn stride_of(program: &mut Program, step: ExprId) -> Option<(ExprId, bool)> {
	match &program.exprs.get(step).kind {
		ExprKind::Unary { op: Opcode::Increment, .. } => Some((push_literal_one(program, step), false)),
		ExprKind::Unary { op: Opcode::Decrement, .. } => Some((push_literal_one(program, step), true)),
		ExprKind::Binary { op: Opcode::PlusEq, right, .. } => Some((*right, false)),
		ExprKind::Binary { op: Opcode::MinusEq, right, .. } => Some((*right, true)),
		_ => None,
	}
}

fn push_literal_one(program: &mut Program, step: ExprId) -> ExprId {
	let origin = program.exprs.get(step).origin.clone();
	program.exprs.push(ExprKind::Primitive(crate::lexer::PrimitiveValue::Int { text: "1".to_owned(), value: 1, suffix: crate::lexer::NumericSuffix::None }), origin)
}
