use crate::stmt::{Program, StmtId, StmtKind};

/// Pass 8: hoists `@shared`/`@exclusive`-qualified declarations to the top of the
/// kernel body. The textual `occaPrivate(...)`/`occaPrivateArray(...)` rewrite for `@exclusive`
/// declarations is left to the emitter, which has both the declarator and the `@exclusive` tag in
/// hand at print time — this pass only relocates statements, it doesn't reshape them.
pub fn run(program: &mut Program) {
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect();
	for kernel in kernels {
		let StmtKind::FunctionDefinition { qualifiers, return_type, name, params, body } = program.get(kernel).kind.clone() else { continue };
		let mut hoisted = Vec::new();
		let filtered = filter_body(program, body, &mut hoisted);
		hoisted.extend(filtered);
		program.get_mut(kernel).kind = StmtKind::FunctionDefinition { qualifiers, return_type, name, params, body: hoisted };
	}
}

fn is_floatable(program: &Program, id: StmtId) -> bool {
	matches!(&program.get(id).kind, StmtKind::Declare { qualifiers, .. } if qualifiers.iter().any(|qualifier| qualifier == "@shared" || qualifier == "@exclusive"))
}

/// Walks into `id`'s own body-shaped fields, pulling any `@shared`/`@exclusive` declaration out
/// into `hoisted` and recursing into whatever's left.
fn remove_shared_decls(program: &mut Program, id: StmtId, hoisted: &mut Vec<StmtId>) {
	match program.get(id).kind.clone() {
		StmtKind::FunctionDefinition { qualifiers, return_type, name, params, body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::FunctionDefinition { qualifiers, return_type, name, params, body: filtered };
		}
		StmtKind::Block { body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::Block { body: filtered };
		}
		StmtKind::OklFor { kind, dim, iter, body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::OklFor { kind, dim, iter, body: filtered };
		}
		StmtKind::While { condition, body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::While { condition, body: filtered };
		}
		StmtKind::DoWhile { condition, body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::DoWhile { condition, body: filtered };
		}
		StmtKind::Switch { subject, body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::Switch { subject, body: filtered };
		}
		StmtKind::For { init, condition, step, tag, body } => {
			let filtered = filter_body(program, body, hoisted);
			program.get_mut(id).kind = StmtKind::For { init, condition, step, tag, body: filtered };
		}
		StmtKind::IfChain { mut branches } => {
			for branch in &mut branches {
				let body = std::mem::take(&mut branch.body);
				branch.body = filter_body(program, body, hoisted);
			}
			program.get_mut(id).kind = StmtKind::IfChain { branches };
		}
		_ => {}
	}
}

fn filter_body(program: &mut Program, body: Vec<StmtId>, hoisted: &mut Vec<StmtId>) -> Vec<StmtId> {
	let mut kept = Vec::with_capacity(body.len());
	for child in body {
		if is_floatable(program, child) {
			hoisted.push(child);
		} else {
			remove_shared_decls(program, child, hoisted);
			kept.push(child);
		}
	}
	kept
}

#[cfg(test)]
mod tests {
	use crate::diagnostics::CollectingSink;
	use crate::translate_str;

	#[test]
	fn shared_declarations_in_every_if_branch_are_hoisted_once() {
		let source = "\
@kernel void k(float *a){\n\
  for(int i=0;i<2;++i; @outer0){\n\
    if(i==0){\n\
      @shared float s0;\n\
      a[i] = s0;\n\
    } else {\n\
      @shared float s1;\n\
      a[i] = s1;\n\
    }\n\
  }\n\
}\n\
";
		let mut sink = CollectingSink::new();
		let output = translate_str(source, "float_shared.okl", &mut sink).unwrap_or_else(|error| panic!("translation failed: {error}\n{:?}", sink.diagnostics));
		assert_eq!(output.text.matches("occaShared float s0;").count(), 1, "{}", output.text);
		assert_eq!(output.text.matches("occaShared float s1;").count(), 1, "{}", output.text);
		let s0_pos = output.text.find("occaShared float s0;").expect("s0 present");
		let s1_pos = output.text.find("occaShared float s1;").expect("s1 present");
		let loop_pos = output.text.find("occaOuterFor0").expect("outer loop present");
		assert!(s0_pos < loop_pos && s1_pos < loop_pos, "both shared decls from both if-branches must hoist ahead of the loop:\n{}", output.text);
	}
}
