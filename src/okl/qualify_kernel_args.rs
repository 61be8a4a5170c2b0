use crate::stmt::{Param, Program, StmtKind};

/// Pass 7: pointer-typed kernel arguments gain the `occaPointer` qualifier, value
/// arguments gain the right-qualifier `occaVariable` (and drop any `&`, which OKL kernels never
/// actually need since `occaVariable` already threads the argument through a reference-shaped
/// ABI), and every kernel gains a synthesized `occaKernelInfoArg` leading argument.
pub fn run(program: &mut Program) {
	let kernels: Vec<_> = program.top_level.iter().copied().filter(|&id| super::is_kernel(program, id) && !super::is_native(program, id)).collect();
	for kernel in kernels {
		let StmtKind::FunctionDefinition { params, .. } = &mut program.get_mut(kernel).kind else { continue };
		for param in params.iter_mut() {
			qualify(param);
		}
		params.insert(0, kernel_info_arg());
	}
}

fn qualify(param: &mut Param) {
	if param.is_pointer {
		if !param.qualifiers.iter().any(|qualifier| qualifier == "occaPointer") {
			param.qualifiers.push("occaPointer".to_owned());
		}
	} else {
		param.qualifiers.retain(|qualifier| qualifier != "&");
		if !param.qualifiers.iter().any(|qualifier| qualifier == "occaVariable") {
			param.qualifiers.push("occaVariable".to_owned());
		}
	}
}

fn kernel_info_arg() -> Param {
	Param { qualifiers: Vec::new(), type_name: "occaKernelInfoArg".to_owned(), is_pointer: false, name: String::new() }
}
