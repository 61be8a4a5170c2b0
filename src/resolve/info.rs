use crate::origin::Origin;
use crate::stmt::StmtId;

/// A declared variable's shape, enough for the OKL passes (notably `qualify_kernel_args`) to
/// decide qualifier/pointer rewrites without re-reading source text.
#[derive(Debug, Clone)]
pub struct VarInfo {
	pub name: String,
	pub type_name: String,
	pub qualifiers: Vec<String>,
	pub is_pointer: bool,
	pub defining_stmt: StmtId,
	pub origin: Origin,
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
	pub name: String,
	pub defining_stmt: StmtId,
	pub origin: Origin,
}
