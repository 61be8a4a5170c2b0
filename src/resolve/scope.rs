use super::info::{TypeInfo, VarInfo};
use crate::stmt::{Program, StmtId};

/// Walks `start`'s statement chain outward, returning the nearest enclosing declaration of
/// `name`, if any.
#[must_use]
pub fn lookup_var<'a>(program: &'a Program, start: StmtId, name: &str) -> Option<&'a VarInfo> {
	program.ancestors(start).find_map(|id| program.get(id).scope_vars.get(name)).or_else(|| program.global_vars.get(name))
}

#[must_use]
pub fn lookup_type<'a>(program: &'a Program, start: StmtId, name: &str) -> Option<&'a TypeInfo> {
	program.ancestors(start).find_map(|id| program.get(id).scope_types.get(name)).or_else(|| program.global_types.get(name))
}
