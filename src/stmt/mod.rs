pub mod ast;
pub mod parser;

pub use ast::{Declarator, IfBranch, OklForKind, Param, Program, Stmt, StmtId, StmtKind};
pub use parser::parse_program;
