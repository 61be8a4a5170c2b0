pub mod ast;
pub mod parser;

pub use ast::{Expr, ExprArena, ExprId, ExprKind, ExprTree};
pub use parser::parse_tokens;
