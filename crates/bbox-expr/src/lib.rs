//! Bounding box expressions evaluated once per frame.
//!
//! Six scalar expressions (`xref`, `yref`, `x1`, `x2`, `y1`, `y2`) are
//! evaluated in that order against the frame time `t`. Each result is bound
//! to its variable before the next expression runs, so later expressions can
//! refer to earlier ones; a variable read before it has been evaluated is
//! NaN.

mod ast;
mod bbox;
mod error;
mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, Func, Var};
pub use bbox::{evaluate, BboxExpressions, ExprSet};
pub use error::{EvalError, ExprError};
pub use eval::Bindings;
pub use parser::{parse_expr, MAX_DEPTH};
