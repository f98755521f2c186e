use thiserror::Error;
use wms_common::WmsError;

/// Syntax error in a single expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expr error at byte {offset}: {message}")]
pub struct ExprError {
    pub offset: usize,
    pub message: String,
}

impl ExprError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// An [`ExprError`] together with the expression it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error when evaluating the expression '{expr}' ({name}): {source}")]
pub struct EvalError {
    /// Which of the six expressions failed (`x1`, `yref`, ...).
    pub name: &'static str,
    pub expr: String,
    #[source]
    pub source: ExprError,
}

impl From<EvalError> for WmsError {
    fn from(err: EvalError) -> Self {
        WmsError::Expression {
            expr: err.expr,
            message: format!("{} ({})", err.source, err.name),
        }
    }
}
