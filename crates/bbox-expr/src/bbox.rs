use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;
use wms_common::BoundingBox;

use crate::ast::{Expr, Var};
use crate::error::EvalError;
use crate::eval::Bindings;
use crate::parser::parse_expr;

/// The six expression strings, as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExprSet {
    #[serde(deserialize_with = "expr_source")]
    pub xref: String,
    #[serde(deserialize_with = "expr_source")]
    pub yref: String,
    #[serde(deserialize_with = "expr_source")]
    pub x1: String,
    #[serde(deserialize_with = "expr_source")]
    pub x2: String,
    #[serde(deserialize_with = "expr_source")]
    pub y1: String,
    #[serde(deserialize_with = "expr_source")]
    pub y2: String,
}

/// Accept bare numbers (`x1: -180` in YAML) as expression text.
fn expr_source<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Source {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Source::deserialize(deserializer)? {
        Source::Text(s) => s,
        Source::Int(n) => n.to_string(),
        Source::Float(f) => f.to_string(),
    })
}

impl Default for ExprSet {
    fn default() -> Self {
        Self {
            xref: "0".to_string(),
            yref: "0".to_string(),
            x1: "-180".to_string(),
            x2: "180".to_string(),
            y1: "-90".to_string(),
            y2: "90".to_string(),
        }
    }
}

impl ExprSet {
    /// Expressions paired with the variable they bind, in evaluation order.
    pub fn in_order(&self) -> [(Var, &str); 6] {
        [
            (Var::XRef, self.xref.as_str()),
            (Var::YRef, self.yref.as_str()),
            (Var::X1, self.x1.as_str()),
            (Var::X2, self.x2.as_str()),
            (Var::Y1, self.y1.as_str()),
            (Var::Y2, self.y2.as_str()),
        ]
    }
}

/// A parsed [`ExprSet`], ready to be evaluated once per frame.
#[derive(Debug, Clone)]
pub struct BboxExpressions {
    exprs: Vec<(Var, Expr)>,
}

impl BboxExpressions {
    /// Parse all six expressions, failing on the first bad one.
    pub fn compile(set: &ExprSet) -> Result<Self, EvalError> {
        let exprs = set
            .in_order()
            .into_iter()
            .map(|(var, src)| {
                parse_expr(src)
                    .map(|expr| (var, expr))
                    .map_err(|source| EvalError {
                        name: var.name(),
                        expr: src.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { exprs })
    }

    /// Evaluate in order, binding each result before the next expression.
    ///
    /// Every call starts from fresh bindings, so the result only depends
    /// on `t`.
    pub fn evaluate(&self, t: f64) -> BoundingBox {
        let mut bindings = Bindings::new(t);
        for (var, expr) in &self.exprs {
            let value = expr.eval(&bindings);
            bindings.set(*var, value);
        }
        trace!(
            t,
            xref = bindings.get(Var::XRef),
            yref = bindings.get(Var::YRef),
            "evaluated bbox expressions"
        );
        BoundingBox::new(
            bindings.get(Var::X1),
            bindings.get(Var::Y1),
            bindings.get(Var::X2),
            bindings.get(Var::Y2),
        )
    }
}

/// Parse and evaluate `set` at time `t` in one step.
pub fn evaluate(set: &ExprSet, t: f64) -> Result<BoundingBox, EvalError> {
    Ok(BboxExpressions::compile(set)?.evaluate(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_bbox_approx_eq;

    #[test]
    fn test_default_set_is_the_world() {
        let bbox = evaluate(&ExprSet::default(), 0.0).unwrap();
        assert_eq!(bbox, BoundingBox::world());
    }

    #[test]
    fn test_reference_variables_feed_the_box() {
        let set = ExprSet {
            xref: "t*2".to_string(),
            yref: "xref/2".to_string(),
            x1: "xref-1".to_string(),
            x2: "xref+1".to_string(),
            y1: "yref-1".to_string(),
            y2: "yref+1".to_string(),
        };
        let bbox = evaluate(&set, 5.0).unwrap();
        assert_bbox_approx_eq!(bbox, (9.0, 4.0, 11.0, 6.0), 1e-12);
    }

    #[test]
    fn test_error_names_the_failing_expression() {
        let set = ExprSet {
            y1: "-90 +".to_string(),
            ..ExprSet::default()
        };
        let err = BboxExpressions::compile(&set).unwrap_err();
        assert_eq!(err.name, "y1");
        assert_eq!(err.expr, "-90 +");
        assert!(err.to_string().contains("'-90 +'"));
    }

    #[test]
    fn test_compiled_set_is_reusable() {
        let exprs = BboxExpressions::compile(&ExprSet {
            x1: "t".to_string(),
            ..ExprSet::default()
        })
        .unwrap();
        assert_eq!(exprs.evaluate(1.0).x1, 1.0);
        assert_eq!(exprs.evaluate(2.0).x1, 2.0);
    }
}
