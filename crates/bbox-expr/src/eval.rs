use crate::ast::{BinaryOp, Expr, Func, Var};

/// Variable values for one evaluation call.
///
/// Everything except `t` starts out as NaN.
#[derive(Debug, Clone, Copy)]
pub struct Bindings {
    values: [f64; Var::ALL.len()],
}

impl Bindings {
    pub fn new(t: f64) -> Self {
        let mut values = [f64::NAN; Var::ALL.len()];
        values[Var::T.index()] = t;
        Self { values }
    }

    pub fn get(&self, var: Var) -> f64 {
        self.values[var.index()]
    }

    pub fn set(&mut self, var: Var, value: f64) {
        self.values[var.index()] = value;
    }
}

impl Expr {
    /// Evaluate against `bindings`. Never fails; bad input yields NaN.
    pub fn eval(&self, bindings: &Bindings) -> f64 {
        match self {
            Expr::Num(v) => *v,
            Expr::Var(var) => bindings.get(*var),
            Expr::Neg(e) => -e.eval(bindings),
            Expr::Binary { op, left, right } => {
                let l = left.eval(bindings);
                let r = right.eval(bindings);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Pow => l.powf(r),
                }
            }
            Expr::Call { func, args } => call(*func, args, bindings),
        }
    }
}

fn truthy(v: f64) -> bool {
    v != 0.0
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn call(func: Func, args: &[Expr], b: &Bindings) -> f64 {
    let arg = |i: usize| args[i].eval(b);

    match func {
        // Only the taken branch is evaluated.
        Func::If => {
            if truthy(arg(0)) {
                arg(1)
            } else if args.len() > 2 {
                arg(2)
            } else {
                0.0
            }
        }
        Func::IfNot => {
            if !truthy(arg(0)) {
                arg(1)
            } else if args.len() > 2 {
                arg(2)
            } else {
                0.0
            }
        }

        Func::Sin => arg(0).sin(),
        Func::Cos => arg(0).cos(),
        Func::Tan => arg(0).tan(),
        Func::Asin => arg(0).asin(),
        Func::Acos => arg(0).acos(),
        Func::Atan => arg(0).atan(),
        Func::Atan2 => arg(0).atan2(arg(1)),
        Func::Sinh => arg(0).sinh(),
        Func::Cosh => arg(0).cosh(),
        Func::Tanh => arg(0).tanh(),
        Func::Sqrt => arg(0).sqrt(),
        Func::Abs => arg(0).abs(),
        Func::Exp => arg(0).exp(),
        Func::Log => arg(0).ln(),
        Func::Pow => arg(0).powf(arg(1)),
        Func::Floor => arg(0).floor(),
        Func::Ceil => arg(0).ceil(),
        Func::Trunc => arg(0).trunc(),
        Func::Round => arg(0).round(),
        Func::Hypot => arg(0).hypot(arg(1)),
        Func::Mod => arg(0) % arg(1),
        Func::Min => {
            let (a, c) = (arg(0), arg(1));
            if a > c {
                c
            } else {
                a
            }
        }
        Func::Max => {
            let (a, c) = (arg(0), arg(1));
            if a > c {
                a
            } else {
                c
            }
        }
        Func::Clip => {
            let (x, lo, hi) = (arg(0), arg(1), arg(2));
            if x.is_nan() || lo.is_nan() || hi.is_nan() {
                f64::NAN
            } else {
                x.max(lo).min(hi)
            }
        }
        Func::Lerp => {
            let (a, c, f) = (arg(0), arg(1), arg(2));
            a + (c - a) * f
        }
        Func::Sgn => {
            let x = arg(0);
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                x
            }
        }
        Func::Lt => flag(arg(0) < arg(1)),
        Func::Lte => flag(arg(0) <= arg(1)),
        Func::Gt => flag(arg(0) > arg(1)),
        Func::Gte => flag(arg(0) >= arg(1)),
        Func::Eq => flag(arg(0) == arg(1)),
        Func::Not => flag(arg(0) == 0.0),
        Func::Between => {
            let x = arg(0);
            flag(x >= arg(1) && x <= arg(2))
        }
        Func::IsNan => flag(arg(0).is_nan()),
        Func::IsInf => flag(arg(0).is_infinite()),
    }
}
