/// A parsed expression with variables and functions already resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(Var),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: Func,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Variables visible to every expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    XRef,
    YRef,
    X1,
    X2,
    Y1,
    Y2,
    T,
}

impl Var {
    pub const ALL: [Var; 7] = [
        Var::XRef,
        Var::YRef,
        Var::X1,
        Var::X2,
        Var::Y1,
        Var::Y2,
        Var::T,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Var::XRef => "xref",
            Var::YRef => "yref",
            Var::X1 => "x1",
            Var::X2 => "x2",
            Var::Y1 => "y1",
            Var::Y2 => "y2",
            Var::T => "t",
        }
    }

    pub fn from_name(name: &str) -> Option<Var> {
        Var::ALL.into_iter().find(|v| v.name() == name)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Abs,
    Exp,
    Log,
    Pow,
    Min,
    Max,
    Mod,
    Floor,
    Ceil,
    Trunc,
    Round,
    Hypot,
    Clip,
    Lerp,
    Sgn,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Not,
    If,
    IfNot,
    Between,
    IsNan,
    IsInf,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Func> {
        let func = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "atan2" => Func::Atan2,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "exp" => Func::Exp,
            "log" => Func::Log,
            "pow" => Func::Pow,
            "min" => Func::Min,
            "max" => Func::Max,
            "mod" => Func::Mod,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "trunc" => Func::Trunc,
            "round" => Func::Round,
            "hypot" => Func::Hypot,
            "clip" => Func::Clip,
            "lerp" => Func::Lerp,
            "sgn" => Func::Sgn,
            "lt" => Func::Lt,
            "lte" => Func::Lte,
            "gt" => Func::Gt,
            "gte" => Func::Gte,
            "eq" => Func::Eq,
            "not" => Func::Not,
            "if" => Func::If,
            "ifnot" => Func::IfNot,
            "between" => Func::Between,
            "isnan" => Func::IsNan,
            "isinf" => Func::IsInf,
            _ => return None,
        };
        Some(func)
    }

    /// Accepted argument counts as (min, max).
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Func::Atan2
            | Func::Pow
            | Func::Min
            | Func::Max
            | Func::Mod
            | Func::Hypot
            | Func::Lt
            | Func::Lte
            | Func::Gt
            | Func::Gte
            | Func::Eq => (2, 2),
            Func::Clip | Func::Lerp | Func::Between => (3, 3),
            Func::If | Func::IfNot => (2, 3),
            _ => (1, 1),
        }
    }
}

/// Named constants, resolved at parse time.
pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        "PHI" => Some(1.618_033_988_749_895),
        _ => None,
    }
}
