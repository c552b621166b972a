use std::fmt;

use super::rational::Rational;

/// Named single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
}

impl Func {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Ln => "ln",
            Func::Log => "log",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "ln" => Some(Func::Ln),
            "log" => Some(Func::Log),
            _ => None,
        }
    }
}

/// Constructor of a binary node, such as `Expr::Add`.
pub(crate) type Combine = fn(Box<Expr>, Box<Expr>) -> Expr;

/// Parsed expression tree.
///
/// `\sqrt{a}` parses to `a^(1/2)` and `\exp(a)` to `e^a`, so there is one spelling of
/// each operation by the time a tree reaches normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Rational),
    Symbol(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
    /// `lhs = rhs`; only ever produced at the top level.
    Equation(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub(crate) fn binary(make: Combine, lhs: Expr, rhs: Expr) -> Expr {
        make(Box::new(lhs), Box::new(rhs))
    }

    /// The variable name if this is a bare symbol such as `x`.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::Neg(e) => write!(f, "-({e})"),
            Expr::Add(a, b) => write!(f, "({a} + {b})"),
            Expr::Sub(a, b) => write!(f, "({a} - {b})"),
            Expr::Mul(a, b) => write!(f, "({a} * {b})"),
            Expr::Div(a, b) => write!(f, "({a} / {b})"),
            Expr::Pow(a, b) => write!(f, "({a})^({b})"),
            Expr::Call(func, arg) => write!(f, "{}({arg})", func.name()),
            Expr::Equation(a, b) => write!(f, "{a} = {b}"),
        }
    }
}
