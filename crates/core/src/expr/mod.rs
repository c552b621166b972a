//! Parsing and equivalence checking for LaTeX-flavoured answers.
//!
//! [`parse`] turns text such as `\frac{x^2 - 1}{x - 1}` or `x = 4` into an [`Expr`];
//! [`equivalent`] decides whether two parsed answers denote the same value after
//! expansion into a normal form (see [`Normal`]). Everything here is pure.

mod ast;
mod normal;
mod parser;
mod rational;
mod token;

use thiserror::Error;

use crate::model::BareValuePolicy;

pub use ast::{Expr, Func};
pub use normal::{Normal, normalize};
pub use parser::parse;
pub use rational::Rational;

/// Longest answer text accepted, in bytes.
pub const MAX_INPUT_LEN: usize = 2048;

/// Deepest nesting the parser and the normalizer will follow.
pub const MAX_DEPTH: usize = 256;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Malformed answer text. Positions are byte offsets into the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {ch:?} at {at}")]
    UnexpectedChar { ch: char, at: usize },

    #[error("unexpected {found:?} at {at}")]
    UnexpectedToken { found: String, at: usize },

    #[error("expected {expected}, found {found:?} at {at}")]
    Expected {
        expected: &'static str,
        found: String,
        at: usize,
    },

    #[error("unexpected end of input at {at}")]
    UnexpectedEnd { at: usize },

    #[error("number {lexeme:?} at {at} is too large")]
    InvalidNumber { lexeme: String, at: usize },

    #[error("unknown command \\{name} at {at}")]
    UnknownCommand { name: String, at: usize },

    #[error("input is {len} bytes, longer than {}", MAX_INPUT_LEN)]
    TooLong { len: usize },

    #[error("nesting deeper than {} at {at}", MAX_DEPTH)]
    TooDeep { at: usize },
}

/// Failure while bringing a parsed expression into normal form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("coefficient overflow")]
    Overflow,

    #[error("exponent too large to expand")]
    ExponentTooLarge,

    #[error("expression expands to too many terms")]
    TooComplex,

    #[error("an equation has no single value")]
    Equation,

    #[error("expression nests deeper than {}", MAX_DEPTH)]
    TooDeep,
}

//
// ─── EQUIVALENCE ───────────────────────────────────────────────────────────────
//

/// Equivalence with the default policy (a bare value matches `x = value`).
#[must_use]
pub fn equivalent(a: &Expr, b: &Expr) -> bool {
    equivalent_with(a, b, BareValuePolicy::default())
}

/// Decide whether two parsed answers are mathematically the same.
///
/// - Two expressions: equal normal forms.
/// - Two equations: matching sides, in either orientation (`x = 4` and `4 = x`).
/// - An equation and an expression: only under [`BareValuePolicy::Accept`], and only
///   when one side of the equation is a lone variable whose other side matches.
///
/// Normalization failures (division by zero, overflow) count as "not equivalent".
#[must_use]
pub fn equivalent_with(a: &Expr, b: &Expr, policy: BareValuePolicy) -> bool {
    match (a, b) {
        (Expr::Equation(l1, r1), Expr::Equation(l2, r2)) => {
            (same_value(l1, l2) && same_value(r1, r2)) || (same_value(l1, r2) && same_value(r1, l2))
        }
        (Expr::Equation(lhs, rhs), value) | (value, Expr::Equation(lhs, rhs)) => {
            if policy == BareValuePolicy::Reject {
                return false;
            }
            if lhs.as_symbol().is_some() && same_value(rhs, value) {
                return true;
            }
            rhs.as_symbol().is_some() && same_value(lhs, value)
        }
        _ => same_value(a, b),
    }
}

fn same_value(a: &Expr, b: &Expr) -> bool {
    match (normalize(a), normalize(b)) {
        (Ok(a), Ok(b)) => a.same_value(&b).unwrap_or(false),
        _ => false,
    }
}

/// Outcome of checking submitted text against a canonical answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerMatch {
    Equivalent,
    NotEquivalent,
    /// The submission could not be parsed.
    Unparseable(ParseError),
    /// The canonical answer itself failed to parse (a catalog defect).
    InvalidCanonical(ParseError),
}

impl AnswerMatch {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, AnswerMatch::Equivalent)
    }
}

/// Parse both texts and compare them.
#[must_use]
pub fn check_answer(submitted: &str, canonical: &str, policy: BareValuePolicy) -> AnswerMatch {
    let expected = match parse(canonical) {
        Ok(expr) => expr,
        Err(err) => return AnswerMatch::InvalidCanonical(err),
    };
    let given = match parse(submitted) {
        Ok(expr) => expr,
        Err(err) => return AnswerMatch::Unparseable(err),
    };
    if equivalent_with(&given, &expected, policy) {
        AnswerMatch::Equivalent
    } else {
        AnswerMatch::NotEquivalent
    }
}
