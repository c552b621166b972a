//! Normal form used to decide equivalence.
//!
//! Every expression is rewritten as a quotient of two Laurent polynomials with exact
//! rational coefficients. Anything that is not polynomial in its variables (function
//! calls, symbolic exponents, irrational roots) becomes an opaque [`Atom`] whose key is
//! built from the normal form of its arguments, so `\sin(2x)` and `\sin(x \cdot 2)`
//! share an atom.
//!
//! Two normal forms `a/b` and `c/d` are equal when `a*d - c*b` expands to zero. The
//! check never reports a false positive; identities that need more than expansion
//! (`\sin^2 x + \cos^2 x = 1`) are not recognised.

use std::collections::BTreeMap;
use std::fmt;

use super::ast::Expr;
use super::rational::Rational;
use super::{EvalError, MAX_DEPTH};

/// Largest integer exponent expanded by repeated multiplication.
const MAX_EXPONENT: i128 = 64;

/// Upper bound on terms in any intermediate polynomial.
const MAX_TERMS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Atom {
    Var(String),
    Opaque(String),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Var(name) => f.write_str(name),
            Atom::Opaque(key) => write!(f, "[{key}]"),
        }
    }
}

/// Product of atoms with non-zero integer exponents.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Monomial(BTreeMap<Atom, i64>);

impl Monomial {
    fn atom(atom: Atom) -> Self {
        Self(BTreeMap::from([(atom, 1)]))
    }

    fn mul(&self, rhs: &Monomial) -> Result<Monomial, EvalError> {
        let mut out = self.0.clone();
        for (atom, exp) in &rhs.0 {
            let entry = out.entry(atom.clone()).or_insert(0);
            *entry = entry.checked_add(*exp).ok_or(EvalError::Overflow)?;
            if *entry == 0 {
                out.remove(atom);
            }
        }
        Ok(Monomial(out))
    }

    fn recip(&self) -> Result<Monomial, EvalError> {
        self.0
            .iter()
            .map(|(atom, exp)| {
                exp.checked_neg()
                    .map(|e| (atom.clone(), e))
                    .ok_or(EvalError::Overflow)
            })
            .collect::<Result<_, _>>()
            .map(Monomial)
    }

    fn is_one(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (atom, exp) in &self.0 {
            if !first {
                f.write_str("*")?;
            }
            first = false;
            if *exp == 1 {
                write!(f, "{atom}")?;
            } else {
                write!(f, "{atom}^{exp}")?;
            }
        }
        Ok(())
    }
}

/// Sum of monomials with non-zero coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Poly(BTreeMap<Monomial, Rational>);

impl Poly {
    fn constant(value: Rational) -> Self {
        let mut terms = BTreeMap::new();
        if !value.is_zero() {
            terms.insert(Monomial::default(), value);
        }
        Self(terms)
    }

    fn atom(atom: Atom) -> Self {
        Self(BTreeMap::from([(Monomial::atom(atom), Rational::ONE)]))
    }

    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    fn as_constant(&self) -> Option<Rational> {
        match self.0.len() {
            0 => Some(Rational::ZERO),
            1 => self
                .0
                .iter()
                .next()
                .filter(|(m, _)| m.is_one())
                .map(|(_, c)| *c),
            _ => None,
        }
    }

    fn as_single_term(&self) -> Option<(&Monomial, Rational)> {
        if self.0.len() == 1 {
            self.0.iter().next().map(|(m, c)| (m, *c))
        } else {
            None
        }
    }

    fn add_term(&mut self, monomial: Monomial, coeff: Rational) -> Result<(), EvalError> {
        let sum = match self.0.get(&monomial) {
            Some(existing) => existing.checked_add(coeff)?,
            None => coeff,
        };
        if sum.is_zero() {
            self.0.remove(&monomial);
        } else {
            self.0.insert(monomial, sum);
        }
        if self.0.len() > MAX_TERMS {
            return Err(EvalError::TooComplex);
        }
        Ok(())
    }

    fn add(&self, rhs: &Poly) -> Result<Poly, EvalError> {
        let mut out = self.clone();
        for (m, c) in &rhs.0 {
            out.add_term(m.clone(), *c)?;
        }
        Ok(out)
    }

    fn neg(&self) -> Result<Poly, EvalError> {
        self.scale(Rational::integer(-1))
    }

    fn sub(&self, rhs: &Poly) -> Result<Poly, EvalError> {
        self.add(&rhs.neg()?)
    }

    fn scale(&self, k: Rational) -> Result<Poly, EvalError> {
        let mut out = Poly::default();
        for (m, c) in &self.0 {
            out.add_term(m.clone(), c.checked_mul(k)?)?;
        }
        Ok(out)
    }

    fn mul(&self, rhs: &Poly) -> Result<Poly, EvalError> {
        if self.0.len().saturating_mul(rhs.0.len()) > MAX_TERMS * 4 {
            return Err(EvalError::TooComplex);
        }
        let mut out = Poly::default();
        for (m1, c1) in &self.0 {
            for (m2, c2) in &rhs.0 {
                out.add_term(m1.mul(m2)?, c1.checked_mul(*c2)?)?;
            }
        }
        Ok(out)
    }

    fn mul_term(&self, monomial: &Monomial, coeff: Rational) -> Result<Poly, EvalError> {
        let mut out = Poly::default();
        for (m, c) in &self.0 {
            out.add_term(m.mul(monomial)?, c.checked_mul(coeff)?)?;
        }
        Ok(out)
    }

    fn pow(&self, exp: u32) -> Result<Poly, EvalError> {
        let mut out = Poly::constant(Rational::ONE);
        for _ in 0..exp {
            out = out.mul(self)?;
        }
        Ok(out)
    }

    /// Leading coefficient in the map's ordering, used to make keys canonical.
    fn leading_coefficient(&self) -> Option<Rational> {
        self.0.iter().next_back().map(|(_, c)| *c)
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("0");
        }
        let mut first = true;
        for (m, c) in &self.0 {
            if !first {
                f.write_str(" + ")?;
            }
            first = false;
            match (m.is_one(), c.is_one()) {
                (true, _) => write!(f, "{c}")?,
                (false, true) => write!(f, "{m}")?,
                (false, false) => write!(f, "{c}*{m}")?,
            }
        }
        Ok(())
    }
}

/// `num / den` with a non-zero denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normal {
    num: Poly,
    den: Poly,
}

impl Normal {
    fn from_poly(num: Poly) -> Self {
        Self {
            num,
            den: Poly::constant(Rational::ONE),
        }
    }

    fn constant(value: Rational) -> Self {
        Self::from_poly(Poly::constant(value))
    }

    fn atom(atom: Atom) -> Self {
        Self::from_poly(Poly::atom(atom))
    }

    /// Build a quotient, dividing through when the denominator is a single term.
    fn quotient(num: Poly, den: Poly) -> Result<Self, EvalError> {
        if den.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        if num.is_zero() {
            return Ok(Self::constant(Rational::ZERO));
        }
        if let Some((m, c)) = den.as_single_term() {
            let num = num.mul_term(&m.recip()?, c.recip()?)?;
            return Ok(Self::from_poly(num));
        }
        // keep the denominator monic so equal quotients print the same key
        let lead = den.leading_coefficient().unwrap_or(Rational::ONE);
        if lead.is_one() {
            return Ok(Self { num, den });
        }
        let inv = lead.recip()?;
        Ok(Self {
            num: num.scale(inv)?,
            den: den.scale(inv)?,
        })
    }

    fn as_constant(&self) -> Option<Rational> {
        let num = self.num.as_constant()?;
        let den = self.den.as_constant()?;
        num.checked_div(den).ok()
    }

    fn add(&self, rhs: &Normal) -> Result<Normal, EvalError> {
        if self.den == rhs.den {
            return Normal::quotient(self.num.add(&rhs.num)?, self.den.clone());
        }
        let num = self.num.mul(&rhs.den)?.add(&rhs.num.mul(&self.den)?)?;
        Normal::quotient(num, self.den.mul(&rhs.den)?)
    }

    fn neg(&self) -> Result<Normal, EvalError> {
        Ok(Normal {
            num: self.num.neg()?,
            den: self.den.clone(),
        })
    }

    fn sub(&self, rhs: &Normal) -> Result<Normal, EvalError> {
        self.add(&rhs.neg()?)
    }

    fn mul(&self, rhs: &Normal) -> Result<Normal, EvalError> {
        Normal::quotient(self.num.mul(&rhs.num)?, self.den.mul(&rhs.den)?)
    }

    fn div(&self, rhs: &Normal) -> Result<Normal, EvalError> {
        if rhs.num.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Normal::quotient(self.num.mul(&rhs.den)?, self.den.mul(&rhs.num)?)
    }

    fn powi(&self, exp: i128) -> Result<Normal, EvalError> {
        if exp.abs() > MAX_EXPONENT {
            return Err(EvalError::ExponentTooLarge);
        }
        let k = u32::try_from(exp.unsigned_abs()).map_err(|_| EvalError::ExponentTooLarge)?;
        let (num, den) = (self.num.pow(k)?, self.den.pow(k)?);
        if exp < 0 {
            Normal::quotient(den, num)
        } else {
            Normal::quotient(num, den)
        }
    }

    /// `self^(p/q)` for a non-integer rational exponent.
    fn pow_rational(&self, exp: Rational) -> Result<Normal, EvalError> {
        let (p, q) = (exp.numer(), exp.denom());
        let q_u32 = u32::try_from(q).map_err(|_| EvalError::ExponentTooLarge)?;

        // 0^(p/q) is 0 for a positive exponent
        if self.num.is_zero() {
            if p < 0 {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(Normal::constant(Rational::ZERO));
        }

        // exact root of a single term: sqrt(4x^2) = 2x
        if self.den.as_constant().is_some() {
            if let Some((m, c)) = self.num.as_single_term() {
                let den = self.den.as_constant().unwrap_or(Rational::ONE);
                let coeff_root = c.checked_div(den)?.exact_root(q_u32);
                let divisible = m.0.values().all(|e| i128::from(*e) % q == 0);
                if let (Some(root), true) = (coeff_root, divisible) {
                    let mut monomial = BTreeMap::new();
                    for (atom, e) in &m.0 {
                        let reduced = i64::try_from(i128::from(*e) / q)
                            .map_err(|_| EvalError::Overflow)?;
                        monomial.insert(atom.clone(), reduced);
                    }
                    let root = Normal::quotient(
                        Poly(BTreeMap::from([(Monomial(monomial), Rational::ONE)])),
                        Poly::constant(Rational::ONE),
                    )?
                    .mul(&Normal::constant(root))?;
                    return root.powi(p);
                }
            }
        }

        let root = Normal::atom(Atom::Opaque(format!("({self})^(1/{q})")));
        root.powi(p)
    }

    /// Equality of the represented values, by cross-multiplication.
    pub fn same_value(&self, rhs: &Normal) -> Result<bool, EvalError> {
        let lhs = self.num.mul(&rhs.den)?;
        let rhs = rhs.num.mul(&self.den)?;
        Ok(lhs.sub(&rhs)?.is_zero())
    }
}

impl fmt::Display for Normal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.as_constant().is_some_and(|c| c.is_one()) {
            write!(f, "{}", self.num)
        } else {
            write!(f, "({}) / ({})", self.num, self.den)
        }
    }
}

/// Rewrite an expression into its normal form.
///
/// # Errors
///
/// Returns `EvalError` on division by zero, coefficient overflow, oversized exponents
/// or expansions, trees nested deeper than [`MAX_DEPTH`], and on equations (which
/// have no single value).
pub fn normalize(expr: &Expr) -> Result<Normal, EvalError> {
    normalize_at(expr, 0)
}

fn normalize_at(expr: &Expr, depth: usize) -> Result<Normal, EvalError> {
    if depth >= MAX_DEPTH {
        return Err(EvalError::TooDeep);
    }
    let sub = |e: &Expr| normalize_at(e, depth + 1);
    match expr {
        Expr::Number(n) => Ok(Normal::constant(*n)),
        Expr::Symbol(name) => Ok(Normal::atom(Atom::Var(name.clone()))),
        Expr::Neg(inner) => sub(inner)?.neg(),
        Expr::Add(a, b) => sub(a)?.add(&sub(b)?),
        Expr::Sub(a, b) => sub(a)?.sub(&sub(b)?),
        Expr::Mul(a, b) => sub(a)?.mul(&sub(b)?),
        Expr::Div(a, b) => sub(a)?.div(&sub(b)?),
        Expr::Pow(base, exp) => {
            let exp = sub(exp)?;
            // (a^(p/q))^k with an integral product collapses to a power of a
            if let Expr::Pow(inner, inner_exp) = &**base {
                let inner_exp = sub(inner_exp)?;
                if let (Some(r), Some(k)) = (inner_exp.as_constant(), exp.as_constant()) {
                    let product = r.checked_mul(k)?;
                    if r.as_integer().is_none() && product.as_integer().is_some() {
                        return power(&sub(inner)?, &Normal::constant(product));
                    }
                }
            }
            power(&sub(base)?, &exp)
        }
        Expr::Call(func, arg) => {
            let arg = sub(arg)?;
            Ok(Normal::atom(Atom::Opaque(format!("{}({arg})", func.name()))))
        }
        Expr::Equation(..) => Err(EvalError::Equation),
    }
}

fn power(base: &Normal, exp: &Normal) -> Result<Normal, EvalError> {
    match exp.as_constant() {
        Some(e) => match e.as_integer() {
            Some(k) => {
                if k < 0 && base.num.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                base.powi(k)
            }
            None => base.pow_rational(e),
        },
        None => {
            if base.as_constant().is_some_and(|c| c.is_one()) {
                return Ok(Normal::constant(Rational::ONE));
            }
            Ok(Normal::atom(Atom::Opaque(format!("({base})^({exp})"))))
        }
    }
}
