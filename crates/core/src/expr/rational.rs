use std::fmt;

use super::EvalError;

/// Exact fraction with a positive denominator, always in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    i128::try_from(a).unwrap_or(1)
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// # Errors
    ///
    /// Returns `EvalError::DivisionByZero` when `den == 0`.
    pub fn new(num: i128, den: i128) -> Result<Self, EvalError> {
        if den == 0 {
            return Err(EvalError::DivisionByZero);
        }
        let g = gcd(num, den).max(1);
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg().ok_or(EvalError::Overflow)?;
            den = den.checked_neg().ok_or(EvalError::Overflow)?;
        }
        Ok(Self { num, den })
    }

    #[must_use]
    pub fn integer(value: i128) -> Self {
        Self { num: value, den: 1 }
    }

    /// Parse a decimal literal such as `12`, `0.25` or `.5` exactly.
    pub(crate) fn from_decimal(lexeme: &str) -> Option<Self> {
        let (int_part, frac_part) = lexeme.split_once('.').unwrap_or((lexeme, ""));
        let mut num: i128 = 0;
        let mut den: i128 = 1;
        for ch in int_part.chars().chain(frac_part.chars()) {
            let digit = i128::from(ch.to_digit(10)?);
            num = num.checked_mul(10)?.checked_add(digit)?;
        }
        for _ in frac_part.chars() {
            den = den.checked_mul(10)?;
        }
        Self::new(num, den).ok()
    }

    #[must_use]
    pub fn numer(&self) -> i128 {
        self.num
    }

    #[must_use]
    pub fn denom(&self) -> i128 {
        self.den
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    #[must_use]
    pub fn is_one(&self) -> bool {
        self.num == 1 && self.den == 1
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        (self.den == 1).then_some(self.num)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, EvalError> {
        let num = self
            .num
            .checked_mul(rhs.den)
            .and_then(|a| rhs.num.checked_mul(self.den).and_then(|b| a.checked_add(b)))
            .ok_or(EvalError::Overflow)?;
        let den = self.den.checked_mul(rhs.den).ok_or(EvalError::Overflow)?;
        Self::new(num, den)
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, EvalError> {
        // cross-reduce first to keep intermediates small
        let g1 = gcd(self.num, rhs.den).max(1);
        let g2 = gcd(rhs.num, self.den).max(1);
        let num = (self.num / g1)
            .checked_mul(rhs.num / g2)
            .ok_or(EvalError::Overflow)?;
        let den = (self.den / g2)
            .checked_mul(rhs.den / g1)
            .ok_or(EvalError::Overflow)?;
        Self::new(num, den)
    }

    pub fn checked_div(self, rhs: Self) -> Result<Self, EvalError> {
        self.checked_mul(rhs.recip()?)
    }

    pub fn checked_neg(self) -> Result<Self, EvalError> {
        Ok(Self {
            num: self.num.checked_neg().ok_or(EvalError::Overflow)?,
            den: self.den,
        })
    }

    pub fn recip(self) -> Result<Self, EvalError> {
        Self::new(self.den, self.num)
    }

    /// Exact `q`-th root, if one exists.
    pub(crate) fn exact_root(self, q: u32) -> Option<Self> {
        if q == 0 || (self.num < 0 && q % 2 == 0) {
            return None;
        }
        let num = int_root(self.num, q)?;
        let den = int_root(self.den, q)?;
        Self::new(num, den).ok()
    }
}

fn int_root(value: i128, q: u32) -> Option<i128> {
    if value < 0 {
        return int_root(value.checked_neg()?, q).map(|r| -r);
    }
    if value < 2 || q == 1 {
        return Some(value);
    }
    // bisect on the integer floor root; a power that overflows is too big
    let (mut lo, mut hi) = (1_i128, value);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        match mid.checked_pow(q) {
            Some(p) if p <= value => lo = mid,
            _ => hi = mid - 1,
        }
    }
    (lo.checked_pow(q) == Some(value)).then_some(lo)
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
