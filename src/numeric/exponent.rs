use crate::numeric::value::{NumericError, NumericResult, Value};
use num::rational::{BigRational, Rational64};
use num::traits::{CheckedAdd, CheckedMul, CheckedSub};
use num::{BigInt, One, Signed, ToPrimitive, Zero};
use std::fmt;

/// Exponent of a power node or of a polynomial variable: an integer or a reduced rational.
/// Rationals with unit denominator are always stored as `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exponent {
    Integer(i64),
    Rational(Rational64),
}

impl Exponent {
    pub fn int(n: i64) -> Exponent {
        Exponent::Integer(n)
    }

    pub fn ratio(numer: i64, denom: i64) -> NumericResult<Exponent> {
        if denom == 0 {
            return Err(NumericError::Arithmetic(format!(
                "exponent {}/{} has zero denominator",
                numer, denom
            )));
        }
        Ok(Exponent::from_ratio(Rational64::new(numer, denom)))
    }

    fn from_ratio(r: Rational64) -> Exponent {
        if r.is_integer() {
            Exponent::Integer(r.to_integer())
        } else {
            Exponent::Rational(r)
        }
    }

    fn as_ratio(&self) -> Rational64 {
        match self {
            Exponent::Integer(n) => Rational64::from_integer(*n),
            Exponent::Rational(r) => *r,
        }
    }

    pub fn numer(&self) -> i64 {
        *self.as_ratio().numer()
    }

    pub fn denom(&self) -> i64 {
        *self.as_ratio().denom()
    }

    pub fn is_zero(&self) -> bool {
        self.as_ratio().is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.as_ratio().is_one()
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Exponent::Integer(_))
    }

    pub fn is_negative(&self) -> bool {
        self.as_ratio().is_negative()
    }

    /// largest integer not greater than the exponent
    pub fn floor(&self) -> i64 {
        self.as_ratio().floor().to_integer()
    }

    /// an even root index restricts real bases to [0, ∞)
    pub fn requires_nonnegative_base(&self) -> bool {
        self.denom() % 2 == 0
    }

    /// exact value of the exponent (used as the power-rule coefficient)
    pub fn to_value(&self) -> Value {
        match self {
            Exponent::Integer(n) => Value::integer(*n),
            Exponent::Rational(r) => Value::from(BigRational::new(
                BigInt::from(*r.numer()),
                BigInt::from(*r.denom()),
            )),
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.as_ratio().to_f64().unwrap_or(f64::NAN)
    }

    /// `base^self` in the numeric value model
    pub fn apply_to(&self, base: &Value) -> NumericResult<Value> {
        match self {
            Exponent::Integer(n) => base.powi(*n),
            Exponent::Rational(r) => base.pow_ratio(*r.numer(), *r.denom()),
        }
    }
}

//___________________________________ARITHMETIC____________________________________

/// Exponent arithmetic is exact and checked: a numerator or denominator leaving `i64` is an
/// `Arithmetic` error, never a wrapped value.
impl Exponent {
    fn checked(
        self,
        rhs: Exponent,
        op: &str,
        f: impl Fn(&Rational64, &Rational64) -> Option<Rational64>,
    ) -> NumericResult<Exponent> {
        f(&self.as_ratio(), &rhs.as_ratio())
            .map(Exponent::from_ratio)
            .ok_or_else(|| {
                NumericError::Arithmetic(format!("exponent overflow in {} {} {}", self, op, rhs))
            })
    }

    pub fn checked_add(self, rhs: Exponent) -> NumericResult<Exponent> {
        self.checked(rhs, "+", |a, b| a.checked_add(b))
    }

    pub fn checked_sub(self, rhs: Exponent) -> NumericResult<Exponent> {
        self.checked(rhs, "-", |a, b| a.checked_sub(b))
    }

    pub fn checked_mul(self, rhs: Exponent) -> NumericResult<Exponent> {
        self.checked(rhs, "*", |a, b| a.checked_mul(b))
    }

    pub fn checked_neg(self) -> NumericResult<Exponent> {
        Exponent::int(0).checked_sub(self)
    }
}

impl From<i64> for Exponent {
    fn from(n: i64) -> Exponent {
        Exponent::Integer(n)
    }
}

impl From<i32> for Exponent {
    fn from(n: i32) -> Exponent {
        Exponent::Integer(n as i64)
    }
}

impl fmt::Display for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Exponent::Integer(n) => write!(f, "{}", n),
            Exponent::Rational(r) => write!(f, "({}/{})", r.numer(), r.denom()),
        }
    }
}
