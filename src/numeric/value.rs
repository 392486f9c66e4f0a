use num::bigint::BigInt;
use num::integer::Roots;
use num::rational::BigRational;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use num_complex::Complex64;
use std::cmp::Ordering;
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Kinds of numeric values ordered from the narrowest to the widest.
///
/// Every narrower kind embeds exactly into every wider one, so `Integer < Rational < Real < Complex`
/// doubles as the promotion order used by mixed arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum NumericKind {
    Integer,
    Rational,
    Real,
    Complex,
}

impl NumericKind {
    /// the narrowest kind able to hold values of both kinds
    pub fn widest(self, other: NumericKind) -> NumericKind {
        self.max(other)
    }

    /// true if a value of kind `other` can be passed where `self` is expected without narrowing
    pub fn accepts(self, other: NumericKind) -> bool {
        other <= self
    }

    pub fn is_ordered(self) -> bool {
        self != NumericKind::Complex
    }
}

/// Errors raised by the numeric layer
#[derive(Debug, Clone, PartialEq)]
pub enum NumericError {
    /// value can not be represented in the requested kind
    Coercion { value: String, target: NumericKind },
    /// division by exact zero or an operation without a defined result
    Arithmetic(String),
    /// ordering requested for values that have none (complex numbers, NaN)
    Unordered(String),
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NumericError::Coercion { value, target } => {
                write!(f, "value {} can not be represented as {}", value, target)
            }
            NumericError::Arithmetic(msg) => write!(f, "arithmetic error: {}", msg),
            NumericError::Unordered(msg) => write!(f, "values are not ordered: {}", msg),
        }
    }
}

impl std::error::Error for NumericError {}

pub type NumericResult<T> = Result<T, NumericError>;

/// A numeric value of one of the supported kinds.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(BigInt),
    Rational(BigRational),
    Real(f64),
    Complex(Complex64),
}

impl Value {
    //___________________________________CONSTRUCTORS____________________________________
    pub fn integer(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    /// exact rational `numer/denom`, reduced; a unit denominator gives an Integer
    pub fn rational(numer: i64, denom: i64) -> NumericResult<Value> {
        if denom == 0 {
            return Err(NumericError::Arithmetic(format!(
                "rational {}/{} has zero denominator",
                numer, denom
            )));
        }
        Ok(Value::Rational(BigRational::new(BigInt::from(numer), BigInt::from(denom))).normalized())
    }

    pub fn real(x: f64) -> Value {
        Value::Real(x)
    }

    pub fn complex(re: f64, im: f64) -> Value {
        Value::Complex(Complex64::new(re, im))
    }

    pub fn zero() -> Value {
        Value::Integer(BigInt::zero())
    }

    pub fn one() -> Value {
        Value::Integer(BigInt::one())
    }

    /// n! as an exact integer
    pub fn factorial(n: usize) -> Value {
        let mut acc = BigInt::one();
        for k in 2..=n {
            acc *= BigInt::from(k);
        }
        Value::Integer(acc)
    }

    //___________________________________INSPECTION____________________________________
    pub fn kind(&self) -> NumericKind {
        match self {
            Value::Integer(_) => NumericKind::Integer,
            Value::Rational(_) => NumericKind::Rational,
            Value::Real(_) => NumericKind::Real,
            Value::Complex(_) => NumericKind::Complex,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(i) => i.is_zero(),
            Value::Rational(r) => r.is_zero(),
            Value::Real(x) => *x == 0.0,
            Value::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Value::Integer(i) => i.is_one(),
            Value::Rational(r) => r.is_one(),
            Value::Real(x) => *x == 1.0,
            Value::Complex(c) => c.re == 1.0 && c.im == 0.0,
        }
    }

    pub fn is_minus_one(&self) -> bool {
        self.negate().is_one()
    }

    /// true for exactly represented values (Integer, Rational)
    pub fn is_exact(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Rational(_))
    }

    /// Rational values with a unit denominator collapse to Integer.
    pub fn normalized(self) -> Value {
        match self {
            Value::Rational(r) if r.is_integer() => Value::Integer(r.to_integer()),
            other => other,
        }
    }

    //___________________________________COERCION____________________________________

    /// Checked conversion into `target`. Never rounds: a Real with a fractional part does not
    /// become an Integer, a Complex with an imaginary part does not become a Real.
    pub fn coerce(&self, target: NumericKind) -> NumericResult<Value> {
        let fail = || NumericError::Coercion {
            value: self.to_string(),
            target,
        };
        match (self, target) {
            (v, t) if v.kind() == t => Ok(v.clone()),
            (Value::Integer(i), NumericKind::Rational) => {
                Ok(Value::Rational(BigRational::from_integer(i.clone())))
            }
            (Value::Integer(i), NumericKind::Real) => i.to_f64().map(Value::Real).ok_or_else(fail),
            (Value::Integer(i), NumericKind::Complex) => i
                .to_f64()
                .map(|re| Value::Complex(Complex64::new(re, 0.0)))
                .ok_or_else(fail),
            (Value::Rational(r), NumericKind::Integer) => {
                if r.is_integer() {
                    Ok(Value::Integer(r.to_integer()))
                } else {
                    Err(fail())
                }
            }
            (Value::Rational(r), NumericKind::Real) => r.to_f64().map(Value::Real).ok_or_else(fail),
            (Value::Rational(r), NumericKind::Complex) => r
                .to_f64()
                .map(|re| Value::Complex(Complex64::new(re, 0.0)))
                .ok_or_else(fail),
            (Value::Real(x), NumericKind::Integer) => {
                if x.is_finite() && x.fract() == 0.0 {
                    BigInt::from_f64(*x).map(Value::Integer).ok_or_else(fail)
                } else {
                    Err(fail())
                }
            }
            (Value::Real(x), NumericKind::Rational) => {
                if x.is_finite() {
                    BigRational::from_float(*x)
                        .map(|r| Value::Rational(r))
                        .ok_or_else(fail)
                } else {
                    Err(fail())
                }
            }
            (Value::Real(x), NumericKind::Complex) => Ok(Value::Complex(Complex64::new(*x, 0.0))),
            (Value::Complex(c), _) => {
                if c.im == 0.0 {
                    Value::Real(c.re).coerce(target)
                } else {
                    Err(fail())
                }
            }
            _ => Err(fail()),
        }
    }

    /// Real approximation of an ordered value.
    pub fn to_f64(&self) -> NumericResult<f64> {
        match self.coerce(NumericKind::Real)? {
            Value::Real(x) => Ok(x),
            other => Err(NumericError::Coercion {
                value: other.to_string(),
                target: NumericKind::Real,
            }),
        }
    }

    /// Brings both operands to their common (widest) kind.
    fn unify(&self, other: &Value) -> NumericResult<(Value, Value)> {
        let kind = self.kind().widest(other.kind());
        Ok((self.coerce(kind)?, other.coerce(kind)?))
    }

    //___________________________________ARITHMETIC____________________________________
    pub fn checked_add(&self, other: &Value) -> NumericResult<Value> {
        let res = match self.unify(other)? {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(a + b),
            (Value::Rational(a), Value::Rational(b)) => Value::Rational(a + b),
            (Value::Real(a), Value::Real(b)) => Value::Real(a + b),
            (Value::Complex(a), Value::Complex(b)) => Value::Complex(a + b),
            _ => unreachable!("unify returns operands of one kind"),
        };
        res.defined("addition")
    }

    pub fn checked_sub(&self, other: &Value) -> NumericResult<Value> {
        self.checked_add(&other.negate())
    }

    pub fn checked_mul(&self, other: &Value) -> NumericResult<Value> {
        let res = match self.unify(other)? {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(a * b),
            (Value::Rational(a), Value::Rational(b)) => Value::Rational(a * b),
            (Value::Real(a), Value::Real(b)) => Value::Real(a * b),
            (Value::Complex(a), Value::Complex(b)) => Value::Complex(a * b),
            _ => unreachable!("unify returns operands of one kind"),
        };
        res.defined("multiplication")
    }

    /// Division by a value that is exactly zero is an arithmetic error for every kind.
    pub fn checked_div(&self, other: &Value) -> NumericResult<Value> {
        if other.is_zero() {
            return Err(NumericError::Arithmetic(format!(
                "division of {} by zero",
                self
            )));
        }
        let res = match self.unify(other)? {
            (Value::Integer(a), Value::Integer(b)) => {
                Value::Rational(BigRational::new(a, b))
            }
            (Value::Rational(a), Value::Rational(b)) => Value::Rational(a / b),
            (Value::Real(a), Value::Real(b)) => Value::Real(a / b),
            (Value::Complex(a), Value::Complex(b)) => Value::Complex(a / b),
            _ => unreachable!("unify returns operands of one kind"),
        };
        res.defined("division")
    }

    pub fn negate(&self) -> Value {
        match self {
            Value::Integer(a) => Value::Integer(-a),
            Value::Rational(a) => Value::Rational(-a),
            Value::Real(a) => Value::Real(-a),
            Value::Complex(a) => Value::Complex(-a),
        }
    }

    /// |x|; the modulus for complex values
    pub fn magnitude(&self) -> Value {
        match self {
            Value::Integer(a) => Value::Integer(a.abs()),
            Value::Rational(a) => Value::Rational(a.abs()),
            Value::Real(a) => Value::Real(a.abs()),
            Value::Complex(a) => Value::Real(a.norm()),
        }
    }

    pub fn compare(&self, other: &Value) -> NumericResult<Ordering> {
        let unordered = || NumericError::Unordered(format!("{} and {}", self, other));
        match self.unify(other)? {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(&b)),
            (Value::Rational(a), Value::Rational(b)) => Ok(a.cmp(&b)),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(&b).ok_or_else(unordered),
            _ => Err(unordered()),
        }
    }

    /// Integer power; exact kinds stay exact.
    pub fn powi(&self, n: i64) -> NumericResult<Value> {
        if n < 0 && self.is_zero() {
            return Err(NumericError::Arithmetic(format!(
                "zero raised to negative power {}",
                n
            )));
        }
        let exp = i32::try_from(n)
            .map_err(|_| NumericError::Arithmetic(format!("exponent {} is too large", n)))?;
        let res = match self {
            Value::Integer(a) => {
                Value::Rational(BigRational::from_integer(a.clone()).pow(exp)).normalized()
            }
            Value::Rational(a) => Value::Rational(a.pow(exp)).normalized(),
            Value::Real(a) => Value::Real(a.powi(exp)),
            Value::Complex(a) => Value::Complex(a.powi(exp)),
        };
        res.defined("power")
    }

    /// `self^(numer/denom)` for `denom > 1`. Perfect powers of exact values stay exact, negative
    /// bases have a real root only for odd `denom`.
    pub fn pow_ratio(&self, numer: i64, denom: i64) -> NumericResult<Value> {
        if denom == 1 {
            return self.powi(numer);
        }
        if denom <= 0 {
            return Err(NumericError::Arithmetic(format!(
                "invalid root index {}",
                denom
            )));
        }
        if let Value::Complex(c) = self {
            return Value::Complex(c.powf(numer as f64 / denom as f64)).defined("power");
        }
        if self.is_zero() && numer < 0 {
            return Err(NumericError::Arithmetic(format!(
                "zero raised to negative power {}/{}",
                numer, denom
            )));
        }
        let negative = self.compare(&Value::zero())? == Ordering::Less;
        if negative && denom % 2 == 0 {
            return Err(NumericError::Arithmetic(format!(
                "{} has no real root of even index {}",
                self, denom
            )));
        }
        if let Some(root) = self.magnitude().exact_root(denom) {
            let root = if negative { root.negate() } else { root };
            return root.powi(numer);
        }
        let base = self.to_f64()?;
        let magnitude = base.abs().powf(numer as f64 / denom as f64);
        let sign = if negative && numer % 2 != 0 { -1.0 } else { 1.0 };
        Value::Real(sign * magnitude).defined("power")
    }

    /// exact `n`-th root of a non-negative exact value, if it exists
    fn exact_root(&self, n: i64) -> Option<Value> {
        let n = u32::try_from(n).ok()?;
        let root_of = |i: &BigInt| {
            let r = i.nth_root(n);
            if num::pow(r.clone(), n as usize) == *i {
                Some(r)
            } else {
                None
            }
        };
        match self {
            Value::Integer(i) => root_of(i).map(Value::Integer),
            Value::Rational(r) => {
                let numer = root_of(r.numer())?;
                let denom = root_of(r.denom())?;
                Some(Value::Rational(BigRational::new(numer, denom)).normalized())
            }
            _ => None,
        }
    }

    fn defined(self, operation: &str) -> NumericResult<Value> {
        let nan = match &self {
            Value::Real(x) => x.is_nan(),
            Value::Complex(c) => c.re.is_nan() || c.im.is_nan(),
            _ => false,
        };
        if nan {
            Err(NumericError::Arithmetic(format!(
                "{} has no defined result",
                operation
            )))
        } else {
            Ok(self.normalized())
        }
    }
}

/// Numeric equality across kinds: `Integer(2) == Real(2.0)`.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match self.unify(other) {
            Ok((Value::Integer(a), Value::Integer(b))) => a == b,
            Ok((Value::Rational(a), Value::Rational(b))) => a == b,
            Ok((Value::Real(a), Value::Real(b))) => a == b,
            Ok((Value::Complex(a), Value::Complex(b))) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Value::Real(x) => write!(f, "{}", x),
            Value::Complex(c) => {
                if c.im < 0.0 {
                    write!(f, "{}-{}i", c.re, -c.im)
                } else {
                    write!(f, "{}+{}i", c.re, c.im)
                }
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Value {
        Value::Real(x)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Value {
        Value::Integer(n)
    }
}

impl From<BigRational> for Value {
    fn from(r: BigRational) -> Value {
        Value::Rational(r).normalized()
    }
}

impl From<Complex64> for Value {
    fn from(c: Complex64) -> Value {
        Value::Complex(c)
    }
}
