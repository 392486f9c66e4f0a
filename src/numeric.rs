//! # Numeric value model
//!
//! The symbolic engine never works with `f64` directly: every constant, argument and result is a
//! [`Value`](value::Value) which can be an exact integer, an exact rational, a real (`f64`) or a
//! complex number. Arithmetic between different kinds promotes to the wider kind
//! (Integer → Rational → Real → Complex), and narrowing goes only through the checked
//! [`Value::coerce`](value::Value::coerce), which fails instead of silently rounding.
//!
//! Submodules:
//! - `value` - the numeric value enum, its kinds and checked arithmetic
//! - `exponent` - integer-or-rational exponents used by power nodes and polynomial terms
//! - `interval` - real intervals describing the domain of a function argument
pub mod exponent;
pub mod interval;
pub mod value;

pub use exponent::Exponent;
pub use interval::Interval;
pub use value::{NumericError, NumericKind, NumericResult, Value};

/// Evenly spaced sample points between `start` and `end` (both included).
pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    if num_values == 0 {
        return Vec::new();
    }
    if num_values == 1 {
        return vec![start];
    }
    let step = (end - start) / (num_values as f64 - 1.0);
    (0..num_values).map(|i| start + i as f64 * step).collect()
}

/// Root-mean-square distance between two samples of equal length.
pub fn norm(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let sum: f64 = x.iter().zip(y.iter()).map(|(a, b)| (a - b).powi(2)).sum();
    (sum / x.len() as f64).sqrt()
}
