//! Leaf analytic functions: elementary functions, closure wrappers and the numerical derivative.
use crate::numeric::{Exponent, Interval, NumericKind, Value};
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_derivatives::Differentiator;
use crate::symbolic::function_node::Function;
use num_complex::Complex64;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque analytic function of one argument (sin, exp, user closures, ...).
pub trait AnalyticFunction: fmt::Debug + Send + Sync {
    /// Function name for display
    fn name(&self) -> &str;

    /// Name shared by every instance that computes the same function. Leaves without one are
    /// only equal to themselves (the same `Arc`).
    fn canonical_name(&self) -> Option<&'static str> {
        None
    }

    /// Evaluate the function at point x (x is already inside `input_range`)
    fn apply(&self, x: &Value) -> FunctionResult<Value>;

    fn input_range(&self) -> Interval {
        Interval::all()
    }

    fn arg_kind(&self) -> NumericKind {
        NumericKind::Real
    }

    fn result_kind(&self) -> NumericKind {
        NumericKind::Real
    }

    /// Leaves that know their own derivative expose it here (optional capability).
    fn self_derivative(&self) -> Option<&dyn HasSelfDerivative> {
        None
    }
}

/// Capability of a leaf to produce its derivative symbolically.
pub trait HasSelfDerivative {
    /// derivative with respect to the leaf's argument, named `arg`
    fn derivative(&self, arg: &str, engine: &Differentiator) -> FunctionResult<Function>;
}

fn real_or_complex(
    x: &Value,
    real: impl Fn(f64) -> f64,
    complex: impl Fn(Complex64) -> Complex64,
) -> FunctionResult<Value> {
    match x {
        Value::Complex(c) => Ok(Value::Complex(complex(*c))),
        other => {
            let y = real(other.to_f64()?);
            if y.is_nan() {
                return Err(FunctionError::Arithmetic(format!("no real value at {}", x)));
            }
            Ok(Value::Real(y))
        }
    }
}

//___________________________________ELEMENTARY____________________________________

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exp;

/// natural logarithm, defined on (0, ∞)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ln;

pub fn sin(arg: &str) -> Function {
    Function::leaf(Arc::new(Sin), arg)
}

pub fn cos(arg: &str) -> Function {
    Function::leaf(Arc::new(Cos), arg)
}

pub fn exp(arg: &str) -> Function {
    Function::leaf(Arc::new(Exp), arg)
}

pub fn ln(arg: &str) -> Function {
    Function::leaf(Arc::new(Ln), arg)
}

impl AnalyticFunction for Sin {
    fn name(&self) -> &str {
        "sin"
    }
    fn canonical_name(&self) -> Option<&'static str> {
        Some("sin")
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        real_or_complex(x, f64::sin, Complex64::sin)
    }
    fn self_derivative(&self) -> Option<&dyn HasSelfDerivative> {
        Some(self)
    }
}

impl HasSelfDerivative for Sin {
    // sin' = cos
    fn derivative(&self, arg: &str, _engine: &Differentiator) -> FunctionResult<Function> {
        Ok(cos(arg))
    }
}

impl AnalyticFunction for Cos {
    fn name(&self) -> &str {
        "cos"
    }
    fn canonical_name(&self) -> Option<&'static str> {
        Some("cos")
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        real_or_complex(x, f64::cos, Complex64::cos)
    }
    fn self_derivative(&self) -> Option<&dyn HasSelfDerivative> {
        Some(self)
    }
}

impl HasSelfDerivative for Cos {
    // cos' = -sin
    fn derivative(&self, arg: &str, _engine: &Differentiator) -> FunctionResult<Function> {
        Ok(sin(arg).negate())
    }
}

impl AnalyticFunction for Exp {
    fn name(&self) -> &str {
        "exp"
    }
    fn canonical_name(&self) -> Option<&'static str> {
        Some("exp")
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        real_or_complex(x, f64::exp, Complex64::exp)
    }
    fn self_derivative(&self) -> Option<&dyn HasSelfDerivative> {
        Some(self)
    }
}

impl HasSelfDerivative for Exp {
    fn derivative(&self, arg: &str, _engine: &Differentiator) -> FunctionResult<Function> {
        Ok(exp(arg))
    }
}

impl AnalyticFunction for Ln {
    fn name(&self) -> &str {
        "ln"
    }
    fn canonical_name(&self) -> Option<&'static str> {
        Some("ln")
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        real_or_complex(x, f64::ln, Complex64::ln)
    }
    fn input_range(&self) -> Interval {
        Interval::greater_than(0)
    }
    fn self_derivative(&self) -> Option<&dyn HasSelfDerivative> {
        Some(self)
    }
}

impl HasSelfDerivative for Ln {
    // ln' = x^-1
    fn derivative(&self, arg: &str, _engine: &Differentiator) -> FunctionResult<Function> {
        Ok(Function::power(Exponent::int(-1), arg).with_domain(arg, Interval::greater_than(0)))
    }
}

//___________________________________CLOSURES____________________________________

/// Simple function wrapper for closures. Has no symbolic derivative, so the engine
/// differentiates it numerically.
pub struct ClosureFunction<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    func: F,
    name: String,
    range: Interval,
}

impl<F> ClosureFunction<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    pub fn new(func: F, name: String) -> Self {
        Self {
            func,
            name,
            range: Interval::all(),
        }
    }

    pub fn with_range(mut self, range: Interval) -> Self {
        self.range = range;
        self
    }
}

impl<F> fmt::Debug for ClosureFunction<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClosureFunction")
            .field("name", &self.name)
            .field("range", &self.range)
            .finish()
    }
}

impl<F> AnalyticFunction for ClosureFunction<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        let y = (self.func)(x.to_f64()?);
        if y.is_nan() {
            return Err(FunctionError::Arithmetic(format!(
                "{} has no value at {}",
                self.name, x
            )));
        }
        Ok(Value::Real(y))
    }
    fn input_range(&self) -> Interval {
        self.range.clone()
    }
}

/// Function wrapper with analytical derivative
pub struct ClosureWithDerivative<F, D>
where
    F: Fn(f64) -> f64 + Send + Sync,
    D: Fn(f64) -> f64 + Send + Sync + Clone + 'static,
{
    func: ClosureFunction<F>,
    derivative_func: D,
}

impl<F, D> ClosureWithDerivative<F, D>
where
    F: Fn(f64) -> f64 + Send + Sync,
    D: Fn(f64) -> f64 + Send + Sync + Clone + 'static,
{
    pub fn new(func: F, derivative_func: D, name: String) -> Self {
        Self {
            func: ClosureFunction::new(func, name),
            derivative_func,
        }
    }
}

impl<F, D> fmt::Debug for ClosureWithDerivative<F, D>
where
    F: Fn(f64) -> f64 + Send + Sync,
    D: Fn(f64) -> f64 + Send + Sync + Clone + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClosureWithDerivative")
            .field("name", &self.func.name)
            .finish()
    }
}

impl<F, D> AnalyticFunction for ClosureWithDerivative<F, D>
where
    F: Fn(f64) -> f64 + Send + Sync,
    D: Fn(f64) -> f64 + Send + Sync + Clone + 'static,
{
    fn name(&self) -> &str {
        self.func.name()
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        self.func.apply(x)
    }
    fn input_range(&self) -> Interval {
        self.func.input_range()
    }
    fn self_derivative(&self) -> Option<&dyn HasSelfDerivative> {
        Some(self)
    }
}

impl<F, D> HasSelfDerivative for ClosureWithDerivative<F, D>
where
    F: Fn(f64) -> f64 + Send + Sync,
    D: Fn(f64) -> f64 + Send + Sync + Clone + 'static,
{
    fn derivative(&self, arg: &str, _engine: &Differentiator) -> FunctionResult<Function> {
        let name = format!("{}'", self.func.name());
        let d = ClosureFunction::new(self.derivative_func.clone(), name)
            .with_range(self.input_range());
        Ok(Function::leaf(Arc::new(d), arg))
    }
}

//___________________________________NUMERICAL____________________________________

/// Central-difference derivative of `base` in `variable`: (f(x+ε) - f(x-ε)) / 2ε.
/// Both probe points must lie inside the domain of `base`.
#[derive(Debug, Clone)]
pub struct CentralDifference {
    base: Function,
    variable: String,
    epsilon: f64,
    name: String,
}

impl CentralDifference {
    pub fn new(base: Function, variable: &str, epsilon: f64) -> CentralDifference {
        let name = format!("d/d{}[{}]", variable, base);
        CentralDifference {
            base,
            variable: variable.to_string(),
            epsilon,
            name,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn base(&self) -> &Function {
        &self.base
    }

    fn probe(&self, x: Value) -> FunctionResult<Value> {
        let args = HashMap::from([(self.variable.clone(), x)]);
        self.base.evaluate(&args)
    }
}

impl AnalyticFunction for CentralDifference {
    fn name(&self) -> &str {
        &self.name
    }
    fn apply(&self, x: &Value) -> FunctionResult<Value> {
        let eps = Value::Real(self.epsilon);
        let forward = self.probe(x.checked_add(&eps)?)?;
        let backward = self.probe(x.checked_sub(&eps)?)?;
        let two_eps = Value::Real(2.0 * self.epsilon);
        Ok(forward.checked_sub(&backward)?.checked_div(&two_eps)?)
    }
    fn input_range(&self) -> Interval {
        self.base.input_range(&self.variable)
    }
    fn arg_kind(&self) -> NumericKind {
        self.base.arg_kind().widest(NumericKind::Real)
    }
    fn result_kind(&self) -> NumericKind {
        self.base.result_kind().widest(NumericKind::Real)
    }
}
