//! Taylor expansion of functions around a point.
//!
//! Provides the [`TaylorExpansion`] builder for
//! f(x) ≈ Σₖ (f⁽ᵏ⁾(a)/k!) * (x-a)ᵏ around point a.
//!
//! The builder keeps every derivative it has computed and every term it has emitted, so asking
//! for more terms later only differentiates the missing orders and never changes terms that were
//! already built. The cache sits behind a `Mutex`, so one expansion can be shared between threads.
use crate::numeric::Value;
use crate::symbolic::engine_config::EngineConfig;
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_derivatives::Differentiator;
use crate::symbolic::function_node::Function;
use crate::symbolic::polynomial::{Polynomial, PolynomialBuilder};
use crate::symbolic::term::{Term, TermOps};
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct TaylorState {
    /// f, f', f'', ... indexed by order
    derivatives: Vec<Function>,
    /// accumulated terms, one per built order
    builder: PolynomialBuilder,
    /// f⁽ᵏ⁾(a)/k! per order
    coefficients: Vec<Value>,
}

#[derive(Debug)]
pub struct TaylorExpansion {
    center: Value,
    variable: String,
    differentiator: Differentiator,
    state: Mutex<TaylorState>,
}

impl TaylorExpansion {
    /// Expansion of `base` around `center`. `base` must depend on at most one variable.
    pub fn new(base: &Function, center: impl Into<Value>) -> FunctionResult<TaylorExpansion> {
        TaylorExpansion::with_config(base, center, EngineConfig::default())
    }

    pub fn with_config(
        base: &Function,
        center: impl Into<Value>,
        config: EngineConfig,
    ) -> FunctionResult<TaylorExpansion> {
        let vars = base.free_variables();
        if vars.len() > 1 {
            return Err(FunctionError::Arity {
                free_variables: vars.into_iter().collect(),
            });
        }
        let variable = vars
            .into_iter()
            .next()
            .unwrap_or_else(|| base.arg_name().to_string());
        let differentiator = Differentiator::with_config(config).with_variable(&variable);
        Ok(TaylorExpansion {
            center: center.into(),
            variable,
            differentiator,
            state: Mutex::new(TaylorState {
                derivatives: vec![base.clone()],
                builder: PolynomialBuilder::integral(),
                coefficients: Vec::new(),
            }),
        })
    }

    pub fn center(&self) -> &Value {
        &self.center
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    fn lock(&self) -> MutexGuard<'_, TaylorState> {
        // the state is only replaced after a fully successful step, a poisoned lock is still valid
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of orders built so far.
    pub fn orders_built(&self) -> usize {
        self.lock().coefficients.len()
    }

    /// Derivative of order `k`, computed (and cached) on demand.
    pub fn derivative(&self, k: usize) -> FunctionResult<Function> {
        let mut state = self.lock();
        self.ensure_derivative(&mut state, k)
    }

    fn ensure_derivative(&self, state: &mut TaylorState, k: usize) -> FunctionResult<Function> {
        while state.derivatives.len() <= k {
            let order = state.derivatives.len();
            let previous = &state.derivatives[order - 1];
            let next = self.differentiator.differentiate(previous)?;
            debug!("Taylor derivative of order {}: {}", order, next);
            state.derivatives.push(next);
        }
        Ok(state.derivatives[k].clone())
    }

    /// Taylor polynomial with the terms of orders 0..=n.
    pub fn get_for_n_terms(&self, n: usize) -> FunctionResult<TaylorPolynomial> {
        let mut state = self.lock();
        let built = state.coefficients.len();
        if built <= n {
            info!(
                "extending Taylor expansion around {} from {} to {} orders",
                self.center,
                built,
                n + 1
            );
            let mut new_coefficients = Vec::with_capacity(n + 1 - built);
            for k in built..=n {
                let fk = self.ensure_derivative(&mut state, k)?;
                let value = fk.apply(self.center.clone())?;
                new_coefficients.push(value.checked_div(&Value::factorial(k))?);
            }
            let mut builder = state.builder.clone();
            for (offset, c) in new_coefficients.iter().enumerate() {
                builder.add(Term::monomial(c.clone(), &self.variable, (built + offset) as i64))?;
            }
            state.builder = builder;
            state.coefficients.extend(new_coefficients);
        }
        let polynomial = state.builder.clone().build();
        let polynomial = if built > n + 1 {
            Polynomial::from_terms(
                polynomial
                    .terms()
                    .iter()
                    .filter(|t| t.order(&self.variable) <= n as i64)
                    .cloned(),
            )?
        } else {
            polynomial
        };
        Ok(TaylorPolynomial {
            center: self.center.clone(),
            variable: self.variable.clone(),
            coefficients: state.coefficients[..=n].to_vec(),
            polynomial,
        })
    }
}

/// Truncated Taylor polynomial Σₖ cₖ (x-a)ᵏ.
#[derive(Debug, Clone, PartialEq)]
pub struct TaylorPolynomial {
    center: Value,
    variable: String,
    coefficients: Vec<Value>,
    polynomial: Polynomial,
}

impl TaylorPolynomial {
    pub fn center(&self) -> &Value {
        &self.center
    }

    /// highest order included
    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// coefficient of (x-a)^k, zero beyond the built order
    pub fn coefficient(&self, k: usize) -> Value {
        self.coefficients.get(k).cloned().unwrap_or_else(Value::zero)
    }

    pub fn coefficients(&self) -> &[Value] {
        &self.coefficients
    }

    /// polynomial in the shifted variable (x - a)
    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// Evaluates at `x` by substituting x - a into the shifted polynomial.
    pub fn evaluate(&self, x: impl Into<Value>) -> FunctionResult<Value> {
        let shifted = x.into().checked_sub(&self.center)?;
        let args = HashMap::from([(self.variable.clone(), shifted)]);
        self.polynomial.evaluate(&args)
    }
}

impl fmt::Display for TaylorPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} with {} -> {} - {}",
            self.polynomial, self.variable, self.variable, self.center
        )
    }
}
