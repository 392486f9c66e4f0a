//! # Function Derivatives Module
//!
//! Analytical differentiation of function trees with a numerical fallback.
//!
//! ## Purpose
//!
//! [`Differentiator`] turns a function of exactly one free variable into its derivative. Functions
//! of several variables are first curried with the fixed values supplied to the differentiator;
//! if more than one free variable is left the call fails with an `Arity` error.
//!
//! ## Rules, in the order they are tried
//!
//! 1. **Chain rule**: a composed view f∘g gives (f'∘g)·g'
//! 2. **Linearity**: (f1 + ... + fn)' = f1' + ... + fn'
//! 3. **Quotient rule**: (n/d)' = (n'd - nd')/d², simplified right away
//! 4. **Product rule**: (fg)' = f'g + fg'; for more factors (∏fi)·Σ(fi'/fi), each ratio simplified
//! 5. **Self-derivative**: leaves that know their derivative (sin, exp, ...) provide it
//! 6. **Central difference**: any other leaf gets (f(x+ε) - f(x-ε))/2ε
//!
//! Powers, negation, polynomials, constants and the identity have their own closed forms.
//!
//! ## Key Methods
//! - `Differentiator::differentiate()` - derivative in the single free variable
//! - `Function::diff(var)` - partial derivative in `var`
//! - `Function::nth_derivative(n)` - repeated differentiation
//! - `Function::compare_with_numerical()` - check a derivative against central differences
use crate::numeric::{Exponent, Value, linspace, norm};
use crate::symbolic::engine_config::{EngineConfig, check_epsilon};
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_node::{Function, FunctionKind};
use crate::symbolic::function_simplify::Simplifier;
use crate::symbolic::leaf_functions::CentralDifference;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Differentiator {
    config: EngineConfig,
    fixed: HashMap<String, Value>,
    variable: Option<String>,
}

impl Differentiator {
    pub fn new() -> Differentiator {
        Differentiator::default()
    }

    pub fn with_config(config: EngineConfig) -> Differentiator {
        check_epsilon(config.epsilon);
        Differentiator {
            config,
            ..Differentiator::default()
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Differentiator {
        self.config = self.config.with_epsilon(epsilon);
        self
    }

    /// Value used for `name` when a function of several variables is curried.
    pub fn with_fixed(mut self, name: &str, value: impl Into<Value>) -> Differentiator {
        self.fixed.insert(name.to_string(), value.into());
        self
    }

    pub fn with_fixed_values(mut self, fixed: HashMap<String, Value>) -> Differentiator {
        self.fixed.extend(fixed);
        self
    }

    /// Differentiate in `name`; it is never curried even if a fixed value is supplied.
    pub fn with_variable(mut self, name: &str) -> Differentiator {
        self.variable = Some(name.to_string());
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    /// Derivative of `f` in its single free variable.
    pub fn differentiate(&self, f: &Function) -> FunctionResult<Function> {
        let mut fixed = self.fixed.clone();
        if let Some(v) = &self.variable {
            fixed.remove(v);
        }
        let reduced = if f.free_variables().len() > 1 {
            f.curry(&fixed)?
        } else {
            f.clone()
        };
        let remaining = reduced.free_variables();
        if remaining.len() > 1 {
            return Err(FunctionError::Arity {
                free_variables: remaining.into_iter().collect(),
            });
        }
        let var = match (&self.variable, remaining.into_iter().next()) {
            (Some(v), _) => v.clone(),
            (None, Some(v)) => v,
            (None, None) => reduced.arg_name().to_string(),
        };
        info!("differentiating {} with respect to {}", reduced, var);
        let derivative = self.derive(&reduced, &var)?;
        self.finish(f, derivative)
    }

    /// Partial derivative in `var`; other variables are treated as constants.
    pub fn partial(&self, f: &Function, var: &str) -> FunctionResult<Function> {
        let derivative = self.derive(f, var)?;
        self.finish(f, derivative)
    }

    /// Derivative of order `n` (the function itself for `n == 0`).
    pub fn nth_derivative(&self, f: &Function, n: usize) -> FunctionResult<Function> {
        let mut current = f.clone();
        for _ in 0..n {
            current = self.differentiate(&current)?;
        }
        Ok(current)
    }

    /// Simplifies (if configured) and carries the declared domain of `f` over to its derivative.
    fn finish(&self, f: &Function, derivative: Function) -> FunctionResult<Function> {
        let mut derivative = if self.config.simplify_derivatives {
            Simplifier::with_config(&self.config).simplify(&derivative)?
        } else {
            derivative
        };
        for (arg, range) in f.declared_domain() {
            derivative = derivative.with_domain(arg, range.clone());
        }
        Ok(derivative)
    }

    //___________________________________RULES____________________________________

    pub(crate) fn derive(&self, f: &Function, var: &str) -> FunctionResult<Function> {
        if let (Some(outer), Some(inner)) = (f.original(), f.composed()) {
            if f.composing().is_some() {
                debug!("{} is itself the inner part of a composition", f);
            }
            return self.chain_rule(outer, inner, var);
        }
        let arg = f.arg_name();
        match f.kind() {
            FunctionKind::Const(_) => Ok(zero(f)),
            FunctionKind::Identity => {
                if arg == var {
                    Ok(Function::constant_in(Value::one(), arg))
                } else {
                    Ok(zero(f))
                }
            }
            FunctionKind::Sum(terms) => {
                let derivatives = terms
                    .iter()
                    .map(|t| self.derive(t, var))
                    .collect::<FunctionResult<Vec<_>>>()?;
                Ok(f.rebuild(FunctionKind::Sum(derivatives)))
            }
            FunctionKind::Quotient(n, d) => self.quotient_rule(f, n, d, var),
            FunctionKind::Product(factors) => self.product_rule(f, factors, var),
            FunctionKind::Power { exponent, inner } => {
                self.power_rule(f, *exponent, inner.as_ref(), var)
            }
            FunctionKind::Negation { inner: None } => {
                if arg == var {
                    Ok(Function::constant_in(Value::integer(-1), arg))
                } else {
                    Ok(zero(f))
                }
            }
            FunctionKind::Negation { inner: Some(g) } => Ok(self.derive(g, var)?.negate()),
            FunctionKind::Polynomial(p) => {
                Ok(f.rebuild(FunctionKind::Polynomial(p.differentiate(var)?)))
            }
            FunctionKind::Leaf(leaf) => {
                if arg != var {
                    return Ok(zero(f));
                }
                match leaf.self_derivative() {
                    Some(capability) => {
                        debug!("{} provides its own derivative", leaf.name());
                        capability.derivative(var, self)
                    }
                    None => self.numerical(f, var),
                }
            }
        }
    }

    /// (f∘g)' = (f'∘g)·g', plus ∂f/∂var∘g if the outer function also uses `var` directly
    fn chain_rule(
        &self,
        outer: &Function,
        inner: &Function,
        var: &str,
    ) -> FunctionResult<Function> {
        let outer_arg = outer.arg_name();
        let d_outer = self.derive(outer, outer_arg)?.compose_at(outer_arg, inner)?;
        let d_inner = self.derive(inner, var)?;
        let mut result = d_outer * d_inner;
        if var != outer_arg && outer.contains_variable(var) {
            let direct = self.derive(outer, var)?.compose_at(outer_arg, inner)?;
            result = result + direct;
        }
        Ok(result)
    }

    fn quotient_rule(
        &self,
        f: &Function,
        n: &Function,
        d: &Function,
        var: &str,
    ) -> FunctionResult<Function> {
        let dn = self.derive(n, var)?;
        let dd = self.derive(d, var)?;
        let numerator = f.rebuild(FunctionKind::Sum(vec![
            dn * d.clone(),
            (n.clone() * dd).negate(),
        ]));
        let quotient =
            Function::quotient_of(numerator, Function::power_of(Exponent::int(2), d.clone()));
        Simplifier::with_config(&self.config).simplify(&quotient)
    }

    fn product_rule(
        &self,
        f: &Function,
        factors: &[Function],
        var: &str,
    ) -> FunctionResult<Function> {
        match factors {
            [] => Ok(zero(f)),
            [g] => self.derive(g, var),
            [a, b] => {
                let da = self.derive(a, var)?;
                let db = self.derive(b, var)?;
                Ok(f.rebuild(FunctionKind::Sum(vec![da * b.clone(), a.clone() * db])))
            }
            _ => {
                // (f1 f2 ... fn)' = (f1 f2 ... fn) * Σ fi'/fi, recomputed on every call
                let simplifier = Simplifier::with_config(&self.config);
                let mut ratios = Vec::with_capacity(factors.len());
                for g in factors {
                    let dg = self.derive(g, var)?;
                    if dg.as_constant().is_some_and(Value::is_zero) {
                        continue;
                    }
                    ratios.push(simplifier.simplify(&Function::quotient_of(dg, g.clone()))?);
                }
                if ratios.is_empty() {
                    return Ok(zero(f));
                }
                Ok(f.clone() * f.rebuild(FunctionKind::Sum(ratios)))
            }
        }
    }

    /// (g^n)' = n·g^(n-1)·g'
    fn power_rule(
        &self,
        f: &Function,
        exponent: Exponent,
        inner: Option<&Function>,
        var: &str,
    ) -> FunctionResult<Function> {
        if exponent.is_zero() {
            return Ok(zero(f));
        }
        let coefficient = Function::constant_in(exponent.to_value(), f.arg_name());
        let lowered = exponent.checked_sub(Exponent::int(1))?;
        match inner {
            None if f.arg_name() != var => Ok(zero(f)),
            None => {
                let power = f.rebuild(FunctionKind::Power {
                    exponent: lowered,
                    inner: None,
                });
                Ok(coefficient * power)
            }
            Some(g) => {
                let dg = self.derive(g, var)?;
                Ok(f.rebuild(FunctionKind::Product(vec![
                    coefficient,
                    Function::power_of(lowered, g.clone()),
                    dg,
                ])))
            }
        }
    }

    fn numerical(&self, f: &Function, var: &str) -> FunctionResult<Function> {
        if !f.arg_kind().is_ordered() {
            return Err(FunctionError::UnsupportedOperation(format!(
                "{} has no derivative rule and its {} argument admits no finite differences",
                f,
                f.arg_kind()
            )));
        }
        info!(
            "no symbolic derivative for {}, using central difference with step {}",
            f, self.config.epsilon
        );
        let difference = CentralDifference::new(f.detached(), var, self.config.epsilon);
        Ok(Function::leaf(Arc::new(difference), var))
    }
}

fn zero(f: &Function) -> Function {
    Function::constant_in(Value::zero(), f.arg_name())
}

impl Function {
    /// Derivative in the single free variable, with default settings.
    pub fn differentiate(&self) -> FunctionResult<Function> {
        Differentiator::new().differentiate(self)
    }

    /// Partial derivative in `var`.
    pub fn diff(&self, var: &str) -> FunctionResult<Function> {
        Differentiator::new().partial(self, var)
    }

    pub fn nth_derivative(&self, n: usize) -> FunctionResult<Function> {
        Differentiator::new().nth_derivative(self, n)
    }

    /// Compares the analytical derivative with central differences of the function itself on
    /// `num_values` points of [start, end].
    ///
    /// # Returns
    /// Tuple of (root-mean-square difference, difference below `max_norm`)
    pub fn compare_with_numerical(
        &self,
        start: f64,
        end: f64,
        num_values: usize,
        max_norm: f64,
    ) -> FunctionResult<(f64, bool)> {
        let derivative = self.differentiate()?;
        let step = if num_values > 1 {
            1e-4 * (end - start) / (num_values as f64 - 1.0)
        } else {
            1e-6
        };
        let domain = linspace(start, end, num_values);
        let mut analytical = Vec::with_capacity(domain.len());
        let mut numerical = Vec::with_capacity(domain.len());
        for x in domain {
            analytical.push(derivative.apply(x)?.to_f64()?);
            let forward = self.apply(x + step)?.to_f64()?;
            let backward = self.apply(x - step)?.to_f64()?;
            numerical.push((forward - backward) / (2.0 * step));
        }
        let norm_value = norm(&analytical, &numerical);
        Ok((norm_value, norm_value < max_norm))
    }
}
