//! # Evaluation
//!
//! Evaluation binds argument names to [`Value`]s and walks the tree. Before walking, every bound
//! argument is checked against [`Function::input_range`], the intersection of the declared
//! domain of the node with the ranges inferred from its children (a leaf's own domain, an even
//! root index). A value outside of it is a `Domain` error. Arguments wider than the kind a node
//! accepts are narrowed with the checked coercion, so `Real(2.5)` is never rounded into an
//! integer argument.
//!
//! Operands of large sums and products can be evaluated on the rayon pool (see
//! `EngineConfig::parallel_threshold`); the reduction is always sequential in operand order.
use crate::numeric::{Interval, Value};
use crate::symbolic::engine_config::EngineConfig;
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_node::{Function, FunctionKind};
use rayon::prelude::*;
use std::collections::HashMap;

impl Function {
    /// Evaluates a one-argument function at `x`, bound to its single free variable (or to its
    /// argument name when it has none or several).
    pub fn apply(&self, x: impl Into<Value>) -> FunctionResult<Value> {
        let vars = self.free_variables();
        let name = match (vars.len(), vars.into_iter().next()) {
            (1, Some(var)) => var,
            _ => self.arg_name().to_string(),
        };
        let args = HashMap::from([(name, x.into())]);
        self.evaluate(&args)
    }

    /// Evaluates with explicit argument bindings.
    pub fn evaluate(&self, args: &HashMap<String, Value>) -> FunctionResult<Value> {
        self.evaluate_with(args, None)
    }

    /// Evaluation with operands of aggregates of at least `parallel_threshold` operands computed
    /// in parallel.
    pub fn evaluate_in_parallel(
        &self,
        args: &HashMap<String, Value>,
        config: &EngineConfig,
    ) -> FunctionResult<Value> {
        self.evaluate_with(args, config.parallel_threshold)
    }

    fn evaluate_with(
        &self,
        args: &HashMap<String, Value>,
        parallel_threshold: Option<usize>,
    ) -> FunctionResult<Value> {
        let args = self.checked_arguments(args)?;
        self.eval_node(&args, parallel_threshold)
    }

    /// Coerces and domain-checks the arguments this function depends on. Bound arguments with a
    /// declared range are checked too, even when the function no longer uses them (`x - x`).
    fn checked_arguments(
        &self,
        args: &HashMap<String, Value>,
    ) -> FunctionResult<HashMap<String, Value>> {
        let mut checked = args.clone();
        let free = self.free_variables();
        for (name, range) in self.declared_domain() {
            if free.contains(name) {
                continue;
            }
            if let Some(value) = args.get(name) {
                if !range.contains(value) {
                    return Err(FunctionError::Domain {
                        argument: name.clone(),
                        value: value.to_string(),
                        range: range.clone(),
                    });
                }
            }
        }
        for name in free {
            let value = args.get(&name).ok_or_else(|| {
                FunctionError::Argument(format!("no value bound to argument {}", name))
            })?;
            let value = if name == self.arg_name() && !self.arg_kind().accepts(value.kind()) {
                value.coerce(self.arg_kind())?
            } else {
                value.clone()
            };
            let range = self.input_range(&name);
            if !range.contains(&value) {
                return Err(FunctionError::Domain {
                    argument: name,
                    value: value.to_string(),
                    range,
                });
            }
            checked.insert(name, value);
        }
        Ok(checked)
    }

    fn lookup<'a>(&self, args: &'a HashMap<String, Value>) -> FunctionResult<&'a Value> {
        args.get(self.arg_name()).ok_or_else(|| {
            FunctionError::Argument(format!("no value bound to argument {}", self.arg_name()))
        })
    }

    fn eval_operands(
        operands: &[Function],
        args: &HashMap<String, Value>,
        parallel_threshold: Option<usize>,
    ) -> FunctionResult<Vec<Value>> {
        match parallel_threshold {
            Some(threshold) if operands.len() >= threshold => operands
                .par_iter()
                .map(|f| f.eval_node(args, parallel_threshold))
                .collect(),
            _ => operands
                .iter()
                .map(|f| f.eval_node(args, parallel_threshold))
                .collect(),
        }
    }

    pub(crate) fn eval_node(
        &self,
        args: &HashMap<String, Value>,
        parallel_threshold: Option<usize>,
    ) -> FunctionResult<Value> {
        if let (Some(outer), Some(inner)) = (self.original(), self.composed()) {
            let y = inner.eval_node(args, parallel_threshold)?;
            let mut outer_args = args.clone();
            outer_args.insert(outer.arg_name().to_string(), y);
            return outer.evaluate_with(&outer_args, parallel_threshold);
        }
        match self.kind() {
            FunctionKind::Const(v) => Ok(v.clone()),
            FunctionKind::Identity => Ok(self.lookup(args)?.clone()),
            FunctionKind::Sum(terms) => {
                let values = Function::eval_operands(terms, args, parallel_threshold)?;
                values
                    .iter()
                    .try_fold(Value::zero(), |acc, v| acc.checked_add(v))
                    .map_err(FunctionError::from)
            }
            FunctionKind::Product(factors) => {
                let values = Function::eval_operands(factors, args, parallel_threshold)?;
                values
                    .iter()
                    .try_fold(Value::one(), |acc, v| acc.checked_mul(v))
                    .map_err(FunctionError::from)
            }
            FunctionKind::Quotient(n, d) => {
                let num = n.eval_node(args, parallel_threshold)?;
                let den = d.eval_node(args, parallel_threshold)?;
                Ok(num.checked_div(&den)?)
            }
            FunctionKind::Power { exponent, inner } => {
                let base = match inner {
                    Some(f) => f.eval_node(args, parallel_threshold)?,
                    None => self.lookup(args)?.clone(),
                };
                Ok(exponent.apply_to(&base)?)
            }
            FunctionKind::Negation { inner } => {
                let v = match inner {
                    Some(f) => f.eval_node(args, parallel_threshold)?,
                    None => self.lookup(args)?.clone(),
                };
                Ok(v.negate())
            }
            FunctionKind::Polynomial(p) => p.evaluate(args),
            FunctionKind::Leaf(leaf) => {
                let x = self.lookup(args)?;
                let range = leaf.input_range();
                if !range.contains(x) {
                    return Err(FunctionError::Domain {
                        argument: self.arg_name().to_string(),
                        value: x.to_string(),
                        range,
                    });
                }
                leaf.apply(x)
            }
        }
    }

    //___________________________________DOMAIN____________________________________

    /// Values of argument `arg` the function accepts: the declared restriction intersected with
    /// everything inferred from the children.
    pub fn input_range(&self, arg: &str) -> Interval {
        let declared = self
            .declared_domain()
            .get(arg)
            .cloned()
            .unwrap_or_default();
        if let Some(inner) = self.composed() {
            return declared.intersect(&inner.input_range(arg));
        }
        let own_arg = self.arg_name() == arg;
        match self.kind() {
            FunctionKind::Const(_)
            | FunctionKind::Identity
            | FunctionKind::Negation { inner: None } => declared,
            FunctionKind::Sum(terms) | FunctionKind::Product(terms) => terms
                .iter()
                .fold(declared, |range, t| range.intersect(&t.input_range(arg))),
            FunctionKind::Quotient(n, d) => declared
                .intersect(&n.input_range(arg))
                .intersect(&d.input_range(arg)),
            FunctionKind::Power {
                exponent,
                inner: None,
            } => {
                if own_arg && exponent.requires_nonnegative_base() {
                    if exponent.is_negative() {
                        declared.intersect(&Interval::greater_than(0))
                    } else {
                        declared.intersect(&Interval::at_least(0))
                    }
                } else {
                    declared
                }
            }
            FunctionKind::Power {
                inner: Some(inner), ..
            }
            | FunctionKind::Negation { inner: Some(inner) } => {
                declared.intersect(&inner.input_range(arg))
            }
            FunctionKind::Polynomial(p) => {
                if p.requires_nonnegative(arg) {
                    declared.intersect(&Interval::at_least(0))
                } else {
                    declared
                }
            }
            FunctionKind::Leaf(leaf) => {
                if own_arg {
                    declared.intersect(&leaf.input_range())
                } else {
                    declared
                }
            }
        }
    }

    //___________________________________CONSTANTS____________________________________

    /// Structural predicate: a constant, or an aggregate, negation or power built only from
    /// constant-equivalent operands. Composed views never qualify.
    pub fn is_constant_equivalent(&self) -> bool {
        if self.is_composed() {
            return false;
        }
        match self.kind() {
            FunctionKind::Const(_) => true,
            FunctionKind::Sum(terms) | FunctionKind::Product(terms) => {
                terms.iter().all(Function::is_constant_equivalent)
            }
            FunctionKind::Quotient(n, d) => {
                n.is_constant_equivalent() && d.is_constant_equivalent()
            }
            FunctionKind::Power {
                inner: Some(inner), ..
            }
            | FunctionKind::Negation { inner: Some(inner) } => inner.is_constant_equivalent(),
            FunctionKind::Polynomial(p) => p.is_constant(),
            _ => false,
        }
    }

    /// Value of a constant-equivalent function, computed without touching the tree.
    pub fn evaluate_constant(&self) -> FunctionResult<Value> {
        if !self.is_constant_equivalent() {
            return Err(FunctionError::UnsupportedOperation(format!(
                "{} is not constant",
                self
            )));
        }
        self.eval_node(&HashMap::new(), None)
    }
}
