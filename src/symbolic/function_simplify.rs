//! # Function Simplification Module
//!
//! Best-effort algebraic simplification of function trees. The simplifier walks the tree
//! depth-first, rewrites every node locally and repeats the whole walk until nothing changes
//! (bounded by `EngineConfig::max_simplify_passes`).
//!
//! ## Rules
//!
//! 1. **Constant Folding**: constant-equivalent operands are evaluated and merged into one
//!    constant (`2 + x + 3 = x + 5`, `2 * x * 3 = 6 * x`)
//! 2. **Like Terms**: `x + x = 2 * x`, `3 * x - x = 2 * x`, `x - x = 0`
//! 3. **Powers**: `x * x^2 = x^3`, `x^3 / x = x^2`, `x^0 = 1`, `x^1 = x`
//! 4. **Negation**: `-(-x) = x`, `-1 * x = -x`, `(-a) / b = -(a / b)`
//! 5. **Quotients**: `c1 / c2` folds, `f / c = (1/c) * f`, `c / x^n = c * x^-n`, `f / f = 1`
//!
//! Composed views are simplified by simplifying their outer and inner functions and composing
//! the results again. Division by an exact zero found while folding is an `Arithmetic` error.
//!
//! A rewrite never widens the domain: the declared and inferred ranges of the input are declared
//! again on the result, so `(x^(1/2))^2` simplifies to `x` restricted to `[0, ∞)`.
use crate::numeric::{Exponent, Interval, Value};
use crate::symbolic::engine_config::EngineConfig;
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_node::{Function, FunctionKind};
use log::debug;

#[derive(Debug, Clone)]
pub struct Simplifier {
    max_passes: usize,
}

impl Default for Simplifier {
    fn default() -> Simplifier {
        Simplifier::new()
    }
}

impl Simplifier {
    pub fn new() -> Simplifier {
        Simplifier::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Simplifier {
        Simplifier {
            max_passes: config.max_simplify_passes.max(1),
        }
    }

    /// Rewrites `f` until a pass changes nothing or the pass limit is reached. The result accepts
    /// exactly the arguments `f` accepts.
    pub fn simplify(&self, f: &Function) -> FunctionResult<Function> {
        let mut current = f.clone();
        for pass in 1..=self.max_passes {
            let next = self.simplify_node(&current)?;
            if next == current {
                debug!("simplification of {} settled after {} passes", f, pass);
                return Ok(restore_domain(f, next));
            }
            current = next;
        }
        debug!(
            "simplification of {} stopped after {} passes",
            f, self.max_passes
        );
        Ok(restore_domain(f, current))
    }

    fn simplify_node(&self, f: &Function) -> FunctionResult<Function> {
        match (f.original(), f.composed()) {
            (Some(outer), Some(inner)) => {
                let inner = self.simplify_node(inner)?;
                self.simplify_node(outer)?.compose_at(outer.arg_name(), &inner)
            }
            (Some(original), None) => {
                // curried node: simplify locally, keep the provenance
                let local = self.simplify_local(&f.detached())?;
                if local.is_composed() {
                    return Ok(local);
                }
                Ok(local.with_links(Some(original.clone()), f.node.links.composing.clone()))
            }
            _ => self.simplify_local(f),
        }
    }

    fn simplify_local(&self, f: &Function) -> FunctionResult<Function> {
        match f.kind() {
            FunctionKind::Const(_)
            | FunctionKind::Identity
            | FunctionKind::Leaf(_)
            | FunctionKind::Negation { inner: None } => Ok(f.clone()),
            FunctionKind::Power {
                exponent,
                inner: None,
            } => {
                // x^0 = 1, x^1 = x
                if exponent.is_zero() {
                    Ok(f.rebuild(FunctionKind::Const(Value::one())))
                } else if exponent.is_one() {
                    Ok(f.rebuild(FunctionKind::Identity))
                } else {
                    Ok(f.clone())
                }
            }
            FunctionKind::Power {
                exponent,
                inner: Some(g),
            } => {
                let g = self.simplify_node(g)?;
                if exponent.is_zero() {
                    return Ok(f.rebuild(FunctionKind::Const(Value::one())));
                }
                if g.is_constant_equivalent() {
                    let value = exponent.apply_to(&g.evaluate_constant()?)?;
                    return Ok(f.rebuild(FunctionKind::Const(value)));
                }
                Ok(make_power(g, *exponent))
            }
            FunctionKind::Negation { inner: Some(g) } => {
                let g = self.simplify_node(g)?;
                if g.is_constant_equivalent() {
                    return Ok(f.rebuild(FunctionKind::Const(g.evaluate_constant()?.negate())));
                }
                if is_plain(&g) {
                    match g.kind() {
                        // -(-h) = h
                        FunctionKind::Negation { inner: Some(h) } => return Ok(h.clone()),
                        FunctionKind::Negation { inner: None } => {
                            return Ok(g.rebuild(FunctionKind::Identity));
                        }
                        _ => {}
                    }
                }
                Ok(f.rebuild(FunctionKind::Negation { inner: Some(g) }))
            }
            FunctionKind::Polynomial(p) => match p.constant_value() {
                Some(c) => Ok(f.rebuild(FunctionKind::Const(c))),
                None => Ok(f.clone()),
            },
            FunctionKind::Sum(terms) => self.simplify_sum(f, terms),
            FunctionKind::Product(factors) => self.simplify_product(f, factors),
            FunctionKind::Quotient(n, d) => {
                let n = self.simplify_node(n)?;
                let d = self.simplify_node(d)?;
                self.divide(f, n, d)
            }
        }
    }

    //___________________________________SUMS____________________________________

    fn simplify_sum(&self, f: &Function, terms: &[Function]) -> FunctionResult<Function> {
        let mut flat = Vec::with_capacity(terms.len());
        for t in terms {
            let t = self.simplify_node(t)?;
            match t.kind() {
                FunctionKind::Sum(inner) if is_plain(&t) => flat.extend(inner.iter().cloned()),
                _ => flat.push(t),
            }
        }
        let mut constant = Value::zero();
        // like terms: core -> summed coefficient, in order of first appearance
        let mut groups: Vec<(Function, Value)> = Vec::new();
        for t in flat {
            let (c, core) = split_coefficient(&t)?;
            match core {
                None => constant = constant.checked_add(&c)?,
                Some(core) => match groups.iter_mut().find(|(g, _)| *g == core) {
                    Some(slot) => slot.1 = slot.1.checked_add(&c)?,
                    None => groups.push((core, c)),
                },
            }
        }
        let mut out = Vec::with_capacity(groups.len() + 1);
        for (core, c) in groups {
            // x - x = 0
            if !c.is_zero() {
                out.push(with_coefficient(c, core)?);
            }
        }
        // x + 0 = x
        if !constant.is_zero() || out.is_empty() {
            out.push(Function::constant_in(constant, f.arg_name()));
        }
        if out.len() == 1 {
            return Ok(out.remove(0));
        }
        Ok(f.rebuild(FunctionKind::Sum(out)))
    }

    //___________________________________PRODUCTS____________________________________

    fn simplify_product(&self, f: &Function, factors: &[Function]) -> FunctionResult<Function> {
        let mut flat = Vec::with_capacity(factors.len());
        for t in factors {
            let t = self.simplify_node(t)?;
            match t.kind() {
                FunctionKind::Product(inner) if is_plain(&t) => flat.extend(inner.iter().cloned()),
                _ => flat.push(t),
            }
        }
        let mut coefficient = Value::one();
        // base -> summed exponent, in order of first appearance
        let mut groups: Vec<(Function, Exponent)> = Vec::new();
        for t in flat {
            if t.is_constant_equivalent() {
                coefficient = coefficient.checked_mul(&t.evaluate_constant()?)?;
                continue;
            }
            let (sign, t) = strip_negations(t);
            if sign {
                coefficient = coefficient.negate();
            }
            let (base, e) = power_parts(&t);
            // exponents that would overflow stay separate factors
            let merged = groups
                .iter_mut()
                .find(|(b, _)| *b == base)
                .and_then(|slot| slot.1.checked_add(e).ok().map(|sum| slot.1 = sum));
            if merged.is_none() {
                groups.push((base, e));
            }
        }
        // x * 0 = 0
        if coefficient.is_zero() {
            return Ok(Function::constant_in(Value::zero(), f.arg_name()));
        }
        let mut rest: Vec<Function> = groups
            .into_iter()
            .filter(|(_, e)| !e.is_zero())
            .map(|(base, e)| make_power(base, e))
            .collect();
        let core = match rest.len() {
            0 => return Ok(Function::constant_in(coefficient, f.arg_name())),
            1 => rest.remove(0),
            _ => f.rebuild(FunctionKind::Product(rest)),
        };
        with_coefficient(coefficient, core)
    }

    //___________________________________QUOTIENTS____________________________________

    fn divide(&self, f: &Function, n: Function, d: Function) -> FunctionResult<Function> {
        if d.is_constant_equivalent() {
            let dv = d.evaluate_constant()?;
            if dv.is_zero() {
                return Err(FunctionError::Arithmetic(format!("division by zero in {}", f)));
            }
            // c1 / c2
            if n.is_constant_equivalent() {
                let value = n.evaluate_constant()?.checked_div(&dv)?;
                return Ok(Function::constant_in(value, f.arg_name()));
            }
            // f / c = (1/c) * f
            let inverse = Value::one().checked_div(&dv)?;
            let scaled = f.rebuild(FunctionKind::Product(vec![
                Function::constant_in(inverse, f.arg_name()),
                n,
            ]));
            return self.simplify_local(&scaled);
        }
        let (c, core) = split_coefficient(&n)?;
        let core = match core {
            Some(core) => core,
            None if c.is_zero() => return Ok(Function::constant_in(c, f.arg_name())),
            None => {
                // c / x^n = c * x^-n
                let (base, e) = power_parts(&d);
                if !e.is_one() || matches!(d.kind(), FunctionKind::Identity) {
                    if let Ok(inverse) = e.checked_neg() {
                        return with_coefficient(c, make_power(base, inverse));
                    }
                }
                return Ok(f.rebuild(FunctionKind::Quotient(n, d)));
            }
        };
        // (c * g) / d = c * (g / d), (-g) / d = -(g / d)
        if !c.is_one() {
            let quotient = self.divide(f, core, d)?;
            return with_coefficient(c, quotient);
        }
        // f / f = 1
        if core == d {
            return Ok(Function::constant_in(Value::one(), f.arg_name()));
        }
        let (den_base, den_e) = power_parts(&d);
        let (num_base, num_e) = power_parts(&core);
        if num_base == den_base {
            if let Ok(difference) = num_e.checked_sub(den_e) {
                return Ok(make_power(num_base, difference));
            }
        }
        // (x^3 * y) / x = x^2 * y
        if let FunctionKind::Product(factors) = core.kind() {
            if is_plain(&core) {
                if let Some(i) = factors.iter().position(|g| power_parts(g).0 == den_base) {
                    let (base, e) = power_parts(&factors[i]);
                    if let Ok(difference) = e.checked_sub(den_e) {
                        let mut reduced = factors.clone();
                        reduced[i] = make_power(base, difference);
                        return self.simplify_local(&core.rebuild(FunctionKind::Product(reduced)));
                    }
                }
            }
        }
        Ok(f.rebuild(FunctionKind::Quotient(core, d)))
    }
}

//___________________________________HELPERS____________________________________

/// Declares on `simplified` the declared and inferred ranges of `f`, so that collapsed
/// aggregates, merged exponents and `(x^(1/2))^2 = x` keep rejecting what `f` rejects.
fn restore_domain(f: &Function, simplified: Function) -> Function {
    let mut names: Vec<String> = f.declared_domain().keys().cloned().collect();
    names.extend(f.free_variables());
    names.sort();
    names.dedup();
    names.into_iter().fold(simplified, |g, name| {
        let range = f.input_range(&name);
        if range == Interval::all() || g.input_range(&name) == range {
            g
        } else {
            g.with_domain(&name, range)
        }
    })
}

fn is_plain(f: &Function) -> bool {
    f.original().is_none()
}

/// Splits a term into its numeric coefficient and the rest: `3 * x -> (3, x)`, `-x -> (-1, x)`,
/// `5 -> (5, None)`.
fn split_coefficient(f: &Function) -> FunctionResult<(Value, Option<Function>)> {
    if f.is_constant_equivalent() {
        return Ok((f.evaluate_constant()?, None));
    }
    if is_plain(f) {
        match f.kind() {
            FunctionKind::Negation { inner: Some(g) } => {
                let (c, rest) = split_coefficient(g)?;
                return Ok((c.negate(), rest));
            }
            FunctionKind::Negation { inner: None } => {
                return Ok((Value::integer(-1), Some(f.rebuild(FunctionKind::Identity))));
            }
            FunctionKind::Product(factors) => {
                let (constants, rest): (Vec<Function>, Vec<Function>) = factors
                    .iter()
                    .cloned()
                    .partition(Function::is_constant_equivalent);
                if !constants.is_empty() {
                    let mut c = Value::one();
                    for k in &constants {
                        c = c.checked_mul(&k.evaluate_constant()?)?;
                    }
                    let mut rest = rest;
                    let core = if rest.len() == 1 {
                        rest.remove(0)
                    } else {
                        f.rebuild(FunctionKind::Product(rest))
                    };
                    return Ok((c, Some(core)));
                }
            }
            _ => {}
        }
    }
    Ok((Value::one(), Some(f.clone())))
}

/// c * core, in the shape the simplifier produces: `0`, `core`, `-core` or `c * factors...`.
fn with_coefficient(c: Value, core: Function) -> FunctionResult<Function> {
    if c.is_zero() {
        return Ok(Function::constant_in(c, core.arg_name()));
    }
    if core.is_constant_equivalent() {
        let value = c.checked_mul(&core.evaluate_constant()?)?;
        return Ok(Function::constant_in(value, core.arg_name()));
    }
    if c.is_one() {
        return Ok(core);
    }
    if c.is_minus_one() {
        return Ok(core.negate());
    }
    let constant = Function::constant_in(c, core.arg_name());
    let factors = match core.kind() {
        FunctionKind::Product(factors) if is_plain(&core) => {
            std::iter::once(constant).chain(factors.iter().cloned()).collect()
        }
        _ => vec![constant, core.clone()],
    };
    Ok(core.rebuild(FunctionKind::Product(factors)))
}

/// Removes leading negations; `true` if an odd number was removed.
fn strip_negations(f: Function) -> (bool, Function) {
    let mut negative = false;
    let mut current = f;
    loop {
        if !is_plain(&current) {
            return (negative, current);
        }
        let next = match current.kind() {
            FunctionKind::Negation { inner: Some(g) } => g.clone(),
            FunctionKind::Negation { inner: None } => current.rebuild(FunctionKind::Identity),
            _ => return (negative, current),
        };
        negative = !negative;
        current = next;
    }
}

/// Base and exponent of a factor; anything that is not a power is its own base with exponent 1.
fn power_parts(f: &Function) -> (Function, Exponent) {
    if is_plain(f) {
        match f.kind() {
            FunctionKind::Power {
                exponent,
                inner: Some(g),
            } => return (g.clone(), *exponent),
            FunctionKind::Power {
                exponent,
                inner: None,
            } => return (f.rebuild(FunctionKind::Identity), *exponent),
            _ => {}
        }
    }
    (f.clone(), Exponent::int(1))
}

/// base^e with `x^0 = 1`, `x^1 = x`, `(g^m)^n = g^(m·n)` applied.
fn make_power(base: Function, e: Exponent) -> Function {
    if e.is_zero() {
        return Function::constant_in(Value::one(), base.arg_name());
    }
    if e.is_one() {
        return base;
    }
    if is_plain(&base) {
        match base.kind() {
            FunctionKind::Identity => {
                return base.rebuild(FunctionKind::Power {
                    exponent: e,
                    inner: None,
                });
            }
            // (x^2)^(1/2) is |x|, not x
            FunctionKind::Power { exponent: m, inner } if e.is_integer() || m.numer() % 2 != 0 => {
                if let Ok(product) = m.checked_mul(e) {
                    let inner_base = match inner {
                        Some(g) => g.clone(),
                        None => base.rebuild(FunctionKind::Identity),
                    };
                    return make_power(inner_base, product);
                }
            }
            _ => {}
        }
    }
    Function::power_of(e, base)
}
