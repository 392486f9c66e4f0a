//! # Composition and currying
//!
//! `f.compose_with(&g)` builds f∘g. Before falling back to a generic composed view a few
//! algebraic identities are tried:
//! - (-x)∘(-g) = g
//! - (x^n)∘(g^m) = g^(n·m) (skipped when it would drop an absolute value, e.g. (x^2)^(1/2))
//! - Identity∘g = g,  f∘x = f
//! - Const∘g = Const
//!
//! A composed view keeps the outer node's kind and records the outer function in `original` and
//! the inner one in `composed`; the inner function's `composing` back-link is a `Weak` pointer to
//! the view, so no reference cycle ever owns itself. Currying substitutes fixed argument values
//! and records the pre-curry node in `original`.
use crate::numeric::Value;
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_node::{Function, FunctionKind, Node};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Links describing how a node came to be.
#[derive(Debug, Clone, Default)]
pub struct CompositionLinks {
    /// outer function of a composition, or the pre-rewrite node of a curried function
    pub(crate) original: Option<Function>,
    /// inner function of a composition
    pub(crate) composed: Option<Function>,
    /// non-owning back-link from an inner function to the view wrapping it
    pub(crate) composing: Option<Weak<Node>>,
}

impl Function {
    pub fn original(&self) -> Option<&Function> {
        self.node.links.original.as_ref()
    }

    pub fn composed(&self) -> Option<&Function> {
        self.node.links.composed.as_ref()
    }

    /// The composed view this function is the inner part of, if that view is still alive.
    pub fn composing(&self) -> Option<Function> {
        self.node
            .links
            .composing
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|node| Function { node })
    }

    /// true for views produced by a composition
    pub fn is_composed(&self) -> bool {
        self.node.links.original.is_some() && self.node.links.composed.is_some()
    }

    /// Copy of the node with every link dropped.
    pub(crate) fn detached(&self) -> Function {
        let mut node = (*self.node).clone();
        node.links = CompositionLinks::default();
        Function::from_node(node)
    }

    /// Copy of the node carrying the given `original` link and back-link.
    pub(crate) fn with_links(
        &self,
        original: Option<Function>,
        composing: Option<Weak<Node>>,
    ) -> Function {
        let mut node = (*self.node).clone();
        node.links = CompositionLinks {
            original,
            composed: None,
            composing,
        };
        Function::from_node(node)
    }

    /// Builds `self ∘ inner` (evaluates as `self(inner(x))`).
    ///
    /// Fails with `TypeMismatch` when `inner` produces values this function does not accept.
    pub fn compose_with(&self, inner: &Function) -> FunctionResult<Function> {
        if !self.arg_kind().accepts(inner.result_kind()) {
            return Err(FunctionError::TypeMismatch {
                expected: self.arg_kind(),
                found: inner.result_kind(),
            });
        }
        if let Some(collapsed) = self.compose_identities(inner) {
            debug!("composition {} ∘ {} collapsed to {}", self, inner, collapsed);
            return Ok(collapsed);
        }
        Ok(self.compose_view(inner))
    }

    /// Builds `outer ∘ self`.
    pub fn and_then(&self, outer: &Function) -> FunctionResult<Function> {
        outer.compose_with(self)
    }

    /// `self ∘ inner` with `inner` feeding the argument named `slot`. Rewriting an outer function
    /// (simplifying, differentiating, currying) may leave it tagged with another argument name.
    pub(crate) fn compose_at(&self, slot: &str, inner: &Function) -> FunctionResult<Function> {
        if !self.contains_variable(slot) {
            return Ok(self.clone());
        }
        if self.arg_name() == slot {
            return self.compose_with(inner);
        }
        // only aggregates and views reach here: their argument name is a tag, not a variable
        let mut node = (*self.node).clone();
        node.arg_name = slot.to_string();
        Function::from_node(node).compose_with(inner)
    }

    fn compose_identities(&self, inner: &Function) -> Option<Function> {
        if self.node.links.original.is_some() {
            return None;
        }
        let plain_inner = inner.node.links.original.is_none();
        match (&self.node.kind, &inner.node.kind) {
            // f∘x = f
            (_, FunctionKind::Identity) if plain_inner && inner.arg_name() == self.arg_name() => {
                Some(self.clone())
            }
            // x∘g = g
            (FunctionKind::Identity, _) => Some(inner.clone()),
            // c∘g = c
            (FunctionKind::Const(c), _) => Some(Function::constant_in(c.clone(), inner.arg_name())),
            // -(-g) = g
            (FunctionKind::Negation { inner: None }, FunctionKind::Negation { inner: g })
                if plain_inner =>
            {
                match g {
                    Some(g) => Some(g.clone()),
                    None => Some(Function::identity(inner.arg_name())),
                }
            }
            // (g^m)^n = g^(n·m)
            (
                FunctionKind::Power {
                    exponent: n,
                    inner: None,
                },
                FunctionKind::Power { exponent: m, inner: g },
            ) if plain_inner && (n.is_integer() || m.numer() % 2 != 0) => {
                // an exponent that overflows keeps the plain composition
                let kind = FunctionKind::Power {
                    exponent: n.checked_mul(*m).ok()?,
                    inner: g.clone(),
                };
                Some(Function::from_kind(kind, inner.arg_name()))
            }
            _ => None,
        }
    }

    /// Generic composed view: same kind as `self`, evaluated through the links.
    fn compose_view(&self, inner: &Function) -> Function {
        let outer = self.clone();
        let node = Arc::new_cyclic(|view: &Weak<Node>| {
            let mut inner_node = (*inner.node).clone();
            inner_node.links.composing = Some(view.clone());
            let linked_inner = Function::from_node(inner_node);
            Node {
                kind: outer.node.kind.clone(),
                arg_name: inner.arg_name().to_string(),
                arg_kind: inner.arg_kind(),
                result_kind: outer.result_kind(),
                domain: inner.node.domain.clone(),
                links: CompositionLinks {
                    original: Some(outer.clone()),
                    composed: Some(linked_inner),
                    composing: None,
                },
            }
        });
        Function { node }
    }

    //___________________________________CURRYING____________________________________

    /// Fixes some arguments to values. The result no longer depends on the fixed names and
    /// remembers the pre-curry function as its `original`.
    pub fn curry(&self, fixed: &HashMap<String, Value>) -> FunctionResult<Function> {
        if fixed.is_empty() || !fixed.keys().any(|name| self.contains_variable(name)) {
            return Ok(self.clone());
        }
        let curried = self.substitute(fixed)?;
        if curried.is_composed() {
            return Ok(curried);
        }
        let composing = curried.node.links.composing.clone();
        Ok(curried.with_links(Some(self.clone()), composing))
    }

    fn substitute(&self, fixed: &HashMap<String, Value>) -> FunctionResult<Function> {
        if let (Some(outer), Some(inner)) = (self.original(), self.composed()) {
            // the outer argument is fed by the inner function, never by the caller
            let slot = outer.arg_name();
            let mut outer_fixed = fixed.clone();
            outer_fixed.remove(slot);
            let inner = inner.detached().substitute(fixed)?;
            return outer.substitute(&outer_fixed)?.compose_at(slot, &inner);
        }
        let arg = self.arg_name();
        let own_value = fixed.get(arg);
        let constant = |v: Value| Function::constant_in(v, arg);
        let kind = match &self.node.kind {
            FunctionKind::Const(_) => return Ok(self.clone()),
            FunctionKind::Identity => match own_value {
                Some(v) => return Ok(constant(v.clone())),
                None => return Ok(self.clone()),
            },
            FunctionKind::Leaf(leaf) => match own_value {
                Some(v) => {
                    let range = leaf.input_range();
                    if !range.contains(v) {
                        return Err(FunctionError::Domain {
                            argument: arg.to_string(),
                            value: v.to_string(),
                            range,
                        });
                    }
                    return Ok(constant(leaf.apply(v)?));
                }
                None => return Ok(self.clone()),
            },
            FunctionKind::Power {
                exponent,
                inner: None,
            } => match own_value {
                Some(v) => return Ok(constant(exponent.apply_to(v)?)),
                None => return Ok(self.clone()),
            },
            FunctionKind::Negation { inner: None } => match own_value {
                Some(v) => return Ok(constant(v.negate())),
                None => return Ok(self.clone()),
            },
            FunctionKind::Sum(terms) => FunctionKind::Sum(
                terms
                    .iter()
                    .map(|t| t.substitute(fixed))
                    .collect::<FunctionResult<Vec<_>>>()?,
            ),
            FunctionKind::Product(factors) => FunctionKind::Product(
                factors
                    .iter()
                    .map(|t| t.substitute(fixed))
                    .collect::<FunctionResult<Vec<_>>>()?,
            ),
            FunctionKind::Quotient(n, d) => {
                FunctionKind::Quotient(n.substitute(fixed)?, d.substitute(fixed)?)
            }
            FunctionKind::Power {
                exponent,
                inner: Some(inner),
            } => FunctionKind::Power {
                exponent: *exponent,
                inner: Some(inner.substitute(fixed)?),
            },
            FunctionKind::Negation { inner: Some(inner) } => FunctionKind::Negation {
                inner: Some(inner.substitute(fixed)?),
            },
            FunctionKind::Polynomial(p) => {
                let p = p.substitute(fixed)?;
                match p.constant_value() {
                    Some(c) => return Ok(constant(c)),
                    None => FunctionKind::Polynomial(p),
                }
            }
        };
        Ok(self.rebuild(kind))
    }
}
