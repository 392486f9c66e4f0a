//! # Polynomials
//!
//! A [`Polynomial`] is an unordered collection of [`Term`]s in any number of variables. It is
//! assembled with a [`PolynomialBuilder`], which keeps the collection canonical while terms are
//! added:
//! - a term whose signature matches an existing one is merged by adding coefficients,
//! - a merge that cancels to zero removes the term,
//! - zero terms are never stored,
//! - a builder created with [`PolynomialBuilder::integral`] refuses rational exponents.
//!
//! `build()` freezes the builder; every operation on a built polynomial returns a new one.
use crate::numeric::{Exponent, NumericKind, Value};
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::function_node::Function;
use crate::symbolic::term::{Term, TermKind, TermOps};
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone)]
pub struct PolynomialBuilder {
    terms: Vec<Term>,
    ceiling: TermKind,
}

impl Default for PolynomialBuilder {
    fn default() -> PolynomialBuilder {
        PolynomialBuilder::new()
    }
}

impl PolynomialBuilder {
    /// accepts terms of every kind
    pub fn new() -> PolynomialBuilder {
        PolynomialBuilder {
            terms: Vec::new(),
            ceiling: TermKind::Fractional,
        }
    }

    /// accepts constant and integer-exponent terms only
    pub fn integral() -> PolynomialBuilder {
        PolynomialBuilder {
            terms: Vec::new(),
            ceiling: TermKind::Integral,
        }
    }

    pub fn ceiling(&self) -> TermKind {
        self.ceiling
    }

    /// Adds a term, merging it with the term of the same signature if there is one.
    pub fn add(&mut self, term: Term) -> FunctionResult<&mut PolynomialBuilder> {
        if term.term_kind() > self.ceiling {
            return Err(FunctionError::Argument(format!(
                "{} term {} is not allowed in a polynomial of {} terms",
                term.term_kind(),
                term,
                self.ceiling
            )));
        }
        if term.is_zero() {
            return Ok(self);
        }
        match self.terms.iter().position(|t| t.has_matching_signature(&term)) {
            Some(i) => {
                let coefficient = self.terms[i].coefficient().checked_add(term.coefficient())?;
                if coefficient.is_zero() {
                    self.terms.remove(i);
                } else {
                    self.terms[i] = Term::new(coefficient, term.exponents());
                }
            }
            None => self.terms.push(term),
        }
        Ok(self)
    }

    pub fn add_all(
        &mut self,
        terms: impl IntoIterator<Item = Term>,
    ) -> FunctionResult<&mut PolynomialBuilder> {
        for term in terms {
            self.add(term)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn build(self) -> Polynomial {
        Polynomial {
            terms: self.terms,
            ceiling: self.ceiling,
        }
    }
}

/// Immutable polynomial. Equality ignores the order of terms.
#[derive(Debug, Clone)]
pub struct Polynomial {
    terms: Vec<Term>,
    ceiling: TermKind,
}

impl PartialEq for Polynomial {
    fn eq(&self, other: &Polynomial) -> bool {
        self.terms.len() == other.terms.len() && self.terms.iter().all(|t| other.terms.contains(t))
    }
}

impl Polynomial {
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> FunctionResult<Polynomial> {
        let mut builder = PolynomialBuilder::new();
        builder.add_all(terms)?;
        Ok(builder.build())
    }

    /// Builder seeded with this polynomial's terms and ceiling.
    pub fn to_builder(&self) -> PolynomialBuilder {
        PolynomialBuilder {
            terms: self.terms.clone(),
            ceiling: self.ceiling,
        }
    }

    fn empty_like(&self) -> PolynomialBuilder {
        PolynomialBuilder {
            terms: Vec::new(),
            ceiling: self.ceiling,
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn variables(&self) -> BTreeSet<String> {
        self.terms
            .iter()
            .flat_map(|t| t.exponents().into_keys())
            .collect()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|t| t.term_kind() == TermKind::Constant)
    }

    /// value of a polynomial without variables (zero for the empty polynomial)
    pub fn constant_value(&self) -> Option<Value> {
        if !self.is_constant() {
            return None;
        }
        Some(
            self.terms
                .first()
                .map(|t| t.coefficient().clone())
                .unwrap_or_else(Value::zero),
        )
    }

    /// highest order in `var`, `None` for the zero polynomial
    pub fn degree(&self, var: &str) -> Option<i64> {
        self.terms.iter().map(|t| t.order(var)).max()
    }

    /// term whose order in `var` is `order`, if there is exactly one such term
    pub fn term_of_order(&self, var: &str, order: i64) -> Option<&Term> {
        self.terms
            .iter()
            .filter(|t| t.order(var) == order)
            .exactly_one()
            .ok()
    }

    /// widest coefficient kind
    pub fn result_kind(&self) -> NumericKind {
        let widest = self
            .terms
            .iter()
            .map(|t| t.coefficient().kind())
            .fold(NumericKind::Integer, NumericKind::widest);
        if self.terms.iter().any(|t| t.term_kind() == TermKind::Fractional) {
            widest.widest(NumericKind::Real)
        } else {
            widest
        }
    }

    /// true if a real root of `var` is taken somewhere
    pub fn requires_nonnegative(&self, var: &str) -> bool {
        self.terms
            .iter()
            .any(|t| t.exponent_of(var).requires_nonnegative_base())
    }

    pub fn evaluate(&self, args: &HashMap<String, Value>) -> FunctionResult<Value> {
        self.terms.iter().try_fold(Value::zero(), |acc, t| {
            Ok(acc.checked_add(&t.evaluate(args)?)?)
        })
    }

    pub fn differentiate(&self, var: &str) -> FunctionResult<Polynomial> {
        let mut builder = self.empty_like();
        for term in &self.terms {
            if let Some(d) = term.differentiate(var)? {
                builder.add(d)?;
            }
        }
        Ok(builder.build())
    }

    pub fn add_term(&self, term: Term) -> FunctionResult<Polynomial> {
        let mut builder = self.to_builder();
        builder.add(term)?;
        Ok(builder.build())
    }

    pub fn plus(&self, other: &Polynomial) -> FunctionResult<Polynomial> {
        let mut builder = self.to_builder();
        builder.add_all(other.terms.iter().cloned())?;
        Ok(builder.build())
    }

    pub fn multiply_term(&self, term: &Term) -> FunctionResult<Polynomial> {
        let mut builder = self.empty_like();
        for t in &self.terms {
            builder.add(t.multiply(term)?)?;
        }
        Ok(builder.build())
    }

    pub fn multiply(&self, other: &Polynomial) -> FunctionResult<Polynomial> {
        let mut builder = self.empty_like();
        for (a, b) in self.terms.iter().cartesian_product(other.terms.iter()) {
            builder.add(a.multiply(b)?)?;
        }
        Ok(builder.build())
    }

    pub fn scale(&self, factor: &Value) -> FunctionResult<Polynomial> {
        let mut builder = self.empty_like();
        for t in &self.terms {
            builder.add(t.scale(factor)?)?;
        }
        Ok(builder.build())
    }

    /// Multiplies every term by `var^exponent`.
    pub fn absorb_power(&self, var: &str, exponent: Exponent) -> FunctionResult<Polynomial> {
        let mut builder = self.empty_like();
        for t in &self.terms {
            builder.add(t.absorb_power(var, exponent)?)?;
        }
        Ok(builder.build())
    }

    /// Fixes some variables to values (currying).
    pub fn substitute(&self, fixed: &HashMap<String, Value>) -> FunctionResult<Polynomial> {
        let mut builder = self.empty_like();
        for t in &self.terms {
            builder.add(t.substitute(fixed)?)?;
        }
        Ok(builder.build())
    }

    /// Function node evaluating this polynomial, composed through argument `arg_name`.
    pub fn to_function(&self, arg_name: &str) -> Function {
        Function::polynomial(self.clone(), arg_name)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        write!(f, "({})", self.terms.iter().join(" + "))
    }
}
