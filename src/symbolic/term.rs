//! # Polynomial terms
//!
//! A term is `coefficient * Π var^exponent`. Terms come in three kinds, ordered by how general
//! their exponents are:
//! - [`ConstantTerm`] - no variables at all,
//! - [`IntegerTerm`] - integer exponents only,
//! - [`RationalTerm`] - at least one non-integer rational exponent.
//!
//! Behavior shared by all kinds lives in the default methods of [`TermOps`]; [`Term`] dispatches
//! to the concrete kind through `enum_dispatch`. Zero exponents are never stored, so two terms
//! with the same exponent map ("signature") differ only by their coefficient.
use crate::numeric::{Exponent, NumericResult, Value};
use crate::symbolic::errors::{FunctionError, FunctionResult};
use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Generality of a term's exponents, from the narrowest to the widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum TermKind {
    Constant,
    Integral,
    Fractional,
}

#[enum_dispatch(Term)]
pub trait TermOps {
    fn coefficient(&self) -> &Value;
    /// variable -> exponent, zero exponents omitted
    fn exponents(&self) -> BTreeMap<String, Exponent>;
    fn term_kind(&self) -> TermKind;

    fn exponent_of(&self, var: &str) -> Exponent {
        self.exponents()
            .get(var)
            .copied()
            .unwrap_or(Exponent::int(0))
    }

    /// Integer order of the term in `var` (rational exponents are floored).
    fn order(&self, var: &str) -> i64 {
        self.exponent_of(var).floor()
    }

    /// true if both terms have exactly the same variables with the same exponents
    fn has_matching_signature(&self, other: &Term) -> bool {
        self.exponents() == other.exponents()
    }

    fn scale(&self, factor: &Value) -> NumericResult<Term> {
        Ok(Term::new(self.coefficient().checked_mul(factor)?, self.exponents()))
    }

    /// Multiplies coefficients and adds exponents of shared variables.
    fn multiply(&self, other: &Term) -> NumericResult<Term> {
        let coefficient = self.coefficient().checked_mul(other.coefficient())?;
        let mut exponents = self.exponents();
        for (var, e) in other.exponents() {
            let sum = exponents.get(&var).copied().unwrap_or(Exponent::int(0)).checked_add(e)?;
            exponents.insert(var, sum);
        }
        Ok(Term::new(coefficient, exponents))
    }

    /// Multiplies the term by `var^exponent`.
    fn absorb_power(&self, var: &str, exponent: Exponent) -> NumericResult<Term> {
        let mut exponents = self.exponents();
        let e = self.exponent_of(var).checked_add(exponent)?;
        exponents.insert(var.to_string(), e);
        Ok(Term::new(self.coefficient().clone(), exponents))
    }

    /// Partial derivative in `var`; `None` when the term does not depend on `var`.
    fn differentiate(&self, var: &str) -> NumericResult<Option<Term>> {
        let e = self.exponent_of(var);
        if e.is_zero() {
            return Ok(None);
        }
        let coefficient = self.coefficient().checked_mul(&e.to_value())?;
        let mut exponents = self.exponents();
        exponents.insert(var.to_string(), e.checked_sub(Exponent::int(1))?);
        Ok(Some(Term::new(coefficient, exponents)))
    }

    fn evaluate(&self, args: &HashMap<String, Value>) -> FunctionResult<Value> {
        let mut acc = self.coefficient().clone();
        for (var, e) in self.exponents() {
            let x = args.get(&var).ok_or_else(|| {
                FunctionError::Argument(format!("no value bound to argument {}", var))
            })?;
            acc = acc.checked_mul(&e.apply_to(x)?)?;
        }
        Ok(acc)
    }

    /// Folds the fixed variables into the coefficient.
    fn substitute(&self, fixed: &HashMap<String, Value>) -> NumericResult<Term> {
        let mut coefficient = self.coefficient().clone();
        let mut exponents = BTreeMap::new();
        for (var, e) in self.exponents() {
            match fixed.get(&var) {
                Some(x) => coefficient = coefficient.checked_mul(&e.apply_to(x)?)?,
                None => {
                    exponents.insert(var, e);
                }
            }
        }
        Ok(Term::new(coefficient, exponents))
    }
}

#[enum_dispatch]
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Constant(ConstantTerm),
    Integral(IntegerTerm),
    Fractional(RationalTerm),
}

impl Term {
    /// Picks the narrowest kind able to hold the exponents.
    pub fn new(coefficient: Value, exponents: BTreeMap<String, Exponent>) -> Term {
        let exponents: BTreeMap<String, Exponent> = exponents
            .into_iter()
            .filter(|(_, e)| !e.is_zero())
            .collect();
        if exponents.is_empty() {
            Term::Constant(ConstantTerm { coefficient })
        } else if exponents.values().all(Exponent::is_integer) {
            let exponents = exponents
                .into_iter()
                .map(|(var, e)| (var, e.numer()))
                .collect();
            Term::Integral(IntegerTerm {
                coefficient,
                exponents,
            })
        } else {
            Term::Fractional(RationalTerm {
                coefficient,
                exponents,
            })
        }
    }

    pub fn constant(coefficient: impl Into<Value>) -> Term {
        Term::new(coefficient.into(), BTreeMap::new())
    }

    /// coefficient * var^exponent
    pub fn monomial(
        coefficient: impl Into<Value>,
        var: &str,
        exponent: impl Into<Exponent>,
    ) -> Term {
        Term::new(
            coefficient.into(),
            BTreeMap::from([(var.to_string(), exponent.into())]),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient().is_zero()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantTerm {
    coefficient: Value,
}

impl TermOps for ConstantTerm {
    fn coefficient(&self) -> &Value {
        &self.coefficient
    }

    fn exponents(&self) -> BTreeMap<String, Exponent> {
        BTreeMap::new()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Constant
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerTerm {
    coefficient: Value,
    exponents: BTreeMap<String, i64>,
}

impl TermOps for IntegerTerm {
    fn coefficient(&self) -> &Value {
        &self.coefficient
    }

    fn exponents(&self) -> BTreeMap<String, Exponent> {
        self.exponents
            .iter()
            .map(|(var, n)| (var.clone(), Exponent::int(*n)))
            .collect()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Integral
    }

    fn order(&self, var: &str) -> i64 {
        self.exponents.get(var).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RationalTerm {
    coefficient: Value,
    exponents: BTreeMap<String, Exponent>,
}

impl TermOps for RationalTerm {
    fn coefficient(&self) -> &Value {
        &self.coefficient
    }

    fn exponents(&self) -> BTreeMap<String, Exponent> {
        self.exponents.clone()
    }

    fn term_kind(&self) -> TermKind {
        TermKind::Fractional
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let exponents = self.exponents();
        if exponents.is_empty() {
            return write!(f, "{}", self.coefficient());
        }
        let vars = exponents
            .iter()
            .map(|(var, e)| {
                if e.is_one() {
                    var.clone()
                } else {
                    format!("{}^{}", var, e)
                }
            })
            .join("*");
        if self.coefficient().is_one() {
            write!(f, "{}", vars)
        } else {
            write!(f, "{}*{}", self.coefficient(), vars)
        }
    }
}
