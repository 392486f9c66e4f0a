//! # Function nodes
//!
//! A [`Function`] is a cheap, clonable handle to an immutable expression node. The node kinds form
//! a closed set ([`FunctionKind`]): constants, the identity of a named argument, sums, products,
//! quotients, powers, negation, polynomials and opaque leaf analytic functions. Every node also
//! carries
//! - the name of the argument it expects,
//! - the numeric kind of that argument and of its result,
//! - declared domain restrictions per argument name,
//! - composition links (see `composition.rs`).
//!
//! Nodes are never mutated after construction: composing, differentiating, simplifying or scaling
//! always returns a new node. Sums and products can be grown step by step with an
//! [`AggregateBuilder`] which freezes into a node on `build()`.
//!
//! ## Example
//! ```rust
//! use RustedCalculus::symbolic::function_node::Function;
//! use RustedCalculus::numeric::Exponent;
//! let x = Function::identity("x");
//! let f = Function::power(Exponent::int(2), "x") + Function::constant(3) * x;
//! assert_eq!(f.apply(2).unwrap(), 10.into());
//! ```
use crate::numeric::{Exponent, Interval, NumericKind, Value};
use crate::symbolic::composition::CompositionLinks;
use crate::symbolic::errors::{FunctionError, FunctionResult};
use crate::symbolic::leaf_functions::AnalyticFunction;
use crate::symbolic::polynomial::Polynomial;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// argument name used when a constructor is not told otherwise
pub const DEFAULT_ARGUMENT: &str = "x";

/// Closed set of node kinds. Every dispatch site (evaluation, composition, differentiation,
/// simplification) matches on it exhaustively.
#[derive(Debug, Clone)]
pub enum FunctionKind {
    /// constant value, independent of the argument
    Const(Value),
    /// the argument itself
    Identity,
    /// f1 + f2 + ... + fn
    Sum(Vec<Function>),
    /// f1 * f2 * ... * fn
    Product(Vec<Function>),
    /// numerator / denominator
    Quotient(Function, Function),
    /// argument^exponent, or inner^exponent when `inner` is set
    Power {
        exponent: Exponent,
        inner: Option<Function>,
    },
    /// -argument, or -inner when `inner` is set
    Negation { inner: Option<Function> },
    /// sum of monomial terms, possibly in several variables
    Polynomial(Polynomial),
    /// opaque analytic function of one argument
    Leaf(Arc<dyn AnalyticFunction>),
}

impl PartialEq for FunctionKind {
    fn eq(&self, other: &FunctionKind) -> bool {
        match (self, other) {
            (FunctionKind::Const(a), FunctionKind::Const(b)) => a == b,
            (FunctionKind::Identity, FunctionKind::Identity) => true,
            (FunctionKind::Sum(a), FunctionKind::Sum(b)) => a == b,
            (FunctionKind::Product(a), FunctionKind::Product(b)) => a == b,
            (FunctionKind::Quotient(n1, d1), FunctionKind::Quotient(n2, d2)) => {
                n1 == n2 && d1 == d2
            }
            (
                FunctionKind::Power {
                    exponent: e1,
                    inner: i1,
                },
                FunctionKind::Power {
                    exponent: e2,
                    inner: i2,
                },
            ) => e1 == e2 && i1 == i2,
            (FunctionKind::Negation { inner: i1 }, FunctionKind::Negation { inner: i2 }) => {
                i1 == i2
            }
            (FunctionKind::Polynomial(p1), FunctionKind::Polynomial(p2)) => p1 == p2,
            (FunctionKind::Leaf(l1), FunctionKind::Leaf(l2)) => {
                Arc::ptr_eq(l1, l2)
                    || matches!(
                        (l1.canonical_name(), l2.canonical_name()),
                        (Some(a), Some(b)) if a == b
                    )
            }
            _ => false,
        }
    }
}

/// The node behind a [`Function`] handle.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: FunctionKind,
    pub(crate) arg_name: String,
    pub(crate) arg_kind: NumericKind,
    pub(crate) result_kind: NumericKind,
    pub(crate) domain: BTreeMap<String, Interval>,
    pub(crate) links: CompositionLinks,
}

/// Immutable, shareable expression tree. Cloning copies a pointer.
#[derive(Debug, Clone)]
pub struct Function {
    pub(crate) node: Arc<Node>,
}

/// Structural equality: same kind, same argument name, same operands and same composition
/// (the `composing` back-link is bookkeeping and does not take part).
impl PartialEq for Function {
    fn eq(&self, other: &Function) -> bool {
        if Arc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        let (a, b) = (&self.node, &other.node);
        a.arg_name == b.arg_name
            && a.kind == b.kind
            && a.links.original == b.links.original
            && a.links.composed == b.links.composed
    }
}

impl Function {
    pub(crate) fn from_node(node: Node) -> Function {
        Function {
            node: Arc::new(node),
        }
    }

    /// New node of `kind` with inferred argument/result kinds and no declared domain.
    pub(crate) fn from_kind(kind: FunctionKind, arg_name: &str) -> Function {
        let (arg_kind, result_kind) = infer_kinds(&kind);
        Function::from_node(Node {
            kind,
            arg_name: arg_name.to_string(),
            arg_kind,
            result_kind,
            domain: BTreeMap::new(),
            links: CompositionLinks::default(),
        })
    }

    /// Same metadata (argument, kinds, declared domain), new kind, no links.
    pub(crate) fn rebuild(&self, kind: FunctionKind) -> Function {
        let (arg_kind, result_kind) = infer_kinds(&kind);
        Function::from_node(Node {
            kind,
            arg_name: self.node.arg_name.clone(),
            arg_kind: arg_kind.min(self.node.arg_kind),
            result_kind,
            domain: self.node.domain.clone(),
            links: CompositionLinks::default(),
        })
    }

    //___________________________________CONSTRUCTORS____________________________________

    /// constant function of the default argument
    pub fn constant(value: impl Into<Value>) -> Function {
        Function::constant_in(value, DEFAULT_ARGUMENT)
    }

    pub fn constant_in(value: impl Into<Value>, arg_name: &str) -> Function {
        Function::from_kind(FunctionKind::Const(value.into()), arg_name)
    }

    /// f(x) = x for the argument named `arg_name`
    pub fn identity(arg_name: &str) -> Function {
        Function::from_kind(FunctionKind::Identity, arg_name)
    }

    /// f(x) = x^exponent
    pub fn power(exponent: Exponent, arg_name: &str) -> Function {
        Function::from_kind(
            FunctionKind::Power {
                exponent,
                inner: None,
            },
            arg_name,
        )
    }

    /// f(x) = g(x)^exponent
    pub fn power_of(exponent: Exponent, inner: Function) -> Function {
        let arg = inner.arg_name().to_string();
        Function::from_kind(
            FunctionKind::Power {
                exponent,
                inner: Some(inner),
            },
            &arg,
        )
    }

    /// f(x) = -x
    pub fn negation(arg_name: &str) -> Function {
        Function::from_kind(FunctionKind::Negation { inner: None }, arg_name)
    }

    /// f(x) = -g(x)
    pub fn negate(&self) -> Function {
        Function::from_kind(
            FunctionKind::Negation {
                inner: Some(self.clone()),
            },
            self.arg_name(),
        )
    }

    pub fn sum_of(terms: Vec<Function>) -> FunctionResult<Function> {
        let mut builder = AggregateBuilder::sum();
        builder.extend(terms);
        builder.build()
    }

    pub fn product_of(factors: Vec<Function>) -> FunctionResult<Function> {
        let mut builder = AggregateBuilder::product();
        builder.extend(factors);
        builder.build()
    }

    pub fn quotient_of(numerator: Function, denominator: Function) -> Function {
        let arg = shared_arg(&[&numerator, &denominator]);
        Function::from_kind(FunctionKind::Quotient(numerator, denominator), &arg)
    }

    /// polynomial node; `arg_name` is the variable fed by composition
    pub fn polynomial(polynomial: Polynomial, arg_name: &str) -> Function {
        Function::from_kind(FunctionKind::Polynomial(polynomial), arg_name)
    }

    pub fn leaf(function: Arc<dyn AnalyticFunction>, arg_name: &str) -> Function {
        Function::from_kind(FunctionKind::Leaf(function), arg_name)
    }

    /// c * f
    pub fn scale(&self, factor: impl Into<Value>) -> Function {
        let c = Function::constant_in(factor, self.arg_name());
        self.rebuild_aggregate(FunctionKind::Product(vec![c, self.clone()]))
    }

    fn rebuild_aggregate(&self, kind: FunctionKind) -> Function {
        Function::from_kind(kind, self.arg_name())
    }

    //___________________________________METADATA____________________________________

    /// Restricts argument `arg` to `range` (intersected with any earlier restriction).
    pub fn with_domain(&self, arg: &str, range: Interval) -> Function {
        let mut node = (*self.node).clone();
        let narrowed = match node.domain.get(arg) {
            Some(existing) => existing.intersect(&range),
            None => range,
        };
        node.domain.insert(arg.to_string(), narrowed);
        Function::from_node(node)
    }

    /// Declares the numeric kind this function produces.
    pub fn with_result_kind(&self, kind: NumericKind) -> Function {
        let mut node = (*self.node).clone();
        node.result_kind = kind;
        Function::from_node(node)
    }

    /// Declares the numeric kind this function accepts.
    pub fn with_arg_kind(&self, kind: NumericKind) -> Function {
        let mut node = (*self.node).clone();
        node.arg_kind = kind;
        Function::from_node(node)
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.node.kind
    }

    pub fn arg_name(&self) -> &str {
        &self.node.arg_name
    }

    pub fn arg_kind(&self) -> NumericKind {
        self.node.arg_kind
    }

    pub fn result_kind(&self) -> NumericKind {
        self.node.result_kind
    }

    pub fn declared_domain(&self) -> &BTreeMap<String, Interval> {
        &self.node.domain
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.node.kind, FunctionKind::Const(_)) && !self.is_composed()
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match &self.node.kind {
            FunctionKind::Const(v) if !self.is_composed() => Some(v),
            _ => None,
        }
    }

    /// Names the function depends on. A composed view depends on the inner function's variables
    /// plus whatever the outer function uses besides its own argument.
    pub fn free_variables(&self) -> BTreeSet<String> {
        if let (Some(outer), Some(inner)) = (self.original(), self.composed()) {
            let mut vars = outer.free_variables();
            vars.remove(outer.arg_name());
            vars.extend(inner.free_variables());
            return vars;
        }
        match &self.node.kind {
            FunctionKind::Const(_) => BTreeSet::new(),
            FunctionKind::Identity
            | FunctionKind::Leaf(_)
            | FunctionKind::Power { inner: None, .. }
            | FunctionKind::Negation { inner: None } => {
                BTreeSet::from([self.node.arg_name.clone()])
            }
            FunctionKind::Sum(terms) | FunctionKind::Product(terms) => terms
                .iter()
                .flat_map(|t| t.free_variables())
                .collect(),
            FunctionKind::Quotient(n, d) => {
                let mut vars = n.free_variables();
                vars.extend(d.free_variables());
                vars
            }
            FunctionKind::Power {
                inner: Some(inner), ..
            }
            | FunctionKind::Negation { inner: Some(inner) } => inner.free_variables(),
            FunctionKind::Polynomial(p) => p.variables(),
        }
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.free_variables().contains(name)
    }
}

/// Argument of an aggregate: the first operand that depends on its own argument, else the first.
fn shared_arg(operands: &[&Function]) -> String {
    operands
        .iter()
        .find(|f| f.contains_variable(f.arg_name()))
        .or_else(|| operands.first())
        .map(|f| f.arg_name().to_string())
        .unwrap_or_else(|| DEFAULT_ARGUMENT.to_string())
}

/// (argument kind, result kind) of a freshly built node
fn infer_kinds(kind: &FunctionKind) -> (NumericKind, NumericKind) {
    match kind {
        FunctionKind::Const(v) => (NumericKind::Complex, v.kind()),
        FunctionKind::Identity | FunctionKind::Negation { inner: None } => {
            (NumericKind::Real, NumericKind::Real)
        }
        FunctionKind::Sum(terms) | FunctionKind::Product(terms) => aggregate_kinds(terms.iter()),
        FunctionKind::Quotient(n, d) => {
            let (arg, res) = aggregate_kinds([n, d].into_iter());
            // exact integer division leaves the integers
            (arg, res.widest(NumericKind::Rational))
        }
        FunctionKind::Power { exponent, inner } => {
            let (arg, base) = match inner {
                Some(f) => (f.arg_kind(), f.result_kind()),
                None => (NumericKind::Real, NumericKind::Real),
            };
            let res = if exponent.is_integer() && !exponent.is_negative() {
                base
            } else if exponent.is_integer() {
                base.widest(NumericKind::Rational)
            } else {
                base.widest(NumericKind::Real)
            };
            (arg, res)
        }
        FunctionKind::Negation { inner: Some(f) } => (f.arg_kind(), f.result_kind()),
        FunctionKind::Polynomial(p) => (NumericKind::Real, p.result_kind()),
        FunctionKind::Leaf(l) => (l.arg_kind(), l.result_kind()),
    }
}

/// Narrowest accepted argument kind, widest produced result kind.
fn aggregate_kinds<'a>(terms: impl Iterator<Item = &'a Function>) -> (NumericKind, NumericKind) {
    terms.fold(
        (NumericKind::Complex, NumericKind::Integer),
        |(arg, res), t| (arg.min(t.arg_kind()), res.widest(t.result_kind())),
    )
}

//___________________________________BUILDER____________________________________

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Product,
}

/// Grows the operand list of a Sum or Product, then freezes it into an immutable node.
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    aggregate: Aggregate,
    operands: Vec<Function>,
}

impl AggregateBuilder {
    pub fn sum() -> AggregateBuilder {
        AggregateBuilder {
            aggregate: Aggregate::Sum,
            operands: Vec::new(),
        }
    }

    pub fn product() -> AggregateBuilder {
        AggregateBuilder {
            aggregate: Aggregate::Product,
            operands: Vec::new(),
        }
    }

    pub fn push(&mut self, operand: Function) -> &mut AggregateBuilder {
        self.operands.push(operand);
        self
    }

    pub fn extend(
        &mut self,
        operands: impl IntoIterator<Item = Function>,
    ) -> &mut AggregateBuilder {
        self.operands.extend(operands);
        self
    }

    pub fn len(&self) -> usize {
        self.operands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    /// An aggregate needs at least one operand.
    pub fn build(self) -> FunctionResult<Function> {
        let arg = match self.operands.first() {
            Some(_) => shared_arg(&self.operands.iter().collect::<Vec<_>>()),
            None => {
                return Err(FunctionError::Argument(format!(
                    "{:?} needs at least one operand",
                    self.aggregate
                )));
            }
        };
        let kind = match self.aggregate {
            Aggregate::Sum => FunctionKind::Sum(self.operands),
            Aggregate::Product => FunctionKind::Product(self.operands),
        };
        Ok(Function::from_kind(kind, &arg))
    }
}

//___________________________________OPERATORS____________________________________

impl std::ops::Add for Function {
    type Output = Function;

    fn add(self, rhs: Function) -> Function {
        let arg = shared_arg(&[&self, &rhs]);
        Function::from_kind(FunctionKind::Sum(vec![self, rhs]), &arg)
    }
}

impl std::ops::Sub for Function {
    type Output = Function;

    fn sub(self, rhs: Function) -> Function {
        self + rhs.negate()
    }
}

impl std::ops::Mul for Function {
    type Output = Function;

    fn mul(self, rhs: Function) -> Function {
        let arg = shared_arg(&[&self, &rhs]);
        Function::from_kind(FunctionKind::Product(vec![self, rhs]), &arg)
    }
}

impl std::ops::Div for Function {
    type Output = Function;

    fn div(self, rhs: Function) -> Function {
        Function::quotient_of(self, rhs)
    }
}

impl std::ops::Neg for Function {
    type Output = Function;

    fn neg(self) -> Function {
        self.negate()
    }
}

//___________________________________DISPLAY____________________________________

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let (Some(outer), Some(inner)) = (self.original(), self.composed()) {
            return write!(f, "({})∘({})", outer, inner);
        }
        let arg = &self.node.arg_name;
        match &self.node.kind {
            FunctionKind::Const(v) => write!(f, "{}", v),
            FunctionKind::Identity => write!(f, "{}", arg),
            FunctionKind::Sum(terms) => write!(f, "({})", terms.iter().join(" + ")),
            FunctionKind::Product(factors) => write!(f, "({})", factors.iter().join(" * ")),
            FunctionKind::Quotient(n, d) => write!(f, "({} / {})", n, d),
            FunctionKind::Power {
                exponent,
                inner: None,
            } => write!(f, "{}^{}", arg, exponent),
            FunctionKind::Power {
                exponent,
                inner: Some(inner),
            } => write!(f, "({})^{}", inner, exponent),
            FunctionKind::Negation { inner: None } => write!(f, "-{}", arg),
            FunctionKind::Negation { inner: Some(inner) } => write!(f, "-({})", inner),
            FunctionKind::Polynomial(p) => write!(f, "{}", p),
            FunctionKind::Leaf(l) => write!(f, "{}({})", l.name(), arg),
        }
    }
}
