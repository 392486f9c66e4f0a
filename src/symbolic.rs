#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// error taxonomy of the function algebra
pub mod errors;
///____________________________________________________________________________________________________________________________
/// # Function nodes
/// a module
/// 1) builds functions from constants, named arguments, sums, products, quotients, powers, negation,
///    polynomials and leaf analytic functions
/// 2) evaluates them over exact or inexact numeric values with domain checking
/// 3) composes them (f∘g) and curries them (fixes some arguments)
///# Example#
/// ```
/// use RustedCalculus::numeric::{Exponent, Value};
/// use RustedCalculus::symbolic::function_node::Function;
/// use RustedCalculus::symbolic::leaf_functions::sin;
/// // f(x) = x^2 + 3x
/// let f = Function::power(Exponent::int(2), "x") + Function::constant(3) * Function::identity("x");
/// assert_eq!(f.apply(2).unwrap(), Value::integer(10));
/// // exact arithmetic: f(1/2) = 7/4
/// assert_eq!(f.apply(Value::rational(1, 2).unwrap()).unwrap(), Value::rational(7, 4).unwrap());
/// // g(x) = sin(x), (f∘g)(x) = sin(x)^2 + 3 sin(x)
/// let h = f.compose_with(&sin("x")).unwrap();
/// let y = h.apply(0.5).unwrap().to_f64().unwrap();
/// assert!((y - (0.5f64.sin().powi(2) + 3.0 * 0.5f64.sin())).abs() < 1e-12);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod composition;
pub mod function_eval;
pub mod function_node;
pub mod leaf_functions;
///________________________________________________________________________________________________________________________________________________
/// # Differentiation and simplification
/// Example#
/// ```
/// use RustedCalculus::numeric::{Exponent, Value};
/// use RustedCalculus::symbolic::function_derivatives::Differentiator;
/// use RustedCalculus::symbolic::function_node::Function;
/// use RustedCalculus::symbolic::function_simplify::Simplifier;
/// use RustedCalculus::symbolic::leaf_functions::exp;
/// let x = Function::identity("x");
/// // (x^3 * exp(x))' = 3x^2 exp(x) + x^3 exp(x)
/// let f = Function::power(Exponent::int(3), "x") * exp("x");
/// let df = f.differentiate().unwrap();
/// let expected = 3.0 * 1.0f64.exp() + 1.0f64.exp();
/// assert!((df.apply(1.0).unwrap().to_f64().unwrap() - expected).abs() < 1e-9);
/// // x + x + 0 simplifies to 2 * x
/// let s = Simplifier::new().simplify(&(x.clone() + x.clone() + Function::constant(0))).unwrap();
/// assert_eq!(s.apply(5).unwrap(), Value::integer(10));
/// // functions of several variables are curried before differentiation
/// let g = Function::identity("x") * Function::identity("y");
/// let dg = Differentiator::new().with_fixed("y", 4).differentiate(&g).unwrap();
/// assert_eq!(dg.apply(1).unwrap(), Value::integer(4));
/// ```
pub mod function_derivatives;
pub mod function_simplify;
///______________________________________________________________________________________________________________________________________________
/// # Polynomials and Taylor expansions
/// Example#
/// ```
/// use RustedCalculus::numeric::Value;
/// use RustedCalculus::symbolic::polynomial::PolynomialBuilder;
/// use RustedCalculus::symbolic::taylor::TaylorExpansion;
/// use RustedCalculus::symbolic::term::Term;
/// use RustedCalculus::symbolic::leaf_functions::exp;
/// // p(x) = 1 + 2x + x^2
/// let mut builder = PolynomialBuilder::integral();
/// builder.add(Term::constant(1)).unwrap();
/// builder.add(Term::monomial(2, "x", 1)).unwrap();
/// builder.add(Term::monomial(1, "x", 2)).unwrap();
/// let p = builder.build();
/// let dp = p.differentiate("x").unwrap();
/// assert_eq!(p.to_function("x").apply(3).unwrap(), Value::integer(16));
/// assert_eq!(dp.to_function("x").apply(3).unwrap(), Value::integer(8));
/// // exp(x) around 0 up to x^6
/// let taylor = TaylorExpansion::new(&exp("x"), 0).unwrap();
/// let t6 = taylor.get_for_n_terms(6).unwrap();
/// let approx = t6.evaluate(0.5).unwrap().to_f64().unwrap();
/// assert!((approx - 0.5f64.exp()).abs() < 1e-5);
/// ```
pub mod polynomial;
pub mod taylor;
pub mod term;
/// engine settings (finite difference step, simplification passes, parallel evaluation, logging)
pub mod engine_config;
mod derivatives_tests;
mod polynomial_tests;
mod taylor_tests;
