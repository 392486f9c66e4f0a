//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::numeric::{Exponent, Interval, NumericKind, Value};
    use crate::symbolic::engine_config::EngineConfig;
    use crate::symbolic::errors::FunctionError;
    use crate::symbolic::function_derivatives::Differentiator;
    use crate::symbolic::function_node::{Function, FunctionKind};
    use crate::symbolic::function_simplify::Simplifier;
    use crate::symbolic::leaf_functions::{
        CentralDifference, ClosureFunction, ClosureWithDerivative, cos, exp, ln, sin,
    };
    use approx::assert_relative_eq;
    use rand::Rng;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn x() -> Function {
        Function::identity("x")
    }

    fn pow(n: i64) -> Function {
        Function::power(Exponent::int(n), "x")
    }

    fn at(f: &Function, x: f64) -> f64 {
        f.apply(x).unwrap().to_f64().unwrap()
    }

    #[test]
    fn test_constant_and_identity() {
        let d = Function::constant(42).differentiate().unwrap();
        assert!(d.as_constant().is_some_and(Value::is_zero));
        let d = x().differentiate().unwrap();
        assert!(d.as_constant().is_some_and(Value::is_one));
        let d = Function::negation("x").differentiate().unwrap();
        assert!(d.as_constant().is_some_and(Value::is_minus_one));
    }

    #[test]
    fn test_power_rule_is_exact() {
        // (x^5)' = 5x^4
        let d = pow(5).differentiate().unwrap();
        assert_eq!(d.apply(2).unwrap(), Value::integer(80));
        // (x^(1/2))' = 1/2 x^(-1/2)
        let root = Function::power(Exponent::ratio(1, 2).unwrap(), "x");
        let d = root.differentiate().unwrap();
        assert_eq!(d.apply(4).unwrap(), Value::rational(1, 4).unwrap());
        // x^0 is a constant
        let d = pow(0).differentiate().unwrap();
        assert!(d.as_constant().is_some_and(Value::is_zero));
    }

    #[test]
    fn test_linearity() {
        let mut rng = rand::rng();
        for _ in 0..10 {
            let a: f64 = rng.random_range(-3.0..3.0);
            let b: f64 = rng.random_range(-3.0..3.0);
            let t: f64 = rng.random_range(-2.0..2.0);
            let f = pow(3).scale(a) + sin("x").scale(b);
            let d = f.differentiate().unwrap();
            assert_relative_eq!(at(&d, t), 3.0 * a * t * t + b * t.cos(), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_product_rule() {
        // (x^2 (3x + 1))' = 2x(3x + 1) + 3x^2 = 40 at x = 2
        let f = pow(2) * (x().scale(3) + Function::constant(1));
        let d = f.differentiate().unwrap();
        assert_eq!(d.apply(2).unwrap(), Value::integer(40));
    }

    #[test]
    fn test_product_of_two_powers() {
        // (x^2 * x^3)' = 5x^4 = 80 at x = 2
        let f = Function::product_of(vec![pow(2), pow(3)]).unwrap();
        let d = f.differentiate().unwrap();
        assert_eq!(d.apply(2).unwrap(), Value::integer(80));
    }

    #[test]
    fn test_product_rule_many_factors() {
        // (x sin(x) exp(x))' = sin exp + x cos exp + x sin exp
        let f = Function::product_of(vec![x(), sin("x"), exp("x")]).unwrap();
        let d = f.differentiate().unwrap();
        let t: f64 = 0.5;
        let expected = t.sin() * t.exp() + t * t.cos() * t.exp() + t * t.sin() * t.exp();
        assert_relative_eq!(at(&d, t), expected, epsilon = 1e-12);
        // a factor with zero derivative is skipped
        let g = Function::product_of(vec![Function::constant(2), x(), x()]).unwrap();
        let dg = g.differentiate().unwrap();
        assert_eq!(dg.apply(3).unwrap(), Value::integer(12));
    }

    #[test]
    fn test_quotient_rule() {
        // (x / (x + 1))' = 1 / (x + 1)^2
        let f = x() / (x() + Function::constant(1));
        let d = f.differentiate().unwrap();
        assert_eq!(d.apply(1).unwrap(), Value::rational(1, 4).unwrap());
        // (sin / x)' = (x cos - sin) / x^2
        let g = sin("x") / x();
        let dg = g.differentiate().unwrap();
        let t: f64 = 1.3;
        assert_relative_eq!(at(&dg, t), (t * t.cos() - t.sin()) / (t * t), epsilon = 1e-12);
    }

    #[test]
    fn test_quotient_of_powers_simplifies() {
        // (x^3 / x)' = 2x = 4 at x = 2
        let f = Function::quotient_of(pow(3), x());
        let d = Simplifier::new().simplify(&f.differentiate().unwrap()).unwrap();
        assert_eq!(d.to_string(), "(2 * x)");
        assert_eq!(d.apply(2).unwrap(), Value::integer(4));
    }

    #[test]
    fn test_chain_rule() {
        // ((x^2 + 1)^3)' = 3 (x^2 + 1)^2 * 2x = 24 at x = 1
        let inner = pow(2) + Function::constant(1);
        let f = pow(3).compose_with(&inner).unwrap();
        assert!(f.is_composed());
        let d = f.differentiate().unwrap();
        assert_eq!(d.apply(1).unwrap(), Value::integer(24));
        // sin(x^2)' = 2x cos(x^2)
        let g = sin("x").compose_with(&pow(2)).unwrap();
        let dg = g.differentiate().unwrap();
        let t: f64 = 0.7;
        assert_relative_eq!(at(&dg, t), 2.0 * t * (t * t).cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_chain_rule_of_powers() {
        // ((x^3)^2)' = 6x^5 = 192 at x = 2
        let f = pow(2).compose_with(&pow(3)).unwrap();
        let d = f.differentiate().unwrap();
        assert_eq!(d.apply(2).unwrap(), Value::integer(192));
        // the same through a power of an inner function
        let g = Function::power_of(Exponent::int(2), pow(3));
        let dg = g.differentiate().unwrap();
        assert_eq!(dg.apply(2).unwrap(), Value::integer(192));
    }

    #[test]
    fn test_chain_rule_with_direct_dependence() {
        // outer(u) = u * x fed with u = sin(x): (x sin(x))' = x cos(x) + sin(x)
        let outer = Function::identity("u") * x();
        let f = outer.compose_with(&sin("x")).unwrap();
        let d = f.differentiate().unwrap();
        let t: f64 = 0.5;
        assert_relative_eq!(at(&d, t), t * t.cos() + t.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_nested_composition() {
        // exp(sin(x^2))' = exp(sin(x^2)) cos(x^2) 2x
        let f = exp("x")
            .compose_with(&sin("x").compose_with(&pow(2)).unwrap())
            .unwrap();
        let d = f.differentiate().unwrap();
        let t: f64 = 0.9;
        let expected = (t * t).sin().exp() * (t * t).cos() * 2.0 * t;
        assert_relative_eq!(at(&d, t), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_self_derivatives() {
        assert_eq!(sin("x").differentiate().unwrap(), cos("x"));
        assert_eq!(exp("x").differentiate().unwrap(), exp("x"));
        let dcos = cos("x").differentiate().unwrap();
        assert_relative_eq!(at(&dcos, 0.4), -(0.4f64).sin(), epsilon = 1e-14);
        let dln = ln("x").differentiate().unwrap();
        assert_eq!(dln.apply(2).unwrap(), Value::rational(1, 2).unwrap());
        assert!(matches!(dln.apply(-1), Err(FunctionError::Domain { .. })));
    }

    #[test]
    fn test_closure_with_derivative() {
        let f = ClosureWithDerivative::new(
            |t: f64| t * t * t,
            |t: f64| 3.0 * t * t,
            "cube".to_string(),
        );
        let d = Function::leaf(Arc::new(f), "x").differentiate().unwrap();
        assert_eq!(d.to_string(), "cube'(x)");
        assert_relative_eq!(at(&d, 2.0), 12.0);
    }

    #[test]
    fn test_central_difference_fallback() {
        let cube = ClosureFunction::new(|t: f64| t * t * t, "cube".to_string());
        let f = Function::leaf(Arc::new(cube), "x");
        let d = f.differentiate().unwrap();
        assert!(matches!(d.kind(), FunctionKind::Leaf(_)));
        assert!(d.to_string().starts_with("d/dx[cube(x)]"));
        assert_relative_eq!(at(&d, 2.0), 12.0, epsilon = 1e-6);
        // the fallback keeps working through the chain rule
        let g = f.compose_with(&sin("x")).unwrap();
        let dg = g.differentiate().unwrap();
        let t: f64 = 0.3;
        assert_relative_eq!(at(&dg, t), 3.0 * t.sin().powi(2) * t.cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_central_difference_step() {
        let cube = ClosureFunction::new(|t: f64| t * t * t, "cube".to_string());
        let f = Function::leaf(Arc::new(cube), "x");
        let coarse = CentralDifference::new(f.clone(), "x", 0.1);
        assert_relative_eq!(coarse.epsilon(), 0.1);
        // (f(x+h) - f(x-h)) / 2h = 3x^2 + h^2 for a cube
        let df = Function::leaf(Arc::new(coarse), "x");
        assert_relative_eq!(at(&df, 1.0), 3.01, epsilon = 1e-12);
        let d = Differentiator::new().with_epsilon(1e-3).differentiate(&f).unwrap();
        assert_relative_eq!(at(&d, 1.0), 3.0 + 1e-6, epsilon = 1e-9);
    }

    #[test]
    fn test_central_difference_probes_stay_in_domain() {
        let root =
            ClosureFunction::new(f64::sqrt, "root".to_string()).with_range(Interval::at_least(0));
        let f = Function::leaf(Arc::new(root), "x");
        let d = f.differentiate().unwrap();
        assert_relative_eq!(at(&d, 4.0), 0.25, epsilon = 1e-6);
        assert!(matches!(d.apply(0.0), Err(FunctionError::Domain { .. })));
    }

    #[test]
    fn test_complex_leaf_has_no_fallback() {
        let f = Function::leaf(
            Arc::new(ClosureFunction::new(|t: f64| t, "id".to_string())),
            "z",
        )
        .with_arg_kind(NumericKind::Complex);
        assert!(matches!(
            f.differentiate(),
            Err(FunctionError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_currying_before_differentiation() {
        // d/dx (x^2 y) with y = 4 is 8x
        let f = pow(2) * Function::identity("y");
        let d = Differentiator::new().with_fixed("y", 4).differentiate(&f).unwrap();
        assert_eq!(d.apply(3).unwrap(), Value::integer(24));
        // d/dy (x y) with x = 2 is 2
        let g = x() * Function::identity("y");
        let dg = Differentiator::new()
            .with_fixed_values(HashMap::from([
                ("x".to_string(), Value::integer(2)),
                ("y".to_string(), Value::integer(5)),
            ]))
            .with_variable("y")
            .differentiate(&g)
            .unwrap();
        assert_eq!(dg.as_constant(), Some(&Value::integer(2)));
    }

    #[test]
    fn test_arity_error() {
        let f = Function::product_of(vec![x(), Function::identity("y"), Function::identity("z")])
            .unwrap();
        let err = Differentiator::new().with_fixed("y", 1).differentiate(&f).unwrap_err();
        assert_eq!(
            err,
            FunctionError::Arity {
                free_variables: vec!["x".to_string(), "z".to_string()]
            }
        );
        assert!(matches!(f.differentiate(), Err(FunctionError::Arity { .. })));
    }

    #[test]
    fn test_partial_derivative() {
        let f = pow(2) * Function::identity("y");
        let dy = f.diff("y").unwrap();
        assert_eq!(dy.apply(3).unwrap(), Value::integer(9));
        let dx = f.diff("x").unwrap();
        let args = HashMap::from([
            ("x".to_string(), Value::integer(3)),
            ("y".to_string(), Value::integer(5)),
        ]);
        assert_eq!(dx.evaluate(&args).unwrap(), Value::integer(30));
    }

    #[test]
    fn test_nth_derivative() {
        let f = pow(4);
        assert_eq!(f.nth_derivative(0).unwrap(), f);
        let d3 = f.nth_derivative(3).unwrap();
        assert_eq!(d3.apply(2).unwrap(), Value::integer(48));
        let d5 = f.nth_derivative(5).unwrap();
        assert!(d5.as_constant().is_some_and(Value::is_zero));
        // sin'''' = sin
        assert_eq!(sin("x").nth_derivative(4).unwrap(), sin("x"));
    }

    #[test]
    fn test_derivative_keeps_declared_domain() {
        let f = pow(3).with_domain("x", Interval::closed(0, 1));
        let d = f.differentiate().unwrap();
        assert_eq!(d.declared_domain().get("x"), Some(&Interval::closed(0, 1)));
        assert!(matches!(d.apply(2), Err(FunctionError::Domain { .. })));
    }

    #[test]
    fn test_unsimplified_derivatives() {
        let config = EngineConfig::default().with_simplify_derivatives(false);
        let f = pow(2) + x();
        let d = Differentiator::with_config(config).differentiate(&f).unwrap();
        assert!(matches!(d.kind(), FunctionKind::Sum(_)));
        assert_eq!(d.apply(3).unwrap(), Value::integer(7));
    }

    #[test]
    fn test_compare_with_numerical() {
        let f = pow(3) + sin("x") * exp("x");
        let (norm, ok) = f.compare_with_numerical(0.5, 2.0, 20, 1e-4).unwrap();
        assert!(ok, "norm = {}", norm);
        let g = ln("x").compose_with(&(pow(2) + Function::constant(1))).unwrap();
        let (norm, ok) = g.compare_with_numerical(-1.0, 1.0, 11, 1e-4).unwrap();
        assert!(ok, "norm = {}", norm);
    }
}
