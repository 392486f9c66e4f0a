//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::numeric::{Exponent, Value};
    use crate::symbolic::errors::FunctionError;
    use crate::symbolic::function_node::Function;
    use crate::symbolic::leaf_functions::{exp, ln, sin};
    use crate::symbolic::taylor::TaylorExpansion;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn real(v: Value) -> f64 {
        v.to_f64().unwrap()
    }

    fn cubic() -> Function {
        // x^3 + 2x
        Function::power(Exponent::int(3), "x") + Function::identity("x").scale(2)
    }

    #[test]
    fn test_exp_around_zero() {
        let taylor = TaylorExpansion::new(&exp("x"), 0.0).unwrap();
        assert_eq!(taylor.variable(), "x");
        let p = taylor.get_for_n_terms(6).unwrap();
        assert_eq!(p.order(), 6);
        let mut factorial = 1.0;
        for k in 0..=6 {
            if k > 0 {
                factorial *= k as f64;
            }
            assert_relative_eq!(real(p.coefficient(k)), 1.0 / factorial, epsilon = 1e-14);
        }
        assert!(p.coefficient(7).is_zero());
        assert_relative_eq!(real(p.evaluate(0.5).unwrap()), 0.5f64.exp(), epsilon = 1e-5);
    }

    #[test]
    fn test_sin_has_only_odd_terms() {
        let taylor = TaylorExpansion::new(&sin("x"), 0.0).unwrap();
        let p = taylor.get_for_n_terms(7).unwrap();
        // zero coefficients are not stored as terms
        assert_eq!(p.polynomial().len(), 4);
        assert!(p.coefficient(2).is_zero());
        assert_relative_eq!(real(p.coefficient(3)), -1.0 / 6.0, epsilon = 1e-14);
        assert_relative_eq!(real(p.evaluate(0.3).unwrap()), 0.3f64.sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_exact_coefficients_around_shifted_center() {
        // x^3 + 2x around 1: 3 + 5(x-1) + 3(x-1)^2 + (x-1)^3
        let taylor = TaylorExpansion::new(&cubic(), 1).unwrap();
        let p = taylor.get_for_n_terms(4).unwrap();
        assert_eq!(
            p.coefficients(),
            &[
                Value::integer(3),
                Value::integer(5),
                Value::integer(3),
                Value::integer(1),
                Value::integer(0)
            ]
        );
        // the expansion of a cubic is exact everywhere
        assert_eq!(p.evaluate(3).unwrap(), Value::integer(33));
        assert_eq!(
            p.evaluate(Value::rational(1, 2).unwrap()).unwrap(),
            Value::rational(9, 8).unwrap()
        );
        assert_eq!(p.center(), &Value::integer(1));
    }

    #[test]
    fn test_ln_around_one() {
        let taylor = TaylorExpansion::new(&ln("x"), 1).unwrap();
        let p = taylor.get_for_n_terms(8).unwrap();
        assert!(p.coefficient(0).is_zero());
        assert_eq!(p.coefficient(1), Value::integer(1));
        assert_eq!(p.coefficient(2), Value::rational(-1, 2).unwrap());
        assert_eq!(p.coefficient(3), Value::rational(1, 3).unwrap());
        assert_relative_eq!(real(p.evaluate(1.1).unwrap()), 1.1f64.ln(), epsilon = 1e-9);
    }

    #[test]
    fn test_extending_never_changes_built_terms() {
        let taylor = TaylorExpansion::new(&exp("x"), 0.0).unwrap();
        let p3 = taylor.get_for_n_terms(3).unwrap();
        assert_eq!(taylor.orders_built(), 4);
        let p6 = taylor.get_for_n_terms(6).unwrap();
        assert_eq!(taylor.orders_built(), 7);
        for k in 0..=3 {
            assert_eq!(p6.coefficient(k), p3.coefficient(k));
        }
        for term in p3.polynomial().terms() {
            assert!(p6.polynomial().terms().contains(term));
        }
        // asking for fewer terms again gives the same truncation
        assert_eq!(taylor.get_for_n_terms(3).unwrap(), p3);
        assert_eq!(taylor.orders_built(), 7);
    }

    #[test]
    fn test_derivatives_are_cached() {
        let f = cubic();
        let taylor = TaylorExpansion::new(&f, 0).unwrap();
        assert_eq!(taylor.derivative(0).unwrap(), f);
        let d2 = taylor.derivative(2).unwrap();
        assert_eq!(d2.apply(1).unwrap(), Value::integer(6));
        // the same node comes back from the cache
        let again = taylor.derivative(2).unwrap();
        assert!(Arc::ptr_eq(&d2.node, &again.node));
        assert_eq!(taylor.orders_built(), 0);
    }

    #[test]
    fn test_failed_extension_leaves_state_unchanged() {
        // sqrt(x) around 0: the first derivative is undefined at the center
        let root = Function::power(Exponent::ratio(1, 2).unwrap(), "x");
        let taylor = TaylorExpansion::new(&root, 0).unwrap();
        let err = taylor.get_for_n_terms(3).unwrap_err();
        assert!(matches!(err, FunctionError::Domain { .. }));
        assert_eq!(taylor.orders_built(), 0);
        let p = taylor.get_for_n_terms(0).unwrap();
        assert!(p.coefficient(0).is_zero());
        assert_eq!(taylor.orders_built(), 1);
    }

    #[test]
    fn test_constant_and_multivariate_functions() {
        let taylor = TaylorExpansion::new(&Function::constant(5), 2).unwrap();
        let p = taylor.get_for_n_terms(2).unwrap();
        assert_eq!(p.coefficients(), &[Value::integer(5), Value::zero(), Value::zero()]);
        assert_eq!(p.evaluate(10).unwrap(), Value::integer(5));
        let f = Function::identity("x") * Function::identity("y");
        assert!(matches!(
            TaylorExpansion::new(&f, 0),
            Err(FunctionError::Arity { .. })
        ));
    }

    #[test]
    fn test_shared_between_threads() {
        let taylor = Arc::new(TaylorExpansion::new(&exp("x"), 0.0).unwrap());
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let taylor = Arc::clone(&taylor);
                std::thread::spawn(move || taylor.get_for_n_terms(2 * n).unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(taylor.orders_built(), 9);
        for p in &results {
            for k in 0..=p.order() {
                assert_eq!(p.coefficient(k), results[3].coefficient(k));
            }
        }
    }

    #[test]
    fn test_display() {
        let taylor = TaylorExpansion::new(&cubic(), 1).unwrap();
        let p = taylor.get_for_n_terms(1).unwrap();
        let text = p.to_string();
        assert!(text.ends_with("with x -> x - 1"), "{}", text);
    }
}
