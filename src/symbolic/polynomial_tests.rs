//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::numeric::{Exponent, Interval, NumericKind, Value};
    use crate::symbolic::errors::FunctionError;
    use crate::symbolic::function_node::FunctionKind;
    use crate::symbolic::polynomial::{Polynomial, PolynomialBuilder};
    use crate::symbolic::term::{Term, TermKind, TermOps};
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use strum::IntoEnumIterator;

    fn half() -> Exponent {
        Exponent::ratio(1, 2).unwrap()
    }

    fn poly(terms: Vec<Term>) -> Polynomial {
        Polynomial::from_terms(terms).unwrap()
    }

    #[test]
    fn test_term_kinds() {
        assert_eq!(
            TermKind::iter().collect::<Vec<_>>(),
            vec![TermKind::Constant, TermKind::Integral, TermKind::Fractional]
        );
        assert_eq!(Term::constant(5).term_kind(), TermKind::Constant);
        assert_eq!(Term::monomial(2, "x", 3).term_kind(), TermKind::Integral);
        assert_eq!(Term::monomial(2, "x", half()).term_kind(), TermKind::Fractional);
        // zero exponents are dropped
        assert_eq!(Term::monomial(2, "x", 0), Term::constant(2));
        let mixed = Term::new(
            Value::integer(1),
            BTreeMap::from([("x".to_string(), Exponent::int(2)), ("y".to_string(), half())]),
        );
        assert_eq!(mixed.term_kind(), TermKind::Fractional);
    }

    #[test]
    fn test_term_order_and_signature() {
        let t = Term::monomial(4, "x", Exponent::ratio(3, 2).unwrap());
        assert_eq!(t.order("x"), 1);
        assert_eq!(t.order("y"), 0);
        assert_eq!(Term::monomial(1, "x", Exponent::ratio(-1, 2).unwrap()).order("x"), -1);
        assert_eq!(Term::monomial(1, "x", -2).order("x"), -2);
        assert!(Term::monomial(3, "x", 2).has_matching_signature(&Term::monomial(-7, "x", 2)));
        assert!(!Term::monomial(3, "x", 2).has_matching_signature(&Term::monomial(3, "y", 2)));
        assert_eq!(Term::monomial(3, "x", 2).to_string(), "3*x^2");
        assert_eq!(Term::monomial(1, "x", 1).to_string(), "x");
    }

    #[test]
    fn test_term_arithmetic() {
        let a = Term::monomial(3, "x", 2);
        let b = Term::monomial(Value::rational(1, 2).unwrap(), "y", 1);
        let ab = a.multiply(&b).unwrap();
        assert_eq!(ab.coefficient(), &Value::rational(3, 2).unwrap());
        assert_eq!(ab.exponent_of("x"), Exponent::int(2));
        assert_eq!(ab.exponent_of("y"), Exponent::int(1));
        // x^2 * x^-2 is a constant
        let c = a.multiply(&Term::monomial(1, "x", -2)).unwrap();
        assert_eq!(c.term_kind(), TermKind::Constant);
        let d = a.differentiate("x").unwrap().unwrap();
        assert_eq!(d, Term::monomial(6, "x", 1));
        assert_eq!(a.differentiate("y").unwrap(), None);
        let args = HashMap::from([("x".to_string(), Value::integer(2))]);
        assert_eq!(a.evaluate(&args).unwrap(), Value::integer(12));
        let e = Term::monomial(1, "y", 1).evaluate(&args).unwrap_err();
        assert!(matches!(e, FunctionError::Argument(_)));
    }

    #[test]
    fn test_builder_merges_and_cancels() {
        let mut builder = PolynomialBuilder::new();
        builder.add(Term::monomial(3, "x", 2)).unwrap();
        builder.add(Term::monomial(1, "x", 1)).unwrap();
        assert_eq!(builder.len(), 2);
        // 3x^2 + (-3x^2) removes the term
        builder.add(Term::monomial(-3, "x", 2)).unwrap();
        assert_eq!(builder.len(), 1);
        // zero terms are ignored
        builder.add(Term::monomial(0, "x", 5)).unwrap();
        assert_eq!(builder.len(), 1);
        builder.add(Term::monomial(4, "x", 1)).unwrap();
        let p = builder.build();
        assert_eq!(p, poly(vec![Term::monomial(5, "x", 1)]));
    }

    #[test]
    fn test_integral_builder_rejects_rational_exponents() {
        let mut builder = PolynomialBuilder::integral();
        assert_eq!(builder.ceiling(), TermKind::Integral);
        builder
            .add_all(vec![Term::constant(1), Term::monomial(2, "x", -1)])
            .unwrap();
        let err = builder.add(Term::monomial(1, "x", half())).unwrap_err();
        assert!(matches!(err, FunctionError::Argument(_)));
        assert_eq!(builder.len(), 2);
        // operations on an integral polynomial keep the restriction
        let p = builder.build();
        assert!(p.absorb_power("x", half()).is_err());
        assert!(p.add_term(Term::monomial(1, "y", half())).is_err());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = poly(vec![Term::monomial(1, "x", 2), Term::constant(1)]);
        let b = poly(vec![Term::constant(1), Term::monomial(1, "x", 2)]);
        assert_eq!(a, b);
        assert_ne!(a, poly(vec![Term::monomial(1, "x", 2)]));
    }

    #[test]
    fn test_queries() {
        // x^2 y + 3 x^(1/2) - 4
        let p = poly(vec![
            Term::new(
                Value::one(),
                BTreeMap::from([
                    ("x".to_string(), Exponent::int(2)),
                    ("y".to_string(), Exponent::int(1)),
                ]),
            ),
            Term::monomial(3, "x", half()),
            Term::constant(-4),
        ]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.variables(), BTreeSet::from(["x".to_string(), "y".to_string()]));
        assert_eq!(p.degree("x"), Some(2));
        assert_eq!(p.degree("y"), Some(1));
        assert_eq!(p.term_of_order("x", 2), p.term_of_order("y", 1));
        assert!(p.term_of_order("x", 2).is_some());
        // x^(1/2) has order 0 in x, like the constant
        assert_eq!(p.term_of_order("x", 0), None);
        assert_eq!(p.term_of_order("x", 5), None);
        assert!(p.requires_nonnegative("x"));
        assert!(!p.requires_nonnegative("y"));
        assert_eq!(p.result_kind(), NumericKind::Real);
        assert!(!p.is_constant());
        assert_eq!(p.constant_value(), None);
        let empty = poly(vec![]);
        assert!(empty.is_zero());
        assert_eq!(empty.degree("x"), None);
        assert_eq!(empty.constant_value(), Some(Value::zero()));
        assert_eq!(empty.to_string(), "0");
    }

    #[test]
    fn test_differentiate() {
        // (3x^2 + 2x + 5)' = 6x + 2
        let p = poly(vec![
            Term::monomial(3, "x", 2),
            Term::monomial(2, "x", 1),
            Term::constant(5),
        ]);
        let d = p.differentiate("x").unwrap();
        assert_eq!(d, poly(vec![Term::monomial(6, "x", 1), Term::constant(2)]));
        assert!(p.differentiate("y").unwrap().is_zero());
        // (x^(1/2))' = 1/2 x^(-1/2)
        let r = poly(vec![Term::monomial(1, "x", half())]).differentiate("x").unwrap();
        assert_eq!(
            r,
            poly(vec![Term::monomial(
                Value::rational(1, 2).unwrap(),
                "x",
                Exponent::ratio(-1, 2).unwrap()
            )])
        );
    }

    #[test]
    fn test_multiply_and_plus() {
        // (x + 1)(x - 1) = x^2 - 1
        let a = poly(vec![Term::monomial(1, "x", 1), Term::constant(1)]);
        let b = poly(vec![Term::monomial(1, "x", 1), Term::constant(-1)]);
        let ab = a.multiply(&b).unwrap();
        assert_eq!(ab, poly(vec![Term::monomial(1, "x", 2), Term::constant(-1)]));
        let sum = a.plus(&b).unwrap();
        assert_eq!(sum, poly(vec![Term::monomial(2, "x", 1)]));
        let scaled = a.scale(&Value::integer(3)).unwrap();
        assert_eq!(scaled, poly(vec![Term::monomial(3, "x", 1), Term::constant(3)]));
        let shifted = a.multiply_term(&Term::monomial(2, "y", 1)).unwrap();
        assert_eq!(shifted.variables().len(), 2);
        // (x + 1) x^-1 = 1 + x^-1
        let absorbed = a.absorb_power("x", Exponent::int(-1)).unwrap();
        assert_eq!(absorbed, poly(vec![Term::constant(1), Term::monomial(1, "x", -1)]));
    }

    #[test]
    fn test_substitute() {
        // x^2 y + y with y = 2 is 2x^2 + 2
        let p = poly(vec![
            Term::new(
                Value::one(),
                BTreeMap::from([
                    ("x".to_string(), Exponent::int(2)),
                    ("y".to_string(), Exponent::int(1)),
                ]),
            ),
            Term::monomial(1, "y", 1),
        ]);
        let fixed = HashMap::from([("y".to_string(), Value::integer(2))]);
        let q = p.substitute(&fixed).unwrap();
        assert_eq!(q, poly(vec![Term::monomial(2, "x", 2), Term::constant(2)]));
    }

    #[test]
    fn test_polynomial_function() {
        let p = poly(vec![
            Term::monomial(1, "x", 2),
            Term::monomial(-2, "x", 1),
            Term::constant(1),
        ]);
        let f = p.to_function("x");
        assert_eq!(f.result_kind(), NumericKind::Integer);
        assert_eq!(f.apply(3).unwrap(), Value::integer(4));
        assert_eq!(
            f.apply(Value::rational(1, 2).unwrap()).unwrap(),
            Value::rational(1, 4).unwrap()
        );
        let d = f.differentiate().unwrap();
        assert!(matches!(d.kind(), FunctionKind::Polynomial(_)));
        assert_eq!(d.apply(3).unwrap(), Value::integer(4));
    }

    #[test]
    fn test_polynomial_function_domain() {
        let f = poly(vec![Term::monomial(1, "x", half())]).to_function("x");
        assert_eq!(f.input_range("x"), Interval::at_least(0));
        assert_eq!(f.apply(9).unwrap(), Value::integer(3));
        assert!(matches!(f.apply(-1), Err(FunctionError::Domain { .. })));
    }

    #[test]
    fn test_curried_polynomial_folds_to_constant() {
        let p = poly(vec![Term::new(
            Value::integer(1),
            BTreeMap::from([
                ("x".to_string(), Exponent::int(1)),
                ("y".to_string(), Exponent::int(1)),
            ]),
        )]);
        let f = p.to_function("x");
        let fixed = HashMap::from([
            ("x".to_string(), Value::integer(2)),
            ("y".to_string(), Value::integer(3)),
        ]);
        let c = f.curry(&fixed).unwrap();
        assert!(c.is_constant_equivalent());
        assert_eq!(c.evaluate_constant().unwrap(), Value::integer(6));
    }
}
