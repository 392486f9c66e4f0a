use RustedCalculus::numeric::{Exponent, Value};
use RustedCalculus::symbolic::engine_config::EngineConfig;
use RustedCalculus::symbolic::function_node::Function;
use RustedCalculus::symbolic::function_simplify::Simplifier;
use RustedCalculus::symbolic::leaf_functions::{exp, sin};
use RustedCalculus::symbolic::taylor::TaylorExpansion;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::collections::HashMap;

fn nested() -> Function {
    // exp(sin(x^2)) * (x^3 + 2x)
    let inner = sin("x")
        .compose_with(&Function::power(Exponent::int(2), "x"))
        .unwrap();
    let outer = exp("x").compose_with(&inner).unwrap();
    outer * (Function::power(Exponent::int(3), "x") + Function::identity("x").scale(2))
}

fn bench_differentiate(c: &mut Criterion) {
    let f = nested();
    c.bench_function("differentiate nested", |b| {
        b.iter(|| black_box(&f).differentiate().unwrap())
    });
    c.bench_function("third derivative of nested", |b| {
        b.iter(|| black_box(&f).nth_derivative(3).unwrap())
    });
}

fn bench_simplify(c: &mut Criterion) {
    let x = || Function::identity("x");
    let f = (0..20).fold(Function::constant(0), |acc, k| {
        acc + x().scale(k) * Function::power(Exponent::int(k % 4), "x") - Function::constant(k)
    });
    let simplifier = Simplifier::new();
    c.bench_function("simplify sum of 20 products", |b| {
        b.iter(|| simplifier.simplify(black_box(&f)).unwrap())
    });
}

fn bench_taylor(c: &mut Criterion) {
    let f = nested();
    c.bench_function("taylor 8 terms of nested", |b| {
        b.iter(|| {
            let taylor = TaylorExpansion::new(black_box(&f), 0.5).unwrap();
            taylor.get_for_n_terms(8).unwrap()
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let terms: Vec<Function> = (1..=256)
        .map(|k| sin("x").compose_with(&Function::identity("x").scale(k)).unwrap())
        .collect();
    let f = Function::sum_of(terms).unwrap();
    let args = HashMap::from([("x".to_string(), Value::real(0.3))]);
    let parallel = EngineConfig::default().with_parallel_threshold(Some(64));
    c.bench_function("evaluate 256 terms", |b| {
        b.iter(|| black_box(&f).evaluate(&args).unwrap())
    });
    c.bench_function("evaluate 256 terms in parallel", |b| {
        b.iter(|| black_box(&f).evaluate_in_parallel(&args, &parallel).unwrap())
    });
}

criterion_group!(
    benches,
    bench_differentiate,
    bench_simplify,
    bench_taylor,
    bench_evaluate
);
criterion_main!(benches);
