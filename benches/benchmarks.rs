use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use tasbot::Arbitrary;
use tasbot::console::Memory;
use tasbot::objective::Objective;
use tasbot::objective::Objectives;

fn evaluate_benchmark(c: &mut Criterion) {
    let mut objectives = Objectives::default();
    for i in 0..100 {
        objectives.insert(Objective::new(vec![i, i + 256, i + 512]), 1.0);
    }
    let a = Memory::random();
    let b = Memory::random();
    c.bench_function("evaluate 100 objectives", |bench| {
        bench.iter(|| objectives.evaluate(black_box(&a), black_box(&b)))
    });
    c.bench_function("weighted_less 100 objectives", |bench| {
        bench.iter(|| objectives.weighted_less(black_box(&a), black_box(&b)))
    });
}

criterion_group!(benches, evaluate_benchmark);
criterion_main!(benches);
