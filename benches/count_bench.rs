use criterion::{black_box, criterion_group, criterion_main, Criterion};
use primespan::{count_primes_segmented, trialdiv, SmallPrimes};

fn bench_count_dense_window(c: &mut Criterion) {
    c.bench_function("count_primes [0, 10_000_000)", |b| {
        b.iter(|| count_primes_segmented(black_box(0), black_box(10_000_000), 1 << 20, false));
    });
}

fn bench_count_high_window(c: &mut Criterion) {
    // A window near 2^40: the small-prime table dominates setup here
    c.bench_function("count_primes [2^40, 2^40 + 1_000_000)", |b| {
        b.iter(|| {
            count_primes_segmented(black_box(1_i64 << 40), black_box(1_000_000), 1 << 20, false)
        });
    });
}

fn bench_count_parallel(c: &mut Criterion) {
    c.bench_function("count_primes [0, 10_000_000) parallel", |b| {
        b.iter(|| count_primes_segmented(black_box(0), black_box(10_000_000), 1 << 20, true));
    });
}

fn bench_small_prime_table(c: &mut Criterion) {
    c.bench_function("SmallPrimes::covering(2^40)", |b| {
        b.iter(|| SmallPrimes::covering(black_box(1_i64 << 40)));
    });
}

fn bench_trialdiv_baseline(c: &mut Criterion) {
    c.bench_function("trialdiv [1_000_000, 1_010_000)", |b| {
        b.iter(|| trialdiv::count_primes_in_interval(black_box(1_000_000), black_box(10_000)));
    });
}

criterion_group!(
    benches,
    bench_count_dense_window,
    bench_count_high_window,
    bench_count_parallel,
    bench_small_prime_table,
    bench_trialdiv_baseline,
);
criterion_main!(benches);
