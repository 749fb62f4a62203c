//! Benchmarks for 2D bicubic spline evaluation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spline2d_simd::batch::{batches, evaluate_batch};
use spline2d_simd::harness::generate_points;
use spline2d_simd::{layout, Evaluation, GridSet, Variant};

const EVALUATIONS: usize = 4096;

fn benchmark_variants(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let points = generate_points(&mut rng, EVALUATIONS);
    let batched = batches(&points);

    let mut group = c.benchmark_group("spline2d_variants");
    group.throughput(Throughput::Elements(EVALUATIONS as u64));

    for size in [8, 32, 128, 256].iter() {
        let mut grids = GridSet::new(-1.0, 1.0, *size);
        grids.fill_random(&mut rng);

        for variant in Variant::ALL {
            group.bench_with_input(BenchmarkId::new(variant.name(), size), &size, |b, _| match variant
                .evaluation()
            {
                Evaluation::Single(f) => b.iter(|| {
                    for &p in &points {
                        black_box(f(&grids, black_box(p)));
                    }
                }),
                Evaluation::Batch(f) => b.iter(|| {
                    for batch in &batched {
                        black_box(f(&grids, black_box(batch)));
                    }
                }),
            });
        }
    }

    group.finish();
}

fn benchmark_portable_paths(c: &mut Criterion) {
    // Portable fallbacks of the dispatching variants, for comparison with
    // the intrinsic paths above
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let points = generate_points(&mut rng, EVALUATIONS);
    let batched = batches(&points);

    let mut group = c.benchmark_group("spline2d_portable");
    group.throughput(Throughput::Elements(EVALUATIONS as u64));

    for size in [32, 128].iter() {
        let mut grids = GridSet::new(-1.0, 1.0, *size);
        grids.fill_random(&mut rng);

        group.bench_with_input(BenchmarkId::new("rowwise", size), &size, |b, _| {
            b.iter(|| {
                for &p in &points {
                    black_box(layout::evaluate::<layout::Rowwise>(&grids.padded, black_box(p)));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("wide16", size), &size, |b, _| {
            b.iter(|| {
                for &p in &points {
                    black_box(layout::evaluate::<layout::Wide16>(&grids.padded, black_box(p)));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("batch_padded", size), &size, |b, _| {
            b.iter(|| {
                for batch in &batched {
                    black_box(evaluate_batch(&grids.padded, black_box(batch)));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("batch_planar", size), &size, |b, _| {
            b.iter(|| {
                for batch in &batched {
                    black_box(evaluate_batch(&grids.planar, black_box(batch)));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_variants, benchmark_portable_paths);
criterion_main!(benches);
