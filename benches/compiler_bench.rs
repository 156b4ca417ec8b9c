use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use gmc::*;

// Benchmark scenarios: all templates are valid and chunk-directed.

const CHAIN_MODEL: &str = r#"
GRAPHICAL_MODEL chain
frame: 0 {
  variable: seg {
    type: discrete hidden cardinality 4;
    conditionalparents: nil using DenseCPT("start_seg");
  }
  variable: tn {
    type: continuous observed 0:0;
    conditionalparents: seg(0) using mixture collection("col_tn");
  }
}
frame: 1 {
  variable: seg {
    type: discrete hidden cardinality 4;
    conditionalparents: seg(-1) using DenseCPT("seg_seg");
  }
  variable: tn {
    type: continuous observed 0:0;
    conditionalparents: seg(-1) using mixture collection("col_tn");
  }
}
chunk 1:1
"#;

/// Widening generator: one hidden chain plus `n_obs` observation variables.
fn generate_wide_model(n_obs: usize) -> String {
    let mut src = String::from("GRAPHICAL_MODEL wide\n");
    for frame in 0..2u32 {
        src.push_str(&format!("frame: {} {{\n", frame));
        let (parents, table) = if frame == 0 {
            ("nil", "start_seg")
        } else {
            ("seg(-1)", "seg_seg")
        };
        src.push_str(&format!(
            "  variable: seg {{\n    type: discrete hidden cardinality 8;\n    conditionalparents: {} using DenseCPT(\"{}\");\n  }}\n",
            parents, table
        ));
        for i in 0..n_obs {
            src.push_str(&format!(
                "  variable: obs{i} {{\n    type: continuous observed {i}:{i};\n    conditionalparents: seg(0) using mixture collection(\"col_{i}\");\n  }}\n",
            ));
        }
        src.push_str("}\n");
    }
    src.push_str("chunk 1:1\n");
    src
}

// KPI: parser latency on the representative chain model.
fn bench_parse_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("kpi/parse_latency");

    group.bench_function("chain", |b| {
        b.iter(|| {
            let r = parser::parse(black_box(CHAIN_MODEL));
            black_box(&r.file);
        });
    });

    for n_obs in [1_usize, 4, 16, 64] {
        let source = generate_wide_model(n_obs);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}obs", n_obs)),
            &source,
            |b, source| {
                b.iter(|| {
                    let r = parser::parse(black_box(source.as_str()));
                    black_box(&r.file);
                });
            },
        );
    }

    group.finish();
}

// KPI: full compile latency (parse -> frames -> bind -> unroll -> validate).
fn bench_full_compile_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("kpi/full_compile_latency");

    for length in [10_u32, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("L{}", length)),
            &length,
            |b, &length| {
                b.iter(|| {
                    let graph =
                        pipeline::compile_source(black_box(CHAIN_MODEL), Some(length)).unwrap();
                    black_box(&graph);
                });
            },
        );
    }

    group.finish();
}

// KPI: unroll scaling with the front half amortized (one parse, many unrolls).
fn bench_unroll_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("kpi/unroll_scaling");
    let templates = pipeline::parse_templates(CHAIN_MODEL).unwrap();

    for length in [10_u32, 100, 1000, 10000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("L{}", length)),
            &length,
            |b, &length| {
                b.iter(|| {
                    let graph = pipeline::compile(black_box(&templates), length).unwrap();
                    black_box(&graph);
                });
            },
        );
    }

    group.finish();
}

// KPI: cache hit latency against a cold compile of the same key.
fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("kpi/cache");

    group.bench_function("cold", |b| {
        b.iter_batched(
            pipeline::GraphCache::new,
            |cache| {
                let g = cache
                    .get_or_compile(black_box(CHAIN_MODEL), Some(100))
                    .unwrap();
                black_box(&g);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("hit", |b| {
        let cache = pipeline::GraphCache::new();
        let _ = cache.get_or_compile(CHAIN_MODEL, Some(100)).unwrap();
        b.iter(|| {
            let g = cache
                .get_or_compile(black_box(CHAIN_MODEL), Some(100))
                .unwrap();
            black_box(&g);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_latency,
    bench_full_compile_latency,
    bench_unroll_scaling,
    bench_cache_hit,
);
criterion_main!(benches);
