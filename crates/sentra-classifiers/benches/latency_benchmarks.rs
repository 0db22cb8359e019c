//! Latency benchmarks for single and batch inference
//!
//! Compares one batched call against the same texts scored one at a time;
//! the batched path should cost well under N single calls.
//!
//! Run with: cargo bench -p sentra-classifiers

use candle_core::Device;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

use sentra_classifiers::{
    infer_batch, infer_one, ClassifierConfig, LabelMap, ModelHandle, NormKind, PipelineArtifact,
    TextPipeline, VectorizerConfig,
};

const VOCAB_SIZE: usize = 5_000;

/// Synthetic fitted pipeline with a realistic vocabulary width
fn synthetic_model() -> ModelHandle {
    let vocabulary: HashMap<String, usize> =
        (0..VOCAB_SIZE).map(|i| (format!("w{}", i), i)).collect();
    let coef: Vec<f32> = (0..VOCAB_SIZE)
        .map(|i| ((i % 17) as f32 - 8.0) / 8.0)
        .collect();

    let artifact = PipelineArtifact {
        name: Some("bench".to_string()),
        classes: vec![0, 1],
        vectorizer: VectorizerConfig {
            vocabulary,
            idf: Some(vec![1.5; VOCAB_SIZE]),
            lowercase: true,
            token_pattern: r"\b\w\w+\b".to_string(),
            ngram_range: (1, 1),
            stop_words: Vec::new(),
            binary: false,
            sublinear_tf: true,
            norm: NormKind::L2,
        },
        classifier: ClassifierConfig::LogisticRegression {
            coef: vec![coef],
            intercept: vec![0.0],
        },
    };

    ModelHandle::new(
        TextPipeline::from_artifact(artifact, &Device::Cpu).expect("Failed to build bench model"),
    )
}

fn texts(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            (0..20)
                .map(|j| format!("w{}", (i * 31 + j * 7) % VOCAB_SIZE))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Single-text latency
fn benchmark_single(c: &mut Criterion) {
    let handle = synthetic_model();
    let labels = LabelMap::default();
    let text = texts(1).remove(0);

    let mut group = c.benchmark_group("Single_Inference");
    group.sample_size(100);
    group.bench_function("infer_one", |b| {
        b.iter(|| infer_one(&handle, &labels, black_box(&text)).unwrap())
    });
    group.finish();
}

/// Batched call versus a loop of single calls
fn benchmark_batch_vs_loop(c: &mut Criterion) {
    let handle = synthetic_model();
    let labels = LabelMap::default();

    let mut group = c.benchmark_group("Batch_Inference");
    group.sample_size(30);

    for size in [8usize, 32, 128] {
        let batch = texts(size);

        group.bench_with_input(BenchmarkId::new("infer_batch", size), &batch, |b, batch| {
            b.iter(|| infer_batch(&handle, &labels, black_box(batch)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("infer_one_loop", size), &batch, |b, batch| {
            b.iter(|| {
                batch
                    .iter()
                    .map(|t| infer_one(&handle, &labels, black_box(t)).unwrap())
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single, benchmark_batch_vs_loop);
criterion_main!(benches);
