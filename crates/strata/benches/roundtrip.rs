// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode/decode throughput
//!
//! Measures codec execution on a warm registry (derivation excluded) for:
//! - a flat record on both bundled formats
//! - a nested record with collections and a map
//! - first-use derivation cost on a fresh registry

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;
use strata::{binary, json, Reflect, Registry};

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[strata(default)]
struct Sample {
    id: u64,
    temperature: f64,
    label: String,
    valid: bool,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[strata(default)]
struct Batch {
    source: String,
    samples: Vec<Sample>,
    tags: BTreeMap<String, i32>,
    checksum: Option<u32>,
}

fn batch(len: usize) -> Batch {
    Batch {
        source: "sensor-array".into(),
        samples: (0..len)
            .map(|i| Sample {
                id: i as u64,
                temperature: 20.0 + i as f64 / 10.0,
                label: format!("s{}", i),
                valid: i % 3 != 0,
            })
            .collect(),
        tags: [("site".to_string(), 4), ("rack".to_string(), 17)]
            .into_iter()
            .collect(),
        checksum: Some(0xdead_beef),
    }
}

fn bench_flat(c: &mut Criterion) {
    let registry = Registry::default();
    let sample = Sample {
        id: 42,
        temperature: 21.5,
        label: "inlet".into(),
        valid: true,
    };
    let text = json::to_string(&registry, &sample).expect("encode");
    let bytes = binary::to_vec(&registry, &sample).expect("encode");

    let mut group = c.benchmark_group("flat_record");
    group.bench_function("json_encode", |b| {
        b.iter(|| json::to_string(&registry, black_box(&sample)).expect("encode"));
    });
    group.bench_function("json_decode", |b| {
        b.iter(|| json::from_str::<Sample>(&registry, black_box(&text)).expect("decode"));
    });
    group.bench_function("binary_encode", |b| {
        b.iter(|| binary::to_vec(&registry, black_box(&sample)).expect("encode"));
    });
    group.bench_function("binary_decode", |b| {
        b.iter(|| binary::from_slice::<Sample>(&registry, black_box(&bytes)).expect("decode"));
    });
    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let registry = Registry::default();
    let mut group = c.benchmark_group("nested_batch");
    for len in [10usize, 100, 1000] {
        let value = batch(len);
        let bytes = binary::to_vec(&registry, &value).expect("encode");
        group.bench_with_input(BenchmarkId::new("binary_roundtrip", len), &value, |b, v| {
            b.iter(|| {
                let encoded = binary::to_vec(&registry, black_box(v)).expect("encode");
                binary::from_slice::<Batch>(&registry, &encoded).expect("decode")
            });
        });
        group.bench_with_input(BenchmarkId::new("binary_decode", len), &bytes, |b, bytes| {
            b.iter(|| binary::from_slice::<Batch>(&registry, black_box(bytes)).expect("decode"));
        });
    }
    group.finish();
}

fn bench_derivation(c: &mut Criterion) {
    c.bench_function("derive_batch_codec", |b| {
        b.iter(|| {
            let registry = Registry::default();
            registry.codec::<Batch>().expect("derive");
            black_box(registry.len())
        });
    });
}

criterion_group!(benches, bench_flat, bench_nested, bench_derivation);
criterion_main!(benches);
