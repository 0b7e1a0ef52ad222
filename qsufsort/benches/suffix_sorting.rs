// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qsufsort::{NopProgress, SortOptions, SuffixArray};
use rand::{rngs::StdRng, RngCore, SeedableRng};

const CHUNK_SIZE: usize = 128 * 1024;
const CHUNKS: usize = 8;

fn construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct");

    let mut contents = vec![0; CHUNK_SIZE * CHUNKS];
    StdRng::seed_from_u64(0x5eed).fill_bytes(&mut contents);

    // Grow the input a chunk at a time to test multiple data sizes
    for chunks in 1..=CHUNKS {
        let data = &contents[..CHUNK_SIZE * chunks];

        group.throughput(Throughput::Bytes(data.len() as u64 + 1));
        group.bench_with_input(
            BenchmarkId::new("sequential", data.len()),
            &data,
            |b, data| {
                b.iter(|| SuffixArray::new(data));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", data.len()),
            &data,
            |b, data| {
                b.iter(|| SuffixArray::with_options(data, &SortOptions::auto(), &NopProgress));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, construct);
criterion_main!(benches);
