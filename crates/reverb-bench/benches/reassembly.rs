//! Reassembly benchmarks.
//!
//! These measure the cost of rebuilding one message from fragmented
//! stream reads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mozue_reverb_bench::{chunked, media_frame};
use mozue_reverb_core::{Reassembler, StreamId};

/// Benchmark append/finish over one stream at increasing payload sizes.
fn bench_reassemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassemble");

    for size in [64usize, 1024, 65536].iter() {
        let frame = media_frame(*size);
        let chunks = chunked(&frame, 8);
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &chunks, |b, chunks| {
            let mut reassembler = Reassembler::new();
            let stream = StreamId::from(7);
            b.iter(|| {
                for chunk in chunks {
                    reassembler.append(stream, black_box(chunk));
                }
                black_box(reassembler.finish(stream))
            });
        });
    }

    group.finish();
}

/// Benchmark one 64 KiB message split into more and more fragments.
fn bench_fragmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragmentation");

    let frame = media_frame(65536);
    for pieces in [1usize, 4, 16, 64].iter() {
        let chunks = chunked(&frame, *pieces);
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pieces), &chunks, |b, chunks| {
            let mut reassembler = Reassembler::new();
            let stream = StreamId::from(7);
            b.iter(|| {
                for chunk in chunks {
                    reassembler.append(stream, black_box(chunk));
                }
                black_box(reassembler.finish(stream))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reassemble, bench_fragmentation);
criterion_main!(benches);
