//! Benchmarks for the frame ring hot path.
//!
//! Run with: cargo bench -p beam-ring
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p beam-ring -- --save-baseline main
//! 2. After changes: cargo bench -p beam-ring -- --baseline main

use beam_ring::FrameRing;
use beam_types::TrackedFrame;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn frame(id: i64) -> TrackedFrame {
    TrackedFrame {
        frame_id: id,
        t_vendor_ms: id as f64 * 8.0,
        ..TrackedFrame::default()
    }
}

fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_publish");
    group.throughput(Throughput::Elements(1));

    group.bench_function("publish_64", |b| {
        let (mut producer, _reader) = FrameRing::channel(64);
        let mut id = 0i64;
        b.iter(|| {
            id += 1;
            producer.publish(black_box(&frame(id)), id as f64 * 0.008)
        });
    });

    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_read");

    let (mut producer, reader) = FrameRing::channel(64);
    for id in 1..=64 {
        producer.publish(&frame(id), id as f64 * 0.008);
    }

    group.bench_function("latest", |b| {
        b.iter(|| black_box(reader.latest()));
    });

    group.bench_function("latest_interpolated", |b| {
        b.iter(|| black_box(reader.latest_interpolated()));
    });

    group.bench_function("frame_at_full_scan", |b| {
        b.iter(|| black_box(reader.frame_at(black_box(256.0), 8.0)));
    });

    group.finish();
}

criterion_group!(benches, bench_publish, bench_reads);
criterion_main!(benches);
