//! Compression benchmarks for ppmx

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ppmx::{PpmCodec, PpmConfig};

fn generate_log_data(lines: usize) -> Vec<u8> {
    (0..lines)
        .map(|i| {
            format!(
                "2024-01-{:02} {:02}:{:02}:{:02} {} User {} logged in from 192.168.1.{}\n",
                (i % 28) + 1,
                i % 24,
                i % 60,
                i % 60,
                ["INFO", "WARN", "ERROR", "DEBUG"][i % 4],
                i % 1000,
                i % 256
            )
        })
        .collect::<String>()
        .into_bytes()
}

fn compress_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for (label, lines) in [("1kb", 15), ("10kb", 150), ("100kb", 1500)] {
        let data = generate_log_data(lines);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("{}_order3", label), |b| {
            b.iter(|| {
                let mut codec = PpmCodec::new(PpmConfig::new(3)).unwrap();
                codec.compress(black_box(&data)).unwrap()
            })
        });
    }

    // Order sweep on the medium input: how much the context tree costs
    let data = generate_log_data(150);
    for order in [-1, 0, 1, 3] {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("10kb_order{}", order), |b| {
            b.iter(|| {
                let mut codec = PpmCodec::new(PpmConfig::new(order)).unwrap();
                codec.compress(black_box(&data)).unwrap()
            })
        });
    }

    group.finish();
}

fn decompress_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");

    for (label, lines) in [("1kb", 15), ("10kb", 150), ("100kb", 1500)] {
        let data = generate_log_data(lines);
        let mut codec = PpmCodec::new(PpmConfig::new(3)).unwrap();
        let compressed = codec.compress(&data).unwrap();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("{}_order3", label), |b| {
            b.iter(|| {
                let codec = PpmCodec::new(PpmConfig::new(3)).unwrap();
                codec.decompress(black_box(&compressed)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, compress_benchmark, decompress_benchmark);
criterion_main!(benches);
