// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Bench parameters
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting

//! Transfer throughput benchmarks
//!
//! Measures:
//! - Buffered writes of small records vs. unbuffered writes
//! - Buffered reads against a transport that under-reports `available`
//! - Framed and compressed flush cost

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xfer::{
    build, BufferedTransfer, MemoryTransport, RefillPolicy, Transfer, TransferConfig, TransferKind,
};

const RECORD: [u8; 24] = [0x5A; 24];
const RECORDS: usize = 4096;

fn bench_write_small_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_small_records");
    group.throughput(Throughput::Bytes((RECORD.len() * RECORDS) as u64));

    for kind in TransferKind::ALL {
        let config = TransferConfig::for_kind(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &config, |b, config| {
            b.iter(|| {
                let mut transport = MemoryTransport::new();
                let mut transfer = build(&mut transport, config).unwrap();
                for _ in 0..RECORDS {
                    transfer.write(black_box(&RECORD)).unwrap();
                }
                transfer.flush().unwrap();
                transfer.release();
                black_box(transport.len())
            })
        });
    }

    group.finish();
}

fn bench_read_refill_policy(c: &mut Criterion) {
    let data = vec![0xA5u8; 256 * 1024];
    let mut group = c.benchmark_group("read_refill_policy");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for policy in [RefillPolicy::Available, RefillPolicy::Demand] {
        let config = TransferConfig::default().with_refill_policy(policy);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", policy)),
            &config,
            |b, config| {
                let mut scratch = vec![0u8; config.scratch_capacity];
                let mut dst = vec![0u8; 16 * 1024];
                b.iter(|| {
                    let transport = MemoryTransport::from_bytes(data.clone()).with_max_available(256);
                    let mut transfer =
                        BufferedTransfer::with_config(transport, &mut scratch, config).unwrap();
                    for _ in 0..data.len() / dst.len() {
                        transfer.read(&mut dst).unwrap();
                    }
                    black_box(transfer.stats().refills)
                })
            },
        );
    }

    group.finish();
}

fn bench_flush_large_payload(c: &mut Criterion) {
    let payload: Vec<u8> = (0..64 * 1024u32).map(|i| (i % 64) as u8).collect();
    let mut group = c.benchmark_group("flush_64k");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for kind in [TransferKind::Framed, TransferKind::Compressed] {
        let config = TransferConfig::for_kind(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &config, |b, config| {
            b.iter(|| {
                let mut transport = MemoryTransport::new();
                let mut transfer = build(&mut transport, config).unwrap();
                transfer.write(black_box(&payload)).unwrap();
                transfer.flush().unwrap();
                transfer.release();
                black_box(transport.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_write_small_records,
    bench_read_refill_policy,
    bench_flush_large_payload
);
criterion_main!(benches);
