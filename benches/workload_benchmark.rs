//! Performance benchmarks for pcbench
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pcbench::core::{compute, WorkUnit, WorkerPool};
use tempfile::TempDir;

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");

    for n in [10_000u64, 1_000_000, 10_000_000].iter() {
        group.throughput(Throughput::Elements(*n));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter(|| black_box(compute(black_box(n))));
        });
    }

    group.finish();
}

fn bench_pool_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_submit");
    let pool = WorkerPool::new();

    for workers in [1usize, 4, num_cpus::get()].iter() {
        let units: Vec<WorkUnit> = (0..*workers).map(|slot| WorkUnit::new(slot, 1_000_000)).collect();

        group.bench_with_input(BenchmarkId::new("workers", workers), &units, |b, units| {
            b.iter(|| black_box(pool.submit(units, 1).unwrap()));
        });
    }

    group.finish();
}

fn bench_disk_speed_test(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let size = 8 * 1024 * 1024;

    let mut group = c.benchmark_group("disk_speed_test");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(size));
    group.bench_function(humansize::format_size(size, humansize::BINARY), |b| {
        b.iter(|| black_box(pcbench::system::DiskSpeedTest::new(size).run(dir.path()).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_compute, bench_pool_submit, bench_disk_speed_test);

criterion_main!(benches);
