//! Microbenchmarks for the line factory path.
//!
//! Measures the cost of re-stamping a datum and serializing it.
//!
//! Run with: `cargo bench -p tsdatum -- serialize`

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tsdatum::Datum;

/// Creates a datum carrying `tag_count` tags.
fn setup_datum(tag_count: usize) -> Datum {
    let mut datum = Datum::new();
    datum.set_metric("cpu.utilization");
    for i in 0..tag_count {
        datum.set_tag(format!("tag_{i}"), format!("value_{i}"));
    }
    datum
}

fn bench_to_line(c: &mut Criterion) {
    let mut datum = setup_datum(2);
    let mut ts = 1_700_000_000_000u64;

    c.bench_function("serialize/to_line", |b| {
        b.iter(|| {
            ts += 1;
            datum
                .set_timestamp(black_box(ts))
                .and_then(|d| d.set_value(black_box(42.5)))
                .unwrap();
            black_box(datum.to_line().unwrap());
        });
    });
}

fn bench_write_line_reused_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize/write_line");

    for tag_count in [1, 4, 16] {
        let mut datum = setup_datum(tag_count);
        let mut buf = String::with_capacity(1024);
        let mut ts = 1_700_000_000_000u64;

        group.bench_with_input(BenchmarkId::from_parameter(tag_count), &tag_count, |b, _| {
            b.iter(|| {
                ts += 1;
                datum
                    .set_timestamp(ts)
                    .and_then(|d| d.set_value(black_box(0.42)))
                    .unwrap();
                buf.clear();
                datum.write_line(&mut buf).unwrap();
                black_box(&buf);
            });
        });
    }

    group.finish();
}

fn bench_set_timestamp_string(c: &mut Criterion) {
    let mut datum = setup_datum(1);

    c.bench_function("serialize/set_absolute_timestamp", |b| {
        b.iter(|| {
            datum
                .set_timestamp(black_box("2014/07/18 09:45:30"))
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_to_line,
    bench_write_line_reused_buffer,
    bench_set_timestamp_string
);
criterion_main!(benches);
