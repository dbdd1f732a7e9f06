//! Import pipeline throughput: rows mapped, deduplicated, reconciled and written per second.
//!
//! Run with: `cargo bench --bench import_pipeline`
//! The spreadsheet is decoded once up front; only the in-memory pipeline is measured.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use sat_catalogs::catalog::writer::write_records;
use sat_catalogs::catalog::{find_catalog, import_rows, CandidateRecord, Cell, RawRow};
use sat_catalogs::store::{CatalogStore, FieldValue, MemoryStore, RecordValues};

fn postal_code_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            vec![
                Cell::Float((10_000 + i) as f64),
                Cell::Text(format!("E{:02}", i % 32)),
                Cell::Text(format!("{:03}", i % 570)),
                Cell::Text(format!("{:02}", i % 7)),
            ]
        })
        .collect()
}

fn colonia_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            vec![
                Cell::Text(format!("{:04}", i % 9_000)),
                Cell::Float((10_000 + i / 4) as f64),
                Cell::Text(format!("Colonia {i}")),
            ]
        })
        .collect()
}

fn unit_records(count: usize) -> Vec<CandidateRecord> {
    (0..count)
        .map(|i| {
            let mut values = RecordValues::new();
            values.insert("code".to_string(), FieldValue::from(format!("U{i:05}")));
            values.insert("name".to_string(), FieldValue::from("unidad"));
            CandidateRecord { values }
        })
        .collect()
}

fn bench_import(c: &mut Criterion) {
    let uom = find_catalog("uom").expect("uom catalog registered");
    let zip = find_catalog("zip").expect("zip catalog registered");
    let colonia = find_catalog("colonia").expect("colonia catalog registered");

    let mut group = c.benchmark_group("import_pipeline");
    group.sample_size(20);

    for size in [1_000usize, 10_000] {
        let rows = postal_code_rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("fresh_zip", size), &rows, |b, rows| {
            b.iter_batched(
                MemoryStore::for_catalogs,
                |mut store| black_box(import_rows(&mut store, zip, rows, 2)),
                BatchSize::LargeInput,
            )
        });

        let mut seeded = MemoryStore::for_catalogs();
        let _ = import_rows(&mut seeded, zip, &rows, 2);
        group.bench_with_input(BenchmarkId::new("reimport_zip", size), &rows, |b, rows| {
            b.iter_batched(
                || seeded.clone(),
                |mut store| black_box(import_rows(&mut store, zip, rows, 2)),
                BatchSize::LargeInput,
            )
        });

        let rows = colonia_rows(size);
        group.bench_with_input(
            BenchmarkId::new("colonia_with_backfill", size),
            &rows,
            |b, rows| {
                b.iter_batched(
                    MemoryStore::for_catalogs,
                    |mut store| black_box(import_rows(&mut store, colonia, rows, 2)),
                    BatchSize::LargeInput,
                )
            },
        );

        // One pre-existing key per hundred forces the per-record retry.
        let records = unit_records(size);
        let mut seeded = MemoryStore::for_catalogs();
        for record in records.iter().step_by(100) {
            let _ = seeded.create(uom.storage_target, record.values.clone());
        }
        group.bench_with_input(
            BenchmarkId::new("write_fallback", size),
            &records,
            |b, records| {
                b.iter_batched(
                    || (seeded.clone(), records.clone()),
                    |(mut store, records)| black_box(write_records(&mut store, uom, records)),
                    BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_import);
criterion_main!(benches);
