// In: benches/hash_bucket_bench.rs

use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use delta_bucket::hash_bucket::group_by_pk_hash_bucket;
use delta_bucket::primary_key::{pk_digests, DigestModuloAssigner};

/// A delta table with a composite (string, int) primary key and a sort column.
fn generate_delta_table(num_rows: usize) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("tenant", DataType::Utf8, false),
        Field::new("id", DataType::Int64, false),
        Field::new("ts", DataType::Int64, false),
    ]);
    let tenants: Vec<String> = (0..num_rows).map(|i| format!("tenant-{}", i % 97)).collect();
    let ids: Vec<i64> = (0..num_rows as i64).collect();
    let ts: Vec<i64> = (0..num_rows as i64).map(|i| 1_700_000_000 + i).collect();
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from(tenants)),
            Arc::new(Int64Array::from(ids)),
            Arc::new(Int64Array::from(ts)),
        ],
    )
    .unwrap()
}

fn bench_hash_bucketing(c: &mut Criterion) {
    let primary_keys = vec!["tenant".to_string(), "id".to_string()];

    let mut group = c.benchmark_group("Hash Bucketing");
    for &num_rows in &[10_000usize, 100_000] {
        let table = generate_delta_table(num_rows);
        group.throughput(Throughput::Elements(num_rows as u64));

        group.bench_with_input(BenchmarkId::new("pk_digests", num_rows), &table, |b, table| {
            b.iter(|| {
                let digests: Vec<_> = pk_digests(black_box(table), &primary_keys)
                    .unwrap()
                    .collect::<Result<_, _>>()
                    .unwrap();
                black_box(digests)
            })
        });

        for &num_buckets in &[16usize, 1024] {
            let id = BenchmarkId::new(format!("partition/{}_buckets", num_buckets), num_rows);
            group.bench_with_input(id, &table, |b, table| {
                b.iter(|| {
                    black_box(
                        group_by_pk_hash_bucket(
                            table.clone(),
                            num_buckets,
                            &primary_keys,
                            &DigestModuloAssigner,
                        )
                        .unwrap(),
                    )
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_hash_bucketing);
criterion_main!(benches);
