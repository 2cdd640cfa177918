use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use shelf_core::{DatasetSet, SystemClock};
use shelf_origin::{BatchQuery, BatchResult, DatasetSource, OriginFetcher, SourceError};
use shelf_server::cache::{CachePolicy, MemorySharedStore, ReadThroughHandler};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Origen en memoria que retorna N filas por dataset
#[derive(Debug)]
struct StaticSource {
    rows: usize,
}

#[async_trait]
impl DatasetSource for StaticSource {
    async fn fetch_batch(&self, query: &BatchQuery) -> Result<BatchResult, SourceError> {
        let mut result = BatchResult::new();
        for name in query.names() {
            let mut rows = vec![json!(["id", "name", "price"])];
            for i in 0..self.rows {
                rows.push(json!([i.to_string(), format!("{}-{}", name, i), "9.99"]));
            }
            result.insert(name.clone(), rows);
        }
        Ok(result)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "static"
    }
}

fn create_handler(rows: usize) -> ReadThroughHandler {
    let clock = Arc::new(SystemClock);
    let datasets = DatasetSet::new(["catalog", "pricing", "categories", "promotions"]).unwrap();
    let fetcher = OriginFetcher::new(Arc::new(StaticSource { rows }), clock.clone());
    ReadThroughHandler::new(
        fetcher,
        Arc::new(MemorySharedStore::new(clock.clone())),
        CachePolicy::new(datasets),
        clock,
        "bench",
    )
}

/// Benchmark: lectura servida por la capa local
fn bench_read_mem_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let handler = create_handler(100);

    // Pre-populate cache
    rt.block_on(async {
        handler.read(false).await.unwrap();
    });

    c.bench_function("read_mem_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let result = handler.read(false).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: lectura servida por el store compartido
fn bench_read_kv_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let handler = create_handler(100);

    rt.block_on(async {
        handler.read(false).await.unwrap();
    });

    c.bench_function("read_kv_hit", |b| {
        b.to_async(&rt).iter(|| async {
            handler.layers().local().invalidate().await;
            let result = handler.read(false).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: fetch forzado contra el origen en memoria
fn bench_read_forced(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let handler = create_handler(100);

    c.bench_function("read_forced_refresh", |b| {
        b.to_async(&rt).iter(|| async {
            let result = handler.read(true).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: serializacion del payload por tamano de dataset
fn bench_payload_serialization(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("payload_serialization");

    for rows in [10, 100, 1000] {
        let handler = create_handler(rows);
        let outcome = rt.block_on(handler.read(false)).unwrap();

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &outcome, |b, outcome| {
            b.iter(|| {
                let body = serde_json::to_vec(&outcome.bundle.to_payload()).unwrap();
                std::hint::black_box(body)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_read_mem_hit,
    bench_read_kv_hit,
    bench_read_forced,
    bench_payload_serialization,
);

criterion_main!(benches);
