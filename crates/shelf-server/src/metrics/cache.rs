//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use shelf_core::Provenance;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!(
        "shelf_local_cache_hits_total",
        "Reads answered by a fresh process-local entry"
    );
    metrics::describe_counter!(
        "shelf_local_cache_misses_total",
        "Reads that found no fresh process-local entry"
    );
    metrics::describe_counter!(
        "shelf_local_cache_evictions_total",
        "Process-local entries removed by Moka"
    );
    metrics::describe_gauge!("shelf_local_cache_entries", "Entries in the process-local cache");
    metrics::describe_histogram!(
        "shelf_cache_operation_seconds",
        "Time spent on cache layer operations"
    );
    metrics::describe_counter!(
        "shelf_reads_total",
        "Bootstrap reads by the layer that served them"
    );
    metrics::describe_counter!("shelf_origin_fetches_total", "Origin fetches by result");
    metrics::describe_histogram!(
        "shelf_origin_fetch_seconds",
        "Duration of origin fetches, including failures"
    );
    metrics::describe_counter!(
        "shelf_revalidations_total",
        "Background revalidation attempts by outcome"
    );
    metrics::describe_counter!(
        "shelf_store_errors_total",
        "Shared store failures by operation"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para los hits/misses del cache local.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un hit del cache local
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("shelf_local_cache_hits_total").increment(1);
    }

    /// Registra un miss del cache local
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("shelf_local_cache_misses_total").increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &str) {
        counter!("shelf_local_cache_evictions_total", "reason" => reason.to_string()).increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: u64) {
        gauge!("shelf_local_cache_entries").set(count as f64);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        histogram!(
            "shelf_cache_operation_seconds",
            "operation" => operation.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Registra una lectura según la capa que la respondió
    pub fn record_read(&self, provenance: Provenance) {
        counter!("shelf_reads_total", "provenance" => provenance.as_str()).increment(1);
    }

    /// Registra un fetch al origen (`ok`, `timeout`, `unavailable`)
    pub fn record_origin_fetch(&self, result: &'static str, duration: Duration) {
        counter!("shelf_origin_fetches_total", "result" => result).increment(1);
        histogram!("shelf_origin_fetch_seconds", "result" => result)
            .record(duration.as_secs_f64());
    }

    /// Registra el resultado de una revalidacion
    pub fn record_revalidation(&self, outcome: &'static str) {
        counter!("shelf_revalidations_total", "outcome" => outcome).increment(1);
    }

    /// Registra un error del store compartido
    pub fn record_store_error(&self, store: &'static str, operation: &'static str) {
        counter!(
            "shelf_store_errors_total",
            "store" => store,
            "operation" => operation
        )
        .increment(1);
    }

    /// Calcula hit rate del cache local (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}
