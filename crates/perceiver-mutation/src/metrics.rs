//! Counters for the mutation engine.
//!
//! Process-wide atomics so the CLI can report throughput without a metrics
//! backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::categorize::Category;

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU64 = AtomicU64::new(0);

static RECORDS_BY_CATEGORY: [AtomicU64; 7] = [ZERO; 7];
static RECORDS_MATCHED: AtomicU64 = AtomicU64::new(0);
static RECORDS_DROPPED: AtomicU64 = AtomicU64::new(0);

static BATCH_TOTAL: AtomicU64 = AtomicU64::new(0);
static BATCH_LAT_NS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub records: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub by_category: Vec<CategoryCount>,
    pub matched: u64,
    pub dropped: u64,
    pub batches: u64,
    pub avg_batch_ms: f64,
}

pub fn record_classified(category: Category, matched: bool) {
    RECORDS_BY_CATEGORY[category.index()].fetch_add(1, Ordering::Relaxed);
    if matched {
        RECORDS_MATCHED.fetch_add(1, Ordering::Relaxed);
    } else {
        RECORDS_DROPPED.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn record_batch(duration: Duration) {
    BATCH_TOTAL.fetch_add(1, Ordering::Relaxed);
    let nanos = duration.as_nanos().min(u64::MAX as u128) as u64;
    BATCH_LAT_NS.fetch_add(nanos, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    let batches = BATCH_TOTAL.load(Ordering::Relaxed);
    let avg_batch_ms = if batches == 0 {
        0.0
    } else {
        BATCH_LAT_NS.load(Ordering::Relaxed) as f64 / batches as f64 / 1_000_000.0
    };
    MetricSnapshot {
        by_category: Category::ALL
            .iter()
            .map(|category| CategoryCount {
                category: *category,
                records: RECORDS_BY_CATEGORY[category.index()].load(Ordering::Relaxed),
            })
            .collect(),
        matched: RECORDS_MATCHED.load(Ordering::Relaxed),
        dropped: RECORDS_DROPPED.load(Ordering::Relaxed),
        batches,
        avg_batch_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_grow() {
        let before = snapshot();
        record_classified(Category::Suggest, false);
        record_batch(Duration::from_micros(5));
        let after = snapshot();
        assert!(after.dropped > before.dropped);
        assert!(after.batches > before.batches);
        let suggest = |snap: &MetricSnapshot| snap.by_category[Category::Suggest.index()].records;
        assert!(suggest(&after) > suggest(&before));
    }
}
