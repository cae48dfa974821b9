use std::time::Duration;

use docwatch_dom::NodeId;
use tracing::{debug, trace};

use crate::categorize::Category;
use crate::metrics;

pub fn emit_match(category: Category, target: NodeId, label: &str, has_context: bool) {
    metrics::record_classified(category, true);
    debug!(
        target: "docwatch.events",
        %category,
        %target,
        label,
        has_context,
        "mutation.annotated"
    );
}

pub fn emit_drop(category: Category, target: NodeId) {
    metrics::record_classified(category, false);
    trace!(
        target: "docwatch.events",
        %category,
        %target,
        "mutation.unmatched"
    );
}

pub fn emit_batch(records: usize, emitted: usize, duration: Duration) {
    metrics::record_batch(duration);
    debug!(
        target: "docwatch.events",
        records,
        emitted,
        elapsed_us = duration.as_micros() as u64,
        "mutation.batch.processed"
    );
}
