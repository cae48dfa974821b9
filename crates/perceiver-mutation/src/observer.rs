//! Batch processing loop between the observation subscription and the sink.

use std::sync::Arc;
use std::time::Instant;

use docwatch_core_types::{DocumentContext, FrameIndex};
use docwatch_dom::{DocumentTree, MutationRecord};
use docwatch_event_bus::EventSink;

use crate::annotator::{AnnotatedEvent, Annotator};
use crate::categorize::classify;
use crate::events;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub records: usize,
    pub emitted: usize,
}

pub struct MutationObserver<S> {
    annotator: Annotator,
    sink: S,
    context: Arc<dyn DocumentContext>,
    frameindex: FrameIndex,
}

impl<S> MutationObserver<S>
where
    S: EventSink<AnnotatedEvent>,
{
    pub fn new(
        annotator: Annotator,
        sink: S,
        context: Arc<dyn DocumentContext>,
        frameindex: FrameIndex,
    ) -> Self {
        Self {
            annotator,
            sink,
            context,
            frameindex,
        }
    }

    /// Runs classify → match → emit for each record in delivery order. Each
    /// record completes before the next starts; unmatched records are
    /// dropped silently.
    pub fn process_batch(&self, tree: &DocumentTree, records: &[MutationRecord]) -> BatchReport {
        let started = Instant::now();
        let mut report = BatchReport {
            records: records.len(),
            emitted: 0,
        };

        for record in records {
            let category = classify(tree, record);
            match self.annotator.annotate_classified(tree, record, category) {
                Some(annotation) => {
                    events::emit_match(
                        category,
                        record.target,
                        &annotation.label,
                        annotation.context_content.is_some(),
                    );
                    let stamp = self.context.stamp(self.frameindex);
                    self.sink.emit(annotation.into_event(stamp));
                    report.emitted += 1;
                }
                None => events::emit_drop(category, record.target),
            }
        }

        events::emit_batch(report.records, report.emitted, started.elapsed());
        report
    }
}
