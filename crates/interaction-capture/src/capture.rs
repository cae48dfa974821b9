use std::collections::BTreeMap;
use std::sync::Arc;

use docwatch_core_types::{DocumentContext, DocumentStamp, FrameIndex};
use docwatch_dom::DocumentTree;
use docwatch_event_bus::EventSink;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::listeners::ListenerHost;
use crate::rebind::{RebindOutcome, RegionRebinder};
use crate::spec::{CaptureTable, ATTENTION_CATEGORY};

/// Raw interaction forwarded to the collector without classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Low-level event name, e.g. `keydown`.
    pub event: String,
    /// Capture category the event belongs to, e.g. `keystroke`.
    pub event_type: String,
    /// Resolved property paths; unresolvable paths are left out.
    pub properties: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub stamp: DocumentStamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub category: String,
    pub properties: usize,
    pub rebound: Option<RebindOutcome>,
}

pub struct InteractionCapture<S> {
    table: Arc<CaptureTable>,
    sink: S,
    context: Arc<dyn DocumentContext>,
    frameindex: FrameIndex,
    rebinder: RegionRebinder,
    listeners: Arc<dyn ListenerHost>,
}

impl<S> InteractionCapture<S>
where
    S: EventSink<InteractionEvent>,
{
    pub fn new(
        table: Arc<CaptureTable>,
        sink: S,
        context: Arc<dyn DocumentContext>,
        frameindex: FrameIndex,
        rebinder: RegionRebinder,
        listeners: Arc<dyn ListenerHost>,
    ) -> Self {
        Self {
            table,
            sink,
            context,
            frameindex,
            rebinder,
            listeners,
        }
    }

    pub fn rebinder(&self) -> &RegionRebinder {
        &self.rebinder
    }

    /// Binds the dynamic region for the first time.
    pub fn bind_region(&self, tree: &DocumentTree) -> RebindOutcome {
        self.rebinder.rebind(tree, self.listeners.as_ref())
    }

    /// Forwards one raw event. Events outside the capture table are ignored
    /// and yield `None`.
    pub fn handle(&self, tree: &DocumentTree, event: &str, payload: &Value) -> Option<CaptureOutcome> {
        let Some(spec) = self.table.lookup(event) else {
            trace!(target: "docwatch.capture", event, "event not captured");
            return None;
        };

        let properties: BTreeMap<String, Value> = spec
            .properties
            .iter()
            .filter_map(|path| {
                path.resolve(payload)
                    .map(|value| (path.to_string(), value.clone()))
            })
            .collect();
        let resolved = properties.len();

        self.sink.emit(InteractionEvent {
            event: event.to_string(),
            event_type: spec.category.clone(),
            properties,
            stamp: self.context.stamp(self.frameindex),
        });
        trace!(
            target: "docwatch.capture",
            event,
            category = %spec.category,
            resolved,
            "interaction forwarded"
        );

        let rebound = (spec.category == ATTENTION_CATEGORY).then(|| self.bind_region(tree));
        Some(CaptureOutcome {
            category: spec.category.clone(),
            properties: resolved,
            rebound,
        })
    }
}
