//! Re-attachment of raw-event handlers inside the dynamically re-rendered
//! region of the page.

use docwatch_core_types::{CaptureScope, FrameIndex};
use docwatch_dom::{DocumentTree, NodeId};
use tracing::{debug, trace};

use crate::listeners::{Binding, HandlerId, ListenerHost};
use crate::spec::CaptureTable;

/// Class token of the comment stream, which the host replaces on focus moves.
pub const DEFAULT_DYNAMIC_REGION: &str = "docos-stream-view";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebindOutcome {
    pub region: Option<NodeId>,
    pub removed: usize,
    pub added: usize,
}

#[derive(Clone, Debug)]
pub struct RegionRebinder {
    region_token: String,
    bindings: Vec<Binding>,
}

impl RegionRebinder {
    /// Binds every document-scoped capture event for `frameindex`.
    pub fn new(region_token: impl Into<String>, table: &CaptureTable, frameindex: FrameIndex) -> Self {
        let bindings = table
            .scoped(CaptureScope::Document)
            .flat_map(|spec| {
                let handler = HandlerId::new(spec.category.clone(), frameindex);
                spec.events.iter().map(move |event| Binding {
                    event: event.clone(),
                    handler: handler.clone(),
                })
            })
            .collect();
        Self {
            region_token: region_token.into(),
            bindings,
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Removes this rebinder's handlers from the current region element, then
    /// adds them back. Running it any number of times leaves exactly one
    /// registration per binding.
    pub fn rebind(&self, tree: &DocumentTree, host: &dyn ListenerHost) -> RebindOutcome {
        let Some(region) = tree.find_first_by_class(&self.region_token) else {
            trace!(target: "docwatch.capture", token = %self.region_token, "dynamic region absent");
            return RebindOutcome::default();
        };

        let mut outcome = RebindOutcome {
            region: Some(region),
            ..RebindOutcome::default()
        };
        for binding in &self.bindings {
            while host.remove_listener(region, &binding.event, &binding.handler) {
                outcome.removed += 1;
            }
            host.add_listener(region, &binding.event, &binding.handler);
            outcome.added += 1;
        }
        debug!(
            target: "docwatch.capture",
            %region,
            removed = outcome.removed,
            added = outcome.added,
            "dynamic region rebound"
        );
        outcome
    }
}
