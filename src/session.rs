//! A single watched document: the tree, the mutation engine and the
//! interaction path, all emitting onto one bus.

use std::sync::Arc;

use docwatch_dom::{apply_mutation, DocumentTree, HostMutation};
use docwatch_event_bus::InMemoryBus;
use interaction_capture::{
    CaptureOutcome, CaptureTable, InteractionCapture, ListenerTable, RegionRebinder,
};
use perceiver_mutation::{Annotator, BatchReport, DocumentLifecycle, MutationObserver, RuleTable};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::context::UrlDocumentContext;
use crate::emission::Emission;
use crate::errors::SessionError;
use crate::trace::{HostSignal, SnapshotSignal};

pub type EmissionBus = Arc<InMemoryBus<Emission>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub batches: u64,
    pub records: u64,
    pub emitted: u64,
    pub skipped_mutations: u64,
    pub interactions: u64,
    pub rebinds: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignalOutcome {
    Batch(BatchReport),
    Interaction(Option<CaptureOutcome>),
    /// `true` when this signal ended the loading phase.
    Loaded(bool),
    Ignored,
}

pub struct WatchSession {
    tree: DocumentTree,
    lifecycle: Arc<DocumentLifecycle>,
    listeners: Arc<ListenerTable>,
    observer: MutationObserver<EmissionBus>,
    capture: InteractionCapture<EmissionBus>,
    stats: SessionStats,
}

impl WatchSession {
    /// Builds the tree from `snapshot` and binds the dynamic region once.
    pub fn start(
        config: &WatchConfig,
        rules: RuleTable,
        snapshot: &SnapshotSignal,
        bus: EmissionBus,
    ) -> Result<Self, SessionError> {
        let tree = DocumentTree::from_root(&snapshot.root)?;
        let frameindex = config.frameindex();
        let context = Arc::new(UrlDocumentContext::new(
            snapshot.url.clone(),
            snapshot.title.clone(),
        ));
        let lifecycle = Arc::new(DocumentLifecycle::new());
        let listeners = Arc::new(ListenerTable::new());

        let annotator = Annotator::new(Arc::new(rules), Arc::clone(&lifecycle));
        let observer = MutationObserver::new(annotator, Arc::clone(&bus), context.clone(), frameindex);

        let table = Arc::new(CaptureTable::builtin());
        let rebinder = RegionRebinder::new(config.dynamic_region.clone(), &table, frameindex);
        let capture = InteractionCapture::new(
            table,
            bus,
            context,
            frameindex,
            rebinder,
            listeners.clone(),
        );

        let bound = capture.bind_region(&tree);
        info!(
            target: "docwatch.session",
            nodes = tree.len(),
            %frameindex,
            region = ?bound.region,
            bindings = bound.added,
            "session started"
        );

        Ok(Self {
            tree,
            lifecycle,
            listeners,
            observer,
            capture,
            stats: SessionStats::default(),
        })
    }

    /// Starts from the leading snapshot and feeds every remaining signal.
    pub fn replay(
        config: &WatchConfig,
        rules: RuleTable,
        signals: Vec<HostSignal>,
        bus: EmissionBus,
    ) -> Result<SessionStats, SessionError> {
        let mut signals = signals.into_iter();
        let Some(HostSignal::Snapshot(snapshot)) = signals.next() else {
            return Err(SessionError::MissingSnapshot);
        };
        let mut session = Self::start(config, rules, &snapshot, bus)?;
        for signal in signals {
            session.handle(signal);
        }
        Ok(session.stats)
    }

    pub fn handle(&mut self, signal: HostSignal) -> SignalOutcome {
        match signal {
            HostSignal::Mutations { records } => SignalOutcome::Batch(self.observe(&records)),
            HostSignal::Interaction { event, payload } => {
                SignalOutcome::Interaction(self.interact(&event, &payload))
            }
            HostSignal::Loaded => {
                let changed = self.lifecycle.mark_ready();
                info!(target: "docwatch.session", changed, "document loaded");
                SignalOutcome::Loaded(changed)
            }
            HostSignal::Snapshot(_) => {
                warn!(target: "docwatch.session", "ignoring snapshot after session start");
                SignalOutcome::Ignored
            }
        }
    }

    /// Applies one observation batch and runs it through the engine.
    /// Edits the tree rejects are skipped; the rest of the batch proceeds.
    pub fn observe(&mut self, mutations: &[HostMutation]) -> BatchReport {
        let mut records = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            match apply_mutation(&mut self.tree, mutation) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(target: "docwatch.session", target_node = %mutation.target, %err, "mutation skipped");
                    self.stats.skipped_mutations += 1;
                }
            }
        }

        let report = self.observer.process_batch(&self.tree, &records);

        // Removed nodes stay readable until the whole batch is processed.
        let pruned = self.tree.prune_detached();
        let tree = &self.tree;
        let forgotten = self.listeners.retain_nodes(|node| tree.contains(node));
        debug!(target: "docwatch.session", pruned, forgotten, "batch settled");

        self.stats.batches += 1;
        self.stats.records += report.records as u64;
        self.stats.emitted += report.emitted as u64;
        report
    }

    pub fn interact(&mut self, event: &str, payload: &Value) -> Option<CaptureOutcome> {
        let outcome = self.capture.handle(&self.tree, event, payload)?;
        self.stats.interactions += 1;
        if outcome.rebound.is_some() {
            self.stats.rebinds += 1;
        }
        Some(outcome)
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn lifecycle(&self) -> &DocumentLifecycle {
        &self.lifecycle
    }

    pub fn listeners(&self) -> &ListenerTable {
        &self.listeners
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwatch_core_types::{DocumentId, FrameIndex};
    use docwatch_dom::{MutationKind, NodeDescriptor, NodeId};
    use docwatch_event_bus::EventBus;
    use interaction_capture::ListenerHost;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot() -> SnapshotSignal {
        SnapshotSignal {
            url: Some("https://docs.google.com/document/d/abc123/edit".into()),
            title: Some("Plan".into()),
            root: NodeDescriptor::element(1, "body", "kix-appview").with_children(vec![
                NodeDescriptor::element(2, "div", "docos-stream-view"),
            ]),
        }
    }

    fn insert_card(target: u64, id: u64) -> HostMutation {
        HostMutation {
            target: NodeId(target),
            kind: MutationKind::ChildList,
            added: vec![NodeDescriptor::element(id, "div", "docos-anchoredsuggestionview")],
            removed: vec![],
            text: None,
        }
    }

    #[test]
    fn insert_labels_lose_loading_prefix_after_load() {
        let bus = InMemoryBus::<Emission>::new(16);
        let mut rx = bus.subscribe();
        let mut session =
            WatchSession::start(&WatchConfig::default(), RuleTable::builtin(), &snapshot(), bus)
                .unwrap();

        session.handle(HostSignal::Mutations {
            records: vec![insert_card(2, 10)],
        });
        assert_eq!(session.handle(HostSignal::Loaded), SignalOutcome::Loaded(true));
        assert_eq!(session.handle(HostSignal::Loaded), SignalOutcome::Loaded(false));
        session.observe(&[insert_card(2, 11)]);

        let labels: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|emission| match emission {
                Emission::Annotated(event) => {
                    assert_eq!(event.stamp.doc_id, Some(DocumentId("abc123".into())));
                    assert_eq!(event.stamp.frameindex, FrameIndex::Unset);
                    event.label
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(labels, vec!["loading_suggestion-card", "suggestion-card"]);
    }

    #[test]
    fn rejected_mutation_does_not_abort_batch() {
        let bus = InMemoryBus::<Emission>::new(16);
        let mut rx = bus.subscribe();
        let mut session =
            WatchSession::start(&WatchConfig::default(), RuleTable::builtin(), &snapshot(), bus)
                .unwrap();

        let report = session.observe(&[insert_card(99, 10), insert_card(2, 11)]);
        assert_eq!(report, BatchReport { records: 1, emitted: 1 });
        assert_eq!(session.stats().skipped_mutations, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn partially_invalid_edit_changes_nothing() {
        let bus = InMemoryBus::<Emission>::new(16);
        let mut rx = bus.subscribe();
        let mut session =
            WatchSession::start(&WatchConfig::default(), RuleTable::builtin(), &snapshot(), bus)
                .unwrap();
        let bound = session.listeners().bindings(NodeId(2)).len();

        let report = session.observe(&[HostMutation {
            target: NodeId(1),
            kind: MutationKind::ChildList,
            added: vec![
                NodeDescriptor::element(10, "div", "kix-spell-bubble"),
                NodeDescriptor::element(2, "div", "duplicate"),
            ],
            removed: vec![NodeId(2)],
            text: None,
        }]);

        assert_eq!(report, BatchReport { records: 0, emitted: 0 });
        assert_eq!(session.stats().skipped_mutations, 1);
        assert!(session.tree().is_attached(NodeId(2)));
        assert!(!session.tree().contains(NodeId(10)));
        assert_eq!(session.listeners().bindings(NodeId(2)).len(), bound);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn focus_after_region_swap_rebinds_new_region() {
        let bus = InMemoryBus::<Emission>::new(16);
        let mut rx = bus.subscribe();
        let mut session =
            WatchSession::start(&WatchConfig::default(), RuleTable::builtin(), &snapshot(), bus)
                .unwrap();
        let expected = session.listeners().bindings(NodeId(2)).len();
        assert!(expected > 0);

        session.observe(&[HostMutation {
            target: NodeId(1),
            kind: MutationKind::ChildList,
            added: vec![NodeDescriptor::element(3, "div", "docos-stream-view")],
            removed: vec![NodeId(2)],
            text: None,
        }]);
        assert!(session.listeners().bindings(NodeId(2)).is_empty());
        assert!(!session.tree().contains(NodeId(2)));

        let outcome = session.interact("focusin", &json!({})).unwrap();
        assert_eq!(outcome.rebound.and_then(|r| r.region), Some(NodeId(3)));
        assert_eq!(session.listeners().bindings(NodeId(3)).len(), expected);
        assert_eq!(session.stats().rebinds, 1);

        let forwarded = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|emission| matches!(emission, Emission::Interaction(_)))
            .count();
        assert_eq!(forwarded, 1);
    }

    #[test]
    fn replay_requires_leading_snapshot() {
        let bus = InMemoryBus::<Emission>::new(4);
        let err = WatchSession::replay(
            &WatchConfig::default(),
            RuleTable::builtin(),
            vec![HostSignal::Loaded],
            bus,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::MissingSnapshot));
    }
}
