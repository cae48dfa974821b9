use std::sync::{Arc, Mutex};

use docwatch_core_types::{DocumentId, FrameIndex, StaticDocumentContext};
use docwatch_dom::{apply_mutation, DocumentTree, HostMutation, NodeDescriptor, NodeId};
use docwatch_event_bus::EventSink;
use interaction_capture::{
    CaptureTable, InteractionCapture, InteractionEvent, ListenerHost, ListenerTable,
    RegionRebinder, DEFAULT_DYNAMIC_REGION,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Default)]
struct Recorder(Mutex<Vec<InteractionEvent>>);

impl EventSink<InteractionEvent> for Recorder {
    fn emit(&self, event: InteractionEvent) {
        self.0.lock().unwrap().push(event);
    }
}

fn page() -> DocumentTree {
    DocumentTree::from_root(&NodeDescriptor::element(1, "body", "kix-appview").with_children(
        vec![NodeDescriptor::element(2, "div", "docos-stream-view")],
    ))
    .unwrap()
}

fn capture(
    listeners: Arc<ListenerTable>,
) -> (InteractionCapture<Arc<Recorder>>, Arc<Recorder>) {
    let table = Arc::new(CaptureTable::builtin());
    let sink = Arc::new(Recorder::default());
    let rebinder = RegionRebinder::new(DEFAULT_DYNAMIC_REGION, &table, FrameIndex::Unset);
    let capture = InteractionCapture::new(
        table,
        Arc::clone(&sink),
        Arc::new(StaticDocumentContext {
            doc_id: Some(DocumentId("doc-9".into())),
            title: None,
        }),
        FrameIndex::Unset,
        rebinder,
        listeners,
    );
    (capture, sink)
}

#[test]
fn keystroke_payload_is_reduced_to_configured_paths() {
    let tree = page();
    let (capture, sink) = capture(Arc::new(ListenerTable::new()));

    let outcome = capture
        .handle(
            &tree,
            "keydown",
            &json!({
                "key": "a",
                "keyCode": 65,
                "shiftKey": false,
                "isTrusted": true,
                "target": {"className": "kix-canvas", "id": null}
            }),
        )
        .unwrap();
    assert_eq!(outcome.category, "keystroke");
    assert_eq!(outcome.rebound, None);

    let events = sink.0.lock().unwrap();
    let wire = serde_json::to_value(&events[0]).unwrap();
    assert_eq!(
        wire,
        json!({
            "event": "keydown",
            "event_type": "keystroke",
            "properties": {
                "key": "a",
                "keyCode": 65,
                "shiftKey": false,
                "target.className": "kix-canvas"
            },
            "doc_id": "doc-9",
            "title": null,
            "frameindex": "NOT_SET"
        })
    );
}

#[test]
fn unknown_events_are_not_forwarded() {
    let (capture, sink) = capture(Arc::new(ListenerTable::new()));
    assert!(capture.handle(&page(), "scroll", &json!({})).is_none());
    assert!(sink.0.lock().unwrap().is_empty());
}

#[test]
fn focus_changes_rebind_the_replaced_region() {
    let mut tree = page();
    let listeners = Arc::new(ListenerTable::new());
    let (capture, _sink) = capture(Arc::clone(&listeners));
    capture.bind_region(&tree);
    let expected = capture.rebinder().bindings().len();
    assert_eq!(listeners.bindings(NodeId(2)).len(), expected);

    // The host swaps the stream element; listeners on the old one are gone.
    apply_mutation(
        &mut tree,
        &HostMutation {
            target: NodeId(1),
            kind: docwatch_dom::MutationKind::ChildList,
            added: vec![NodeDescriptor::element(3, "div", "docos-stream-view")],
            removed: vec![NodeId(2)],
            text: None,
        },
    )
    .unwrap();
    listeners.forget(NodeId(2));
    assert!(listeners.bindings(NodeId(3)).is_empty());

    for _ in 0..2 {
        let outcome = capture
            .handle(&tree, "focusin", &json!({"target": {"className": "docos-input"}}))
            .unwrap();
        assert_eq!(outcome.rebound.and_then(|r| r.region), Some(NodeId(3)));
    }
    assert_eq!(listeners.bindings(NodeId(3)).len(), expected);
}
