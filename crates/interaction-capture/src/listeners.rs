use std::fmt;

use dashmap::DashMap;
use docwatch_core_types::FrameIndex;
use docwatch_dom::NodeId;
use serde::{Deserialize, Serialize};

/// Identity of a registered raw-event handler.
///
/// Two handlers are the same handler when they forward the same capture
/// category for the same frame; removal relies on this equality.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HandlerId {
    pub category: String,
    pub frameindex: FrameIndex,
}

impl HandlerId {
    pub fn new(category: impl Into<String>, frameindex: FrameIndex) -> Self {
        Self {
            category: category.into(),
            frameindex,
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.category, self.frameindex)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub event: String,
    pub handler: HandlerId,
}

/// Listener registration surface of the host page.
///
/// Like the host, `add_listener` does not deduplicate: registering the same
/// pair twice yields two registrations.
pub trait ListenerHost: Send + Sync {
    fn add_listener(&self, node: NodeId, event: &str, handler: &HandlerId);
    /// Removes one registration of the pair; `false` when none existed.
    fn remove_listener(&self, node: NodeId, event: &str, handler: &HandlerId) -> bool;
    fn bindings(&self, node: NodeId) -> Vec<Binding>;
}

/// In-memory registry keyed by the node listeners are attached to.
#[derive(Debug, Default)]
pub struct ListenerTable {
    nodes: DashMap<NodeId, Vec<Binding>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, node: NodeId, event: &str, handler: &HandlerId) -> usize {
        self.nodes
            .get(&node)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|binding| binding.event == event && &binding.handler == handler)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Drops every registration on `node`, as happens when the host
    /// replaces the element.
    pub fn forget(&self, node: NodeId) {
        self.nodes.remove(&node);
    }

    /// Forgets every node `keep` rejects; returns how many were dropped.
    pub fn retain_nodes(&self, keep: impl Fn(NodeId) -> bool) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node, _| keep(*node));
        before - self.nodes.len()
    }
}

impl ListenerHost for ListenerTable {
    fn add_listener(&self, node: NodeId, event: &str, handler: &HandlerId) {
        self.nodes.entry(node).or_default().push(Binding {
            event: event.to_string(),
            handler: handler.clone(),
        });
    }

    fn remove_listener(&self, node: NodeId, event: &str, handler: &HandlerId) -> bool {
        let Some(mut entry) = self.nodes.get_mut(&node) else {
            return false;
        };
        match entry
            .iter()
            .position(|binding| binding.event == event && &binding.handler == handler)
        {
            Some(position) => {
                entry.remove(position);
                true
            }
            None => false,
        }
    }

    fn bindings(&self, node: NodeId) -> Vec<Binding> {
        self.nodes
            .get(&node)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_registration_does_not_deduplicate() {
        let table = ListenerTable::new();
        let handler = HandlerId::new("keystroke", FrameIndex::Index(1));
        table.add_listener(NodeId(3), "keydown", &handler);
        table.add_listener(NodeId(3), "keydown", &handler);
        assert_eq!(table.count(NodeId(3), "keydown", &handler), 2);

        assert!(table.remove_listener(NodeId(3), "keydown", &handler));
        assert_eq!(table.count(NodeId(3), "keydown", &handler), 1);
    }

    #[test]
    fn removal_matches_by_identity() {
        let table = ListenerTable::new();
        let top = HandlerId::new("keystroke", FrameIndex::Unset);
        let inner = HandlerId::new("keystroke", FrameIndex::Index(0));
        table.add_listener(NodeId(3), "keydown", &top);
        assert!(!table.remove_listener(NodeId(3), "keydown", &inner));
        assert!(!table.remove_listener(NodeId(3), "keyup", &top));
        assert!(!table.remove_listener(NodeId(4), "keydown", &top));
        assert_eq!(table.bindings(NodeId(3)).len(), 1);
    }

    #[test]
    fn retain_drops_rejected_nodes() {
        let table = ListenerTable::new();
        let handler = HandlerId::new("save", FrameIndex::Unset);
        table.add_listener(NodeId(1), "google_docs_save", &handler);
        table.add_listener(NodeId(2), "google_docs_save", &handler);
        assert_eq!(table.retain_nodes(|node| node != NodeId(2)), 1);
        assert!(table.bindings(NodeId(2)).is_empty());
        assert_eq!(table.bindings(NodeId(1)).len(), 1);
    }
}
