//! Fixed property snapshot taken from every record before matching.

use docwatch_dom::{DocumentTree, MutationKind, MutationRecord, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "innerText", default, skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
    #[serde(rename = "nodeType", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<u16>,
}

impl NodeSnapshot {
    /// `None` when the reference no longer resolves.
    pub fn capture(tree: &DocumentTree, id: NodeId) -> Option<Self> {
        let node = tree.node(id)?;
        Some(Self {
            class_name: tree.class_name(id).map(str::to_string),
            data: tree.text_data(id).map(str::to_string),
            id: tree.id_attr(id).map(str::to_string),
            inner_text: if node.is_text() {
                None
            } else {
                tree.inner_text(id)
            },
            node_type: tree.node_type(id),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSnapshot {
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSnapshot {
    #[serde(rename = "addedNode", default, skip_serializing_if = "Option::is_none")]
    pub added_node: Option<NodeSnapshot>,
    #[serde(rename = "removedNode", default, skip_serializing_if = "Option::is_none")]
    pub removed_node: Option<NodeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeSnapshot>,
    #[serde(rename = "targetParent", default, skip_serializing_if = "Option::is_none")]
    pub target_parent: Option<ParentSnapshot>,
    #[serde(rename = "type")]
    pub kind: MutationKind,
}

impl MutationSnapshot {
    pub fn capture(tree: &DocumentTree, record: &MutationRecord) -> Self {
        let target_parent = tree.parent(record.target).map(|parent| ParentSnapshot {
            class_name: tree.class_name(parent).map(str::to_string),
            id: tree.id_attr(parent).map(str::to_string),
        });
        Self {
            added_node: record
                .first_added()
                .and_then(|id| NodeSnapshot::capture(tree, id)),
            removed_node: record
                .first_removed()
                .and_then(|id| NodeSnapshot::capture(tree, id)),
            target: NodeSnapshot::capture(tree, record.target),
            target_parent,
            kind: record.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwatch_dom::{ClassValue, NodeDescriptor};
    use serde_json::json;

    #[test]
    fn snapshot_skips_unresolvable_fields() {
        let tree = DocumentTree::from_root(
            &NodeDescriptor::element(1, "div", "outer")
                .with_attr("id", "docs-editor")
                .with_children(vec![NodeDescriptor::element(2, "svg", "")
                    .with_class_value(ClassValue::Opaque(json!({"baseVal": "icon"})))
                    .with_children(vec![NodeDescriptor::text(3, "hi")])]),
        )
        .unwrap();
        let record = MutationRecord::child_list(NodeId(2), vec![NodeId(3)], vec![NodeId(77)]);
        let snapshot = MutationSnapshot::capture(&tree, &record);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "addedNode": {"data": "hi", "nodeType": 3},
                "target": {"innerText": "hi", "nodeType": 1},
                "targetParent": {"className": "outer", "id": "docs-editor"},
                "type": "childList"
            })
        );
    }
}
