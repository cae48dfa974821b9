//! Application of host-side edits to the tree.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::{DomError, DomResult};
use crate::node::{NodeDescriptor, NodeId};
use crate::record::{MutationKind, MutationRecord};
use crate::tree::DocumentTree;

fn default_kind() -> MutationKind {
    MutationKind::ChildList
}

/// An edit as the host performed it, before it is observed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HostMutation {
    pub target: NodeId,
    #[serde(default = "default_kind")]
    pub kind: MutationKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<NodeDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Applies `mutation` to `tree` and returns the record an observer on the
/// tree would receive.
///
/// The edit is checked in full before anything is written: a rejected
/// mutation leaves the tree untouched.
pub fn apply_mutation(tree: &mut DocumentTree, mutation: &HostMutation) -> DomResult<MutationRecord> {
    if !tree.contains(mutation.target) {
        return Err(DomError::UnknownNode(mutation.target));
    }

    match mutation.kind {
        MutationKind::CharacterData => {
            tree.set_text(mutation.target, mutation.text.as_deref().unwrap_or_default())?;
            trace!(target: "docwatch.dom", node = %mutation.target, "character data replaced");
            Ok(MutationRecord::character_data(mutation.target))
        }
        MutationKind::ChildList => {
            let mut unique = HashSet::with_capacity(mutation.removed.len());
            for removed in &mutation.removed {
                if tree.parent(*removed) != Some(mutation.target) || !unique.insert(*removed) {
                    return Err(DomError::NotAChild(*removed, mutation.target));
                }
            }
            tree.validate_insert(mutation.target, &mutation.added)?;
            for removed in &mutation.removed {
                tree.detach(mutation.target, *removed)?;
            }
            let mut added = Vec::with_capacity(mutation.added.len());
            for desc in &mutation.added {
                added.push(tree.insert_subtree(Some(mutation.target), desc)?);
            }
            trace!(
                target: "docwatch.dom",
                node = %mutation.target,
                added = added.len(),
                removed = mutation.removed.len(),
                "child list changed"
            );
            Ok(MutationRecord::child_list(
                mutation.target,
                added,
                mutation.removed.clone(),
            ))
        }
    }
}
