use serde::{Deserialize, Serialize};

use crate::node::NodeId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    #[serde(rename = "childList")]
    ChildList,
    #[serde(rename = "characterData")]
    CharacterData,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::ChildList => "childList",
            MutationKind::CharacterData => "characterData",
        }
    }
}

/// One observed atomic tree edit. Node references point into the
/// [`crate::DocumentTree`] the record was produced against; references may
/// dangle once the tree has been pruned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub kind: MutationKind,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            added,
            removed,
            kind: MutationKind::ChildList,
        }
    }

    pub fn character_data(target: NodeId) -> Self {
        Self {
            target,
            added: Vec::new(),
            removed: Vec::new(),
            kind: MutationKind::CharacterData,
        }
    }

    pub fn first_added(&self) -> Option<NodeId> {
        self.added.first().copied()
    }

    pub fn first_removed(&self) -> Option<NodeId> {
        self.removed.first().copied()
    }
}
