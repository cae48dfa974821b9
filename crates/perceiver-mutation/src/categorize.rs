//! Shape classification of a single mutation record.

use std::fmt;

use docwatch_dom::{DocumentTree, MutationKind, MutationRecord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Insert,
    Delete,
    Clear,
    Input,
    Replace,
    Suggest,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Insert,
        Category::Delete,
        Category::Clear,
        Category::Input,
        Category::Replace,
        Category::Suggest,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Insert => "insert",
            Category::Delete => "delete",
            Category::Clear => "clear",
            Category::Input => "input",
            Category::Replace => "replace",
            Category::Suggest => "suggest",
            Category::Other => "other",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a record to its category. The checks run in a fixed order and the
/// first one that holds decides; the text-node replacement check must stay
/// ahead of the generic both-sides check.
pub fn classify(tree: &DocumentTree, record: &MutationRecord) -> Category {
    let first_added = record.first_added();
    let first_removed = record.first_removed();

    match (first_added, first_removed) {
        (Some(_), None) => Category::Insert,
        (None, Some(removed)) if tree.is_text(removed) => Category::Clear,
        (None, Some(_)) => Category::Delete,
        (Some(added), Some(removed)) if tree.is_text(added) && tree.is_text(removed) => {
            Category::Replace
        }
        _ if record.kind == MutationKind::CharacterData => Category::Input,
        (Some(_), Some(_)) => Category::Suggest,
        (None, None) => Category::Other,
    }
}
