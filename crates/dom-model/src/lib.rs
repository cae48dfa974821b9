//! Host document model for docwatch.
//!
//! The observed editing surface is represented as an arena of nodes keyed by
//! host-assigned ids. Host edits are applied through [`host::apply_mutation`],
//! which yields the [`MutationRecord`] the observer would have delivered.
//! All read access goes through accessors that return `Option` and never panic.

pub mod errors;
pub mod extract;
pub mod host;
pub mod node;
pub mod record;
pub mod tree;

pub use errors::{DomError, DomResult};
pub use extract::{extract, PropertyPath, Segment};
pub use host::{apply_mutation, HostMutation};
pub use node::{ClassTokens, ClassValue, Node, NodeDescriptor, NodeId, NodeKind};
pub use record::{MutationKind, MutationRecord};
pub use tree::DocumentTree;
