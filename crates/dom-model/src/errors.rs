use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} is not a child of {1}")]
    NotAChild(NodeId, NodeId),
    #[error("node {0} is not a text node")]
    NotText(NodeId),
    #[error("text nodes cannot have children (node {0})")]
    TextWithChildren(NodeId),
    #[error("invalid property path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

pub type DomResult<T> = Result<T, DomError>;
