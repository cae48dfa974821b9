use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

mod context;

pub use context::{DocumentContext, StaticDocumentContext};

/// Shared error type for collaborators that sit outside the engine.
#[derive(Debug, Error, Clone)]
pub enum WatchError {
    #[error("{message}")]
    Message { message: String },
}

impl WatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of the frame an event was captured in.
///
/// Serialises as the integer index, or as the string `NOT_SET` when the
/// caller never supplied one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum FrameIndex {
    #[default]
    Unset,
    Index(u32),
}

impl FrameIndex {
    pub const UNSET_MARKER: &'static str = "NOT_SET";
}

impl From<Option<u32>> for FrameIndex {
    fn from(value: Option<u32>) -> Self {
        value.map(FrameIndex::Index).unwrap_or(FrameIndex::Unset)
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameIndex::Unset => f.write_str(Self::UNSET_MARKER),
            FrameIndex::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl Serialize for FrameIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FrameIndex::Unset => serializer.serialize_str(Self::UNSET_MARKER),
            FrameIndex::Index(idx) => serializer.serialize_u32(*idx),
        }
    }
}

impl<'de> Deserialize<'de> for FrameIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(u32),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(idx) => Ok(FrameIndex::Index(idx)),
            Repr::Marker(marker) if marker == Self::UNSET_MARKER => Ok(FrameIndex::Unset),
            Repr::Marker(other) => Err(serde::de::Error::custom(format!(
                "invalid frame index: {other}"
            ))),
        }
    }
}

/// Where the host capture wrapper attaches listeners for a capture category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureScope {
    Document,
    Window,
}

impl fmt::Display for CaptureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureScope::Document => f.write_str("document"),
            CaptureScope::Window => f.write_str("window"),
        }
    }
}

/// Document identity attached to every outgoing event.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DocumentStamp {
    pub doc_id: Option<DocumentId>,
    pub title: Option<String>,
    pub frameindex: FrameIndex,
}
