use tracing::warn;

use crate::{DocumentId, DocumentStamp, FrameIndex, WatchError};

/// Resolvers for the identity of the observed document.
///
/// Implementations may fail; [`DocumentContext::stamp`] logs the failure and
/// carries on with an absent value so the event is never suppressed.
pub trait DocumentContext: Send + Sync {
    fn document_id(&self) -> Result<Option<DocumentId>, WatchError>;
    fn title(&self) -> Result<Option<String>, WatchError>;

    fn stamp(&self, frameindex: FrameIndex) -> DocumentStamp {
        let doc_id = self.document_id().unwrap_or_else(|err| {
            warn!(target: "docwatch.context", %err, "document id unavailable");
            None
        });
        let title = self.title().unwrap_or_else(|err| {
            warn!(target: "docwatch.context", %err, "document title unavailable");
            None
        });
        DocumentStamp {
            doc_id,
            title,
            frameindex,
        }
    }
}

/// Fixed identity, typically taken from a trace header.
#[derive(Clone, Debug, Default)]
pub struct StaticDocumentContext {
    pub doc_id: Option<DocumentId>,
    pub title: Option<String>,
}

impl DocumentContext for StaticDocumentContext {
    fn document_id(&self) -> Result<Option<DocumentId>, WatchError> {
        Ok(self.doc_id.clone())
    }

    fn title(&self) -> Result<Option<String>, WatchError> {
        Ok(self.title.clone())
    }
}
