//! Document identity taken from the editor URL recorded in a trace.

use docwatch_core_types::{DocumentContext, DocumentId, WatchError};
use url::Url;

/// Resolves the document id from a `/document/d/<id>/...` path.
#[derive(Clone, Debug, Default)]
pub struct UrlDocumentContext {
    url: Option<String>,
    title: Option<String>,
}

impl UrlDocumentContext {
    pub fn new(url: Option<String>, title: Option<String>) -> Self {
        Self { url, title }
    }
}

impl DocumentContext for UrlDocumentContext {
    fn document_id(&self) -> Result<Option<DocumentId>, WatchError> {
        let Some(raw) = self.url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw)
            .map_err(|err| WatchError::new(format!("unparseable document url {raw}: {err}")))?;
        let Some(mut segments) = url.path_segments() else {
            return Ok(None);
        };

        while let Some(segment) = segments.next() {
            if segment == "d" {
                return Ok(segments
                    .next()
                    .filter(|id| !id.is_empty())
                    .map(|id| DocumentId(id.to_string())));
            }
        }
        Ok(None)
    }

    fn title(&self) -> Result<Option<String>, WatchError> {
        Ok(self.title.clone())
    }
}
