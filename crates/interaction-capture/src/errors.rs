use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("event `{event}` is claimed by both `{first}` and `{second}`")]
    DuplicateEvent {
        event: String,
        first: String,
        second: String,
    },
    #[error("capture category `{0}` lists no events")]
    NoEvents(String),
}
