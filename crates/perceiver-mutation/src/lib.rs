pub mod annotator;
pub mod categorize;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod metrics;
pub mod observer;
pub mod rules;
pub mod snapshot;

pub use annotator::{AnnotatedEvent, Annotation, Annotator, LOADING_PREFIX};
pub use categorize::{classify, Category};
pub use errors::RuleError;
pub use lifecycle::DocumentLifecycle;
pub use observer::{BatchReport, MutationObserver};
pub use rules::{Rule, RuleTable};
pub use snapshot::{MutationSnapshot, NodeSnapshot};
