//! Payloads carried on the emission bus.

use interaction_capture::InteractionEvent;
use perceiver_mutation::AnnotatedEvent;
use serde::{Deserialize, Serialize};

/// Everything the watcher hands to the collector. Serialises as the bare
/// inner event so the wire shape matches what each producer emits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emission {
    Annotated(AnnotatedEvent),
    Interaction(InteractionEvent),
}

impl Emission {
    pub fn event_type(&self) -> &str {
        match self {
            Emission::Annotated(event) => event.event_type.as_str(),
            Emission::Interaction(event) => &event.event_type,
        }
    }
}

impl From<AnnotatedEvent> for Emission {
    fn from(event: AnnotatedEvent) -> Self {
        Emission::Annotated(event)
    }
}

impl From<InteractionEvent> for Emission {
    fn from(event: InteractionEvent) -> Self {
        Emission::Interaction(event)
    }
}
