//! Raw interaction path.
//!
//! Low-level key, pointer, focus and visibility events reported by the host
//! capture wrapper are matched against the capture table, reduced to the
//! configured property paths and forwarded to the sink without any
//! classification. Focus changes also re-bind handlers inside the region of
//! the page that the host re-renders wholesale.

pub mod capture;
pub mod errors;
pub mod listeners;
pub mod rebind;
pub mod spec;

pub use capture::{CaptureOutcome, InteractionCapture, InteractionEvent};
pub use errors::CaptureError;
pub use listeners::{Binding, HandlerId, ListenerHost, ListenerTable};
pub use rebind::{RebindOutcome, RegionRebinder, DEFAULT_DYNAMIC_REGION};
pub use spec::{CaptureSpec, CaptureTable, ATTENTION_CATEGORY};
