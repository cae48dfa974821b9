//! docwatch library
//!
//! Wires the mutation engine, the interaction path and the emission bus into
//! a replayable session. Exposed for the CLI and integration tests.

pub mod config;
pub mod context;
pub mod emission;
pub mod errors;
pub mod session;
pub mod trace;

pub use config::WatchConfig;
pub use emission::Emission;
pub use errors::{SessionError, TraceError};
pub use session::{SessionStats, SignalOutcome, WatchSession};
pub use trace::{read_trace, HostSignal, SnapshotSignal};
