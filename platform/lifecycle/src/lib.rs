//! Ordered startup and shutdown for platform components.
//!
//! Ten levels grouped into four sequences; components register handlers at
//! levels during wiring, and the embedding process drives the sequences.
//! Startup is strict, shutdown is best-effort.

pub mod error;
pub mod level;
pub mod orchestrator;

pub use error::LifecycleError;
pub use level::{LifecycleLevel, Sequence};
pub use orchestrator::{LifecycleHandler, LifecycleOrchestrator, SequenceState};
