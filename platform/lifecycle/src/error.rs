use thiserror::Error;

use crate::level::{LifecycleLevel, Sequence};

/// Failures raised by the orchestrator itself. Handler failures during
/// shutdown are logged, not returned.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Registration attempted after the level's sequence already ran.
    #[error("cannot register `{component}` at {level}: sequence {sequence} is closed")]
    RegistrationClosed {
        component: String,
        level: LifecycleLevel,
        sequence: Sequence,
    },

    #[error("sequence {0} has already run")]
    SequenceAlreadyRun(Sequence),

    /// A startup handler failed; the sequence stopped at its level.
    #[error("startup sequence {sequence} aborted at {level} in `{component}`")]
    StartupAborted {
        sequence: Sequence,
        level: LifecycleLevel,
        component: String,
        #[source]
        source: anyhow::Error,
    },
}
