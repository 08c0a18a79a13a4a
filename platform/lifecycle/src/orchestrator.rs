//! Ordered startup and shutdown dispatch.
//!
//! Components register handlers at levels during a wiring pass, then the
//! embedding process drives the four sequences in order. Handlers run
//! strictly one at a time; a sequence never overlaps itself or another.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::error::LifecycleError;
use crate::level::{LifecycleLevel, Sequence};

/// A component participating in lifecycle dispatch.
///
/// One handler may be registered at several levels; `on_level` receives
/// the level being dispatched so it can branch.
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn on_level(&self, level: LifecycleLevel) -> anyhow::Result<()>;
}

/// Where a sequence is in its one-shot life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

struct RegisteredHandler {
    component: String,
    handler: Arc<dyn LifecycleHandler>,
}

/// Drives registered handlers through the lifecycle sequences.
///
/// Startup is strict: a failing handler finishes its level (later handlers
/// at the same level still run), then the sequence aborts. Shutdown is
/// best-effort: failures are logged and every remaining handler still runs.
/// Each sequence runs at most once; there is no reset.
pub struct LifecycleOrchestrator {
    handlers: HashMap<LifecycleLevel, Vec<RegisteredHandler>>,
    states: HashMap<Sequence, SequenceState>,
}

impl LifecycleOrchestrator {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            states: Sequence::ALL
                .iter()
                .map(|seq| (*seq, SequenceState::NotStarted))
                .collect(),
        }
    }

    /// Register `handler` to run for `component` at `level`.
    ///
    /// Handlers run in registration order within a level. Registration
    /// closes once the level's sequence has started.
    pub fn register_handler(
        &mut self,
        level: LifecycleLevel,
        component: impl Into<String>,
        handler: Arc<dyn LifecycleHandler>,
    ) -> Result<(), LifecycleError> {
        let component = component.into();
        let sequence = level.sequence();
        if self.sequence_state(sequence) != SequenceState::NotStarted {
            return Err(LifecycleError::RegistrationClosed {
                component,
                level,
                sequence,
            });
        }
        debug!(component = %component, level = %level, "lifecycle handler registered");
        self.handlers
            .entry(level)
            .or_default()
            .push(RegisteredHandler { component, handler });
        Ok(())
    }

    pub fn sequence_state(&self, sequence: Sequence) -> SequenceState {
        self.states
            .get(&sequence)
            .copied()
            .unwrap_or(SequenceState::NotStarted)
    }

    /// Run every level of `sequence` in order, awaiting each handler to
    /// completion before the next.
    pub async fn run_sequence(&mut self, sequence: Sequence) -> Result<(), LifecycleError> {
        if self.sequence_state(sequence) != SequenceState::NotStarted {
            return Err(LifecycleError::SequenceAlreadyRun(sequence));
        }
        self.states.insert(sequence, SequenceState::Running);
        info!(sequence = %sequence, "running lifecycle sequence");

        let mut first_failure: Option<(LifecycleLevel, String, anyhow::Error)> = None;
        for level in LifecycleLevel::for_sequence(sequence) {
            let Some(registered) = self.handlers.get(&level) else {
                continue;
            };
            for entry in registered {
                debug!(component = %entry.component, level = %level, "dispatching handler");
                if let Err(err) = entry.handler.on_level(level).await {
                    if sequence.is_startup() {
                        error!(
                            component = %entry.component,
                            level = %level,
                            error = %err,
                            "startup handler failed"
                        );
                        if first_failure.is_none() {
                            first_failure = Some((level, entry.component.clone(), err));
                        }
                    } else {
                        warn!(
                            component = %entry.component,
                            level = %level,
                            error = %err,
                            "shutdown handler failed, continuing"
                        );
                    }
                }
            }
            // The level is allowed to finish before a startup abort.
            if first_failure.is_some() {
                break;
            }
        }

        match first_failure {
            Some((level, component, source)) => {
                self.states.insert(sequence, SequenceState::Failed);
                Err(LifecycleError::StartupAborted {
                    sequence,
                    level,
                    component,
                    source,
                })
            }
            None => {
                self.states.insert(sequence, SequenceState::Completed);
                info!(sequence = %sequence, "lifecycle sequence complete");
                Ok(())
            }
        }
    }
}

impl Default for LifecycleOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: String,
        fail_at: Option<LifecycleLevel>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn register(
            orchestrator: &mut LifecycleOrchestrator,
            name: &str,
            levels: &[LifecycleLevel],
            fail_at: Option<LifecycleLevel>,
            log: &Arc<Mutex<Vec<String>>>,
        ) {
            let handler = Arc::new(Recorder {
                name: name.to_string(),
                fail_at,
                log: Arc::clone(log),
            });
            for level in levels {
                orchestrator
                    .register_handler(*level, name, handler.clone() as Arc<dyn LifecycleHandler>)
                    .unwrap();
            }
        }
    }

    #[async_trait]
    impl LifecycleHandler for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        async fn on_level(&self, level: LifecycleLevel) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("{}@{level}", self.name));
            if self.fail_at == Some(level) {
                anyhow::bail!("{} refused {level}", self.name);
            }
            Ok(())
        }
    }

    fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn dispatches_levels_in_order_and_handlers_in_registration_order() {
        let mut orch = LifecycleOrchestrator::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        Recorder::register(
            &mut orch,
            "bus",
            &[LifecycleLevel::InitBus, LifecycleLevel::LoadCatalog],
            None,
            &log,
        );
        Recorder::register(&mut orch, "svc", &[LifecycleLevel::InitBus], None, &log);

        orch.run_sequence(Sequence::StartupPreRegistration)
            .await
            .unwrap();

        assert_eq!(
            entries(&log),
            vec!["bus@load_catalog", "bus@init_bus", "svc@init_bus"]
        );
        assert_eq!(
            orch.sequence_state(Sequence::StartupPreRegistration),
            SequenceState::Completed
        );
    }

    #[tokio::test]
    async fn startup_failure_finishes_the_level_then_aborts() {
        let mut orch = LifecycleOrchestrator::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        Recorder::register(
            &mut orch,
            "bad",
            &[LifecycleLevel::InitService],
            Some(LifecycleLevel::InitService),
            &log,
        );
        Recorder::register(&mut orch, "peer", &[LifecycleLevel::InitService], None, &log);
        Recorder::register(&mut orch, "late", &[LifecycleLevel::StartPlugin], None, &log);

        let err = orch
            .run_sequence(Sequence::StartupPreRegistration)
            .await
            .unwrap_err();

        // Peer at the failing level still ran; the next level never did.
        assert_eq!(entries(&log), vec!["bad@init_service", "peer@init_service"]);
        match err {
            LifecycleError::StartupAborted {
                level, component, ..
            } => {
                assert_eq!(level, LifecycleLevel::InitService);
                assert_eq!(component, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            orch.sequence_state(Sequence::StartupPreRegistration),
            SequenceState::Failed
        );
    }

    #[tokio::test]
    async fn shutdown_failures_do_not_stop_the_sequence() {
        let mut orch = LifecycleOrchestrator::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        Recorder::register(
            &mut orch,
            "svc",
            &[LifecycleLevel::StopService],
            Some(LifecycleLevel::StopService),
            &log,
        );
        Recorder::register(&mut orch, "plug", &[LifecycleLevel::StopPlugin], None, &log);

        orch.run_sequence(Sequence::ShutdownPreUnregistration)
            .await
            .unwrap();

        assert_eq!(entries(&log), vec!["svc@stop_service", "plug@stop_plugin"]);
        assert_eq!(
            orch.sequence_state(Sequence::ShutdownPreUnregistration),
            SequenceState::Completed
        );
    }

    #[tokio::test]
    async fn registration_closes_once_the_sequence_ran() {
        let mut orch = LifecycleOrchestrator::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        orch.run_sequence(Sequence::StartupPreRegistration)
            .await
            .unwrap();

        let handler = Arc::new(Recorder {
            name: "late".into(),
            fail_at: None,
            log,
        });
        let err = orch
            .register_handler(LifecycleLevel::InitBus, "late", handler)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::RegistrationClosed { .. }));

        // The other sequences are still open.
        assert_eq!(
            orch.sequence_state(Sequence::StartupPostRegistration),
            SequenceState::NotStarted
        );
    }

    #[tokio::test]
    async fn sequences_run_at_most_once() {
        let mut orch = LifecycleOrchestrator::new();
        orch.run_sequence(Sequence::ShutdownPostUnregistration)
            .await
            .unwrap();
        let err = orch
            .run_sequence(Sequence::ShutdownPostUnregistration)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::SequenceAlreadyRun(_)));
    }
}
