//! Lifecycle levels and dispatch sequences.

use std::fmt;

/// Ordered startup and shutdown levels.
///
/// Declaration order is execution order; the derived `Ord` is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleLevel {
    LoadCatalog,
    InitBus,
    InitPlugin,
    InitService,
    StartPlugin,
    StartService,
    StopService,
    StopPlugin,
    StopBus,
    Shutdown,
}

/// The four dispatch sequences. Startup runs in two halves around external
/// event registration; shutdown mirrors it around unregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    StartupPreRegistration,
    StartupPostRegistration,
    ShutdownPreUnregistration,
    ShutdownPostUnregistration,
}

impl LifecycleLevel {
    pub const ALL: [LifecycleLevel; 10] = [
        LifecycleLevel::LoadCatalog,
        LifecycleLevel::InitBus,
        LifecycleLevel::InitPlugin,
        LifecycleLevel::InitService,
        LifecycleLevel::StartPlugin,
        LifecycleLevel::StartService,
        LifecycleLevel::StopService,
        LifecycleLevel::StopPlugin,
        LifecycleLevel::StopBus,
        LifecycleLevel::Shutdown,
    ];

    /// The sequence this level is dispatched in.
    pub fn sequence(self) -> Sequence {
        match self {
            LifecycleLevel::LoadCatalog
            | LifecycleLevel::InitBus
            | LifecycleLevel::InitPlugin
            | LifecycleLevel::InitService
            | LifecycleLevel::StartPlugin => Sequence::StartupPreRegistration,
            LifecycleLevel::StartService => Sequence::StartupPostRegistration,
            LifecycleLevel::StopService | LifecycleLevel::StopPlugin => {
                Sequence::ShutdownPreUnregistration
            }
            LifecycleLevel::StopBus | LifecycleLevel::Shutdown => {
                Sequence::ShutdownPostUnregistration
            }
        }
    }

    /// Levels of a sequence, in execution order.
    pub fn for_sequence(sequence: Sequence) -> Vec<LifecycleLevel> {
        Self::ALL
            .iter()
            .copied()
            .filter(|level| level.sequence() == sequence)
            .collect()
    }
}

impl Sequence {
    pub const ALL: [Sequence; 4] = [
        Sequence::StartupPreRegistration,
        Sequence::StartupPostRegistration,
        Sequence::ShutdownPreUnregistration,
        Sequence::ShutdownPostUnregistration,
    ];

    /// Startup sequences abort on failure; shutdown sequences press on.
    pub fn is_startup(self) -> bool {
        matches!(
            self,
            Sequence::StartupPreRegistration | Sequence::StartupPostRegistration
        )
    }
}

impl fmt::Display for LifecycleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleLevel::LoadCatalog => "load_catalog",
            LifecycleLevel::InitBus => "init_bus",
            LifecycleLevel::InitPlugin => "init_plugin",
            LifecycleLevel::InitService => "init_service",
            LifecycleLevel::StartPlugin => "start_plugin",
            LifecycleLevel::StartService => "start_service",
            LifecycleLevel::StopService => "stop_service",
            LifecycleLevel::StopPlugin => "stop_plugin",
            LifecycleLevel::StopBus => "stop_bus",
            LifecycleLevel::Shutdown => "shutdown",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sequence::StartupPreRegistration => "startup_pre_registration",
            Sequence::StartupPostRegistration => "startup_post_registration",
            Sequence::ShutdownPreUnregistration => "shutdown_pre_unregistration",
            Sequence::ShutdownPostUnregistration => "shutdown_post_unregistration",
        };
        write!(f, "{name}")
    }
}
