/// Phase definitions for the redirect resolution state machine
///
/// A resolution moves `Navigating -> Polling -> Stabilizing -> Done`, or
/// `Navigating -> Failed` when the initial navigation fails. Each transition
/// performs exactly one blocking wait.
use std::fmt;

/// Represents the current phase of one redirect resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvePhase {
    /// Initial navigation to the starting URL is in flight
    Navigating,

    /// Polling the current URL at fixed intervals
    Polling,

    /// One bounded wait for network quiescence
    Stabilizing,

    /// Chain settled; the last entry is the final URL
    Done,

    /// Initial navigation failed; the chain holds only the starting URL
    Failed,
}

impl ResolvePhase {
    /// Returns true if no further transition happens from this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this phase counts as a successful resolution
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigating => "navigating",
            Self::Polling => "polling",
            Self::Stabilizing => "stabilizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ResolvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
