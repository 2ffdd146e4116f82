//! Error suppression per side of the bridge
//!
//! The first failure of a side is logged, repeated failures are not, and the
//! first success afterwards logs a recovery.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkHealth {
    #[default]
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Still healthy, nothing to report
    Steady,
    /// First failure after being healthy, log it
    WentDown,
    /// Another failure while degraded, stay quiet
    StillDown,
    /// First success after being degraded, log recovery
    Recovered,
}

impl LinkHealth {
    pub fn observe(self, succeeded: bool) -> (LinkHealth, Transition) {
        match (self, succeeded) {
            (LinkHealth::Healthy, true) => (LinkHealth::Healthy, Transition::Steady),
            (LinkHealth::Healthy, false) => (LinkHealth::Degraded, Transition::WentDown),
            (LinkHealth::Degraded, false) => (LinkHealth::Degraded, Transition::StillDown),
            (LinkHealth::Degraded, true) => (LinkHealth::Healthy, Transition::Recovered),
        }
    }
}
