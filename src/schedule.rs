use std::time::Duration;

/// What the poll loop does between two cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Sleep(Duration),
    /// The cycle took the whole interval or longer, start the next at once
    Overrun { elapsed: Duration },
}

impl Pause {
    pub fn duration(&self) -> Duration {
        match self {
            Pause::Sleep(duration) => *duration,
            Pause::Overrun { .. } => Duration::ZERO,
        }
    }

    /// Sleep for whatever is left of `interval` after `elapsed`
    pub fn after(interval: Duration, elapsed: Duration) -> Pause {
        match interval.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => Pause::Sleep(remaining),
            _ => Pause::Overrun { elapsed },
        }
    }
}
