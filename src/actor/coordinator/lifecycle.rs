//! Session phases.
//!
//! ```text
//! Starting → LiveServing → Draining → Exited
//! Starting → Snapshot → Exited
//! ```

/// Where a session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    LiveServing,
    Draining,
    Snapshot,
    Exited,
}

impl Phase {
    const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Starting, Self::LiveServing | Self::Snapshot)
                | (Self::LiveServing, Self::Draining)
                | (Self::Draining | Self::Snapshot, Self::Exited)
        )
    }
}

/// Tracks and logs phase transitions.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Starting,
        }
    }

    #[cfg(test)]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `next`. Out-of-order transitions are a bug.
    pub fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.phase,
            next
        );
        crate::debug!("session"; "{:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
