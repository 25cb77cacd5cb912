//! Wall-clock budget shared by instantiation and quantifier elimination.

use std::time::{Duration, Instant};

use crate::instantiate::InstantiationError;

/// The instant after which instantiation gives up, together with the budget
/// it was derived from. A zero budget never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Deadline {
    at: Option<Instant>,
    budget_secs: u64,
}

impl Deadline {
    pub(crate) fn after_secs(budget_secs: u64) -> Self {
        let at = match budget_secs {
            0 => None,
            secs => Instant::now().checked_add(Duration::from_secs(secs)),
        };
        Self { at, budget_secs }
    }

    #[cfg(test)]
    pub(crate) fn expiring_at(at: Instant, budget_secs: u64) -> Self {
        Self {
            at: Some(at),
            budget_secs,
        }
    }

    pub(crate) fn instant(self) -> Option<Instant> {
        self.at
    }

    pub(crate) fn is_expired(self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fails with [`InstantiationError::Timeout`] once the deadline has passed.
    pub(crate) fn check(self) -> Result<(), InstantiationError> {
        if self.is_expired() {
            Err(InstantiationError::Timeout(self.budget_secs))
        } else {
            Ok(())
        }
    }
}
