//! Presence cache initialization phase (§4.3).
//!
//! Full mode passes through all three phases; LRU mode has no online-user
//! scan to run and jumps directly to [`Phase::DoSubscribeOver`]. External
//! consumers (the dispatcher's broker handler, chiefly) must call
//! [`PresencePhase::wait_ready`] before reading the cache, so they never
//! observe a half-populated map.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cache initialization phase, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Begin = 0,
    DoOnlineStatusOver = 1,
    DoSubscribeOver = 2,
}

impl Phase {
    fn from_u32(value: u32) -> Self {
        match value {
            0 => Phase::Begin,
            1 => Phase::DoOnlineStatusOver,
            _ => Phase::DoSubscribeOver,
        }
    }
}

/// Atomic phase counter paired with a [`Notify`], acting as the
/// condition variable §4.3 calls for.
#[derive(Debug)]
pub struct PresencePhase {
    value: AtomicU32,
    notify: Notify,
}

impl PresencePhase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            value: AtomicU32::new(Phase::Begin as u32),
            notify: Notify::new(),
        })
    }

    pub fn current(&self) -> Phase {
        Phase::from_u32(self.value.load(Ordering::Acquire))
    }

    /// Advance the phase and wake any waiters. Advancing never moves the
    /// phase backward.
    pub fn advance_to(&self, phase: Phase) {
        let target = phase as u32;
        loop {
            let current = self.value.load(Ordering::Acquire);
            if current >= target {
                return;
            }
            if self
                .value
                .compare_exchange(current, target, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.notify.notify_waiters();
                return;
            }
        }
    }

    /// Wait until the phase reaches at least `DoSubscribeOver`.
    pub async fn wait_ready(&self) {
        self.wait_at_least(Phase::DoSubscribeOver).await
    }

    /// Wait until the phase reaches at least `target`.
    pub async fn wait_at_least(&self, target: Phase) {
        loop {
            if self.current() >= target {
                return;
            }
            let notified = self.notify.notified();
            if self.current() >= target {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_ready_unblocks_after_advance() {
        let phase = PresencePhase::new();
        let waiter = {
            let phase = phase.clone();
            tokio::spawn(async move {
                phase.wait_ready().await;
            })
        };
        tokio::task::yield_now().await;
        phase.advance_to(Phase::DoOnlineStatusOver);
        phase.advance_to(Phase::DoSubscribeOver);
        waiter.await.expect("waiter task should complete");
    }

    #[test]
    fn advance_never_moves_backward() {
        let phase = PresencePhase::new();
        phase.advance_to(Phase::DoSubscribeOver);
        phase.advance_to(Phase::Begin);
        assert_eq!(phase.current(), Phase::DoSubscribeOver);
    }
}
