//! Cooperative cancellation for runs scoped to a consuming view's lifetime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Abort signal shared between callers and in-flight runs.
///
/// Once a signal is aborted, run callbacks must no longer mutate store state.
#[derive(Clone, Debug)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Controller that owns the underlying signal; dropped with the view.
#[derive(Clone, Debug)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self {
            signal: AbortSignal {
                flag: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    pub fn abort(&self) {
        self.signal.abort();
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_observes_controller_abort() {
        let controller = AbortController::new();
        let signal = controller.signal();
        assert!(!signal.is_aborted());
        controller.abort();
        assert!(signal.is_aborted());
    }

    #[test]
    fn cloned_signals_share_state() {
        let controller = AbortController::new();
        let a = controller.signal();
        let b = a.clone();
        a.abort();
        assert!(b.is_aborted());
    }
}
