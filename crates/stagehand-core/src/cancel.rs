//! One-shot cancellation signal for the active task.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-shot wake primitive tied to a single active task.
///
/// Design:
/// - A fresh signal is allocated when a task becomes active and dropped when
///   it finishes; signals are never reused across tasks.
/// - `signal()` is idempotent and may be called from any producer context.
/// - `wait()` is only awaited by the scheduler loop at its suspension points;
///   a signal that already fired completes immediately.
#[derive(Debug, Default)]
pub struct CancelSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag cancellation and wake every current waiter. Later waiters observe
    /// the flag and return immediately.
    pub fn signal(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_signalled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Wait until `signal()` has been called.
    pub async fn wait(&self) {
        loop {
            // Register interest before re-checking the flag so a signal that
            // lands in between is not lost.
            let notified = self.notify.notified();
            if self.fired.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}
