//! Shared submission state between producers and the scheduler loop.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::cancel::CancelSignal;
use crate::domain::QueuedTask;

/// Queue and active-task slot, guarded by a single mutex so that
/// "append then signal the active task" is race-free against the loop's
/// "pop then install a fresh signal".
///
/// Producers only append, purge, and read the active signal; every other
/// mutation belongs to the scheduler loop.
#[derive(Default)]
pub(crate) struct SubmissionState {
    /// FIFO of tasks not yet active. Never reordered.
    pub pending: VecDeque<QueuedTask>,

    /// Tasks removed by `purge`. Parked here so their outcome channels stay
    /// open and the submitters' tickets remain pending, matching the
    /// historical behavior of dropping queued work without settling it.
    pub abandoned: Vec<QueuedTask>,

    /// Cancellation signal of the currently active task, if any.
    pub active_cancel: Option<Arc<CancelSignal>>,

    /// Set at shutdown; rejects further submissions.
    pub closed: bool,
}

impl SubmissionState {
    /// Pop the next task and install a fresh cancellation signal for it.
    pub fn activate_next(&mut self) -> Option<(QueuedTask, Arc<CancelSignal>)> {
        let task = self.pending.pop_front()?;
        let cancel = Arc::new(CancelSignal::new());
        self.active_cancel = Some(Arc::clone(&cancel));
        Some((task, cancel))
    }

    /// Move every pending task into the abandoned list. Returns how many were
    /// removed.
    pub fn purge_pending(&mut self) -> usize {
        let drained = self.pending.len();
        self.abandoned.extend(self.pending.drain(..));
        drained
    }
}
