//! Queued playback tasks and their outcome channel.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::animation::Animation;
use super::scenario::Scenario;
use crate::error::StagehandError;

/// What a queued task plays back.
#[derive(Debug, Clone)]
pub enum TaskPayload {
    Animation(Animation),
    Scenario(Scenario),
}

impl TaskPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Animation(_) => "animation",
            Self::Scenario(_) => "scenario",
        }
    }
}

/// Per-task playback options, merged with defaults at submission time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayOptions {
    /// Force the character back to unarmed once playback ends.
    pub reset_weapon: bool,

    /// Skip the full task-clear after playback (the secondary task slot is
    /// always cleared).
    pub no_clear_ped_task: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            reset_weapon: true,
            no_clear_ped_task: false,
        }
    }
}

/// How a task's playback ended. Cancellation is a normal outcome, not an
/// error: a newer submission or an explicit stop won the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

impl PlaybackOutcome {
    pub fn was_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub(crate) type OutcomeSender = oneshot::Sender<Result<PlaybackOutcome, StagehandError>>;
pub(crate) type OutcomeReceiver = oneshot::Receiver<Result<PlaybackOutcome, StagehandError>>;

/// A task as it sits in the queue: payload, options, and the single-shot
/// outcome channel back to the submitter.
#[derive(Debug)]
pub(crate) struct QueuedTask {
    pub payload: TaskPayload,
    pub options: PlayOptions,
    pub outcome: OutcomeSender,
}

/// Handle returned by a submission; awaiting it yields the task's outcome.
///
/// A ticket whose task is dropped at shutdown observes
/// [`StagehandError::Shutdown`]. A ticket whose task was purged stays pending
/// forever (see `AnimationScheduler::purge`).
#[derive(Debug)]
pub struct PlaybackTicket {
    pub(crate) rx: OutcomeReceiver,
}

impl PlaybackTicket {
    pub async fn outcome(self) -> Result<PlaybackOutcome, StagehandError> {
        self.rx.await.map_err(|_| StagehandError::Shutdown)?
    }
}
