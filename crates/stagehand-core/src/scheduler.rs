//! The animation task scheduler: a single cooperative consumer that
//! serializes playback of animations and scenarios.
//!
//! Producers only ever append to the queue and signal the active task; the
//! loop owns the active slot, the prop lifecycle, and outcome resolution. A
//! new submission never preempts the in-flight task or jumps the queue - it
//! can only make the active task race its cancellation signal.

use std::sync::Arc;

use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::cancel::CancelSignal;
use crate::domain::{
    Animation, PlayOptions, PlaybackOutcome, PlaybackTicket, QueuedTask, Scenario, TaskPayload,
};
use crate::error::StagehandError;
use crate::playback::{
    IDLE_POLL_INTERVAL, SETTLE_DELAY, cleanup_props, run_animation, run_scenario, spawn_props,
};
use crate::ports::{AnimationEngine, PedHandle, PropHandle, ResourceLoader};
use crate::queue::SubmissionState;

/// Snapshot of the scheduler for observability.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct SchedulerStatus {
    pub queued: usize,
    pub active: bool,
}

/// Owning handle for the scheduler loop. One instance per character; pass it
/// by reference to producers.
pub struct AnimationScheduler {
    state: Arc<Mutex<SubmissionState>>,
    loader: Arc<dyn ResourceLoader>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl AnimationScheduler {
    /// Start the consumer loop on the current tokio runtime.
    pub fn spawn(engine: Arc<dyn AnimationEngine>, loader: Arc<dyn ResourceLoader>) -> Self {
        let state = Arc::new(Mutex::new(SubmissionState::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(scheduler_loop(
            Arc::clone(&state),
            engine,
            Arc::clone(&loader),
            shutdown_rx,
        ));

        Self {
            state,
            loader,
            shutdown_tx,
            join,
        }
    }

    /// Queue an animation sequence for playback.
    ///
    /// Every distinct dictionary the sequence references is loaded first; a
    /// load failure surfaces here and the task is never enqueued.
    pub async fn play_animation(
        &self,
        animation: Animation,
        options: PlayOptions,
    ) -> Result<PlaybackTicket, StagehandError> {
        for dictionary in animation.dictionaries() {
            if let Err(err) = self.loader.load_animation_dictionary(dictionary).await {
                warn!(%dictionary, %err, "dictionary load failed, dropping submission");
                return Err(err);
            }
        }

        self.enqueue(TaskPayload::Animation(animation), options).await
    }

    /// Queue a scenario for playback. Scenarios have nothing to preload.
    pub async fn play_scenario(
        &self,
        scenario: Scenario,
        options: PlayOptions,
    ) -> Result<PlaybackTicket, StagehandError> {
        self.enqueue(TaskPayload::Scenario(scenario), options).await
    }

    /// Signal cancellation of the active task, if any.
    pub async fn stop(&self) {
        let cancel = self.state.lock().await.active_cancel.clone();
        if let Some(cancel) = cancel {
            cancel.signal();
        }
    }

    /// Drop every queued (not yet active) task and signal the active one.
    ///
    /// Purged tasks are parked, not settled: their submitters' tickets stay
    /// pending forever. This mirrors long-standing behavior that callers
    /// depend on; see DESIGN.md before changing it.
    pub async fn purge(&self) {
        let cancel = {
            let mut state = self.state.lock().await;
            let purged = state.purge_pending();
            if purged > 0 {
                debug!(purged, "purged queued tasks");
            }
            state.active_cancel.clone()
        };
        if let Some(cancel) = cancel {
            cancel.signal();
        }
    }

    /// Stop accepting submissions and ask the loop to exit once the current
    /// task finishes. The active task is signalled so an indefinite playback
    /// does not stall shutdown.
    pub async fn request_shutdown(&self) {
        {
            let mut state = self.state.lock().await;
            state.closed = true;
            if let Some(cancel) = &state.active_cancel {
                cancel.signal();
            }
        }
        let _ = self.shutdown_tx.send(true);
    }

    /// Shut down and wait for the loop to finish.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown().await;
        let _ = self.join.await;
    }

    pub async fn status(&self) -> SchedulerStatus {
        let state = self.state.lock().await;
        SchedulerStatus {
            queued: state.pending.len(),
            active: state.active_cancel.is_some(),
        }
    }

    async fn enqueue(
        &self,
        payload: TaskPayload,
        options: PlayOptions,
    ) -> Result<PlaybackTicket, StagehandError> {
        let (tx, rx) = oneshot::channel();
        let cancel = {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(StagehandError::Shutdown);
            }
            debug!(kind = payload.kind(), queued = state.pending.len(), "task queued");
            state.pending.push_back(QueuedTask {
                payload,
                options,
                outcome: tx,
            });
            state.active_cancel.clone()
        };

        // Flag the in-flight task outside the lock. This never removes
        // anything from the queue.
        if let Some(cancel) = cancel {
            cancel.signal();
        }

        Ok(PlaybackTicket { rx })
    }
}

async fn scheduler_loop(
    state: Arc<Mutex<SubmissionState>>,
    engine: Arc<dyn AnimationEngine>,
    loader: Arc<dyn ResourceLoader>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    debug!("animation scheduler started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let activated = state.lock().await.activate_next();
        let Some((task, cancel)) = activated else {
            tokio::select! {
                _ = shutdown_rx.changed() => {}
                _ = sleep(IDLE_POLL_INTERVAL) => {}
            }
            continue;
        };

        let options = task.options;
        run_task(engine.as_ref(), loader.as_ref(), task, &cancel).await;

        state.lock().await.active_cancel = None;
        drop(cancel);

        // Settle, then clear whatever the engine is still doing with the
        // character before the next task starts.
        sleep(SETTLE_DELAY).await;
        let ped = engine.local_ped();
        if !options.no_clear_ped_task {
            engine.clear_tasks(ped);
        }
        engine.clear_secondary_task(ped);
    }

    // Tasks still queued at shutdown are dropped; their tickets observe
    // the closed channel.
    state.lock().await.pending.clear();
    debug!("animation scheduler stopped");
}

/// Execute one task inside a recoverable boundary: an engine failure fails
/// this task's ticket and is logged, but never kills the loop. Props are
/// cleaned up whatever the outcome.
async fn run_task(
    engine: &dyn AnimationEngine,
    loader: &dyn ResourceLoader,
    task: QueuedTask,
    cancel: &CancelSignal,
) {
    let ped = engine.local_ped();
    let mut props = Vec::new();

    let result = execute_payload(engine, loader, ped, &task, &mut props, cancel).await;

    match &result {
        Ok(outcome) => {
            debug!(
                kind = task.payload.kind(),
                cancelled = outcome.was_cancelled(),
                "playback finished"
            );
            if task.options.reset_weapon {
                engine.reset_weapon(ped);
            }
        }
        Err(err) => {
            error!(kind = task.payload.kind(), %err, "playback failed");
        }
    }

    // The submitter may have dropped its ticket; that is not our problem.
    let _ = task.outcome.send(result);

    cleanup_props(engine, &mut props);
}

async fn execute_payload(
    engine: &dyn AnimationEngine,
    loader: &dyn ResourceLoader,
    ped: PedHandle,
    task: &QueuedTask,
    props: &mut Vec<PropHandle>,
    cancel: &CancelSignal,
) -> Result<PlaybackOutcome, StagehandError> {
    match &task.payload {
        TaskPayload::Animation(animation) => {
            spawn_props(engine, loader, ped, &animation.props, props).await?;
            run_animation(engine, ped, animation, cancel).await
        }
        TaskPayload::Scenario(scenario) => run_scenario(engine, ped, scenario, cancel).await,
    }
}
