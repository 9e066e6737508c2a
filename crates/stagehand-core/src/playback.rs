//! Phase execution: turns one task payload into engine commands and waits,
//! racing natural completion against the applicable bound.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::cancel::CancelSignal;
use crate::domain::{Animation, Clip, PlaybackOutcome, PropSpec, Scenario};
use crate::error::StagehandError;
use crate::ports::{AnimationEngine, ClipCommand, PedHandle, PropHandle, ResourceLoader};

/// How long the loop sleeps when the queue is empty, and again after each
/// task before the post-playback task-clear.
pub(crate) const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Forced duration for enter/exit transition phases without an explicit one.
const FORCED_PHASE_MS: u64 = 1000;

/// Interval for polling the engine's is-playing / is-active queries.
const ENGINE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound on one phase of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhaseBound {
    Timed(Duration),
    /// No timeout: the phase ends when the engine stops reporting the clip,
    /// or when the task is cancelled.
    Indefinite,
}

/// Duration fallback chain for one phase. First source that applies wins:
/// explicit duration, then the forced transition duration (enter/exit), then
/// indefinite for repeating clips, then the clip's natural duration.
pub(crate) fn resolve_phase_bound(
    clip: &Clip,
    forced: bool,
    engine: &dyn AnimationEngine,
) -> PhaseBound {
    if let Some(ms) = clip.duration {
        PhaseBound::Timed(Duration::from_millis(ms))
    } else if forced {
        PhaseBound::Timed(Duration::from_millis(FORCED_PHASE_MS))
    } else if clip.options.repeat {
        PhaseBound::Indefinite
    } else {
        PhaseBound::Timed(Duration::from_millis(
            engine.clip_duration_ms(&clip.dictionary, &clip.name),
        ))
    }
}

pub(crate) fn clip_command(clip: &Clip, bound: PhaseBound) -> ClipCommand {
    ClipCommand {
        dictionary: clip.dictionary.clone(),
        name: clip.name.clone(),
        blend_in_speed: clip.blend_in_speed,
        blend_out_speed: clip.blend_out_speed,
        duration_ms: match bound {
            PhaseBound::Timed(limit) => Some(limit.as_millis() as u64),
            PhaseBound::Indefinite => None,
        },
        flags: clip.options.to_flags(),
        playback_rate: clip.playback_rate,
        lock_x: clip.lock_x,
        lock_y: clip.lock_y,
        lock_z: clip.lock_z,
    }
}

async fn clip_stopped(engine: &dyn AnimationEngine, ped: PedHandle, clip: &Clip) {
    while engine.is_clip_playing(ped, &clip.dictionary, &clip.name) {
        sleep(ENGINE_POLL_INTERVAL).await;
    }
}

async fn scenario_inactive(engine: &dyn AnimationEngine, ped: PedHandle, name: &str) {
    while engine.is_scenario_active(ped, name) {
        sleep(ENGINE_POLL_INTERVAL).await;
    }
}

/// Start one clip and wait it out.
///
/// A timed phase races clip completion against its timeout; cancellation is
/// only observed when the bound is indefinite, where it replaces the timeout.
async fn play_phase(
    engine: &dyn AnimationEngine,
    ped: PedHandle,
    clip: &Clip,
    forced: bool,
    cancel: &CancelSignal,
) -> Result<PlaybackOutcome, StagehandError> {
    let bound = resolve_phase_bound(clip, forced, engine);
    let command = clip_command(clip, bound);
    debug!(
        dictionary = %clip.dictionary,
        name = %clip.name,
        ?bound,
        "starting clip"
    );
    engine.play_clip(ped, &command)?;

    match bound {
        PhaseBound::Timed(limit) => {
            tokio::select! {
                _ = clip_stopped(engine, ped, clip) => {}
                _ = sleep(limit) => {}
            }
            Ok(PlaybackOutcome::Completed)
        }
        PhaseBound::Indefinite => {
            tokio::select! {
                _ = clip_stopped(engine, ped, clip) => Ok(PlaybackOutcome::Completed),
                _ = cancel.wait() => Ok(PlaybackOutcome::Cancelled),
            }
        }
    }
}

/// Drive the enter/base/exit state machine. Cancellation short-circuits
/// straight out; remaining phases are skipped.
pub(crate) async fn run_animation(
    engine: &dyn AnimationEngine,
    ped: PedHandle,
    animation: &Animation,
    cancel: &CancelSignal,
) -> Result<PlaybackOutcome, StagehandError> {
    if let Some(enter) = &animation.enter
        && play_phase(engine, ped, enter, true, cancel)
            .await?
            .was_cancelled()
    {
        return Ok(PlaybackOutcome::Cancelled);
    }

    if play_phase(engine, ped, &animation.base, false, cancel)
        .await?
        .was_cancelled()
    {
        return Ok(PlaybackOutcome::Cancelled);
    }

    if let Some(exit) = &animation.exit
        && play_phase(engine, ped, exit, true, cancel)
            .await?
            .was_cancelled()
    {
        return Ok(PlaybackOutcome::Cancelled);
    }

    Ok(PlaybackOutcome::Completed)
}

/// Start a scenario in place and wait for it to end, time out, or be
/// cancelled.
pub(crate) async fn run_scenario(
    engine: &dyn AnimationEngine,
    ped: PedHandle,
    scenario: &Scenario,
    cancel: &CancelSignal,
) -> Result<PlaybackOutcome, StagehandError> {
    engine.clear_tasks(ped);
    debug!(name = %scenario.name, duration = ?scenario.duration, "starting scenario");
    engine.start_scenario(ped, &scenario.name)?;

    match scenario.duration {
        Some(ms) => {
            tokio::select! {
                _ = scenario_inactive(engine, ped, &scenario.name) => {}
                _ = sleep(Duration::from_millis(ms)) => {}
            }
            Ok(PlaybackOutcome::Completed)
        }
        None => {
            tokio::select! {
                _ = scenario_inactive(engine, ped, &scenario.name) => Ok(PlaybackOutcome::Completed),
                _ = cancel.wait() => Ok(PlaybackOutcome::Cancelled),
            }
        }
    }
}

/// Stream in, spawn, and attach every prop of a task. Handles are pushed as
/// soon as they exist so a later failure still cleans up what was spawned.
pub(crate) async fn spawn_props(
    engine: &dyn AnimationEngine,
    loader: &dyn ResourceLoader,
    ped: PedHandle,
    specs: &[PropSpec],
    handles: &mut Vec<PropHandle>,
) -> Result<(), StagehandError> {
    for spec in specs {
        loader.load_model(&spec.model).await?;
        let position = engine.position_of(ped);
        let handle = engine.spawn_prop(&spec.model, position)?;
        handles.push(handle);
        engine.attach_prop(handle, ped, spec.bone, spec.position, spec.rotation)?;
    }
    Ok(())
}

/// Detach and destroy every recorded prop, regardless of how the task ended.
pub(crate) fn cleanup_props(engine: &dyn AnimationEngine, handles: &mut Vec<PropHandle>) {
    for handle in handles.drain(..) {
        engine.detach_prop(handle);
        engine.destroy_prop(handle);
    }
}
