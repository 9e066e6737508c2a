//! Demo driver: runs the scheduler against an in-memory engine that fakes
//! playback with timers, and walks through submission, cancellation, props,
//! and shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::{Duration, Instant, sleep};
use tracing::info;

use stagehand_core::domain::{Animation, PlayOptions, Scenario, Vec3};
use stagehand_core::ports::{AnimationEngine, ClipCommand, PedHandle, PropHandle, ResourceLoader};
use stagehand_core::{AnimationScheduler, StagehandError};

/// Engine fake: a started clip "plays" for its commanded duration, or
/// forever when the command is unbounded; scenarios run until cleared.
#[derive(Default)]
struct DemoEngine {
    state: Mutex<DemoState>,
}

#[derive(Default)]
struct DemoState {
    playing: HashMap<(String, String), Option<Instant>>,
    scenario: Option<String>,
    next_prop: i32,
}

impl AnimationEngine for DemoEngine {
    fn local_ped(&self) -> PedHandle {
        PedHandle(1)
    }

    fn position_of(&self, _ped: PedHandle) -> Vec3 {
        Vec3::new(215.8, -810.1, 30.7)
    }

    fn play_clip(&self, _ped: PedHandle, command: &ClipCommand) -> Result<(), StagehandError> {
        info!(
            dictionary = %command.dictionary,
            name = %command.name,
            flags = command.flags,
            duration = ?command.duration_ms,
            "play clip"
        );
        let end = command
            .duration_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        self.state
            .lock()
            .unwrap()
            .playing
            .insert((command.dictionary.clone(), command.name.clone()), end);
        Ok(())
    }

    fn is_clip_playing(&self, _ped: PedHandle, dictionary: &str, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .playing
            .get(&(dictionary.to_string(), name.to_string()))
            .is_some_and(|end| end.is_none_or(|end| Instant::now() < end))
    }

    fn clip_duration_ms(&self, _dictionary: &str, _name: &str) -> u64 {
        1500
    }

    fn start_scenario(&self, _ped: PedHandle, name: &str) -> Result<(), StagehandError> {
        info!(name, "start scenario");
        self.state.lock().unwrap().scenario = Some(name.to_string());
        Ok(())
    }

    fn is_scenario_active(&self, _ped: PedHandle, name: &str) -> bool {
        self.state.lock().unwrap().scenario.as_deref() == Some(name)
    }

    fn clear_tasks(&self, _ped: PedHandle) {
        let mut state = self.state.lock().unwrap();
        state.playing.clear();
        state.scenario = None;
        info!("clear tasks");
    }

    fn clear_secondary_task(&self, _ped: PedHandle) {
        info!("clear secondary task");
    }

    fn spawn_prop(&self, model: &str, position: Vec3) -> Result<PropHandle, StagehandError> {
        let mut state = self.state.lock().unwrap();
        state.next_prop += 1;
        info!(model, handle = state.next_prop, ?position, "spawn prop");
        Ok(PropHandle(state.next_prop))
    }

    fn attach_prop(
        &self,
        prop: PropHandle,
        _ped: PedHandle,
        bone: i32,
        _position: Vec3,
        _rotation: Vec3,
    ) -> Result<(), StagehandError> {
        info!(handle = prop.0, bone, "attach prop");
        Ok(())
    }

    fn detach_prop(&self, prop: PropHandle) {
        info!(handle = prop.0, "detach prop");
    }

    fn destroy_prop(&self, prop: PropHandle) {
        info!(handle = prop.0, "destroy prop");
    }

    fn reset_weapon(&self, _ped: PedHandle) {
        info!("reset weapon");
    }
}

/// Loader fake: every resource "streams in" after a short delay.
struct DemoLoader;

#[async_trait]
impl ResourceLoader for DemoLoader {
    async fn load_animation_dictionary(&self, dictionary: &str) -> Result<(), StagehandError> {
        sleep(Duration::from_millis(50)).await;
        info!(dictionary, "dictionary loaded");
        Ok(())
    }

    async fn load_model(&self, model: &str) -> Result<(), StagehandError> {
        sleep(Duration::from_millis(50)).await;
        info!(model, "model loaded");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let scheduler = AnimationScheduler::spawn(Arc::new(DemoEngine::default()), Arc::new(DemoLoader));

    // A repeating emote with a prop; it plays until something cancels it.
    let emote: Animation = serde_json::from_value(json!({
        "base": {
            "dictionary": "amb@world_human_guard_patrol@male@base",
            "name": "base",
            "blendInSpeed": 8.0,
            "blendOutSpeed": 8.0,
            "options": { "repeat": true }
        },
        "props": [
            { "model": "prop_cs_burger_01", "bone": 18905, "position": { "x": 0.13, "y": 0.05, "z": 0.02 } }
        ]
    }))
    .expect("demo payload is well-formed");

    let first = scheduler
        .play_animation(emote, PlayOptions::default())
        .await
        .expect("demo loader never fails");

    // Submitting more work flags the emote's cancellation; the scenario
    // then runs for its explicit duration.
    sleep(Duration::from_millis(1500)).await;
    let second = scheduler
        .play_scenario(
            Scenario::new("PROP_HUMAN_SEAT_BENCH").with_duration(2000),
            PlayOptions::default(),
        )
        .await
        .expect("scheduler is running");

    println!("emote outcome:    {:?}", first.outcome().await);
    println!("scenario outcome: {:?}", second.outcome().await);
    println!("status:           {:?}", scheduler.status().await);

    scheduler.shutdown_and_join().await;
}
