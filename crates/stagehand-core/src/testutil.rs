//! Deterministic in-memory fakes for the engine and loader ports.
//!
//! Timing goes through `tokio::time::Instant` so tests driven by a paused
//! clock see clip and scenario lifetimes advance deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::{Duration, Instant};

use crate::domain::Vec3;
use crate::error::StagehandError;
use crate::ports::{AnimationEngine, ClipCommand, PedHandle, PropHandle, ResourceLoader};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineEvent {
    PlayClip {
        dictionary: String,
        name: String,
        flags: u32,
        duration_ms: Option<u64>,
    },
    StartScenario(String),
    ClearTasks,
    ClearSecondaryTask,
    SpawnProp {
        model: String,
        handle: i32,
    },
    AttachProp {
        handle: i32,
        bone: i32,
    },
    DetachProp(i32),
    DestroyProp(i32),
    ResetWeapon,
}

#[derive(Debug, Clone, Copy)]
enum Lifetime {
    /// Reported as playing/active until this instant.
    Until(Instant),
    /// Reported as playing/active until cleared.
    Forever,
}

impl Lifetime {
    fn is_live(self) -> bool {
        match self {
            Self::Until(end) => Instant::now() < end,
            Self::Forever => true,
        }
    }
}

#[derive(Default)]
struct EngineInner {
    events: Vec<EngineEvent>,
    /// Configured playback length per clip; unconfigured clips stop at once.
    clip_play_ms: HashMap<(String, String), Option<u64>>,
    playing: HashMap<(String, String), Lifetime>,
    natural_ms: HashMap<(String, String), u64>,
    /// Configured active time per scenario; unconfigured ones end at once.
    scenario_active_ms: HashMap<String, Option<u64>>,
    scenario: Option<(String, Lifetime)>,
    live_props: HashSet<i32>,
    next_prop: i32,
    fail_next_play: bool,
    fail_spawn: bool,
}

pub(crate) struct FakeEngine {
    ped: PedHandle,
    inner: Mutex<EngineInner>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            ped: PedHandle(7),
            inner: Mutex::new(EngineInner {
                next_prop: 100,
                ..Default::default()
            }),
        }
    }

    /// Report the clip as playing for `ms` after it starts.
    pub fn set_clip_play_ms(&self, dictionary: &str, name: &str, ms: u64) {
        self.inner
            .lock()
            .unwrap()
            .clip_play_ms
            .insert((dictionary.into(), name.into()), Some(ms));
    }

    /// Report the clip as playing until tasks are cleared.
    pub fn set_clip_looping(&self, dictionary: &str, name: &str) {
        self.inner
            .lock()
            .unwrap()
            .clip_play_ms
            .insert((dictionary.into(), name.into()), None);
    }

    pub fn set_natural_duration(&self, dictionary: &str, name: &str, ms: u64) {
        self.inner
            .lock()
            .unwrap()
            .natural_ms
            .insert((dictionary.into(), name.into()), ms);
    }

    pub fn set_scenario_active_ms(&self, name: &str, ms: u64) {
        self.inner
            .lock()
            .unwrap()
            .scenario_active_ms
            .insert(name.into(), Some(ms));
    }

    pub fn set_scenario_looping(&self, name: &str) {
        self.inner
            .lock()
            .unwrap()
            .scenario_active_ms
            .insert(name.into(), None);
    }

    pub fn fail_next_play(&self) {
        self.inner.lock().unwrap().fail_next_play = true;
    }

    pub fn fail_spawn(&self) {
        self.inner.lock().unwrap().fail_spawn = true;
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn played_clip_names(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::PlayClip { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn live_prop_count(&self) -> usize {
        self.inner.lock().unwrap().live_props.len()
    }

    pub fn count(&self, matches: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events().iter().filter(|event| matches(event)).count()
    }
}

impl AnimationEngine for FakeEngine {
    fn local_ped(&self) -> PedHandle {
        self.ped
    }

    fn position_of(&self, _ped: PedHandle) -> Vec3 {
        Vec3::new(12.0, 34.0, 56.0)
    }

    fn play_clip(&self, _ped: PedHandle, command: &ClipCommand) -> Result<(), StagehandError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_next_play {
            inner.fail_next_play = false;
            return Err(StagehandError::engine("play_clip", "injected failure"));
        }

        let key = (command.dictionary.clone(), command.name.clone());
        let lifetime = match inner.clip_play_ms.get(&key).copied().flatten() {
            Some(ms) => Lifetime::Until(Instant::now() + Duration::from_millis(ms)),
            None if inner.clip_play_ms.contains_key(&key) => Lifetime::Forever,
            None => Lifetime::Until(Instant::now()),
        };
        inner.playing.insert(key, lifetime);
        inner.events.push(EngineEvent::PlayClip {
            dictionary: command.dictionary.clone(),
            name: command.name.clone(),
            flags: command.flags,
            duration_ms: command.duration_ms,
        });
        Ok(())
    }

    fn is_clip_playing(&self, _ped: PedHandle, dictionary: &str, name: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .playing
            .get(&(dictionary.to_string(), name.to_string()))
            .is_some_and(|lifetime| lifetime.is_live())
    }

    fn clip_duration_ms(&self, dictionary: &str, name: &str) -> u64 {
        self.inner
            .lock()
            .unwrap()
            .natural_ms
            .get(&(dictionary.to_string(), name.to_string()))
            .copied()
            .unwrap_or(500)
    }

    fn start_scenario(&self, _ped: PedHandle, name: &str) -> Result<(), StagehandError> {
        let mut inner = self.inner.lock().unwrap();
        let lifetime = match inner.scenario_active_ms.get(name).copied().flatten() {
            Some(ms) => Lifetime::Until(Instant::now() + Duration::from_millis(ms)),
            None if inner.scenario_active_ms.contains_key(name) => Lifetime::Forever,
            None => Lifetime::Until(Instant::now()),
        };
        inner.scenario = Some((name.to_string(), lifetime));
        inner.events.push(EngineEvent::StartScenario(name.to_string()));
        Ok(())
    }

    fn is_scenario_active(&self, _ped: PedHandle, name: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .scenario
            .as_ref()
            .is_some_and(|(active, lifetime)| active == name && lifetime.is_live())
    }

    fn clear_tasks(&self, _ped: PedHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.playing.clear();
        inner.scenario = None;
        inner.events.push(EngineEvent::ClearTasks);
    }

    fn clear_secondary_task(&self, _ped: PedHandle) {
        self.inner
            .lock()
            .unwrap()
            .events
            .push(EngineEvent::ClearSecondaryTask);
    }

    fn spawn_prop(&self, model: &str, _position: Vec3) -> Result<PropHandle, StagehandError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_spawn {
            inner.fail_spawn = false;
            return Err(StagehandError::engine("spawn_prop", "injected failure"));
        }
        let handle = inner.next_prop;
        inner.next_prop += 1;
        inner.live_props.insert(handle);
        inner.events.push(EngineEvent::SpawnProp {
            model: model.to_string(),
            handle,
        });
        Ok(PropHandle(handle))
    }

    fn attach_prop(
        &self,
        prop: PropHandle,
        _ped: PedHandle,
        bone: i32,
        _position: Vec3,
        _rotation: Vec3,
    ) -> Result<(), StagehandError> {
        self.inner.lock().unwrap().events.push(EngineEvent::AttachProp {
            handle: prop.0,
            bone,
        });
        Ok(())
    }

    fn detach_prop(&self, prop: PropHandle) {
        self.inner
            .lock()
            .unwrap()
            .events
            .push(EngineEvent::DetachProp(prop.0));
    }

    fn destroy_prop(&self, prop: PropHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.live_props.remove(&prop.0);
        inner.events.push(EngineEvent::DestroyProp(prop.0));
    }

    fn reset_weapon(&self, _ped: PedHandle) {
        self.inner.lock().unwrap().events.push(EngineEvent::ResetWeapon);
    }
}

#[derive(Default)]
pub(crate) struct FakeLoader {
    loaded: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_resource(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    fn load(&self, name: &str) -> Result<(), StagehandError> {
        if self.failing.lock().unwrap().contains(name) {
            return Err(StagehandError::resource_load(name, "injected failure"));
        }
        self.loaded.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

#[async_trait]
impl ResourceLoader for FakeLoader {
    async fn load_animation_dictionary(&self, dictionary: &str) -> Result<(), StagehandError> {
        self.load(dictionary)
    }

    async fn load_model(&self, model: &str) -> Result<(), StagehandError> {
        self.load(model)
    }
}
