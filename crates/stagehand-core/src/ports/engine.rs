//! Animation engine port.
//!
//! The scheduler never talks to engine natives directly; everything goes
//! through this trait so the loop can run against a fake with deterministic
//! timing. Commands are fire-and-forget: the scheduler owns all waiting and
//! polls the `is_*` queries at its own interval.

use crate::domain::Vec3;
use crate::error::StagehandError;

/// Engine handle for a character (ped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PedHandle(pub i32);

/// Engine handle for a spawned prop entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropHandle(pub i32);

/// Fully resolved arguments for a start-animation command. The duration is
/// `None` when playback is unbounded; adapters map that to the engine's
/// indefinite sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipCommand {
    pub dictionary: String,
    pub name: String,
    pub blend_in_speed: f32,
    pub blend_out_speed: f32,
    pub duration_ms: Option<u64>,
    pub flags: u32,
    pub playback_rate: f32,
    pub lock_x: bool,
    pub lock_y: bool,
    pub lock_z: bool,
}

pub trait AnimationEngine: Send + Sync {
    /// The locally controlled character.
    fn local_ped(&self) -> PedHandle;

    /// Current world position of a character, used as prop spawn origin.
    fn position_of(&self, ped: PedHandle) -> Vec3;

    fn play_clip(&self, ped: PedHandle, command: &ClipCommand) -> Result<(), StagehandError>;

    fn is_clip_playing(&self, ped: PedHandle, dictionary: &str, name: &str) -> bool;

    /// Natural duration of a clip in milliseconds.
    fn clip_duration_ms(&self, dictionary: &str, name: &str) -> u64;

    fn start_scenario(&self, ped: PedHandle, name: &str) -> Result<(), StagehandError>;

    fn is_scenario_active(&self, ped: PedHandle, name: &str) -> bool;

    /// Clear every task on the character, including in-flight playback.
    fn clear_tasks(&self, ped: PedHandle);

    /// Clear only the secondary (upper-body) task slot.
    fn clear_secondary_task(&self, ped: PedHandle);

    /// Spawn a non-networked, session-owned prop at `position`.
    fn spawn_prop(&self, model: &str, position: Vec3) -> Result<PropHandle, StagehandError>;

    /// Rigidly attach a spawned prop to a skeleton bone.
    fn attach_prop(
        &self,
        prop: PropHandle,
        ped: PedHandle,
        bone: i32,
        position: Vec3,
        rotation: Vec3,
    ) -> Result<(), StagehandError>;

    fn detach_prop(&self, prop: PropHandle);

    fn destroy_prop(&self, prop: PropHandle);

    /// Force the character's equipped weapon back to the unarmed baseline.
    fn reset_weapon(&self, ped: PedHandle);
}
