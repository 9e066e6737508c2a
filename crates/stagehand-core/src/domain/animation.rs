//! Animation descriptors: multi-phase sequences, clips, and option flags.

use serde::{Deserialize, Serialize};

use super::prop::PropSpec;

/// A full animation sequence. `enter` and `exit` are optional transition
/// phases around the required `base` clip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter: Option<Clip>,
    pub base: Clip,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<Clip>,

    /// Transient props spawned for the lifetime of this playback.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<PropSpec>,
}

impl Animation {
    /// Distinct dictionaries referenced by the sequence, in phase order.
    /// These must be streamed in before the task is enqueued.
    pub fn dictionaries(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(3);
        for clip in [self.enter.as_ref(), Some(&self.base), self.exit.as_ref()]
            .into_iter()
            .flatten()
        {
            if !out.contains(&clip.dictionary.as_str()) {
                out.push(&clip.dictionary);
            }
        }
        out
    }
}

/// One phase of an animation: a named clip inside a dictionary plus its
/// playback parameters. Field defaults match what callers omit in practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Clip {
    pub dictionary: String,
    pub name: String,

    /// Explicit playback duration in milliseconds. Wins over every other
    /// duration source when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default = "default_blend_speed")]
    pub blend_in_speed: f32,
    #[serde(default = "default_blend_speed")]
    pub blend_out_speed: f32,
    pub playback_rate: f32,

    pub lock_x: bool,
    pub lock_y: bool,
    pub lock_z: bool,

    pub options: AnimationOptions,
}

fn default_blend_speed() -> f32 {
    1.0
}

impl Default for Clip {
    fn default() -> Self {
        Self {
            dictionary: String::new(),
            name: String::new(),
            duration: None,
            blend_in_speed: default_blend_speed(),
            blend_out_speed: default_blend_speed(),
            playback_rate: 0.0,
            lock_x: false,
            lock_y: false,
            lock_z: false,
            options: AnimationOptions::default(),
        }
    }
}

impl Clip {
    pub fn new(dictionary: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dictionary: dictionary.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Playback option flags for a clip.
///
/// The engine consumes these as a packed bitmask; the bit assignment below is
/// an engine protocol constant and must not change. Value 8 is unused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationOptions {
    pub repeat: bool,
    pub freeze_last_frame: bool,
    pub freeze_last_frame_controllable: bool,
    pub only_upper_body: bool,
    pub enable_player_control: bool,
    pub cancellable: bool,
}

const FLAG_REPEAT: u32 = 1;
const FLAG_FREEZE_LAST_FRAME: u32 = 2;
const FLAG_FREEZE_LAST_FRAME_CONTROLLABLE: u32 = 4;
const FLAG_ONLY_UPPER_BODY: u32 = 16;
const FLAG_ENABLE_PLAYER_CONTROL: u32 = 32;
const FLAG_CANCELLABLE: u32 = 64;

impl AnimationOptions {
    /// Pack into the engine bitmask.
    pub fn to_flags(self) -> u32 {
        let mut flags = 0;
        if self.repeat {
            flags |= FLAG_REPEAT;
        }
        if self.freeze_last_frame {
            flags |= FLAG_FREEZE_LAST_FRAME;
        }
        if self.freeze_last_frame_controllable {
            flags |= FLAG_FREEZE_LAST_FRAME_CONTROLLABLE;
        }
        if self.only_upper_body {
            flags |= FLAG_ONLY_UPPER_BODY;
        }
        if self.enable_player_control {
            flags |= FLAG_ENABLE_PLAYER_CONTROL;
        }
        if self.cancellable {
            flags |= FLAG_CANCELLABLE;
        }
        flags
    }

    /// Inverse of [`to_flags`](Self::to_flags); unknown bits are ignored.
    pub fn from_flags(flags: u32) -> Self {
        Self {
            repeat: flags & FLAG_REPEAT != 0,
            freeze_last_frame: flags & FLAG_FREEZE_LAST_FRAME != 0,
            freeze_last_frame_controllable: flags & FLAG_FREEZE_LAST_FRAME_CONTROLLABLE != 0,
            only_upper_body: flags & FLAG_ONLY_UPPER_BODY != 0,
            enable_player_control: flags & FLAG_ENABLE_PLAYER_CONTROL != 0,
            cancellable: flags & FLAG_CANCELLABLE != 0,
        }
    }
}
