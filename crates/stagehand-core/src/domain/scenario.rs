use serde::{Deserialize, Serialize};

/// A scripted ambient behavior loop, played in place. Unlike an animation it
/// has no sub-phases and no dictionary to preload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,

    /// Explicit playback duration in milliseconds. Without it the scenario
    /// runs until the engine reports it inactive or the task is cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration = Some(duration_ms);
        self
    }
}
