use async_trait::async_trait;

use crate::error::StagehandError;

/// Resource streaming port. Loading is asynchronous on real engines: a
/// request is issued and the resource becomes usable some frames later.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Ensure an animation dictionary is loaded before any of its clips play.
    async fn load_animation_dictionary(&self, dictionary: &str) -> Result<(), StagehandError>;

    /// Ensure a prop model is loaded before it is spawned.
    async fn load_model(&self, model: &str) -> Result<(), StagehandError>;
}
