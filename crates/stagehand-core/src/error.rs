use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagehandError {
    /// A dictionary or model could not be streamed in. Surfaced to the
    /// submitter before the task is enqueued.
    #[error("resource {resource} failed to load: {reason}")]
    ResourceLoad { resource: String, reason: String },

    /// An engine command failed while a task was active. The task's ticket
    /// resolves with this error; the loop keeps running.
    #[error("engine command {command} failed: {reason}")]
    Engine {
        command: &'static str,
        reason: String,
    },

    /// The scheduler is shut down: no new submissions, and pending tickets
    /// whose task will never run observe this.
    #[error("scheduler is shut down")]
    Shutdown,
}

impl StagehandError {
    pub fn resource_load(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn engine(command: &'static str, reason: impl Into<String>) -> Self {
        Self::Engine {
            command,
            reason: reason.into(),
        }
    }
}
