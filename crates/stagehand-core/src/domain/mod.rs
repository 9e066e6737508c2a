//! Domain model: animation/scenario descriptors, playback options, tasks.

pub mod animation;
pub mod prop;
pub mod scenario;
pub mod task;

pub use animation::{Animation, AnimationOptions, Clip};
pub use prop::{PropSpec, Vec3};
pub use scenario::Scenario;
pub use task::{PlayOptions, PlaybackOutcome, PlaybackTicket, TaskPayload};

pub(crate) use task::{OutcomeReceiver, QueuedTask};
