//! stagehand-core
//!
//! A single-consumer, multi-producer scheduler for character animation and
//! ambient scenario playback. Producers submit descriptors and get a ticket;
//! one cooperative loop plays them back in FIFO order, at most one at a time,
//! with cooperative cancellation, multi-phase (enter/base/exit) sequences,
//! and transient prop entities tied to each task's lifetime.
//!
//! Module layout:
//! - **domain**: descriptors, options, tasks, outcomes
//! - **ports**: engine adapter + resource loader seams
//! - **cancel**: per-task one-shot cancellation signal
//! - **scheduler**: submission API and the consumer loop

pub mod cancel;
pub mod domain;
pub mod error;
pub mod ports;
pub mod scheduler;

mod playback;
mod queue;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::StagehandError;
pub use scheduler::{AnimationScheduler, SchedulerStatus};
