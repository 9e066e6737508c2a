//! Ports (interfaces) to the surrounding engine.
//!
//! These are the seams for swapping the real engine bindings for fakes in
//! tests and in the demo driver.

mod engine;
mod loader;

pub use engine::{AnimationEngine, ClipCommand, PedHandle, PropHandle};
pub use loader::ResourceLoader;
