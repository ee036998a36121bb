//! Frame driver tying the component store, input, physics and rendering
//! together. One [`App`] owns one [`Scene`] and advances it frame by
//! frame; failures within a frame are reported, never fatal.

mod app;
mod scene;
mod systems;

pub use app::{App, FrameReport};
pub use scene::Scene;
pub use systems::{CameraControllerSystem, RotatorSystem};
