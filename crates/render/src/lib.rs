//! Backend-independent render pipeline.
//!
//! Pre-render passes publish per-frame shared state, then render modules
//! draw each camera-bound viewport in priority order into a recording
//! framebuffer. Module failures never stop the frame from presenting.
//!
//! # Invariants
//! - The pipeline is in [`RenderPhase::Idle`] outside of `render_frame`.
//! - Every frame that starts reaches present.
//! - No resource binding outlives the module that took it.

mod binding;
mod framebuffer;
mod module;
pub mod modules;
mod pipeline;
mod viewport;

pub use binding::{BindGuard, BindingTracker};
pub use framebuffer::{DrawCommand, Framebuffer};
pub use module::{PreRenderPass, RenderError, RenderModule, SharedRenderState};
pub use pipeline::{RenderPhase, RenderPipeline};
pub use viewport::Viewport;
