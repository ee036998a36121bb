use crate::binding::BindingTracker;
use crate::framebuffer::Framebuffer;
use crate::viewport::Viewport;
use vesta_assets::AssetId;
use vesta_ecs::Ecs;

/// Errors from the render pipeline.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    /// Out-of-range viewport lookups never degrade to a default.
    #[error("viewport index {index} out of range ({len} viewports)")]
    InvalidViewport { index: usize, len: usize },
    #[error("render module {module} failed: {message}")]
    Module {
        module: &'static str,
        message: String,
    },
}

/// State published by pre-render passes and consumed by render modules
/// within the same frame.
#[derive(Debug, Default)]
pub struct SharedRenderState {
    /// Depth map produced this frame, if a depth pass ran.
    pub last_depth_map: Option<AssetId>,
    /// Index of the viewport currently being rendered. `None` outside the
    /// viewport loop (pre-passes see `None`).
    pub active_viewport: Option<usize>,
    pub bindings: BindingTracker,
}

/// Runs once per frame before any viewport is rendered.
pub trait PreRenderPass {
    fn name(&self) -> &'static str;

    fn run(&mut self, ecs: &Ecs, state: &mut SharedRenderState) -> Result<(), RenderError>;
}

/// Draws into a viewport. Modules run in ascending priority order, once
/// per viewport per frame.
pub trait RenderModule {
    fn name(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> i32;

    fn render(
        &mut self,
        ecs: &Ecs,
        viewport: &Viewport,
        framebuffer: &mut Framebuffer,
        state: &mut SharedRenderState,
    ) -> Result<(), RenderError>;
}
