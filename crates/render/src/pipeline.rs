use crate::framebuffer::Framebuffer;
use crate::module::{PreRenderPass, RenderError, RenderModule, SharedRenderState};
use crate::viewport::Viewport;
use vesta_common::Color;
use vesta_ecs::Ecs;

/// Where the pipeline is within a frame. Outside of `render_frame` the
/// phase is always `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
    #[default]
    Idle,
    Clearing,
    ViewportRendering,
    Present,
}

/// Drives pre-render passes and render modules over all viewports.
///
/// Module failures are collected, never fatal: the frame always reaches
/// present so one bad module cannot freeze the output.
pub struct RenderPipeline {
    modules: Vec<Box<dyn RenderModule>>,
    pre_passes: Vec<Box<dyn PreRenderPass>>,
    viewports: Vec<Viewport>,
    active_viewport: Option<usize>,
    phase: RenderPhase,
    framebuffer: Framebuffer,
    shared: SharedRenderState,
    clear_color: Color,
}

impl RenderPipeline {
    /// The pipeline renders into a target it does not create; the backend
    /// hands in its swapchain stand-in here.
    pub fn new(framebuffer: Framebuffer) -> Self {
        Self {
            modules: Vec::new(),
            pre_passes: Vec::new(),
            viewports: Vec::new(),
            active_viewport: None,
            phase: RenderPhase::Idle,
            framebuffer,
            shared: SharedRenderState::default(),
            clear_color: Color::BLACK,
        }
    }

    /// Insert a module keeping the list sorted by ascending priority.
    /// Equal priorities keep insertion order.
    pub fn add_module(&mut self, module: Box<dyn RenderModule>) {
        let index = self
            .modules
            .partition_point(|m| m.priority() <= module.priority());
        self.modules.insert(index, module);
    }

    pub fn add_pre_pass(&mut self, pass: Box<dyn PreRenderPass>) {
        self.pre_passes.push(pass);
    }

    pub fn add_viewport(&mut self, viewport: Viewport) -> usize {
        self.viewports.push(viewport);
        self.viewports.len() - 1
    }

    pub fn viewport_count(&self) -> usize {
        self.viewports.len()
    }

    pub fn get_viewport(&self, index: usize) -> Result<&Viewport, RenderError> {
        self.viewports
            .get(index)
            .ok_or(RenderError::InvalidViewport {
                index,
                len: self.viewports.len(),
            })
    }

    pub fn get_viewport_mut(&mut self, index: usize) -> Result<&mut Viewport, RenderError> {
        let len = self.viewports.len();
        self.viewports
            .get_mut(index)
            .ok_or(RenderError::InvalidViewport { index, len })
    }

    /// The viewport currently or most recently designated active. Managed
    /// by the render loop: each viewport is active while its modules run,
    /// and the designation is restored to the first viewport afterwards.
    pub fn active_viewport(&self) -> Option<usize> {
        self.active_viewport
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn shared_state(&self) -> &SharedRenderState {
        &self.shared
    }

    /// Render one frame: clear, pre-passes, every module over every
    /// viewport with a bound camera, then present. Returns the failures
    /// of this frame; the frame is presented regardless.
    pub fn render_frame(&mut self, ecs: &Ecs) -> Vec<RenderError> {
        let mut errors = Vec::new();

        self.phase = RenderPhase::Clearing;
        self.framebuffer.clear(self.clear_color);
        self.shared.last_depth_map = None;
        self.shared.active_viewport = None;

        for pass in &mut self.pre_passes {
            if let Err(error) = pass.run(ecs, &mut self.shared) {
                tracing::warn!(pass = pass.name(), %error, "pre-render pass failed");
                errors.push(error);
            }
            Self::check_bindings(pass.name(), &mut self.shared);
        }

        self.phase = RenderPhase::ViewportRendering;
        for (index, viewport) in self.viewports.iter().enumerate() {
            if viewport.camera().is_none() {
                tracing::debug!(index, "viewport without camera skipped");
                continue;
            }
            self.active_viewport = Some(index);
            self.shared.active_viewport = Some(index);
            for module in &mut self.modules {
                if let Err(error) =
                    module.render(ecs, viewport, &mut self.framebuffer, &mut self.shared)
                {
                    tracing::warn!(module = module.name(), %error, "render module failed");
                    errors.push(error);
                }
                Self::check_bindings(module.name(), &mut self.shared);
            }
        }
        // Restore the designation to the first viewport once the loop is
        // done, matching what a windowing backend expects between frames.
        self.active_viewport = (!self.viewports.is_empty()).then_some(0);
        self.shared.active_viewport = None;

        self.phase = RenderPhase::Present;
        self.framebuffer.present();
        self.phase = RenderPhase::Idle;
        errors
    }

    fn check_bindings(owner: &'static str, shared: &mut SharedRenderState) {
        if !shared.bindings.is_clean() {
            tracing::error!(owner, leaked = ?shared.bindings.leaked(), "bindings leaked");
            shared.bindings.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{DepthMapPass, MeshRenderModule};
    use vesta_assets::{Mesh, Resource};
    use vesta_common::EntityId;
    use vesta_ecs::{Camera, Material, StaticMesh, Transform};

    fn camera_entity(ecs: &mut Ecs) -> EntityId {
        let camera = ecs.create_entity();
        ecs.add_component(camera, Transform::default()).unwrap();
        ecs.add_component(camera, Camera::default()).unwrap();
        camera
    }

    fn add_cube(ecs: &mut Ecs) {
        let cube = ecs.create_entity();
        ecs.add_component(cube, Transform::default()).unwrap();
        ecs.add_component(
            cube,
            StaticMesh::new(Resource::loaded(Mesh {
                name: "cube".into(),
                vertex_count: 24,
                index_count: 36,
            })),
        )
        .unwrap();
        ecs.add_component(cube, Material::default()).unwrap();
    }

    #[test]
    fn out_of_range_viewport_is_a_hard_error() {
        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        pipeline.add_viewport(Viewport::new(0, 0, 640, 480));

        assert!(pipeline.get_viewport(0).is_ok());
        assert_eq!(
            pipeline.get_viewport(3),
            Err(RenderError::InvalidViewport { index: 3, len: 1 })
        );
    }

    #[test]
    fn renders_into_the_supplied_framebuffer() {
        let framebuffer = Framebuffer::new(320, 200);
        let pipeline = RenderPipeline::new(framebuffer);
        assert_eq!(pipeline.framebuffer().size(), (320, 200));
        assert_eq!(pipeline.framebuffer().presented_frames(), 0);
    }

    #[test]
    fn active_viewport_follows_the_render_loop() {
        struct ActiveRecorder {
            seen: std::rc::Rc<std::cell::RefCell<Vec<Option<usize>>>>,
        }
        impl RenderModule for ActiveRecorder {
            fn name(&self) -> &'static str {
                "active_recorder"
            }
            fn priority(&self) -> i32 {
                0
            }
            fn render(
                &mut self,
                _: &Ecs,
                _: &Viewport,
                _: &mut Framebuffer,
                state: &mut SharedRenderState,
            ) -> Result<(), RenderError> {
                self.seen.borrow_mut().push(state.active_viewport);
                Ok(())
            }
        }

        let mut ecs = Ecs::new();
        let camera = camera_entity(&mut ecs);
        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        for x in [0, 320] {
            let mut viewport = Viewport::new(x, 0, 320, 480);
            viewport.bind_camera(camera);
            pipeline.add_viewport(viewport);
        }
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        pipeline.add_module(Box::new(ActiveRecorder { seen: seen.clone() }));

        assert_eq!(pipeline.active_viewport(), None);
        pipeline.render_frame(&ecs);

        // Each viewport was active exactly while its modules ran, and the
        // designation fell back to the first viewport afterwards.
        assert_eq!(*seen.borrow(), vec![Some(0), Some(1)]);
        assert_eq!(pipeline.active_viewport(), Some(0));
        assert_eq!(pipeline.shared_state().active_viewport, None);
    }

    #[test]
    fn frame_renders_and_presents() {
        let mut ecs = Ecs::new();
        let camera = camera_entity(&mut ecs);
        add_cube(&mut ecs);

        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        let mut viewport = Viewport::new(0, 0, 640, 480);
        viewport.bind_camera(camera);
        pipeline.add_viewport(viewport);
        pipeline.add_pre_pass(Box::new(DepthMapPass::default()));
        pipeline.add_module(Box::new(MeshRenderModule));

        let errors = pipeline.render_frame(&ecs);
        assert!(errors.is_empty());
        assert_eq!(pipeline.framebuffer().commands().len(), 1);
        assert_eq!(pipeline.framebuffer().presented_frames(), 1);
        assert_eq!(pipeline.phase(), RenderPhase::Idle);
        assert!(pipeline.shared_state().last_depth_map.is_some());
    }

    #[test]
    fn camera_less_viewport_does_not_block_others() {
        let mut ecs = Ecs::new();
        let camera = camera_entity(&mut ecs);
        add_cube(&mut ecs);

        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        pipeline.add_viewport(Viewport::new(0, 0, 320, 480));
        let mut second = Viewport::new(320, 0, 320, 480);
        second.bind_camera(camera);
        pipeline.add_viewport(second);
        pipeline.add_module(Box::new(MeshRenderModule));

        let errors = pipeline.render_frame(&ecs);
        assert!(errors.is_empty());
        // Only the camera-bound viewport produced draws.
        assert_eq!(pipeline.framebuffer().commands().len(), 1);
        assert_eq!(pipeline.framebuffer().presented_frames(), 1);
    }

    #[test]
    fn modules_run_in_priority_order() {
        struct Probe {
            name: &'static str,
            priority: i32,
        }
        impl RenderModule for Probe {
            fn name(&self) -> &'static str {
                self.name
            }
            fn priority(&self) -> i32 {
                self.priority
            }
            fn render(
                &mut self,
                _: &Ecs,
                _: &Viewport,
                fb: &mut Framebuffer,
                _: &mut SharedRenderState,
            ) -> Result<(), RenderError> {
                fb.record(crate::framebuffer::DrawCommand {
                    mesh: self.name.into(),
                    model: glam::Mat4::IDENTITY,
                    view: glam::Mat4::IDENTITY,
                    projection: glam::Mat4::IDENTITY,
                    lit: false,
                    face_cull: true,
                });
                Ok(())
            }
        }

        let mut ecs = Ecs::new();
        let camera = camera_entity(&mut ecs);
        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        let mut viewport = Viewport::new(0, 0, 640, 480);
        viewport.bind_camera(camera);
        pipeline.add_viewport(viewport);
        pipeline.add_module(Box::new(Probe {
            name: "late",
            priority: 50,
        }));
        pipeline.add_module(Box::new(Probe {
            name: "early",
            priority: 1,
        }));

        pipeline.render_frame(&ecs);
        let names: Vec<_> = pipeline
            .framebuffer()
            .commands()
            .iter()
            .map(|c| c.mesh.as_str())
            .collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[test]
    fn failing_module_still_presents() {
        struct Broken;
        impl RenderModule for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }
            fn priority(&self) -> i32 {
                0
            }
            fn render(
                &mut self,
                _: &Ecs,
                _: &Viewport,
                _: &mut Framebuffer,
                _: &mut SharedRenderState,
            ) -> Result<(), RenderError> {
                Err(RenderError::Module {
                    module: "broken",
                    message: "lost device".into(),
                })
            }
        }

        let mut ecs = Ecs::new();
        let camera = camera_entity(&mut ecs);
        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        let mut viewport = Viewport::new(0, 0, 640, 480);
        viewport.bind_camera(camera);
        pipeline.add_viewport(viewport);
        pipeline.add_module(Box::new(Broken));

        let errors = pipeline.render_frame(&ecs);
        assert_eq!(errors.len(), 1);
        assert_eq!(pipeline.framebuffer().presented_frames(), 1);
        assert_eq!(pipeline.phase(), RenderPhase::Idle);
    }

    #[test]
    fn leaked_bindings_are_reset_between_modules() {
        struct Leaky;
        impl RenderModule for Leaky {
            fn name(&self) -> &'static str {
                "leaky"
            }
            fn priority(&self) -> i32 {
                0
            }
            fn render(
                &mut self,
                _: &Ecs,
                _: &Viewport,
                _: &mut Framebuffer,
                state: &mut SharedRenderState,
            ) -> Result<(), RenderError> {
                std::mem::forget(state.bindings.bind("shader"));
                Ok(())
            }
        }

        let mut ecs = Ecs::new();
        let camera = camera_entity(&mut ecs);
        let mut pipeline = RenderPipeline::new(Framebuffer::new(640, 480));
        let mut viewport = Viewport::new(0, 0, 640, 480);
        viewport.bind_camera(camera);
        pipeline.add_viewport(viewport);
        pipeline.add_module(Box::new(Leaky));

        pipeline.render_frame(&ecs);
        assert!(pipeline.shared_state().bindings.is_clean());
    }
}
