use crate::scene::Scene;
use vesta_ecs::{SystemContext, SystemFailure, SystemUpdateMode};
use vesta_input::InputRouter;
use vesta_physics::{PhysicsError, PhysicsScheduler, PhysicsStep, VelocityIntegrator};
use vesta_render::{RenderError, RenderPipeline};

/// Everything that went wrong in one frame, plus what still happened.
///
/// A frame is never aborted: failing systems are skipped, a failing
/// physics tick stops further ticks this frame, failing render modules
/// are skipped, and present is always attempted.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub system_failures: Vec<SystemFailure>,
    pub physics_ticks: u32,
    pub physics_error: Option<PhysicsError>,
    pub render_errors: Vec<RenderError>,
    pub presented: bool,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.system_failures.is_empty()
            && self.physics_error.is_none()
            && self.render_errors.is_empty()
    }
}

/// The frame driver: input, systems, physics, render, in that order,
/// every frame, until quit is requested.
pub struct App {
    scene: Scene,
    input: InputRouter,
    physics: PhysicsScheduler,
    physics_step: Box<dyn PhysicsStep>,
    pipeline: RenderPipeline,
    mode: SystemUpdateMode,
    quit_requested: bool,
}

impl App {
    pub fn new(scene: Scene, input: InputRouter, pipeline: RenderPipeline) -> Self {
        Self {
            scene,
            input,
            physics: PhysicsScheduler::default(),
            physics_step: Box::new(VelocityIntegrator),
            pipeline,
            mode: SystemUpdateMode::Play,
            quit_requested: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn input_mut(&mut self) -> &mut InputRouter {
        &mut self.input
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    pub fn set_mode(&mut self, mode: SystemUpdateMode) {
        self.mode = mode;
    }

    pub fn set_physics_step(&mut self, step: Box<dyn PhysicsStep>) {
        self.physics_step = step;
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    /// Fire the scene's start hook. Call once before the first frame.
    pub fn start(&mut self) {
        self.scene.start();
    }

    /// Fire the scene's exit hook. Call once after the last frame.
    pub fn exit(&mut self) {
        self.scene.exit();
    }

    /// Advance everything by one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let mut report = FrameReport::default();

        self.input.process_events(dt);

        let ctx = SystemContext {
            mode: self.mode,
            dt,
            input: &self.input,
        };
        report.system_failures = self.scene.update_systems(&ctx);

        match self.physics.update(
            self.mode,
            self.scene.ecs_mut(),
            self.physics_step.as_mut(),
            dt,
        ) {
            Ok(ticks) => report.physics_ticks = ticks,
            Err(error) => {
                tracing::warn!(%error, "physics update failed");
                report.physics_error = Some(error);
            }
        }

        report.render_errors = self.pipeline.render_frame(self.scene.ecs());
        report.presented = true;

        if !report.is_clean() {
            tracing::debug!(
                systems = report.system_failures.len(),
                render = report.render_errors.len(),
                physics = report.physics_error.is_some(),
                "frame finished with failures"
            );
        }
        report
    }
}
