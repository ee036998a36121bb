use vesta_ecs::{Ecs, SystemContext, SystemFailure, SystemScheduler};

type SceneHook = Box<dyn FnMut(&mut Ecs)>;

/// A component store paired with the systems that drive it, plus
/// lifecycle hooks the application fires on entry and exit.
#[derive(Default)]
pub struct Scene {
    ecs: Ecs,
    scheduler: SystemScheduler,
    on_start: Option<SceneHook>,
    on_exit: Option<SceneHook>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ecs(&self) -> &Ecs {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut Ecs {
        &mut self.ecs
    }

    pub fn scheduler_mut(&mut self) -> &mut SystemScheduler {
        &mut self.scheduler
    }

    pub fn set_on_start(&mut self, hook: impl FnMut(&mut Ecs) + 'static) {
        self.on_start = Some(Box::new(hook));
    }

    pub fn set_on_exit(&mut self, hook: impl FnMut(&mut Ecs) + 'static) {
        self.on_exit = Some(Box::new(hook));
    }

    pub(crate) fn start(&mut self) {
        if let Some(hook) = &mut self.on_start {
            hook(&mut self.ecs);
        }
    }

    pub(crate) fn exit(&mut self) {
        if let Some(hook) = &mut self.on_exit {
            hook(&mut self.ecs);
        }
    }

    /// Run all registered systems once over this scene's store.
    pub fn update_systems(&mut self, ctx: &SystemContext<'_>) -> Vec<SystemFailure> {
        self.scheduler.run(&mut self.ecs, ctx)
    }
}
