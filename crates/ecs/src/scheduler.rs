//! Per-frame system execution.
//!
//! Systems run in registration order, once per frame. A failing system is
//! reported and skipped for the rest of the frame; it does not stop the
//! frame or the other systems.

use crate::ecs::Ecs;
use std::any::TypeId;
use std::collections::BTreeSet;
use std::fmt;
use vesta_input::InputRouter;

/// Whether gameplay simulation is running or the scene is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemUpdateMode {
    #[default]
    Play,
    Editor,
}

/// Per-frame data handed to every system.
pub struct SystemContext<'a> {
    pub mode: SystemUpdateMode,
    /// Seconds since the previous frame.
    pub dt: f32,
    pub input: &'a InputRouter,
}

/// Error raised by a single system update.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SystemError(pub String);

impl SystemError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A system that failed this frame, with its error.
#[derive(Debug)]
pub struct SystemFailure {
    pub system: &'static str,
    pub error: SystemError,
}

impl fmt::Display for SystemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system {} failed: {}", self.system, self.error)
    }
}

/// Per-frame logic over the component store.
pub trait System {
    fn name(&self) -> &'static str;

    fn update(&mut self, ecs: &mut Ecs, ctx: &SystemContext<'_>) -> Result<(), SystemError>;
}

/// Runs registered systems in registration order.
///
/// Each concrete system type registers at most once; later registrations
/// of the same type are ignored.
#[derive(Default)]
pub struct SystemScheduler {
    systems: Vec<Box<dyn System>>,
    registered: BTreeSet<TypeId>,
}

impl SystemScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_system<S: System + Default + 'static>(&mut self) {
        if !self.registered.insert(TypeId::of::<S>()) {
            tracing::debug!(
                system = std::any::type_name::<S>(),
                "system already registered, ignoring"
            );
            return;
        }
        self.systems.push(Box::new(S::default()));
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run every system once. Failures are collected and returned; they
    /// never abort the remaining systems.
    pub fn run(&mut self, ecs: &mut Ecs, ctx: &SystemContext<'_>) -> Vec<SystemFailure> {
        let mut failures = Vec::new();
        for system in &mut self.systems {
            if let Err(error) = system.update(ecs, ctx) {
                tracing::warn!(system = system.name(), %error, "system update failed");
                failures.push(SystemFailure {
                    system: system.name(),
                    error,
                });
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static TRACE: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Default)]
    struct First;
    impl System for First {
        fn name(&self) -> &'static str {
            "first"
        }
        fn update(&mut self, _: &mut Ecs, _: &SystemContext<'_>) -> Result<(), SystemError> {
            TRACE.with(|t| t.borrow_mut().push("first"));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Second;
    impl System for Second {
        fn name(&self) -> &'static str {
            "second"
        }
        fn update(&mut self, _: &mut Ecs, _: &SystemContext<'_>) -> Result<(), SystemError> {
            TRACE.with(|t| t.borrow_mut().push("second"));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Faulty;
    impl System for Faulty {
        fn name(&self) -> &'static str {
            "faulty"
        }
        fn update(&mut self, _: &mut Ecs, _: &SystemContext<'_>) -> Result<(), SystemError> {
            Err(SystemError::new("boom"))
        }
    }

    fn run_once(scheduler: &mut SystemScheduler) -> Vec<SystemFailure> {
        let mut ecs = Ecs::new();
        let input = InputRouter::new();
        let ctx = SystemContext {
            mode: SystemUpdateMode::Play,
            dt: 1.0 / 60.0,
            input: &input,
        };
        scheduler.run(&mut ecs, &ctx)
    }

    #[test]
    fn systems_run_in_registration_order() {
        TRACE.with(|t| t.borrow_mut().clear());
        let mut scheduler = SystemScheduler::new();
        scheduler.register_system::<Second>();
        scheduler.register_system::<First>();

        let failures = run_once(&mut scheduler);
        assert!(failures.is_empty());
        TRACE.with(|t| assert_eq!(*t.borrow(), vec!["second", "first"]));
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut scheduler = SystemScheduler::new();
        scheduler.register_system::<First>();
        scheduler.register_system::<First>();
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn failure_does_not_stop_later_systems() {
        TRACE.with(|t| t.borrow_mut().clear());
        let mut scheduler = SystemScheduler::new();
        scheduler.register_system::<Faulty>();
        scheduler.register_system::<First>();

        let failures = run_once(&mut scheduler);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].system, "faulty");
        TRACE.with(|t| assert_eq!(*t.borrow(), vec!["first"]));
    }
}
