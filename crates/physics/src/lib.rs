//! Fixed-timestep physics scheduling.
//!
//! Rendering runs at a variable rate but the simulation must advance in
//! equal ticks, so frame time is banked in an accumulator and drained in
//! whole ticks. Over any span of frames the number of ticks taken is
//! exactly `floor(banked_time / tick_interval)`, independent of how the
//! frame deltas were sliced.
//!
//! # Invariants
//! - The accumulator is always in `[0, tick_interval)` after an update.
//! - Simulation only advances in [`SystemUpdateMode::Play`].

use vesta_ecs::{Ecs, EcsError, RigidBody, SystemUpdateMode, Transform};

/// Default simulation rate, 60 ticks per second.
pub const DEFAULT_TICK_INTERVAL: f32 = 1.0 / 60.0;

/// Errors from a physics tick.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("component store error during physics step: {0}")]
    Store(#[from] EcsError),
    #[error("physics step rejected state: {0}")]
    InvalidState(String),
}

/// One fixed-duration advance of the simulation. `dt` is always the
/// scheduler's tick interval.
pub trait PhysicsStep {
    fn step(&mut self, ecs: &mut Ecs, dt: f32) -> Result<(), PhysicsError>;
}

/// Banks variable frame time and drains it in fixed ticks.
#[derive(Debug)]
pub struct PhysicsScheduler {
    tick_interval: f32,
    accumulator: f32,
}

impl Default for PhysicsScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl PhysicsScheduler {
    pub fn new(tick_interval: f32) -> Self {
        Self {
            tick_interval,
            accumulator: 0.0,
        }
    }

    pub fn tick_interval(&self) -> f32 {
        self.tick_interval
    }

    /// Time banked but not yet simulated.
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Bank `frame_dt` and run as many whole ticks as the bank covers.
    /// Returns the number of ticks taken. Outside Play mode nothing is
    /// banked and nothing runs.
    pub fn update(
        &mut self,
        mode: SystemUpdateMode,
        ecs: &mut Ecs,
        step: &mut dyn PhysicsStep,
        frame_dt: f32,
    ) -> Result<u32, PhysicsError> {
        if mode != SystemUpdateMode::Play {
            return Ok(0);
        }
        self.accumulator += frame_dt;
        let mut ticks = 0;
        while self.accumulator >= self.tick_interval {
            step.step(ecs, self.tick_interval)?;
            self.accumulator -= self.tick_interval;
            ticks += 1;
        }
        if ticks > 1 {
            tracing::trace!(ticks, "caught up on banked simulation time");
        }
        Ok(ticks)
    }
}

/// Applies rigid body velocities to transforms. Kinematic bodies are
/// positioned by gameplay code and left untouched.
#[derive(Debug, Default)]
pub struct VelocityIntegrator;

impl PhysicsStep for VelocityIntegrator {
    fn step(&mut self, ecs: &mut Ecs, dt: f32) -> Result<(), PhysicsError> {
        for entity in ecs.select_entities::<(Transform, RigidBody)>() {
            let body = *ecs.get::<RigidBody>(entity)?;
            if body.kinematic {
                continue;
            }
            let transform = ecs.get_mut::<Transform>(entity)?;
            transform.position += body.velocity * dt;
        }
        Ok(())
    }
}
