//! Stock gameplay systems.

use vesta_ecs::{
    Camera, Ecs, Rotator, System, SystemContext, SystemError, SystemUpdateMode, Transform,
};

/// Moves camera entities along the named movement axes.
///
/// Uses the `Horizontal`, `Vertical` and `Up` axes from the default input
/// bindings. Only active while playing; editor navigation is handled by
/// editor tooling instead.
#[derive(Debug)]
pub struct CameraControllerSystem {
    pub speed: f32,
}

impl Default for CameraControllerSystem {
    fn default() -> Self {
        Self { speed: 5.0 }
    }
}

impl System for CameraControllerSystem {
    fn name(&self) -> &'static str {
        "camera_controller"
    }

    fn update(&mut self, ecs: &mut Ecs, ctx: &SystemContext<'_>) -> Result<(), SystemError> {
        if ctx.mode != SystemUpdateMode::Play {
            return Ok(());
        }
        let horizontal = ctx.input.axis("Horizontal");
        let vertical = ctx.input.axis("Vertical");
        let up_axis = ctx.input.axis("Up");
        if horizontal == 0.0 && vertical == 0.0 && up_axis == 0.0 {
            return Ok(());
        }

        for entity in ecs.select_entities::<(Transform, Camera)>() {
            let camera = *ecs
                .get::<Camera>(entity)
                .map_err(|e| SystemError::new(e.to_string()))?;
            let right = camera.front.cross(camera.up).normalize_or_zero();
            let delta = (camera.front * vertical + right * horizontal + camera.up * up_axis)
                * self.speed
                * ctx.dt;
            let transform = ecs
                .get_mut::<Transform>(entity)
                .map_err(|e| SystemError::new(e.to_string()))?;
            transform.position += delta;
        }
        Ok(())
    }
}

/// Spins every entity carrying a [`Rotator`] at its configured rate.
#[derive(Debug, Default)]
pub struct RotatorSystem;

impl System for RotatorSystem {
    fn name(&self) -> &'static str {
        "rotator"
    }

    fn update(&mut self, ecs: &mut Ecs, ctx: &SystemContext<'_>) -> Result<(), SystemError> {
        if ctx.mode != SystemUpdateMode::Play {
            return Ok(());
        }
        for entity in ecs.select_entities::<(Transform, Rotator)>() {
            let rotator = *ecs
                .get::<Rotator>(entity)
                .map_err(|e| SystemError::new(e.to_string()))?;
            let transform = ecs
                .get_mut::<Transform>(entity)
                .map_err(|e| SystemError::new(e.to_string()))?;
            transform.rotation += rotator.axis * rotator.degrees_per_second * ctx.dt;
        }
        Ok(())
    }
}
