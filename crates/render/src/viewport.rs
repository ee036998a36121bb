use glam::Mat4;
use vesta_common::EntityId;
use vesta_ecs::{Camera, Ecs};

/// A rectangular region of the output surface driven by one camera entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    camera: Option<EntityId>,
}

impl Viewport {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            camera: None,
        }
    }

    pub fn bind_camera(&mut self, camera: EntityId) {
        self.camera = Some(camera);
    }

    pub fn unbind_camera(&mut self) {
        self.camera = None;
    }

    pub fn camera(&self) -> Option<EntityId> {
        self.camera
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// View and projection matrices from the bound camera, or `None` when
    /// no camera is bound or the camera entity lacks its components.
    pub fn view_projection(&self, ecs: &Ecs) -> Option<(Mat4, Mat4)> {
        let camera_entity = self.camera?;
        let camera = *ecs.get::<Camera>(camera_entity).ok()?;
        let world = ecs.world_matrix(camera_entity).ok()?;
        let position = world.w_axis.truncate();

        let view = Mat4::look_at_rh(position, position + camera.front, camera.up);
        let projection =
            Mat4::perspective_rh(camera.fov.to_radians(), self.aspect(), 0.1, 100.0);
        Some((view, projection))
    }
}
