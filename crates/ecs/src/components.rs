//! Standard engine components and their reflection registration.

use crate::kind::Component;
use crate::reflect::{FieldValue, ReflectRegistry};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use vesta_assets::{Mesh, Resource, Shader, Texture};

pub use vesta_common::Transform;

impl Component for Transform {
    const NAME: &'static str = "Transform";
}

/// A renderable mesh reference.
#[derive(Debug, Clone, Default)]
pub struct StaticMesh {
    pub mesh: Resource<Mesh>,
    /// Face culling is usually wanted, except for planes.
    pub face_cull: bool,
}

impl StaticMesh {
    pub fn new(mesh: Resource<Mesh>) -> Self {
        Self {
            mesh,
            face_cull: true,
        }
    }
}

impl Component for StaticMesh {
    const NAME: &'static str = "StaticMesh";
}

/// Shading inputs for a renderable entity.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub shader: Resource<Shader>,
    pub texture: Resource<Texture>,
    pub lit: bool,
    pub shininess: f32,
}

impl Component for Material {
    const NAME: &'static str = "Material";
}

/// View parameters for a camera entity. The viewport it drives binds it
/// by entity id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub front: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 60.0,
        }
    }
}

impl Component for Camera {
    const NAME: &'static str = "Camera";
}

/// Minimal rigid body state consumed by the physics step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub velocity: Vec3,
    pub mass: f32,
    /// Kinematic bodies are moved by gameplay code, not integration.
    pub kinematic: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 1.0,
            kinematic: false,
        }
    }
}

impl Component for RigidBody {
    const NAME: &'static str = "RigidBody";
}

/// Spins an entity at a constant rate. Driven by the rotator system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub axis: Vec3,
    pub degrees_per_second: f32,
}

impl Default for Rotator {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            degrees_per_second: 90.0,
        }
    }
}

impl Component for Rotator {
    const NAME: &'static str = "Rotator";
}

/// Register field accessors for all standard components. Called once at
/// application startup.
pub fn register_standard_components(registry: &mut ReflectRegistry) {
    registry.register_field::<Transform>(
        "position",
        |t| FieldValue::Vec3(t.position),
        |t, v| v.into_vec3().map(|p| t.position = p),
    );
    registry.register_field::<Transform>(
        "rotation",
        |t| FieldValue::Vec3(t.rotation),
        |t, v| v.into_vec3().map(|r| t.rotation = r),
    );
    registry.register_field::<Transform>(
        "scale",
        |t| FieldValue::Vec3(t.scale),
        |t, v| v.into_vec3().map(|s| t.scale = s),
    );

    registry.register_field::<StaticMesh>(
        "face_cull",
        |m| FieldValue::Bool(m.face_cull),
        |m, v| v.into_bool().map(|b| m.face_cull = b),
    );

    registry.register_field::<Material>(
        "lit",
        |m| FieldValue::Bool(m.lit),
        |m, v| v.into_bool().map(|b| m.lit = b),
    );
    registry.register_field::<Material>(
        "shininess",
        |m| FieldValue::Float(m.shininess),
        |m, v| v.into_float().map(|f| m.shininess = f),
    );

    registry.register_field::<Camera>(
        "fov",
        |c| FieldValue::Float(c.fov),
        |c, v| v.into_float().map(|f| c.fov = f),
    );
    registry.register_field::<Camera>(
        "front",
        |c| FieldValue::Vec3(c.front),
        |c, v| v.into_vec3().map(|f| c.front = f),
    );

    registry.register_field::<RigidBody>(
        "velocity",
        |b| FieldValue::Vec3(b.velocity),
        |b, v| v.into_vec3().map(|vel| b.velocity = vel),
    );
    registry.register_field::<RigidBody>(
        "mass",
        |b| FieldValue::Float(b.mass),
        |b, v| v.into_float().map(|m| b.mass = m),
    );
    registry.register_field::<RigidBody>(
        "kinematic",
        |b| FieldValue::Bool(b.kinematic),
        |b, v| v.into_bool().map(|k| b.kinematic = k),
    );

    registry.register_field::<Rotator>(
        "degrees_per_second",
        |r| FieldValue::Float(r.degrees_per_second),
        |r, v| v.into_float().map(|d| r.degrees_per_second = d),
    );
}
