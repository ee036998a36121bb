//! Entity-component model: typed per-kind storage, joined queries,
//! hierarchy, and the per-frame system scheduler.
//!
//! All storage lives in an explicitly constructed [`Ecs`] context owned by
//! the scene; there are no process-wide registries, so worlds built in
//! tests are fully isolated from each other.
//!
//! # Invariants
//! - At most one component of a kind per entity.
//! - Removing a component never moves other live components of that kind.
//! - An entity's parent chain is acyclic and finite.

mod components;
mod directory;
mod ecs;
mod kind;
mod query;
mod reflect;
mod scheduler;

pub use components::{
    Camera, Material, RigidBody, Rotator, StaticMesh, Transform, register_standard_components,
};
pub use directory::{EntityDirectory, ParentError};
pub use ecs::{ComponentId, Ecs, EcsError};
pub use kind::{Component, KindId};
pub use query::Selection;
pub use reflect::{FieldValue, ReflectError, ReflectRegistry};
pub use scheduler::{
    System, SystemContext, SystemError, SystemFailure, SystemScheduler, SystemUpdateMode,
};
