//! Shared types for the vesta engine: entity ids, transforms, colors.
//!
//! # Invariants
//! - `EntityId` is opaque and stable for the lifetime of its entity.
//! - `Transform` rotation is stored in degrees; matrix conversion happens
//!   at the render boundary, not in the data model.

mod types;

pub use types::{Color, EntityId, Transform};
