//! Registration-time component field reflection.
//!
//! Editor and tooling code addresses component fields by name without
//! knowing the concrete Rust types. Accessors go through a closed union
//! of supported field value types and are registered once at startup.

use crate::ecs::Ecs;
use crate::kind::Component;
use glam::Vec3;
use std::collections::BTreeMap;
use vesta_common::EntityId;

/// Closed union of field types the reflection layer can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Vec3(Vec3),
    Text(String),
}

impl FieldValue {
    pub fn into_bool(self) -> Result<bool, ReflectError> {
        match self {
            FieldValue::Bool(b) => Ok(b),
            _ => Err(ReflectError::TypeMismatch { expected: "bool" }),
        }
    }

    pub fn into_int(self) -> Result<i64, ReflectError> {
        match self {
            FieldValue::Int(i) => Ok(i),
            _ => Err(ReflectError::TypeMismatch { expected: "int" }),
        }
    }

    pub fn into_float(self) -> Result<f32, ReflectError> {
        match self {
            FieldValue::Float(f) => Ok(f),
            _ => Err(ReflectError::TypeMismatch { expected: "float" }),
        }
    }

    pub fn into_vec3(self) -> Result<Vec3, ReflectError> {
        match self {
            FieldValue::Vec3(v) => Ok(v),
            _ => Err(ReflectError::TypeMismatch { expected: "vec3" }),
        }
    }

    pub fn into_text(self) -> Result<String, ReflectError> {
        match self {
            FieldValue::Text(s) => Ok(s),
            _ => Err(ReflectError::TypeMismatch { expected: "text" }),
        }
    }
}

/// Errors from reflective field access.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReflectError {
    #[error("no reflected component kind named {0}")]
    UnknownKind(String),
    #[error("component {kind} has no reflected field {field}")]
    UnknownField { kind: String, field: String },
    #[error("entity does not own a {kind} component")]
    ComponentMissing { kind: String },
    #[error("field value is not a {expected}")]
    TypeMismatch { expected: &'static str },
}

type Getter = Box<dyn Fn(&Ecs, EntityId) -> Option<FieldValue>>;
type Setter = Box<dyn Fn(&mut Ecs, EntityId, FieldValue) -> Result<(), ReflectError>>;

struct FieldEntry {
    name: &'static str,
    getter: Getter,
    setter: Setter,
}

/// Table mapping (component kind, field name) to tagged accessors.
///
/// Built once at startup by [`crate::register_standard_components`] plus
/// any game-specific registrations; owned by the application, not static.
#[derive(Default)]
pub struct ReflectRegistry {
    kinds: BTreeMap<&'static str, Vec<FieldEntry>>,
}

impl ReflectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one field of a component kind.
    pub fn register_field<T: Component>(
        &mut self,
        field: &'static str,
        get: impl Fn(&T) -> FieldValue + 'static,
        set: impl Fn(&mut T, FieldValue) -> Result<(), ReflectError> + 'static,
    ) {
        let getter: Getter =
            Box::new(move |ecs, entity| ecs.get::<T>(entity).ok().map(|value| get(value)));
        let setter: Setter = Box::new(move |ecs, entity, value| {
            let target = ecs
                .get_mut::<T>(entity)
                .map_err(|_| ReflectError::ComponentMissing {
                    kind: T::NAME.to_string(),
                })?;
            set(target, value)
        });
        self.kinds.entry(T::NAME).or_default().push(FieldEntry {
            name: field,
            getter,
            setter,
        });
    }

    /// Reflected kind names, sorted.
    pub fn kind_names(&self) -> Vec<&'static str> {
        self.kinds.keys().copied().collect()
    }

    /// Field names of a reflected kind, in registration order.
    pub fn field_names(&self, kind: &str) -> Result<Vec<&'static str>, ReflectError> {
        self.kinds
            .get(kind)
            .map(|fields| fields.iter().map(|f| f.name).collect())
            .ok_or_else(|| ReflectError::UnknownKind(kind.to_string()))
    }

    /// Read a field of `entity`'s component. `Ok(None)` means the entity
    /// does not own the component; unknown kind or field is an error.
    pub fn get(
        &self,
        ecs: &Ecs,
        entity: EntityId,
        kind: &str,
        field: &str,
    ) -> Result<Option<FieldValue>, ReflectError> {
        Ok((self.entry(kind, field)?.getter)(ecs, entity))
    }

    /// Write a field of `entity`'s component.
    pub fn set(
        &self,
        ecs: &mut Ecs,
        entity: EntityId,
        kind: &str,
        field: &str,
        value: FieldValue,
    ) -> Result<(), ReflectError> {
        (self.entry(kind, field)?.setter)(ecs, entity, value)
    }

    fn entry(&self, kind: &str, field: &str) -> Result<&FieldEntry, ReflectError> {
        let fields = self
            .kinds
            .get(kind)
            .ok_or_else(|| ReflectError::UnknownKind(kind.to_string()))?;
        fields
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| ReflectError::UnknownField {
                kind: kind.to_string(),
                field: field.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Transform, register_standard_components};

    fn registry() -> ReflectRegistry {
        let mut registry = ReflectRegistry::new();
        register_standard_components(&mut registry);
        registry
    }

    #[test]
    fn get_and_set_through_names() {
        let registry = registry();
        let mut ecs = Ecs::new();
        let entity = ecs.create_entity();
        ecs.add_component(entity, Transform::default()).unwrap();

        registry
            .set(
                &mut ecs,
                entity,
                "Transform",
                "position",
                FieldValue::Vec3(Vec3::new(1.0, 2.0, 3.0)),
            )
            .unwrap();

        let value = registry
            .get(&ecs, entity, "Transform", "position")
            .unwrap()
            .unwrap();
        assert_eq!(value, FieldValue::Vec3(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn missing_component_reads_none() {
        let registry = registry();
        let mut ecs = Ecs::new();
        let entity = ecs.create_entity();
        assert_eq!(
            registry.get(&ecs, entity, "Transform", "position").unwrap(),
            None
        );
    }

    #[test]
    fn unknown_names_are_errors() {
        let registry = registry();
        let ecs = Ecs::new();
        let entity = EntityId::new();
        assert!(matches!(
            registry.get(&ecs, entity, "Nonsense", "x"),
            Err(ReflectError::UnknownKind(_))
        ));
        assert!(matches!(
            registry.get(&ecs, entity, "Transform", "warp"),
            Err(ReflectError::UnknownField { .. })
        ));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let registry = registry();
        let mut ecs = Ecs::new();
        let entity = ecs.create_entity();
        ecs.add_component(entity, Transform::default()).unwrap();
        assert_eq!(
            registry.set(
                &mut ecs,
                entity,
                "Transform",
                "position",
                FieldValue::Bool(true)
            ),
            Err(ReflectError::TypeMismatch { expected: "vec3" })
        );
    }

    #[test]
    fn standard_components_are_listed() {
        let registry = registry();
        let kinds = registry.kind_names();
        assert!(kinds.contains(&"Transform"));
        assert!(kinds.contains(&"Camera"));
        assert!(kinds.contains(&"RigidBody"));
        assert!(
            registry
                .field_names("Transform")
                .unwrap()
                .contains(&"rotation")
        );
    }
}
