//! Debugging and inspection tooling over the component store.
//!
//! Everything here goes through the reflection registry, so the tools
//! see exactly the kinds and fields games chose to expose and nothing
//! else.

use std::fmt::Write as _;
use vesta_common::EntityId;
use vesta_ecs::{Ecs, FieldValue, ReflectError, ReflectRegistry};

/// Renders textual views of a store for logs and debug consoles.
pub struct EcsInspector<'a> {
    registry: &'a ReflectRegistry,
}

impl<'a> EcsInspector<'a> {
    pub fn new(registry: &'a ReflectRegistry) -> Self {
        Self { registry }
    }

    /// One line per reflected kind with its live component count, plus
    /// the entity total.
    pub fn summary(&self, ecs: &Ecs) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "entities: {}", ecs.entity_count());
        for kind in self.registry.kind_names() {
            let count = ecs
                .entity_ids()
                .into_iter()
                .filter(|&entity| self.owns_kind(ecs, entity, kind))
                .count();
            let _ = writeln!(out, "  {kind}: {count}");
        }
        out
    }

    /// Every reflected field of every component the entity owns.
    pub fn inspect_entity(&self, ecs: &Ecs, entity: EntityId) -> Result<String, ReflectError> {
        let mut out = String::new();
        let _ = writeln!(out, "entity {:?}", entity);
        for kind in self.registry.kind_names() {
            let mut wrote_header = false;
            for field in self.registry.field_names(kind)? {
                let Some(value) = self.registry.get(ecs, entity, kind, field)? else {
                    break;
                };
                if !wrote_header {
                    let _ = writeln!(out, "  {kind}");
                    wrote_header = true;
                }
                let _ = writeln!(out, "    {field} = {}", format_value(&value));
            }
        }
        Ok(out)
    }

    fn owns_kind(&self, ecs: &Ecs, entity: EntityId, kind: &str) -> bool {
        self.registry
            .field_names(kind)
            .ok()
            .and_then(|fields| fields.first().copied())
            .and_then(|field| self.registry.get(ecs, entity, kind, field).ok())
            .flatten()
            .is_some()
    }
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::Float(f) => format!("{f:.3}"),
        FieldValue::Vec3(v) => format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z),
        FieldValue::Text(s) => s.clone(),
    }
}
