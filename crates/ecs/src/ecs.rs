use crate::components::Transform;
use crate::directory::{EntityDirectory, ParentError};
use crate::kind::{Component, KindId, KindRegistry};
use crate::query::Selection;
use glam::Mat4;
use std::any::Any;
use std::collections::BTreeMap;
use vesta_common::EntityId;

/// Identifies one component instance: its kind plus its slot in that
/// kind's table. Slots are reused after removal, so a held id is only
/// valid while the component is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId {
    kind: KindId,
    slot: u32,
}

impl ComponentId {
    pub fn kind(self) -> KindId {
        self.kind
    }
}

/// Errors from component store operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error("entity {entity:?} has no {kind} component")]
    NotFound {
        entity: EntityId,
        kind: &'static str,
    },
    #[error("no live {kind} component in slot {slot}")]
    StaleId { kind: &'static str, slot: u32 },
    #[error("component id belongs to a different kind than {requested}")]
    KindMismatch { requested: &'static str },
    #[error("parent link would create a cycle")]
    ParentCycle,
}

impl From<ParentError> for EcsError {
    fn from(err: ParentError) -> Self {
        match err {
            ParentError::UnknownEntity(id) => EcsError::UnknownEntity(id),
            ParentError::Cycle => EcsError::ParentCycle,
        }
    }
}

/// Per-kind dense storage. Removal tombstones the slot and recycles it
/// through a free list, so ids of other live components never shift.
struct Table<T> {
    slots: Vec<Option<(EntityId, T)>>,
    free: Vec<u32>,
    by_entity: BTreeMap<EntityId, u32>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_entity: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Insert or replace. Replacement keeps the existing slot so the
    /// original `ComponentId` stays valid.
    fn insert(&mut self, entity: EntityId, value: T) -> u32 {
        if let Some(&slot) = self.by_entity.get(&entity) {
            self.slots[slot as usize] = Some((entity, value));
            return slot;
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some((entity, value));
                slot
            }
            None => {
                self.slots.push(Some((entity, value)));
                (self.slots.len() - 1) as u32
            }
        };
        self.by_entity.insert(entity, slot);
        slot
    }

    fn get(&self, entity: EntityId) -> Option<&T> {
        let slot = *self.by_entity.get(&entity)?;
        self.slots[slot as usize].as_ref().map(|(_, v)| v)
    }

    fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        let slot = *self.by_entity.get(&entity)?;
        self.slots[slot as usize].as_mut().map(|(_, v)| v)
    }

    fn get_slot(&self, slot: u32) -> Option<&T> {
        self.slots.get(slot as usize)?.as_ref().map(|(_, v)| v)
    }

    fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.by_entity.remove(&entity)?;
        let taken = self.slots[slot as usize].take();
        self.free.push(slot);
        taken.map(|(_, v)| v)
    }
}

/// Object-safe view of a table, used where the element type is erased.
trait AnyTable {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn live_count(&self) -> usize;
    /// Entity ids in slot order, skipping tombstones. This order is an
    /// implementation detail and not stable across runs.
    fn dense_entities(&self) -> Vec<EntityId>;
    fn remove_entity(&mut self, entity: EntityId) -> bool;
}

impl<T: Component> AnyTable for Table<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn live_count(&self) -> usize {
        self.by_entity.len()
    }

    fn dense_entities(&self) -> Vec<EntityId> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(entity, _)| *entity))
            .collect()
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }
}

/// The component store, entity directory and kind registry for one world.
///
/// Explicitly constructed and owned by the scene; dropping it tears down
/// every entity and component it contains.
#[derive(Default)]
pub struct Ecs {
    kinds: KindRegistry,
    tables: Vec<Box<dyn AnyTable>>,
    directory: EntityDirectory,
}

impl Ecs {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Entities ---

    pub fn create_entity(&mut self) -> EntityId {
        self.directory.insert()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.directory.contains(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.directory.len()
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.directory.entity_ids()
    }

    /// Destroy an entity and every component it owns. Children are
    /// detached, not destroyed.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let kinds = self
            .directory
            .remove(entity)
            .ok_or(EcsError::UnknownEntity(entity))?;
        for kind in kinds {
            self.tables[kind.index()].remove_entity(entity);
        }
        Ok(())
    }

    pub fn set_parent(
        &mut self,
        child: EntityId,
        parent: Option<EntityId>,
    ) -> Result<(), EcsError> {
        self.directory.set_parent(child, parent)?;
        Ok(())
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.directory.parent(entity)
    }

    pub fn children(&self, entity: EntityId) -> Vec<EntityId> {
        self.directory.children(entity)
    }

    // --- Components ---

    /// Attach a component to an entity. Attaching a kind the entity
    /// already owns replaces the value in place and returns the same id.
    pub fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<ComponentId, EcsError> {
        if !self.directory.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        let kind = self.kinds.id_or_register::<T>();
        if kind.index() == self.tables.len() {
            self.tables.push(Box::new(Table::<T>::default()));
        }
        let slot = self.typed_table_mut::<T>(kind).insert(entity, value);
        self.directory.mark_kind(entity, kind);
        Ok(ComponentId { kind, slot })
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Result<&T, EcsError> {
        self.kind_id::<T>()
            .and_then(|kind| self.typed_table::<T>(kind).get(entity))
            .ok_or(EcsError::NotFound {
                entity,
                kind: T::NAME,
            })
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, EcsError> {
        let kind = self.kind_id::<T>().ok_or(EcsError::NotFound {
            entity,
            kind: T::NAME,
        })?;
        self.typed_table_mut::<T>(kind)
            .get_mut(entity)
            .ok_or(EcsError::NotFound {
                entity,
                kind: T::NAME,
            })
    }

    /// Fetch by component id instead of entity, e.g. a viewport's bound
    /// camera.
    pub fn get_with_id<T: Component>(&self, id: ComponentId) -> Result<&T, EcsError> {
        let kind = self.kind_id::<T>().ok_or(EcsError::KindMismatch {
            requested: T::NAME,
        })?;
        if id.kind != kind {
            return Err(EcsError::KindMismatch {
                requested: T::NAME,
            });
        }
        self.typed_table::<T>(kind)
            .get_slot(id.slot)
            .ok_or(EcsError::StaleId {
                kind: T::NAME,
                slot: id.slot,
            })
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.kind_id::<T>()
            .is_some_and(|kind| self.typed_table::<T>(kind).get(entity).is_some())
    }

    /// Detach and return a component. The freed slot is recycled later;
    /// ids of other live components are unaffected.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        let kind = self.kind_id::<T>()?;
        let removed = self.typed_table_mut::<T>(kind).remove(entity);
        if removed.is_some() {
            self.directory.clear_kind(entity, kind);
        }
        removed
    }

    pub fn kind_id<T: Component>(&self) -> Option<KindId> {
        self.kinds.id::<T>()
    }

    pub fn kind_name(&self, kind: KindId) -> &'static str {
        self.kinds.name(kind)
    }

    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Number of live components of a kind.
    pub fn count_of<T: Component>(&self) -> usize {
        self.kind_id::<T>()
            .map_or(0, |kind| self.tables[kind.index()].live_count())
    }

    // --- Queries ---

    /// Lazy inner join over every requested kind.
    ///
    /// Yields exactly the entities owning all kinds in `Q`, in the dense
    /// order of the smallest requested kind. That order is not guaranteed
    /// to be stable across runs; callers must not depend on it. Structural
    /// mutation during iteration is prevented by the shared borrow.
    pub fn select<Q: Selection>(&self) -> impl Iterator<Item = (EntityId, Q::Refs<'_>)> {
        let candidates = match Q::kind_ids(self) {
            Some(kinds) => self.smallest_dense_entities(&kinds),
            // An unregistered kind means no entity can own all of them.
            None => Vec::new(),
        };
        candidates
            .into_iter()
            .filter_map(move |entity| Q::fetch(self, entity).map(|refs| (entity, refs)))
    }

    /// The joined entity set alone, for callers that need to mutate
    /// components afterwards.
    pub fn select_entities<Q: Selection>(&self) -> Vec<EntityId> {
        self.select::<Q>().map(|(entity, _)| entity).collect()
    }

    fn smallest_dense_entities(&self, kinds: &[KindId]) -> Vec<EntityId> {
        kinds
            .iter()
            .min_by_key(|kind| self.tables[kind.index()].live_count())
            .map(|kind| self.tables[kind.index()].dense_entities())
            .unwrap_or_default()
    }

    // --- Hierarchy-resolved transforms ---

    /// World-space matrix of an entity, composed down the parent chain by
    /// matrix multiplication. Ancestors without a `Transform` contribute
    /// identity. The original accumulated position/rotation by summation;
    /// see DESIGN.md for the deviation.
    pub fn world_matrix(&self, entity: EntityId) -> Result<Mat4, EcsError> {
        let local = self.get::<Transform>(entity)?.local_matrix();
        let mut world = local;
        let mut cursor = self.directory.parent(entity);
        while let Some(current) = cursor {
            if let Ok(transform) = self.get::<Transform>(current) {
                world = transform.local_matrix() * world;
            }
            cursor = self.directory.parent(current);
        }
        Ok(world)
    }

    fn typed_table<T: Component>(&self, kind: KindId) -> &Table<T> {
        self.tables[kind.index()]
            .as_any()
            .downcast_ref()
            .unwrap_or_else(|| unreachable!("kind id {kind:?} maps to a table of another type"))
    }

    fn typed_table_mut<T: Component>(&mut self, kind: KindId) -> &mut Table<T> {
        self.tables[kind.index()]
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| unreachable!("kind id {kind:?} maps to a table of another type"))
    }
}
