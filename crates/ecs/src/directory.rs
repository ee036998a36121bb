use crate::kind::KindId;
use std::collections::{BTreeMap, BTreeSet};
use vesta_common::EntityId;

#[derive(Debug, Default)]
struct EntityRecord {
    parent: Option<EntityId>,
    children: BTreeSet<EntityId>,
    kinds: BTreeSet<KindId>,
}

/// Maps entity ids to the component kinds they own and tracks the
/// parent/child hierarchy.
///
/// A child stores its parent id; the parent stores a set of child ids.
/// There is no ownership in either direction, so removal is always safe.
#[derive(Debug, Default)]
pub struct EntityDirectory {
    records: BTreeMap<EntityId, EntityRecord>,
}

impl EntityDirectory {
    pub fn insert(&mut self) -> EntityId {
        let id = EntityId::new();
        self.records.insert(id, EntityRecord::default());
        id
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.records.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.records.keys().copied().collect()
    }

    /// Remove an entity, detaching it from its parent and orphaning its
    /// children. Returns the kinds it owned so the caller can clear the
    /// component tables.
    pub fn remove(&mut self, entity: EntityId) -> Option<Vec<KindId>> {
        let record = self.records.remove(&entity)?;
        if let Some(parent) = record.parent
            && let Some(parent_record) = self.records.get_mut(&parent)
        {
            parent_record.children.remove(&entity);
        }
        for child in &record.children {
            if let Some(child_record) = self.records.get_mut(child) {
                child_record.parent = None;
            }
        }
        Some(record.kinds.into_iter().collect())
    }

    /// Link `child` under `parent`, or detach it when `parent` is `None`.
    ///
    /// Fails if the link would make the parent chain cyclic.
    pub fn set_parent(
        &mut self,
        child: EntityId,
        parent: Option<EntityId>,
    ) -> Result<(), ParentError> {
        if !self.contains(child) {
            return Err(ParentError::UnknownEntity(child));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(ParentError::UnknownEntity(parent));
            }
            // Walk up from the prospective parent; finding the child there
            // means the link would close a cycle.
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == child {
                    return Err(ParentError::Cycle);
                }
                cursor = self.parent(current);
            }
        }

        if let Some(old) = self.records.get(&child).and_then(|r| r.parent)
            && let Some(old_record) = self.records.get_mut(&old)
        {
            old_record.children.remove(&child);
        }
        if let Some(record) = self.records.get_mut(&child) {
            record.parent = parent;
        }
        if let Some(parent) = parent
            && let Some(parent_record) = self.records.get_mut(&parent)
        {
            parent_record.children.insert(child);
        }
        Ok(())
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.records.get(&entity).and_then(|r| r.parent)
    }

    pub fn children(&self, entity: EntityId) -> Vec<EntityId> {
        self.records
            .get(&entity)
            .map(|r| r.children.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn mark_kind(&mut self, entity: EntityId, kind: KindId) {
        if let Some(record) = self.records.get_mut(&entity) {
            record.kinds.insert(kind);
        }
    }

    pub fn clear_kind(&mut self, entity: EntityId, kind: KindId) {
        if let Some(record) = self.records.get_mut(&entity) {
            record.kinds.remove(&kind);
        }
    }

    pub fn kinds_of(&self, entity: EntityId) -> Vec<KindId> {
        self.records
            .get(&entity)
            .map(|r| r.kinds.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Errors from hierarchy edits.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParentError {
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error("parent link would create a cycle")]
    Cycle,
}
