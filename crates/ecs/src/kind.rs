use std::any::TypeId;
use std::collections::HashMap;

/// A plain data record attached to entities.
///
/// `NAME` is the stable identifier used at serialization and tooling
/// boundaries; the numeric [`KindId`] is a per-context table index with no
/// cross-run meaning.
pub trait Component: 'static {
    const NAME: &'static str;
}

/// Dense identifier for a component kind within one [`crate::Ecs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(pub(crate) usize);

impl KindId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Assigns kind ids from a monotonically increasing counter, first access
/// wins. Owned by the `Ecs` context, not a static.
#[derive(Debug, Default)]
pub(crate) struct KindRegistry {
    ids: HashMap<TypeId, KindId>,
    names: Vec<&'static str>,
}

impl KindRegistry {
    pub fn id_or_register<T: Component>(&mut self) -> KindId {
        let next = KindId(self.names.len());
        *self.ids.entry(TypeId::of::<T>()).or_insert_with(|| {
            self.names.push(T::NAME);
            next
        })
    }

    pub fn id<T: Component>(&self) -> Option<KindId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    pub fn name(&self, kind: KindId) -> &'static str {
        self.names.get(kind.0).copied().unwrap_or("<unregistered>")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
