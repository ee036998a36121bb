use crate::ecs::Ecs;
use crate::kind::{Component, KindId};
use vesta_common::EntityId;

/// A tuple of component kinds requested from [`Ecs::select`].
///
/// Implemented for tuples of one to four kinds. The join is an inner
/// join: an entity appears only if it owns every requested kind.
pub trait Selection {
    type Refs<'a>;

    /// Kind ids for every requested component, or `None` when any kind
    /// has never been registered in this context.
    fn kind_ids(ecs: &Ecs) -> Option<Vec<KindId>>;

    /// Borrow all requested components of one entity, or `None` when the
    /// entity does not own the full set.
    fn fetch<'a>(ecs: &'a Ecs, entity: EntityId) -> Option<Self::Refs<'a>>;
}

macro_rules! impl_selection {
    ($($t:ident),+) => {
        impl<$($t: Component),+> Selection for ($($t,)+) {
            type Refs<'a> = ($(&'a $t,)+);

            fn kind_ids(ecs: &Ecs) -> Option<Vec<KindId>> {
                Some(vec![$(ecs.kind_id::<$t>()?),+])
            }

            fn fetch<'a>(ecs: &'a Ecs, entity: EntityId) -> Option<Self::Refs<'a>> {
                Some(($(ecs.get::<$t>(entity).ok()?,)+))
            }
        }
    };
}

impl_selection!(A);
impl_selection!(A, B);
impl_selection!(A, B, C);
impl_selection!(A, B, C, D);
