use crate::{
    all_tuples,
    ecs::{
        component::{Component, Subsets},
        registry::Id,
    },
};

/// An ascending, duplicate free set of component ids.
///
/// Sets are used as lookup keys for component combinations, so two sets built from the same ids
/// in any order compare and hash equal.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdSet {
    ids: Vec<Id>,
}

impl IdSet {
    /// The empty set.
    pub const EMPTY: Self = IdSet { ids: Vec::new() };

    /// Construct a new set from the given ids.
    #[inline]
    pub fn new(ids: impl Into<Vec<Id>>) -> Self {
        let mut ids = ids.into();
        ids.sort();
        ids.dedup();
        ids.shrink_to_fit();

        Self { ids }
    }

    /// Construct a set from ids already in ascending order without duplicates.
    #[inline]
    pub(crate) fn from_sorted(ids: Vec<Id>) -> Self {
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        Self { ids }
    }

    /// Get the ids in ascending order.
    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    /// Determine if this set contains the given id.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Determine if this set contains every id in the other set.
    #[inline]
    pub fn contains_all(&self, other: &IdSet) -> bool {
        other.ids.iter().all(|id| self.contains(*id))
    }

    /// Determine if this set contains any id in the other set.
    #[inline]
    pub fn contains_any(&self, other: &IdSet) -> bool {
        other.ids.iter().any(|id| self.contains(*id))
    }

    /// Create a new set that is the union with the other set.
    #[inline]
    pub fn union(&self, other: &IdSet) -> Self {
        let mut ids = Vec::with_capacity(self.ids.len() + other.ids.len());
        ids.extend_from_slice(&self.ids);
        ids.extend_from_slice(&other.ids);
        Self::new(ids)
    }

    /// Get the ids in self that are not in other.
    #[inline]
    pub fn difference(&self, other: &IdSet) -> Self {
        let ids = self
            .ids
            .iter()
            .copied()
            .filter(|id| !other.contains(*id))
            .collect();
        Self::from_sorted(ids)
    }

    /// Get the ids in both self and other.
    #[inline]
    pub fn intersection(&self, other: &IdSet) -> Self {
        let ids = self
            .ids
            .iter()
            .copied()
            .filter(|id| other.contains(*id))
            .collect();
        Self::from_sorted(ids)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Enumerate the subsets of this set from most to least specific.
    ///
    /// See [`Subsets`] for the exact order. Each call starts a fresh enumeration.
    #[inline]
    pub fn subsets(&self) -> Subsets<'_> {
        Subsets::new(&self.ids)
    }

    /// Try `lookup` against each subset in [`subsets`](Self::subsets) order and return the first
    /// hit.
    ///
    /// On a miss the full set is tried twice, once per emission.
    pub fn find_fallback<T>(&self, mut lookup: impl FnMut(&IdSet) -> Option<T>) -> Option<T> {
        self.subsets().find_map(|subset| lookup(&subset))
    }
}

impl From<Vec<Id>> for IdSet {
    #[inline]
    fn from(value: Vec<Id>) -> Self {
        IdSet::new(value)
    }
}

impl FromIterator<Id> for IdSet {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        IdSet::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Trait for types naming a fixed set of components.
pub trait IntoIdSet {
    fn id_set() -> IdSet;
}

impl IntoIdSet for () {
    fn id_set() -> IdSet {
        IdSet::EMPTY
    }
}

impl<C: Component> IntoIdSet for C {
    fn id_set() -> IdSet {
        IdSet::new([C::ID])
    }
}

macro_rules! tuple_id_set {
    ($($name: ident),*) => {
        impl<$($name: IntoIdSet),*> IntoIdSet for ($($name,)*) {
            fn id_set() -> IdSet {
                let mut ids = Vec::new();
                $(
                    ids.extend(<$name>::id_set().ids());
                )*
                IdSet::new(ids)
            }
        }
    }
}

all_tuples!(tuple_id_set);
