//! # IDs
//! Items, layers, pages and visuals are referred to across history entries by stable IDs rather than by
//! pointers, so an entry stays valid no matter how the containers around it are rearranged.
//!
//! `InkID<T>` is namespaced by `T`: an `InkID<Item>` and an `InkID<Page>` may share a numeric value,
//! but can never be compared. Fresh IDs come from `InkID::default()`.

use std::sync::atomic::{AtomicU64, Ordering};

// Next free value per namespace. Entries are only ever inserted, a handful of times per process.
static COUNTERS: parking_lot::RwLock<std::collections::BTreeMap<std::any::TypeId, AtomicU64>> =
    parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// ID that is unique within this execution of the program, within the namespace `T`.
pub struct InkID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    // fn() -> T keeps the ID Send + Sync regardless of T.
    _namespace: std::marker::PhantomData<fn() -> T>,
}
impl<T: std::any::Any> Clone for InkID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for InkID<T> {}
impl<T: std::any::Any> PartialEq for InkID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for InkID<T> {}
impl<T: std::any::Any> PartialOrd for InkID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
/// Ordering is allocation order. Useful for deterministic iteration, nothing more.
impl<T: std::any::Any> Ord for InkID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
impl<T: std::any::Any> std::hash::Hash for InkID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: std::any::Any> InkID<T> {
    /// Raw numeric value. Only unique together with the namespace!
    #[must_use]
    pub fn get(&self) -> u64 {
        self.id.get()
    }
    fn allocate() -> Self {
        let ty = std::any::TypeId::of::<T>();
        let value = {
            let read = COUNTERS.upgradable_read();
            if let Some(counter) = read.get(&ty) {
                counter.fetch_add(1, Ordering::Relaxed)
            } else {
                let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
                // First ID handed out is 1, the map remembers the next one.
                write.insert(ty, AtomicU64::new(2));
                1
            }
        };
        // 2^64 allocations won't happen, but a silent wrap would hand out duplicates.
        let Some(id) = std::num::NonZeroU64::new(value) else {
            panic!("{} ID space exhausted", std::any::type_name::<T>());
        };
        Self {
            id,
            _namespace: std::marker::PhantomData,
        }
    }
}
impl<T: std::any::Any> Default for InkID<T> {
    fn default() -> Self {
        Self::allocate()
    }
}
impl<T: std::any::Any> std::fmt::Display for InkID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // rsplit always yields at least one element.
        let name = std::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        write!(f, "{name}#{}", self.id)
    }
}
impl<T: std::any::Any> std::fmt::Debug for InkID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::InkID;

    #[test]
    fn unique_within_namespace() {
        struct Namespace;
        let mut ids: Vec<InkID<Namespace>> = (0..512).map(|_| InkID::default()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(before, ids.len(), "had duplicate ids");
    }
    #[test]
    fn namespaces_count_separately() {
        struct First;
        struct Second;
        let a = InkID::<First>::default();
        let b = InkID::<Second>::default();
        // Fresh namespaces both start at one.
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
    }
    #[test]
    fn display_names_namespace() {
        struct Widget;
        let id = InkID::<Widget>::default();
        assert_eq!(id.to_string(), format!("Widget#{}", id.get()));
    }
}
