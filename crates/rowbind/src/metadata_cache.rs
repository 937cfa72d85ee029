//! Process-wide cache of type descriptors.
//!
//! A type's members are reflected the first time its descriptor is requested
//! and the result is shared for the rest of the process. Entries are never
//! evicted or invalidated: the set of mapped types is fixed at compile time.
//!
//! ## Lifecycle
//!
//! 1. The first lookup for a type misses, calls `Reflect::reflect_members`
//!    outside the lock and builds the descriptor
//! 2. The descriptor is inserted under the write lock unless another thread
//!    got there first, in which case the existing descriptor is returned
//! 3. Later lookups take the read lock only and return the shared `Arc`

use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::reflect::{Reflect, TypeDescriptor};

static GLOBAL: Lazy<TypeDescriptorCache> = Lazy::new(TypeDescriptorCache::new);

/// Cache of type descriptors keyed by type identity.
pub struct TypeDescriptorCache {
    descriptors: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    /// Total number of cache hits (for metrics).
    hits: AtomicU64,
    /// Total number of cache misses (for metrics).
    misses: AtomicU64,
}

impl TypeDescriptorCache {
    /// Create a new empty cache.
    ///
    /// Most callers use [`TypeDescriptorCache::global`]; separate instances
    /// are useful for isolating tests.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Get the descriptor for `T`, reflecting it on first use.
    pub fn descriptor<T: Reflect>(&self) -> Arc<TypeDescriptor> {
        let key = TypeId::of::<T>();

        if let Some(descriptor) = self.descriptors.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(type_name = descriptor.type_name(), "type descriptor cache hit");
            return Arc::clone(descriptor);
        }

        let built = Arc::new(TypeDescriptor::of::<T>());

        let mut descriptors = self.descriptors.write();
        match descriptors.entry(key) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    type_name = entry.get().type_name(),
                    "type descriptor populated concurrently"
                );
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(type_name = built.type_name(), "type descriptor cache miss");
                tracing::debug!(
                    type_name = built.type_name(),
                    members = built.len(),
                    anonymous = built.is_anonymous(),
                    "built type descriptor"
                );
                Arc::clone(entry.insert(built))
            }
        }
    }

    /// Check if the descriptor for `T` has been built.
    #[must_use]
    pub fn contains<T: Reflect>(&self) -> bool {
        self.descriptors.read().contains_key(&TypeId::of::<T>())
    }

    /// Get the number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Get the number of cache hits.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of cache misses.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for TypeDescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeDescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptorCache")
            .field("len", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

/// Get the descriptor for `T` from the process-wide cache.
pub fn descriptor<T: Reflect>() -> Arc<TypeDescriptor> {
    TypeDescriptorCache::global().descriptor::<T>()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reflect::MemberDescriptor;

    #[derive(Default)]
    struct Probe {
        id: i64,
        label: String,
    }

    impl Reflect for Probe {
        fn type_name() -> &'static str {
            "Probe"
        }

        fn reflect_members() -> Vec<MemberDescriptor> {
            vec![
                MemberDescriptor::field::<Self, i64>("Id", |p| &p.id, |p| &mut p.id),
                MemberDescriptor::field::<Self, String>("Label", |p| &p.label, |p| &mut p.label),
            ]
        }
    }

    #[derive(Default)]
    struct Empty;

    impl Reflect for Empty {
        fn type_name() -> &'static str {
            "Empty"
        }
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let cache = TypeDescriptorCache::new();
        assert!(cache.is_empty());
        assert!(!cache.contains::<Probe>());

        let first = cache.descriptor::<Probe>();
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);

        let second = cache.descriptor::<Probe>();
        assert_eq!(cache.hits(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_repeated_lookups_return_identical_members() {
        let cache = TypeDescriptorCache::new();
        let first: Vec<String> = cache
            .descriptor::<Probe>()
            .member_names()
            .map(str::to_owned)
            .collect();
        let second: Vec<String> = cache
            .descriptor::<Probe>()
            .member_names()
            .map(str::to_owned)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["Id", "Label"]);
    }

    #[test]
    fn test_type_without_members() {
        let cache = TypeDescriptorCache::new();
        let descriptor = cache.descriptor::<Empty>();
        assert!(descriptor.is_empty());
        assert_eq!(descriptor.type_name(), "Empty");
    }

    #[test]
    fn test_concurrent_first_lookup_shares_one_descriptor() {
        let cache = Arc::new(TypeDescriptorCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.descriptor::<Probe>())
            })
            .collect();

        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for descriptor in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], descriptor));
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 7);
    }

    #[test]
    fn test_global_cache() {
        let descriptor = descriptor::<Probe>();
        assert!(TypeDescriptorCache::global().contains::<Probe>());
        assert_eq!(descriptor.len(), 2);
    }
}
