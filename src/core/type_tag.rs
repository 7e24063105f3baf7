//! Runtime type tags for attachable objects.
//!
//! Every concrete object type gets a dense integer tag the first time it is
//! queried. Tags are unique per type for the lifetime of the process and are
//! compared instead of performing a full downcast when the scene manager sorts
//! objects into render queues.

use std::any::TypeId;
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Dense per-type identifier. `0` is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(u32);

impl TypeTag {
    #[inline]
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_TAG: AtomicU32 = AtomicU32::new(1);
static REGISTRY: LazyLock<RwLock<FxHashMap<TypeId, TypeTag>>> =
    LazyLock::new(|| RwLock::new(FxHashMap::default()));

/// Returns the tag of `T`, assigning a fresh one on first use.
///
/// Safe to call from any thread; concurrent first calls for the same type
/// observe the same tag.
#[must_use]
pub fn type_tag<T: ?Sized + 'static>() -> TypeTag {
    let id = TypeId::of::<T>();

    if let Some(tag) = REGISTRY.read().get(&id) {
        return *tag;
    }

    *REGISTRY
        .write()
        .entry(id)
        .or_insert_with(|| TypeTag(NEXT_TAG.fetch_add(1, Ordering::Relaxed)))
}
