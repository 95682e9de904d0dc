//! Type-keyed lookup for service tables.

use std::any::{type_name, TypeId};
use std::hash::{Hash, Hasher};

/// A service key: `TypeId` plus the human-readable type name.
///
/// Hash and equality are on `TypeId` only. The name rides along for error
/// messages and snapshots so diagnostics never have to reverse-map a
/// `TypeId`.
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// The type name captured at registration.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Build the key for `T`, which may be a trait object.
pub fn key_of<T: ?Sized + 'static>() -> Key {
    Key {
        id: TypeId::of::<T>(),
        name: type_name::<T>(),
    }
}
