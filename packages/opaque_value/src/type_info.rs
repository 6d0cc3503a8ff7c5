use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Uninhabited marker whose identity stands for "no type". No value of it can ever be stored.
enum Vacant {}

const VACANT_NAME: &str = "<none>";

/// Runtime identity of the type stored in an [`OpaqueValue`][crate::OpaqueValue].
///
/// Two `TypeInfo` instances compare equal if and only if they describe the same type. The
/// human-readable name is carried along for diagnostics and is not part of the comparison.
///
/// An empty container reports [`TypeInfo::none()`], which is distinct from the identity of every
/// storable type, including `()`.
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, TypeInfo};
///
/// let value = OpaqueValue::from_value(42_i32);
/// assert_eq!(value.type_info(), TypeInfo::of::<i32>());
/// assert_eq!(value.type_info().name(), "i32");
///
/// let empty = OpaqueValue::new();
/// assert!(empty.type_info().is_none());
/// ```
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// The identity of type `T`.
    #[must_use]
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The "no type" sentinel reported by empty containers.
    #[must_use]
    #[inline]
    pub fn none() -> Self {
        Self {
            id: TypeId::of::<Vacant>(),
            name: VACANT_NAME,
        }
    }

    /// Whether this is the "no type" sentinel.
    #[must_use]
    #[inline]
    pub fn is_none(&self) -> bool {
        self.id == TypeId::of::<Vacant>()
    }

    /// Whether this identifies type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The [`TypeId`] of the described type.
    #[must_use]
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable name of the described type, as reported by [`std::any::type_name()`].
    ///
    /// The exact contents are not guaranteed to be stable across compiler versions.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeInfo").field(&self.name).finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
