use std::fmt;

use crate::Storage;

/// Where an [`OpaqueValue`][crate::OpaqueValue] keeps a stored value.
///
/// The placement is a property of the stored type, not of an individual container: every value
/// of a given type is stored the same way.
///
/// # Examples
///
/// ```
/// use opaque_value::Placement;
///
/// assert_eq!(Placement::of::<u32>(), Placement::Inline);
/// assert_eq!(Placement::of::<[u64; 4]>(), Placement::Boxed);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Placement {
    /// The value lives directly inside the container, no heap allocation is involved.
    Inline,

    /// The value lives in a heap allocation owned by the container.
    Boxed,
}

impl Placement {
    /// Determines the placement used for values of type `T`.
    ///
    /// A type is stored inline if its size does not exceed
    /// [`INLINE_CAPACITY`][crate::INLINE_CAPACITY] and its alignment does not exceed
    /// [`INLINE_ALIGNMENT`][crate::INLINE_ALIGNMENT]. All other types are boxed.
    #[must_use]
    #[inline]
    pub const fn of<T>() -> Self {
        if Storage::fits::<T>() {
            Self::Inline
        } else {
            Self::Boxed
        }
    }
}

impl fmt::Display for Placement {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Boxed => f.write_str("boxed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn small_types_are_inline() {
        assert_eq!(Placement::of::<()>(), Placement::Inline);
        assert_eq!(Placement::of::<bool>(), Placement::Inline);
        assert_eq!(Placement::of::<i32>(), Placement::Inline);
        assert_eq!(Placement::of::<Rc<String>>(), Placement::Inline);
        assert_eq!(Placement::of::<Option<Box<u8>>>(), Placement::Inline);
    }

    #[test]
    fn large_types_are_boxed() {
        assert_eq!(Placement::of::<String>(), Placement::Boxed);
        assert_eq!(Placement::of::<(u64, u64)>(), Placement::Boxed);
        assert_eq!(Placement::of::<[u8; 64]>(), Placement::Boxed);
    }

    #[test]
    fn decision_is_usable_in_const_context() {
        const PLACEMENT: Placement = Placement::of::<u16>();

        assert_eq!(PLACEMENT, Placement::Inline);
    }
}
