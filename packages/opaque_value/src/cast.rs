//! Free functions for getting typed access to the value in an [`OpaqueValue`].
//!
//! The `downcast_*` functions report a mismatch as `None` and accept a container that may
//! itself be absent. The `cast*` functions report a mismatch as [`BadCast`].

use crate::{BadCast, OpaqueValue, Result};

/// Borrows the value held in `value` if there is a container, it is not empty and it holds
/// a `T`.
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, downcast_ref};
///
/// let value = OpaqueValue::from_value(42_i32);
///
/// assert_eq!(downcast_ref::<i32>(Some(&value)), Some(&42));
/// assert_eq!(downcast_ref::<f64>(Some(&value)), None);
/// assert_eq!(downcast_ref::<i32>(None), None);
/// ```
#[must_use]
pub fn downcast_ref<T: Clone + 'static>(value: Option<&OpaqueValue>) -> Option<&T> {
    value?.downcast_ref()
}

/// Mutably borrows the value held in `value` if there is a container, it is not empty and it
/// holds a `T`.
#[must_use]
pub fn downcast_mut<T: Clone + 'static>(value: Option<&mut OpaqueValue>) -> Option<&mut T> {
    value?.downcast_mut()
}

/// Returns a clone of the value held in `value`.
///
/// # Errors
///
/// Returns [`BadCast`] if `value` is empty or holds a value of a type other than `T`.
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, cast};
///
/// let value = OpaqueValue::from_value(String::from("copied"));
///
/// assert_eq!(cast::<String>(&value).unwrap(), "copied");
/// assert!(cast::<&str>(&value).is_err());
///
/// // The container still holds its own copy.
/// assert!(value.has_value());
/// ```
pub fn cast<T: Clone + 'static>(value: &OpaqueValue) -> Result<T> {
    cast_ref(value).cloned()
}

/// Borrows the value held in `value`.
///
/// # Errors
///
/// Returns [`BadCast`] if `value` is empty or holds a value of a type other than `T`.
pub fn cast_ref<T: Clone + 'static>(value: &OpaqueValue) -> Result<&T> {
    value
        .downcast_ref()
        .ok_or_else(|| BadCast::new::<T>(value.type_info()))
}

/// Mutably borrows the value held in `value`.
///
/// # Errors
///
/// Returns [`BadCast`] if `value` is empty or holds a value of a type other than `T`.
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, cast_mut};
///
/// let mut value = OpaqueValue::from_value(10_u32);
///
/// *cast_mut::<u32>(&mut value).unwrap() *= 2;
///
/// assert_eq!(value.downcast_ref::<u32>(), Some(&20));
/// ```
pub fn cast_mut<T: Clone + 'static>(value: &mut OpaqueValue) -> Result<&mut T> {
    let stored = value.type_info();

    value
        .downcast_mut()
        .ok_or_else(|| BadCast::new::<T>(stored))
}

/// Consumes `value` and returns the value it held, without cloning it.
///
/// # Errors
///
/// Returns [`BadCast`] if `value` is empty or holds a value of a type other than `T`. The
/// container and its value are dropped in that case; use [`OpaqueValue::take_as()`] to keep
/// the container on failure.
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, cast_into};
///
/// let value = OpaqueValue::from_value(vec![1_u8, 2, 3]);
///
/// assert_eq!(cast_into::<Vec<u8>>(value).unwrap(), vec![1, 2, 3]);
/// ```
pub fn cast_into<T: Clone + 'static>(mut value: OpaqueValue) -> Result<T> {
    value.take_as()
}

/// Exchanges the held values of two containers without allocating.
///
/// Equivalent to [`OpaqueValue::swap()`].
pub fn swap(a: &mut OpaqueValue, b: &mut OpaqueValue) {
    a.swap(b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeInfo;

    #[test]
    fn downcast_present_and_absent() {
        let mut value = OpaqueValue::from_value(3_i64);

        assert_eq!(downcast_ref::<i64>(Some(&value)), Some(&3));
        assert_eq!(downcast_ref::<u64>(Some(&value)), None);
        assert_eq!(downcast_ref::<i64>(None), None);

        *downcast_mut::<i64>(Some(&mut value)).unwrap() = 4;
        assert_eq!(downcast_ref::<i64>(Some(&value)), Some(&4));
        assert!(downcast_mut::<i64>(None).is_none());
    }

    #[test]
    fn empty_behaves_like_mismatch() {
        let mut empty = OpaqueValue::new();

        assert_eq!(downcast_ref::<i64>(Some(&empty)), None);
        assert!(downcast_mut::<i64>(Some(&mut empty)).is_none());

        let error = cast::<i64>(&empty).unwrap_err();
        assert_eq!(error.requested(), TypeInfo::of::<i64>());
        assert!(error.stored().is_none());

        assert!(cast_ref::<i64>(&empty).is_err());
        assert!(cast_mut::<i64>(&mut empty).is_err());
        assert!(cast_into::<i64>(empty).is_err());
    }

    #[test]
    fn cast_by_value_clones() {
        let value = OpaqueValue::from_value(vec![String::from("a")]);

        let mut copy = cast::<Vec<String>>(&value).unwrap();
        copy.push(String::from("b"));

        assert_eq!(value.downcast_ref::<Vec<String>>().unwrap().len(), 1);
    }

    #[test]
    fn cast_mismatch_reports_both_types() {
        let mut value = OpaqueValue::from_value(1_u8);

        let error = cast_ref::<i8>(&value).unwrap_err();
        assert_eq!(error.requested(), TypeInfo::of::<i8>());
        assert_eq!(error.stored(), TypeInfo::of::<u8>());

        let error = cast_mut::<bool>(&mut value).unwrap_err();
        assert_eq!(error.requested(), TypeInfo::of::<bool>());
        assert_eq!(error.stored(), TypeInfo::of::<u8>());
    }

    #[test]
    fn cast_into_moves_value() {
        let value = OpaqueValue::from_value(String::from("owned"));

        assert_eq!(cast_into::<String>(value).unwrap(), "owned");
    }

    #[test]
    fn swap_function_matches_method() {
        let mut a = OpaqueValue::from_value(1_u32);
        let mut b = OpaqueValue::new();

        swap(&mut a, &mut b);

        assert!(!a.has_value());
        assert_eq!(b.downcast_ref::<u32>(), Some(&1));
    }
}
