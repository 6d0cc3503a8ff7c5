use thiserror::Error;

use crate::TypeInfo;

/// A value-returning cast was attempted with a type that does not match the stored value.
///
/// Casting an empty container is reported the same way, with [`stored()`][Self::stored]
/// returning [`TypeInfo::none()`].
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, TypeInfo, cast};
///
/// let value = OpaqueValue::from_value(1.5_f64);
///
/// let error = cast::<u32>(&value).unwrap_err();
/// assert_eq!(error.requested(), TypeInfo::of::<u32>());
/// assert_eq!(error.stored(), TypeInfo::of::<f64>());
/// ```
///
/// The error converts into a boxed [`std::error::Error`], so `?` works in typical callers:
///
/// ```
/// use std::error::Error;
///
/// use opaque_value::*;
///
/// fn port(config: &OpaqueValue) -> Result<u16, Box<dyn Error>> {
///     Ok(cast::<u16>(config)?)
/// }
///
/// assert_eq!(port(&OpaqueValue::from_value(8080_u16)).unwrap(), 8080);
/// assert!(port(&OpaqueValue::from_value("8080")).is_err());
/// ```
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("bad cast: requested type `{requested}` does not match stored type `{stored}`")]
pub struct BadCast {
    requested: TypeInfo,
    stored: TypeInfo,
}

impl BadCast {
    #[must_use]
    pub(crate) fn new<T: 'static>(stored: TypeInfo) -> Self {
        Self {
            requested: TypeInfo::of::<T>(),
            stored,
        }
    }

    /// The type the caller asked for.
    #[must_use]
    pub fn requested(&self) -> TypeInfo {
        self.requested
    }

    /// The type held by the container at the time of the cast, or [`TypeInfo::none()`] if the
    /// container was empty.
    #[must_use]
    pub fn stored(&self) -> TypeInfo {
        self.stored
    }
}

/// A specialized `Result` type for casts, returning [`BadCast`] as the error value.
pub(crate) type Result<T> = std::result::Result<T, BadCast>;
