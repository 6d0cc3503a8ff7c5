//! A type-erased container for a single value of any cloneable type, storing small values
//! inline and larger ones on the heap.
//!
//! This package provides [`OpaqueValue`], which can hold a value of any `Clone + 'static` type
//! chosen at the point of insertion, or nothing at all. The container forgets the concrete type;
//! the caller names it again to get typed access back.
//!
//! # Features
//!
//! - **Any cloneable type**: The stored type does not need to implement any trait from this
//!   crate. Copying the container copies the value.
//! - **Small value optimization**: Values that fit in a pointer-sized region are stored inline.
//!   Only larger values cause a heap allocation. See [`Placement`].
//! - **Allocation-free moves**: [`take()`][OpaqueValue::take], [`assign()`][OpaqueValue::assign]
//!   and [`swap()`][OpaqueValue::swap] never allocate or clone.
//! - **Checked casts**: [`downcast_ref()`] and friends return `None` on a type mismatch, while
//!   [`cast()`] and friends return a [`BadCast`] error.
//! - **Compile-time rejection**: Types that cannot be cloned are rejected by the compiler.
//!
//! # Example
//!
//! ```rust
//! use opaque_value::{OpaqueValue, Placement, TypeInfo, cast, downcast_ref};
//!
//! let mut a = OpaqueValue::from_value(42_i32);
//! assert_eq!(a.type_info(), TypeInfo::of::<i32>());
//! assert_eq!(a.placement(), Some(Placement::Inline));
//! assert_eq!(cast::<i32>(&a).unwrap(), 42);
//! assert_eq!(downcast_ref::<f64>(Some(&a)), None);
//!
//! let mut b = OpaqueValue::from_value([1.0_f64; 16]);
//! assert_eq!(b.placement(), Some(Placement::Boxed));
//!
//! a.swap(&mut b);
//! assert!(a.is::<[f64; 16]>());
//! assert!(b.is::<i32>());
//!
//! let c = a.take();
//! assert!(!a.has_value());
//! assert_eq!(c.downcast_ref::<[f64; 16]>(), Some(&[1.0; 16]));
//! ```
//!
//! # Matching rule
//!
//! A cast succeeds if and only if the [`TypeId`][std::any::TypeId] of the requested type equals
//! that of the stored type. There is no coercion between distinct types, not even between types
//! with identical layout.

mod cast;
mod dispatch;
mod error;
mod inline;
mod owned;
mod placement;
mod storage;
mod type_info;
mod value;

pub use cast::*;
pub(crate) use dispatch::{Dispatch, Strategy};
pub use error::BadCast;
pub(crate) use error::Result;
pub(crate) use inline::Inline;
pub(crate) use owned::Owned;
pub use placement::Placement;
pub use storage::{INLINE_ALIGNMENT, INLINE_CAPACITY};
pub(crate) use storage::Storage;
pub use type_info::TypeInfo;
pub use value::OpaqueValue;
