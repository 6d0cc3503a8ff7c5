use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use crate::{BadCast, Dispatch, Placement, Result, Storage, TypeInfo, dispatch};

/// A container that holds a single value of any cloneable `'static` type, or nothing.
///
/// The concrete type is chosen at the point where a value is put in and forgotten by the
/// container itself. Getting the value back out requires naming the type again, via
/// [`downcast_ref()`][Self::downcast_ref] and friends or the free functions in this crate such
/// as [`cast()`][crate::cast].
///
/// # Storage
///
/// Values of types no larger than a pointer (see [`INLINE_CAPACITY`][crate::INLINE_CAPACITY]
/// and [`INLINE_ALIGNMENT`][crate::INLINE_ALIGNMENT]) are stored inside the container. Larger
/// values are stored in a heap allocation owned by the container. The choice is made per type,
/// at compile time, and can be inspected via [`Placement::of()`].
///
/// # Copy and move
///
/// Cloning the container clones the held value into an independent container. Moving a value
/// between containers (via [`take()`][Self::take], [`assign()`][Self::assign] or
/// [`swap()`][Self::swap]) never allocates: a boxed value is handed over by pointer and an
/// inline value is moved bitwise.
///
/// # Examples
///
/// ```
/// use opaque_value::{OpaqueValue, Placement, TypeInfo};
///
/// let mut value = OpaqueValue::from_value(42_i32);
/// assert_eq!(value.type_info(), TypeInfo::of::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert_eq!(value.downcast_ref::<f64>(), None);
///
/// // Replace the value with one of another type.
/// let text = value.emplace(String::from("hello"));
/// text.push_str(", world");
///
/// assert_eq!(value.placement(), Some(Placement::Boxed));
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "hello, world");
///
/// value.reset();
/// assert!(!value.has_value());
/// ```
///
/// Only cloneable types can be stored, which is enforced at compile time:
///
/// ```compile_fail
/// use opaque_value::OpaqueValue;
///
/// struct NotClone;
///
/// let value = OpaqueValue::from_value(NotClone);
/// ```
///
/// The same applies when replacing the held value:
///
/// ```compile_fail
/// use opaque_value::OpaqueValue;
///
/// struct NotClone;
///
/// let mut value = OpaqueValue::new();
/// value.emplace(NotClone);
/// ```
///
/// # Nesting
///
/// A container is never stored inside another container. Passing an `OpaqueValue` where a
/// value is expected moves its held value over instead, as [`assign()`][Self::assign] would.
///
/// # Thread safety
///
/// The container is neither [`Send`] nor [`Sync`] because the type of the held value is not
/// known and may itself be neither.
pub struct OpaqueValue {
    /// The table for the held value's type and placement. `None` if and only if the container
    /// is empty, in which case `storage` holds nothing live.
    dispatch: Option<&'static Dispatch>,

    storage: Storage,
}

impl OpaqueValue {
    /// Creates an empty container.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let value = OpaqueValue::new();
    /// assert!(!value.has_value());
    /// assert!(value.type_info().is_none());
    /// ```
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            dispatch: None,
            storage: Storage::uninit(),
        }
    }

    /// Creates a container that holds `value`.
    ///
    /// If `value` is itself an `OpaqueValue`, the result holds whatever `value` held.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let value = OpaqueValue::from_value(vec![1, 2, 3]);
    /// assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
    ///
    /// let same = OpaqueValue::from_value(value.clone());
    /// assert!(same.is::<Vec<i32>>());
    /// ```
    #[must_use]
    pub fn from_value<T: Clone + 'static>(value: T) -> Self {
        let mut result = Self::new();
        _ = result.emplace(value);
        result
    }

    /// Creates a container that holds the value returned by `constructor`.
    ///
    /// The resulting state is identical to [`from_value()`][Self::from_value]. This form lets
    /// the stored type be named explicitly without constructing a temporary first.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let value = OpaqueValue::from_fn::<String>(|| "x".repeat(3));
    /// assert_eq!(value.downcast_ref::<String>().unwrap(), "xxx");
    /// ```
    #[must_use]
    pub fn from_fn<T: Clone + 'static>(constructor: impl FnOnce() -> T) -> Self {
        Self::from_value(constructor())
    }

    /// Whether the container holds a value.
    #[must_use]
    #[inline]
    pub fn has_value(&self) -> bool {
        self.dispatch.is_some()
    }

    /// Identity of the type of the held value, or [`TypeInfo::none()`] if empty.
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.dispatch.map_or_else(TypeInfo::none, Dispatch::type_info)
    }

    /// Whether the container holds a value of type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let value = OpaqueValue::from_value('c');
    /// assert!(value.is::<char>());
    /// assert!(!value.is::<u32>());
    /// ```
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.dispatch_for::<T>().is_some()
    }

    /// Where the held value is stored, or `None` if empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::{OpaqueValue, Placement};
    ///
    /// assert_eq!(OpaqueValue::from_value(1_u8).placement(), Some(Placement::Inline));
    /// assert_eq!(OpaqueValue::from_value([0_u8; 100]).placement(), Some(Placement::Boxed));
    /// assert_eq!(OpaqueValue::new().placement(), None);
    /// ```
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.dispatch.map(Dispatch::placement)
    }

    /// Drops the held value, if any, leaving the container empty.
    pub fn reset(&mut self) {
        // Cleared before destroying, so a panicking destructor cannot cause a second drop.
        if let Some(dispatch) = self.dispatch.take() {
            // SAFETY: The container held a value placed through this table.
            unsafe {
                dispatch.destroy(&mut self.storage);
            }
        }
    }

    /// Replaces the held value, if any, with `value`.
    pub fn set<T: Clone + 'static>(&mut self, value: T) {
        _ = self.emplace(value);
    }

    /// Replaces the held value, if any, with `value` and returns a reference to the new value.
    ///
    /// If `value` is itself an `OpaqueValue`, its held value is moved into this container and
    /// the returned reference is to this container.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let mut value = OpaqueValue::from_value(1.0_f32);
    ///
    /// let counter = value.emplace(0_u64);
    /// *counter += 5;
    ///
    /// assert_eq!(value.downcast_ref::<u64>(), Some(&5));
    /// ```
    pub fn emplace<T: Clone + 'static>(&mut self, value: T) -> &mut T {
        self.reset();

        if TypeInfo::of::<T>().is::<Self>() {
            let value = ManuallyDrop::new(value);

            // SAFETY: T is OpaqueValue, as checked above. The original is never dropped, so
            // ownership passes to the copy we read out.
            let mut source = unsafe { NonNull::from(&*value).cast::<Self>().read() };
            source.transfer_to(self);

            // SAFETY: T is OpaqueValue, as checked above.
            return unsafe { NonNull::from(self).cast::<T>().as_mut() };
        }

        let dispatch = dispatch::place(&mut self.storage, value);
        self.dispatch = Some(dispatch);

        // SAFETY: The value was just placed through this table.
        let ptr = unsafe { dispatch.access(NonNull::from(&mut self.storage)) };

        // SAFETY: The held value is a T and the region is exclusively borrowed for as long as
        // the reference lives.
        unsafe { ptr.cast::<T>().as_mut() }
    }

    /// Replaces the held value, if any, with the value returned by `constructor` and returns a
    /// reference to the new value.
    ///
    /// The old value is dropped before `constructor` is called. If `constructor` panics, the
    /// container is left empty.
    pub fn emplace_with<T: Clone + 'static>(&mut self, constructor: impl FnOnce() -> T) -> &mut T {
        self.reset();
        self.emplace(constructor())
    }

    /// Moves the held value into a new container, leaving this one empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let mut source = OpaqueValue::from_value(String::from("moved"));
    /// let target = source.take();
    ///
    /// assert!(!source.has_value());
    /// assert_eq!(target.downcast_ref::<String>().unwrap(), "moved");
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        let mut target = Self::new();
        self.transfer_to(&mut target);
        target
    }

    /// Drops the held value, if any, and moves the value of `source` into this container,
    /// leaving `source` empty.
    pub fn assign(&mut self, source: &mut Self) {
        self.reset();
        source.transfer_to(self);
    }

    /// Exchanges the held values of two containers without allocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let mut a = OpaqueValue::from_value(1_u8);
    /// let mut b = OpaqueValue::from_value(String::from("two"));
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(a.downcast_ref::<String>().unwrap(), "two");
    /// assert_eq!(b.downcast_ref::<u8>(), Some(&1));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        match (self.has_value(), other.has_value()) {
            (false, false) => {}
            (true, false) => self.transfer_to(other),
            (false, true) => other.transfer_to(self),
            (true, true) => {
                let mut scratch = Self::new();

                other.transfer_to(&mut scratch);
                self.transfer_to(other);
                scratch.transfer_to(self);
            }
        }
    }

    /// Borrows the held value if it is of type `T`.
    ///
    /// Returns `None` if the container is empty or holds a value of another type.
    ///
    /// Only cloneable types can be requested, as no other type can ever be stored:
    ///
    /// ```compile_fail
    /// use opaque_value::OpaqueValue;
    ///
    /// struct NotClone;
    ///
    /// let value = OpaqueValue::from_value(1_u8);
    /// let _ = value.downcast_ref::<NotClone>();
    /// ```
    #[must_use]
    pub fn downcast_ref<T: Clone + 'static>(&self) -> Option<&T> {
        let dispatch = self.dispatch_for::<T>()?;

        // SAFETY: The container holds a live value placed through this table.
        let ptr = unsafe { dispatch.access(NonNull::from(&self.storage)) };

        // SAFETY: The held value is a T and the region is borrowed for as long as the
        // reference lives.
        Some(unsafe { ptr.cast::<T>().as_ref() })
    }

    /// Mutably borrows the held value if it is of type `T`.
    ///
    /// Returns `None` if the container is empty or holds a value of another type.
    #[must_use]
    pub fn downcast_mut<T: Clone + 'static>(&mut self) -> Option<&mut T> {
        let dispatch = self.dispatch_for::<T>()?;

        // SAFETY: The container holds a live value placed through this table.
        let ptr = unsafe { dispatch.access(NonNull::from(&mut self.storage)) };

        // SAFETY: The held value is a T and the region is exclusively borrowed for as long as
        // the reference lives.
        Some(unsafe { ptr.cast::<T>().as_mut() })
    }

    /// Moves the held value out if it is of type `T`, leaving the container empty.
    ///
    /// # Errors
    ///
    /// Returns [`BadCast`] if the container is empty or holds a value of another type. The
    /// container is left unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use opaque_value::OpaqueValue;
    ///
    /// let mut value = OpaqueValue::from_value(vec![7_u8]);
    ///
    /// assert!(value.take_as::<String>().is_err());
    /// assert_eq!(value.take_as::<Vec<u8>>().unwrap(), vec![7]);
    /// assert!(!value.has_value());
    /// ```
    pub fn take_as<T: Clone + 'static>(&mut self) -> Result<T> {
        if !self.is::<T>() {
            return Err(BadCast::new::<T>(self.type_info()));
        }

        self.dispatch = None;

        // SAFETY: The container held a T, which is always placed by the strategy selected for
        // T. The container has been marked empty, so the value is not touched again.
        Ok(unsafe { dispatch::take::<T>(&mut self.storage) })
    }

    /// The bound table, if the held value is of type `T`.
    ///
    /// Matching is by type identity alone, so containers created anywhere in the program agree
    /// on whether they hold a `T`.
    fn dispatch_for<T: 'static>(&self) -> Option<&'static Dispatch> {
        self.dispatch
            .filter(|dispatch| dispatch.type_info().is::<T>())
    }

    /// Moves the held value, if any, into `target`, leaving this container empty.
    ///
    /// `target` must be empty.
    fn transfer_to(&mut self, target: &mut Self) {
        debug_assert!(!target.has_value());

        if let Some(dispatch) = self.dispatch.take() {
            // SAFETY: This container held a value placed through this table and the target
            // region is vacant.
            unsafe {
                dispatch.transfer(&mut self.storage, &mut target.storage);
            }

            target.dispatch = Some(dispatch);
        }
    }
}

impl Default for OpaqueValue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for OpaqueValue {
    fn clone(&self) -> Self {
        let mut result = Self::new();
        result.clone_from(self);
        result
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();

        if let Some(dispatch) = source.dispatch {
            // SAFETY: The source holds a value placed through this table and our region was
            // vacated by reset() above.
            unsafe {
                dispatch.clone_into(&source.storage, &mut self.storage);
            }

            self.dispatch = Some(dispatch);
        }
    }
}

impl Drop for OpaqueValue {
    fn drop(&mut self) {
        self.reset();
    }
}

impl fmt::Debug for OpaqueValue {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("type_info", &self.type_info())
            .field("placement", &self.placement())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::items_after_statements,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(OpaqueValue: Clone, Default, Debug);
    assert_not_impl_any!(OpaqueValue: Send, Sync);
    assert_eq_size!(OpaqueValue, [usize; 2]);

    /// Counts clones and drops of values derived from one original.
    #[derive(Debug)]
    struct Counted<const N: usize> {
        payload: [u8; N],
        clones: Rc<Cell<usize>>,
        drops: Rc<Cell<usize>>,
    }

    impl<const N: usize> Counted<N> {
        fn new() -> (Self, Rc<Cell<usize>>, Rc<Cell<usize>>) {
            let clones = Rc::new(Cell::new(0));
            let drops = Rc::new(Cell::new(0));

            (
                Self {
                    payload: [0; N],
                    clones: Rc::clone(&clones),
                    drops: Rc::clone(&drops),
                },
                clones,
                drops,
            )
        }
    }

    impl<const N: usize> Clone for Counted<N> {
        fn clone(&self) -> Self {
            self.clones.set(self.clones.get() + 1);

            Self {
                payload: self.payload,
                clones: Rc::clone(&self.clones),
                drops: Rc::clone(&self.drops),
            }
        }
    }

    impl<const N: usize> Drop for Counted<N> {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn new_is_empty() {
        let value = OpaqueValue::new();

        assert!(!value.has_value());
        assert!(value.type_info().is_none());
        assert_eq!(value.placement(), None);
        assert!(!OpaqueValue::default().has_value());
    }

    #[test]
    fn from_value_round_trip() {
        let value = OpaqueValue::from_value(42_i32);

        assert!(value.has_value());
        assert!(value.is::<i32>());
        assert_eq!(value.downcast_ref::<i32>(), Some(&42));
        assert_eq!(value.placement(), Some(Placement::Inline));
    }

    #[test]
    fn from_fn_matches_from_value() {
        let a = OpaqueValue::from_fn(|| String::from("same"));
        let b = OpaqueValue::from_value(String::from("same"));

        assert_eq!(a.type_info(), b.type_info());
        assert_eq!(a.placement(), b.placement());
        assert_eq!(a.downcast_ref::<String>(), b.downcast_ref::<String>());
    }

    #[test]
    fn downcast_mismatch_is_none() {
        let mut value = OpaqueValue::from_value(1_u32);

        assert_eq!(value.downcast_ref::<i32>(), None);
        assert_eq!(value.downcast_mut::<u64>(), None);
        assert!(value.has_value());
    }

    #[test]
    fn downcast_mut_modifies_value() {
        let mut value = OpaqueValue::from_value(vec![1]);

        value.downcast_mut::<Vec<i32>>().unwrap().push(2);

        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
    }

    #[test]
    fn reset_drops_value_once() {
        let (counted, _, drops) = Counted::<1>::new();
        let mut value = OpaqueValue::from_value(counted);

        value.reset();
        assert_eq!(drops.get(), 1);
        assert!(!value.has_value());
        assert!(value.type_info().is_none());

        value.reset();
        drop(value);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn drop_destroys_inline_and_boxed_values() {
        #[derive(Clone)]
        struct DropFlag(Rc<Cell<usize>>);

        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let small_drops = Rc::new(Cell::new(0));
        let (large, _, large_drops) = Counted::<64>::new();

        let small = OpaqueValue::from_value(DropFlag(Rc::clone(&small_drops)));
        let large = OpaqueValue::from_value(large);

        assert_eq!(small.placement(), Some(Placement::Inline));
        assert_eq!(large.placement(), Some(Placement::Boxed));

        drop(small);
        drop(large);

        assert_eq!(small_drops.get(), 1);
        assert_eq!(large_drops.get(), 1);
    }

    #[test]
    fn clone_is_independent() {
        let (counted, clones, drops) = Counted::<32>::new();
        let mut original = OpaqueValue::from_value(counted);

        let mut copy = original.clone();
        assert_eq!(clones.get(), 1);
        assert_eq!(copy.type_info(), original.type_info());

        copy.downcast_mut::<Counted<32>>().unwrap().payload[0] = 7;
        assert_eq!(original.downcast_ref::<Counted<32>>().unwrap().payload[0], 0);

        original.reset();
        assert_eq!(drops.get(), 1);
        assert_eq!(copy.downcast_ref::<Counted<32>>().unwrap().payload[0], 7);
    }

    #[test]
    fn clone_of_empty_is_empty() {
        let original = OpaqueValue::new();
        let copy = original.clone();

        assert!(!copy.has_value());
    }

    #[test]
    fn clone_from_replaces_existing_value() {
        let (old, _, old_drops) = Counted::<1>::new();
        let mut target = OpaqueValue::from_value(old);
        let source = OpaqueValue::from_value(5_u16);

        target.clone_from(&source);

        assert_eq!(old_drops.get(), 1);
        assert_eq!(target.downcast_ref::<u16>(), Some(&5));
        assert_eq!(source.downcast_ref::<u16>(), Some(&5));

        target.clone_from(&OpaqueValue::new());
        assert!(!target.has_value());
    }

    #[test]
    fn take_moves_without_cloning() {
        let (counted, clones, drops) = Counted::<32>::new();
        let mut source = OpaqueValue::from_value(counted);

        let target = source.take();

        assert!(!source.has_value());
        assert!(target.is::<Counted<32>>());
        assert_eq!(clones.get(), 0);
        assert_eq!(drops.get(), 0);

        drop(source);
        assert_eq!(drops.get(), 0);

        drop(target);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn take_of_empty_is_empty() {
        let mut source = OpaqueValue::new();

        assert!(!source.take().has_value());
        assert!(!source.has_value());
    }

    #[test]
    fn assign_drops_old_and_empties_source() {
        let (old, _, old_drops) = Counted::<1>::new();
        let mut target = OpaqueValue::from_value(old);
        let mut source = OpaqueValue::from_value(String::from("new"));

        target.assign(&mut source);

        assert_eq!(old_drops.get(), 1);
        assert!(!source.has_value());
        assert_eq!(target.downcast_ref::<String>().unwrap(), "new");

        let mut empty = OpaqueValue::new();
        target.assign(&mut empty);
        assert!(!target.has_value());
    }

    #[test]
    fn emplace_replaces_and_returns_reference() {
        let (old, _, old_drops) = Counted::<1>::new();
        let mut value = OpaqueValue::from_value(old);

        let slot = value.emplace(String::from("a"));
        slot.push('b');

        assert_eq!(old_drops.get(), 1);
        assert_eq!(value.downcast_ref::<String>().unwrap(), "ab");

        *value.emplace(3_u8) += 1;
        assert_eq!(value.downcast_ref::<u8>(), Some(&4));
    }

    #[test]
    fn emplace_with_panic_leaves_empty() {
        let (old, _, old_drops) = Counted::<1>::new();
        let mut value = OpaqueValue::from_value(old);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            value.emplace_with::<u32>(|| panic!("constructor failed"));
        }));

        assert!(result.is_err());
        assert_eq!(old_drops.get(), 1);
        assert!(!value.has_value());
    }

    #[test]
    fn set_replaces_value() {
        let mut value = OpaqueValue::new();

        value.set(1.5_f64);
        assert!(value.is::<f64>());

        value.set('z');
        assert_eq!(value.downcast_ref::<char>(), Some(&'z'));
    }

    #[test]
    fn take_as_success_and_failure() {
        let mut value = OpaqueValue::from_value(String::from("out"));

        let error = value.take_as::<u8>().unwrap_err();
        assert_eq!(error.requested(), TypeInfo::of::<u8>());
        assert_eq!(error.stored(), TypeInfo::of::<String>());
        assert!(value.has_value());

        assert_eq!(value.take_as::<String>().unwrap(), "out");
        assert!(!value.has_value());

        let error = value.take_as::<String>().unwrap_err();
        assert!(error.stored().is_none());
    }

    #[test]
    fn swap_both_empty() {
        let mut a = OpaqueValue::new();
        let mut b = OpaqueValue::new();

        a.swap(&mut b);

        assert!(!a.has_value());
        assert!(!b.has_value());
    }

    #[test]
    fn swap_one_empty() {
        let mut a = OpaqueValue::from_value(9_i8);
        let mut b = OpaqueValue::new();

        a.swap(&mut b);
        assert!(!a.has_value());
        assert_eq!(b.downcast_ref::<i8>(), Some(&9));

        a.swap(&mut b);
        assert_eq!(a.downcast_ref::<i8>(), Some(&9));
        assert!(!b.has_value());
    }

    #[test]
    fn swap_both_full_without_clone_or_drop() {
        let (left, left_clones, left_drops) = Counted::<1>::new();
        let (right, right_clones, right_drops) = Counted::<64>::new();

        let mut a = OpaqueValue::from_value(left);
        let mut b = OpaqueValue::from_value(right);

        a.swap(&mut b);

        assert!(a.is::<Counted<64>>());
        assert!(b.is::<Counted<1>>());
        assert_eq!(left_clones.get() + right_clones.get(), 0);
        assert_eq!(left_drops.get() + right_drops.get(), 0);
    }

    #[test]
    fn from_value_of_container_does_not_nest() {
        let outer = OpaqueValue::from_value(OpaqueValue::from_value(42_i32).clone());

        assert!(outer.is::<i32>());
        assert_eq!(outer.type_info(), TypeInfo::of::<i32>());
        assert_eq!(outer.downcast_ref::<i32>(), Some(&42));
        assert!(!outer.is::<OpaqueValue>());

        let outer = OpaqueValue::from_value(OpaqueValue::new());
        assert!(!outer.has_value());

        let outer = OpaqueValue::from_fn(|| OpaqueValue::from_value('n'));
        assert_eq!(outer.downcast_ref::<char>(), Some(&'n'));
    }

    #[test]
    fn set_container_moves_without_cloning() {
        let (counted, clones, drops) = Counted::<32>::new();
        let (old, _, old_drops) = Counted::<1>::new();

        let mut target = OpaqueValue::from_value(old);
        target.set(OpaqueValue::from_value(counted));

        assert_eq!(old_drops.get(), 1);
        assert!(target.is::<Counted<32>>());
        assert_eq!(clones.get(), 0);
        assert_eq!(drops.get(), 0);

        drop(target);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn emplace_container_returns_self() {
        let mut value = OpaqueValue::from_value(String::from("old"));

        let inner = value.emplace(OpaqueValue::from_value(5_u64));
        assert_eq!(inner.downcast_ref::<u64>(), Some(&5));

        *inner.downcast_mut::<u64>().unwrap() = 6;
        assert_eq!(value.downcast_ref::<u64>(), Some(&6));

        _ = value.emplace_with(OpaqueValue::new);
        assert!(!value.has_value());
    }

    #[test]
    fn debug_reports_type_and_placement() {
        let text = format!("{:?}", OpaqueValue::from_value(1_u8));

        assert!(text.contains("u8"));
        assert!(text.contains("Inline"));

        let text = format!("{:?}", OpaqueValue::new());
        assert!(text.contains("<none>"));
    }
}
