use std::fmt;
use std::ptr::NonNull;

use crate::{Inline, Owned, Placement, Storage, TypeInfo};

/// A way of keeping values of one concrete type in a [`Storage`] region.
///
/// Each implementation is a zero-sized marker closed over the stored type. The container never
/// sees the implementation directly; it only sees the [`Dispatch`] table derived from it.
///
/// All operations except [`place()`][Self::place] require the region to currently hold a live
/// value that was put there by the same strategy.
pub(crate) trait Strategy: 'static {
    type Value: Clone + 'static;

    const PLACEMENT: Placement;

    /// The operation table that forwards to this strategy.
    const DISPATCH: &'static Dispatch = &Dispatch::of::<Self>();

    /// Puts `value` into a region that holds no live value.
    ///
    /// # Safety
    ///
    /// The region must not hold a live value (it would be leaked), and the strategy must be
    /// the one selected for `Self::Value`.
    unsafe fn place(storage: &mut Storage, value: Self::Value);

    /// # Safety
    ///
    /// The region behind `storage` must hold a live value placed by this strategy. Writing
    /// through the returned pointer is only allowed if `storage` permits writes.
    unsafe fn access(storage: NonNull<Storage>) -> NonNull<Self::Value>;

    /// # Safety
    ///
    /// `source` must hold a live value placed by this strategy and `target` must not hold
    /// any live value.
    unsafe fn clone_into(source: &Storage, target: &mut Storage);

    /// # Safety
    ///
    /// The region must hold a live value placed by this strategy. It holds none afterwards.
    unsafe fn destroy(storage: &mut Storage);

    /// # Safety
    ///
    /// `source` must hold a live value placed by this strategy and `target` must not hold
    /// any live value. Afterwards, only `target` holds the value.
    unsafe fn transfer(source: &mut Storage, target: &mut Storage);

    /// Moves the value out of the region.
    ///
    /// # Safety
    ///
    /// The region must hold a live value placed by this strategy. It holds none afterwards.
    unsafe fn take(storage: &mut Storage) -> Self::Value;
}

/// Operation table bound to one concrete type and one [`Strategy`].
///
/// This plays the role of a vtable for types that share no common trait. A container refers to
/// exactly one table while it holds a value and to none while it is empty, so the reference is
/// both the type tag and the means of operating on the value.
pub(crate) struct Dispatch {
    identify: fn() -> TypeInfo,
    placement: Placement,
    access: unsafe fn(NonNull<Storage>) -> NonNull<()>,
    clone: unsafe fn(&Storage, &mut Storage),
    destroy: unsafe fn(&mut Storage),
    transfer: unsafe fn(&mut Storage, &mut Storage),
}

impl Dispatch {
    const fn of<S: Strategy + ?Sized>() -> Self {
        Self {
            identify: TypeInfo::of::<S::Value>,
            placement: S::PLACEMENT,
            access: access_erased::<S>,
            clone: S::clone_into,
            destroy: S::destroy,
            transfer: S::transfer,
        }
    }

    /// Identify: the runtime identity of the stored type.
    #[must_use]
    pub(crate) fn type_info(&self) -> TypeInfo {
        (self.identify)()
    }

    #[must_use]
    pub(crate) fn placement(&self) -> Placement {
        self.placement
    }

    /// Access: pointer to the live value, with the stored type erased.
    ///
    /// # Safety
    ///
    /// `storage` must point to a region holding a live value placed through this table.
    #[must_use]
    pub(crate) unsafe fn access(&self, storage: NonNull<Storage>) -> NonNull<()> {
        // SAFETY: Forwarding guarantee from caller.
        unsafe { (self.access)(storage) }
    }

    /// Clone: constructs an independent copy of the value in `target`.
    ///
    /// # Safety
    ///
    /// `source` must hold a live value placed through this table and `target` must not hold
    /// any live value.
    pub(crate) unsafe fn clone_into(&self, source: &Storage, target: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller.
        unsafe { (self.clone)(source, target) }
    }

    /// Destroy: ends the life of the value.
    ///
    /// # Safety
    ///
    /// `storage` must hold a live value placed through this table.
    pub(crate) unsafe fn destroy(&self, storage: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller.
        unsafe { (self.destroy)(storage) }
    }

    /// Transfer: moves the value from `source` to `target`.
    ///
    /// # Safety
    ///
    /// `source` must hold a live value placed through this table and `target` must not hold
    /// any live value.
    pub(crate) unsafe fn transfer(&self, source: &mut Storage, target: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller.
        unsafe { (self.transfer)(source, target) }
    }
}

impl fmt::Debug for Dispatch {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("type_info", &self.type_info())
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

/// # Safety
///
/// Same as [`Strategy::access()`].
unsafe fn access_erased<S: Strategy + ?Sized>(storage: NonNull<Storage>) -> NonNull<()> {
    // SAFETY: Forwarding guarantee from caller.
    unsafe { S::access(storage) }.cast()
}

/// Places `value` into `storage` using the strategy selected for `T` and returns the table
/// that now governs the region.
///
/// Any value previously held in `storage` is overwritten without being dropped, so the caller
/// must ensure the region is vacant.
pub(crate) fn place<T: Clone + 'static>(storage: &mut Storage, value: T) -> &'static Dispatch {
    match Placement::of::<T>() {
        Placement::Inline => {
            // SAFETY: Inline is the strategy selected for T. The caller guarantees the region
            // is vacant.
            unsafe {
                Inline::<T>::place(storage, value);
            }

            Inline::<T>::DISPATCH
        }
        Placement::Boxed => {
            // SAFETY: Owned is the strategy selected for T. The caller guarantees the region
            // is vacant.
            unsafe {
                Owned::<T>::place(storage, value);
            }

            Owned::<T>::DISPATCH
        }
    }
}

/// Moves a `T` out of `storage` using the strategy selected for `T`.
///
/// # Safety
///
/// The region must hold a live `T` placed via [`place()`]. It holds none afterwards.
pub(crate) unsafe fn take<T: Clone + 'static>(storage: &mut Storage) -> T {
    match Placement::of::<T>() {
        // SAFETY: Forwarding guarantee from caller. The strategy that placed a T is always
        // the one selected for T.
        Placement::Inline => unsafe { Inline::<T>::take(storage) },
        // SAFETY: As above.
        Placement::Boxed => unsafe { Owned::<T>::take(storage) },
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::items_after_statements,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn place_selects_inline_for_small_types() {
        let mut storage = Storage::uninit();

        let dispatch = place(&mut storage, 5_u32);

        assert_eq!(dispatch.placement(), Placement::Inline);
        assert_eq!(dispatch.type_info(), TypeInfo::of::<u32>());

        unsafe {
            dispatch.destroy(&mut storage);
        }
    }

    #[test]
    fn place_selects_owned_for_large_types() {
        let mut storage = Storage::uninit();

        let dispatch = place(&mut storage, String::from("boxed"));

        assert_eq!(dispatch.placement(), Placement::Boxed);
        assert_eq!(dispatch.type_info(), TypeInfo::of::<String>());

        unsafe {
            dispatch.destroy(&mut storage);
        }
    }

    #[test]
    fn access_reads_value_for_both_strategies() {
        let mut small = Storage::uninit();
        let mut large = Storage::uninit();

        let small_dispatch = place(&mut small, 9_u8);
        let large_dispatch = place(&mut large, [3_u64; 4]);

        unsafe {
            let ptr = small_dispatch.access(NonNull::from(&small));
            assert_eq!(*ptr.cast::<u8>().as_ref(), 9);

            let ptr = large_dispatch.access(NonNull::from(&large));
            assert_eq!(*ptr.cast::<[u64; 4]>().as_ref(), [3; 4]);

            small_dispatch.destroy(&mut small);
            large_dispatch.destroy(&mut large);
        }
    }

    #[test]
    fn clone_into_produces_independent_copy() {
        let mut source = Storage::uninit();
        let mut target = Storage::uninit();

        let dispatch = place(&mut source, vec![1, 2, 3]);

        unsafe {
            dispatch.clone_into(&source, &mut target);

            dispatch
                .access(NonNull::from(&mut target))
                .cast::<Vec<i32>>()
                .as_mut()
                .push(4);

            assert_eq!(
                *dispatch.access(NonNull::from(&source)).cast::<Vec<i32>>().as_ref(),
                vec![1, 2, 3]
            );
            assert_eq!(
                *dispatch.access(NonNull::from(&target)).cast::<Vec<i32>>().as_ref(),
                vec![1, 2, 3, 4]
            );

            dispatch.destroy(&mut source);
            dispatch.destroy(&mut target);
        }
    }

    #[test]
    fn transfer_moves_without_dropping() {
        let drops = Rc::new(Cell::new(0_usize));

        #[derive(Clone)]
        struct Tracked(Rc<Cell<usize>>);

        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut source = Storage::uninit();
        let mut target = Storage::uninit();

        let dispatch = place(&mut source, Tracked(Rc::clone(&drops)));
        assert_eq!(dispatch.placement(), Placement::Inline);

        unsafe {
            dispatch.transfer(&mut source, &mut target);
        }

        assert_eq!(drops.get(), 0);

        unsafe {
            dispatch.destroy(&mut target);
        }

        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn take_returns_value_for_both_strategies() {
        let mut small = Storage::uninit();
        let mut large = Storage::uninit();

        _ = place(&mut small, 'x');
        _ = place(&mut large, String::from("taken"));

        unsafe {
            assert_eq!(take::<char>(&mut small), 'x');
            assert_eq!(take::<String>(&mut large), "taken");
        }
    }

    #[test]
    fn table_is_shared_per_type() {
        let mut a = Storage::uninit();
        let mut b = Storage::uninit();

        let first = place(&mut a, 1_i64);
        let second = place(&mut b, 2_i64);

        assert_eq!(first.type_info(), second.type_info());
        assert_eq!(first.placement(), second.placement());
    }
}
