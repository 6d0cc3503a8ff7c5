use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;

/// Number of bytes available for storing a value inline in an
/// [`OpaqueValue`][crate::OpaqueValue] without a heap allocation.
///
/// This is the size of one machine pointer.
pub const INLINE_CAPACITY: usize = mem::size_of::<Storage>();

/// Largest alignment a type may require while still being stored inline in an
/// [`OpaqueValue`][crate::OpaqueValue].
///
/// This is the alignment of one machine pointer.
pub const INLINE_ALIGNMENT: usize = mem::align_of::<Storage>();

/// Fixed-size, pointer-aligned memory region that holds either a value of a small type or the
/// pointer to an owned heap allocation.
///
/// The region itself does not know what it contains. Only the strategy bound to the owning
/// container may interpret the bytes, and all accessors here are `unsafe` for that reason.
#[repr(transparent)]
pub(crate) struct Storage {
    region: MaybeUninit<*mut ()>,
}

impl Storage {
    /// Creates a region that does not hold any live value.
    #[must_use]
    pub(crate) const fn uninit() -> Self {
        Self {
            region: MaybeUninit::uninit(),
        }
    }

    /// Whether a value of type `T` can be placed directly into the region.
    ///
    /// Moving a value is an infallible bitwise copy in Rust, so size and alignment are the only
    /// criteria that can reject a type.
    #[must_use]
    pub(crate) const fn fits<T>() -> bool {
        mem::size_of::<T>() <= INLINE_CAPACITY && mem::align_of::<T>() <= INLINE_ALIGNMENT
    }

    /// Moves `value` into the region, overwriting whatever bytes were there before without
    /// dropping them.
    ///
    /// # Safety
    ///
    /// `T` must fit the region (see [`fits()`][Self::fits]).
    pub(crate) unsafe fn write<T>(&mut self, value: T) {
        debug_assert!(Self::fits::<T>());

        // SAFETY: Forwarding guarantee from caller that T fits, so the write is in bounds and
        // aligned. The region is exclusively borrowed.
        unsafe {
            self.region.as_mut_ptr().cast::<T>().write(value);
        }
    }

    /// Moves the value out of the region, leaving the bytes logically uninitialized.
    ///
    /// # Safety
    ///
    /// The region must hold a live `T`. The caller takes over responsibility for that value and
    /// must not read it again.
    #[must_use]
    pub(crate) unsafe fn read<T>(&mut self) -> T {
        debug_assert!(Self::fits::<T>());

        // SAFETY: Forwarding guarantee from caller that the region holds a live T.
        unsafe { self.region.as_ptr().cast::<T>().read() }
    }

    /// Borrows the value held in the region.
    ///
    /// # Safety
    ///
    /// The region must hold a live `T`.
    #[must_use]
    pub(crate) unsafe fn as_ref<T>(&self) -> &T {
        debug_assert!(Self::fits::<T>());

        // SAFETY: Forwarding guarantee from caller that the region holds a live T. The lifetime
        // of the reference is bound to the borrow of the region.
        unsafe { &*self.region.as_ptr().cast::<T>() }
    }

    /// Pointer to the value held in the region, carrying the provenance of `storage`.
    ///
    /// Passing a pointer derived from `&mut Storage` yields a pointer that may be written
    /// through; one derived from `&Storage` may only be read through.
    #[must_use]
    pub(crate) fn value_ptr<T>(storage: NonNull<Self>) -> NonNull<T> {
        // The region is the only field of a transparent struct, so it starts at offset zero.
        storage.cast::<T>()
    }

    /// Drops the value held in the region in place.
    ///
    /// # Safety
    ///
    /// The region must hold a live `T`, which is considered dead after this call.
    pub(crate) unsafe fn drop_in_place<T>(&mut self) {
        debug_assert!(Self::fits::<T>());

        // SAFETY: Forwarding guarantee from caller that the region holds a live T.
        unsafe {
            self.region.as_mut_ptr().cast::<T>().drop_in_place();
        }
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

    use static_assertions::assert_eq_size;

    use super::*;

    assert_eq_size!(Storage, *mut ());

    #[test]
    fn capacity_matches_pointer() {
        assert_eq!(INLINE_CAPACITY, mem::size_of::<usize>());
        assert_eq!(INLINE_ALIGNMENT, mem::align_of::<usize>());
    }

    #[test]
    fn fits_accepts_small_types() {
        assert!(Storage::fits::<()>());
        assert!(Storage::fits::<u8>());
        assert!(Storage::fits::<u32>());
        assert!(Storage::fits::<usize>());
        assert!(Storage::fits::<Box<String>>());
        assert!(Storage::fits::<Rc<u64>>());
    }

    #[test]
    fn fits_rejects_large_types() {
        assert!(!Storage::fits::<[usize; 2]>());
        assert!(!Storage::fits::<String>());
        assert!(!Storage::fits::<Vec<u8>>());
    }

    #[test]
    fn fits_rejects_overaligned_types() {
        #[repr(align(64))]
        struct Overaligned(u8);

        assert_eq!(mem::size_of::<Overaligned>(), 64);
        assert!(!Storage::fits::<Overaligned>());

        #[repr(C, align(32))]
        struct OveralignedZst([u8; 0]);

        assert!(!Storage::fits::<OveralignedZst>());
    }

    #[test]
    fn write_then_read_returns_value() {
        let mut storage = Storage::uninit();

        unsafe {
            storage.write(0x1234_u32);
            assert_eq!(*storage.as_ref::<u32>(), 0x1234);
            assert_eq!(storage.read::<u32>(), 0x1234);
        }
    }

    #[test]
    fn value_ptr_points_at_region() {
        let mut storage = Storage::uninit();

        unsafe {
            storage.write(7_u16);
        }

        let ptr = Storage::value_ptr::<u16>(NonNull::from(&mut storage));
        unsafe {
            *ptr.as_ptr() = 8;
            assert_eq!(*storage.as_ref::<u16>(), 8);
        }
    }

    #[test]
    fn drop_in_place_runs_destructor() {
        let counter = Rc::new(Cell::new(0_usize));

        struct Tracker(Rc<Cell<usize>>);

        impl Drop for Tracker {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut storage = Storage::uninit();

        unsafe {
            storage.write(Tracker(Rc::clone(&counter)));
        }

        assert_eq!(counter.get(), 0);

        unsafe {
            storage.drop_in_place::<Tracker>();
        }

        assert_eq!(counter.get(), 1);
        assert_eq!(Rc::strong_count(&counter), 1);
    }
}
