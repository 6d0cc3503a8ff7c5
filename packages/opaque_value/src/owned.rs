use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::{Placement, Storage, Strategy};

/// Keeps a `T` in a heap allocation, with the [`Storage`] region holding the pointer.
///
/// The allocation is made and released through [`Box`]. While the value is stored, the box is
/// kept as the raw pointer obtained from it, so that handing it from one region to another is a
/// plain pointer copy.
pub(crate) struct Owned<T> {
    _value: PhantomData<T>,
}

impl<T: Clone + 'static> Owned<T> {
    /// # Safety
    ///
    /// The region must hold a live pointer placed by this strategy.
    #[must_use]
    unsafe fn heap_ptr(storage: &Storage) -> NonNull<T> {
        // SAFETY: Forwarding guarantee from caller. NonNull<T> is Copy so reading it through a
        // shared reference does not affect ownership.
        unsafe { *storage.as_ref::<NonNull<T>>() }
    }
}

impl<T: Clone + 'static> Strategy for Owned<T> {
    type Value = T;

    const PLACEMENT: Placement = Placement::Boxed;

    unsafe fn place(storage: &mut Storage, value: T) {
        let ptr = NonNull::from(Box::leak(Box::new(value)));

        // SAFETY: A pointer always fits the region and the caller guarantees it is vacant.
        unsafe {
            storage.write(ptr);
        }
    }

    unsafe fn access(storage: NonNull<Storage>) -> NonNull<T> {
        // SAFETY: Forwarding guarantee from caller that the region holds a live pointer. The
        // pointer came from a Box so it can be written through regardless of how the region
        // itself was borrowed.
        unsafe { Storage::value_ptr::<NonNull<T>>(storage).read() }
    }

    unsafe fn clone_into(source: &Storage, target: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller that the source holds a live pointer.
        let ptr = unsafe { Self::heap_ptr(source) };

        // SAFETY: The pointer refers to a live T owned by the source region, which is borrowed
        // for the duration of this call.
        let value = unsafe { ptr.as_ref() };

        // SAFETY: The caller guarantees the target is vacant.
        unsafe {
            Self::place(target, value.clone());
        }
    }

    unsafe fn destroy(storage: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller that the region holds a live pointer.
        let ptr = unsafe { storage.read::<NonNull<T>>() };

        // SAFETY: The pointer was obtained from Box::leak() in place() and ownership of it has
        // just been taken out of the region, so this is the only owner.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }

    unsafe fn transfer(source: &mut Storage, target: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller that the source holds a live pointer. The
        // source is considered vacant from now on.
        let ptr = unsafe { source.read::<NonNull<T>>() };

        // SAFETY: A pointer always fits the region and the caller guarantees it is vacant.
        unsafe {
            target.write(ptr);
        }
    }

    unsafe fn take(storage: &mut Storage) -> T {
        // SAFETY: Forwarding guarantee from caller that the region holds a live pointer.
        let ptr = unsafe { storage.read::<NonNull<T>>() };

        // SAFETY: The pointer was obtained from Box::leak() in place() and ownership of it has
        // just been taken out of the region, so this is the only owner.
        let boxed = unsafe { Box::from_raw(ptr.as_ptr()) };

        *boxed
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone)]
    struct Large {
        payload: [u64; 8],
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Large {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn value_lives_outside_region() {
        let mut storage = Storage::uninit();

        unsafe {
            Owned::<[u64; 8]>::place(&mut storage, [5; 8]);
        }

        let region = NonNull::from(&storage).cast::<[u64; 8]>();
        let value = unsafe { Owned::<[u64; 8]>::access(NonNull::from(&storage)) };

        assert_ne!(region, value);
        assert_eq!(unsafe { *value.as_ref() }, [5; 8]);

        unsafe {
            Owned::<[u64; 8]>::destroy(&mut storage);
        }
    }

    #[test]
    fn transfer_hands_off_same_allocation() {
        let drops = Rc::new(Cell::new(0));

        let mut source = Storage::uninit();
        let mut target = Storage::uninit();

        unsafe {
            Owned::<Large>::place(
                &mut source,
                Large {
                    payload: [1; 8],
                    drops: Rc::clone(&drops),
                },
            );
        }

        let before = unsafe { Owned::<Large>::access(NonNull::from(&source)) };

        unsafe {
            Owned::<Large>::transfer(&mut source, &mut target);
        }

        let after = unsafe { Owned::<Large>::access(NonNull::from(&target)) };

        assert_eq!(before, after);
        assert_eq!(drops.get(), 0);

        unsafe {
            Owned::<Large>::destroy(&mut target);
        }

        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn clone_allocates_independent_copy() {
        let drops = Rc::new(Cell::new(0));

        let mut source = Storage::uninit();
        let mut target = Storage::uninit();

        unsafe {
            Owned::<Large>::place(
                &mut source,
                Large {
                    payload: [2; 8],
                    drops: Rc::clone(&drops),
                },
            );
            Owned::<Large>::clone_into(&source, &mut target);
        }

        let original = unsafe { Owned::<Large>::access(NonNull::from(&mut source)) };
        let copy = unsafe { Owned::<Large>::access(NonNull::from(&mut target)) };

        assert_ne!(original, copy);

        unsafe {
            (*copy.as_ptr()).payload[0] = 99;
            assert_eq!(original.as_ref().payload[0], 2);
            assert_eq!(copy.as_ref().payload[0], 99);
        }

        unsafe {
            Owned::<Large>::destroy(&mut source);
            Owned::<Large>::destroy(&mut target);
        }

        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn take_frees_allocation_and_returns_value() {
        let drops = Rc::new(Cell::new(0));

        let mut storage = Storage::uninit();

        unsafe {
            Owned::<Large>::place(
                &mut storage,
                Large {
                    payload: [3; 8],
                    drops: Rc::clone(&drops),
                },
            );
        }

        let value = unsafe { Owned::<Large>::take(&mut storage) };

        assert_eq!(value.payload, [3; 8]);
        assert_eq!(drops.get(), 0);

        drop(value);

        assert_eq!(drops.get(), 1);
    }
}
