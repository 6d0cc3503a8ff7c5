use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::{Placement, Storage, Strategy};

/// Keeps a `T` directly inside the [`Storage`] region.
///
/// Only selected for types that fit the region, see [`Placement::of()`].
pub(crate) struct Inline<T> {
    _value: PhantomData<T>,
}

impl<T: Clone + 'static> Strategy for Inline<T> {
    type Value = T;

    const PLACEMENT: Placement = Placement::Inline;

    unsafe fn place(storage: &mut Storage, value: T) {
        // SAFETY: This strategy is only selected for types that fit the region.
        unsafe {
            storage.write(value);
        }
    }

    unsafe fn access(storage: NonNull<Storage>) -> NonNull<T> {
        Storage::value_ptr(storage)
    }

    unsafe fn clone_into(source: &Storage, target: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller that the source holds a live T.
        let value = unsafe { source.as_ref::<T>() };

        // If the clone panics, nothing has been written to the target yet.
        let copy = value.clone();

        // SAFETY: T fits the region and the caller guarantees the target is vacant.
        unsafe {
            target.write(copy);
        }
    }

    unsafe fn destroy(storage: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller that the region holds a live T.
        unsafe {
            storage.drop_in_place::<T>();
        }
    }

    unsafe fn transfer(source: &mut Storage, target: &mut Storage) {
        // SAFETY: Forwarding guarantee from caller that the source holds a live T. We take
        // over ownership of it here and the source is considered vacant from now on.
        let value = unsafe { source.read::<T>() };

        // SAFETY: T fits the region and the caller guarantees the target is vacant.
        unsafe {
            target.write(value);
        }
    }

    unsafe fn take(storage: &mut Storage) -> T {
        // SAFETY: Forwarding guarantee from caller that the region holds a live T.
        unsafe { storage.read::<T>() }
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn value_lives_in_region() {
        let mut storage = Storage::uninit();

        unsafe {
            Inline::<u32>::place(&mut storage, 77);
        }

        let region_address = NonNull::from(&storage).cast::<u32>();
        let value_address = unsafe { Inline::<u32>::access(NonNull::from(&storage)) };

        assert_eq!(region_address, value_address);
        assert_eq!(unsafe { *value_address.as_ref() }, 77);
    }

    #[test]
    fn clone_shares_rc_and_destroy_releases_it() {
        let shared = Rc::new(String::from("shared"));

        let mut source = Storage::uninit();
        let mut target = Storage::uninit();

        unsafe {
            Inline::<Rc<String>>::place(&mut source, Rc::clone(&shared));
            Inline::<Rc<String>>::clone_into(&source, &mut target);
        }

        assert_eq!(Rc::strong_count(&shared), 3);

        unsafe {
            Inline::<Rc<String>>::destroy(&mut source);
        }

        assert_eq!(Rc::strong_count(&shared), 2);

        unsafe {
            Inline::<Rc<String>>::destroy(&mut target);
        }

        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn transfer_copies_bytes_to_target() {
        let mut source = Storage::uninit();
        let mut target = Storage::uninit();

        unsafe {
            Inline::<i16>::place(&mut source, -3);
            Inline::<i16>::transfer(&mut source, &mut target);

            assert_eq!(*target.as_ref::<i16>(), -3);
            assert_eq!(Inline::<i16>::take(&mut target), -3);
        }
    }

    #[test]
    fn zero_sized_values_are_supported() {
        #[derive(Clone, Debug, PartialEq)]
        struct Marker;

        let mut storage = Storage::uninit();

        unsafe {
            Inline::<Marker>::place(&mut storage, Marker);
            assert_eq!(Inline::<Marker>::take(&mut storage), Marker);
        }
    }
}
