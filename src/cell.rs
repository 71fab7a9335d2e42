use core::cell::UnsafeCell;
use core::mem::{self, ManuallyDrop, MaybeUninit};
use core::ptr::{self, NonNull};

use alloc::boxed::Box;

use crate::config::{Config, Configuration};

/// Where the value held by a [`SmallFn`](crate::SmallFn) lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Constructed in place inside the inline buffer.
    Inline,
    /// Boxed; the inline buffer holds the pointer.
    Heap,
    /// A bare function pointer stored without an operation table.
    FnPointer,
}

/// Moving a Rust value is a bitwise copy and cannot unwind.
pub(crate) const RELOCATION_NEVER_UNWINDS: bool = true;

/// Inline buffer overlaid with the heap pointer slot.
///
/// Which field is live is decided once per stored type by [`is_inline`]; only
/// code closed over that type reads it back.
#[repr(C)]
pub(crate) union RawCell<Space> {
    inline: ManuallyDrop<UnsafeCell<MaybeUninit<Space>>>,
    heap: *mut u8,
}

impl<Space> RawCell<Space> {
    pub(crate) const fn vacant() -> Self {
        RawCell {
            heap: ptr::null_mut(),
        }
    }

    pub(crate) fn as_erased(&mut self) -> NonNull<u8> {
        NonNull::from(self).cast()
    }

    /// Shared view of the cell. Callables with interior mutability may still
    /// write through it, the inline bytes sit in an `UnsafeCell`.
    pub(crate) fn as_erased_ref(&self) -> NonNull<u8> {
        NonNull::from(self).cast()
    }
}

/// Whether `F` is constructed in the inline buffer under `C`.
pub(crate) const fn is_inline<F, C: Config>() -> bool {
    Configuration::of::<C>().is_inline_eligible(
        mem::size_of::<F>(),
        mem::align_of::<F>(),
        RELOCATION_NEVER_UNWINDS,
    )
}

pub(crate) const fn placement<F, C: Config>() -> Placement {
    if is_inline::<F, C>() {
        Placement::Inline
    } else {
        Placement::Heap
    }
}

/// Moves `value` into the cell, boxing it unless it is inline-eligible.
///
/// # Safety
///
/// `cell` must point to a vacant `RawCell<C::Space>`.
pub(crate) unsafe fn emplace<F, C: Config>(cell: NonNull<u8>, value: F) {
    if is_inline::<F, C>() {
        cell.cast::<F>().as_ptr().write(value);
    } else {
        cell.cast::<*mut F>()
            .as_ptr()
            .write(Box::into_raw(Box::new(value)));
    }
}

/// Address of the `F` held by the cell.
///
/// # Safety
///
/// `cell` must point to a `RawCell<C::Space>` holding an `F` placed by
/// [`emplace`].
pub(crate) unsafe fn resolve<F, C: Config>(cell: NonNull<u8>) -> NonNull<F> {
    if is_inline::<F, C>() {
        cell.cast()
    } else {
        NonNull::new_unchecked(cell.cast::<*mut F>().as_ptr().read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultConfig, Inplace};
    use crate::space::*;

    #[test]
    fn test_cell_layout() {
        assert_eq!(mem::size_of::<RawCell<S4>>(), mem::size_of::<S4>());
        assert_eq!(mem::size_of::<RawCell<MaxAligned<0>>>(), 16);
        assert_eq!(mem::align_of::<RawCell<MaxAligned<32>>>(), 16);
        assert!(mem::size_of::<RawCell<MaxAligned<0>>>() >= mem::size_of::<*mut u8>());
    }

    #[allow(dead_code)]
    #[repr(align(32))]
    struct Wide(u8);

    #[test]
    fn test_is_inline() {
        assert!(is_inline::<usize, DefaultConfig<S1>>());
        assert!(!is_inline::<[usize; 2], DefaultConfig<S1>>());
        assert!(is_inline::<(), DefaultConfig<MaxAligned<0>>>());
        assert!(!is_inline::<u8, DefaultConfig<MaxAligned<0>>>());
        assert!(is_inline::<[u32; 8], Inplace<[u32; 8]>>());
        assert!(!is_inline::<Wide, DefaultConfig>());
        assert_eq!(placement::<[u8; 64], DefaultConfig>(), Placement::Heap);
    }

    #[test]
    fn test_emplace_resolve() {
        let mut inline = RawCell::<S2>::vacant();
        let mut heap = RawCell::<S2>::vacant();

        unsafe {
            emplace::<[usize; 2], DefaultConfig<S2>>(inline.as_erased(), [1, 2]);
            emplace::<[usize; 3], DefaultConfig<S2>>(heap.as_erased(), [3, 4, 5]);

            let small = resolve::<[usize; 2], DefaultConfig<S2>>(inline.as_erased());
            assert_eq!(small.cast::<u8>(), inline.as_erased());
            assert_eq!(*small.as_ref(), [1, 2]);

            let large = resolve::<[usize; 3], DefaultConfig<S2>>(heap.as_erased());
            assert_ne!(large.cast::<u8>(), heap.as_erased());
            assert_eq!(*large.as_ref(), [3, 4, 5]);

            drop(Box::from_raw(large.as_ptr()));
        }
    }
}
