//! Space types for the inline buffer of a [`SmallFn`](crate::SmallFn).
//!
//! A space type is never constructed. Only its layout matters:
//! `size_of::<Space>()` is the inline capacity in bytes and
//! `align_of::<Space>()` the alignment every inline callable must divide.

/// Represents `1 * usize` bytes of inline space
pub type S1 = [usize; 1];
/// Represents `2 * usize` bytes of inline space
pub type S2 = [usize; 2];
/// Represents `4 * usize` bytes of inline space
pub type S4 = [usize; 4];
/// Represents `8 * usize` bytes of inline space
pub type S8 = [usize; 8];
/// Represents `16 * usize` bytes of inline space
pub type S16 = [usize; 16];
/// Represents `32 * usize` bytes of inline space
pub type S32 = [usize; 32];
/// Represents `64 * usize` bytes of inline space
pub type S64 = [usize; 64];

/// `N` bytes of inline space with 16-byte alignment.
///
/// The size is rounded up to a multiple of 16, so `MaxAligned<8>` offers 16
/// bytes. `MaxAligned<0>` has no inline capacity at all: only zero-sized
/// callables are stored inline and everything else goes to the heap.
///
/// ```
/// use core::mem::{align_of, size_of};
/// use smallfn::space::MaxAligned;
///
/// assert_eq!(size_of::<MaxAligned<32>>(), 32);
/// assert_eq!(size_of::<MaxAligned<8>>(), 16);
/// assert_eq!(size_of::<MaxAligned<0>>(), 0);
/// assert_eq!(align_of::<MaxAligned<0>>(), 16);
/// ```
#[repr(C, align(16))]
pub struct MaxAligned<const N: usize>([u8; N]);

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{align_of, size_of};

    #[test]
    fn test_usize_spaces() {
        assert_eq!(size_of::<S1>(), size_of::<usize>());
        assert_eq!(size_of::<S4>(), 4 * size_of::<usize>());
        assert_eq!(size_of::<S64>(), 64 * size_of::<usize>());
        assert_eq!(align_of::<S8>(), align_of::<usize>());
    }

    #[test]
    fn test_max_aligned() {
        assert_eq!(size_of::<MaxAligned<48>>(), 48);
        assert_eq!(size_of::<MaxAligned<17>>(), 32);
        assert_eq!(align_of::<MaxAligned<48>>(), 16);
        assert_eq!(size_of::<MaxAligned<0>>(), 0);
    }
}
