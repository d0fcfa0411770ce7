//! A runtime-sized [`Bitset`] for capability masks and key state reported by `evdev`.
//!
//! `evdev` reports supported event types, supported codes, and pressed keys as packed bitmaps of
//! `unsigned long` words. [`Bitset`] owns such a bitmap, knows how many bits it declares, and hands
//! out its raw storage so it can be filled directly by the kernel.

mod iter;

use std::{ffi::c_ulong, fmt, slice};

pub use iter::Iter;

/// The underlying word type used by [`Bitset`]s.
///
/// This is an `unsigned long` in C, which may vary between platforms.
pub type Word = c_ulong;

const WORD_BITS: usize = Word::BITS as usize;

/// A fixed-capacity set of bit indices.
///
/// A [`Bitset`] declares a capacity of [`Bitset::len`] bits at construction time. The capacity
/// never changes. Indices at or above it are never members of the set: [`Bitset::test`] returns
/// `false` for them and [`Bitset::set`]/[`Bitset::clear`] ignore them.
///
/// The [`Default`] [`Bitset`] has a capacity of zero; it is what failed queries return.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitset {
    words: Box<[Word]>,
    len: usize,
}

impl Bitset {
    /// Creates an all-zero [`Bitset`] that can hold the indices `0..len`.
    ///
    /// The storage is rounded up to a whole number of [`Word`]s.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)].into_boxed_slice(),
            len,
        }
    }

    /// Creates a [`Bitset`] of capacity `len` from a raw byte buffer.
    ///
    /// `bytes` uses the layout of [`Bitset::as_bytes`]. A shorter buffer is zero-extended, excess
    /// bytes are ignored, and any bits at or above `len` are discarded.
    pub fn from_bytes(len: usize, bytes: &[u8]) -> Self {
        let mut this = Self::new(len);
        let dest = this.as_bytes_mut();
        let n = dest.len().min(bytes.len());
        dest[..n].copy_from_slice(&bytes[..n]);
        this.mask_tail();
        this
    }

    /// Returns the declared capacity in bits.
    ///
    /// Valid indices are `0..len()`. This is *not* the number of set bits; use
    /// [`Bitset::count_ones`] for that.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether this [`Bitset`] has a capacity of zero bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether no bit is set.
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns whether bit `index` is set.
    ///
    /// Returns `false` if `index` is out of range.
    #[inline]
    pub fn test(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.words[index / WORD_BITS] & bit(index) != 0
    }

    /// Sets bit `index`.
    ///
    /// Returns `true` if the bit was previously unset. Out-of-range indices are ignored and
    /// return `false`.
    pub fn set(&mut self, index: usize) -> bool {
        if index >= self.len {
            log::trace!("ignoring `Bitset::set({index})` beyond capacity {}", self.len);
            return false;
        }
        let word = &mut self.words[index / WORD_BITS];
        let was_set = *word & bit(index) != 0;
        *word |= bit(index);
        !was_set
    }

    /// Clears bit `index`.
    ///
    /// Returns `true` if the bit was previously set. Out-of-range indices are ignored and return
    /// `false`.
    pub fn clear(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let word = &mut self.words[index / WORD_BITS];
        let was_set = *word & bit(index) != 0;
        *word &= !bit(index);
        was_set
    }

    /// Returns an iterator over the indices of all set bits, in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.words)
    }

    /// Returns the underlying [`Word`]s.
    ///
    /// Note that the [`Word`] type varies in size and endianness between platforms.
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Returns the raw storage as bytes.
    ///
    /// This is the packed-bitmap layout the kernel reads and writes: [`Word`]s in native byte
    /// order. On little-endian targets, this means bit `i` lives in byte `i / 8` at position
    /// `i % 8`.
    ///
    /// The returned slice covers whole [`Word`]s, so it may be longer than `len().div_ceil(8)`.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: `Word` is a plain integer without padding, and `u8` has no alignment needs.
        unsafe { slice::from_raw_parts(self.words.as_ptr().cast(), size_of_val(&*self.words)) }
    }

    /// Returns the raw storage as mutable bytes, for the kernel to fill in.
    ///
    /// Callers must not set bits at or above [`Bitset::len`]. [`Bitset`]s filled by this crate are
    /// masked after the kernel writes to them.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = size_of_val(&*self.words);
        // Safety: see `as_bytes`; every bit pattern is a valid `Word`.
        unsafe { slice::from_raw_parts_mut(self.words.as_mut_ptr().cast(), len) }
    }

    /// Clears any bits in the last word that lie beyond the declared capacity.
    pub(crate) fn mask_tail(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1 << rem) - 1;
            }
        }
    }
}

#[inline]
fn bit(index: usize) -> Word {
    1 << (index % WORD_BITS)
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Bitset {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<usize> for Bitset {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.set(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(Bitset::new(0).words().len(), 0);
        assert_eq!(Bitset::new(1).words().len(), 1);
        assert_eq!(Bitset::new(WORD_BITS).words().len(), 1);
        assert_eq!(Bitset::new(WORD_BITS + 1).words().len(), 2);
        // KEY_CNT
        assert_eq!(Bitset::new(0x300).as_bytes().len(), 0x300 / 8);
    }

    #[test]
    fn set_clear_every_index() {
        const LEN: usize = 0x300;
        let mut set = Bitset::new(LEN);
        for i in 0..LEN {
            assert!(!set.test(i));
            assert!(set.set(i));
            assert!(set.test(i));
            assert!(!set.set(i), "second `set` must report no change");
            assert!(set.clear(i));
            assert!(!set.test(i));
            assert!(!set.clear(i));
        }
        assert!(set.is_clear());
    }

    #[test]
    fn out_of_range() {
        let mut set = Bitset::new(5);
        assert!(!set.set(5));
        assert!(!set.set(usize::MAX));
        assert!(!set.test(5));
        assert!(!set.test(usize::MAX));
        assert!(!set.clear(100));
        assert!(set.is_clear());
        assert_eq!(set.len(), 5);

        let mut empty = Bitset::new(0);
        assert!(empty.is_empty());
        assert!(!empty.set(0));
        assert!(!empty.test(0));
        assert_eq!(empty.iter().count(), 0);
    }

    #[test]
    fn bytes_rehydrate() {
        let mut set = Bitset::new(0x300);
        for i in [0, 1, 7, 8, 63, 64, 65, 127, 0x1e, 0x110, 0x2ff] {
            set.set(i);
        }

        let copy = Bitset::from_bytes(set.len(), set.as_bytes());
        assert_eq!(copy, set);
        for i in 0..set.len() {
            assert_eq!(copy.test(i), set.test(i), "mismatch at bit {i}");
        }
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn kernel_byte_layout() {
        let mut set = Bitset::new(16);
        set.set(0);
        set.set(9);
        set.set(15);
        assert_eq!(&set.as_bytes()[..2], &[0b0000_0001, 0b1000_0010]);
        assert!(set.as_bytes()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn from_bytes_masks_tail() {
        let set = Bitset::from_bytes(4, &[0xff, 0xff]);
        assert_eq!(set.iter().collect::<Vec<_>>(), &[0, 1, 2, 3]);
        assert_eq!(set.count_ones(), 4);

        let set = Bitset::from_bytes(64, &[]);
        assert!(set.is_clear());
    }

    #[test]
    fn iter_and_debug() {
        let mut set = Bitset::new(200);
        set.extend([3, 64, 199, 1000]);
        assert_eq!(set.iter().collect::<Vec<_>>(), &[3, 64, 199]);
        assert_eq!(format!("{set:?}"), "{3, 64, 199}");

        let mut iter = set.iter();
        assert_eq!(iter.next(), Some(3));
        assert_eq!(format!("{iter:?}"), "Iter({64, 199})");
    }
}
