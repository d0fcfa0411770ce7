//! Iteration over the set bits of a [`Bitset`][super::Bitset].

use std::{fmt, iter::Copied, slice};

use super::{WORD_BITS, Word};

/// An iterator over the indices of the set bits in a [`Bitset`][super::Bitset].
///
/// Returned by [`Bitset::iter`][super::Bitset::iter].
#[derive(Clone)]
pub struct Iter<'a> {
    words: Copied<slice::Iter<'a, Word>>,
    word: Word,
    base: usize, // bit index of the lowest bit in `word`
}

impl<'a> Iter<'a> {
    pub(super) fn new(words: &'a [Word]) -> Self {
        let mut words = words.iter().copied();
        let word = words.next().unwrap_or(0);
        Self {
            words,
            word,
            base: 0,
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        // Skip over words with no set bits.
        while self.word == 0 {
            self.word = self.words.next()?;
            self.base += WORD_BITS;
        }

        let zeroes = self.word.trailing_zeros() as usize;
        // Clear the lowest set bit.
        self.word &= self.word - 1;
        Some(self.base + zeroes)
    }
}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Remaining<'a>(Iter<'a>);
        impl fmt::Debug for Remaining<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_set().entries(self.0.clone()).finish()
            }
        }

        f.debug_tuple("Iter")
            .field(&Remaining(self.clone()))
            .finish()
    }
}
