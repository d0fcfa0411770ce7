use std::{fmt, ops::RangeInclusive};

use crate::raw::input::input_absinfo;

/// State and limits of an absolute axis ([`Abs`][crate::event::Abs]).
///
/// Returned by [`Device::abs_info`][crate::Device::abs_info]. A failed query yields
/// [`AbsInfo::zeroed`].
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct AbsInfo(pub(crate) input_absinfo);

impl AbsInfo {
    /// An [`AbsInfo`] with every field set to zero.
    #[inline]
    pub const fn zeroed() -> Self {
        Self::new(0, 0)
    }

    /// Creates an [`AbsInfo`] for an axis ranging from `minimum` to `maximum`.
    ///
    /// All other fields are zero.
    #[inline]
    pub const fn new(minimum: i32, maximum: i32) -> Self {
        Self(input_absinfo {
            value: 0,
            minimum,
            maximum,
            fuzz: 0,
            flat: 0,
            resolution: 0,
        })
    }

    #[inline]
    pub const fn with_value(mut self, value: i32) -> Self {
        self.0.value = value;
        self
    }

    /// The last value reported by the axis.
    ///
    /// The kernel does not enforce that this lies within [`AbsInfo::range`].
    #[inline]
    pub const fn value(&self) -> i32 {
        self.0.value
    }

    #[inline]
    pub const fn minimum(&self) -> i32 {
        self.0.minimum
    }

    #[inline]
    pub const fn maximum(&self) -> i32 {
        self.0.maximum
    }

    /// `minimum..=maximum`.
    #[inline]
    pub fn range(&self) -> RangeInclusive<i32> {
        self.minimum()..=self.maximum()
    }

    /// Noise filter: changes smaller than this are dropped by the kernel.
    #[inline]
    pub const fn fuzz(&self) -> i32 {
        self.0.fuzz
    }

    /// Size of the dead zone around the center.
    #[inline]
    pub const fn flat(&self) -> i32 {
        self.0.flat
    }

    /// Units per millimeter (or per radian, for rotational axes).
    ///
    /// Frequently left at 0 by drivers.
    #[inline]
    pub const fn resolution(&self) -> i32 {
        self.0.resolution
    }

    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }
}

impl Default for AbsInfo {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for AbsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbsInfo")
            .field("value", &self.value())
            .field("range", &self.range())
            .field("fuzz", &self.fuzz())
            .field("flat", &self.flat())
            .field("resolution", &self.resolution())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders() {
        let info = AbsInfo::new(-32768, 32767).with_value(12);
        assert_eq!(info.range(), -32768..=32767);
        assert_eq!(info.value(), 12);
        assert!(!info.is_zeroed());
        assert!(AbsInfo::default().is_zeroed());
        assert_eq!(
            format!("{:?}", AbsInfo::new(0, 255)),
            "AbsInfo { value: 0, range: 0..=255, fuzz: 0, flat: 0, resolution: 0 }",
        );
    }
}
