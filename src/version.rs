use std::{ffi::c_int, fmt};

/// Version of the kernel's `evdev` protocol (`EV_VERSION`).
///
/// This describes the input core, not the driver behind a particular device. It is packed as
/// `0x00MMmmpp` and displayed as `MM.mm.pp`, eg. `1.0.1`.
///
/// Returned by [`Device::driver_version`][crate::Device::driver_version].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version(pub(crate) c_int);

impl Version {
    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        self.0
    }

    pub const fn major(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn minor(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn patch(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({self} = {:#x})", self.0)
    }
}
