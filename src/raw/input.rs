//! `linux/input.h`

use std::ffi::{c_char, c_int, c_void};

use libc::timeval;
use uoctl::{_IOC, _IOC_READ, _IOR, _IOW, Ioctl};

#[derive(Clone, Copy)]
#[repr(C)]
pub struct input_event {
    pub time: timeval,
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

// `timeval` only implements `PartialEq` with libc's `extra_traits`.
impl PartialEq for input_event {
    fn eq(&self, other: &Self) -> bool {
        (self.time.tv_sec, self.time.tv_usec, self.type_, self.code, self.value)
            == (other.time.tv_sec, other.time.tv_usec, other.type_, other.code, other.value)
    }
}
impl Eq for input_event {}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct input_id {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct input_absinfo {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct input_keymap_entry {
    pub flags: u8,
    pub len: u8,
    pub index: u16,
    pub keycode: u32,
    pub scancode: [u8; 32],
}

pub const INPUT_KEYMAP_BY_INDEX: u8 = 1 << 0;

/// Get driver version.
pub const EVIOCGVERSION: Ioctl<*mut c_int> = _IOR(b'E', 0x01);
/// Get device ID.
pub const EVIOCGID: Ioctl<*mut input_id> = _IOR(b'E', 0x02);

/// Get keycode.
pub const EVIOCGKEYCODE_V2: Ioctl<*mut input_keymap_entry> = _IOR(b'E', 0x04);
/// Set keycode.
pub const EVIOCSKEYCODE_V2: Ioctl<*const input_keymap_entry> = _IOW(b'E', 0x04);

/// Get device name.
pub const fn EVIOCGNAME(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'E', 0x06, len)
}
/// Get physical location.
pub const fn EVIOCGPHYS(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'E', 0x07, len)
}
/// Get unique identifier.
pub const fn EVIOCGUNIQ(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'E', 0x08, len)
}

/// Get global key state.
pub const fn EVIOCGKEY(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x18, len)
}
/// Get all LEDs.
pub const fn EVIOCGLED(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x19, len)
}

/// Get event bits; `ev == 0` fetches the supported event types.
pub const fn EVIOCGBIT(ev: u8, len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x20 + ev, len)
}
/// Get abs value/limits.
pub const fn EVIOCGABS(abs: u8) -> Ioctl<*mut input_absinfo> {
    _IOR(b'E', 0x40 + abs)
}

/// Grab/Release device.
pub const EVIOCGRAB: Ioctl<c_int> = _IOW(b'E', 0x90).with_direct_arg();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts() {
        assert_eq!(size_of::<input_keymap_entry>(), 40);
        assert_eq!(size_of::<input_absinfo>(), 24);
        assert_eq!(size_of::<input_id>(), 8);
        assert_eq!(
            size_of::<input_event>(),
            size_of::<timeval>() + 8,
            "`input_event` must not contain padding",
        );
    }
}
