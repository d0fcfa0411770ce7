use std::fmt;

use crate::{
    event::Key,
    raw::input::{INPUT_KEYMAP_BY_INDEX, input_keymap_entry},
};

/// A keymap record, translating a hardware scancode to a [`Key`].
///
/// The same record serves as the request and the response of the keymap protocol: a *lookup*
/// entry names either an index into the keymap ([`KeymapEntry::lookup_index`]) or a
/// [`Scancode`] ([`KeymapEntry::lookup_scancode`]), and the kernel answers with the complete
/// entry. To change the keymap, build an entry with [`KeymapEntry::by_index`] or
/// [`KeymapEntry::by_scancode`] and pass it to [`Device::set_key_map`].
///
/// This is not the *localized* layout applications see (QWERTY, AZERTY, ...). It maps raw
/// scancodes to evdev keycodes, which are defined for a US layout.
///
/// [`Device::set_key_map`]: crate::Device::set_key_map
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct KeymapEntry(pub(crate) input_keymap_entry);

impl KeymapEntry {
    /// Flag selecting lookup by [`KeymapEntry::index`] instead of by scancode.
    pub const BY_INDEX: u8 = INPUT_KEYMAP_BY_INDEX;

    /// Returns an entry with every field set to zero.
    ///
    /// This is what [`Device`][crate::Device] returns when a keymap query fails.
    #[inline]
    pub const fn zeroed() -> Self {
        Self(input_keymap_entry {
            flags: 0,
            len: 0,
            index: 0,
            keycode: 0,
            scancode: [0; 32],
        })
    }

    /// An entry that assigns `key` to the keymap slot at `index`.
    pub const fn by_index(index: u16, key: Key) -> Self {
        let mut this = Self::lookup_index(index);
        this.0.keycode = key.raw() as u32;
        this
    }

    /// An entry that assigns `key` to `scancode`.
    pub const fn by_scancode(scancode: Scancode, key: Key) -> Self {
        let mut this = Self::lookup_scancode(scancode);
        this.0.keycode = key.raw() as u32;
        this
    }

    /// A request for the keymap slot at `index`.
    pub const fn lookup_index(index: u16) -> Self {
        let mut this = Self::zeroed();
        this.0.flags = Self::BY_INDEX;
        this.0.index = index;
        this
    }

    /// A request for the entry that `scancode` maps to.
    pub const fn lookup_scancode(scancode: Scancode) -> Self {
        let mut this = Self::zeroed();
        this.0.len = scancode.len;
        this.0.scancode = scancode.bytes;
        this
    }

    /// Returns the raw flags; only [`KeymapEntry::BY_INDEX`] is defined.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.0.flags
    }

    /// Whether this entry addresses the keymap by index.
    #[inline]
    pub fn is_by_index(&self) -> bool {
        self.0.flags & Self::BY_INDEX != 0
    }

    /// Zero-based index of this entry in the keymap.
    #[inline]
    pub fn index(&self) -> u16 {
        self.0.index
    }

    /// Returns the [`Key`] this entry produces.
    #[inline]
    pub fn keycode(&self) -> Key {
        Key::from_raw(self.0.keycode as u16)
    }

    /// Returns the keycode as stored in the record.
    #[inline]
    pub fn raw_keycode(&self) -> u32 {
        self.0.keycode
    }

    /// Returns the [`Scancode`] of this entry.
    #[inline]
    pub fn scancode(&self) -> Scancode {
        // The kernel never reports more than 32 bytes, but the record may come from anywhere.
        let len = usize::from(self.0.len).min(Scancode::MAX_LEN);
        Scancode::from_ne_bytes(&self.0.scancode[..len]).unwrap_or(Scancode::EMPTY)
    }

    /// Returns a copy of `self` that maps to `key`.
    #[inline]
    pub const fn with_key(mut self, key: Key) -> Self {
        self.0.keycode = key.raw() as u32;
        self
    }

    /// Returns whether every field is zero, as in a failed query.
    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }
}

impl Default for KeymapEntry {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for KeymapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeymapEntry")
            .field("flags", &self.flags())
            .field("index", &self.index())
            .field("keycode", &self.keycode())
            .field("scancode", &self.scancode())
            .finish()
    }
}

/// A raw scancode emitted by a keyboard, up to 32 bytes in native byte order.
///
/// Usually built from an integer: `Scancode::from(0x70004u32)`. The kernel's generic keymap
/// handling only accepts scancodes of 1, 2 or 4 bytes; other lengths are left to the driver.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Scancode {
    len: u8,
    bytes: [u8; 32],
}

impl Scancode {
    /// The longest scancode a keymap record can hold.
    pub const MAX_LEN: usize = 32;

    const EMPTY: Self = Self {
        len: 0,
        bytes: [0; 32],
    };

    /// Creates a [`Scancode`] from its native-endian bytes.
    ///
    /// Returns [`None`] if `bytes` is longer than [`Scancode::MAX_LEN`].
    pub fn from_ne_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > Self::MAX_LEN {
            return None;
        }
        let mut this = Self::EMPTY;
        this.bytes[..bytes.len()].copy_from_slice(bytes);
        this.len = bytes.len() as u8;
        Some(this)
    }

    /// Returns the native-endian bytes of this scancode.
    #[inline]
    pub fn as_ne_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len.into()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most significant byte first.
    fn be_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let bytes = self.as_ne_bytes().iter().copied();
        #[cfg(target_endian = "little")]
        return bytes.rev();
        #[cfg(target_endian = "big")]
        return bytes;
    }
}

macro_rules! scancode_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scancode {
                #[inline]
                fn from(value: $t) -> Self {
                    let mut this = Self::EMPTY;
                    let bytes = value.to_ne_bytes();
                    this.bytes[..bytes.len()].copy_from_slice(&bytes);
                    this.len = bytes.len() as u8;
                    this
                }
            }
        )*
    };
}

scancode_from!(u8, u16, u32);

/// Hexadecimal, without leading zeroes.
impl fmt::Display for Scancode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut digits = self.be_bytes().skip_while(|&b| b == 0);
        match digits.next() {
            Some(first) => write!(f, "{first:x}")?,
            None => return f.write_str("0"),
        }
        digits.try_for_each(|b| write!(f, "{b:02x}"))
    }
}

impl fmt::Debug for Scancode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scancode({self}, len={})", self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scancode_display() {
        assert_eq!(Scancode::from(0u8).to_string(), "0");
        assert_eq!(Scancode::from(10u8).to_string(), "a");
        assert_eq!(Scancode::from(0x100u16).to_string(), "100");
        assert_eq!(Scancode::from(0x70004u32).to_string(), "70004");
        assert_eq!(Scancode::from(0x70004u32).len(), 4);
        assert_eq!(format!("{:?}", Scancode::from(0x1eu8)), "Scancode(1e, len=1)");
    }

    #[test]
    fn scancode_length_limit() {
        assert!(Scancode::from_ne_bytes(&[0; 32]).is_some());
        assert!(Scancode::from_ne_bytes(&[0; 33]).is_none());
        assert!(Scancode::from_ne_bytes(&[]).unwrap().is_empty());
    }

    #[test]
    fn constructors() {
        let e = KeymapEntry::by_index(7, Key::KEY_B);
        assert!(e.is_by_index());
        assert_eq!(e.flags(), KeymapEntry::BY_INDEX);
        assert_eq!(e.index(), 7);
        assert_eq!(e.keycode(), Key::KEY_B);
        assert!(e.scancode().is_empty());

        let e = KeymapEntry::by_scancode(Scancode::from(0x70005u32), Key::KEY_B);
        assert!(!e.is_by_index());
        assert_eq!(e.0.len, 4);
        assert_eq!(e.scancode(), Scancode::from(0x70005u32));
        assert_eq!(e.raw_keycode(), 0x30);

        let e = KeymapEntry::lookup_scancode(Scancode::from(0x1eu8));
        assert_eq!(e.raw_keycode(), 0);
        assert_eq!(e.with_key(Key::KEY_A).keycode(), Key::KEY_A);

        assert!(KeymapEntry::zeroed().is_zeroed());
        assert!(!KeymapEntry::lookup_index(0).is_zeroed());
    }

    #[test]
    fn oversized_len_is_clamped() {
        let mut e = KeymapEntry::zeroed();
        e.0.len = 200;
        e.0.scancode[0] = 0xab;
        assert_eq!(e.scancode().len(), Scancode::MAX_LEN);
    }
}
