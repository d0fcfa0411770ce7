//! Input events and their kernel wire format.
//!
//! Every record read from or written to an *evdev* node is an [`InputEvent`]:
//!
//! - **Timestamp** ([`InputEvent::time`]): when the kernel queued the event. Events created by the
//!   application carry a zero timestamp unless one is attached with [`InputEvent::with_time`];
//!   the kernel fills in its own when the event is written.
//! - **Event Type** ([`InputEvent::event_type`]): the broad category, eg. [`EventType::KEY`].
//! - **Event Code** ([`InputEvent::raw_code`]): the key, axis or other object affected, to be
//!   interpreted as a [`Key`], [`Rel`], [`Abs`], ... depending on the type.
//! - **Event Value** ([`InputEvent::raw_value`]): what happened to it (a new key state, an axis
//!   position, a relative movement).
//!
//! On the wire, an event is a fixed-size record of [`InputEvent::SIZE`] bytes in native byte
//! order: `tv_sec` (`time_t`), `tv_usec` (`suseconds_t`), `type` (`u16`), `code` (`u16`) and
//! `value` (`i32`). [`InputEvent::encode`] and [`InputEvent::decode`] pack and unpack these fields
//! one by one.
//!
//! # Serde support
//!
//! With the `serde` feature enabled, [`EventType`], [`Key`], [`Rel`], [`Abs`] and [`Led`]
//! implement `Serialize` and `Deserialize`. Human-readable formats use the constant name where one
//! exists (`KEY_F1`, `ABS_Y`, ...) and the raw `u16` code otherwise; binary formats always use the
//! raw code.

pub(crate) mod codes;

#[cfg(any(test, feature = "serde"))]
mod serde;

use std::{
    fmt, io, mem,
    time::{Duration, SystemTime},
};

use libc::{suseconds_t, time_t};

use crate::raw::input::input_event;

pub use codes::{Abs, EventType, Key, Led, Misc, Rel, Syn, UnknownVariant};

/// An input event received from or sent to an *evdev*.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct InputEvent(input_event);

impl InputEvent {
    /// Size of one event record on the wire, in bytes.
    pub const SIZE: usize = size_of::<time_t>() + size_of::<suseconds_t>() + 8;

    /// Creates an [`InputEvent`] from raw values.
    ///
    /// The timestamp of the event will be set to 0.
    #[inline]
    pub const fn new(ty: EventType, raw_code: u16, raw_value: i32) -> Self {
        Self(input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: ty.0,
            code: raw_code,
            value: raw_value,
        })
    }

    /// Creates an [`InputEvent`] with all fields zeroed out.
    ///
    /// This is a [`Syn::REPORT`] event.
    #[inline]
    pub const fn zeroed() -> Self {
        Self::new(EventType::SYN, 0, 0)
    }

    /// Decodes the first [`InputEvent::SIZE`] bytes of `bytes` as an event record.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`io::ErrorKind::UnexpectedEof`] if `bytes` holds less than one
    /// whole record.
    pub fn decode(bytes: &[u8]) -> io::Result<Self> {
        let mut rest = bytes;
        let mut fields = || -> Option<input_event> {
            Some(input_event {
                time: libc::timeval {
                    tv_sec: time_t::from_ne_bytes(take(&mut rest)?),
                    tv_usec: suseconds_t::from_ne_bytes(take(&mut rest)?),
                },
                type_: u16::from_ne_bytes(take(&mut rest)?),
                code: u16::from_ne_bytes(take(&mut rest)?),
                value: i32::from_ne_bytes(take(&mut rest)?),
            })
        };
        match fields() {
            Some(raw) => Ok(Self(raw)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "short event record: got {} of {} bytes",
                    bytes.len(),
                    Self::SIZE
                ),
            )),
        }
    }

    /// Encodes this event into its wire record.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0; Self::SIZE];
        let mut rest = &mut buf[..];
        put(&mut rest, &self.0.time.tv_sec.to_ne_bytes());
        put(&mut rest, &self.0.time.tv_usec.to_ne_bytes());
        put(&mut rest, &self.0.type_.to_ne_bytes());
        put(&mut rest, &self.0.code.to_ne_bytes());
        put(&mut rest, &self.0.value.to_ne_bytes());
        debug_assert!(rest.is_empty());
        buf
    }

    /// Changes the timestamp of `self` to the given [`SystemTime`].
    ///
    /// The timestamp has microsecond resolution; anything finer is truncated.
    pub fn with_time(mut self, time: SystemTime) -> Self {
        let (sec, usec) = match time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(dur) => (
                time_t::try_from(dur.as_secs()).unwrap_or(time_t::MAX),
                dur.subsec_micros(),
            ),
            // `tv_usec` always counts forward, so a fractional second before the epoch borrows
            // one from `tv_sec`.
            Err(before) => {
                let dur = before.duration();
                let sec = time_t::try_from(dur.as_secs()).unwrap_or(time_t::MAX);
                match dur.subsec_micros() {
                    0 => (-sec, 0),
                    micros => (-sec - 1, 1_000_000 - micros),
                }
            }
        };
        self.0.time.tv_sec = sec;
        self.0.time.tv_usec = usec as suseconds_t;
        self
    }

    /// Returns the timestamp stored in the event.
    ///
    /// Timestamps that can't be represented by [`SystemTime`] are logged and returned as
    /// [`SystemTime::UNIX_EPOCH`].
    pub fn time(&self) -> SystemTime {
        match self.try_time() {
            Some(time) => time,
            None => {
                log::warn!(
                    "`input_event` timestamp out of range of `SystemTime`: tv_sec={} tv_usec={}",
                    self.0.time.tv_sec,
                    self.0.time.tv_usec,
                );
                SystemTime::UNIX_EPOCH
            }
        }
    }

    fn try_time(&self) -> Option<SystemTime> {
        let sec = self.0.time.tv_sec;
        // A `suseconds_t` outside of `0..1_000_000` is invalid; clamp it like glibc does.
        let usec = self.0.time.tv_usec.clamp(0, 999_999);
        let whole = Duration::from_secs(sec.unsigned_abs() as u64);
        let whole = if sec >= 0 {
            SystemTime::UNIX_EPOCH.checked_add(whole)?
        } else {
            SystemTime::UNIX_EPOCH.checked_sub(whole)?
        };
        whole.checked_add(Duration::from_micros(usec as u64))
    }

    /// Returns the [`EventType`] of this event.
    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType(self.0.type_)
    }

    /// Returns the raw *event code* field.
    #[inline]
    pub fn raw_code(&self) -> u16 {
        self.0.code
    }

    /// Returns the raw *event value* field.
    #[inline]
    pub fn raw_value(&self) -> i32 {
        self.0.value
    }

    /// Returns this event as a [`KeyEvent`] if it is of type [`EventType::KEY`].
    #[inline]
    pub fn as_key_event(&self) -> Option<KeyEvent> {
        (self.event_type() == EventType::KEY).then_some(KeyEvent(*self))
    }
}

fn take<const N: usize>(bytes: &mut &[u8]) -> Option<[u8; N]> {
    let (head, tail) = bytes.split_first_chunk::<N>()?;
    *bytes = tail;
    Some(*head)
}

fn put(dest: &mut &mut [u8], bytes: &[u8]) {
    let (head, tail) = mem::take(dest).split_at_mut(bytes.len());
    head.copy_from_slice(bytes);
    *dest = tail;
}

impl Default for InputEvent {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Code(EventType, u16);
        impl fmt::Debug for Code {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let Self(ty, raw) = *self;
                match ty {
                    EventType::SYN => fmt::Debug::fmt(&Syn(raw), f),
                    EventType::KEY => fmt::Debug::fmt(&Key(raw), f),
                    EventType::REL => fmt::Debug::fmt(&Rel(raw), f),
                    EventType::ABS => fmt::Debug::fmt(&Abs(raw), f),
                    EventType::MSC => fmt::Debug::fmt(&Misc(raw), f),
                    EventType::LED => fmt::Debug::fmt(&Led(raw), f),
                    _ => write!(f, "{raw:#x}"),
                }
            }
        }

        f.debug_struct("InputEvent")
            .field("time", &self.time())
            .field("type", &self.event_type())
            .field("code", &Code(self.event_type(), self.raw_code()))
            .field("value", &self.raw_value())
            .finish()
    }
}

impl From<Syn> for InputEvent {
    #[inline]
    fn from(syn: Syn) -> Self {
        Self::new(EventType::SYN, syn.0, 0)
    }
}

/// A key press/release/repeat event.
///
/// Obtained from [`InputEvent::as_key_event`], or created with [`KeyEvent::new`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent(InputEvent);

impl KeyEvent {
    #[inline]
    pub fn new(key: Key, state: KeyState) -> Self {
        Self(InputEvent::new(EventType::KEY, key.0, state.0))
    }

    /// Returns the [`Key`] that has been pressed/released/repeated.
    #[inline]
    pub fn key(&self) -> Key {
        Key(self.0.raw_code())
    }

    #[inline]
    pub fn state(&self) -> KeyState {
        KeyState(self.0.raw_value())
    }

    #[inline]
    pub fn time(&self) -> SystemTime {
        self.0.time()
    }
}

impl From<KeyEvent> for InputEvent {
    #[inline]
    fn from(ev: KeyEvent) -> Self {
        ev.0
    }
}

impl fmt::Debug for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEvent")
            .field("time", &self.time())
            .field("key", &self.key())
            .field("state", &self.state())
            .finish()
    }
}

ffi_enum! {
    /// State of a [`Key`], stored as the value of a [`KeyEvent`].
    pub enum KeyState: i32 {
        RELEASED = 0,
        PRESSED = 1,
        /// The key has been held down long enough to autorepeat.
        REPEAT = 2,
    }
}

impl fmt::Debug for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "KeyState({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::raw::input::input_event;

    use super::*;

    #[test]
    fn record_size() {
        assert_eq!(InputEvent::SIZE, size_of::<input_event>());
        assert_eq!(InputEvent::zeroed().encode().len(), InputEvent::SIZE);
    }

    #[test]
    fn wire_layout() {
        let ev = KeyEvent::new(Key::KEY_A, KeyState::PRESSED);
        let ev = InputEvent::from(ev)
            .with_time(SystemTime::UNIX_EPOCH + Duration::new(7, 250_000));
        let bytes = ev.encode();

        let t = size_of::<time_t>();
        let u = size_of::<suseconds_t>();
        assert_eq!(time_t::from_ne_bytes(bytes[..t].try_into().unwrap()), 7);
        assert_eq!(
            suseconds_t::from_ne_bytes(bytes[t..t + u].try_into().unwrap()),
            250
        );
        assert_eq!(&bytes[t + u..t + u + 2], &1u16.to_ne_bytes());
        assert_eq!(&bytes[t + u + 2..t + u + 4], &30u16.to_ne_bytes());
        assert_eq!(&bytes[t + u + 4..], &1i32.to_ne_bytes());

        // The explicit encoding must agree with the kernel's struct layout.
        let raw: [u8; InputEvent::SIZE] = unsafe { mem::transmute(ev.0) };
        assert_eq!(raw, bytes);

        assert_eq!(InputEvent::decode(&bytes).unwrap(), ev);
    }

    #[test]
    fn decode_rejects_short_records() {
        let bytes = InputEvent::from(Syn::REPORT).encode();
        for len in [0, 1, InputEvent::SIZE - 1] {
            let err = InputEvent::decode(&bytes[..len]).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        }

        // Trailing bytes belong to the next record and are ignored.
        let mut two = bytes.to_vec();
        two.extend_from_slice(&[0xff; 3]);
        assert_eq!(InputEvent::decode(&two).unwrap(), Syn::REPORT.into());
    }

    #[test]
    fn key_events() {
        let ev: InputEvent = KeyEvent::new(Key::BTN_LEFT, KeyState::RELEASED).into();
        let key = ev.as_key_event().unwrap();
        assert_eq!(key.key(), Key::BTN_LEFT);
        assert_eq!(key.state(), KeyState::RELEASED);
        assert!(InputEvent::from(Syn::REPORT).as_key_event().is_none());

        assert_eq!(format!("{:?}", KeyState::REPEAT), "REPEAT");
        assert_eq!(format!("{:?}", KeyState(5)), "KeyState(5)");
        let dbg = format!("{ev:?}");
        assert!(dbg.contains("type: EV_KEY"), "{dbg}");
        assert!(dbg.contains("code: BTN_LEFT"), "{dbg}");
    }

    #[test]
    fn timestamps() {
        const EV: InputEvent = InputEvent::zeroed();

        let epoch = EV.with_time(SystemTime::UNIX_EPOCH);
        assert_eq!(epoch.0.time.tv_sec, 0);
        assert_eq!(epoch.0.time.tv_usec, 0);

        let mut negative_micros = EV;
        negative_micros.0.time.tv_usec = -1;
        assert_eq!(negative_micros.time(), SystemTime::UNIX_EPOCH);

        let before = SystemTime::UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(EV.with_time(before).0.time.tv_sec, -1);
        assert_eq!(EV.with_time(before).time(), before);

        let half_before = SystemTime::UNIX_EPOCH - Duration::from_millis(500);
        let ev = EV.with_time(half_before);
        assert_eq!(ev.0.time.tv_sec, -1);
        assert_eq!(ev.0.time.tv_usec, 500_000);
        assert_eq!(ev.time(), half_before);

        let just_before = SystemTime::UNIX_EPOCH - Duration::new(2, 1_000);
        let ev = EV.with_time(just_before);
        assert_eq!(ev.0.time.tv_sec, -3);
        assert_eq!(ev.0.time.tv_usec, 999_999);
        assert_eq!(ev.time(), just_before);

        let after = SystemTime::UNIX_EPOCH + Duration::new(1_000_000, 123_456_789);
        assert_eq!(
            EV.with_time(after).time(),
            SystemTime::UNIX_EPOCH + Duration::new(1_000_000, 123_456_000),
        );
    }
}
