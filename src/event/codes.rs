//! Event types, key and axis identifiers.
//!
//! The constants follow `linux/input-event-codes.h`. Only the subset of codes this crate's API
//! refers to is named; every other raw code is still representable via `from_raw`.

use std::{error::Error, fmt, io};

ffi_enum! {
    /// `EV_*`: Types of [`InputEvent`][crate::event::InputEvent]s.
    pub enum EventType: u16 {
        /// Synchronization event, separating groups of events.
        SYN = 0x00,
        /// A key or button press, release, or repeat.
        KEY = 0x01,
        /// A relative axis movement.
        REL = 0x02,
        /// An absolute axis change.
        ABS = 0x03,
        /// A miscellaneous event, such as the scancode preceding a key event.
        MSC = 0x04,
        /// A switch changed state.
        SW  = 0x05,
        /// An LED changed state, or is requested to change state.
        LED = 0x11,
        SND = 0x12,
        /// The autorepeat settings have changed.
        REP = 0x14,
        FF  = 0x15,
        PWR = 0x16,
        FF_STATUS = 0x17,
    }
}
event_code!(EventType, "EV_");

impl EventType {
    /// The highest event type the kernel will report in its capability mask (`EV_MAX`).
    pub const MAX: Self = Self(0x1f);

    /// Returns the highest code that can be reported for events of this type (eg. `KEY_MAX`).
    ///
    /// The bitmap of supported codes for this type holds `code_max() + 1` bits.
    /// Returns [`None`] for event types that carry no capability bitmap.
    pub const fn code_max(self) -> Option<u16> {
        Some(match self {
            Self::SYN => 0x0f,
            Self::KEY => Key::MAX.0,
            Self::REL => Rel::MAX.0,
            Self::ABS => Abs::MAX.0,
            Self::MSC => Misc::MAX.0,
            Self::SW => 0x11,
            Self::LED => Led::MAX.0,
            Self::SND => 0x07,
            Self::REP => 0x01,
            Self::FF => 0x7f,
            _ => return None,
        })
    }
}

ffi_enum! {
    /// `SYN_*`: Synchronization event codes.
    ///
    /// The *value* of a `SYN` event is unspecified. Only its position in the stream matters.
    pub enum Syn: u16 {
        /// Marks the end of a group of events that belong together.
        REPORT = 0,
        CONFIG = 1,
        MT_REPORT = 2,
        /// One or more events were dropped because the kernel buffer overflowed.
        ///
        /// State observed through the event stream is stale after this; re-query it with
        /// [`Device::key_state`][crate::Device::key_state] and friends.
        DROPPED = 3,
    }
}
event_code!(Syn, "SYN_");

ffi_enum! {
    /// An *evdev* key or button identifier (`KEY_*` and `BTN_*`).
    ///
    /// This is the event code of [`EventType::KEY`] events, and the index space of
    /// [`Device::key_state`][crate::Device::key_state].
    ///
    /// `Debug` prints the constant name when there is one. [`FromStr`][std::str::FromStr] parses
    /// the full constant name, including its `KEY_` or `BTN_` prefix.
    pub enum Key: u16 {
        KEY_RESERVED = 0x000,          KEY_ESC = 0x001,               KEY_1 = 0x002,
        KEY_2 = 0x003,                 KEY_3 = 0x004,                 KEY_4 = 0x005,
        KEY_5 = 0x006,                 KEY_6 = 0x007,                 KEY_7 = 0x008,
        KEY_8 = 0x009,                 KEY_9 = 0x00a,                 KEY_0 = 0x00b,
        KEY_MINUS = 0x00c,             KEY_EQUAL = 0x00d,             KEY_BACKSPACE = 0x00e,
        KEY_TAB = 0x00f,               KEY_Q = 0x010,                 KEY_W = 0x011,
        KEY_E = 0x012,                 KEY_R = 0x013,                 KEY_T = 0x014,
        KEY_Y = 0x015,                 KEY_U = 0x016,                 KEY_I = 0x017,
        KEY_O = 0x018,                 KEY_P = 0x019,                 KEY_LEFTBRACE = 0x01a,
        KEY_RIGHTBRACE = 0x01b,        KEY_ENTER = 0x01c,             KEY_LEFTCTRL = 0x01d,
        KEY_A = 0x01e,                 KEY_S = 0x01f,                 KEY_D = 0x020,
        KEY_F = 0x021,                 KEY_G = 0x022,                 KEY_H = 0x023,
        KEY_J = 0x024,                 KEY_K = 0x025,                 KEY_L = 0x026,
        KEY_SEMICOLON = 0x027,         KEY_APOSTROPHE = 0x028,        KEY_GRAVE = 0x029,
        KEY_LEFTSHIFT = 0x02a,         KEY_BACKSLASH = 0x02b,         KEY_Z = 0x02c,
        KEY_X = 0x02d,                 KEY_C = 0x02e,                 KEY_V = 0x02f,
        KEY_B = 0x030,                 KEY_N = 0x031,                 KEY_M = 0x032,
        KEY_COMMA = 0x033,             KEY_DOT = 0x034,               KEY_SLASH = 0x035,
        KEY_RIGHTSHIFT = 0x036,        KEY_KPASTERISK = 0x037,        KEY_LEFTALT = 0x038,
        KEY_SPACE = 0x039,             KEY_CAPSLOCK = 0x03a,          KEY_F1 = 0x03b,
        KEY_F2 = 0x03c,                KEY_F3 = 0x03d,                KEY_F4 = 0x03e,
        KEY_F5 = 0x03f,                KEY_F6 = 0x040,                KEY_F7 = 0x041,
        KEY_F8 = 0x042,                KEY_F9 = 0x043,                KEY_F10 = 0x044,
        KEY_NUMLOCK = 0x045,           KEY_SCROLLLOCK = 0x046,        KEY_KP7 = 0x047,
        KEY_KP8 = 0x048,               KEY_KP9 = 0x049,               KEY_KPMINUS = 0x04a,
        KEY_KP4 = 0x04b,               KEY_KP5 = 0x04c,               KEY_KP6 = 0x04d,
        KEY_KPPLUS = 0x04e,            KEY_KP1 = 0x04f,               KEY_KP2 = 0x050,
        KEY_KP3 = 0x051,               KEY_KP0 = 0x052,               KEY_KPDOT = 0x053,
        KEY_ZENKAKUHANKAKU = 0x055,    KEY_102ND = 0x056,             KEY_F11 = 0x057,
        KEY_F12 = 0x058,               KEY_RO = 0x059,                KEY_KATAKANA = 0x05a,
        KEY_HIRAGANA = 0x05b,          KEY_HENKAN = 0x05c,            KEY_KATAKANAHIRAGANA = 0x05d,
        KEY_MUHENKAN = 0x05e,          KEY_KPJPCOMMA = 0x05f,         KEY_KPENTER = 0x060,
        KEY_RIGHTCTRL = 0x061,         KEY_KPSLASH = 0x062,           KEY_SYSRQ = 0x063,
        KEY_RIGHTALT = 0x064,          KEY_LINEFEED = 0x065,          KEY_HOME = 0x066,
        KEY_UP = 0x067,                KEY_PAGEUP = 0x068,            KEY_LEFT = 0x069,
        KEY_RIGHT = 0x06a,             KEY_END = 0x06b,               KEY_DOWN = 0x06c,
        KEY_PAGEDOWN = 0x06d,          KEY_INSERT = 0x06e,            KEY_DELETE = 0x06f,
        KEY_MACRO = 0x070,             KEY_MUTE = 0x071,              KEY_VOLUMEDOWN = 0x072,
        KEY_VOLUMEUP = 0x073,          KEY_POWER = 0x074,             KEY_KPEQUAL = 0x075,
        KEY_KPPLUSMINUS = 0x076,       KEY_PAUSE = 0x077,             KEY_SCALE = 0x078,
        KEY_KPCOMMA = 0x079,           KEY_HANGEUL = 0x07a,           KEY_HANJA = 0x07b,
        KEY_YEN = 0x07c,               KEY_LEFTMETA = 0x07d,          KEY_RIGHTMETA = 0x07e,
        KEY_COMPOSE = 0x07f,           KEY_STOP = 0x080,              KEY_AGAIN = 0x081,
        KEY_PROPS = 0x082,             KEY_UNDO = 0x083,              KEY_FRONT = 0x084,
        KEY_COPY = 0x085,              KEY_OPEN = 0x086,              KEY_PASTE = 0x087,
        KEY_FIND = 0x088,              KEY_CUT = 0x089,               KEY_HELP = 0x08a,
        KEY_MENU = 0x08b,              KEY_CALC = 0x08c,              KEY_SETUP = 0x08d,
        KEY_SLEEP = 0x08e,             KEY_WAKEUP = 0x08f,            KEY_FILE = 0x090,
        KEY_SENDFILE = 0x091,          KEY_DELETEFILE = 0x092,        KEY_XFER = 0x093,
        KEY_PROG1 = 0x094,             KEY_PROG2 = 0x095,             KEY_WWW = 0x096,
        KEY_MSDOS = 0x097,             KEY_COFFEE = 0x098,            KEY_ROTATE_DISPLAY = 0x099,
        KEY_CYCLEWINDOWS = 0x09a,      KEY_MAIL = 0x09b,              KEY_BOOKMARKS = 0x09c,
        KEY_COMPUTER = 0x09d,          KEY_BACK = 0x09e,              KEY_FORWARD = 0x09f,
        KEY_CLOSECD = 0x0a0,           KEY_EJECTCD = 0x0a1,           KEY_EJECTCLOSECD = 0x0a2,
        KEY_NEXTSONG = 0x0a3,          KEY_PLAYPAUSE = 0x0a4,         KEY_PREVIOUSSONG = 0x0a5,
        KEY_STOPCD = 0x0a6,            KEY_RECORD = 0x0a7,            KEY_REWIND = 0x0a8,
        KEY_PHONE = 0x0a9,             KEY_ISO = 0x0aa,               KEY_CONFIG = 0x0ab,
        KEY_HOMEPAGE = 0x0ac,          KEY_REFRESH = 0x0ad,           KEY_EXIT = 0x0ae,
        KEY_MOVE = 0x0af,              KEY_EDIT = 0x0b0,              KEY_SCROLLUP = 0x0b1,
        KEY_SCROLLDOWN = 0x0b2,        KEY_KPLEFTPAREN = 0x0b3,       KEY_KPRIGHTPAREN = 0x0b4,
        KEY_NEW = 0x0b5,               KEY_REDO = 0x0b6,              KEY_F13 = 0x0b7,
        KEY_F14 = 0x0b8,               KEY_F15 = 0x0b9,               KEY_F16 = 0x0ba,
        KEY_F17 = 0x0bb,               KEY_F18 = 0x0bc,               KEY_F19 = 0x0bd,
        KEY_F20 = 0x0be,               KEY_F21 = 0x0bf,               KEY_F22 = 0x0c0,
        KEY_F23 = 0x0c1,               KEY_F24 = 0x0c2,               KEY_PLAYCD = 0x0c8,
        KEY_PAUSECD = 0x0c9,           KEY_PROG3 = 0x0ca,             KEY_PROG4 = 0x0cb,
        KEY_ALL_APPLICATIONS = 0x0cc,  KEY_SUSPEND = 0x0cd,           KEY_CLOSE = 0x0ce,
        KEY_PLAY = 0x0cf,              KEY_FASTFORWARD = 0x0d0,       KEY_BASSBOOST = 0x0d1,
        KEY_PRINT = 0x0d2,             KEY_HP = 0x0d3,                KEY_CAMERA = 0x0d4,
        KEY_SOUND = 0x0d5,             KEY_QUESTION = 0x0d6,          KEY_EMAIL = 0x0d7,
        KEY_CHAT = 0x0d8,              KEY_SEARCH = 0x0d9,            KEY_CONNECT = 0x0da,
        KEY_FINANCE = 0x0db,           KEY_SPORT = 0x0dc,             KEY_SHOP = 0x0dd,
        KEY_ALTERASE = 0x0de,          KEY_CANCEL = 0x0df,            KEY_BRIGHTNESSDOWN = 0x0e0,
        KEY_BRIGHTNESSUP = 0x0e1,      KEY_MEDIA = 0x0e2,             KEY_SWITCHVIDEOMODE = 0x0e3,
        KEY_KBDILLUMTOGGLE = 0x0e4,    KEY_KBDILLUMDOWN = 0x0e5,      KEY_KBDILLUMUP = 0x0e6,
        KEY_SEND = 0x0e7,              KEY_REPLY = 0x0e8,             KEY_FORWARDMAIL = 0x0e9,
        KEY_SAVE = 0x0ea,              KEY_DOCUMENTS = 0x0eb,         KEY_BATTERY = 0x0ec,
        KEY_BLUETOOTH = 0x0ed,         KEY_WLAN = 0x0ee,              KEY_UWB = 0x0ef,
        KEY_UNKNOWN = 0x0f0,           KEY_VIDEO_NEXT = 0x0f1,        KEY_VIDEO_PREV = 0x0f2,
        KEY_BRIGHTNESS_CYCLE = 0x0f3,  KEY_BRIGHTNESS_AUTO = 0x0f4,   KEY_DISPLAY_OFF = 0x0f5,
        KEY_WWAN = 0x0f6,              KEY_RFKILL = 0x0f7,            KEY_MICMUTE = 0x0f8,
        BTN_0 = 0x100,                 BTN_1 = 0x101,                 BTN_2 = 0x102,
        BTN_3 = 0x103,                 BTN_4 = 0x104,                 BTN_5 = 0x105,
        BTN_6 = 0x106,                 BTN_7 = 0x107,                 BTN_8 = 0x108,
        BTN_9 = 0x109,                 BTN_LEFT = 0x110,              BTN_RIGHT = 0x111,
        BTN_MIDDLE = 0x112,            BTN_SIDE = 0x113,              BTN_EXTRA = 0x114,
        BTN_FORWARD = 0x115,           BTN_BACK = 0x116,              BTN_TASK = 0x117,
        BTN_TRIGGER = 0x120,           BTN_THUMB = 0x121,             BTN_THUMB2 = 0x122,
        BTN_TOP = 0x123,               BTN_TOP2 = 0x124,              BTN_PINKIE = 0x125,
        BTN_BASE = 0x126,              BTN_BASE2 = 0x127,             BTN_BASE3 = 0x128,
        BTN_BASE4 = 0x129,             BTN_BASE5 = 0x12a,             BTN_BASE6 = 0x12b,
        BTN_DEAD = 0x12f,              BTN_SOUTH = 0x130,             BTN_EAST = 0x131,
        BTN_C = 0x132,                 BTN_NORTH = 0x133,             BTN_WEST = 0x134,
        BTN_Z = 0x135,                 BTN_TL = 0x136,                BTN_TR = 0x137,
        BTN_TL2 = 0x138,               BTN_TR2 = 0x139,               BTN_SELECT = 0x13a,
        BTN_START = 0x13b,             BTN_MODE = 0x13c,              BTN_THUMBL = 0x13d,
        BTN_THUMBR = 0x13e,            BTN_TOOL_PEN = 0x140,          BTN_TOOL_RUBBER = 0x141,
        BTN_TOOL_BRUSH = 0x142,        BTN_TOOL_PENCIL = 0x143,       BTN_TOOL_AIRBRUSH = 0x144,
        BTN_TOOL_FINGER = 0x145,       BTN_TOOL_MOUSE = 0x146,        BTN_TOOL_LENS = 0x147,
        BTN_TOOL_QUINTTAP = 0x148,     BTN_STYLUS3 = 0x149,           BTN_TOUCH = 0x14a,
        BTN_STYLUS = 0x14b,            BTN_STYLUS2 = 0x14c,           BTN_TOOL_DOUBLETAP = 0x14d,
        BTN_TOOL_TRIPLETAP = 0x14e,    BTN_TOOL_QUADTAP = 0x14f,      BTN_WHEEL = 0x150,
        BTN_GEAR_DOWN = 0x150,         BTN_GEAR_UP = 0x151,
        BTN_MISC = Self::BTN_0.0,
        BTN_MOUSE = Self::BTN_LEFT.0,
        BTN_JOYSTICK = Self::BTN_TRIGGER.0,
        BTN_GAMEPAD = Self::BTN_SOUTH.0,
        BTN_A = Self::BTN_SOUTH.0,
        BTN_B = Self::BTN_EAST.0,
        BTN_X = Self::BTN_NORTH.0,
        BTN_Y = Self::BTN_WEST.0,
        BTN_DIGI = Self::BTN_TOOL_PEN.0,
    }
}
event_code!(Key, "");

impl Key {
    /// `KEY_MAX`: the highest key code.
    pub const MAX: Self = Self(0x2ff);
}

ffi_enum! {
    /// `REL_*`: A relative axis identifier.
    pub enum Rel: u16 {
        X             = 0x00,
        Y             = 0x01,
        Z             = 0x02,
        RX            = 0x03,
        RY            = 0x04,
        RZ            = 0x05,
        HWHEEL        = 0x06,
        DIAL          = 0x07,
        WHEEL         = 0x08,
        MISC          = 0x09,
        WHEEL_HI_RES  = 0x0b,
        HWHEEL_HI_RES = 0x0c,
    }
}
event_code!(Rel, "REL_");

impl Rel {
    pub const MAX: Self = Self(0x0f);
}

ffi_enum! {
    /// `ABS_*`: An absolute axis identifier.
    ///
    /// Range and resolution of an axis are queried with
    /// [`Device::abs_info`][crate::Device::abs_info].
    pub enum Abs: u16 {
        X              = 0x00,
        Y              = 0x01,
        Z              = 0x02,
        RX             = 0x03,
        RY             = 0x04,
        RZ             = 0x05,
        THROTTLE       = 0x06,
        RUDDER         = 0x07,
        WHEEL          = 0x08,
        GAS            = 0x09,
        BRAKE          = 0x0a,
        HAT0X          = 0x10,
        HAT0Y          = 0x11,
        HAT1X          = 0x12,
        HAT1Y          = 0x13,
        HAT2X          = 0x14,
        HAT2Y          = 0x15,
        HAT3X          = 0x16,
        HAT3Y          = 0x17,
        PRESSURE       = 0x18,
        DISTANCE       = 0x19,
        TILT_X         = 0x1a,
        TILT_Y         = 0x1b,
        TOOL_WIDTH     = 0x1c,
        VOLUME         = 0x20,
        MISC           = 0x28,
        MT_SLOT        = 0x2f,
        MT_TOUCH_MAJOR = 0x30,
        MT_TOUCH_MINOR = 0x31,
        MT_WIDTH_MAJOR = 0x32,
        MT_WIDTH_MINOR = 0x33,
        MT_ORIENTATION = 0x34,
        MT_POSITION_X  = 0x35,
        MT_POSITION_Y  = 0x36,
        MT_TOOL_TYPE   = 0x37,
        MT_BLOB_ID     = 0x38,
        MT_TRACKING_ID = 0x39,
        MT_PRESSURE    = 0x3a,
        MT_DISTANCE    = 0x3b,
        MT_TOOL_X      = 0x3c,
        MT_TOOL_Y      = 0x3d,
    }
}
event_code!(Abs, "ABS_");

impl Abs {
    pub const MAX: Self = Self(0x3f);
}

ffi_enum! {
    /// `MSC_*`: A miscellaneous event code.
    pub enum Misc: u16 {
        SERIAL    = 0x00,
        PULSELED  = 0x01,
        GESTURE   = 0x02,
        RAW       = 0x03,
        /// Carries the raw scancode of the key event that follows it.
        ///
        /// This is the value to use when remapping that key with
        /// [`KeymapEntry::by_scancode`][crate::KeymapEntry::by_scancode].
        SCAN      = 0x04,
        TIMESTAMP = 0x05,
    }
}
event_code!(Misc, "MSC_");

impl Misc {
    pub const MAX: Self = Self(0x07);
}

ffi_enum! {
    /// `LED_*`: A device LED.
    pub enum Led: u16 {
        NUML     = 0x00,
        CAPSL    = 0x01,
        SCROLLL  = 0x02,
        COMPOSE  = 0x03,
        KANA     = 0x04,
        SLEEP    = 0x05,
        SUSPEND  = 0x06,
        MUTE     = 0x07,
        MISC     = 0x08,
        MAIL     = 0x09,
        CHARGING = 0x0a,
    }
}
event_code!(Led, "LED_");

impl Led {
    pub const MAX: Self = Self(0x0f);
}

/// Error returned by [`FromStr`][std::str::FromStr] implementations when no constant matches.
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownVariant {
    pub(crate) _p: (),
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown variant name")
    }
}
impl Error for UnknownVariant {}
impl From<UnknownVariant> for io::Error {
    fn from(value: UnknownVariant) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, value)
    }
}

/// A displayable name of an evdev constant, prefix included.
pub(crate) struct VariantName {
    prefix: &'static str,
    variant: &'static str,
}

impl VariantName {
    pub(crate) fn new(prefix: &'static str, variant: &'static str) -> Self {
        Self { prefix, variant }
    }
}

impl fmt::Display for VariantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix)?;
        f.write_str(self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_repr() {
        assert_eq!(format!("{:?}", EventType::KEY), "EV_KEY");
        assert_eq!(format!("{:?}", EventType::from_raw(0xffff)), "EventType(0xffff)");
        assert_eq!("EV_ABS".parse(), Ok(EventType::ABS));

        assert_eq!(format!("{:?}", Syn::DROPPED), "SYN_DROPPED");

        assert_eq!("KEY_A".parse(), Ok(Key::KEY_A));
        assert_eq!("BTN_LEFT".parse(), Ok(Key::BTN_LEFT));
        assert_eq!(format!("{:?}", Key::KEY_A), "KEY_A");
        assert_eq!(format!("{:?}", Key::BTN_LEFT), "BTN_LEFT");
        assert_eq!(format!("{:?}", Key::from_raw(0xffff)), "Key(0xffff)");
        assert!("A".parse::<Key>().is_err());

        assert_eq!("ABS_X".parse(), Ok(Abs::X));
        assert_eq!(format!("{:?}", Abs::MT_SLOT), "ABS_MT_SLOT");
        assert!("X".parse::<Abs>().is_err());

        assert_eq!(format!("{:?}", Rel::WHEEL), "REL_WHEEL");
        assert_eq!(format!("{:?}", Misc::SCAN), "MSC_SCAN");
        assert_eq!("LED_CAPSL".parse(), Ok(Led::CAPSL));
    }

    #[test]
    fn aliases() {
        assert_eq!(Key::BTN_A, Key::BTN_SOUTH);
        assert_eq!(Key::BTN_MOUSE, Key::BTN_LEFT);
        assert_eq!(format!("{:?}", Key::BTN_MOUSE), "BTN_LEFT");
    }

    #[test]
    fn code_max() {
        assert_eq!(EventType::KEY.code_max(), Some(0x2ff));
        assert_eq!(EventType::ABS.code_max(), Some(0x3f));
        assert_eq!(EventType::from_raw(0x1e).code_max(), None);
    }
}
