//! Drives a [`Device`] through a `uinput` device that only reports keys.
//!
//! Skipped when `/dev/uinput` or the created node can't be opened.

#![allow(non_camel_case_types)]

use std::{
    ffi::{c_char, c_int},
    fs::{self, File},
    io::{self, Write},
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use evstream::{
    Device, InputId,
    event::{EventType, InputEvent, Key, KeyEvent, KeyState, Syn},
};
use uoctl::{_IO, _IOC, _IOC_READ, _IOW, Ioctl};

const TEST_DEVICE_NAME: &str = "-@-evstream-loopback-@-";

#[repr(C)]
struct input_id {
    bustype: u16,
    vendor: u16,
    product: u16,
    version: u16,
}

#[repr(C)]
struct uinput_setup {
    id: input_id,
    name: [c_char; 80],
    ff_effects_max: u32,
}

const UI_DEV_CREATE: Ioctl = _IO(b'U', 1);
const UI_DEV_DESTROY: Ioctl = _IO(b'U', 2);
const UI_DEV_SETUP: Ioctl<*const uinput_setup> = _IOW(b'U', 3);
const UI_SET_EVBIT: Ioctl<c_int> = _IOW(b'U', 100).with_direct_arg();
const UI_SET_KEYBIT: Ioctl<c_int> = _IOW(b'U', 101).with_direct_arg();

const fn UI_GET_SYSNAME(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'U', 44, len)
}

/// A `uinput` device with `KEY_A` and `KEY_B`, destroyed on drop.
struct Keyboard {
    file: File,
}

impl Keyboard {
    fn create() -> io::Result<Self> {
        let file = File::options().read(true).write(true).open("/dev/uinput")?;

        let mut setup = uinput_setup {
            id: input_id {
                bustype: 0x06, // BUS_VIRTUAL
                vendor: 0x1234,
                product: 0x5678,
                version: 1,
            },
            name: [0; 80],
            ff_effects_max: 0,
        };
        for (dest, src) in setup.name.iter_mut().zip(TEST_DEVICE_NAME.bytes()) {
            *dest = src as c_char;
        }

        unsafe {
            UI_SET_EVBIT.ioctl(&file, EventType::KEY.raw().into())?;
            UI_SET_KEYBIT.ioctl(&file, Key::KEY_A.raw().into())?;
            UI_SET_KEYBIT.ioctl(&file, Key::KEY_B.raw().into())?;
            UI_DEV_SETUP.ioctl(&file, &setup)?;
            UI_DEV_CREATE.ioctl(&file)?;
        }
        Ok(Self { file })
    }

    /// Finds the `/dev/input/event*` node the kernel created for this device.
    fn evdev_path(&self) -> io::Result<PathBuf> {
        let mut buf = [0 as c_char; 64];
        unsafe {
            UI_GET_SYSNAME(buf.len()).ioctl(&self.file, buf.as_mut_ptr())?;
        }
        let sysname = buf
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8 as char)
            .collect::<String>();

        for entry in fs::read_dir(format!("/sys/class/input/{sysname}"))? {
            let name = entry?.file_name();
            if name.to_string_lossy().starts_with("event") {
                return Ok(PathBuf::from("/dev/input").join(name));
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no event node for {sysname}"),
        ))
    }

    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
        let bytes = events.iter().flat_map(|ev| ev.encode()).collect::<Vec<_>>();
        self.file.write_all(&bytes)
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        unsafe {
            let _ = UI_DEV_DESTROY.ioctl(&self.file);
        }
    }
}

/// Opens the device node, giving udev some time to create it and fix up permissions.
fn open_when_ready(keyboard: &Keyboard) -> io::Result<Device> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let res = keyboard.evdev_path().and_then(Device::open);
        match res {
            Ok(device) => return Ok(device),
            Err(e) if Instant::now() < deadline => {
                log::debug!("device not ready yet: {e}");
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Receives until the next key event, skipping `SYN_REPORT`s.
fn next_key(device: &Device) -> Option<InputEvent> {
    device
        .inbox()
        .iter()
        .find(|ev| ev.event_type() == EventType::KEY)
}

#[test]
fn key_only_device() -> io::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut keyboard = match Keyboard::create() {
        Ok(keyboard) => keyboard,
        Err(e) => {
            eprintln!("skipping: cannot create uinput device: {e}");
            return Ok(());
        }
    };
    let device = match open_when_ready(&keyboard) {
        Ok(device) => device,
        Err(e) => {
            eprintln!("skipping: cannot open uinput device: {e}");
            return Ok(());
        }
    };

    assert_eq!(device.name(), TEST_DEVICE_NAME);
    assert_ne!(device.input_id(), InputId::default());

    // The input core adds `EV_SYN` to every device; nothing else may show up.
    let types = device.event_types();
    assert!(Device::test(&types, EventType::KEY.raw()));
    let others = types
        .iter()
        .filter(|&ty| ty != usize::from(EventType::KEY.raw()))
        .filter(|&ty| ty != usize::from(EventType::SYN.raw()))
        .collect::<Vec<_>>();
    assert_eq!(others, Vec::<usize>::new());

    let keys = device.supported_codes(EventType::KEY);
    assert_eq!(
        keys.iter().collect::<Vec<_>>(),
        [usize::from(Key::KEY_A.raw()), usize::from(Key::KEY_B.raw())],
    );

    let held = device.key_state();
    assert!(held.len() > 0);
    assert!(held.is_clear());

    let report = InputEvent::from(Syn::REPORT);
    let press: InputEvent = KeyEvent::new(Key::KEY_A, KeyState::PRESSED).into();
    let release: InputEvent = KeyEvent::new(Key::KEY_A, KeyState::RELEASED).into();

    keyboard.emit(&[press, report])?;
    let ev = next_key(&device).expect("inbox closed before the press arrived");
    assert_eq!(ev.raw_code(), Key::KEY_A.raw());
    assert_eq!(ev.raw_value(), 1);
    assert!(Device::test(&device.key_state(), Key::KEY_A.raw()));

    keyboard.emit(&[release, report])?;
    let ev = next_key(&device).expect("inbox closed before the release arrived");
    assert_eq!(ev.raw_code(), Key::KEY_A.raw());
    assert_eq!(ev.raw_value(), 0);

    device.close();
    assert!(device.key_state().is_empty());
    Ok(())
}
