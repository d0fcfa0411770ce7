//! Exercises the devices of the machine running the tests.
//!
//! Devices that can't be opened (usually for lack of permission) are skipped.

use std::{fs, io, path::PathBuf};

use evstream::{
    Device, Evdev, KeymapEntry, PumpState,
    event::{EventType, Key},
};

fn event_nodes() -> Vec<PathBuf> {
    let Ok(dir) = fs::read_dir("/dev/input") else {
        return Vec::new();
    };
    let mut nodes = dir
        .filter_map(|entry| Some(entry.ok()?.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("event"))
        })
        .collect::<Vec<_>>();
    nodes.sort();
    nodes
}

#[test]
fn query_local_devices() -> io::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    for path in event_nodes() {
        let evdev = match Evdev::open(&path) {
            Ok(evdev) => evdev,
            Err(e) => {
                log::info!("skipping {}: {e}", path.display());
                continue;
            }
        };

        let types = evdev.event_types()?;
        assert_eq!(types.len(), usize::from(EventType::MAX.raw()) + 1);
        for ty in types.iter() {
            let ty = EventType::from_raw(ty as u16);
            let codes = evdev.supported_codes(ty)?;
            if let Some(max) = ty.code_max() {
                assert_eq!(codes.len(), usize::from(max) + 1, "{ty:?}");
            }
        }
        if types.test(EventType::KEY.raw().into()) {
            let held = evdev.key_state()?;
            let supported = evdev.supported_codes(EventType::KEY)?;
            assert!(held.iter().all(|key| supported.test(key)));
        }
        log::info!(
            "{}: {:?} {:?} {}",
            path.display(),
            evdev.name()?,
            evdev.input_id()?,
            evdev.driver_version()?,
        );
    }

    Ok(())
}

#[test]
fn open_and_close_local_devices() {
    let _ = env_logger::builder().is_test(true).try_init();

    for path in event_nodes() {
        let Ok(device) = Device::open(&path) else {
            continue;
        };
        assert!(!device.is_closed());

        device.close();
        assert!(device.is_closed());
        assert_eq!(device.inbound_state(), PumpState::Stopped);
        assert_eq!(device.outbound_state(), PumpState::Stopped);
        assert_eq!(device.inbox().recv(), None);
        assert!(device.event_types().is_empty());
    }
}

/// Remaps index 5 of every writable device that has a keymap, then restores it.
#[test]
fn keymap_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();

    for path in event_nodes() {
        let Ok(device) = Device::open(&path) else {
            continue;
        };
        let original = device.key_map_entry(&KeymapEntry::lookup_index(5));
        if original.is_zeroed() {
            continue;
        }
        let other = if original.keycode() == Key::KEY_B {
            Key::KEY_C
        } else {
            Key::KEY_B
        };
        if !device.set_key_map(&KeymapEntry::by_index(5, other)) {
            log::info!("skipping {}: keymap is not writable", path.display());
            continue;
        }

        let by_index = device.key_map_entry(&KeymapEntry::lookup_index(5));
        let by_scancode = device.key_map_entry(&KeymapEntry::lookup_scancode(original.scancode()));
        let by_key = device.key_map(other);
        let restored = device.set_key_map(&KeymapEntry::by_index(5, original.keycode()));

        assert_eq!(by_index.keycode(), other, "{}", path.display());
        assert_eq!(by_index.scancode(), original.scancode());
        assert_eq!(by_scancode.keycode(), other);
        assert_eq!(by_key.keycode(), other);
        assert!(restored);
        assert_eq!(
            device.key_map_entry(&KeymapEntry::lookup_index(5)).keycode(),
            original.keycode(),
        );
    }
}
