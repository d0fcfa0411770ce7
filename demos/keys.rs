//! Prints the keys held when started, then reports presses of a few keys until the device goes
//! away.
//!
//! Usage: `keys <path>`, eg. `keys /dev/input/event3`.

use std::{env, io, process};

use evstream::{
    Device,
    event::{EventType, Key, KeyState},
};

const WATCHED: &[Key] = &[
    Key::KEY_A,
    Key::KEY_LEFTSHIFT,
    Key::KEY_ESC,
    Key::BTN_LEFT,
    Key::BTN_3,
];

fn main() -> io::Result<()> {
    env_logger::init();

    let Some(path) = env::args_os().nth(1) else {
        eprintln!("usage: keys <path>");
        process::exit(1);
    };

    let device = Device::open(path)?;
    println!("{}: {}", device.path().display(), device.name());

    if !Device::test(&device.event_types(), EventType::KEY.raw()) {
        eprintln!("device does not report key events");
        process::exit(1);
    }

    let held = device.key_state();
    if held.is_clear() {
        println!("no keys held");
    }
    for code in &held {
        println!("held: {:?}", Key::from_raw(code as u16));
    }

    for event in device.inbox() {
        let Some(key) = event.as_key_event() else {
            continue;
        };
        if key.state() == KeyState::PRESSED && WATCHED.contains(&key.key()) {
            println!("pressed: {:?}", key.key());
        }
    }

    println!("device closed");
    Ok(())
}
