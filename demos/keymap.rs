//! Inspects or changes a device's keymap.
//!
//! Usage:
//!
//! - `keymap <path>` prints the whole keymap.
//! - `keymap <path> <scancode>` prints the key a (hexadecimal) scancode produces.
//! - `keymap <path> <scancode>=<key>` remaps a scancode, eg. `70039=KEY_ESC`.
//! - `keymap <path> <key>` finds the entry that produces a key, eg. `KEY_CAPSLOCK`.

use std::{env, io, process};

use evstream::{Evdev, KeymapEntry, Scancode, event::Key};

fn main() -> io::Result<()> {
    env_logger::init();

    match &*env::args().skip(1).collect::<Vec<_>>() {
        [path] => dump_keymap(&Evdev::open(path)?),
        [path, arg] => {
            if let Some((scancode, key)) = arg.split_once('=') {
                let entry = KeymapEntry::by_scancode(parse_scancode(scancode)?, key.parse()?);
                println!("setting {entry:?}");
                Evdev::open(path)?.set_keymap_entry(&entry)
            } else if let Ok(key) = arg.parse::<Key>() {
                let device = evstream::Device::open(path)?;
                let entry = device.key_map(key);
                if entry.is_zeroed() {
                    println!("no scancode produces {key:?}");
                } else {
                    println!("{entry:?}");
                }
                Ok(())
            } else {
                let lookup = KeymapEntry::lookup_scancode(parse_scancode(arg)?);
                match Evdev::open(path)?.keymap_entry(&lookup)? {
                    Some(entry) => println!("{entry:?}"),
                    None => println!("scancode {} is not mapped", lookup.scancode()),
                }
                Ok(())
            }
        }
        _ => {
            eprintln!("usage: keymap <path> [scancode[=key] | key]");
            eprintln!();
            eprintln!("`scancode` is hexadecimal, `key` is a key name like `KEY_BACKSPACE`.");
            process::exit(1);
        }
    }
}

fn parse_scancode(s: &str) -> io::Result<Scancode> {
    u32::from_str_radix(s, 16)
        .map(Scancode::from)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

fn dump_keymap(device: &Evdev) -> io::Result<()> {
    let mut entries = 0;
    for index in 0..=u16::MAX {
        let Some(entry) = device.keymap_entry(&KeymapEntry::lookup_index(index))? else {
            break;
        };
        println!(
            "{:>5}  {:>8}  {:?}",
            entry.index(),
            entry.scancode().to_string(),
            entry.keycode(),
        );
        entries += 1;
    }
    if entries == 0 {
        println!("this device does not have a keymap");
    }
    Ok(())
}
