#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod macros;

mod abs_info;
pub mod bits;
mod device;
mod drop;
mod evdev;
pub mod event;
mod input_id;
mod keymap_entry;
mod raw;
pub mod transport;
mod util;
mod version;

pub use abs_info::AbsInfo;
pub use bits::Bitset;
pub use device::Device;
pub use evdev::Evdev;
pub use event::UnknownVariant;
pub use input_id::{Bus, InputId};
pub use keymap_entry::{KeymapEntry, Scancode};
pub use transport::{Inbox, Outbox, PumpState, SendError};
pub use version::Version;
