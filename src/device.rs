use std::{
    fmt, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use crate::{
    AbsInfo, InputId, KeymapEntry, Version,
    bits::Bitset,
    evdev::Evdev,
    event::{Abs, EventType, Key},
    transport::{Inbox, Outbox, PumpState, StateCell, Transport},
};

/// An open input device with a running event stream.
///
/// Opening a [`Device`] starts two background pumps: events produced by the device arrive in
/// [`Device::inbox`], and events sent to [`Device::outbox`] are written to the device.
/// Capability, state and keymap queries run synchronously on the calling thread.
///
/// Queries never fail. If the device is closed or the kernel rejects a request, they return an
/// empty [`Bitset`], a zeroed record, an empty string or `false`, and log the reason at `debug`
/// level. Use [`Evdev`] when you need the error itself.
///
/// The device is closed by [`Device::close`] or when the [`Device`] is dropped.
pub struct Device {
    path: PathBuf,
    evdev: RwLock<Option<Arc<Evdev>>>,
    transport: Mutex<Option<Transport>>,
    inbound: Arc<StateCell>,
    outbound: Arc<StateCell>,
    inbox: Inbox,
    outbox: Outbox,
}

impl Device {
    /// Opens the `evdev` node at `path` and starts its event pumps.
    ///
    /// See [`Evdev::open`] for the permission fallback and the errors.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let evdev = Evdev::open(path)?;
        Self::from_evdev(evdev)
    }

    pub(crate) fn from_evdev(evdev: Evdev) -> io::Result<Self> {
        let path = evdev.path().to_path_buf();
        let evdev = Arc::new(evdev);
        let (transport, inbox, outbox) = Transport::spawn(evdev.clone())?;
        Ok(Self {
            path,
            evdev: RwLock::new(Some(evdev)),
            inbound: transport.inbound_state.clone(),
            outbound: transport.outbound_state.clone(),
            transport: Mutex::new(Some(transport)),
            inbox,
            outbox,
        })
    }

    /// Returns the path the device was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events produced by the device, in the order the kernel reported them.
    ///
    /// The stream ends (all receive methods return [`None`]) after the device is closed, is
    /// unplugged, or fails to read.
    #[inline]
    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    /// Queue for events to write to the device, eg. to toggle LEDs.
    ///
    /// Clone it to send from several threads.
    #[inline]
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Returns the phase of the pump that reads events from the device.
    pub fn inbound_state(&self) -> PumpState {
        self.inbound.get()
    }

    /// Returns the phase of the pump that writes events to the device.
    pub fn outbound_state(&self) -> PumpState {
        self.outbound.get()
    }

    /// Returns whether [`Device::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.evdev
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stops both event pumps and closes the device.
    ///
    /// Events sent to the [`Outbox`] before this call are written first. Events already in the
    /// [`Inbox`] can still be received afterwards. Calling this more than once is harmless.
    pub fn close(&self) {
        let transport = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(transport) = transport else {
            log::debug!("'{}' is already closed", self.path.display());
            return;
        };

        // The pumps must be gone before the descriptor is closed.
        transport.shutdown();
        let evdev = self
            .evdev
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(evdev);
        log::debug!("closed '{}'", self.path.display());
    }

    /// Runs a query against the open descriptor, degrading to `T::default()` on failure.
    fn query<T: Default>(&self, what: &str, f: impl FnOnce(&Evdev) -> io::Result<T>) -> T {
        let guard = self.evdev.read().unwrap_or_else(PoisonError::into_inner);
        let Some(evdev) = &*guard else {
            log::debug!("{what}: '{}' is closed", self.path.display());
            return T::default();
        };
        match f(evdev) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("{what}: {e}");
                T::default()
            }
        }
    }

    /// Returns whether `code` is a member of `bits`.
    ///
    /// This is [`Bitset::test`]; it exists so capability checks read naturally:
    /// `Device::test(&dev.event_types(), EventType::KEY.raw())`.
    #[inline]
    pub fn test(bits: &Bitset, code: u16) -> bool {
        bits.test(code.into())
    }

    /// Returns the set of [`EventType`]s the device supports.
    pub fn event_types(&self) -> Bitset {
        self.query("event_types", Evdev::event_types)
    }

    /// Returns the set of codes the device supports for events of type `ty`.
    ///
    /// See [`Evdev::supported_codes`].
    pub fn supported_codes(&self, ty: EventType) -> Bitset {
        self.query("supported_codes", |evdev| evdev.supported_codes(ty))
    }

    /// Returns the set of keys and buttons currently held down.
    pub fn key_state(&self) -> Bitset {
        self.query("key_state", Evdev::key_state)
    }

    /// Returns the set of LEDs currently lit.
    pub fn led_state(&self) -> Bitset {
        self.query("led_state", Evdev::led_state)
    }

    /// Returns the state and limits of an absolute axis, or [`AbsInfo::zeroed`].
    pub fn abs_info(&self, axis: Abs) -> AbsInfo {
        self.query("abs_info", |evdev| evdev.abs_info(axis))
    }

    /// Returns the device name reported by the driver, or an empty string.
    pub fn name(&self) -> String {
        self.query("name", Evdev::name)
    }

    /// Returns the physical location of the device (eg. `usb-0000:00:14.0-3/input0`), or an
    /// empty string.
    pub fn phys(&self) -> String {
        self.query("phys", |evdev| Ok(evdev.phys()?.unwrap_or_default()))
    }

    /// Returns the unique identifier of the device (often a serial number), or an empty string.
    pub fn unique_id(&self) -> String {
        self.query("unique_id", |evdev| Ok(evdev.unique_id()?.unwrap_or_default()))
    }

    /// Returns the bus, vendor, product and version IDs, or all zeroes.
    pub fn input_id(&self) -> InputId {
        self.query("input_id", Evdev::input_id)
    }

    /// Returns the `evdev` protocol version, or `0.0.0` if it can't be queried.
    pub fn driver_version(&self) -> Version {
        self.query("driver_version", Evdev::driver_version)
    }

    /// Grabs the device for exclusive access. Returns whether that succeeded.
    pub fn grab(&self) -> bool {
        self.query("grab", |evdev| evdev.grab().map(|()| true))
    }

    /// Releases the grab. Returns whether that succeeded.
    pub fn ungrab(&self) -> bool {
        self.query("ungrab", |evdev| evdev.ungrab().map(|()| true))
    }

    /// Finds the keymap entry that produces `key`.
    ///
    /// Walks the keymap by index until the kernel reports its end. Returns a zeroed entry if no
    /// scancode maps to `key`.
    pub fn key_map(&self, key: Key) -> KeymapEntry {
        self.query("key_map", |evdev| {
            for index in 0..=u16::MAX {
                match evdev.keymap_entry(&KeymapEntry::lookup_index(index))? {
                    Some(entry) if entry.raw_keycode() == u32::from(key.raw()) => {
                        return Ok(entry);
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            log::debug!("key_map: no scancode of '{}' maps to {key:?}", self.path.display());
            Ok(KeymapEntry::zeroed())
        })
    }

    /// Looks up a keymap entry by index or by scancode, as selected by `lookup`.
    ///
    /// Returns a zeroed entry if there is none.
    pub fn key_map_entry(&self, lookup: &KeymapEntry) -> KeymapEntry {
        self.query("key_map_entry", |evdev| {
            Ok(evdev.keymap_entry(lookup)?.unwrap_or_default())
        })
    }

    /// Changes the keymap. Returns whether the kernel accepted `entry`.
    ///
    /// Events already in the [`Inbox`] keep their old keycode.
    pub fn set_key_map(&self, entry: &KeymapEntry) -> bool {
        self.query("set_key_map", |evdev| {
            evdev.set_keymap_entry(entry).map(|()| true)
        })
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .field("inbound", &self.inbound_state())
            .field("outbound", &self.outbound_state())
            .finish_non_exhaustive()
    }
}
