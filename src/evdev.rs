use std::{
    error::Error,
    ffi::{c_char, c_int, c_void},
    fmt,
    fs::File,
    io::{self, Read as _, Write as _},
    mem::MaybeUninit,
    os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd},
    path::{Path, PathBuf},
    time::Instant,
};

use uoctl::Ioctl;

use crate::{
    AbsInfo, KeymapEntry, Version,
    bits::Bitset,
    event::{Abs, EventType, InputEvent, Key, Led},
    input_id::InputId,
    raw::input::{
        EVIOCGABS, EVIOCGBIT, EVIOCGID, EVIOCGKEY, EVIOCGKEYCODE_V2, EVIOCGLED, EVIOCGNAME,
        EVIOCGPHYS, EVIOCGRAB, EVIOCGUNIQ, EVIOCGVERSION, EVIOCSKEYCODE_V2,
    },
    util,
};

/// A strict handle to an *event device* node.
///
/// Every method of [`Evdev`] maps to a single `ioctl`, `read` or `write` on the underlying
/// descriptor and reports failures as [`io::Error`]s that name the request and the device path.
/// [`Device`][crate::Device] builds on this type and adds the event pumps; use [`Evdev`]
/// directly when you need to know *why* a query failed.
///
/// None of the methods require `&mut self`, so an [`Evdev`] can be shared between threads.
#[derive(Debug)]
pub struct Evdev {
    file: File,
    path: PathBuf,
    writable: bool,
}

impl AsFd for Evdev {
    #[inline]
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsRawFd for Evdev {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Evdev {
    /// Opens an `evdev` character device, typically `/dev/input/event*`.
    ///
    /// # Permissions
    ///
    /// The device is opened for reading and writing. If the current user may only read it, this
    /// falls back to read-only access and logs a warning; writing events will then fail.
    ///
    /// # Errors
    ///
    /// Fails if `path` cannot be opened, or if it does not answer `EVIOCGVERSION` (meaning it is
    /// not an `evdev` node). The error message names `path`; the [`io::ErrorKind`] is that of
    /// the underlying failure.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::open_impl(path.as_ref())
    }

    fn open_impl(path: &Path) -> io::Result<Self> {
        let now = Instant::now();
        let (file, writable) = Self::try_open(path).map_err(|e| {
            io::Error::new(e.kind(), format!("failed to open '{}': {e}", path.display()))
        })?;
        let this = Self::from_file(file, path.to_path_buf(), writable);
        let version = this.driver_version()?;
        log::debug!(
            "opened '{}' in {:?}; evdev version {version}",
            path.display(),
            now.elapsed(),
        );
        Ok(this)
    }

    fn try_open(path: &Path) -> io::Result<(File, bool)> {
        match File::options().read(true).write(true).open(path) {
            Ok(file) => return Ok((file, true)),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                log::warn!(
                    "no permission to open '{}' in read-write mode, retrying in read-only",
                    path.display()
                );
            }
            Err(e) => return Err(e),
        }

        let file = File::options().read(true).open(path)?;
        Ok((file, false))
    }

    /// Wraps an already open descriptor without any checks.
    pub(crate) fn from_file(file: File, path: PathBuf, writable: bool) -> Self {
        Self {
            file,
            path,
            writable,
        }
    }

    /// Returns the path this [`Evdev`] was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the device was opened with write access.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub(crate) unsafe fn ioctl<T>(
        &self,
        name: &'static str,
        ioctl: Ioctl<T>,
        arg: T,
    ) -> io::Result<c_int> {
        unsafe { ioctl.ioctl(self, arg) }.map_err(|cause| {
            let msg = format!(
                "ioctl {name} failed for device {} ({:?})",
                self.path.display(),
                cause.kind(),
            );
            io::Error::new(cause.kind(), IoctlError { cause, msg })
        })
    }

    /// Runs a string-returning ioctl, growing the buffer until the result fits.
    unsafe fn fetch_string(
        &self,
        name: &'static str,
        ioctl: fn(usize) -> Ioctl<*mut c_char>,
    ) -> io::Result<String> {
        let mut buf = vec![0_u8; 64];
        let len = loop {
            // The ioctl returns the number of bytes copied, including the trailing NUL, capped at
            // the buffer size. A full buffer may have truncated the string.
            let len = unsafe { self.ioctl(name, ioctl(buf.len()), buf.as_mut_ptr().cast())? };
            if len as usize >= buf.len() {
                buf.resize(buf.len() * 2, 0);
            } else {
                break len as usize;
            }
        };

        buf.truncate(len.saturating_sub(1));
        if let Some(nul) = buf.iter().position(|&b| b == 0) {
            buf.truncate(nul);
        }
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Fills a [`Bitset`] of `len` bits from a bitmap-returning ioctl.
    unsafe fn fetch_bits(
        &self,
        name: &'static str,
        len: usize,
        ioctl: impl FnOnce(usize) -> Ioctl<*mut c_void>,
    ) -> io::Result<Bitset> {
        let mut bits = Bitset::new(len);
        let bytes = bits.as_bytes_mut();
        unsafe {
            self.ioctl(name, ioctl(bytes.len()), bytes.as_mut_ptr().cast())?;
        }
        bits.mask_tail();
        Ok(bits)
    }

    /// Returns the version of the `evdev` protocol the kernel speaks.
    #[doc(alias = "EVIOCGVERSION")]
    pub fn driver_version(&self) -> io::Result<Version> {
        let mut version = 0;
        unsafe {
            self.ioctl("EVIOCGVERSION", EVIOCGVERSION, &mut version)?;
        }
        Ok(Version(version))
    }

    #[doc(alias = "EVIOCGID")]
    pub fn input_id(&self) -> io::Result<InputId> {
        let mut out = MaybeUninit::uninit();
        unsafe {
            self.ioctl("EVIOCGID", EVIOCGID, out.as_mut_ptr())?;
            Ok(InputId(out.assume_init()))
        }
    }

    /// Returns the device name reported by the driver.
    #[doc(alias = "EVIOCGNAME")]
    pub fn name(&self) -> io::Result<String> {
        unsafe { self.fetch_string("EVIOCGNAME", EVIOCGNAME) }
    }

    /// Returns the physical location of the device (eg. `usb-0000:00:14.0-3/input0`).
    ///
    /// Returns [`None`] if the driver doesn't report one.
    #[doc(alias = "EVIOCGPHYS")]
    pub fn phys(&self) -> io::Result<Option<String>> {
        not_found_as_none(unsafe { self.fetch_string("EVIOCGPHYS", EVIOCGPHYS) })
    }

    /// Returns the unique identifier of the device, usually a serial number.
    ///
    /// Returns [`None`] if the driver doesn't report one.
    #[doc(alias = "EVIOCGUNIQ")]
    pub fn unique_id(&self) -> io::Result<Option<String>> {
        not_found_as_none(unsafe { self.fetch_string("EVIOCGUNIQ", EVIOCGUNIQ) })
    }

    /// Returns the set of [`EventType`]s the device can emit.
    ///
    /// The [`Bitset`] has room for every type up to [`EventType::MAX`].
    #[doc(alias = "EVIOCGBIT")]
    pub fn event_types(&self) -> io::Result<Bitset> {
        let len = usize::from(EventType::MAX.raw()) + 1;
        unsafe { self.fetch_bits("EVIOCGBIT", len, |bytes| EVIOCGBIT(0, bytes)) }
    }

    /// Returns the set of codes the device supports for events of type `ty`.
    ///
    /// The [`Bitset`] holds [`EventType::code_max`]` + 1` bits. For types without a code bitmap
    /// an empty [`Bitset`] with a capacity of zero is returned without asking the kernel.
    #[doc(alias = "EVIOCGBIT")]
    pub fn supported_codes(&self, ty: EventType) -> io::Result<Bitset> {
        let Some(max) = ty.code_max() else {
            return Ok(Bitset::new(0));
        };
        let len = usize::from(max) + 1;
        unsafe { self.fetch_bits("EVIOCGBIT", len, |bytes| EVIOCGBIT(ty.raw() as u8, bytes)) }
    }

    /// Returns the set of [`Key`]s that are currently held down.
    ///
    /// This is a snapshot; it has no ordering relation to events that are in flight.
    #[doc(alias = "EVIOCGKEY")]
    pub fn key_state(&self) -> io::Result<Bitset> {
        let len = usize::from(Key::MAX.raw()) + 1;
        unsafe { self.fetch_bits("EVIOCGKEY", len, EVIOCGKEY) }
    }

    /// Returns the set of [`Led`]s that are currently lit.
    #[doc(alias = "EVIOCGLED")]
    pub fn led_state(&self) -> io::Result<Bitset> {
        let len = usize::from(Led::MAX.raw()) + 1;
        unsafe { self.fetch_bits("EVIOCGLED", len, EVIOCGLED) }
    }

    /// Returns the state and limits of an absolute axis.
    #[doc(alias = "EVIOCGABS")]
    pub fn abs_info(&self, abs: Abs) -> io::Result<AbsInfo> {
        if abs.raw() > Abs::MAX.raw() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("absolute axis {abs:?} exceeds ABS_MAX"),
            ));
        }

        let mut out = MaybeUninit::uninit();
        unsafe {
            self.ioctl("EVIOCGABS", EVIOCGABS(abs.raw() as u8), out.as_mut_ptr())?;
            Ok(AbsInfo(out.assume_init()))
        }
    }

    /// Grabs the device for exclusive access.
    ///
    /// While grabbed, events are delivered only to this handle and not to other readers (like
    /// the display server).
    #[doc(alias = "EVIOCGRAB")]
    pub fn grab(&self) -> io::Result<()> {
        unsafe {
            self.ioctl("EVIOCGRAB", EVIOCGRAB, 1)?;
        }
        Ok(())
    }

    /// Releases a grab taken with [`Evdev::grab`].
    #[doc(alias = "EVIOCGRAB")]
    pub fn ungrab(&self) -> io::Result<()> {
        unsafe {
            self.ioctl("EVIOCGRAB", EVIOCGRAB, 0)?;
        }
        Ok(())
    }

    /// Looks up a keymap entry.
    ///
    /// `lookup` selects the entry by index if its [`KeymapEntry::BY_INDEX`] flag is set, and by
    /// scancode otherwise (see [`KeymapEntry::lookup_index`] and
    /// [`KeymapEntry::lookup_scancode`]).
    ///
    /// Returns [`None`] if there is no such entry, which for index lookups marks the end of the
    /// keymap.
    #[doc(alias = "EVIOCGKEYCODE_V2")]
    pub fn keymap_entry(&self, lookup: &KeymapEntry) -> io::Result<Option<KeymapEntry>> {
        let mut entry = *lookup;
        match unsafe { self.ioctl("EVIOCGKEYCODE_V2", EVIOCGKEYCODE_V2, &mut entry.0) } {
            Ok(_) => Ok(Some(entry)),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes a keymap entry, changing which [`Key`] a scancode produces.
    ///
    /// Events that are already queued keep their old keycode.
    #[doc(alias = "EVIOCSKEYCODE_V2")]
    pub fn set_keymap_entry(&self, entry: &KeymapEntry) -> io::Result<()> {
        unsafe {
            self.ioctl("EVIOCSKEYCODE_V2", EVIOCSKEYCODE_V2, &entry.0)?;
        }
        Ok(())
    }

    /// Moves the descriptor into or out of non-blocking mode.
    ///
    /// Returns whether it was in non-blocking mode before the call.
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<bool> {
        util::set_nonblocking(self.as_fd(), nonblocking)
    }

    /// Reads raw event records into `buf`.
    ///
    /// Returns the number of bytes read; `0` means end of file. In blocking mode this waits for
    /// at least one record, in non-blocking mode an empty queue is reported as
    /// [`io::ErrorKind::WouldBlock`].
    pub(crate) fn read_records(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.file).read(buf)
    }

    /// Writes a single event to the device.
    ///
    /// Devices accept `EV_LED`, `EV_SND` and `EV_FF` events this way; most other events are
    /// ignored by the kernel. In non-blocking mode this waits for the descriptor to become
    /// writable instead of failing with [`io::ErrorKind::WouldBlock`], so the record is never
    /// split.
    pub fn write_event(&self, event: &InputEvent) -> io::Result<()> {
        let record = event.encode();
        let mut rest = &record[..];
        while !rest.is_empty() {
            match (&self.file).write(rest) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => rest = &rest[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    util::wait_writable(self.as_fd())?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

fn not_found_as_none(res: io::Result<String>) -> io::Result<Option<String>> {
    match res {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// An `ioctl` failure with the request name and device path attached.
#[derive(Debug)]
struct IoctlError {
    cause: io::Error,
    msg: String,
}

impl fmt::Display for IoctlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl Error for IoctlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}
