//! The event pumps connecting a device descriptor to application channels.
//!
//! Each open [`Device`][crate::Device] runs two worker threads:
//!
//! - The *inbound* pump waits for the descriptor to become readable, reads as many whole event
//!   records as are available, decodes them and forwards them, in kernel order, to the
//!   [`Inbox`].
//! - The *outbound* pump takes events from the [`Outbox`] channel in the order they were sent and
//!   writes each of them to the descriptor.
//!
//! Closing a device signals both pumps, waits for them to exit, and only then closes the
//! descriptor, so no read or write ever races the close.

use std::{
    error::Error,
    fmt, io,
    os::fd::AsFd,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    thread::{self, JoinHandle},
};

use tokio::sync::{
    Mutex,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
};

pub use tokio::sync::mpsc::error::TryRecvError;

use crate::{
    drop::on_drop,
    evdev::Evdev,
    event::InputEvent,
    util::{Ready, WakePipe, wait_readable},
};

/// Number of records the inbound pump reads per `read(2)`.
const READ_BATCH: usize = 64;

/// Lifecycle phase of one pump.
///
/// A pump moves from [`Idle`][Self::Idle] to [`Running`][Self::Running] when its thread starts,
/// and from there to [`Stopped`][Self::Stopped] exactly once, when it exits for any reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        Self(AtomicU8::new(PumpState::Idle as u8))
    }

    fn set(&self, state: PumpState) {
        self.0.store(state as u8, Ordering::Release);
    }

    pub(crate) fn get(&self) -> PumpState {
        match self.0.load(Ordering::Acquire) {
            0 => PumpState::Idle,
            1 => PumpState::Running,
            _ => PumpState::Stopped,
        }
    }
}

/// Receiving end of a device's event stream.
///
/// Events arrive in the order the kernel produced them. Once the inbound pump stops (the device
/// was closed or disconnected, or a read failed) the remaining buffered events are still
/// delivered, after which every receive method reports the end of the stream.
///
/// An [`Inbox`] can be shared between threads; concurrent receivers each get a disjoint subset of
/// the events.
#[derive(Debug)]
pub struct Inbox {
    rx: Mutex<UnboundedReceiver<InputEvent>>,
}

impl Inbox {
    /// Blocks until the next event arrives.
    ///
    /// Returns [`None`] once the stream has ended.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context. Use
    /// [`Inbox::recv_async`] there.
    pub fn recv(&self) -> Option<InputEvent> {
        self.rx.blocking_lock().blocking_recv()
    }

    /// Waits for the next event without blocking the thread.
    ///
    /// Returns [`None`] once the stream has ended.
    pub async fn recv_async(&self) -> Option<InputEvent> {
        self.rx.lock().await.recv().await
    }

    /// Returns the next buffered event, if any.
    ///
    /// [`TryRecvError::Disconnected`] means the stream has ended. If another thread is currently
    /// receiving, this returns [`TryRecvError::Empty`].
    pub fn try_recv(&self) -> Result<InputEvent, TryRecvError> {
        match self.rx.try_lock() {
            Ok(mut rx) => rx.try_recv(),
            Err(_) => Err(TryRecvError::Empty),
        }
    }

    /// Returns a blocking iterator over the events. It ends with the stream.
    ///
    /// # Panics
    ///
    /// Like [`Inbox::recv`], the iterator panics when used from an asynchronous context.
    pub fn iter(&self) -> Iter<'_> {
        Iter { inbox: self }
    }
}

impl<'a> IntoIterator for &'a Inbox {
    type Item = InputEvent;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Blocking iterator over an [`Inbox`]. Returned by [`Inbox::iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    inbox: &'a Inbox,
}

impl Iterator for Iter<'_> {
    type Item = InputEvent;

    fn next(&mut self) -> Option<InputEvent> {
        self.inbox.recv()
    }
}

pub(crate) enum Outbound {
    Event(InputEvent),
    Shutdown,
}

/// Sending end for events that should be written to a device.
///
/// Events are written in the order they were sent. Write failures are logged and don't reach the
/// sender; [`Outbox::send`] only fails once the outbound pump has stopped.
///
/// [`Outbox`] is cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: UnboundedSender<Outbound>,
}

impl Outbox {
    /// Queues `event` to be written to the device. Never blocks.
    pub fn send(&self, event: InputEvent) -> Result<(), SendError> {
        self.tx
            .send(Outbound::Event(event))
            .map_err(|_| SendError(event))
    }

    /// Returns whether the outbound pump has stopped, so that [`Outbox::send`] would fail.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(ev) => fmt::Debug::fmt(ev, f),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Error returned by [`Outbox::send`] when the device no longer accepts events.
///
/// Carries the event that couldn't be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError(pub InputEvent);

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("device is closed; outbound event dropped")
    }
}

impl Error for SendError {}

/// A running pair of pumps.
#[derive(Debug)]
pub(crate) struct Transport {
    wake: Arc<WakePipe>,
    shutdown: UnboundedSender<Outbound>,
    inbound: JoinHandle<()>,
    outbound: JoinHandle<()>,
    pub(crate) inbound_state: Arc<StateCell>,
    pub(crate) outbound_state: Arc<StateCell>,
}

impl Transport {
    /// Spawns both pumps for `evdev`.
    pub(crate) fn spawn(evdev: Arc<Evdev>) -> io::Result<(Self, Inbox, Outbox)> {
        // `poll` readiness is only a hint: `EVIOCGKEY` and friends flush queued events, so a
        // blocking read after a wakeup could wait past shutdown.
        evdev.set_nonblocking(true)?;
        let wake = Arc::new(WakePipe::new()?);
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let inbound_state = Arc::new(StateCell::new());
        let outbound_state = Arc::new(StateCell::new());

        let inbound = {
            let (evdev, wake, state) = (evdev.clone(), wake.clone(), inbound_state.clone());
            thread::Builder::new()
                .name("evstream-in".into())
                .spawn(move || run(&state, || pump_inbound(&evdev, &wake, &in_tx)))?
        };
        let outbound = {
            let (evdev, state) = (evdev.clone(), outbound_state.clone());
            let mut out_rx = out_rx;
            thread::Builder::new()
                .name("evstream-out".into())
                .spawn(move || run(&state, || pump_outbound(&evdev, &mut out_rx)))
        };
        let outbound = match outbound {
            Ok(handle) => handle,
            Err(e) => {
                // Don't leak the inbound thread.
                wake.wake()?;
                let _ = inbound.join();
                return Err(e);
            }
        };

        log::debug!("started event pumps for '{}'", evdev.path().display());
        let this = Self {
            wake,
            shutdown: out_tx.clone(),
            inbound,
            outbound,
            inbound_state,
            outbound_state,
        };
        let inbox = Inbox {
            rx: Mutex::new(in_rx),
        };
        Ok((this, inbox, Outbox { tx: out_tx }))
    }

    /// Stops both pumps and waits for them to exit.
    ///
    /// Events sent before this call are written before the outbound pump exits.
    pub(crate) fn shutdown(self) {
        if let Err(e) = self.wake.wake() {
            log::error!("failed to signal inbound pump: {e}");
        }
        // Fails only if the pump has already stopped.
        let _ = self.shutdown.send(Outbound::Shutdown);

        for (name, handle) in [("inbound", self.inbound), ("outbound", self.outbound)] {
            if handle.join().is_err() {
                log::error!("{name} event pump panicked");
            }
        }
    }
}

fn run(state: &StateCell, pump: impl FnOnce()) {
    state.set(PumpState::Running);
    let _guard = on_drop(|| state.set(PumpState::Stopped));
    pump();
}

fn pump_inbound(evdev: &Evdev, wake: &WakePipe, tx: &UnboundedSender<InputEvent>) {
    let path = evdev.path().display();
    let mut buf = [0; InputEvent::SIZE * READ_BATCH];
    loop {
        match wait_readable(evdev.as_fd(), wake) {
            Ok(Ready::Fd) => {}
            Ok(Ready::Wake) => {
                log::debug!("inbound pump for '{path}' shutting down");
                return;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::error!("failed to poll '{path}': {e}");
                return;
            }
        }

        let len = match evdev.read_records(&mut buf) {
            Ok(0) => {
                log::info!("'{path}' reached end of file");
                return;
            }
            Ok(len) => len,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) =>
            {
                continue;
            }
            Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                log::info!("'{path}' has been disconnected");
                return;
            }
            Err(e) => {
                log::error!("failed to read events from '{path}': {e}");
                return;
            }
        };

        for record in buf[..len].chunks(InputEvent::SIZE) {
            let event = match InputEvent::decode(record) {
                Ok(event) => event,
                Err(e) => {
                    log::error!("malformed event record from '{path}': {e}");
                    return;
                }
            };
            log::trace!("'{path}' -> {event:?}");
            if tx.send(event).is_err() {
                log::debug!("inbox for '{path}' dropped, stopping inbound pump");
                return;
            }
        }
    }
}

fn pump_outbound(evdev: &Evdev, rx: &mut UnboundedReceiver<Outbound>) {
    let path = evdev.path().display();
    while let Some(msg) = rx.blocking_recv() {
        let event = match msg {
            Outbound::Event(event) => event,
            Outbound::Shutdown => {
                log::debug!("outbound pump for '{path}' shutting down");
                return;
            }
        };

        log::trace!("'{path}' <- {event:?}");
        match evdev.write_event(&event) {
            Ok(()) => {}
            Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                log::info!("'{path}' has been disconnected");
                return;
            }
            Err(e) => log::warn!("failed to write {event:?} to '{path}': {e}"),
        }
    }
    log::debug!("all outboxes for '{path}' dropped, stopping outbound pump");
}
