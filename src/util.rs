use std::{
    io,
    os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd},
};

/// What [`wait_readable`] woke up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ready {
    /// The watched descriptor can be read without blocking (or has hung up, or has an error).
    Fd,
    /// The [`WakePipe`] has been signalled.
    Wake,
}

/// Uses `poll(2)` to block until `fd` is readable or `wake` has been signalled.
///
/// A signalled `wake` takes priority. Returns an [`io::ErrorKind::Interrupted`] error if a signal
/// arrived first; callers are expected to retry.
pub(crate) fn wait_readable(fd: BorrowedFd<'_>, wake: &WakePipe) -> io::Result<Ready> {
    let mut fds = [
        libc::pollfd {
            fd: wake.read.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
    ];
    loop {
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }

        if fds[0].revents != 0 {
            return Ok(Ready::Wake);
        }
        // POLLHUP/POLLERR are reported regardless of `events`; the next read will surface them.
        if fds[1].revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0 {
            return Ok(Ready::Fd);
        }
        if fds[1].revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
    }
}

/// Uses `poll(2)` to block until `fd` accepts a write.
pub(crate) fn wait_writable(fd: BorrowedFd<'_>) -> io::Result<()> {
    let mut poll = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let ret = unsafe { libc::poll(&mut poll, 1, -1) };
        if ret == -1 {
            let e = io::Error::last_os_error();
            if e.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(e);
        }
        if poll.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        // POLLHUP/POLLERR: the write that follows reports the actual error.
        if poll.revents != 0 {
            return Ok(());
        }
    }
}

/// Sets or clears `O_NONBLOCK` on `fd`, returning whether it was set before.
pub(crate) fn set_nonblocking(fd: BorrowedFd<'_>, nonblocking: bool) -> io::Result<bool> {
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags == -1 {
        return Err(io::Error::last_os_error());
    }

    let was_nonblocking = flags & libc::O_NONBLOCK != 0;
    let new_flags = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };

    if new_flags != flags {
        let ret = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, new_flags) };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(was_nonblocking)
}

/// A self-pipe that unblocks [`wait_readable`].
///
/// Once signalled, the pipe stays readable forever, so every later wait returns
/// [`Ready::Wake`] immediately.
#[derive(Debug)]
pub(crate) struct WakePipe {
    read: OwnedFd,
    write: OwnedFd,
}

impl WakePipe {
    pub(crate) fn new() -> io::Result<Self> {
        let mut fds = [0; 2];
        let ret = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC | libc::O_NONBLOCK) };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        // Safety: `pipe2` returned two fresh descriptors that nothing else owns.
        unsafe {
            Ok(Self {
                read: OwnedFd::from_raw_fd(fds[0]),
                write: OwnedFd::from_raw_fd(fds[1]),
            })
        }
    }

    pub(crate) fn wake(&self) -> io::Result<()> {
        let ret = unsafe { libc::write(self.write.as_raw_fd(), [1u8].as_ptr().cast(), 1) };
        if ret == -1 {
            let err = io::Error::last_os_error();
            // A full pipe is already readable.
            if err.kind() != io::ErrorKind::WouldBlock {
                return Err(err);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn is_signalled(&self) -> bool {
        let mut fds = [libc::pollfd {
            fd: self.read.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), 1, 0) };
        ret == 1
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, os::fd::AsFd, os::unix::net::UnixStream, thread, time::Duration};

    use super::*;

    #[test]
    fn wake_takes_priority() -> io::Result<()> {
        let (mut a, b) = UnixStream::pair()?;
        let wake = WakePipe::new()?;
        assert!(!wake.is_signalled());

        a.write_all(b"x")?;
        assert_eq!(wait_readable(b.as_fd(), &wake)?, Ready::Fd);

        wake.wake()?;
        wake.wake()?;
        assert!(wake.is_signalled());
        assert_eq!(wait_readable(b.as_fd(), &wake)?, Ready::Wake);
        Ok(())
    }

    #[test]
    fn wake_unblocks_waiter() -> io::Result<()> {
        let (_a, b) = UnixStream::pair()?;
        let wake = WakePipe::new()?;
        thread::scope(|s| -> io::Result<()> {
            let waiter = s.spawn(|| wait_readable(b.as_fd(), &wake));
            thread::sleep(Duration::from_millis(20));
            wake.wake()?;
            let ready = waiter.join().unwrap()?;
            assert_eq!(ready, Ready::Wake);
            Ok(())
        })
    }

    #[test]
    fn hangup_is_readable() -> io::Result<()> {
        let (a, b) = UnixStream::pair()?;
        let wake = WakePipe::new()?;
        drop(a);
        assert_eq!(wait_readable(b.as_fd(), &wake)?, Ready::Fd);
        Ok(())
    }
}
