//! The wait engine: a signal-masked `epoll_pwait` into a reusable buffer.
//!
//! Ready events come back in the kernel's native order, slot 0 first. For
//! descriptors that were registered before they became ready, that is the
//! order in which they became ready.
use nix::errno::Errno;
use nix::libc;
use nix::sys::epoll::{EpollEvent, EpollFlags};
use nix::sys::signal::SigSet;
use std::cell::RefCell;
use std::mem;
use std::os::fd::RawFd;

use crate::consts::{interest_to_bits, DEFAULT_MAX_EVENTS};
use crate::error::{Error, Op, Result};
use crate::signals::wait_mask;

/// How long a wait may sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Report what is ready now, never sleep.
    #[default]
    Immediate,
    Millis(u32),
    Forever,
}

impl Timeout {
    /// Follows the kernel convention: 0 polls, negative blocks indefinitely.
    pub fn from_millis(ms: i32) -> Self {
        match ms {
            0 => Self::Immediate,
            ms if ms < 0 => Self::Forever,
            ms => Self::Millis(ms as u32),
        }
    }

    fn as_raw(self) -> libc::c_int {
        match self {
            Self::Immediate => 0,
            Self::Millis(ms) => ms.min(libc::c_int::MAX as u32) as libc::c_int,
            Self::Forever => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    pub fd: RawFd,
    pub events: EpollFlags,
}

impl ReadyEvent {
    pub fn is_readable(&self) -> bool {
        self.events.contains(EpollFlags::EPOLLIN)
    }

    pub fn is_writable(&self) -> bool {
        self.events.contains(EpollFlags::EPOLLOUT)
    }

    pub fn is_hangup(&self) -> bool {
        self.events
            .intersects(EpollFlags::EPOLLHUP | EpollFlags::EPOLLERR | EpollFlags::EPOLLRDHUP)
    }

    /// The primitive pair handed to host bindings.
    pub fn as_pair(&self) -> (RawFd, u32) {
        (self.fd, interest_to_bits(self.events))
    }
}

/// Largest batch the kernel accepts (`EP_MAX_EVENTS`).
pub const MAX_EVENTS_LIMIT: usize = libc::c_int::MAX as usize / mem::size_of::<EpollEvent>();

/// Kernel event slots. Grows to the largest batch ever asked for and never
/// shrinks.
#[derive(Debug)]
pub struct EventBuffer {
    slots: Vec<EpollEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_EVENTS)
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            slots: vec![EpollEvent::empty(); n],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn reserve(&mut self, n: usize) {
        if n > self.slots.len() {
            self.slots.resize(n, EpollEvent::empty());
        }
    }

    /// Sleeps on `epfd` for at most `timeout`, woken early by any signal in
    /// the blocked-signal set, and returns up to `max_events` ready events.
    pub fn wait(
        &mut self,
        epfd: RawFd,
        timeout: Timeout,
        max_events: usize,
    ) -> Result<Vec<ReadyEvent>> {
        if max_events == 0 {
            return Err(Error::argument(Op::Wait, "max_events must be at least 1"));
        }
        if max_events > MAX_EVENTS_LIMIT {
            let reason = format!("max_events {max_events} is above the kernel limit {MAX_EVENTS_LIMIT}");
            return Err(Error::argument(Op::Wait, reason));
        }
        self.reserve(max_events);
        let mask = wait_mask()?;
        let filled = pwait(epfd, &mut self.slots[..max_events], timeout, &mask)?;
        log::trace!("epoll {epfd} woke with {filled} of {max_events} slots filled");
        Ok(self.slots[..filled]
            .iter()
            .map(|slot| ReadyEvent {
                fd: slot.data() as RawFd,
                events: slot.events(),
            })
            .collect())
    }
}

fn pwait(epfd: RawFd, slots: &mut [EpollEvent], timeout: Timeout, mask: &SigSet) -> Result<usize> {
    let sigmask: &libc::sigset_t = mask.as_ref();
    // EpollEvent is a transparent wrapper over libc::epoll_event.
    let res = unsafe {
        libc::epoll_pwait(
            epfd,
            slots.as_mut_ptr().cast::<libc::epoll_event>(),
            slots.len() as libc::c_int,
            timeout.as_raw(),
            sigmask,
        )
    };
    Errno::result(res)
        .map(|n| n as usize)
        .map_err(|e| Error::from_errno(Op::Wait, e))
}

thread_local! {
    static THREAD_BUFFER: RefCell<EventBuffer> = RefCell::new(EventBuffer::new());
}

/// Waits on a raw instance handle and returns primitive `(fd, mask)` pairs.
///
/// Uses a buffer private to the calling thread, so waits on several threads
/// do not step on each other.
pub fn wait(handle: RawFd, timeout: Timeout, max_events: usize) -> Result<Vec<(RawFd, u32)>> {
    THREAD_BUFFER.with(|buffer| {
        let events = buffer.borrow_mut().wait(handle, timeout, max_events)?;
        Ok(events.iter().map(ReadyEvent::as_pair).collect())
    })
}

/// Capacity of the calling thread's raw-handle buffer.
pub fn thread_buffer_capacity() -> usize {
    THREAD_BUFFER.with(|buffer| buffer.borrow().capacity())
}
