//! An owned epoll instance with its own settings and result buffer.
//!
//! Where the raw-handle functions share process-wide state, an `Instance`
//! carries its own: it may pin a triggering mode, it remembers the effective
//! interest of every descriptor registered through it, and it waits into a
//! buffer nobody else touches. Dropping it closes the epoll descriptor; the
//! watched descriptors stay the caller's.
use nix::sys::epoll::{Epoll, EpollFlags};
use std::collections::HashMap;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, RawFd};

use crate::consts::{ControlOp, DEFAULT_MAX_EVENTS};
use crate::error::Result;
use crate::mode::{triggering_mode, TriggerMode};
use crate::registry::{apply, new_epoll};
use crate::wait::{EventBuffer, ReadyEvent, Timeout};

#[derive(Debug)]
pub struct Instance {
    epoll: Epoll,
    mode: Option<TriggerMode>,
    interests: HashMap<RawFd, EpollFlags>,
    events: EventBuffer,
}

impl Instance {
    pub fn new(close_on_exec: bool) -> Result<Self> {
        let epoll = new_epoll(close_on_exec)?;
        log::debug!("created epoll instance {}", epoll.0.as_raw_fd());
        Ok(Self {
            epoll,
            mode: None,
            interests: HashMap::new(),
            events: EventBuffer::new(),
        })
    }

    /// Pins the triggering mode for registrations made through this instance
    /// from now on, instead of following the process-wide setting.
    pub fn with_mode(mut self, mode: TriggerMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn set_mode(&mut self, mode: Option<TriggerMode>) {
        self.mode = mode;
    }

    /// The mode the next ADD or MODIFY will use.
    pub fn mode(&self) -> TriggerMode {
        self.mode.unwrap_or_else(triggering_mode)
    }

    /// Registers, changes or removes `fd` and returns the interest the kernel
    /// now holds for it.
    pub fn control(
        &mut self,
        op: ControlOp,
        fd: RawFd,
        interest: Option<EpollFlags>,
    ) -> Result<Option<EpollFlags>> {
        let effective = apply(self.epoll.0.as_raw_fd(), op, fd, interest, self.mode())?;
        match effective {
            Some(flags) => self.interests.insert(fd, flags),
            None => self.interests.remove(&fd),
        };
        Ok(effective)
    }

    pub fn add(&mut self, fd: RawFd, interest: EpollFlags) -> Result<EpollFlags> {
        self.control(ControlOp::Add, fd, Some(interest))
            .map(|effective| effective.unwrap_or(interest))
    }

    pub fn modify(&mut self, fd: RawFd, interest: EpollFlags) -> Result<EpollFlags> {
        self.control(ControlOp::Modify, fd, Some(interest))
            .map(|effective| effective.unwrap_or(interest))
    }

    pub fn delete(&mut self, fd: RawFd) -> Result<()> {
        self.control(ControlOp::Delete, fd, None).map(|_| ())
    }

    /// Effective interest of `fd`, as registered through this instance.
    ///
    /// Only ADD/MODIFY/DELETE made here update this. Closing a watched
    /// descriptor makes the kernel drop its registration silently, so delete
    /// descriptors before closing them or this goes stale.
    pub fn interest(&self, fd: RawFd) -> Option<EpollFlags> {
        self.interests.get(&fd).copied()
    }

    /// Number of descriptors registered through this instance and not yet
    /// deleted. Same caveat as [`interest`](Self::interest): descriptors
    /// closed without a DELETE are still counted.
    pub fn registered(&self) -> usize {
        self.interests.len()
    }

    /// True once every registration made here has been deleted.
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty()
    }

    pub fn wait(&mut self, timeout: Timeout, max_events: usize) -> Result<Vec<ReadyEvent>> {
        self.events.wait(self.epoll.0.as_raw_fd(), timeout, max_events)
    }

    /// [`wait`](Self::wait) with the default batch size.
    pub fn poll(&mut self, timeout: Timeout) -> Result<Vec<ReadyEvent>> {
        self.wait(timeout, DEFAULT_MAX_EVENTS)
    }

    pub fn buffer_capacity(&self) -> usize {
        self.events.capacity()
    }
}

impl AsFd for Instance {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.epoll.0.as_fd()
    }
}

impl AsRawFd for Instance {
    fn as_raw_fd(&self) -> RawFd {
        self.epoll.0.as_raw_fd()
    }
}

impl IntoRawFd for Instance {
    fn into_raw_fd(self) -> RawFd {
        self.epoll.0.into_raw_fd()
    }
}
