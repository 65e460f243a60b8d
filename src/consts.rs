//! Interest/event bits and control codes, as the Linux epoll ABI defines them.
//!
//! Host bindings export these verbatim. They are plain `u32` masks so they can
//! cross the binding boundary unchanged; the typed API works with
//! [`EpollFlags`] instead, whose bits are identical.
use nix::libc;
use nix::sys::epoll::EpollFlags;

use crate::error::{Error, Op, Result};

pub const READABLE: u32 = libc::EPOLLIN as u32;
pub const WRITABLE: u32 = libc::EPOLLOUT as u32;
pub const ERROR: u32 = libc::EPOLLERR as u32;
pub const HANGUP: u32 = libc::EPOLLHUP as u32;
pub const EDGE_TRIGGERED: u32 = libc::EPOLLET as u32;
pub const ONE_SHOT: u32 = libc::EPOLLONESHOT as u32;
pub const WAKEUP_ON_AUTOSLEEP: u32 = libc::EPOLLWAKEUP as u32;

/// Flag for instance creation, not an interest bit.
pub const CLOEXEC: i32 = libc::EPOLL_CLOEXEC;

pub const CTL_ADD: i32 = libc::EPOLL_CTL_ADD;
pub const CTL_MOD: i32 = libc::EPOLL_CTL_MOD;
pub const CTL_DEL: i32 = libc::EPOLL_CTL_DEL;

/// Batch size used when the caller does not pick one.
pub const DEFAULT_MAX_EVENTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    Add,
    Modify,
    Delete,
}

impl ControlOp {
    pub fn code(self) -> i32 {
        match self {
            Self::Add => CTL_ADD,
            Self::Modify => CTL_MOD,
            Self::Delete => CTL_DEL,
        }
    }
}

impl TryFrom<i32> for ControlOp {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            CTL_ADD => Ok(Self::Add),
            CTL_MOD => Ok(Self::Modify),
            CTL_DEL => Ok(Self::Delete),
            other => Err(Error::argument(
                Op::Control,
                format!("unknown control operation {other}"),
            )),
        }
    }
}

/// Converts a primitive interest mask into flags, rejecting bits the kernel
/// does not define.
pub fn interest_from_bits(op: Op, mask: u32) -> Result<EpollFlags> {
    EpollFlags::from_bits(mask as i32)
        .ok_or_else(|| Error::argument(op, format!("unknown interest bits in {mask:#x}")))
}

pub fn interest_to_bits(flags: EpollFlags) -> u32 {
    flags.bits() as u32
}
