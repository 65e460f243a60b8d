//! Instance creation and interest registration on raw handles.
//!
//! These are the entry points host bindings call with plain integers. Each
//! call is a single syscall; nothing about the registration is kept here.
//! [`Instance`](crate::Instance) wraps the same operations with ownership and
//! bookkeeping.
use nix::errno::Errno;
use nix::libc;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags};
use std::os::fd::{IntoRawFd, RawFd};

use crate::consts::{interest_from_bits, ControlOp};
use crate::error::{Error, Op, Result};
use crate::mode::{triggering_mode, TriggerMode};

pub(crate) fn new_epoll(close_on_exec: bool) -> Result<Epoll> {
    let flags = if close_on_exec {
        EpollCreateFlags::EPOLL_CLOEXEC
    } else {
        EpollCreateFlags::empty()
    };
    Epoll::new(flags).map_err(|e| Error::from_errno(Op::Create, e))
}

/// Creates an epoll instance. The caller owns the returned descriptor and
/// destroys the instance by closing it.
pub fn create_instance(close_on_exec: bool) -> Result<RawFd> {
    let epoll = new_epoll(close_on_exec)?;
    let handle = epoll.0.into_raw_fd();
    log::debug!("created epoll instance {handle} (cloexec: {close_on_exec})");
    Ok(handle)
}

/// Runs one `epoll_ctl` and returns the interest the kernel now holds for
/// `fd`: `None` after a delete.
///
/// ADD and MODIFY need an interest; under [`TriggerMode::Edge`] the edge bit is
/// added to it. DELETE always drops every interest, so a supplied mask is
/// ignored with a warning.
pub(crate) fn apply(
    epfd: RawFd,
    op: ControlOp,
    fd: RawFd,
    interest: Option<EpollFlags>,
    mode: TriggerMode,
) -> Result<Option<EpollFlags>> {
    let effective = match (op, interest) {
        (ControlOp::Delete, Some(ignored)) => {
            log::warn!(
                "deleting fd {fd} from epoll {epfd} ignores the interest {ignored:?}; \
                 use MODIFY to drop only some events"
            );
            None
        }
        (ControlOp::Delete, None) => None,
        (_, None) => {
            return Err(Error::argument(
                Op::Control,
                "ADD and MODIFY need an interest mask (readable, writable or both)",
            ))
        }
        (_, Some(requested)) => Some(mode.effective(requested)),
    };

    let mut event = match effective {
        Some(flags) => EpollEvent::new(flags, fd as u64),
        None => EpollEvent::empty(),
    };
    // EpollEvent is a transparent wrapper over libc::epoll_event.
    let res = unsafe {
        libc::epoll_ctl(
            epfd,
            op.code(),
            fd,
            (&mut event as *mut EpollEvent).cast::<libc::epoll_event>(),
        )
    };
    Errno::result(res).map_err(|e| Error::from_errno(Op::Control, e))?;

    log::debug!("epoll {epfd}: {op:?} fd {fd} -> {effective:?}");
    Ok(effective)
}

/// Adds, modifies or removes `fd` on the instance `handle`.
///
/// `op` is one of [`CTL_ADD`](crate::consts::CTL_ADD),
/// [`CTL_MOD`](crate::consts::CTL_MOD) or [`CTL_DEL`](crate::consts::CTL_DEL).
/// The process-wide triggering mode applies.
pub fn control(handle: RawFd, op: i32, fd: RawFd, interest: Option<u32>) -> Result<bool> {
    let op = ControlOp::try_from(op)?;
    let interest = match (op, interest) {
        // ignored anyway; don't reject it over unknown bits
        (ControlOp::Delete, Some(mask)) => Some(EpollFlags::from_bits_retain(mask as i32)),
        (_, Some(mask)) => Some(interest_from_bits(Op::Control, mask)?),
        (_, None) => None,
    };
    apply(handle, op, fd, interest, triggering_mode())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CTL_ADD, CTL_DEL, CTL_MOD, READABLE};
    use nix::unistd::{close, pipe};
    use std::os::fd::AsRawFd;

    #[test]
    fn create_and_close() {
        let handle = create_instance(true).unwrap();
        assert!(handle >= 0);
        close(handle).unwrap();
    }

    #[test]
    fn add_needs_interest() {
        let handle = create_instance(true).unwrap();
        let (rx, _tx) = pipe().unwrap();

        for op in [CTL_ADD, CTL_MOD] {
            let err = control(handle, op, rx.as_raw_fd(), None).unwrap_err();
            assert!(matches!(err, Error::Argument { op: Op::Control, .. }), "{err}");
        }
        close(handle).unwrap();
    }

    #[test]
    fn kernel_failures_carry_errno() {
        let handle = create_instance(true).unwrap();
        let (rx, _tx) = pipe().unwrap();
        let fd = rx.as_raw_fd();

        // not registered yet
        let err = control(handle, CTL_MOD, fd, Some(READABLE)).unwrap_err();
        assert_eq!(err.errno(), Some(Errno::ENOENT));
        let err = control(handle, CTL_DEL, fd, None).unwrap_err();
        assert_eq!(err.errno(), Some(Errno::ENOENT));

        assert!(control(handle, CTL_ADD, fd, Some(READABLE)).unwrap());
        let err = control(handle, CTL_ADD, fd, Some(READABLE)).unwrap_err();
        assert_eq!(
            err,
            Error::System {
                op: Op::Control,
                errno: Errno::EEXIST
            }
        );

        // DELETE ignores whatever mask it is handed
        assert!(control(handle, CTL_DEL, fd, Some(u32::MAX)).unwrap());
        close(handle).unwrap();
    }

    #[test]
    fn bad_handle_and_bad_op() {
        let (rx, _tx) = pipe().unwrap();
        let err = control(-1, CTL_ADD, rx.as_raw_fd(), Some(READABLE)).unwrap_err();
        assert_eq!(err.errno(), Some(Errno::EBADF));

        let err = control(-1, 9, rx.as_raw_fd(), Some(READABLE)).unwrap_err();
        assert!(matches!(err, Error::Argument { .. }));
    }

    #[test]
    fn explicit_modes() {
        let epoll = new_epoll(true).unwrap();
        let epfd = epoll.0.as_raw_fd();
        let (a, _a_tx) = pipe().unwrap();
        let (b, _b_tx) = pipe().unwrap();

        let edge = apply(
            epfd,
            ControlOp::Add,
            a.as_raw_fd(),
            Some(EpollFlags::EPOLLIN),
            TriggerMode::Edge,
        )
        .unwrap();
        assert_eq!(edge, Some(EpollFlags::EPOLLIN | EpollFlags::EPOLLET));

        let level = apply(
            epfd,
            ControlOp::Add,
            b.as_raw_fd(),
            Some(EpollFlags::EPOLLIN),
            TriggerMode::Level,
        )
        .unwrap();
        assert_eq!(level, Some(EpollFlags::EPOLLIN));

        let gone = apply(
            epfd,
            ControlOp::Delete,
            a.as_raw_fd(),
            Some(EpollFlags::EPOLLOUT),
            TriggerMode::Edge,
        )
        .unwrap();
        assert_eq!(gone, None);
    }
}
