use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::sys::stat::Mode;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use std::path::Path;

pub fn set_fd_nonblocking(fd: RawFd) -> nix::Result<()> {
    let bits = fcntl(fd, FcntlArg::F_GETFL)?;
    let prev_flags = OFlag::from_bits_truncate(bits);
    fcntl(fd, FcntlArg::F_SETFL(prev_flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

/// Opens `path` read-only without blocking, so FIFOs with no writer yet
/// don't hang the open.
pub fn open_nonblocking(path: &Path) -> nix::Result<OwnedFd> {
    let fd = open(
        path,
        OFlag::O_RDONLY | OFlag::O_NONBLOCK | OFlag::O_CLOEXEC,
        Mode::empty(),
    )?;
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::pipe;
    use std::os::fd::AsRawFd;

    #[test]
    fn sets_nonblocking() {
        let (rx, _tx) = pipe().unwrap();
        set_fd_nonblocking(rx.as_raw_fd()).unwrap();
        let bits = fcntl(rx.as_raw_fd(), FcntlArg::F_GETFL).unwrap();
        assert!(OFlag::from_bits_truncate(bits).contains(OFlag::O_NONBLOCK));
    }

    #[test]
    fn missing_path() {
        let err = open_nonblocking(Path::new("/nonexistent/fifo")).unwrap_err();
        assert_eq!(err, nix::errno::Errno::ENOENT);
    }
}
