//! Errors surfaced to the host. Kernel failures carry the raw [`Errno`], so the
//! host can tell an interrupted wait from a bad descriptor and decide itself
//! whether to retry.
use nix::errno::Errno;
use std::{fmt, io};

pub type Result<T> = std::result::Result<T, Error>;

/// The operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Control,
    Wait,
    Signals,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Control => "control",
            Self::Wait => "wait",
            Self::Signals => "signals",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The caller passed something structurally invalid. Nothing reached the
    /// kernel.
    Argument { op: Op, reason: String },
    /// The underlying syscall failed.
    System { op: Op, errno: Errno },
    /// A wait was cut short by a signal the caller asked to be woken by.
    Interrupted { op: Op },
}

impl Error {
    pub fn argument(op: Op, reason: impl Into<String>) -> Self {
        Self::Argument {
            op,
            reason: reason.into(),
        }
    }

    /// Maps a syscall failure, keeping EINTR apart from the rest.
    pub fn from_errno(op: Op, errno: Errno) -> Self {
        match errno {
            Errno::EINTR => Self::Interrupted { op },
            errno => Self::System { op, errno },
        }
    }

    pub fn op(&self) -> Op {
        match self {
            Self::Argument { op, .. } | Self::System { op, .. } | Self::Interrupted { op } => *op,
        }
    }

    pub fn errno(&self) -> Option<Errno> {
        match self {
            Self::System { errno, .. } => Some(*errno),
            Self::Interrupted { .. } => Some(Errno::EINTR),
            Self::Argument { .. } => None,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument { op, reason } => write!(f, "epoll {op}: invalid argument: {reason}"),
            Self::System { op, errno } => {
                write!(f, "epoll {op} failed: {:?} ({})", errno, errno.desc())
            }
            Self::Interrupted { op } => write!(f, "epoll {op} interrupted by signal (EINTR)"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Argument { .. } => io::Error::new(io::ErrorKind::InvalidInput, err),
            Error::System { errno, .. } => io::Error::from_raw_os_error(errno as i32),
            Error::Interrupted { .. } => io::Error::from(io::ErrorKind::Interrupted),
        }
    }
}
