//! An owned, non-blocking file descriptor with a co-located read buffer.
//!
//! Under edge triggering a readiness event is only delivered once per
//! transition, so whoever reacts to it has to read until the descriptor runs
//! dry. `BufFd::drain` does that, handing each chunk to a callback.
use nix::errno::Errno;

use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use crate::utils::set_fd_nonblocking;

const IO_BUFSIZE: usize = 4096;

/// What a drain ended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drained {
    /// The descriptor has no more data for now.
    WouldBlock,
    /// The writer went away.
    Eof,
}

#[derive(Debug)]
pub struct BufFd {
    fd: OwnedFd,
    buffer: Box<[u8; IO_BUFSIZE]>,
    curr_len: usize,
}

impl BufFd {
    pub fn new(fd: OwnedFd) -> Result<Self, Errno> {
        set_fd_nonblocking(fd.as_raw_fd())?;
        Ok(Self {
            fd,
            buffer: Box::new([0; IO_BUFSIZE]),
            curr_len: 0,
        })
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.curr_len]
    }

    /// Reads until the descriptor would block or hits EOF.
    pub fn drain<F>(&mut self, mut consume: F) -> Result<Drained, Errno>
    where
        F: FnMut(&[u8]),
    {
        loop {
            match nix::unistd::read(self.fd.as_raw_fd(), &mut self.buffer[..]) {
                Ok(0) => {
                    self.curr_len = 0;
                    return Ok(Drained::Eof);
                }
                Ok(n) => {
                    self.curr_len = n;
                    consume(self.data());
                }
                Err(Errno::EAGAIN) => {
                    self.curr_len = 0;
                    return Ok(Drained::WouldBlock);
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
