//! Linux epoll for host runtimes that run their own scheduler.
//!
//! The crate covers three things: creating epoll instances, registering
//! interest in descriptors on them, and a blocking wait that can be woken by a
//! chosen set of signals without racing them. It has no event loop; callers
//! wait, get a batch of `(descriptor, events)` pairs and decide what to do.
//!
//! There are two ways in. The raw-handle functions ([`create_instance`],
//! [`control`], [`wait`]) take and return plain integers for host bindings and
//! follow the process-wide settings ([`set_triggering_mode`],
//! [`set_blocked_signals`]). [`Instance`] owns its descriptor, can pin its own
//! triggering mode, keeps the effective interest of each registration and
//! waits into its own buffer.
//!
//! ```no_run
//! use readyset::{Instance, Timeout};
//! use nix::sys::epoll::EpollFlags;
//!
//! let (rx, tx) = nix::unistd::pipe()?;
//! let mut epoll = Instance::new(true)?;
//! # use std::os::fd::AsRawFd;
//! epoll.add(rx.as_raw_fd(), EpollFlags::EPOLLIN)?;
//! nix::unistd::write(&tx, b"hi")?;
//! for event in epoll.wait(Timeout::Millis(1000), 32)? {
//!     println!("{} is ready: {:?}", event.fd, event.events);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod buffd;
pub mod conf;
pub mod consts;
pub mod error;
mod instance;
pub mod logging;
mod mode;
mod registry;
mod signals;
pub mod utils;
mod wait;

pub use error::{Error, Op, Result};
pub use instance::Instance;
pub use mode::{set_triggering_mode, triggering_mode, TriggerMode};
pub use registry::{control, create_instance};
pub use signals::{block_signals, blocked_signals, catch_signals, set_blocked_signals, wait_mask};
pub use wait::{
    thread_buffer_capacity, wait, EventBuffer, ReadyEvent, Timeout, MAX_EVENTS_LIMIT,
};
