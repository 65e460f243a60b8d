//! The set of signals a wait may be woken by.
//!
//! Callers normally keep these signals blocked in their threads, so a signal
//! arriving between "check for pending work" and "go to sleep" stays pending
//! instead of being handled and forgotten. The wait then installs a mask with
//! exactly these signals removed, atomically with going to sleep (that is what
//! `epoll_pwait` is for), and the kernel restores the caller's mask on return.
//! A pending signal therefore interrupts the wait right away.
use nix::libc;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use std::sync::Mutex;

use crate::error::{Error, Op, Result};

static BLOCKED_SIGNALS: Mutex<Option<SigSet>> = Mutex::new(None);

fn parse_signals(signals: &[i32]) -> Result<SigSet> {
    let mut set = SigSet::empty();
    for &signo in signals {
        let signal = Signal::try_from(signo)
            .map_err(|_| Error::argument(Op::Signals, format!("{signo} is not a signal number")))?;
        set.add(signal);
    }
    Ok(set)
}

/// Replaces the stored set wholesale. An empty slice clears it. On an invalid
/// signal number the stored set is left untouched.
pub fn set_blocked_signals(signals: &[i32]) -> Result<()> {
    let set = parse_signals(signals)?;
    log::debug!("blocked signal set replaced with {signals:?}");
    *BLOCKED_SIGNALS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(set);
    Ok(())
}

pub fn blocked_signals() -> SigSet {
    let stored = BLOCKED_SIGNALS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    (*stored).unwrap_or_else(SigSet::empty)
}

/// The mask to hold while sleeping: the calling thread's current mask minus
/// the stored set.
pub fn wait_mask() -> Result<SigSet> {
    let mut mask = SigSet::thread_get_mask().map_err(|e| Error::from_errno(Op::Signals, e))?;
    for signal in blocked_signals().iter() {
        mask.remove(signal);
    }
    Ok(mask)
}

extern "C" fn wake_only(_: libc::c_int) {}

/// Installs a handler that does nothing for each of `signals`, so their
/// delivery during a wait ends it with EINTR instead of running the default
/// action (which terminates the process for most signals).
pub fn catch_signals(signals: &[i32]) -> Result<()> {
    let set = parse_signals(signals)?;
    let action = SigAction::new(
        SigHandler::Handler(wake_only),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in set.iter() {
        unsafe { sigaction(signal, &action) }.map_err(|e| Error::from_errno(Op::Signals, e))?;
    }
    Ok(())
}

/// Blocks `signals` in the calling thread and returns the previous mask.
pub fn block_signals(signals: &[i32]) -> Result<SigSet> {
    let set = parse_signals(signals)?;
    let mut old = SigSet::empty();
    nix::sys::signal::pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut old))
        .map_err(|e| Error::from_errno(Op::Signals, e))?;
    Ok(old)
}
