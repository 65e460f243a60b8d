//! Process-wide triggering mode.
//!
//! Every ADD and MODIFY reads the mode at call time, so flipping it only
//! affects registrations made afterwards.
use nix::sys::epoll::EpollFlags;
use std::sync::atomic::{AtomicBool, Ordering};

static EDGE_TRIGGERED: AtomicBool = AtomicBool::new(true);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    #[default]
    Edge,
    Level,
}

impl TriggerMode {
    pub fn from_edge(edge_triggered: bool) -> Self {
        if edge_triggered {
            Self::Edge
        } else {
            Self::Level
        }
    }

    /// The interest the kernel will actually see for `requested`.
    pub fn effective(self, requested: EpollFlags) -> EpollFlags {
        match self {
            Self::Edge => requested | EpollFlags::EPOLLET,
            Self::Level => requested,
        }
    }
}

pub fn set_triggering_mode(edge_triggered: bool) {
    EDGE_TRIGGERED.store(edge_triggered, Ordering::SeqCst);
}

pub fn triggering_mode() -> TriggerMode {
    TriggerMode::from_edge(EDGE_TRIGGERED.load(Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_adds_et_bit() {
        let requested = EpollFlags::EPOLLIN;
        assert_eq!(
            TriggerMode::Edge.effective(requested),
            EpollFlags::EPOLLIN | EpollFlags::EPOLLET
        );
        assert_eq!(TriggerMode::Level.effective(requested), requested);
        // already edge-triggered stays as is
        let both = EpollFlags::EPOLLOUT | EpollFlags::EPOLLET;
        assert_eq!(TriggerMode::Edge.effective(both), both);
    }

    #[test]
    fn from_edge() {
        assert_eq!(TriggerMode::from_edge(true), TriggerMode::Edge);
        assert_eq!(TriggerMode::from_edge(false), TriggerMode::Level);
        assert_eq!(TriggerMode::default(), TriggerMode::Edge);
    }
}
