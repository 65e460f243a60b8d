//! The Serializable configuration data structures used for setup.
use std::{fs, io, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    consts::DEFAULT_MAX_EVENTS,
    error::Result,
    mode::{set_triggering_mode, TriggerMode},
    signals::set_blocked_signals,
    wait::Timeout,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_edge_triggered")]
    pub edge_triggered: bool,

    #[serde(default = "default_close_on_exec")]
    pub close_on_exec: bool,

    /// Signal numbers a wait may be woken by.
    #[serde(default)]
    pub blocked_signals: Vec<i32>,

    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// 0 polls, negative blocks until something is ready.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: i32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edge_triggered: default_edge_triggered(),
            close_on_exec: default_close_on_exec(),
            blocked_signals: Vec::new(),
            max_events: default_max_events(),
            timeout_ms: default_timeout_ms(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> io::Result<Self> {
        toml::from_str(text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Reads a TOML file, falling back to the defaults when it doesn't exist.
    pub fn load(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn mode(&self) -> TriggerMode {
        TriggerMode::from_edge(self.edge_triggered)
    }

    pub fn timeout(&self) -> Timeout {
        Timeout::from_millis(self.timeout_ms)
    }

    /// Pushes the triggering mode and the blocked-signal set into the
    /// process-wide store.
    pub fn apply(&self) -> Result<()> {
        set_blocked_signals(&self.blocked_signals)?;
        set_triggering_mode(self.edge_triggered);
        Ok(())
    }
}

fn default_edge_triggered() -> bool {
    true
}

fn default_close_on_exec() -> bool {
    true
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

fn default_timeout_ms() -> i32 {
    -1
}

fn default_log_level() -> String {
    String::from("warn")
}
