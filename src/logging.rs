//! A `log` backend for the binary: records go to stderr or are appended to a
//! file. The library itself only emits through the `log` facade.
use log::{LevelFilter, Log, Metadata, Record};
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

enum Sink {
    StdErr,
    File(File),
}

pub struct Logger {
    level: LevelFilter,
    sink: Mutex<Sink>,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            sink: Mutex::new(Sink::StdErr),
        }
    }

    pub fn to_file<P>(level: LevelFilter, path: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                eprintln!("Failed to open log file: {}", e);
                e
            })?;

        Ok(Self {
            level,
            sink: Mutex::new(Sink::File(file)),
        })
    }

    /// Installs the logger for the rest of the process.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{:<5} {}] {}\n", record.level(), record.target(), record.args());
        let mut sink = self.sink.lock().unwrap_or_else(|p| p.into_inner());
        // nowhere left to report a failed log write
        let _ = match &mut *sink {
            Sink::StdErr => io::stderr().lock().write_all(line.as_bytes()),
            Sink::File(file) => file.write_all(line.as_bytes()),
        };
    }

    fn flush(&self) {
        let mut sink = self.sink.lock().unwrap_or_else(|p| p.into_inner());
        let _ = match &mut *sink {
            Sink::StdErr => io::stderr().flush(),
            Sink::File(file) => file.flush(),
        };
    }
}

/// Parses a level name, defaulting to `warn` on anything unknown.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}
