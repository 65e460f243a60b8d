mod cli;
mod runner;

use crate::cli::Cli;
use crate::runner::{register, run, Source};
use clap::Parser;
use readyset::{
    block_signals,
    buffd::BufFd,
    catch_signals,
    conf::Config,
    logging::{parse_level, Logger},
    utils::open_nonblocking,
    Instance,
};
use std::collections::HashMap;
use std::io;
use std::os::fd::AsFd;

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(level) = cli.level {
        config.log_level = level;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_ms = timeout;
    }
    if let Some(max_events) = cli.max_events {
        config.max_events = max_events;
    }
    if cli.level_triggered {
        config.edge_triggered = false;
    }

    let level = parse_level(&config.log_level);
    let logger = match &config.log_file {
        Some(path) => Logger::to_file(level, path)?,
        None => Logger::new(level),
    };
    logger
        .install()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    log::debug!("{:#?}", config);

    config.apply()?;

    // A caught signal ends the wait with EINTR; the default action would
    // kill us instead. Outside of waits they stay pending, so each one wakes
    // the next wait instead of landing between two of them.
    catch_signals(&config.blocked_signals)?;
    block_signals(&config.blocked_signals)?;

    let mut instance = Instance::new(config.close_on_exec)?;
    let mut sources = HashMap::new();

    if cli.paths.is_empty() {
        let stdin = io::stdin().as_fd().try_clone_to_owned()?;
        let source = Source {
            name: String::from("<stdin>"),
            buf_fd: BufFd::new(stdin)?,
        };
        register(&mut instance, &mut sources, source);
    }
    for path in &cli.paths {
        match open_nonblocking(path).and_then(BufFd::new) {
            Ok(buf_fd) => {
                let source = Source {
                    name: path.display().to_string(),
                    buf_fd,
                };
                register(&mut instance, &mut sources, source);
            }
            Err(e) => log::error!("can't open {}: {e}", path.display()),
        }
    }

    let timeout = config.timeout();
    let stdout = io::stdout();
    run(
        &mut instance,
        &mut sources,
        timeout,
        config.max_events,
        &mut stdout.lock(),
    )?;

    Ok(())
}
