//! Watches a set of readable descriptors and reports every readiness event as
//! a JSON line until they have all hung up.
use std::{
    collections::HashMap,
    io::{self, Write},
    os::fd::RawFd,
};

use nix::sys::epoll::EpollFlags;
use readyset::{
    buffd::{BufFd, Drained},
    Instance, ReadyEvent, Timeout,
};
use serde::Serialize;

pub struct Source {
    pub name: String,
    pub buf_fd: BufFd,
}

#[derive(Serialize, Debug)]
struct Report<'a> {
    fd: RawFd,
    source: &'a str,
    events: u32,
    readable: bool,
    writable: bool,
    hangup: bool,
    bytes: usize,
}

pub fn register(instance: &mut Instance, sources: &mut HashMap<RawFd, Source>, source: Source) {
    let fd = source.buf_fd.as_raw_fd();
    match instance.add(fd, EpollFlags::EPOLLIN) {
        Ok(effective) => {
            log::info!("watching {} (fd {fd}, interest {effective:?})", source.name);
            sources.insert(fd, source);
        }
        Err(e) => log::error!("can't watch {}: {e}", source.name),
    }
}

fn handle_event<W>(
    event: &ReadyEvent,
    instance: &mut Instance,
    sources: &mut HashMap<RawFd, Source>,
    out: &mut W,
) -> io::Result<()>
where
    W: Write,
{
    let Some(source) = sources.get_mut(&event.fd) else {
        log::warn!("event for fd {} which isn't being watched", event.fd);
        return Ok(());
    };

    let mut bytes = 0;
    let mut done = event.is_hangup() && !event.is_readable();
    if event.is_readable() {
        // edge-triggered: read everything now, there won't be another event
        if source.buf_fd.drain(|chunk| bytes += chunk.len())? == Drained::Eof {
            done = true;
        }
    }

    let report = Report {
        fd: event.fd,
        source: &source.name,
        events: event.as_pair().1,
        readable: event.is_readable(),
        writable: event.is_writable(),
        hangup: event.is_hangup(),
        bytes,
    };
    serde_json::to_writer(&mut *out, &report)?;
    out.write_all(b"\n")?;

    if done {
        log::info!("{} is done", source.name);
        instance.delete(event.fd)?;
        sources.remove(&event.fd);
    }
    Ok(())
}

pub fn run<W>(
    instance: &mut Instance,
    sources: &mut HashMap<RawFd, Source>,
    timeout: Timeout,
    max_events: usize,
    out: &mut W,
) -> io::Result<()>
where
    W: Write,
{
    while !instance.is_empty() {
        let events = match instance.wait(timeout, max_events) {
            Ok(events) => events,
            Err(e) if e.is_interrupted() => {
                log::info!("{e}; waiting again");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if events.is_empty() && timeout != Timeout::Forever {
            log::info!("nothing ready within {timeout:?}, stopping");
            break;
        }

        for event in &events {
            handle_event(event, instance, sources, out)?;
        }
        out.flush()?;
    }
    Ok(())
}
