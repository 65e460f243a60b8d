//! The integer-handle API as a host binding sees it. Nothing here changes the
//! process-wide triggering mode, so registrations are edge-triggered.
use nix::unistd::{close, pipe, write};
use readyset::consts::{CTL_ADD, CTL_DEL, CTL_MOD, READABLE, WRITABLE};
use readyset::{control, create_instance, thread_buffer_capacity, wait, Error, Op, Timeout};
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

#[test]
fn readable_pipe_is_reported_promptly() {
    let handle = create_instance(false).unwrap();
    let (rx, tx) = pipe().unwrap();
    let x = rx.as_raw_fd();

    assert!(control(handle, CTL_ADD, x, Some(READABLE)).unwrap());
    write(&tx, b"data").unwrap();

    let start = Instant::now();
    let events = wait(handle, Timeout::Millis(1000), 32).unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(events, vec![(x, READABLE)]);

    close(handle).unwrap();
}

#[test]
fn immediate_wait_on_idle_instance() {
    let handle = create_instance(true).unwrap();
    let start = Instant::now();
    assert!(wait(handle, Timeout::Immediate, 32).unwrap().is_empty());
    assert!(start.elapsed() < Duration::from_millis(100));
    close(handle).unwrap();
}

#[test]
fn delete_ignores_mask_and_stops_reports() {
    let handle = create_instance(true).unwrap();
    let (rx, tx) = pipe().unwrap();
    let x = rx.as_raw_fd();

    control(handle, CTL_ADD, x, Some(READABLE)).unwrap();
    assert!(control(handle, CTL_DEL, x, Some(READABLE | WRITABLE)).unwrap());

    write(&tx, b"late").unwrap();
    assert!(wait(handle, Timeout::Millis(20), 32).unwrap().is_empty());

    // gone entirely, so modifying it fails
    let err = control(handle, CTL_MOD, x, Some(READABLE)).unwrap_err();
    assert_eq!(err.op(), Op::Control);
    assert_eq!(err.errno(), Some(nix::errno::Errno::ENOENT));
    close(handle).unwrap();
}

#[test]
fn batches_and_thread_buffer_growth() {
    let handle = create_instance(true).unwrap();
    let pipes: Vec<_> = (0..40).map(|_| pipe().unwrap()).collect();
    for (rx, tx) in &pipes {
        control(handle, CTL_ADD, rx.as_raw_fd(), Some(READABLE)).unwrap();
        write(tx, b"!").unwrap();
    }

    let mut seen = Vec::new();
    let mut last_capacity = thread_buffer_capacity();
    for max_events in [5, 10, 48] {
        let batch = wait(handle, Timeout::Immediate, max_events).unwrap();
        assert!(batch.iter().all(|&(_, events)| events & READABLE != 0));
        seen.extend(batch.iter().map(|&(fd, _)| fd));

        let capacity = thread_buffer_capacity();
        assert!(capacity >= last_capacity);
        assert!(capacity >= max_events);
        last_capacity = capacity;
    }
    assert_eq!(seen.len(), 40);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 40);

    // a smaller batch afterwards doesn't shrink anything
    assert!(wait(handle, Timeout::Immediate, 2).unwrap().is_empty());
    assert_eq!(thread_buffer_capacity(), last_capacity);
    close(handle).unwrap();
}

#[test]
fn batch_size_is_respected() {
    let handle = create_instance(true).unwrap();
    let pipes: Vec<_> = (0..6).map(|_| pipe().unwrap()).collect();
    for (rx, tx) in &pipes {
        control(handle, CTL_ADD, rx.as_raw_fd(), Some(READABLE)).unwrap();
        write(tx, b"!").unwrap();
    }

    assert_eq!(wait(handle, Timeout::Immediate, 4).unwrap().len(), 4);
    assert_eq!(wait(handle, Timeout::Immediate, 4).unwrap().len(), 2);
    assert!(wait(handle, Timeout::Immediate, 4).unwrap().is_empty());
    close(handle).unwrap();
}

#[test]
fn not_an_instance_fails() {
    let (rx, _tx) = pipe().unwrap();
    let err = wait(rx.as_raw_fd(), Timeout::Immediate, 32).unwrap_err();
    assert_eq!(
        err,
        Error::System {
            op: Op::Wait,
            errno: nix::errno::Errno::EINVAL
        }
    );
}

#[test]
fn unknown_interest_bits_are_rejected() {
    let handle = create_instance(true).unwrap();
    let (rx, _tx) = pipe().unwrap();
    let err = control(handle, CTL_ADD, rx.as_raw_fd(), Some(1 << 20)).unwrap_err();
    assert!(matches!(err, Error::Argument { op: Op::Control, .. }));
    close(handle).unwrap();
}
