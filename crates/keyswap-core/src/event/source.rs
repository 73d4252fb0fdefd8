// Keyswap Event Handling - Event Source
// Abstraction over the physical device's event stream

use std::collections::VecDeque;
use std::io;
use std::os::unix::io::AsRawFd;

use evdev::raw_stream::RawDevice;
use evdev::{EventType, InputEvent};
use log::warn;

/// SYN_DROPPED: the kernel ring buffer overran and events were lost.
const SYN_DROPPED: u16 = 3;

/// Outcome of one poll of the event stream.
#[derive(Debug, Clone, Copy)]
pub enum SourcePoll {
    /// A single event was read.
    Event(InputEvent),
    /// The driver dropped events; the caller must drain the resync snapshot.
    Dropped,
    /// Nothing available right now; loop again.
    Empty,
}

/// A stream of input events with explicit overrun signaling.
///
/// `poll` drives the normal-read state; after it reports `Dropped`,
/// `poll_resync` hands out the catch-up snapshot one event at a time until it
/// reports `Empty`. Routers are written against this trait so tests can feed
/// scripted streams.
pub trait EventSource {
    fn poll(&mut self) -> io::Result<SourcePoll>;
    fn poll_resync(&mut self) -> io::Result<SourcePoll>;
}

impl<T: EventSource + ?Sized> EventSource for &mut T {
    fn poll(&mut self) -> io::Result<SourcePoll> {
        (**self).poll()
    }

    fn poll_resync(&mut self) -> io::Result<SourcePoll> {
        (**self).poll_resync()
    }
}

/// Event source backed by an open evdev device.
///
/// Reads the raw event stream rather than the synced wrapper: the synced
/// stream consumes `SYN_DROPPED` blocks internally and replays compensation
/// events as ordinary ones, which would make overruns invisible here. The
/// raw stream delivers the drop marker verbatim so routing can switch to
/// its forward-only drain.
///
/// Waits for readiness with poll(2) so cancellation is observed within the
/// timeout; a poll timeout or EINTR is `Empty`, never an error.
pub struct EvdevSource {
    device: RawDevice,
    name: String,
    queue: VecDeque<InputEvent>,
    grabbed: bool,
}

const POLL_TIMEOUT_MS: i32 = 100;

impl EvdevSource {
    pub fn new(device: RawDevice) -> Self {
        let name = device.name().unwrap_or("unknown").to_string();
        Self {
            device,
            name,
            queue: VecDeque::new(),
            grabbed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grab the device exclusively. Failure is reported to the caller, who
    /// treats it as a warning; remapping works either way but other readers
    /// keep seeing the raw stream.
    pub fn grab(&mut self) -> io::Result<()> {
        // A previous crashed instance may have left the device grabbed.
        let _ = self.device.ungrab();
        self.device.grab()?;
        self.grabbed = true;
        Ok(())
    }

    pub fn ungrab(&mut self) {
        if self.grabbed {
            if let Err(e) = self.device.ungrab() {
                warn!("failed to release grab on '{}': {e}", self.name);
            }
            self.grabbed = false;
        }
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    pub fn device(&self) -> &RawDevice {
        &self.device
    }

    fn wait_readable(&mut self) -> io::Result<bool> {
        let mut fds = [libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];

        let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, POLL_TIMEOUT_MS) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            // EINTR means a signal arrived; the caller re-checks its
            // cancellation token and loops.
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(false);
            }
            return Err(err);
        }

        Ok(rc > 0 && fds[0].revents & libc::POLLIN != 0)
    }

    fn fill_queue(&mut self) -> io::Result<()> {
        match self.device.fetch_events() {
            Ok(events) => {
                self.queue.extend(events);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Classify one dequeued event: the SYN_DROPPED marker becomes `Dropped`,
/// everything else (SYN_REPORT included) passes through as an event.
fn classify(ev: Option<InputEvent>) -> SourcePoll {
    match ev {
        Some(ev) if ev.event_type() == EventType::SYNCHRONIZATION && ev.code() == SYN_DROPPED => {
            SourcePoll::Dropped
        }
        Some(ev) => SourcePoll::Event(ev),
        None => SourcePoll::Empty,
    }
}

impl EventSource for EvdevSource {
    fn poll(&mut self) -> io::Result<SourcePoll> {
        if self.queue.is_empty() {
            if !self.wait_readable()? {
                return Ok(SourcePoll::Empty);
            }
            self.fill_queue()?;
        }

        Ok(classify(self.queue.pop_front()))
    }

    fn poll_resync(&mut self) -> io::Result<SourcePoll> {
        // The compensation events follow the drop marker in the same batch;
        // once the queue is drained the device is back in sync.
        match self.queue.pop_front() {
            Some(ev) => Ok(SourcePoll::Event(ev)),
            None => Ok(SourcePoll::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syn_dropped_marker_classified_as_dropped() {
        let marker = InputEvent::new(EventType::SYNCHRONIZATION, SYN_DROPPED, 0);
        assert!(matches!(classify(Some(marker)), SourcePoll::Dropped));
    }

    #[test]
    fn test_syn_report_is_an_ordinary_event() {
        // Only the drop marker is special; SYN_REPORT flows through.
        let report = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        match classify(Some(report)) {
            SourcePoll::Event(ev) => {
                assert_eq!(ev.event_type(), EventType::SYNCHRONIZATION);
                assert_eq!(ev.code(), 0);
            }
            other => panic!("expected an event, got {other:?}"),
        }
    }

    #[test]
    fn test_key_event_with_dropped_code_not_a_marker() {
        // Same code, different type must not trip the overrun path.
        let ev = InputEvent::new(EventType::KEY, SYN_DROPPED, 1);
        assert!(matches!(classify(Some(ev)), SourcePoll::Event(_)));
    }

    #[test]
    fn test_empty_queue_classifies_as_empty() {
        assert!(matches!(classify(None), SourcePoll::Empty));
    }
}
