// Keyswap Output Layer - Event Sink
// One write = one event followed by a synchronization report

use std::io;

use evdev::{EventType, InputEvent};

/// Destination for routed events.
///
/// Every write carries its own SYN_REPORT so downstream consumers see each
/// routed event as a complete frame. Implemented by the uinput virtual
/// devices and by recording sinks in tests.
pub trait EventSink {
    fn write_event(&mut self, event_type: EventType, code: u16, value: i32) -> io::Result<()>;
}

impl EventSink for evdev::uinput::VirtualDevice {
    fn write_event(&mut self, event_type: EventType, code: u16, value: i32) -> io::Result<()> {
        let event = InputEvent::new(event_type, code, value);
        // The kernel ignores the frame until the SYN event arrives.
        let syn = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.emit(&[event, syn])
    }
}
