// Keyswap Debug Capture
// Plain-text log of every event read from a grabbed device

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use evdev::{EventType, InputEvent};

use crate::key::canonical_name;

/// Human-readable name for an event type, `UNKNOWN` for anything
/// outside the kernel's standard set.
pub fn event_type_name(event_type: EventType) -> &'static str {
    match event_type {
        EventType::SYNCHRONIZATION => "EV_SYN",
        EventType::KEY => "EV_KEY",
        EventType::RELATIVE => "EV_REL",
        EventType::ABSOLUTE => "EV_ABS",
        EventType::MISC => "EV_MSC",
        EventType::SWITCH => "EV_SW",
        EventType::LED => "EV_LED",
        EventType::SOUND => "EV_SND",
        EventType::REPEAT => "EV_REP",
        EventType::FORCEFEEDBACK => "EV_FF",
        EventType::POWER => "EV_PWR",
        EventType::FORCEFEEDBACKSTATUS => "EV_FF_STATUS",
        _ => "UNKNOWN",
    }
}

fn format_event(event: &InputEvent, device_name: &str, timestamp: f64) -> String {
    let event_type = event.event_type();
    let type_name = event_type_name(event_type);

    let code = if event_type == EventType::KEY {
        match canonical_name(event_type, event.code()) {
            Some(name) => format!("{}({})", name, event.code()),
            None => event.code().to_string(),
        }
    } else {
        event.code().to_string()
    };

    format!(
        "[{timestamp:.6}] {device_name}: type={type_name}({}) code={code} value={}",
        event_type.0,
        event.value()
    )
}

/// Append-per-event capture file. Best effort: a capture that cannot be
/// written must never interfere with event routing, so write and flush
/// failures are swallowed.
pub struct DebugLog {
    file: File,
}

impl DebugLog {
    /// Open the capture file, truncating any previous run's contents.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    pub fn log_event(&mut self, event: &InputEvent, device_name: &str) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let line = format_event(event, device_name, timestamp);
        let _ = writeln!(self.file, "{line}");
        let _ = self.file.flush();
    }
}
