// Keyswap Event Handling - Event Router
// Classifies each physical event as consumed-and-translated or forwarded

use std::io;

use log::{debug, warn};

use super::source::{EventSource, SourcePoll};
use super::CancelToken;
use crate::debug::DebugLog;
use crate::output::EventSink;
use crate::remap::RuleTable;

/// Errors that terminate the routing loop
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("failed to read from input device: {0}")]
    Read(#[from] io::Error),
}

/// Router states. `Resync` is entered after the driver reports a buffer
/// overrun and lasts until the catch-up snapshot is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterState {
    Normal,
    Resync,
}

/// The event-routing loop for one device session.
///
/// Each incoming event is matched against the rule table: a hit is written to
/// the injection sink as the rule's target with the original value, a miss is
/// written verbatim to the forwarding sink. Resync events bypass the rule
/// table entirely; they are a catch-up snapshot, not discrete user actions.
pub struct EventRouter<'a, S: EventSource> {
    source: S,
    rules: &'a RuleTable,
    inject: &'a mut dyn EventSink,
    forward: Option<&'a mut dyn EventSink>,
    debug_log: Option<&'a mut DebugLog>,
    device_name: &'a str,
    state: RouterState,
}

impl<'a, S: EventSource> EventRouter<'a, S> {
    pub fn new(
        source: S,
        rules: &'a RuleTable,
        inject: &'a mut dyn EventSink,
        forward: Option<&'a mut dyn EventSink>,
        debug_log: Option<&'a mut DebugLog>,
        device_name: &'a str,
    ) -> Self {
        Self {
            source,
            rules,
            inject,
            forward,
            debug_log,
            device_name,
            state: RouterState::Normal,
        }
    }

    /// Run until cancelled or the stream becomes unreadable.
    ///
    /// Sink write failures are warnings; only read failures abort the loop.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<(), RouterError> {
        while !cancel.is_cancelled() {
            match self.state {
                RouterState::Normal => match self.source.poll()? {
                    SourcePoll::Event(ev) => self.route(ev),
                    SourcePoll::Dropped => {
                        debug!("'{}': buffer overrun, resynchronizing", self.device_name);
                        self.state = RouterState::Resync;
                    }
                    SourcePoll::Empty => {}
                },
                RouterState::Resync => match self.source.poll_resync()? {
                    SourcePoll::Event(ev) => {
                        self.capture(&ev);
                        self.forward_verbatim(&ev);
                    }
                    SourcePoll::Empty => self.state = RouterState::Normal,
                    SourcePoll::Dropped => {}
                },
            }
        }
        Ok(())
    }

    fn route(&mut self, ev: evdev::InputEvent) {
        self.capture(&ev);

        match self.rules.lookup(ev.event_type(), ev.code()) {
            Some(rule) => {
                // Consume the original; only the key's identity changes,
                // press/release/repeat semantics pass through in the value.
                let (target_type, target_code) = rule.target;
                if let Err(e) = self.inject.write_event(target_type, target_code, ev.value()) {
                    warn!("'{}': failed to inject event: {e}", self.device_name);
                }
            }
            None => self.forward_verbatim(&ev),
        }
    }

    fn forward_verbatim(&mut self, ev: &evdev::InputEvent) {
        if let Some(forward) = self.forward.as_mut() {
            if let Err(e) = forward.write_event(ev.event_type(), ev.code(), ev.value()) {
                warn!("'{}': failed to forward event: {e}", self.device_name);
            }
        }
        // No forwarding device: degraded mode, the event is dropped.
    }

    fn capture(&mut self, ev: &evdev::InputEvent) {
        if let Some(log) = self.debug_log.as_mut() {
            log.log_event(ev, self.device_name);
        }
    }
}
