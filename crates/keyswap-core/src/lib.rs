// Keyswap Core Library
// Device matching, key symbol resolution, and the event remap engine

pub mod config;
pub mod debug;
pub mod event;
pub mod input;
pub mod key;
pub mod output;
pub mod remap;
pub mod session;

pub use config::{Config, ConfigError, DeviceConfig, DEFAULT_CONFIG_PATH};
pub use debug::{event_type_name, DebugLog};
pub use event::{CancelToken, EvdevSource, EventRouter, EventSource, RouterError, SourcePoll};
pub use input::{
    count_matches, enumerate_devices, find_device, DeviceIdentity, DeviceListing, SelectError,
};
pub use key::{canonical_name, resolve_key_name};
pub use output::{
    create_mirror, EventSink, MirrorDevices, MirrorError, MirrorPlan, SourceCapabilities,
};
pub use remap::{RemapRule, RuleTable};
pub use session::{DeviceSession, SessionError};

// Re-export so the binary shares the exact evdev types used here.
pub use evdev;
