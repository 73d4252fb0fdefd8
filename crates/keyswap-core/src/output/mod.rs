// Keyswap Output Layer
// Virtual device planning, uinput creation, and event emission

mod mirror;
mod sink;

pub use mirror::{
    capabilities_of, create_mirror, AbsAxisSpec, MirrorDevices, MirrorError, MirrorPlan,
    SourceCapabilities, FORWARD_DEVICE_NAME, INJECT_DEVICE_NAME,
};
pub use sink::EventSink;
