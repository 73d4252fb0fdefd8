// Keyswap Input Layer
// Device identity matching and physical device selection

mod identity;
mod select;

pub use identity::{contains_ignore_case, CapabilityFlags, DeviceIdentity};
pub use select::{
    count_matches, enumerate_devices, find_device, DeviceListing, SelectError,
};
