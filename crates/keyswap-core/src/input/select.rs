// Keyswap Input Layer - Device Selection
// Enumerates /dev/input/event* and resolves configured identities to paths

use std::path::PathBuf;

use evdev::{Device, EventType};

use super::identity::{CapabilityFlags, DeviceIdentity};

/// Errors from device selection
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("no device matches identifier '{identifier}' or name '{name_match}'")]
    NotFound {
        identifier: String,
        name_match: String,
    },

    #[error("device matching requires an identifier or a name pattern")]
    EmptyCriteria,
}

/// One row of the remap-candidate listing.
#[derive(Debug, Clone)]
pub struct DeviceListing {
    pub name: String,
    pub path: PathBuf,
    pub identifier: Option<String>,
}

/// Read the identity facts off an open device.
pub fn identity_of(device: &Device) -> DeviceIdentity {
    let id = device.input_id();
    DeviceIdentity {
        name: device.name().unwrap_or("").to_string(),
        phys: device.physical_path().map(str::to_string),
        uniq: device.unique_name().map(str::to_string),
        vendor: id.vendor(),
        product: id.product(),
    }
}

fn capability_flags(device: &Device) -> CapabilityFlags {
    let events = device.supported_events();
    CapabilityFlags {
        has_key: events.contains(EventType::KEY),
        has_rel: events.contains(EventType::RELATIVE),
        has_abs: events.contains(EventType::ABSOLUTE),
    }
}

/// Find the first device matching the identifier (priority) or name pattern.
///
/// Devices that fail to open are skipped silently; unreadable nodes are an
/// expected condition when not running as root. Enumeration order decides
/// ties between multiple matching devices.
pub fn find_device(identifier: &str, name_match: &str) -> Result<PathBuf, SelectError> {
    if identifier.is_empty() && name_match.is_empty() {
        return Err(SelectError::EmptyCriteria);
    }

    for (path, device) in evdev::enumerate() {
        if identity_of(&device).matches(identifier, name_match) {
            return Ok(path);
        }
    }

    Err(SelectError::NotFound {
        identifier: identifier.to_string(),
        name_match: name_match.to_string(),
    })
}

/// Count every device the two-tier match accepts.
///
/// More than one match for a configured entry means the configuration is
/// ambiguous; callers decide whether that deserves a warning.
pub fn count_matches(identifier: &str, name_match: &str) -> Result<usize, SelectError> {
    if identifier.is_empty() && name_match.is_empty() {
        return Err(SelectError::EmptyCriteria);
    }

    let count = evdev::enumerate()
        .filter(|(_, device)| identity_of(device).matches(identifier, name_match))
        .count();

    Ok(count)
}

/// All devices worth offering as remap candidates, sorted for display.
///
/// Sort order is (name, identifier); within one name group, devices that
/// report no identifier come last.
pub fn enumerate_devices() -> Vec<DeviceListing> {
    let mut listings: Vec<DeviceListing> = evdev::enumerate()
        .filter_map(|(path, device)| {
            let identity = identity_of(&device);
            if identity.name.is_empty() || !identity.is_listable(capability_flags(&device)) {
                return None;
            }
            Some(DeviceListing {
                identifier: identity.list_identifier(),
                name: identity.name,
                path,
            })
        })
        .collect();

    listings.sort_by(|a, b| {
        a.name.cmp(&b.name).then_with(|| match (&a.identifier, &b.identifier) {
            (Some(ia), Some(ib)) => ia.cmp(ib),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });

    listings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_criteria_rejected() {
        assert!(matches!(find_device("", ""), Err(SelectError::EmptyCriteria)));
        assert!(matches!(count_matches("", ""), Err(SelectError::EmptyCriteria)));
    }

    #[test]
    fn test_enumerate_devices_sorted() {
        // Enumeration needs readable /dev/input nodes; just assert the
        // invariants on whatever this environment exposes.
        let listings = enumerate_devices();
        for pair in listings.windows(2) {
            assert!(pair[0].name <= pair[1].name);
            if pair[0].name == pair[1].name && pair[0].identifier.is_none() {
                assert!(pair[1].identifier.is_none());
            }
        }
    }
}
