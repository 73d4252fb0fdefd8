// Keyswap Input Layer - Device Identity
// Pure matching predicates over a device's reported identity

/// Names our own virtual devices carry; the listing must never offer them
/// back as remap candidates.
pub const VIRT_DEVICE_PREFIX: &str = "keyswap-";

/// Identity facts reported by an input device.
#[derive(Debug, Clone, Default)]
pub struct DeviceIdentity {
    pub name: String,
    pub phys: Option<String>,
    pub uniq: Option<String>,
    pub vendor: u16,
    pub product: u16,
}

/// Event-type capabilities relevant to remapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityFlags {
    pub has_key: bool,
    pub has_rel: bool,
    pub has_abs: bool,
}

/// Case-insensitive substring search, ASCII.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    haystack.contains(&needle)
}

impl DeviceIdentity {
    /// `vendor:product` as a lowercase hex pair, when both ids are nonzero.
    pub fn vendor_product(&self) -> Option<String> {
        if self.vendor > 0 && self.product > 0 {
            Some(format!("{:04x}:{:04x}", self.vendor, self.product))
        } else {
            None
        }
    }

    /// Identifier shown in listings: vendor:product, else the unique string.
    pub fn list_identifier(&self) -> Option<String> {
        self.vendor_product()
            .or_else(|| self.uniq.as_ref().filter(|u| !u.is_empty()).cloned())
    }

    /// Exact match against the vendor:product pair or the unique string.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }
        if self
            .vendor_product()
            .is_some_and(|vp| vp == identifier)
        {
            return true;
        }
        self.uniq
            .as_ref()
            .is_some_and(|uniq| !uniq.is_empty() && uniq == identifier)
    }

    /// Case-insensitive substring match against the reported name.
    pub fn matches_name(&self, pattern: &str) -> bool {
        !pattern.is_empty() && contains_ignore_case(&self.name, pattern)
    }

    /// Two-tier match: identifier takes priority, name pattern is the
    /// fallback. Both empty never matches.
    pub fn matches(&self, identifier: &str, name_match: &str) -> bool {
        if self.matches_identifier(identifier) {
            return true;
        }
        self.matches_name(name_match)
    }

    /// Whether this device belongs in the remap-candidate listing.
    ///
    /// Filters out loopback virtual devices, audio/HDMI/ALSA controls, power
    /// buttons, PC speakers, and anything with no key/rel/abs capability.
    pub fn is_listable(&self, caps: CapabilityFlags) -> bool {
        let name = self.name.as_str();

        if name.contains("virtual") || name.contains("remap") {
            return false;
        }
        if name.starts_with(VIRT_DEVICE_PREFIX) {
            return false;
        }
        if name.contains("HD-Audio") || name.contains("HDA ATI HDMI") || name.contains("ALSA") {
            return false;
        }
        if self.phys.as_ref().is_some_and(|p| p.contains("ALSA")) {
            return false;
        }
        if name.contains("Power Button") || name.contains("PC Speaker") {
            return false;
        }

        caps.has_key || caps.has_rel || caps.has_abs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse() -> DeviceIdentity {
        DeviceIdentity {
            name: "Logitech G305".to_string(),
            phys: Some("usb-0000:00:14.0-2/input0".to_string()),
            uniq: None,
            vendor: 0x046d,
            product: 0xc08b,
        }
    }

    const KEY_ONLY: CapabilityFlags = CapabilityFlags {
        has_key: true,
        has_rel: false,
        has_abs: false,
    };

    #[test]
    fn test_vendor_product_formatting() {
        assert_eq!(mouse().vendor_product(), Some("046d:c08b".to_string()));

        let no_ids = DeviceIdentity {
            name: "membrane".to_string(),
            ..Default::default()
        };
        assert_eq!(no_ids.vendor_product(), None);
    }

    #[test]
    fn test_identifier_match_vendor_product() {
        assert!(mouse().matches_identifier("046d:c08b"));
        assert!(!mouse().matches_identifier("046d:c08c"));
        assert!(!mouse().matches_identifier(""));
    }

    #[test]
    fn test_identifier_match_uniq() {
        let device = DeviceIdentity {
            name: "BT Mouse".to_string(),
            uniq: Some("dc:2c:26:aa:bb:cc".to_string()),
            ..Default::default()
        };
        assert!(device.matches_identifier("dc:2c:26:aa:bb:cc"));
        assert!(!device.matches_identifier("dc:2c:26:aa:bb:cd"));
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        assert!(mouse().matches_name("g305"));
        assert!(mouse().matches_name("LOGITECH"));
        assert!(!mouse().matches_name("razer"));
        assert!(!mouse().matches_name(""));
    }

    #[test]
    fn test_identifier_takes_priority_over_name() {
        // Identifier matches even though the name pattern does not.
        assert!(mouse().matches("046d:c08b", "razer"));
        // Identifier miss falls back to the name pattern.
        assert!(mouse().matches("ffff:ffff", "g305"));
        assert!(!mouse().matches("ffff:ffff", "razer"));
        assert!(!mouse().matches("", ""));
    }

    #[test]
    fn test_listing_filters_virtual_and_own_devices() {
        for name in ["xremap virtual keyboard", "remap-forward", "keyswap-keyboard"] {
            let device = DeviceIdentity {
                name: name.to_string(),
                ..Default::default()
            };
            assert!(!device.is_listable(KEY_ONLY), "{name} should be filtered");
        }
    }

    #[test]
    fn test_listing_filters_audio_and_power() {
        for name in [
            "HD-Audio Generic Front Mic",
            "HDA ATI HDMI HDMI/DP,pcm=3",
            "Power Button",
            "PC Speaker",
        ] {
            let device = DeviceIdentity {
                name: name.to_string(),
                ..Default::default()
            };
            assert!(!device.is_listable(KEY_ONLY), "{name} should be filtered");
        }

        let alsa_phys = DeviceIdentity {
            name: "SomeCard".to_string(),
            phys: Some("ALSA".to_string()),
            ..Default::default()
        };
        assert!(!alsa_phys.is_listable(KEY_ONLY));
    }

    #[test]
    fn test_listing_requires_useful_capability() {
        let no_caps = CapabilityFlags::default();
        assert!(!mouse().is_listable(no_caps));
        assert!(mouse().is_listable(CapabilityFlags {
            has_rel: true,
            ..Default::default()
        }));
        assert!(mouse().is_listable(KEY_ONLY));
    }
}
