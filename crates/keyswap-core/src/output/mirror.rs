// Keyswap Output Layer - Virtual Device Mirror
// Derives the injection and forwarding devices from one physical device

use std::io;

use evdev::raw_stream::RawDevice;
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, Key, RelativeAxisType, UinputAbsSetup};
use log::{info, warn};

use crate::remap::RuleTable;

pub const INJECT_DEVICE_NAME: &str = "keyswap-keyboard";
pub const FORWARD_DEVICE_NAME: &str = "keyswap-forward";

/// Errors from virtual device creation
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("failed to create injection device: {0}")]
    InjectCreation(#[source] io::Error),
}

/// One absolute axis with its range metadata, as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsAxisSpec {
    pub code: u16,
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

/// Capability set read off the physical device.
#[derive(Debug, Clone, Default)]
pub struct SourceCapabilities {
    pub keys: Vec<u16>,
    pub rel_axes: Vec<u16>,
    pub abs_axes: Vec<AbsAxisSpec>,
}

/// What each synthetic device must advertise.
///
/// Pure set math over the capability set and the rule table; actual uinput
/// creation happens in `create_mirror`.
#[derive(Debug, Clone, Default)]
pub struct MirrorPlan {
    pub inject_keys: Vec<u16>,
    pub forward_keys: Vec<u16>,
    pub forward_rel: Vec<u16>,
    pub forward_abs: Vec<AbsAxisSpec>,
}

impl MirrorPlan {
    /// Injection device advertises exactly the key-event rule targets; the
    /// forwarding device advertises every original capability except the
    /// key-event rule sources, so remapped buttons are invisible on it.
    pub fn build(caps: &SourceCapabilities, rules: &RuleTable) -> Self {
        let mut inject_keys = rules.target_key_codes();
        inject_keys.sort_unstable();
        inject_keys.dedup();

        let sources = rules.source_key_codes();
        let forward_keys = caps
            .keys
            .iter()
            .copied()
            .filter(|code| !sources.contains(code))
            .collect();

        Self {
            inject_keys,
            forward_keys,
            forward_rel: caps.rel_axes.clone(),
            forward_abs: caps.abs_axes.clone(),
        }
    }
}

/// Read the full capability set from an open physical device.
pub fn capabilities_of(device: &RawDevice) -> io::Result<SourceCapabilities> {
    let keys = device
        .supported_keys()
        .map(|set| set.iter().map(|k| k.code()).collect())
        .unwrap_or_default();

    let rel_axes = device
        .supported_relative_axes()
        .map(|set| set.iter().map(|axis| axis.0).collect())
        .unwrap_or_default();

    let mut abs_axes = Vec::new();
    if let Some(axes) = device.supported_absolute_axes() {
        let states = device.get_abs_state()?;
        for axis in axes.iter() {
            let state = states[axis.0 as usize];
            abs_axes.push(AbsAxisSpec {
                code: axis.0,
                value: state.value,
                minimum: state.minimum,
                maximum: state.maximum,
                fuzz: state.fuzz,
                flat: state.flat,
                resolution: state.resolution,
            });
        }
    }

    Ok(SourceCapabilities {
        keys,
        rel_axes,
        abs_axes,
    })
}

/// The two synthetic devices derived from one physical device.
pub struct MirrorDevices {
    pub inject: VirtualDevice,
    /// Absent when forwarding-device creation failed; the session then runs
    /// degraded and non-remapped events are dropped.
    pub forward: Option<VirtualDevice>,
}

fn build_inject(plan: &MirrorPlan) -> io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();
    for code in &plan.inject_keys {
        keys.insert(Key::new(*code));
    }

    VirtualDeviceBuilder::new()?
        .name(INJECT_DEVICE_NAME)
        .with_keys(&keys)?
        .build()
}

fn build_forward(plan: &MirrorPlan) -> io::Result<VirtualDevice> {
    let mut builder = VirtualDeviceBuilder::new()?.name(FORWARD_DEVICE_NAME);

    if !plan.forward_keys.is_empty() {
        let mut keys = AttributeSet::<Key>::new();
        for code in &plan.forward_keys {
            keys.insert(Key::new(*code));
        }
        builder = builder.with_keys(&keys)?;
    }

    if !plan.forward_rel.is_empty() {
        let mut axes = AttributeSet::<RelativeAxisType>::new();
        for code in &plan.forward_rel {
            axes.insert(RelativeAxisType(*code));
        }
        builder = builder.with_relative_axes(&axes)?;
    }

    for axis in &plan.forward_abs {
        let info = AbsInfo::new(
            axis.value,
            axis.minimum,
            axis.maximum,
            axis.fuzz,
            axis.flat,
            axis.resolution,
        );
        let setup = UinputAbsSetup::new(AbsoluteAxisType(axis.code), info);
        builder = builder.with_absolute_axis(&setup)?;
    }

    builder.build()
}

/// Create the virtual devices for a plan.
///
/// The injection device is the feature; failing to create it fails the
/// device's setup. The forwarding device is best effort: on failure the
/// session keeps running but non-remapped events are dropped.
pub fn create_mirror(plan: &MirrorPlan) -> Result<MirrorDevices, MirrorError> {
    let inject = build_inject(plan).map_err(MirrorError::InjectCreation)?;
    info!(
        "created injection device '{}' with {} key(s)",
        INJECT_DEVICE_NAME,
        plan.inject_keys.len()
    );

    let forward = match build_forward(plan) {
        Ok(device) => {
            info!("created forwarding device '{}'", FORWARD_DEVICE_NAME);
            Some(device)
        }
        Err(e) => {
            warn!("could not create forwarding device: {e}");
            warn!("events will not be forwarded; the device may not work normally");
            None
        }
    };

    Ok(MirrorDevices { inject, forward })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::RemapRule;
    use evdev::EventType;

    fn rule(source: u16, target: u16) -> RemapRule {
        RemapRule {
            source: (EventType::KEY, source),
            target: (EventType::KEY, target),
            source_name: source.to_string(),
            target_name: target.to_string(),
            description: None,
        }
    }

    fn mouse_caps() -> SourceCapabilities {
        SourceCapabilities {
            keys: vec![272, 273, 274, 275, 276],
            rel_axes: vec![0, 1, 8],
            abs_axes: vec![],
        }
    }

    #[test]
    fn test_inject_keys_are_exactly_rule_targets() {
        let rules: RuleTable = vec![rule(275, 158), rule(276, 159)].into_iter().collect();
        let plan = MirrorPlan::build(&mouse_caps(), &rules);

        assert_eq!(plan.inject_keys, vec![158, 159]);
    }

    #[test]
    fn test_forward_keys_exclude_rule_sources() {
        let rules: RuleTable = vec![rule(275, 158), rule(276, 159)].into_iter().collect();
        let plan = MirrorPlan::build(&mouse_caps(), &rules);

        assert_eq!(plan.forward_keys, vec![272, 273, 274]);
        assert_eq!(plan.forward_rel, vec![0, 1, 8]);
    }

    #[test]
    fn test_duplicate_targets_deduplicated() {
        let rules: RuleTable = vec![rule(275, 158), rule(276, 158)].into_iter().collect();
        let plan = MirrorPlan::build(&mouse_caps(), &rules);

        assert_eq!(plan.inject_keys, vec![158]);
        assert_eq!(plan.forward_keys, vec![272, 273, 274]);
    }

    #[test]
    fn test_empty_rule_table_forwards_everything() {
        let plan = MirrorPlan::build(&mouse_caps(), &RuleTable::new());

        assert!(plan.inject_keys.is_empty());
        assert_eq!(plan.forward_keys, mouse_caps().keys);
    }

    #[test]
    fn test_abs_axes_copied_with_ranges() {
        let caps = SourceCapabilities {
            keys: vec![330],
            rel_axes: vec![],
            abs_axes: vec![AbsAxisSpec {
                code: 0,
                value: 0,
                minimum: 0,
                maximum: 4095,
                fuzz: 4,
                flat: 0,
                resolution: 12,
            }],
        };
        let plan = MirrorPlan::build(&caps, &RuleTable::new());

        assert_eq!(plan.forward_abs, caps.abs_axes);
    }

    #[test]
    fn test_non_key_sources_do_not_shrink_forward_keys() {
        let mut rules = RuleTable::new();
        rules.push(RemapRule {
            source: (EventType::RELATIVE, 8),
            target: (EventType::RELATIVE, 6),
            source_name: "rel_wheel".into(),
            target_name: "rel_hwheel".into(),
            description: None,
        });
        let plan = MirrorPlan::build(&mouse_caps(), &rules);

        assert_eq!(plan.forward_keys, mouse_caps().keys);
        assert!(plan.inject_keys.is_empty());
    }
}
