// Keyswap Configuration
// index.json loading, path expansion, and rule resolution

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use log::warn;
use regex::Regex;
use serde::Deserialize;

use crate::key::resolve_key_name;
use crate::remap::{RemapRule, RuleTable};

/// Default configuration file, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "index.json";

const DEFAULT_DEBUG_LOG: &str = "/tmp/keyswap-debug.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

// On-disk schema. Kept separate from the resolved `Config` so parsing
// stays declarative and all validation lives in the conversion.

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    paths: PathsSection,
    config: ConfigSection,
}

#[derive(Debug, Default, Deserialize)]
struct PathsSection {
    debug_log: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigSection {
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    name_match: Option<String>,
    #[serde(default)]
    remaps: Vec<RemapEntry>,
}

#[derive(Debug, Deserialize)]
struct RemapEntry {
    source: KeyRef,
    target: KeyRef,
    #[serde(default)]
    description: Option<String>,
}

/// A key reference in the file: either a symbolic name or a raw code.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyRef {
    Name(String),
    Code(i64),
}

impl KeyRef {
    fn resolve(&self) -> Option<(evdev::EventType, u16, String)> {
        match self {
            KeyRef::Name(name) => {
                resolve_key_name(name).map(|(ty, code)| (ty, code, name.clone()))
            }
            KeyRef::Code(code) => {
                if (0..=i64::from(u16::MAX)).contains(code) {
                    Some((evdev::EventType::KEY, *code as u16, code.to_string()))
                } else {
                    None
                }
            }
        }
    }
}

/// A device block from the configuration, with its rules resolved.
#[derive(Debug)]
pub struct DeviceConfig {
    pub uuid: Option<String>,
    pub identifier: Option<String>,
    pub name_match: Option<String>,
    pub rules: RuleTable,
}

/// The resolved configuration for one run.
#[derive(Debug)]
pub struct Config {
    pub debug: bool,
    pub debug_log: String,
    pub devices: Vec<DeviceConfig>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&raw)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ConfigFile) -> Self {
        let debug_log = expand_path(
            file.paths
                .debug_log
                .as_deref()
                .unwrap_or(DEFAULT_DEBUG_LOG),
        );

        let devices = file
            .config
            .devices
            .into_iter()
            .filter_map(resolve_device)
            .collect();

        Self {
            debug: file.config.debug,
            debug_log,
            devices,
        }
    }
}

fn resolve_device(entry: DeviceEntry) -> Option<DeviceConfig> {
    let identifier = entry.identifier.filter(|s| !s.is_empty());
    let name_match = entry.name_match.filter(|s| !s.is_empty());

    if identifier.is_none() && name_match.is_none() {
        warn!(
            "skipping device entry '{}': no identifier or name_match",
            entry.uuid.as_deref().unwrap_or("<unnamed>")
        );
        return None;
    }

    let mut rules = RuleTable::new();
    for remap in entry.remaps {
        match (remap.source.resolve(), remap.target.resolve()) {
            (Some((src_ty, src_code, src_name)), Some((tgt_ty, tgt_code, tgt_name))) => {
                rules.push(RemapRule {
                    source: (src_ty, src_code),
                    target: (tgt_ty, tgt_code),
                    source_name: src_name,
                    target_name: tgt_name,
                    description: remap.description,
                });
            }
            (source, target) => {
                let which = match (source.is_none(), target.is_none()) {
                    (true, true) => "source and target",
                    (true, false) => "source",
                    _ => "target",
                };
                warn!(
                    "dropping remap {:?} -> {:?}: unresolvable {which} key",
                    remap.source, remap.target
                );
            }
        }
    }

    Some(DeviceConfig {
        uuid: entry.uuid,
        identifier,
        name_match,
        rules,
    })
}

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Expand `${VAR}` and `${VAR:-default}` references against the
/// environment. An unset variable without a default expands to nothing,
/// shell-style.
pub fn expand_path(path: &str) -> String {
    var_pattern()
        .replace_all(path, |caps: &regex::Captures| {
            let inner = &caps[1];
            let (var, default) = match inner.split_once(":-") {
                Some((var, default)) => (var, Some(default)),
                None => (inner, None),
            };
            match std::env::var(var) {
                Ok(value) => value,
                Err(_) => default.unwrap_or_default().to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    fn parse(raw: &str) -> Config {
        let file: ConfigFile = serde_json::from_str(raw).unwrap();
        Config::from_file(file)
    }

    #[test]
    fn test_full_config_parses() {
        let config = parse(
            r#"{
                "paths": { "debug_log": "/var/log/keyswap.log" },
                "config": {
                    "debug": true,
                    "devices": [
                        {
                            "uuid": "g502",
                            "identifier": "046d:c08b",
                            "name_match": "Logitech",
                            "remaps": [
                                { "source": "back", "target": "KEY_BACK",
                                  "description": "side button as browser back" }
                            ]
                        }
                    ]
                }
            }"#,
        );

        assert!(config.debug);
        assert_eq!(config.debug_log, "/var/log/keyswap.log");
        assert_eq!(config.devices.len(), 1);

        let device = &config.devices[0];
        assert_eq!(device.identifier.as_deref(), Some("046d:c08b"));
        assert_eq!(device.rules.len(), 1);

        let rule = device.rules.iter().next().unwrap();
        assert_eq!(rule.source, (EventType::KEY, 275));
        assert_eq!(rule.target, (EventType::KEY, 158));
    }

    #[test]
    fn test_numeric_key_references() {
        let config = parse(
            r#"{
                "config": {
                    "devices": [
                        { "identifier": "x",
                          "remaps": [ { "source": 275, "target": 158 } ] }
                    ]
                }
            }"#,
        );

        let rule = config.devices[0].rules.iter().next().unwrap();
        assert_eq!(rule.source, (EventType::KEY, 275));
        assert_eq!(rule.target, (EventType::KEY, 158));
        assert_eq!(rule.source_name, "275");
    }

    #[test]
    fn test_unresolvable_rules_are_dropped() {
        let config = parse(
            r#"{
                "config": {
                    "devices": [
                        { "identifier": "x",
                          "remaps": [
                            { "source": "no_such_key", "target": "a" },
                            { "source": "b", "target": 99999 },
                            { "source": "no_such_key", "target": -5 },
                            { "source": "back", "target": "KEY_BACK" }
                          ] }
                    ]
                }
            }"#,
        );

        assert_eq!(config.devices[0].rules.len(), 1);
    }

    #[test]
    fn test_device_without_criteria_is_skipped() {
        let config = parse(
            r#"{
                "config": {
                    "devices": [
                        { "uuid": "empty", "identifier": "", "remaps": [] },
                        { "name_match": "Keyboard", "remaps": [] }
                    ]
                }
            }"#,
        );

        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].name_match.as_deref(), Some("Keyboard"));
    }

    #[test]
    fn test_debug_log_defaults() {
        let config = parse(r#"{ "config": { "devices": [] } }"#);
        assert!(!config.debug);
        assert_eq!(config.debug_log, "/tmp/keyswap-debug.log");
    }

    #[test]
    fn test_expand_path_with_default() {
        std::env::remove_var("KEYSWAP_TEST_UNSET");
        assert_eq!(
            expand_path("${KEYSWAP_TEST_UNSET:-/tmp}/keyswap.log"),
            "/tmp/keyswap.log"
        );
    }

    #[test]
    fn test_expand_path_from_environment() {
        std::env::set_var("KEYSWAP_TEST_HOME", "/home/tester");
        assert_eq!(
            expand_path("${KEYSWAP_TEST_HOME}/keyswap.log"),
            "/home/tester/keyswap.log"
        );
    }

    #[test]
    fn test_unset_variable_without_default_expands_to_nothing() {
        std::env::remove_var("KEYSWAP_TEST_MISSING");
        assert_eq!(expand_path("${KEYSWAP_TEST_MISSING}/x"), "/x");
    }
}
