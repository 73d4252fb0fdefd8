// Keyswap Remap Rule Table
// Per-device ordered (source type/code) -> (target type/code) rules

use evdev::EventType;
use smallvec::SmallVec;

/// One resolved remap rule.
///
/// The textual names are the forms the configuration used; they are kept for
/// diagnostics only, routing goes by the resolved pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapRule {
    pub source: (EventType, u16),
    pub target: (EventType, u16),
    pub source_name: String,
    pub target_name: String,
    pub description: Option<String>,
}

/// Ordered rule collection for one device.
///
/// Lookup is a linear scan with first-defined precedence. Duplicate sources
/// are permitted; the earlier rule always wins, so routing is deterministic.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: SmallVec<[RemapRule; 8]>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: RemapRule) {
        self.rules.push(rule);
    }

    /// First rule whose source matches the event's (type, code).
    pub fn lookup(&self, event_type: EventType, code: u16) -> Option<&RemapRule> {
        self.rules
            .iter()
            .find(|rule| rule.source == (event_type, code))
    }

    /// Key-event codes consumed as rule sources. These are withheld from the
    /// forwarding device's capability set.
    pub fn source_key_codes(&self) -> Vec<u16> {
        self.rules
            .iter()
            .filter(|rule| rule.source.0 == EventType::KEY)
            .map(|rule| rule.source.1)
            .collect()
    }

    /// Key-event codes emitted as rule targets. The injection device
    /// advertises exactly these.
    pub fn target_key_codes(&self) -> Vec<u16> {
        self.rules
            .iter()
            .filter(|rule| rule.target.0 == EventType::KEY)
            .map(|rule| rule.target.1)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemapRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<RemapRule> for RuleTable {
    fn from_iter<I: IntoIterator<Item = RemapRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: u16, target: u16) -> RemapRule {
        RemapRule {
            source: (EventType::KEY, source),
            target: (EventType::KEY, target),
            source_name: source.to_string(),
            target_name: target.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_lookup_matches_source() {
        let table: RuleTable = vec![rule(275, 158), rule(276, 159)].into_iter().collect();

        let hit = table.lookup(EventType::KEY, 275).unwrap();
        assert_eq!(hit.target, (EventType::KEY, 158));
        assert!(table.lookup(EventType::KEY, 30).is_none());
        // Same code, different type must not match.
        assert!(table.lookup(EventType::RELATIVE, 275).is_none());
    }

    #[test]
    fn test_duplicate_sources_first_defined_wins() {
        let table: RuleTable = vec![rule(275, 158), rule(275, 159)].into_iter().collect();

        let hit = table.lookup(EventType::KEY, 275).unwrap();
        assert_eq!(hit.target, (EventType::KEY, 158));
    }

    #[test]
    fn test_code_views() {
        let table: RuleTable = vec![rule(275, 158), rule(276, 159)].into_iter().collect();

        assert_eq!(table.source_key_codes(), vec![275, 276]);
        assert_eq!(table.target_key_codes(), vec![158, 159]);
    }

    #[test]
    fn test_non_key_rules_excluded_from_key_views() {
        let mut table = RuleTable::new();
        table.push(RemapRule {
            source: (EventType::RELATIVE, 8),
            target: (EventType::RELATIVE, 6),
            source_name: "rel_wheel".into(),
            target_name: "rel_hwheel".into(),
            description: None,
        });

        assert!(table.source_key_codes().is_empty());
        assert!(table.target_key_codes().is_empty());
        assert_eq!(table.len(), 1);
    }
}
