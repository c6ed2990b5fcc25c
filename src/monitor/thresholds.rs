// Threshold selection - which urgency band an observation falls into

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Ascending, deduplicated set of alert thresholds in days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ThresholdSet(Vec<u32>);

impl ThresholdSet {
    /// Build from thresholds in any order. Duplicates collapse to one.
    pub fn new(mut days: Vec<u32>) -> Result<Self, ConfigError> {
        if days.is_empty() {
            return Err(ConfigError::missing("THRESHOLD_DAYS"));
        }
        if days.contains(&0) {
            return Err(ConfigError::invalid(
                "THRESHOLD_DAYS",
                "thresholds must be positive numbers of days",
            ));
        }

        days.sort_unstable();
        days.dedup();
        Ok(Self(days))
    }

    /// Parse a comma-separated list such as "30,14,7"
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut days = Vec::new();
        for part in list.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let value = part.parse::<u32>().map_err(|e| {
                ConfigError::invalid("THRESHOLD_DAYS", format!("'{}' is not a number of days: {}", part, e))
            })?;
            days.push(value);
        }
        Self::new(days)
    }

    /// Smallest threshold `t` with `days_to_expiration <= t`
    pub fn select(&self, days_to_expiration: i64) -> Option<u32> {
        select(days_to_expiration, &self.0)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u32>> for ThresholdSet {
    type Error = ConfigError;

    fn try_from(days: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<ThresholdSet> for Vec<u32> {
    fn from(set: ThresholdSet) -> Self {
        set.0
    }
}

impl std::fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}", joined)
    }
}

/// Pick the tightest threshold an observation satisfies.
///
/// `thresholds` must be sorted ascending. Returns the first value `t` with
/// `days_to_expiration <= t`, or `None` when the certificate is further out
/// than every threshold. Already-expired certificates (negative days) select
/// the smallest threshold.
pub fn select(days_to_expiration: i64, thresholds: &[u32]) -> Option<u32> {
    thresholds
        .iter()
        .copied()
        .find(|&t| days_to_expiration <= i64::from(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(days: &[u32]) -> ThresholdSet {
        ThresholdSet::new(days.to_vec()).unwrap()
    }

    #[test]
    fn test_select_tightest_band() {
        let thresholds = set(&[7, 14, 30]);
        assert_eq!(thresholds.select(5), Some(7));
        assert_eq!(thresholds.select(7), Some(7));
        assert_eq!(thresholds.select(8), Some(14));
        assert_eq!(thresholds.select(30), Some(30));
    }

    #[test]
    fn test_select_none_beyond_all_thresholds() {
        assert_eq!(set(&[7, 14, 30]).select(40), None);
        assert_eq!(set(&[7, 14, 30]).select(31), None);
    }

    #[test]
    fn test_select_expired_certificate() {
        assert_eq!(set(&[7, 14, 30]).select(-3), Some(7));
        assert_eq!(set(&[7, 14, 30]).select(i64::MIN), Some(7));
    }

    #[test]
    fn test_unsorted_input_is_sorted_and_deduplicated() {
        let thresholds = set(&[30, 7, 14, 7, 30]);
        assert_eq!(thresholds.as_slice(), &[7, 14, 30]);
        assert_eq!(thresholds.select(5), Some(7));
    }

    #[test]
    fn test_select_matches_brute_force() {
        let thresholds = set(&[1, 3, 7, 14, 30, 60]);
        for days in -10..=70 {
            let expected = thresholds
                .iter()
                .filter(|&t| days <= i64::from(t))
                .min();
            assert_eq!(thresholds.select(days), expected, "days = {}", days);
        }
    }

    #[test]
    fn test_parse_list() {
        let thresholds = ThresholdSet::parse(" 30, 14 ,7,").unwrap();
        assert_eq!(thresholds.as_slice(), &[7, 14, 30]);
        assert_eq!(thresholds.to_string(), "7, 14, 30");
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            ThresholdSet::parse("7,abc"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            ThresholdSet::parse("-1"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            ThresholdSet::parse("0,7"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            ThresholdSet::parse(" , "),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_deserialize_normalizes() {
        let thresholds: ThresholdSet = serde_json::from_str("[14, 7, 14]").unwrap();
        assert_eq!(thresholds.as_slice(), &[7, 14]);
        assert!(serde_json::from_str::<ThresholdSet>("[]").is_err());
    }
}
