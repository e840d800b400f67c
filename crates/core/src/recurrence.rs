//! Recurring-series helpers.
//!
//! A recurring event is stored as one row per occurrence; every occurrence
//! shares a `recurrence_id` (UUID v4). The rule here only covers what event
//! creation needs: expanding a simple frequency/interval/count rule into the
//! occurrence start/end times.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Maximum occurrences a single rule may expand to.
pub const MAX_OCCURRENCES: u32 = 200;

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
}

/// A recurrence rule attached to an event-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Every `interval` days/weeks. Defaults to 1 when omitted.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Total number of occurrences, including the first.
    pub count: u32,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    /// Validate the rule bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval == 0 {
            return Err("Recurrence interval must be at least 1".to_string());
        }
        if self.count < 2 {
            return Err("A recurring series needs at least 2 occurrences".to_string());
        }
        if self.count > MAX_OCCURRENCES {
            return Err(format!(
                "A recurring series may have at most {MAX_OCCURRENCES} occurrences"
            ));
        }
        Ok(())
    }

    /// Expand the rule into `(starts_at, ends_at)` pairs, first occurrence at
    /// the given dates.
    pub fn expand(&self, starts_at: Timestamp, ends_at: Timestamp) -> Vec<(Timestamp, Timestamp)> {
        let step = match self.frequency {
            Frequency::Daily => Duration::days(self.interval as i64),
            Frequency::Weekly => Duration::weeks(self.interval as i64),
        };
        (0..self.count)
            .map(|i| {
                let offset = step * i as i32;
                (starts_at + offset, ends_at + offset)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rule(frequency: Frequency, interval: u32, count: u32) -> RecurrenceRule {
        RecurrenceRule {
            frequency,
            interval,
            count,
        }
    }

    #[test]
    fn daily_expansion() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();

        let occurrences = rule(Frequency::Daily, 1, 3).expand(start, end);
        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[0].0, start);
        assert_eq!(occurrences[1].0, start + Duration::days(1));
        assert_eq!(occurrences[2].0, start + Duration::days(2));
        // Duration is preserved on every occurrence.
        for (s, e) in occurrences {
            assert_eq!(e - s, Duration::hours(1));
        }
    }

    #[test]
    fn weekly_expansion_with_interval() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let end = start + Duration::minutes(30);

        let occurrences = rule(Frequency::Weekly, 2, 4).expand(start, end);
        assert_eq!(occurrences.len(), 4);
        assert_eq!(occurrences[3].0, start + Duration::weeks(6));
    }

    #[test]
    fn validation_bounds() {
        assert!(rule(Frequency::Daily, 1, 5).validate().is_ok());
        assert!(rule(Frequency::Daily, 0, 5).validate().is_err());
        assert!(rule(Frequency::Daily, 1, 1).validate().is_err());
        assert!(rule(Frequency::Daily, 1, MAX_OCCURRENCES + 1).validate().is_err());
    }

    #[test]
    fn interval_defaults_to_one_in_json() {
        let parsed: RecurrenceRule =
            serde_json::from_str(r#"{"frequency": "daily", "count": 3}"#).unwrap();
        assert_eq!(parsed.interval, 1);
    }
}
