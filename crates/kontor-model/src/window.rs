// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validate::RuleValidationError;

/// Date span in which a rule or override applies. Both bounds are
/// inclusive; an absent end means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidityWindow {
    pub starts_on: NaiveDate,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
}

impl ValidityWindow {
    #[must_use]
    pub const fn open_ended(starts_on: NaiveDate) -> Self {
        Self {
            starts_on,
            ends_on: None,
        }
    }

    pub fn bounded(starts_on: NaiveDate, ends_on: NaiveDate) -> Result<Self, RuleValidationError> {
        let window = Self {
            starts_on,
            ends_on: Some(ends_on),
        };
        window.validate()?;
        Ok(window)
    }

    /// The end, when present, must be strictly after the start.
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if let Some(ends_on) = self.ends_on {
            if ends_on <= self.starts_on {
                return Err(RuleValidationError::WindowEndNotAfterStart {
                    starts_on: self.starts_on,
                    ends_on,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, on: NaiveDate) -> bool {
        if on < self.starts_on {
            return false;
        }
        match self.ends_on {
            Some(ends_on) => on <= ends_on,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ValidityWindow;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = ValidityWindow::bounded(date(2025, 1, 1), date(2025, 6, 30)).expect("window");
        assert!(window.contains(date(2025, 1, 1)));
        assert!(window.contains(date(2025, 6, 30)));
        assert!(!window.contains(date(2024, 12, 31)));
        assert!(!window.contains(date(2025, 7, 1)));
    }

    #[test]
    fn open_ended_window_has_no_upper_bound() {
        let window = ValidityWindow::open_ended(date(2025, 1, 1));
        assert!(window.contains(date(2099, 12, 31)));
        assert!(!window.contains(date(2024, 12, 31)));
    }

    #[test]
    fn end_must_be_strictly_after_start() {
        assert!(ValidityWindow::bounded(date(2025, 1, 1), date(2025, 1, 1)).is_err());
        assert!(ValidityWindow::bounded(date(2025, 1, 2), date(2025, 1, 1)).is_err());
        assert!(ValidityWindow::bounded(date(2025, 1, 1), date(2025, 1, 2)).is_ok());
    }
}
