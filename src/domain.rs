use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PAGE_NUMBER_WIDTH: usize = 6;

/// Highest page number already notified, persisted as a zero-padded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(u64);

impl PageNumber {
    pub const DEFAULT: PageNumber = PageNumber(1901);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = PAGE_NUMBER_WIDTH)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid page number {0:?}")]
pub struct InvalidPageNumber(pub String);

impl FromStr for PageNumber {
    type Err = InvalidPageNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPageNumber(s.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(PageNumber)
            .map_err(|_| InvalidPageNumber(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub story: u32,
    pub page: PageNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    NoChange,
    NewContent(PageNumber),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStatus {
    #[default]
    Active,
    Attention,
}

pub const MIN_CHECK_INTERVAL_MINUTES: u64 = 10;
pub const MAX_CHECK_INTERVAL_MINUTES: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreferencesError {
    #[error("Check interval must be between 10 and 60 minutes, got {0}")]
    IntervalOutOfRange(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub check_interval_minutes: u64,
    pub sound: bool,
}

impl Preferences {
    /// Builds preferences from the startup config. The configured interval is
    /// rounded up to whole minutes and clamped into the allowed range.
    pub fn from_startup(check_interval_secs: u64, sound: bool) -> Self {
        let minutes = check_interval_secs.div_ceil(60).clamp(
            MIN_CHECK_INTERVAL_MINUTES,
            MAX_CHECK_INTERVAL_MINUTES,
        );
        Self {
            check_interval_minutes: minutes,
            sound,
        }
    }

    pub fn validate(self) -> Result<Self, PreferencesError> {
        if !(MIN_CHECK_INTERVAL_MINUTES..=MAX_CHECK_INTERVAL_MINUTES)
            .contains(&self.check_interval_minutes)
        {
            return Err(PreferencesError::IntervalOutOfRange(
                self.check_interval_minutes,
            ));
        }
        Ok(self)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            check_interval_minutes: MIN_CHECK_INTERVAL_MINUTES,
            sound: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub sound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub image: String,
    pub sound: Option<String>,
    pub page: Option<PageNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_is_zero_padded() {
        assert_eq!(PageNumber::DEFAULT.to_string(), "001901");
        assert_eq!(PageNumber::new(7).to_string(), "000007");
        assert_eq!(PageNumber::new(1234567).to_string(), "1234567");
    }

    #[test]
    fn page_number_parses_padded_and_trailing_newline() {
        assert_eq!("001902".parse::<PageNumber>(), Ok(PageNumber::new(1902)));
        assert_eq!("1902\n".parse::<PageNumber>(), Ok(PageNumber::new(1902)));
        assert!("".parse::<PageNumber>().is_err());
        assert!("-12".parse::<PageNumber>().is_err());
        assert!("19o1".parse::<PageNumber>().is_err());
    }

    #[test]
    fn comparison_is_numeric() {
        let padded: PageNumber = "001902".parse().unwrap();
        let short: PageNumber = "999".parse().unwrap();
        assert!(padded > short);
    }

    #[test]
    fn preferences_reject_out_of_range_interval() {
        let prefs = Preferences {
            check_interval_minutes: 5,
            sound: true,
        };
        assert_eq!(
            prefs.validate(),
            Err(PreferencesError::IntervalOutOfRange(5))
        );
        let prefs = Preferences {
            check_interval_minutes: 60,
            sound: false,
        };
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn startup_preferences_use_default_interval() {
        let prefs = Preferences::from_startup(600, true);
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.check_interval(), Duration::from_secs(600));
        assert_eq!(Preferences::from_startup(1, false).check_interval_minutes, 10);
        assert_eq!(Preferences::from_startup(7200, false).check_interval_minutes, 60);
    }
}
