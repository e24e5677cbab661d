//! Display locales for fixture dates.
//!
//! Fixture search matches the ISO date and the date as the dashboard
//! displays it, so a term typed the way the list shows it always hits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How dates are rendered for display and matched by search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateLocale {
    /// `2024-05-10`
    Iso,
    /// `10/05/2024`
    #[default]
    French,
    /// `5/10/2024`
    English,
}

/// Error returned for an unknown locale name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown date locale: {0:?} (expected iso, french or english)")]
pub struct ParseLocaleError(pub String);

impl DateLocale {
    /// The `chrono` format string for this locale.
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Iso => "%Y-%m-%d",
            Self::French => "%d/%m/%Y",
            Self::English => "%-m/%-d/%Y",
        }
    }

    /// Render a date the way this locale displays it.
    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }

    /// The strings a date is searchable by: ISO first, then the display
    /// form when it differs.
    pub fn date_projections(self, date: NaiveDate) -> Vec<String> {
        let iso = Self::Iso.format(date);
        let display = self.format(date);
        if display == iso {
            vec![iso]
        } else {
            vec![iso, display]
        }
    }
}

impl core::str::FromStr for DateLocale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso" => Ok(Self::Iso),
            "french" | "fr" | "fr-fr" => Ok(Self::French),
            "english" | "en" | "en-us" => Ok(Self::English),
            _ => Err(ParseLocaleError(s.to_owned())),
        }
    }
}
