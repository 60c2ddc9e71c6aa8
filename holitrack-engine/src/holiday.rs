//! Data-driven holiday configuration (Easter, Christmas, or any JSON file).
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::calendar::{HolidayCalendar, HolidayDateRule};
use crate::error::DataError;

const EASTER_CONFIG_DATA: &str = include_str!("../assets/data/holidays/easter.json");
const CHRISTMAS_CONFIG_DATA: &str = include_str!("../assets/data/holidays/christmas.json");

/// Bundled holiday selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HolidayMode {
    #[default]
    Easter,
    Christmas,
}

impl HolidayMode {
    pub const ALL: [Self; 2] = [Self::Easter, Self::Christmas];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Easter => "easter",
            Self::Christmas => "christmas",
        }
    }

    /// Parse a mode name, warning and falling back to Easter when unknown.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            log::warn!("Unknown holiday mode \"{raw}\", falling back to \"easter\". Available modes: easter, christmas");
            Self::Easter
        })
    }

    const fn embedded(self) -> &'static str {
        match self {
            Self::Easter => EASTER_CONFIG_DATA,
            Self::Christmas => CHRISTMAS_CONFIG_DATA,
        }
    }
}

impl FromStr for HolidayMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easter" => Ok(Self::Easter),
            "christmas" => Ok(Self::Christmas),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HolidayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// User-facing text templates. Placeholders: `{city}`, `{country}`, `{from}`, `{to}`, `{date}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HolidayMessages {
    pub title: String,
    pub subtitle: String,
    pub progress_title: String,
    pub items_delivered_label: String,
    pub journey_complete_label: String,
    pub nearby_notification: String,
    pub visited_label: String,
    pub will_visit_label: String,
    pub sleeping_title: String,
    pub come_back_message: String,
    pub delivering_message: String,
    pub traveling_message: String,
    pub next_delivery_message: String,
    pub popup_delivering_message: String,
    pub popup_traveling_message: String,
    pub fun_fact_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HolidayColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub light: String,
    pub dark: String,
    pub highlight: String,
}

/// Visual for one kind of dropped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub emoji: String,
    #[serde(default = "default_item_size")]
    pub size: u32,
    #[serde(default)]
    pub colors: Vec<String>,
}

fn default_item_size() -> u32 {
    28
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayFact {
    pub id: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Everything that distinguishes one holiday from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date: HolidayDateRule,
    pub character_name: String,
    #[serde(default)]
    pub messages: HolidayMessages,
    #[serde(default)]
    pub colors: HolidayColors,
    #[serde(default)]
    pub delivery_items: Vec<DeliveryItem>,
    #[serde(default)]
    pub facts: Vec<HolidayFact>,
    #[serde(default = "default_items_name")]
    pub items_delivered_name: String,
    #[serde(default = "default_people_per_item")]
    pub people_per_item: u32,
}

fn default_items_name() -> String {
    "Gifts".to_string()
}

fn default_people_per_item() -> u32 {
    3
}

impl HolidayConfig {
    /// Parse a holiday config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a holiday.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::parse("holiday", e))
    }

    /// Bundled config for `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is malformed.
    pub fn load_from_static(mode: HolidayMode) -> Result<Self, DataError> {
        Self::from_json(mode.embedded())
    }

    #[must_use]
    pub const fn calendar(&self) -> HolidayCalendar {
        HolidayCalendar::new(self.date)
    }

    /// People served by each item, never zero.
    #[must_use]
    pub fn people_per_item(&self) -> u32 {
        self.people_per_item.max(1)
    }

    #[must_use]
    pub fn random_fact<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&HolidayFact> {
        self.facts.choose(rng)
    }

    /// A random fact about `country`, if any exist.
    #[must_use]
    pub fn fact_for_country<R: Rng + ?Sized>(
        &self,
        country: &str,
        rng: &mut R,
    ) -> Option<&HolidayFact> {
        let matching: Vec<&HolidayFact> = self
            .facts
            .iter()
            .filter(|fact| fact.country.as_deref() == Some(country))
            .collect();
        matching.choose(rng).copied()
    }

    #[must_use]
    pub fn delivering_message(&self, city: &str, country: &str) -> String {
        render_template(
            &self.messages.delivering_message,
            &[("city", city), ("country", country)],
        )
    }

    #[must_use]
    pub fn traveling_message(&self, from: &str, to: &str) -> String {
        render_template(&self.messages.traveling_message, &[("from", from), ("to", to)])
    }

    #[must_use]
    pub fn next_delivery_message(&self, city: &str, country: &str) -> String {
        render_template(
            &self.messages.next_delivery_message,
            &[("city", city), ("country", country)],
        )
    }

    #[must_use]
    pub fn come_back_message(&self, holiday: DateTime<Utc>) -> String {
        render_template(
            &self.messages.come_back_message,
            &[("date", &format_holiday_date(holiday))],
        )
    }
}

/// Replace `{name}` placeholders; unknown placeholders are left as written.
#[must_use]
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

/// Long-form holiday date such as `Sunday, April 20, 2025`.
#[must_use]
pub fn format_holiday_date(holiday: DateTime<Utc>) -> String {
    holiday.format("%A, %B %-d, %Y").to_string()
}
