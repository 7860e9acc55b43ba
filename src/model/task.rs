//! Task records and creation-payload validation.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

/// Card color applied when the payload does not supply one.
pub const DEFAULT_CARD_COLOR: &str = "#ffffff";

const MAX_TITLE_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 500;

fn card_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("card color pattern is valid")
    })
}

/// Recurrence cadence of a recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
        }
    }
}

/// Fixed, locale-independent weekday enumeration, Sunday through Saturday.
///
/// Serialized as the English long names (`"Sunday"` .. `"Saturday"`), which
/// is also the representation stored in recurrence day lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
        }
    }
}

/// A task record. Owned by exactly one user; the owner never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub card_color: String,
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default)]
    pub recurrence_days: Vec<Weekday>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw task-creation payload, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub card_color: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default)]
    pub recurrence_days: Vec<Weekday>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// A creation payload that passed validation and normalization.
#[derive(Debug, Clone)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub card_color: String,
    pub is_recurring: bool,
    pub recurrence_type: Option<RecurrenceType>,
    pub recurrence_days: Vec<Weekday>,
    pub tags: Vec<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Whether the recurrence fields form a legal combination: a recurring
    /// task must carry a recurrence type. (Unknown type strings are already
    /// rejected at deserialization.)
    pub fn recurrence_is_valid(&self) -> bool {
        !self.is_recurring || self.recurrence_type.is_some()
    }

    /// Validate field constraints and normalize the payload.
    ///
    /// Normalization: title and description are trimmed, the card color
    /// defaults to white, tags are trimmed with empty entries dropped
    /// (order preserved, duplicates kept), and recurrence fields are forced
    /// to absent/empty when `is_recurring` is false.
    pub fn validated(self) -> Result<ValidTask, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Task title is required"));
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.push(FieldError::new(
                "title",
                "Task title cannot exceed 100 characters",
            ));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            if d.chars().count() > MAX_DESCRIPTION_CHARS {
                errors.push(FieldError::new(
                    "description",
                    "Description cannot exceed 500 characters",
                ));
            }
        }

        let card_color = match self.card_color {
            None => DEFAULT_CARD_COLOR.to_string(),
            Some(c) => {
                if !card_color_re().is_match(&c) {
                    errors.push(FieldError::new(
                        "card_color",
                        "Card color must be a hex RGB or RGBA value",
                    ));
                }
                c
            }
        };

        let tags: Vec<String> = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let (recurrence_type, recurrence_days) = if self.is_recurring {
            (self.recurrence_type, self.recurrence_days)
        } else {
            (None, Vec::new())
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidTask {
            title,
            description,
            card_color,
            is_recurring: self.is_recurring,
            recurrence_type,
            recurrence_days,
            tags,
            scheduled_date: self.scheduled_date,
        })
    }
}
