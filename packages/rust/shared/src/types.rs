//! Core domain types for work-log records and their rollups.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, WorklogError};

/// Stored property names, shared by every tier.
pub mod fields {
    pub const TITLE: &str = "Title";

    pub const LOGGED_DATE: &str = "Logged Date";
    pub const CATEGORY: &str = "Category";
    pub const IMPACT_LEVEL: &str = "Impact Level";
    pub const TECH_STACK: &str = "Tech Stack";
    pub const STATUS: &str = "Status";
    pub const METRICS: &str = "Metrics";
    pub const TICKET_URL: &str = "Ticket URL";

    pub const PERIOD_START: &str = "Period Start";
    pub const PERIOD_END: &str = "Period End";
    pub const KEY_HIGHLIGHTS: &str = "Key Highlights";
    pub const GENERATED_AT: &str = "Generated At";
    pub const SOURCE_LOGS: &str = "Source Logs";

    pub const YEAR_MONTH: &str = "Year-Month";
    pub const SOURCE_WEEKS: &str = "Source Weeks";
    pub const STATS: &str = "Stats";
}

// ---------------------------------------------------------------------------
// RecordId
// ---------------------------------------------------------------------------

/// Opaque identifier assigned by the store when a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Generate a new time-sortable record identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Select(String),
    MultiSelect(Vec<String>),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Url(String),
    /// Lineage to lower-tier records. Order is insertion order, no duplicates.
    Relation(Vec<RecordId>),
}

impl PropertyValue {
    /// Build a relation value, dropping repeated ids while keeping first-seen order.
    pub fn relation<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = RecordId>,
    {
        let mut out: Vec<RecordId> = Vec::new();
        for id in ids {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Self::Relation(out)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Select(s) | Self::Url(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::MultiSelect(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&[RecordId]> {
        match self {
            Self::Relation(v) => Some(v),
            _ => None,
        }
    }
}

/// Field name → typed value. Ordered so serialized forms are stable.
pub type Properties = BTreeMap<String, PropertyValue>;

// ---------------------------------------------------------------------------
// ContentNode
// ---------------------------------------------------------------------------

/// One typed unit of structured text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentNode {
    /// Level is 2 or 3.
    Heading { level: u8, text: String },
    BulletItem { text: String },
    NumberedItem { text: String },
    Paragraph { text: String },
}

impl ContentNode {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::BulletItem { text: text.into() }
    }

    pub fn numbered(text: impl Into<String>) -> Self {
        Self::NumberedItem { text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Heading { text, .. }
            | Self::BulletItem { text }
            | Self::NumberedItem { text }
            | Self::Paragraph { text } => text,
        }
    }

    /// Storage discriminator, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::BulletItem { .. } => "bullet_item",
            Self::NumberedItem { .. } => "numbered_item",
            Self::Paragraph { .. } => "paragraph",
        }
    }

    /// Rebuild a node from its storage columns.
    pub fn from_parts(kind: &str, level: Option<u8>, text: String) -> Result<Self> {
        match kind {
            "heading" => Ok(Self::Heading {
                level: level.unwrap_or(2),
                text,
            }),
            "bullet_item" => Ok(Self::BulletItem { text }),
            "numbered_item" => Ok(Self::NumberedItem { text }),
            "paragraph" => Ok(Self::Paragraph { text }),
            other => Err(WorklogError::validation(format!(
                "unknown content node kind '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A record as returned by a property-only store query.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: Option<RecordId>,
    pub properties: Properties,
}

/// A record with its content body attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub id: Option<RecordId>,
    pub properties: Properties,
    pub content: Vec<ContentNode>,
}

impl EnrichedRecord {
    /// Text of a text, select, or URL property; empty when absent.
    pub fn text(&self, field: &str) -> &str {
        self.properties
            .get(field)
            .and_then(PropertyValue::as_text)
            .unwrap_or("")
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.properties.get(field).and_then(PropertyValue::as_date)
    }

    pub fn list(&self, field: &str) -> &[String] {
        self.properties
            .get(field)
            .and_then(PropertyValue::as_list)
            .unwrap_or(&[])
    }

    /// Size of a relation property; zero when absent.
    pub fn relation_len(&self, field: &str) -> usize {
        self.properties
            .get(field)
            .and_then(PropertyValue::as_relation)
            .map_or(0, <[RecordId]>::len)
    }
}

/// A record ready to be created in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub collection: String,
    pub properties: Properties,
    pub content: Vec<ContentNode>,
}

impl RecordDraft {
    pub fn title(&self) -> &str {
        self.properties
            .get(fields::TITLE)
            .and_then(PropertyValue::as_text)
            .unwrap_or("")
    }

    pub fn relation(&self, field: &str) -> &[RecordId] {
        self.properties
            .get(field)
            .and_then(PropertyValue::as_relation)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Daily log enums
// ---------------------------------------------------------------------------

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = WorklogError;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let options: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        WorklogError::validation(format!(
                            "'{s}' is not a valid {}; expected one of: {}",
                            stringify!($name),
                            options.join(", ")
                        ))
                    })
            }
        }
    };
}

labelled_enum!(
    /// Work category of a daily log.
    Category {
        Performance => "성능개선",
        Feature => "신규기능",
        BugFix => "버그픽스",
        Incident => "장애대응",
        Refactoring => "리팩토링",
        Other => "기타",
    }
);

labelled_enum!(
    /// How much a piece of work mattered.
    ImpactLevel {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
);

labelled_enum!(
    /// Publication status of a daily log.
    LogStatus {
        Logged => "Logged",
        InReview => "In Review",
        Published => "Published",
    }
);

impl Default for LogStatus {
    fn default() -> Self {
        Self::Logged
    }
}
