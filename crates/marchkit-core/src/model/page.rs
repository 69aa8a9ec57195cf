use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MarchkitError, Result};
use crate::ids::EntityKind;

/// Page - one formation/counted segment of the show
///
/// Pages form the show sequence through their unique `order` value, which
/// is assigned at creation (max existing order + 1) and never editable
/// through a partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Store-assigned primary key, immutable
    pub id: i64,

    /// Generated display identifier ("page_{id}"), immutable after creation
    pub id_for_html: String,

    /// Page name, unique across the show (e.g. "Page 1")
    pub name: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// Position in the show sequence; unique, assigned by the store
    pub order: i64,

    /// Tempo in beats per minute
    pub tempo: f64,

    /// Time signature (e.g. "4/4"), optional
    pub time_signature: Option<String>,

    /// Number of counts (beats) on this page
    pub counts: i64,

    /// Timestamp when this row was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when this row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Draft for creating a Page.
///
/// `order` is intentionally absent: the store assigns it from the current
/// show sequence inside the creating transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPage {
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub tempo: f64,
    #[serde(default)]
    pub time_signature: Option<String>,
    pub counts: i64,
}

impl NewPage {
    /// # Errors
    /// * `MissingField` - if `name` is empty or whitespace-only
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MarchkitError::MissingField {
                entity: EntityKind::Page,
                field: "name",
            });
        }
        Ok(())
    }
}

/// Partial update for a Page.
///
/// `order` is not representable here; reordering is a distinct operation,
/// not a field write. Unknown keys are rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub tempo: Option<f64>,
    pub time_signature: Option<String>,
    pub counts: Option<i64>,
}

impl PageUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.notes.is_none()
            && self.tempo.is_none()
            && self.time_signature.is_none()
            && self.counts.is_none()
    }

    /// # Errors
    /// * `MissingField` - if `name` is set to empty
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(MarchkitError::MissingField {
                entity: EntityKind::Page,
                field: "name",
            });
        }
        Ok(())
    }

    /// Merge this update onto the current row, producing the post-write row.
    /// `order`, `id`, `id_for_html`, and `created_at` are carried over.
    pub fn apply(&self, current: &Page, now: DateTime<Utc>) -> Page {
        Page {
            id: current.id,
            id_for_html: current.id_for_html.clone(),
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
            order: current.order,
            tempo: self.tempo.unwrap_or(current.tempo),
            time_signature: self
                .time_signature
                .clone()
                .or_else(|| current.time_signature.clone()),
            counts: self.counts.unwrap_or(current.counts),
            created_at: current.created_at,
            updated_at: now,
        }
    }
}
