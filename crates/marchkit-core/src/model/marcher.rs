use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MarchkitError, Result};
use crate::ids::EntityKind;

/// Marcher - one performer in the drill show
///
/// A marcher is identified on the field by a drill number ("B1"), composed
/// of a letter prefix and a numeric order. The drill number is derived,
/// unique across the show, and kept in sync whenever either component
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marcher {
    /// Store-assigned primary key, immutable
    pub id: i64,

    /// Generated display identifier ("marcher_{id}"), immutable after creation
    pub id_for_html: String,

    /// Performer name, optional
    pub name: Option<String>,

    /// Instrument or role (e.g. "trumpet")
    pub section: String,

    /// Class year, optional
    pub year: Option<i64>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Letter part of the drill number (e.g. "B")
    pub drill_prefix: String,

    /// Numeric part of the drill number (e.g. 1)
    pub drill_order: i64,

    /// Unique stage identifier, always prefix + order (e.g. "B1")
    pub drill_number: String,

    /// Timestamp when this row was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when this row was last updated
    pub updated_at: DateTime<Utc>,
}

impl Marcher {
    /// Derive a drill number from its components.
    ///
    /// This is the only place the concatenation lives; creation and every
    /// update that touches a component derive through here.
    pub fn drill_number_for(prefix: &str, order: i64) -> String {
        format!("{prefix}{order}")
    }
}

/// Draft for creating a Marcher.
///
/// `id`, `id_for_html`, `drill_number`, and timestamps are assigned by the
/// store and cannot be supplied here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMarcher {
    #[serde(default)]
    pub name: Option<String>,
    pub section: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub drill_prefix: String,
    pub drill_order: i64,
}

impl NewMarcher {
    /// Check that required text fields are present and non-empty.
    ///
    /// # Errors
    /// * `MissingField` - naming `section` or `drill_prefix`
    pub fn validate(&self) -> Result<()> {
        if self.section.trim().is_empty() {
            return Err(MarchkitError::MissingField {
                entity: EntityKind::Marcher,
                field: "section",
            });
        }
        if self.drill_prefix.trim().is_empty() {
            return Err(MarchkitError::MissingField {
                entity: EntityKind::Marcher,
                field: "drill_prefix",
            });
        }
        Ok(())
    }

    /// Drill number this draft will receive on insert.
    pub fn drill_number(&self) -> String {
        Marcher::drill_number_for(&self.drill_prefix, self.drill_order)
    }
}

/// Partial update for a Marcher.
///
/// Only mutable fields are representable; a field left as `None` keeps its
/// current value. Unknown keys (including `id`, `id_for_html`,
/// `drill_number`, and timestamps) are rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarcherUpdate {
    pub name: Option<String>,
    pub section: Option<String>,
    pub year: Option<i64>,
    pub notes: Option<String>,
    pub drill_prefix: Option<String>,
    pub drill_order: Option<i64>,
}

impl MarcherUpdate {
    /// True when no field is set, i.e. the update would write nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.section.is_none()
            && self.year.is_none()
            && self.notes.is_none()
            && self.drill_prefix.is_none()
            && self.drill_order.is_none()
    }

    /// Reject updates that would blank a required text field.
    ///
    /// # Errors
    /// * `MissingField` - if `section` or `drill_prefix` is set to empty
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.section, Some(s) if s.trim().is_empty()) {
            return Err(MarchkitError::MissingField {
                entity: EntityKind::Marcher,
                field: "section",
            });
        }
        if matches!(&self.drill_prefix, Some(p) if p.trim().is_empty()) {
            return Err(MarchkitError::MissingField {
                entity: EntityKind::Marcher,
                field: "drill_prefix",
            });
        }
        Ok(())
    }

    /// Merge this update onto the current row, producing the post-write row.
    ///
    /// The drill number is re-derived from the merged prefix and order, so
    /// it can never drift from its components. `updated_at` is refreshed;
    /// `id`, `id_for_html`, and `created_at` are carried over untouched.
    pub fn apply(&self, current: &Marcher, now: DateTime<Utc>) -> Marcher {
        let drill_prefix = self
            .drill_prefix
            .clone()
            .unwrap_or_else(|| current.drill_prefix.clone());
        let drill_order = self.drill_order.unwrap_or(current.drill_order);
        let drill_number = Marcher::drill_number_for(&drill_prefix, drill_order);

        Marcher {
            id: current.id,
            id_for_html: current.id_for_html.clone(),
            name: self.name.clone().or_else(|| current.name.clone()),
            section: self
                .section
                .clone()
                .unwrap_or_else(|| current.section.clone()),
            year: self.year.or(current.year),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
            drill_prefix,
            drill_order,
            drill_number,
            created_at: current.created_at,
            updated_at: now,
        }
    }
}
