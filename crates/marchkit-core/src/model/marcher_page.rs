use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{parse_display_id, EntityKind};

/// MarcherPage - one marcher's coordinates on one page
///
/// The dense relation between Marcher and Page: exactly one row exists per
/// (marcher_id, page_id) pair. Rows are created by matrix completion when a
/// marcher or page is created, and removed only by cascade when a parent is
/// deleted. Coordinates are NULL until the editor places the marcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarcherPage {
    /// Store-assigned primary key, immutable
    pub id: i64,

    /// Generated display identifier ("marcherPage_{id}")
    pub id_for_html: String,

    /// Owning marcher; with `page_id`, the identity of this row
    pub marcher_id: i64,

    /// Owning page; with `marcher_id`, the identity of this row
    pub page_id: i64,

    /// Field x coordinate, unset until placed
    pub x: Option<f64>,

    /// Field y coordinate, unset until placed
    pub y: Option<f64>,

    /// Free-form notes
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a MarcherPage: coordinates and notes only.
///
/// `marcher_id`/`page_id` define identity and are immutable; payloads
/// naming them (or any other protected field) are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarcherPageUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub notes: Option<String>,
}

impl MarcherPageUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.notes.is_none()
    }

    /// Merge this update onto the current row, producing the post-write row.
    pub fn apply(&self, current: &MarcherPage, now: DateTime<Utc>) -> MarcherPage {
        MarcherPage {
            id: current.id,
            id_for_html: current.id_for_html.clone(),
            marcher_id: current.marcher_id,
            page_id: current.page_id,
            x: self.x.or(current.x),
            y: self.y.or(current.y),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
            created_at: current.created_at,
            updated_at: now,
        }
    }
}

/// Row selection for coordinate queries.
///
/// At most one of the two keys is expressible, which is the whole point:
/// "marcher and page at once" is a `get`, not a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarcherPageFilter {
    /// Every row in the matrix
    All,
    /// One marcher's row on every page
    ByMarcher(i64),
    /// Every marcher's row on one page
    ByPage(i64),
}

impl MarcherPageFilter {
    /// Resolve a marcher or page display id into the matching filter.
    ///
    /// Boundary callers frequently hold `id_for_html` strings rather than
    /// row keys. A marcherPage display id is not a filter and yields `None`.
    pub fn from_display_id(value: &str) -> Option<Self> {
        match parse_display_id(value)? {
            (EntityKind::Marcher, id) => Some(MarcherPageFilter::ByMarcher(id)),
            (EntityKind::Page, id) => Some(MarcherPageFilter::ByPage(id)),
            (EntityKind::MarcherPage, _) => None,
        }
    }
}
