//! Display identifiers for persisted rows
//!
//! Every row carries a human/DOM-friendly identifier of the form
//! `"{prefix}_{id}"` alongside its numeric primary key. The prefix depends
//! only on the entity kind, and the identifier is assigned exactly once,
//! immediately after the initial insert reveals the primary key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three persisted entity kinds.
///
/// Serialized forms match the display-id prefixes ("marcher", "page",
/// "marcherPage"), which is also how change events name their subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Marcher,
    Page,
    MarcherPage,
}

impl EntityKind {
    /// Display-id prefix for this kind
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Marcher => "marcher",
            EntityKind::Page => "page",
            EntityKind::MarcherPage => "marcherPage",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "marcher" => Some(EntityKind::Marcher),
            "page" => Some(EntityKind::Page),
            "marcherPage" => Some(EntityKind::MarcherPage),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Build the display identifier for a row of the given kind.
///
/// # Example
///
/// ```
/// use marchkit_core::ids::{display_id, EntityKind};
///
/// assert_eq!(display_id(EntityKind::Marcher, 1), "marcher_1");
/// ```
pub fn display_id(kind: EntityKind, id: i64) -> String {
    format!("{}_{}", kind.prefix(), id)
}

/// Resolve a display identifier back to its kind and primary key.
///
/// Returns `None` for unknown prefixes, non-numeric suffixes, and
/// non-positive ids (row ids start at 1). The split is on the last
/// underscore so the "marcherPage" prefix parses unambiguously.
pub fn parse_display_id(value: &str) -> Option<(EntityKind, i64)> {
    let (prefix, raw_id) = value.rsplit_once('_')?;
    let kind = EntityKind::from_prefix(prefix)?;
    let id: i64 = raw_id.parse().ok()?;
    if id < 1 {
        return None;
    }
    Some((kind, id))
}
