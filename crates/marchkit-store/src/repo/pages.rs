//! Page repository
//!
//! Owns the pages table. `order` is assigned by the sequencing query at
//! creation and never written by an update statement.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use marchkit_core::ids::{display_id, EntityKind};
use marchkit_core::model::{NewPage, Page};
use marchkit_core::MarchkitError;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{from_rusqlite, Result};

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        id_for_html: row.get(1)?,
        name: row.get(2)?,
        notes: row.get(3)?,
        order: row.get(4)?,
        tempo: row.get(5)?,
        time_signature: row.get(6)?,
        counts: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Next order value for a new page: max existing + 1, or 1 for an empty
/// show. Must run inside the same transaction as the insert that uses it;
/// the single-writer discipline closes the read-then-write race.
pub fn next_order(conn: &Connection) -> Result<i64> {
    conn.query_row(
        r#"SELECT COALESCE(MAX("order"), 0) + 1 FROM pages"#,
        [],
        |row| row.get(0),
    )
    .map_err(from_rusqlite)
}

/// Insert a validated draft at the given order and assign its display id.
/// Returns the new primary key.
///
/// # Errors
/// * `Conflict` - page name or order already taken
pub fn insert(conn: &Connection, draft: &NewPage, order: i64, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        r#"INSERT INTO pages
            (name, notes, "order", tempo, time_signature, counts, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        params![
            draft.name,
            draft.notes,
            order,
            draft.tempo,
            draft.time_signature,
            draft.counts,
            now,
            now,
        ],
    )
    .map_err(from_rusqlite)?;

    let id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE pages SET id_for_html = ?1 WHERE id = ?2",
        params![display_id(EntityKind::Page, id), id],
    )
    .map_err(from_rusqlite)?;

    Ok(id)
}

/// Fetch one page.
///
/// # Errors
/// * `PageNotFound`
pub fn get(conn: &Connection, id: i64) -> Result<Page> {
    conn.query_row(
        r#"SELECT id, id_for_html, name, notes, "order", tempo, time_signature,
                  counts, created_at, updated_at
         FROM pages WHERE id = ?"#,
        [id],
        page_from_row,
    )
    .optional()
    .map_err(from_rusqlite)?
    .ok_or(MarchkitError::PageNotFound { id })
}

/// All pages in insertion order
pub fn list(conn: &Connection) -> Result<Vec<Page>> {
    select_pages(conn, "ORDER BY id")
}

/// All pages in show order
pub fn list_by_order(conn: &Connection) -> Result<Vec<Page>> {
    select_pages(conn, r#"ORDER BY "order""#)
}

fn select_pages(conn: &Connection, order_clause: &str) -> Result<Vec<Page>> {
    let sql = format!(
        r#"SELECT id, id_for_html, name, notes, "order", tempo, time_signature,
                  counts, created_at, updated_at
         FROM pages {order_clause}"#
    );
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

    let pages = stmt
        .query_map([], page_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(pages)
}

/// Primary keys of all pages, in show order
pub fn ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare(r#"SELECT id FROM pages ORDER BY "order""#)
        .map_err(from_rusqlite)?;

    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(ids)
}

/// Write a pre-merged row produced by `PageUpdate::apply`.
///
/// `order` is not in the statement; reordering is not a field write.
///
/// # Errors
/// * `Conflict` - merged name collides with another page
pub fn update(conn: &Connection, merged: &Page) -> Result<()> {
    conn.execute(
        "UPDATE pages
         SET name = ?1, notes = ?2, tempo = ?3, time_signature = ?4,
             counts = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            merged.name,
            merged.notes,
            merged.tempo,
            merged.time_signature,
            merged.counts,
            merged.updated_at,
            merged.id,
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Delete one page row. Returns false if no row existed.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM pages WHERE id = ?", [id])
        .map_err(from_rusqlite)?;
    Ok(affected > 0)
}
