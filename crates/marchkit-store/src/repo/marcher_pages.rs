//! MarcherPage repository
//!
//! Owns the coordinate matrix. Rows are never created one at a time from
//! the outside: matrix completion inserts them when a marcher or page is
//! created, and cascade deletion removes them with their parent.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use marchkit_core::ids::{display_id, EntityKind};
use marchkit_core::model::{MarcherPage, MarcherPageFilter};
use marchkit_core::MarchkitError;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{from_rusqlite, Result};

const SELECT_COLUMNS: &str = "SELECT id, id_for_html, marcher_id, page_id, x, y, notes, \
     created_at, updated_at FROM marcher_pages";

fn marcher_page_from_row(row: &Row<'_>) -> rusqlite::Result<MarcherPage> {
    Ok(MarcherPage {
        id: row.get(0)?,
        id_for_html: row.get(1)?,
        marcher_id: row.get(2)?,
        page_id: row.get(3)?,
        x: row.get(4)?,
        y: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert one unplaced matrix row and assign its display id.
/// Returns the new primary key.
fn insert_row(conn: &Connection, marcher_id: i64, page_id: i64, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO marcher_pages (marcher_id, page_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![marcher_id, page_id, now, now],
    )
    .map_err(from_rusqlite)?;

    let id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE marcher_pages SET id_for_html = ?1 WHERE id = ?2",
        params![display_id(EntityKind::MarcherPage, id), id],
    )
    .map_err(from_rusqlite)?;

    Ok(id)
}

/// Give a new marcher one row on each existing page.
/// Returns the new row ids.
///
/// # Errors
/// * `Conflict` - a (marcher, page) row already exists
pub fn complete_for_marcher(
    conn: &Connection,
    marcher_id: i64,
    page_ids: &[i64],
    now: DateTime<Utc>,
) -> Result<Vec<i64>> {
    let mut created = Vec::with_capacity(page_ids.len());
    for &page_id in page_ids {
        created.push(insert_row(conn, marcher_id, page_id, now)?);
    }
    Ok(created)
}

/// Give each existing marcher one row on a new page.
/// Returns the new row ids.
///
/// # Errors
/// * `Conflict` - a (marcher, page) row already exists
pub fn complete_for_page(
    conn: &Connection,
    page_id: i64,
    marcher_ids: &[i64],
    now: DateTime<Utc>,
) -> Result<Vec<i64>> {
    let mut created = Vec::with_capacity(marcher_ids.len());
    for &marcher_id in marcher_ids {
        created.push(insert_row(conn, marcher_id, page_id, now)?);
    }
    Ok(created)
}

/// Fetch the row for one marcher on one page.
///
/// # Errors
/// * `MarcherPageNotFound`
pub fn get(conn: &Connection, marcher_id: i64, page_id: i64) -> Result<MarcherPage> {
    let sql = format!("{SELECT_COLUMNS} WHERE marcher_id = ?1 AND page_id = ?2");
    conn.query_row(&sql, [marcher_id, page_id], marcher_page_from_row)
        .optional()
        .map_err(from_rusqlite)?
        .ok_or(MarchkitError::MarcherPageNotFound {
            marcher_id,
            page_id,
        })
}

/// Matrix rows matching the filter, in insertion order.
pub fn list(conn: &Connection, filter: MarcherPageFilter) -> Result<Vec<MarcherPage>> {
    let (clause, key) = match filter {
        MarcherPageFilter::All => ("", None),
        MarcherPageFilter::ByMarcher(id) => ("WHERE marcher_id = ?", Some(id)),
        MarcherPageFilter::ByPage(id) => ("WHERE page_id = ?", Some(id)),
    };
    let sql = format!("{SELECT_COLUMNS} {clause} ORDER BY id");
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

    let rows = match key {
        Some(id) => stmt.query_map([id], marcher_page_from_row),
        None => stmt.query_map([], marcher_page_from_row),
    }
    .map_err(from_rusqlite)?
    .collect::<std::result::Result<Vec<_>, _>>()
    .map_err(from_rusqlite)?;

    Ok(rows)
}

/// Write a pre-merged row produced by `MarcherPageUpdate::apply`.
///
/// Only coordinates and notes are in the statement; the (marcher, page)
/// identity of a row never changes.
pub fn update(conn: &Connection, merged: &MarcherPage) -> Result<()> {
    conn.execute(
        "UPDATE marcher_pages SET x = ?1, y = ?2, notes = ?3, updated_at = ?4 WHERE id = ?5",
        params![merged.x, merged.y, merged.notes, merged.updated_at, merged.id],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Primary keys of one marcher's rows, for cascade reporting.
pub fn ids_for_marcher(conn: &Connection, marcher_id: i64) -> Result<Vec<i64>> {
    ids_where(conn, "marcher_id", marcher_id)
}

/// Primary keys of one page's rows, for cascade reporting.
pub fn ids_for_page(conn: &Connection, page_id: i64) -> Result<Vec<i64>> {
    ids_where(conn, "page_id", page_id)
}

fn ids_where(conn: &Connection, column: &str, key: i64) -> Result<Vec<i64>> {
    let sql = format!("SELECT id FROM marcher_pages WHERE {column} = ? ORDER BY id");
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

    let ids = stmt
        .query_map([key], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(ids)
}

/// Remove all of one marcher's rows. Returns the number removed.
pub fn delete_for_marcher(conn: &Connection, marcher_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM marcher_pages WHERE marcher_id = ?", [marcher_id])
        .map_err(from_rusqlite)
}

/// Remove all of one page's rows. Returns the number removed.
pub fn delete_for_page(conn: &Connection, page_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM marcher_pages WHERE page_id = ?", [page_id])
        .map_err(from_rusqlite)
}
