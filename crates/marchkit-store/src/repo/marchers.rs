//! Marcher repository
//!
//! Owns the marchers table: insert with derived drill number and display-id
//! follow-up, fixed-statement update from a pre-merged row, list, delete.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use marchkit_core::ids::{display_id, EntityKind};
use marchkit_core::model::{Marcher, NewMarcher};
use marchkit_core::MarchkitError;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{from_rusqlite, Result};

fn marcher_from_row(row: &Row<'_>) -> rusqlite::Result<Marcher> {
    Ok(Marcher {
        id: row.get(0)?,
        id_for_html: row.get(1)?,
        name: row.get(2)?,
        section: row.get(3)?,
        year: row.get(4)?,
        notes: row.get(5)?,
        drill_prefix: row.get(6)?,
        drill_order: row.get(7)?,
        drill_number: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert a validated draft and assign its display id.
///
/// The display id needs the primary key, so it is written by a follow-up
/// statement; the caller's transaction makes the pair atomic. Returns the
/// new primary key.
///
/// # Errors
/// * `Conflict` - drill number already taken
pub fn insert(conn: &Connection, draft: &NewMarcher, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO marchers
            (name, section, year, notes, drill_prefix, drill_order, drill_number,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            draft.name,
            draft.section,
            draft.year,
            draft.notes,
            draft.drill_prefix,
            draft.drill_order,
            draft.drill_number(),
            now,
            now,
        ],
    )
    .map_err(from_rusqlite)?;

    let id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE marchers SET id_for_html = ?1 WHERE id = ?2",
        params![display_id(EntityKind::Marcher, id), id],
    )
    .map_err(from_rusqlite)?;

    Ok(id)
}

/// Fetch one marcher.
///
/// # Errors
/// * `MarcherNotFound`
pub fn get(conn: &Connection, id: i64) -> Result<Marcher> {
    conn.query_row(
        "SELECT id, id_for_html, name, section, year, notes, drill_prefix,
                drill_order, drill_number, created_at, updated_at
         FROM marchers WHERE id = ?",
        [id],
        marcher_from_row,
    )
    .optional()
    .map_err(from_rusqlite)?
    .ok_or(MarchkitError::MarcherNotFound { id })
}

/// All marchers in insertion order
pub fn list(conn: &Connection) -> Result<Vec<Marcher>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, id_for_html, name, section, year, notes, drill_prefix,
                    drill_order, drill_number, created_at, updated_at
             FROM marchers ORDER BY id",
        )
        .map_err(from_rusqlite)?;

    let marchers = stmt
        .query_map([], marcher_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(marchers)
}

/// Primary keys of all marchers, in insertion order
pub fn ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare("SELECT id FROM marchers ORDER BY id")
        .map_err(from_rusqlite)?;

    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(ids)
}

/// Write a pre-merged row produced by `MarcherUpdate::apply`.
///
/// One fixed statement covers every mutable column plus the re-derived
/// drill number and the refreshed `updated_at`; protected columns are not
/// in the statement at all.
///
/// # Errors
/// * `Conflict` - merged drill number collides with another marcher
pub fn update(conn: &Connection, merged: &Marcher) -> Result<()> {
    conn.execute(
        "UPDATE marchers
         SET name = ?1, section = ?2, year = ?3, notes = ?4,
             drill_prefix = ?5, drill_order = ?6, drill_number = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            merged.name,
            merged.section,
            merged.year,
            merged.notes,
            merged.drill_prefix,
            merged.drill_order,
            merged.drill_number,
            merged.updated_at,
            merged.id,
        ],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Delete one marcher row. Returns false if no row existed.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM marchers WHERE id = ?", [id])
        .map_err(from_rusqlite)?;
    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrations::apply_migrations(&mut conn).unwrap();
        conn
    }

    fn draft(prefix: &str, order: i64) -> NewMarcher {
        NewMarcher {
            name: Some("Alice".to_string()),
            section: "trumpet".to_string(),
            year: None,
            notes: None,
            drill_prefix: prefix.to_string(),
            drill_order: order,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let conn = setup_test_db();
        let id = insert(&conn, &draft("B", 1), Utc::now()).unwrap();

        let marcher = get(&conn, id).unwrap();
        assert_eq!(marcher.id, id);
        assert_eq!(marcher.drill_number, "B1");
        assert_eq!(marcher.id_for_html, format!("marcher_{id}"));
        assert_eq!(marcher.created_at, marcher.updated_at);
    }

    #[test]
    fn test_get_missing() {
        let conn = setup_test_db();
        assert_eq!(
            get(&conn, 99),
            Err(MarchkitError::MarcherNotFound { id: 99 })
        );
    }

    #[test]
    fn test_duplicate_drill_number_conflicts() {
        let conn = setup_test_db();
        insert(&conn, &draft("B", 1), Utc::now()).unwrap();

        let err = insert(&conn, &draft("B", 1), Utc::now()).expect_err("duplicate must fail");
        match err {
            MarchkitError::Conflict { constraint } => {
                assert!(constraint.contains("drill_number"), "got: {constraint}");
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_list_in_insertion_order() {
        let conn = setup_test_db();
        insert(&conn, &draft("B", 2), Utc::now()).unwrap();
        insert(&conn, &draft("B", 1), Utc::now()).unwrap();

        let listed = list(&conn).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].drill_number, "B2");
        assert_eq!(listed[1].drill_number, "B1");
        assert_eq!(ids(&conn).unwrap(), vec![listed[0].id, listed[1].id]);
    }

    #[test]
    fn test_delete_missing_returns_false() {
        let conn = setup_test_db();
        assert!(!delete(&conn, 5).unwrap());

        let id = insert(&conn, &draft("B", 1), Utc::now()).unwrap();
        assert!(delete(&conn, id).unwrap());
        assert!(list(&conn).unwrap().is_empty());
    }
}
