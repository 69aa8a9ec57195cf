//! ShowStore - the single entry point for reading and mutating a show
//!
//! One store owns one SQLite connection and one change bus. Every mutation
//! runs as a single transaction: validation first, then the writes (insert
//! plus matrix completion, or merge plus update, or cascade plus delete),
//! then commit. Change events are published only after the commit returns,
//! so listeners never observe state that could still roll back.

#![allow(clippy::result_large_err)]

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use marchkit_core::events::{ChangeBus, ChangeEvent};
use marchkit_core::ids::EntityKind;
use marchkit_core::model::{
    Marcher, MarcherPage, MarcherPageFilter, MarcherPageUpdate, MarcherUpdate, NewMarcher, NewPage,
    Page, PageUpdate,
};
use marchkit_core::MarchkitError;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations;
use crate::repo::{marcher_pages, marchers, pages};

/// Facade over the three entity tables.
///
/// Mutating methods take `&mut self`: the store is the single writer, and
/// each mutation borrows the connection for its whole transaction. Clone
/// the bus out via [`ShowStore::events`] to subscribe from elsewhere.
#[derive(Debug)]
pub struct ShowStore {
    conn: Connection,
    bus: Arc<ChangeBus>,
}

impl ShowStore {
    /// Open (or create) a show file, configure the connection, and bring
    /// the schema up to date.
    ///
    /// # Errors
    /// * `Storage` - the file cannot be opened or a migration fails
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self::from_connection(db::open(&path)?)?;
        info!(path = %path.as_ref().display(), "opened show store");
        Ok(store)
    }

    /// In-memory store, used by tests.
    ///
    /// # Errors
    /// * `Storage` - a migration fails
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        migrations::apply_migrations(&mut conn)?;
        Ok(Self {
            conn,
            bus: Arc::new(ChangeBus::new()),
        })
    }

    /// The change bus events from this store are published on.
    pub fn events(&self) -> Arc<ChangeBus> {
        Arc::clone(&self.bus)
    }

    // ===== Marchers =====

    /// All marchers, in insertion order.
    ///
    /// # Errors
    /// * `Storage`
    pub fn marchers(&self) -> Result<Vec<Marcher>> {
        marchers::list(&self.conn)
    }

    /// One marcher by primary key.
    ///
    /// # Errors
    /// * `MarcherNotFound`
    pub fn marcher(&self, id: i64) -> Result<Marcher> {
        marchers::get(&self.conn, id)
    }

    /// Create a marcher and give it a coordinate row on every existing page.
    ///
    /// Publishes a marcher event, then a marcherPage event for the completed
    /// rows (if any pages exist).
    ///
    /// # Errors
    /// * `MissingField` - `section` or `drill_prefix` empty
    /// * `Conflict` - drill number already taken
    pub fn create_marcher(&mut self, draft: &NewMarcher) -> Result<Marcher> {
        draft.validate()?;
        let now = Utc::now();

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let id = marchers::insert(&tx, draft, now)?;
        let page_ids = pages::ids(&tx)?;
        let completed = marcher_pages::complete_for_marcher(&tx, id, &page_ids, now)?;
        let marcher = marchers::get(&tx, id)?;
        tx.commit().map_err(from_rusqlite)?;

        debug!(id, drill_number = %marcher.drill_number, "created marcher");
        self.bus
            .publish(&ChangeEvent::new(EntityKind::Marcher, vec![id]));
        if !completed.is_empty() {
            self.bus
                .publish(&ChangeEvent::new(EntityKind::MarcherPage, completed));
        }
        Ok(marcher)
    }

    /// Apply a partial update to a marcher, re-deriving its drill number
    /// when a component changes. Returns the post-write row.
    ///
    /// # Errors
    /// * `EmptyUpdate` - no field set (checked before existence)
    /// * `MissingField` - `section` or `drill_prefix` set to empty
    /// * `MarcherNotFound`
    /// * `Conflict` - merged drill number collides with another marcher
    pub fn update_marcher(&mut self, id: i64, update: &MarcherUpdate) -> Result<Marcher> {
        if update.is_empty() {
            return Err(MarchkitError::EmptyUpdate {
                entity: EntityKind::Marcher,
            });
        }
        update.validate()?;
        let now = Utc::now();

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let current = marchers::get(&tx, id)?;
        let merged = update.apply(&current, now);
        marchers::update(&tx, &merged)?;
        tx.commit().map_err(from_rusqlite)?;

        debug!(id, drill_number = %merged.drill_number, "updated marcher");
        self.bus
            .publish(&ChangeEvent::new(EntityKind::Marcher, vec![id]));
        Ok(merged)
    }

    /// Delete a marcher and its coordinate rows.
    ///
    /// Publishes a marcher event, then a marcherPage event naming the
    /// cascaded rows (if any existed).
    ///
    /// # Errors
    /// * `MarcherNotFound`
    pub fn delete_marcher(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let removed_rows = marcher_pages::ids_for_marcher(&tx, id)?;
        marcher_pages::delete_for_marcher(&tx, id)?;
        if !marchers::delete(&tx, id)? {
            // Dropping `tx` rolls the cascade back.
            return Err(MarchkitError::MarcherNotFound { id });
        }
        tx.commit().map_err(from_rusqlite)?;

        debug!(id, cascade = removed_rows.len(), "deleted marcher");
        self.bus
            .publish(&ChangeEvent::new(EntityKind::Marcher, vec![id]));
        if !removed_rows.is_empty() {
            self.bus
                .publish(&ChangeEvent::new(EntityKind::MarcherPage, removed_rows));
        }
        Ok(())
    }

    // ===== Pages =====

    /// All pages, in insertion order.
    ///
    /// # Errors
    /// * `Storage`
    pub fn pages(&self) -> Result<Vec<Page>> {
        pages::list(&self.conn)
    }

    /// All pages, ordered by their position in the show.
    ///
    /// # Errors
    /// * `Storage`
    pub fn pages_in_show_order(&self) -> Result<Vec<Page>> {
        pages::list_by_order(&self.conn)
    }

    /// One page by primary key.
    ///
    /// # Errors
    /// * `PageNotFound`
    pub fn page(&self, id: i64) -> Result<Page> {
        pages::get(&self.conn, id)
    }

    /// Create a page at the end of the show and give every existing marcher
    /// a coordinate row on it.
    ///
    /// The order is read and the row inserted inside one transaction, so
    /// concurrent creates through separate stores serialize on the write
    /// lock and each sees the other's committed order.
    ///
    /// Publishes a page event, then a marcherPage event for the completed
    /// rows, carrying this page's id (if any marchers exist).
    ///
    /// # Errors
    /// * `MissingField` - `name` empty
    /// * `Conflict` - page name already taken
    pub fn create_page(&mut self, draft: &NewPage) -> Result<Page> {
        draft.validate()?;
        let now = Utc::now();

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let order = pages::next_order(&tx)?;
        let id = pages::insert(&tx, draft, order, now)?;
        let marcher_ids = marchers::ids(&tx)?;
        let completed = marcher_pages::complete_for_page(&tx, id, &marcher_ids, now)?;
        let page = pages::get(&tx, id)?;
        tx.commit().map_err(from_rusqlite)?;

        debug!(id, order, "created page");
        self.bus
            .publish(&ChangeEvent::new(EntityKind::Page, vec![id]));
        if !completed.is_empty() {
            self.bus
                .publish(&ChangeEvent::new(EntityKind::MarcherPage, completed).with_page(id));
        }
        Ok(page)
    }

    /// Apply a partial update to a page. `order` is not an updatable field.
    /// Returns the post-write row.
    ///
    /// # Errors
    /// * `EmptyUpdate` - no field set (checked before existence)
    /// * `MissingField` - `name` set to empty
    /// * `PageNotFound`
    /// * `Conflict` - merged name collides with another page
    pub fn update_page(&mut self, id: i64, update: &PageUpdate) -> Result<Page> {
        if update.is_empty() {
            return Err(MarchkitError::EmptyUpdate {
                entity: EntityKind::Page,
            });
        }
        update.validate()?;
        let now = Utc::now();

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let current = pages::get(&tx, id)?;
        let merged = update.apply(&current, now);
        pages::update(&tx, &merged)?;
        tx.commit().map_err(from_rusqlite)?;

        debug!(id, "updated page");
        self.bus
            .publish(&ChangeEvent::new(EntityKind::Page, vec![id]));
        Ok(merged)
    }

    /// Delete a page and every marcher's coordinate row on it.
    ///
    /// Publishes a page event, then a marcherPage event naming the cascaded
    /// rows and carrying this page's id (if any existed). Remaining pages
    /// keep their order values; the sequence may gap.
    ///
    /// # Errors
    /// * `PageNotFound`
    pub fn delete_page(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let removed_rows = marcher_pages::ids_for_page(&tx, id)?;
        marcher_pages::delete_for_page(&tx, id)?;
        if !pages::delete(&tx, id)? {
            // Dropping `tx` rolls the cascade back.
            return Err(MarchkitError::PageNotFound { id });
        }
        tx.commit().map_err(from_rusqlite)?;

        debug!(id, cascade = removed_rows.len(), "deleted page");
        self.bus
            .publish(&ChangeEvent::new(EntityKind::Page, vec![id]));
        if !removed_rows.is_empty() {
            self.bus
                .publish(&ChangeEvent::new(EntityKind::MarcherPage, removed_rows).with_page(id));
        }
        Ok(())
    }

    // ===== MarcherPages =====

    /// The coordinate row for one marcher on one page.
    ///
    /// # Errors
    /// * `MarcherPageNotFound`
    pub fn marcher_page(&self, marcher_id: i64, page_id: i64) -> Result<MarcherPage> {
        marcher_pages::get(&self.conn, marcher_id, page_id)
    }

    /// Coordinate rows matching the filter.
    ///
    /// # Errors
    /// * `Storage`
    pub fn marcher_pages(&self, filter: MarcherPageFilter) -> Result<Vec<MarcherPage>> {
        marcher_pages::list(&self.conn, filter)
    }

    /// Set coordinates or notes for one marcher on one page. Returns the
    /// post-write row.
    ///
    /// Publishes a marcherPage event carrying the page's id.
    ///
    /// # Errors
    /// * `EmptyUpdate` - no field set (checked before existence)
    /// * `MarcherPageNotFound`
    pub fn update_marcher_page(
        &mut self,
        marcher_id: i64,
        page_id: i64,
        update: &MarcherPageUpdate,
    ) -> Result<MarcherPage> {
        if update.is_empty() {
            return Err(MarchkitError::EmptyUpdate {
                entity: EntityKind::MarcherPage,
            });
        }
        let now = Utc::now();

        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let current = marcher_pages::get(&tx, marcher_id, page_id)?;
        let merged = update.apply(&current, now);
        marcher_pages::update(&tx, &merged)?;
        tx.commit().map_err(from_rusqlite)?;

        debug!(marcher_id, page_id, "updated marcher page");
        let event = ChangeEvent::new(EntityKind::MarcherPage, vec![merged.id]).with_page(page_id);
        self.bus.publish(&event);
        Ok(merged)
    }
}
