//! Marchkit Store - SQLite persistence for the drill show
//!
//! Provides:
//! - SQLite schema with a migrations framework (embedded SQL + checksums)
//! - Per-entity repositories behind one facade
//! - The `ShowStore` facade: single writer, one transaction per mutation,
//!   change events published only after commit
//!
//! The three tables are owned exclusively by this crate; consumers never
//! write SQL against the show file directly.

pub mod db;
pub mod errors;
pub mod migrations;
mod repo;
pub mod show;

// Re-export key types
pub use errors::Result;
pub use show::ShowStore;
