//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums and idempotent application
//! - Embedded SQL migrations
//! - Tamper detection for already-applied migrations

mod checksums;
mod embedded;
mod runner;

pub use runner::apply_migrations;
