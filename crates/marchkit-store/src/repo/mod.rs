//! Repository layer: parameterized SQL, one module per table
//!
//! Mutating functions expect to run inside a transaction owned by the
//! caller (`ShowStore`), which commits and publishes change events. Rows
//! hydrate into the marchkit-core models.

pub mod marcher_pages;
pub mod marchers;
pub mod pages;
