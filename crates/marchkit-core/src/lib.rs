//! Marchkit Core - Domain model for a marching-band drill show
//!
//! This crate provides the foundational types and pure logic for marchkit,
//! including:
//! - Marcher, Page, and MarcherPage models with typed drafts and updates
//! - Derived-field logic (drill numbers, display identifiers)
//! - The change notification bus connecting the store to UI/undo consumers
//! - The error taxonomy shared across all crates
//!
//! Persistence lives in `marchkit-store`; this crate has no database
//! dependency and is fully testable in memory.

pub mod errors;
pub mod events;
pub mod ids;
pub mod logging;
pub mod model;

// Re-export commonly used types
pub use errors::{MarchkitError, Result};
pub use events::{ChangeBus, ChangeEvent, Subscription};
pub use ids::{display_id, parse_display_id, EntityKind};
pub use model::{
    Marcher, MarcherPage, MarcherPageFilter, MarcherPageUpdate, MarcherUpdate, NewMarcher,
    NewPage, Page, PageUpdate,
};
