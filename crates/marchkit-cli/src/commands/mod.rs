//! CLI command modules

pub mod coords;
pub mod marcher;
pub mod page;
