//! Coordinate commands
//!
//! Usage: marchkit coords <set|get|list> [--db <PATH>]
//!
//! `list --of` takes a display id ("marcher_3" or "page_2") and narrows the
//! listing to that marcher's rows or that page's rows.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use marchkit_core::model::{MarcherPage, MarcherPageFilter, MarcherPageUpdate};
use marchkit_store::ShowStore;

#[derive(Debug, Args)]
pub struct CoordsArgs {
    #[command(subcommand)]
    pub command: CoordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoordsCommand {
    /// Set coordinates or notes for one marcher on one page
    Set(SetArgs),
    /// Show one marcher's coordinates on one page
    Get(GetArgs),
    /// List coordinate rows
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Marcher id
    pub marcher_id: i64,

    /// Page id
    pub page_id: i64,

    /// Field x coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub x: Option<f64>,

    /// Field y coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub y: Option<f64>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Marcher id
    pub marcher_id: i64,

    /// Page id
    pub page_id: i64,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Narrow to one marcher or one page by display id
    #[arg(long)]
    pub of: Option<String>,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute coords command
pub fn execute(args: CoordsArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        CoordsCommand::Set(set_args) => execute_set(set_args),
        CoordsCommand::Get(get_args) => execute_get(get_args),
        CoordsCommand::List(list_args) => execute_list(list_args),
    }
}

fn execute_set(args: SetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;

    let update = MarcherPageUpdate {
        x: args.x,
        y: args.y,
        notes: args.notes,
    };
    let row = store.update_marcher_page(args.marcher_id, args.page_id, &update)?;

    println!("✓ {}", describe(&row));
    Ok(())
}

fn execute_get(args: GetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = ShowStore::open(&args.db)?;
    let row = store.marcher_page(args.marcher_id, args.page_id)?;

    println!("{}", describe(&row));
    Ok(())
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = ShowStore::open(&args.db)?;

    let filter = match &args.of {
        Some(value) => MarcherPageFilter::from_display_id(value)
            .ok_or_else(|| format!("not a marcher or page display id: {value}"))?,
        None => MarcherPageFilter::All,
    };
    let rows = store.marcher_pages(filter)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!("{}", describe(row));
    }
    println!("{} row(s)", rows.len());
    Ok(())
}

fn describe(row: &MarcherPage) -> String {
    format!(
        "marcher {} on page {}: ({}, {})",
        row.marcher_id,
        row.page_id,
        coord(row.x),
        coord(row.y),
    )
}

fn coord(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
