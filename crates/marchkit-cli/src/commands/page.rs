//! Page commands
//!
//! Usage: marchkit page <add|list|update|rm> [--db <PATH>]

use clap::{Args, Subcommand};
use std::path::PathBuf;

use marchkit_core::model::{NewPage, PageUpdate};
use marchkit_store::ShowStore;

#[derive(Debug, Args)]
pub struct PageArgs {
    #[command(subcommand)]
    pub command: PageCommand,
}

#[derive(Debug, Subcommand)]
pub enum PageCommand {
    /// Add a page at the end of the show
    Add(AddArgs),
    /// List all pages
    List(ListArgs),
    /// Update fields of a page
    Update(UpdateArgs),
    /// Remove a page and every coordinate row on it
    Rm(RmArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Page name, unique across the show
    #[arg(long)]
    pub name: String,

    /// Tempo in beats per minute
    #[arg(long, default_value_t = 120.0)]
    pub tempo: f64,

    /// Time signature
    #[arg(long, default_value = "4/4")]
    pub time_signature: String,

    /// Number of counts on this page
    #[arg(long, default_value_t = 8)]
    pub counts: i64,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Sort by position in the show instead of insertion order
    #[arg(long)]
    pub by_order: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Page id to update
    pub id: i64,

    /// New page name
    #[arg(long)]
    pub name: Option<String>,

    /// New tempo in beats per minute
    #[arg(long)]
    pub tempo: Option<f64>,

    /// New time signature
    #[arg(long)]
    pub time_signature: Option<String>,

    /// New count of beats
    #[arg(long)]
    pub counts: Option<i64>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct RmArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Page id to remove
    pub id: i64,
}

/// Execute page command
pub fn execute(args: PageArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        PageCommand::Add(add_args) => execute_add(add_args),
        PageCommand::List(list_args) => execute_list(list_args),
        PageCommand::Update(update_args) => execute_update(update_args),
        PageCommand::Rm(rm_args) => execute_rm(rm_args),
    }
}

fn execute_add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;

    let draft = NewPage {
        name: args.name,
        notes: args.notes,
        tempo: args.tempo,
        time_signature: Some(args.time_signature),
        counts: args.counts,
    };
    let page = store.create_page(&draft)?;

    println!("✓ Added {} at order {} ({})", page.name, page.order, page.id_for_html);
    Ok(())
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = ShowStore::open(&args.db)?;
    let pages = if args.by_order {
        store.pages_in_show_order()?
    } else {
        store.pages()?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    for page in &pages {
        println!(
            "{:>4}  order {:<3} {:<20} {:>5.0} bpm  {} counts",
            page.id, page.order, page.name, page.tempo, page.counts,
        );
    }
    println!("{} page(s)", pages.len());
    Ok(())
}

fn execute_update(args: UpdateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;

    let update = PageUpdate {
        name: args.name,
        notes: args.notes,
        tempo: args.tempo,
        time_signature: args.time_signature,
        counts: args.counts,
    };
    let page = store.update_page(args.id, &update)?;

    println!("✓ Updated {} ({})", page.name, page.id_for_html);
    Ok(())
}

fn execute_rm(args: RmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;
    store.delete_page(args.id)?;

    println!("✓ Removed page {}", args.id);
    Ok(())
}
