//! Marcher commands
//!
//! Usage: marchkit marcher <add|list|update|rm> [--db <PATH>]

use clap::{Args, Subcommand};
use std::path::PathBuf;

use marchkit_core::model::{MarcherUpdate, NewMarcher};
use marchkit_store::ShowStore;

#[derive(Debug, Args)]
pub struct MarcherArgs {
    #[command(subcommand)]
    pub command: MarcherCommand,
}

#[derive(Debug, Subcommand)]
pub enum MarcherCommand {
    /// Add a marcher (and its coordinate row on every page)
    Add(AddArgs),
    /// List all marchers
    List(ListArgs),
    /// Update fields of a marcher
    Update(UpdateArgs),
    /// Remove a marcher and its coordinate rows
    Rm(RmArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Instrument or role (e.g. "Trumpet")
    #[arg(long)]
    pub section: String,

    /// Drill number letter prefix (e.g. "B")
    #[arg(long)]
    pub prefix: String,

    /// Drill number numeric order (e.g. 1)
    #[arg(long)]
    pub order: i64,

    /// Performer name
    #[arg(long)]
    pub name: Option<String>,

    /// Class year
    #[arg(long)]
    pub year: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Marcher id to update
    pub id: i64,

    /// New performer name
    #[arg(long)]
    pub name: Option<String>,

    /// New section
    #[arg(long)]
    pub section: Option<String>,

    /// New drill number letter prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// New drill number numeric order
    #[arg(long)]
    pub order: Option<i64>,

    /// New class year
    #[arg(long)]
    pub year: Option<i64>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct RmArgs {
    /// Path to the show database
    #[arg(long, default_value = "show.db")]
    pub db: PathBuf,

    /// Marcher id to remove
    pub id: i64,
}

/// Execute marcher command
pub fn execute(args: MarcherArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        MarcherCommand::Add(add_args) => execute_add(add_args),
        MarcherCommand::List(list_args) => execute_list(list_args),
        MarcherCommand::Update(update_args) => execute_update(update_args),
        MarcherCommand::Rm(rm_args) => execute_rm(rm_args),
    }
}

fn execute_add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;

    let draft = NewMarcher {
        name: args.name,
        section: args.section,
        year: args.year,
        notes: None,
        drill_prefix: args.prefix,
        drill_order: args.order,
    };
    let marcher = store.create_marcher(&draft)?;

    println!("✓ Added {} ({})", marcher.drill_number, marcher.id_for_html);
    Ok(())
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = ShowStore::open(&args.db)?;
    let marchers = store.marchers()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&marchers)?);
        return Ok(());
    }

    for marcher in &marchers {
        println!(
            "{:>4}  {:<6} {:<14} {}",
            marcher.id,
            marcher.drill_number,
            marcher.section,
            marcher.name.as_deref().unwrap_or("-"),
        );
    }
    println!("{} marcher(s)", marchers.len());
    Ok(())
}

fn execute_update(args: UpdateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;

    let update = MarcherUpdate {
        name: args.name,
        section: args.section,
        year: args.year,
        notes: args.notes,
        drill_prefix: args.prefix,
        drill_order: args.order,
    };
    let marcher = store.update_marcher(args.id, &update)?;

    println!("✓ Updated {} ({})", marcher.drill_number, marcher.id_for_html);
    Ok(())
}

fn execute_rm(args: RmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ShowStore::open(&args.db)?;
    store.delete_marcher(args.id)?;

    println!("✓ Removed marcher {}", args.id);
    Ok(())
}
