//! Marchkit CLI
//!
//! Command-line interface for inspecting and editing a drill show file

use clap::{Parser, Subcommand};
use marchkit_core::logging::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "marchkit")]
#[command(about = "Marchkit - Drill show entity store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Marcher operations
    Marcher(commands::marcher::MarcherArgs),
    /// Page operations
    Page(commands::page::PageArgs),
    /// Coordinate operations (one marcher on one page)
    Coords(commands::coords::CoordsArgs),
}

fn main() {
    logging::init(Profile::Development);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Marcher(args) => commands::marcher::execute(args),
        Commands::Page(args) => commands::page::execute(args),
        Commands::Coords(args) => commands::coords::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
