use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oiplot", version, about = "Interferometry plot range fitting")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List built-in plot definitions
    Presets,
    /// Print a built-in plot definition as JSON
    ShowPreset {
        name: String,
    },
    /// List unit converter keys
    Converters,
    /// Project tables onto a plot definition and print the fitted axes
    Fit {
        /// JSON array of tables
        #[arg(long)]
        tables: PathBuf,
        /// Plot definition file (JSON)
        #[arg(long, conflicts_with = "preset")]
        plot: Option<PathBuf>,
        /// Built-in plot definition name
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        json: bool,
        /// Give axes without a converter the usual one for their column
        #[arg(long)]
        default_converters: bool,
    },
}
