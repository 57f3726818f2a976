use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "casediff",
    about = "Compare model namelists across simulation cases",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory from the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show which components have data and for which cases
    Catalog,
    /// Compare one component across 2-4 cases
    Compare(CompareArgs),
    /// Parse a namelist or MOM parameter file into JSON
    Parse(ParseArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    /// Component tag: atm, lnd, ice or ocn
    pub component: String,
    /// Case ids, in column order
    #[arg(required = true, num_args = 1..)]
    pub cases: Vec<String>,
    /// Show only keys whose values differ
    #[arg(long)]
    pub only_diff: bool,
}

#[derive(Args)]
pub struct ParseArgs {
    pub file: PathBuf,
    /// Treat the file as MOM_input / MOM_override
    #[arg(long)]
    pub mom: bool,
}
