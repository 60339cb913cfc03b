//! CLI argument parsing

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// WellnessZ prediction gateway
#[derive(Parser, Debug)]
#[command(name = "wellnessz-gateway")]
#[command(version)]
#[command(about = "Request-orchestration gateway for the WellnessZ prediction engine", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of console output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve(ServeArgs),

    /// Score every row of a client CSV file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Load the CSV dataset before accepting requests
    #[arg(long)]
    pub preload_dataset: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// CSV file with one client per row
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the scored rows to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
