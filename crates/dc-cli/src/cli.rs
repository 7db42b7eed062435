//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use dc_check::sql::seconds;
use dc_core::{LoadMode, PrintFormat};
use std::path::PathBuf;

/// data_check - run SQL queries and compare them with expected results
#[derive(Parser, Debug)]
#[command(name = "data_check")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to start searching for data_check.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Use this config file instead of searching for one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Connection name from data_check.yml
    #[arg(short, long, global = true)]
    pub connection: Option<String>,

    /// Number of checks run in parallel
    #[arg(short = 'n', long, global = true)]
    pub workers: Option<usize>,

    /// Print error chains for failed checks
    #[arg(long, global = true)]
    pub traceback: bool,

    /// Diff format: pandas, csv or json
    #[arg(long, global = true)]
    pub print_format: Option<PrintFormat>,

    /// Append results to this log file
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run checks (default: the configured checks directory)
    Run(RunArgs),

    /// Write expectation CSV files from query results
    Gen(GenArgs),

    /// Load CSV or spreadsheet files into tables
    Load(LoadArgs),

    /// Run a query or SQL files
    Sql(SqlArgs),

    /// Test the database connection
    Ping(PingArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Check files or directories
    pub paths: Vec<PathBuf>,
}

/// Arguments for the gen command
#[derive(Args, Debug)]
pub struct GenArgs {
    /// SQL files or directories
    pub paths: Vec<PathBuf>,

    /// Overwrite existing expectation files
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Files or directories; each file loads into the table named by its stem
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Target table, only with a single file
    #[arg(short, long)]
    pub table: Option<String>,

    /// truncate, append, replace or upsert (default from config)
    #[arg(short, long)]
    pub mode: Option<LoadMode>,
}

/// Arguments for the sql command
#[derive(Args, Debug)]
pub struct SqlArgs {
    /// Query or statement to run
    #[arg(conflicts_with = "files", required_unless_present = "files")]
    pub query: Option<String>,

    /// SQL files to run instead of a query
    #[arg(short, long = "file", num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Write the query result to this CSV file
    #[arg(short, long, requires = "query")]
    pub output: Option<PathBuf>,

    /// Save the query and its result as a new check
    #[arg(short = 'W', long, requires = "query")]
    pub write_check: Option<PathBuf>,
}

/// Arguments for the ping command
#[derive(Args, Debug)]
pub struct PingArgs {
    /// Retry until the connection succeeds or the timeout expires
    #[arg(short, long)]
    pub wait: bool,

    /// Seconds to keep retrying with --wait
    #[arg(long, default_value_t = 5.0, value_parser = parse_seconds)]
    pub timeout: f64,

    /// Seconds between attempts
    #[arg(long, default_value_t = 1.0, value_parser = parse_seconds)]
    pub retry: f64,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    match seconds(value) {
        Some(_) => Ok(value),
        None => Err("expected a finite, non-negative number of seconds".to_string()),
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
