use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "subsync")]
#[command(about = "Sync active subscription orders into a Google Sheet")]
pub struct CliArgs {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "subsync.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log CPU and memory usage per stage (overrides the config file)
    #[arg(long)]
    pub monitor: Option<bool>,

    /// Fetch and shape the data, print the sheet as CSV instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}
