//! CLI argument parsing for nesplay.

use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[command(name = "nesplay")]
#[command(about = "Plays an NES game by turning model decisions into button macros")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Stats file written by the emulator script
    #[arg(long, value_name = "PATH")]
    pub stats_file: Option<String>,

    /// Action file read by the emulator script
    #[arg(long, value_name = "PATH")]
    pub action_file: Option<String>,

    /// Override the configured provider ('console' or 'mock')
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Scripted response for the mock provider; repeat to queue several
    #[arg(long = "mock-response", value_name = "TEXT")]
    pub mock_responses: Vec<String>,

    /// Stop after this many dispatch cycles
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u64>,

    /// Print the macro table and exit
    #[arg(long)]
    pub list_actions: bool,

    /// Start polling immediately instead of waiting for the emulator to settle
    #[arg(long)]
    pub no_startup_delay: bool,
}
