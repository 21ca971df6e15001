//! nesplay CLI - runs the decision loop against a live emulator.

mod cli_args;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing::{info, info_span, warn, Instrument};

use nesplay_core::{Agent, MacroTable};

pub use cli_args::Cli;
use utils::{create_provider, format_action_list, load_config_with_cli_overrides, short_run_id};

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli);

    let config = load_config_with_cli_overrides(&cli)?;

    if cli.list_actions {
        let table = MacroTable::from_config(&config.macros)?;
        print!("{}", format_action_list(&table));
        return Ok(());
    }

    let provider = create_provider(&config);
    let mut agent = Agent::from_config(&config, provider)?;
    let max_cycles = config.agent.max_cycles;

    let span = info_span!("run", id = %short_run_id());
    info!(parent: &span, "Stats: {:?}", config.paths.stats_path());
    info!(parent: &span, "Actions: {:?}", config.paths.action_path());

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => println!("\n⚠️  Stopping after the current cycle (Ctrl+C)"),
            Err(e) => {
                warn!("Ctrl+C handler unavailable: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    let completed = agent.run_until(max_cycles, shutdown).instrument(span).await;
    info!("Finished {} cycles", completed);

    print!("{}", agent.summary());
    Ok(())
}

fn initialize_logging(cli: &Cli) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in [
        "nesplay",
        "nesplay_cli",
        "nesplay_core",
        "nesplay_config",
        "nesplay_providers",
    ] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
