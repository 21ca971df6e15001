use anyhow::Result;
use nesplay_config::{Config, ConfigOverrides, ProviderKind};
use nesplay_core::MacroTable;
use nesplay_providers::{ConsoleProvider, DecisionProvider, MockProvider};
use std::sync::Arc;

use crate::cli_args::Cli;

pub fn overrides_from_cli(cli: &Cli) -> Result<ConfigOverrides> {
    let provider = cli
        .provider
        .as_deref()
        .map(str::parse::<ProviderKind>)
        .transpose()?;

    Ok(ConfigOverrides {
        stats_file: cli.stats_file.clone(),
        action_file: cli.action_file.clone(),
        provider,
        mock_responses: cli.mock_responses.clone(),
        max_cycles: cli.max_cycles,
    })
}

pub fn load_config_with_cli_overrides(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_with_overrides(cli.config.as_deref(), overrides_from_cli(cli)?)?;

    if cli.no_startup_delay {
        config.timing.startup_delay_ms = 0;
    }

    Ok(config)
}

/// The mock provider loops over its responses so a scripted run never starves
pub fn create_provider(config: &Config) -> Arc<dyn DecisionProvider> {
    match config.provider.kind {
        ProviderKind::Console => Arc::new(ConsoleProvider::new()),
        ProviderKind::Mock => Arc::new(MockProvider::looping(&config.provider.mock_responses)),
    }
}

pub fn format_action_list(table: &MacroTable) -> String {
    let mut out = format!("📋 {} actions:\n", table.len());
    for (name, sequence) in table.iter() {
        let inputs: Vec<&str> = sequence.iter().map(|input| input.name()).collect();
        out.push_str(&format!("   • {:<18}{}\n", name.as_str(), inputs.join(", ")));
    }
    out
}

/// Eight hex characters, enough to tell runs apart in a shared log
pub fn short_run_id() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}
