use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locations searched, in order, when no explicit config path is given.
const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "./nesplay.toml",
    "~/.config/nesplay/config.toml",
    "~/.nesplay.toml",
];

/// Directory the emulator-side Lua script writes to (Mesen 2 on macOS).
const DEFAULT_SCRIPT_DATA_DIR: &str = "~/Library/Application Support/Mesen2/LuaScriptData/dq1";

/// Largest history window accepted by validation.
pub const MAX_HISTORY_CAPACITY: usize = 100;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub input: InputConfig,
    /// Action name to primitive token sequence. A `[macros]` table in the
    /// config file replaces the built-in table entirely.
    #[serde(default = "default_macros")]
    pub macros: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            timing: TimingConfig::default(),
            agent: AgentConfig::default(),
            provider: ProviderConfig::default(),
            input: InputConfig::default(),
            macros: default_macros(),
        }
    }
}

/// Files shared with the emulator process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// `key=value` stats file written by the emulator script
    pub stats_file: String,
    /// Single-slot action file read by the emulator script
    pub action_file: String,
    /// Optional screenshot attached to every decision request
    pub screenshot_file: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            stats_file: format!("{}/dq1_stats.txt", DEFAULT_SCRIPT_DATA_DIR),
            action_file: format!("{}/action.txt", DEFAULT_SCRIPT_DATA_DIR),
            screenshot_file: None,
        }
    }
}

impl PathsConfig {
    pub fn stats_path(&self) -> PathBuf {
        expand(&self.stats_file)
    }

    pub fn action_path(&self) -> PathBuf {
        expand(&self.action_file)
    }

    pub fn screenshot_path(&self) -> Option<PathBuf> {
        self.screenshot_file.as_deref().map(expand)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after each primitive so the emulator can observe it before the next overwrite
    pub press_interval_ms: u64,
    /// Pause after every dispatch cycle
    pub cycle_delay_ms: u64,
    /// Pause before re-checking a stats file that is not ready
    pub poll_interval_ms: u64,
    /// Pause before the first cycle
    pub startup_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            press_interval_ms: 200,
            cycle_delay_ms: 5000,
            poll_interval_ms: 1000,
            startup_delay_ms: 3000,
        }
    }
}

impl TimingConfig {
    pub fn press_interval(&self) -> Duration {
        Duration::from_millis(self.press_interval_ms)
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of recent cycles kept as decision context
    pub history_capacity: usize,
    /// Action dispatched when the provider fails to answer
    pub fallback_action: Option<String>,
    /// Stop after this many dispatch cycles (runs forever when unset)
    pub max_cycles: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_capacity: 3,
            fallback_action: Some("EXIT_MENU".to_string()),
            max_cycles: None,
        }
    }
}

/// Which decision provider answers each cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// An operator types the model response on stdin
    #[default]
    Console,
    /// Replays `mock_responses` in order
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" => Ok(ProviderKind::Console),
            "mock" => Ok(ProviderKind::Mock),
            other => anyhow::bail!("Unknown provider '{}'. Valid providers: console, mock", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Raw responses replayed by the mock provider
    pub mock_responses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InputConfig {
    /// Overrides of the token written to the action file, keyed by primitive
    /// name (e.g. `confirm = "a"`).
    pub tokens: BTreeMap<String, String>,
}

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub stats_file: Option<String>,
    pub action_file: Option<String>,
    pub provider: Option<ProviderKind>,
    pub mock_responses: Vec<String>,
    pub max_cycles: Option<u64>,
}

/// The Dragon Quest 1 (NES) macro table.
///
/// Field-menu macros assume the command window is closed and open it with
/// `confirm`; battle macros assume the battle menu is already open.
pub fn default_macros() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("MOVE_UP", &["up"]),
        ("MOVE_DOWN", &["down"]),
        ("MOVE_LEFT", &["left"]),
        ("MOVE_RIGHT", &["right"]),
        ("EXIT_MENU", &["cancel"]),
        ("TALK", &["confirm", "confirm"]),
        ("CHECK_STATUS", &["confirm", "down", "confirm"]),
        ("GO_STAIRS", &["confirm", "down", "down", "confirm"]),
        ("SEARCH", &["confirm", "down", "down", "down", "confirm"]),
        ("OPEN_SPELL_MENU", &["confirm", "right", "confirm"]),
        ("OPEN_ITEM_MENU", &["confirm", "down", "right", "confirm"]),
        ("OPEN_DOOR", &["confirm", "down", "down", "right", "confirm"]),
        (
            "TAKE_TREASURE",
            &["confirm", "down", "down", "down", "right", "confirm"],
        ),
        ("BATTLE_FIGHT", &["confirm"]),
        ("BATTLE_RUN", &["right", "right", "confirm"]),
        ("BATTLE_SPELL", &["right", "confirm"]),
        ("BATTLE_ITEM", &["right", "right", "right", "confirm"]),
    ];

    table
        .iter()
        .map(|(name, seq)| {
            (
                name.to_string(),
                seq.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                anyhow::bail!("Configuration file '{}' does not exist", path);
            }
            return Self::load_from_file(path);
        }

        let found = DEFAULT_CONFIG_PATHS.iter().find_map(|path| {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                Some(expanded_path.to_string())
            } else {
                None
            }
        });

        if let Some(path) = found {
            return Self::load_from_file(&path);
        }

        // No config anywhere: write the defaults so there is something to edit
        let default_config = Self::default();

        let config_dir = dirs::home_dir()
            .map(|mut path| {
                path.push(".config");
                path.push("nesplay");
                path
            })
            .unwrap_or_else(|| PathBuf::from("."));

        std::fs::create_dir_all(&config_dir).ok();

        let config_file = config_dir.join("config.toml");
        if let Err(e) = default_config.save(&config_file) {
            eprintln!("Warning: Could not save default config: {}", e);
        } else {
            println!(
                "Created default configuration at: {}",
                config_file.display()
            );
        }

        Ok(default_config)
    }

    fn load_from_file(path: &str) -> Result<Self> {
        let config_content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the agent cannot run with.
    ///
    /// Primitive tokens are checked later, when the macro table is built.
    pub fn validate(&self) -> Result<()> {
        if self.agent.history_capacity == 0 || self.agent.history_capacity > MAX_HISTORY_CAPACITY {
            anyhow::bail!(
                "agent.history_capacity must be between 1 and {}, got {}",
                MAX_HISTORY_CAPACITY,
                self.agent.history_capacity
            );
        }

        if self.timing.poll_interval_ms == 0 {
            anyhow::bail!("timing.poll_interval_ms must be greater than zero");
        }

        if self.macros.is_empty() {
            anyhow::bail!("The [macros] table is empty; at least one action is required");
        }

        if let Some((name, _)) = self.macros.iter().find(|(_, seq)| seq.is_empty()) {
            anyhow::bail!("Macro '{}' has an empty input sequence", name);
        }

        if let Some(fallback) = &self.agent.fallback_action {
            if !self.has_macro(fallback) {
                anyhow::bail!(
                    "agent.fallback_action '{}' is not defined in [macros]. Available: {:?}",
                    fallback,
                    self.macros.keys().collect::<Vec<_>>()
                );
            }
        }

        if self.provider.kind == ProviderKind::Mock && self.provider.mock_responses.is_empty() {
            anyhow::bail!("provider.kind = \"mock\" requires at least one entry in provider.mock_responses");
        }

        Ok(())
    }

    /// Case-insensitive check for a macro name
    pub fn has_macro(&self, name: &str) -> bool {
        let wanted = name.trim().to_uppercase();
        self.macros.keys().any(|key| key.trim().to_uppercase() == wanted)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn load_with_overrides(config_path: Option<&str>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = Self::load(config_path)?;
        config.apply_overrides(overrides)?;
        Ok(config)
    }

    /// Apply command-line overrides and re-validate the result
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(stats_file) = overrides.stats_file {
            self.paths.stats_file = stats_file;
        }
        if let Some(action_file) = overrides.action_file {
            self.paths.action_file = action_file;
        }
        if !overrides.mock_responses.is_empty() {
            self.provider.mock_responses = overrides.mock_responses;
            // Responses on the command line only make sense for the mock provider
            if overrides.provider.is_none() {
                self.provider.kind = ProviderKind::Mock;
            }
        }
        if let Some(provider) = overrides.provider {
            self.provider.kind = provider;
        }
        if overrides.max_cycles.is_some() {
            self.agent.max_cycles = overrides.max_cycles;
        }

        self.validate()
    }
}

#[cfg(test)]
mod tests;
