//! The decision loop: read state, ask the provider, dispatch, remember.

use anyhow::{Context, Result};
use nesplay_config::{Config, TimingConfig};
use nesplay_providers::{DecisionContext, DecisionProvider, DecisionRequest};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::channel::{ActionChannel, FileActionChannel};
use crate::dispatcher::{ActionDispatcher, DispatchResult};
use crate::error::CycleError;
use crate::frame::FrameSource;
use crate::game_state::StatsFile;
use crate::history::{ActionHistory, HistoryEntry};
use crate::macro_table::{ActionName, MacroTable};
use crate::primitive::InputVocabulary;
use crate::stats::SessionStats;

/// What a single call to [`Agent::run_cycle`] did
#[derive(Debug)]
pub enum CycleOutcome {
    /// Game state was not available; nothing was asked or written
    Waiting(CycleError),
    Executed(ActionName),
    Failed(CycleError),
}

impl CycleOutcome {
    pub fn is_waiting(&self) -> bool {
        matches!(self, CycleOutcome::Waiting(_))
    }
}

pub struct Agent<C: ActionChannel> {
    stats_file: StatsFile,
    frames: FrameSource,
    provider: Arc<dyn DecisionProvider>,
    dispatcher: ActionDispatcher<C>,
    history: ActionHistory,
    stats: SessionStats,
    fallback: Option<ActionName>,
    timing: TimingConfig,
    waiting: bool,
}

impl Agent<FileActionChannel> {
    /// Agent writing to the configured action file
    pub fn from_config(config: &Config, provider: Arc<dyn DecisionProvider>) -> Result<Self> {
        let vocabulary = InputVocabulary::with_overrides(&config.input.tokens)
            .context("Invalid [input.tokens] configuration")?;
        let channel = FileActionChannel::new(config.paths.action_path(), vocabulary);
        Self::new(config, provider, channel)
    }
}

impl<C: ActionChannel> Agent<C> {
    pub fn new(config: &Config, provider: Arc<dyn DecisionProvider>, channel: C) -> Result<Self> {
        let table = MacroTable::from_config(&config.macros).context("Invalid [macros] configuration")?;

        let fallback = match &config.agent.fallback_action {
            Some(name) => {
                let action = ActionName::new(name);
                if !table.contains(&action) {
                    anyhow::bail!("Fallback action '{}' is not in the macro table", action);
                }
                Some(action)
            }
            None => None,
        };

        info!(
            "Agent ready: {} macros, provider '{}', stats {:?}",
            table.len(),
            provider.name(),
            config.paths.stats_path()
        );

        Ok(Self {
            stats_file: StatsFile::new(config.paths.stats_path()),
            frames: FrameSource::new(config.paths.screenshot_path()),
            provider,
            dispatcher: ActionDispatcher::new(
                Arc::new(table),
                channel,
                config.timing.press_interval(),
            ),
            history: ActionHistory::new(config.agent.history_capacity),
            stats: SessionStats::new(),
            fallback,
            timing: config.timing.clone(),
            waiting: false,
        })
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn table(&self) -> &MacroTable {
        self.dispatcher.table()
    }

    pub fn channel(&self) -> &C {
        self.dispatcher.channel()
    }

    pub fn presses_sent(&self) -> u64 {
        self.dispatcher.presses_sent()
    }

    /// Session summary including the inputs written so far
    pub fn summary(&self) -> String {
        self.stats.format(self.dispatcher.presses_sent())
    }

    /// Run one cycle. Never fails: every error ends up in the outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let state = match self.stats_file.read().await {
            Ok(state) => state,
            Err(e) => {
                let error = CycleError::from(e);
                if self.waiting {
                    debug!("Still waiting: {}", error);
                } else {
                    info!("Waiting for game state: {}", error);
                }
                self.waiting = true;
                let outcome = CycleOutcome::Waiting(error);
                self.stats.record(&outcome);
                return outcome;
            }
        };
        self.waiting = false;

        let context = DecisionContext {
            game_state: state.values().clone(),
            history: self.history.snapshot(),
            available_actions: self.table().names().map(|n| n.to_string()).collect(),
        };
        let request = DecisionRequest::new(context).with_frame(self.frames.capture().await);

        let result = match self.provider.decide(request).await {
            Ok(raw) => {
                debug!("Provider '{}' answered: {:?}", self.provider.name(), raw);
                self.dispatcher.dispatch_response(&raw).await
            }
            Err(e) => {
                warn!("Provider '{}' failed: {:#}", self.provider.name(), e);
                match self.fallback.clone() {
                    Some(action) => {
                        info!("Falling back to '{}'", action);
                        self.stats.record_fallback();
                        self.dispatcher.dispatch(&action).await
                    }
                    None => DispatchResult::Failed(CycleError::Provider(format!("{:#}", e))),
                }
            }
        };

        let (entry, outcome) = match result {
            DispatchResult::Executed(action) => (
                HistoryEntry::executed(&action, &state),
                CycleOutcome::Executed(action),
            ),
            DispatchResult::Failed(error) => {
                (HistoryEntry::failed(&error), CycleOutcome::Failed(error))
            }
        };

        self.history.push(entry);
        self.stats.record(&outcome);
        outcome
    }

    /// Loop until `max_cycles` dispatch cycles have completed, or forever.
    /// Returns the number of dispatch cycles completed.
    pub async fn run(&mut self, max_cycles: Option<u64>) -> u64 {
        self.run_until(max_cycles, std::future::pending()).await
    }

    /// Like [`Agent::run`], but also stops once `shutdown` resolves.
    ///
    /// `shutdown` is only observed between cycles and during waits, so a macro
    /// that has started is always written to the end.
    pub async fn run_until<F>(&mut self, max_cycles: Option<u64>, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let startup = self.timing.startup_delay();
        if !startup.is_zero() {
            info!("Starting in {:?}", startup);
            if Self::pause(startup, shutdown.as_mut()).await {
                info!("Shutdown requested before the first cycle");
                return 0;
            }
        }

        let mut completed = 0u64;
        while max_cycles.map_or(true, |max| completed < max) {
            if Self::pause(Duration::ZERO, shutdown.as_mut()).await {
                info!("Shutdown requested");
                break;
            }

            let delay = if self.run_cycle().await.is_waiting() {
                self.timing.poll_interval()
            } else {
                completed += 1;
                if max_cycles.is_some_and(|max| completed >= max) {
                    break;
                }
                self.timing.cycle_delay()
            };

            if Self::pause(delay, shutdown.as_mut()).await {
                info!("Shutdown requested");
                break;
            }
        }

        info!("Stopped after {} cycles", completed);
        completed
    }

    /// Sleep for `duration`; true if `shutdown` resolved first
    async fn pause<F: Future<Output = ()>>(duration: Duration, shutdown: Pin<&mut F>) -> bool {
        tokio::select! {
            biased;
            _ = shutdown => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}
