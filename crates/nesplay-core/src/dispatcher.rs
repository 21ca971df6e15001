//! Turns a model response into paced writes on the action channel.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::channel::ActionChannel;
use crate::error::CycleError;
use crate::macro_table::{ActionName, MacroTable};
use crate::response_parser::ResponseParser;

/// Outcome of one dispatch. There is no partial success: a macro either ran
/// every press or failed.
#[derive(Debug)]
pub enum DispatchResult {
    Executed(ActionName),
    Failed(CycleError),
}

impl DispatchResult {
    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchResult::Executed(_))
    }
}

pub struct ActionDispatcher<C: ActionChannel> {
    table: Arc<MacroTable>,
    parser: ResponseParser,
    channel: C,
    press_interval: Duration,
    presses_sent: u64,
}

impl<C: ActionChannel> ActionDispatcher<C> {
    pub fn new(table: Arc<MacroTable>, channel: C, press_interval: Duration) -> Self {
        Self {
            table,
            parser: ResponseParser::new(),
            channel,
            press_interval,
            presses_sent: 0,
        }
    }

    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn table(&self) -> &MacroTable {
        &self.table
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Total primitives written since construction
    pub fn presses_sent(&self) -> u64 {
        self.presses_sent
    }

    /// Parse a raw model response and run the macro it names
    pub async fn dispatch_response(&mut self, raw: &str) -> DispatchResult {
        match self.parser.parse(raw, &self.table) {
            Ok(action) => self.dispatch(&action).await,
            Err(failure) => {
                warn!("Rejected model response {:?}: {}", raw, failure);
                DispatchResult::Failed(failure.into())
            }
        }
    }

    /// Write every primitive of `action` in order, pausing `press_interval`
    /// after each so the emulator sees each press before the next overwrite.
    ///
    /// A write failure aborts the rest of the macro. Nothing is retried.
    pub async fn dispatch(&mut self, action: &ActionName) -> DispatchResult {
        let Some(sequence) = self.table.get(action) else {
            warn!("Macro '{}' not found", action);
            return DispatchResult::Failed(CycleError::UnknownAction(action.to_string()));
        };

        info!("Executing macro '{}': {:?}", action, sequence);

        for (idx, input) in sequence.iter().enumerate() {
            if let Err(e) = self.channel.send(*input).await {
                error!(
                    "Macro '{}' aborted at press {}/{}: {}",
                    action,
                    idx + 1,
                    sequence.len(),
                    e
                );
                return DispatchResult::Failed(CycleError::ChannelWrite(e));
            }
            self.presses_sent += 1;
            tokio::time::sleep(self.press_interval).await;
        }

        DispatchResult::Executed(action.clone())
    }
}
