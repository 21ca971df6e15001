//! Interactive provider: the operator plays the model.
//!
//! Prints the decision context and reads one line from stdin as the raw
//! response, so any of the formats the parser understands can be typed or
//! piped in from another program.

use crate::{DecisionProvider, DecisionRequest};
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

pub struct ConsoleProvider {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleProvider {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DecisionProvider for ConsoleProvider {
    async fn decide(&self, request: DecisionRequest) -> Result<String> {
        println!();
        print!("{}", request.context.summary());
        if let Some(frame) = &request.frame {
            println!("Frame: {} ({} bytes)", frame.media_type, frame.decoded_len());
        }
        println!("Response (e.g. {{\"action\": \"TALK\"}} or <action>TALK</action>):");

        let mut lines = self.lines.lock().await;
        match lines.next_line().await? {
            Some(line) => {
                debug!("Console response: {}", line);
                Ok(line)
            }
            None => anyhow::bail!("stdin closed"),
        }
    }

    fn name(&self) -> &str {
        "console"
    }
}
