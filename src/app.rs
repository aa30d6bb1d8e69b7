// src/app.rs
use std::collections::VecDeque;

use matchday_config::MatchdayConfig;
use matchday_core::{AskRequest, ChatTurn, MatchdayError, MatchdayResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::commands::{Command, HELP_TEXT};
use crate::pipeline::QueryPipeline;

/// Interactive front end: one question per line, JSON answer per line.
pub struct MatchdayApp {
    pipeline: QueryPipeline,
    history: VecDeque<ChatTurn>,
    max_history_turns: usize,
}

impl MatchdayApp {
    pub async fn new(config: MatchdayConfig) -> MatchdayResult<Self> {
        info!("Initializing matchday components...");

        let pipeline = QueryPipeline::from_config(&config, None).await?;

        Ok(Self::with_pipeline(pipeline, config.app.max_history_turns))
    }

    pub fn with_pipeline(pipeline: QueryPipeline, max_history_turns: usize) -> Self {
        Self {
            pipeline,
            history: VecDeque::new(),
            max_history_turns,
        }
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    pub fn history(&self) -> &VecDeque<ChatTurn> {
        &self.history
    }

    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> MatchdayResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        write_line(&mut output, HELP_TEXT).await?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            match self.handle(Command::parse(&line)).await? {
                Some(reply) => write_line(&mut output, &reply).await?,
                None => break,
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Executes one command; `None` ends the session.
    pub async fn handle(&mut self, command: Command) -> MatchdayResult<Option<String>> {
        let reply = match command {
            Command::Ask(message) => {
                let request = AskRequest::new(message.clone())
                    .with_history(self.history.iter().cloned().collect());
                let response = self.pipeline.ask(request).await;

                self.remember(ChatTurn::user(message));
                self.remember(ChatTurn::assistant(response.answer.clone()));
                to_json(&response)?
            }
            Command::Health => to_json(&self.pipeline.health())?,
            Command::Stats => {
                let metrics = self.pipeline.metrics();
                let mut stats = to_json(&metrics.summary())?;
                stats.push('\n');
                stats.push_str(&to_json(&metrics.latency())?);
                stats
            }
            Command::Metrics => {
                let text = self.pipeline.metrics().get_prometheus_metrics();
                if text.is_empty() {
                    "Metrics export is disabled".to_string()
                } else {
                    text.trim_end().to_string()
                }
            }
            Command::Reset => {
                self.history.clear();
                "History cleared".to_string()
            }
            Command::Refresh => match self.pipeline.refresh_catalog().await {
                Ok(size) => format!("Catalog refreshed: {} names", size),
                Err(e) => {
                    warn!("Catalog refresh failed: {}", e);
                    format!("Catalog refresh failed: {}", e)
                }
            },
            Command::Quit => return Ok(None),
            Command::Unknown(line) => format!("Unknown command {}. {}", line, HELP_TEXT),
        };
        Ok(Some(reply))
    }

    fn remember(&mut self, turn: ChatTurn) {
        self.history.push_back(turn);
        while self.history.len() > self.max_history_turns {
            self.history.pop_front();
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> MatchdayResult<String> {
    Ok(serde_json::to_string(value)?)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> MatchdayResult<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await.map_err(MatchdayError::from)
}
