//! Query Orchestrator: the public entry point
//!
//! One call = one validated `Query`, one freshly opened session, one answer.
//! The session is closed on every path before the result is returned.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::Config;
use crate::detector::{CompletionDetector, DetectorConfig, GenerationState};
use crate::driver::{ChatSession, ChromeLauncher, SessionLauncher};
use crate::query::{OutputFormat, Query, RunOptions, SystemName};
use crate::shaper::{ShapedResponse, shape};
use crate::utils::{AskError, preview};

pub struct QueryOrchestrator {
    launcher: Arc<dyn SessionLauncher>,
    config: Arc<Config>,
    options: RunOptions,
}

impl QueryOrchestrator {
    pub fn new(launcher: Arc<dyn SessionLauncher>, config: Arc<Config>, options: RunOptions) -> Self {
        Self {
            launcher,
            config,
            options,
        }
    }

    /// Orchestrator backed by real Chrome sessions.
    pub fn with_chrome(config: Arc<Config>, options: RunOptions) -> Self {
        let launcher = Arc::new(ChromeLauncher::new(config.clone()));
        Self::new(launcher, config, options)
    }

    fn detector_config(&self) -> DetectorConfig {
        self.config.timing.detector()
    }

    /// Ask one question. Validation happens before any browser is launched.
    pub async fn ask(
        &self,
        question: &str,
        timeout_ms: Option<u64>,
        format: OutputFormat,
    ) -> Result<ShapedResponse, AskError> {
        let query = Query::new(question, timeout_ms, format)?;
        self.run(&query).await
    }

    /// Ask the canned question for a known system through the same path as `ask`.
    pub async fn ask_about_system(
        &self,
        system: SystemName,
        format: OutputFormat,
    ) -> Result<ShapedResponse, AskError> {
        self.ask(&system.question(), None, format).await
    }

    /// Drive one session through open → submit → wait → extract → close.
    pub async fn run(&self, query: &Query) -> Result<ShapedResponse, AskError> {
        info!(
            "Asking '{}' (timeout {}ms, format {:?})",
            preview(query.question(), 80),
            query.timeout_ms(),
            query.format()
        );

        let started = Instant::now();
        let mut session = self.launcher.open(self.options.headless).await?;
        let opened = started.elapsed();
        let outcome = self.converse(session.as_mut(), query).await;
        session.close().await;

        if self.options.verbose {
            info!(
                "Session finished in {}ms (open {}ms, ok={})",
                started.elapsed().as_millis(),
                opened.as_millis(),
                outcome.is_ok()
            );
        }

        let raw = outcome?;
        let service = &self.config.service;
        Ok(shape(
            &raw,
            query.question(),
            query.format(),
            &service.source(),
            &service.url,
        ))
    }

    async fn converse(&self, session: &mut dyn ChatSession, query: &Query) -> Result<String, AskError> {
        session.submit(query.question()).await?;

        let mut detector = CompletionDetector::new(self.detector_config());
        match detector.run(&mut *session, query.timeout()).await? {
            GenerationState::Complete => {}
            GenerationState::TimedOut => {
                warn!("Generation still running after {}ms", query.timeout_ms());
                return Err(AskError::Timeout {
                    timeout_ms: query.timeout_ms(),
                });
            }
            other => {
                return Err(AskError::unknown(
                    "waiting for the answer",
                    anyhow::anyhow!("detector stopped in non-terminal state {other:?}"),
                ));
            }
        }

        // let the final markdown block paint before reading it
        let settle: Duration = self.config.timing.settle();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        session.extract_answer(query.question()).await
    }
}
