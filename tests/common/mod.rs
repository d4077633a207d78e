//! Scripted chat pages for driving the orchestrator without a browser.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alcf_mcp::{AskError, ChatSession, Config, GenerationProbe, QueryOrchestrator, RunOptions, SessionLauncher};
use async_trait::async_trait;
use tokio::time::Instant;

/// How the fake page behaves after a question is submitted.
#[derive(Debug, Clone, Copy)]
pub enum PageScript {
    /// Answer is rendered immediately; the indicator never shows.
    Instant,
    /// Indicator visible from submit for the given duration.
    GeneratesFor(Duration),
    /// Indicator never goes away.
    GeneratesForever,
    MissingInput,
    MissingSubmit,
    MissingAnswer,
    /// The service never loads; `open` fails.
    Unreachable,
    /// The indicator check itself fails mid-wait.
    ProbeFails,
}

/// Shared counters so tests can check launch and teardown side effects.
#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub submitted: AtomicUsize,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

pub struct ScriptedLauncher {
    script: PageScript,
    answer: String,
    pub counters: Arc<Counters>,
}

impl ScriptedLauncher {
    pub fn new(script: PageScript) -> Self {
        Self::with_answer(script, "Aurora is an exascale supercomputer at Argonne.")
    }

    pub fn with_answer(script: PageScript, answer: impl Into<String>) -> Self {
        Self {
            script,
            answer: answer.into(),
            counters: Arc::new(Counters::default()),
        }
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn open(&self, _headless: bool) -> Result<Box<dyn ChatSession>, AskError> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        if let PageScript::Unreachable = self.script {
            return Err(AskError::Connection {
                url: "https://ask.alcf.anl.gov".to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(Box::new(ScriptedSession {
            script: self.script,
            answer: self.answer.clone(),
            submitted_at: None,
            counters: self.counters.clone(),
        }))
    }
}

struct ScriptedSession {
    script: PageScript,
    answer: String,
    submitted_at: Option<Instant>,
    counters: Arc<Counters>,
}

fn missing(element: &'static str, locators: &str) -> AskError {
    AskError::PageStructure {
        element,
        locators: locators.to_string(),
        version: alcf_mcp::driver::LOCATOR_VERSION.to_string(),
    }
}

#[async_trait]
impl GenerationProbe for ScriptedSession {
    async fn generating(&mut self) -> Result<bool, AskError> {
        let Some(at) = self.submitted_at else {
            return Ok(false);
        };
        Ok(match self.script {
            PageScript::ProbeFails => {
                return Err(AskError::Unknown {
                    context: "checking the generation indicator".to_string(),
                    source: anyhow::anyhow!("Execution context was destroyed"),
                });
            }
            PageScript::GeneratesFor(len) => at.elapsed() < len,
            PageScript::GeneratesForever => true,
            _ => false,
        })
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn submit(&mut self, _question: &str) -> Result<(), AskError> {
        match self.script {
            PageScript::MissingInput => return Err(missing("chat input", "textarea")),
            PageScript::MissingSubmit => return Err(missing("submit control", "button[kind='primary']")),
            _ => {}
        }
        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        self.submitted_at = Some(Instant::now());
        Ok(())
    }

    async fn extract_answer(&mut self, _question: &str) -> Result<String, AskError> {
        match self.script {
            PageScript::MissingAnswer => Err(missing("answer container", "[data-testid='stMarkdownContainer']")),
            _ => Ok(self.answer.clone()),
        }
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Built-in defaults, with no settle pause so elapsed times are exact.
pub fn test_config() -> Arc<Config> {
    let mut config = Config::default();
    config.timing.settle_ms = 0;
    Arc::new(config)
}

pub fn orchestrator(launcher: ScriptedLauncher) -> (QueryOrchestrator, Arc<Counters>) {
    let counters = launcher.counters.clone();
    let orchestrator = QueryOrchestrator::new(Arc::new(launcher), test_config(), RunOptions::default());
    (orchestrator, counters)
}
