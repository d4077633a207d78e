//! Page Driver: one automated browsing context per question
//!
//! The orchestrator only sees these traits. `ChromeLauncher` is the real
//! implementation; tests plug in scripted pages.

mod chrome;
mod locators;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use locators::{LOCATOR_VERSION, LocatorSet};

use async_trait::async_trait;

use crate::utils::AskError;

/// Observes the page's "generating" indicator.
#[async_trait]
pub trait GenerationProbe: Send {
    /// `true` while the indicator is visible.
    async fn generating(&mut self) -> Result<bool, AskError>;
}

/// A live, exclusively-owned chat page.
///
/// `close` consumes the session so it cannot be used after teardown.
#[async_trait]
pub trait ChatSession: GenerationProbe {
    /// Type `question` into the chat input and submit it.
    async fn submit(&mut self, question: &str) -> Result<(), AskError>;

    /// Read the rendered answer for `question` once generation finished.
    async fn extract_answer(&mut self, question: &str) -> Result<String, AskError>;

    /// Tear the session down. Best effort: failures are logged by implementors.
    async fn close(self: Box<Self>);
}

/// Opens isolated sessions against the target service.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn open(&self, headless: bool) -> Result<Box<dyn ChatSession>, AskError>;
}
