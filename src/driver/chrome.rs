//! chromiumoxide implementation of the Page Driver

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::element::Element;
use tracing::{debug, info, warn};

use super::{ChatSession, GenerationProbe, LocatorSet, SessionLauncher};
use crate::Config;
use crate::browser::{BrowserWrapper, create_blank_page, launch_session_browser};
use crate::utils::{AskError, wait_for_element};

/// Whole lines of page chrome that can border the answer text.
const CHROME_LINES: &[&str] = &["AskALCF", "Send", "Generating answer...", "AskALCF Feedback"];

/// Whole lines that open the page furniture following the answer.
const FOOTER_LINES: &[&str] = &[
    "AskALCF Feedback",
    "Ask a question about ALCF",
    "AskALCF User Documentation",
];

/// Drop page chrome picked up around the answer.
///
/// Only whole lines are matched. Chrome lines are removed at the start and
/// end of the text; a footer line cuts everything from it onwards. Lines in
/// the middle of the answer are never touched.
fn strip_page_chrome(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut lines: Vec<&str> = normalized.split('\n').collect();

    if let Some(footer) = lines.iter().position(|l| FOOTER_LINES.contains(&l.trim())) {
        lines.truncate(footer);
    }

    let is_chrome = |l: &&str| l.trim().is_empty() || CHROME_LINES.contains(&l.trim());
    let start = lines.iter().position(|l| !is_chrome(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_chrome(l)).map_or(start, |i| i + 1);

    lines[start..end].join("\n").trim().to_string()
}

/// Launches one dedicated Chrome per session and opens the chat page in it.
#[derive(Clone)]
pub struct ChromeLauncher {
    config: Arc<Config>,
}

impl ChromeLauncher {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn open(&self, headless: bool) -> Result<Box<dyn ChatSession>, AskError> {
        let wrapper = launch_session_browser(&self.config.browser, headless).await?;

        let page = match create_blank_page(&wrapper).await {
            Ok(page) => page,
            Err(e) => {
                wrapper.shutdown().await;
                return Err(e.into());
            }
        };

        let locators = &self.config.locators;
        let session = ChromeSession {
            wrapper,
            page,
            indicator_js: locators.indicator_probe_js(),
            locators: locators.clone(),
            element_timeout: self.config.timing.element_timeout(),
        };

        let url = self.config.service.url.as_str();
        if let Err(e) = session
            .navigate(url, self.config.timing.navigation_timeout())
            .await
        {
            Box::new(session).close().await;
            return Err(e);
        }

        Ok(Box::new(session))
    }
}

/// A chat page inside a browser owned by nobody else.
pub struct ChromeSession {
    wrapper: BrowserWrapper,
    page: Page,
    locators: LocatorSet,
    indicator_js: String,
    element_timeout: Duration,
}

impl ChromeSession {
    async fn navigate(&self, url: &str, budget: Duration) -> Result<(), AskError> {
        info!("Navigating to {} (budget {}ms)", url, budget.as_millis());

        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(budget, load).await {
            Ok(Ok(())) => {
                debug!("Page load complete");
                Ok(())
            }
            Ok(Err(e)) => Err(AskError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(AskError::Connection {
                url: url.to_string(),
                reason: format!("page did not finish loading within {}ms", budget.as_millis()),
            }),
        }
    }

    fn missing(&self, element: &'static str, locators: String) -> AskError {
        AskError::PageStructure {
            element,
            locators,
            version: self.locators.version.clone(),
        }
    }

    /// Focus the input by clicking its centre; `Element::focus` can hang on
    /// pages that use IntersectionObserver.
    async fn focus(&self, input: &Element) -> Result<(), AskError> {
        input
            .scroll_into_view()
            .await
            .map_err(|e| AskError::unknown("scrolling the chat input into view", e))?;
        let point = input
            .clickable_point()
            .await
            .map_err(|e| AskError::unknown("locating the chat input on screen", e))?;
        self.page
            .click(point)
            .await
            .map_err(|e| AskError::unknown("focusing the chat input", e))?;
        Ok(())
    }

    async fn click_submit(&self) -> Option<&str> {
        for selector in &self.locators.submit {
            let Ok(button) = self.page.find_element(selector.as_str()).await else {
                debug!("Submit locator did not match: {}", selector);
                continue;
            };
            match button.click().await {
                Ok(_) => return Some(selector.as_str()),
                Err(e) => debug!("Submit control '{}' not clickable: {}", selector, e),
            }
        }
        None
    }
}

#[async_trait]
impl GenerationProbe for ChromeSession {
    async fn generating(&mut self) -> Result<bool, AskError> {
        self.page
            .evaluate(self.indicator_js.as_str())
            .await
            .map_err(|e| AskError::unknown("checking the generation indicator", e))?
            .into_value::<bool>()
            .map_err(|e| AskError::unknown("reading the generation indicator", e))
    }
}

#[async_trait]
impl ChatSession for ChromeSession {
    async fn submit(&mut self, question: &str) -> Result<(), AskError> {
        let group = self.locators.input_group();
        let Some(input) = wait_for_element(&self.page, &group, self.element_timeout).await else {
            return Err(self.missing("chat input", group));
        };

        self.focus(&input).await?;
        input
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| AskError::unknown("clearing the chat input", e))?;
        input
            .type_str(question)
            .await
            .map_err(|e| AskError::unknown("typing the question", e))?;

        if let Some(selector) = self.click_submit().await {
            info!("Question submitted via '{}'", selector);
            return Ok(());
        }

        if !self.locators.enter_submits {
            return Err(self.missing("submit control", self.locators.submit.join(", ")));
        }

        input
            .press_key("Enter")
            .await
            .map_err(|e| AskError::unknown("pressing Enter in the chat input", e))?;
        info!("Question submitted via Enter");
        Ok(())
    }

    async fn extract_answer(&mut self, question: &str) -> Result<String, AskError> {
        let group = self.locators.answer_group();
        let mut containers = self
            .page
            .find_elements(group.as_str())
            .await
            .map_err(|e| AskError::unknown("querying answer containers", e))?;

        debug!("Found {} chat message container(s)", containers.len());
        let Some(last) = containers.pop() else {
            return Err(self.missing("answer container", group));
        };

        let mut text = last
            .inner_text()
            .await
            .map_err(|e| AskError::unknown("reading the answer text", e))?
            .unwrap_or_default();

        // innerText is empty for some lazily-painted Streamlit blocks
        if text.trim().is_empty() {
            let html = last
                .inner_html()
                .await
                .map_err(|e| AskError::unknown("reading the answer markup", e))?
                .unwrap_or_default();
            text = html2md::parse_html(&html);
        }

        let answer = strip_page_chrome(&text);
        if answer.is_empty() || answer == question.trim() {
            return Err(self.missing("answer container", group));
        }

        info!("Answer extracted ({} characters)", answer.chars().count());
        Ok(answer)
    }

    async fn close(self: Box<Self>) {
        let ChromeSession { wrapper, page, .. } = *self;
        if let Err(e) = page.close().await {
            warn!("Failed to close chat page: {}", e);
        }
        wrapper.shutdown().await;
    }
}
