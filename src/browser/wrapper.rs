//! Browser lifecycle for a single chat session
//!
//! Handles launching a chromiumoxide browser with its own profile directory
//! and shutting it down again, so no Chrome process outlives its invocation.

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BrowserError, BrowserResult};
use crate::BrowserConfig;

/// Wrapper for Browser and its event handler task
///
/// Handler MUST be aborted to prevent it running indefinitely after
/// browser is closed. `Drop` aborts it; `shutdown()` is the clean path.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close Chrome, wait for the process to exit, then remove the profile.
    ///
    /// Both `close()` and `wait()` are required: dropping `Browser` alone
    /// leaves a zombie process behind. Failures are logged, never returned,
    /// because shutdown runs on error paths too.
    pub async fn shutdown(mut self) {
        info!("Shutting down session browser");

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }

        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }

        self.cleanup_temp_dir();
    }

    /// Clean up temp directory (blocking operation)
    ///
    /// MUST be called AFTER `browser.wait()` completes to ensure Chrome
    /// has released all file handles. Windows will fail to remove locked files.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();

        // Reached when the invocation future was cancelled before shutdown().
        if let Some(path) = self.user_data_dir.take() {
            warn!(
                "BrowserWrapper dropped without shutdown(); removing {} after abort",
                path.display()
            );
            let _ = std::fs::remove_dir_all(&path);
        }
    }
}

/// Launch a fresh browser for one session
///
/// Every session gets a unique profile directory so concurrent invocations
/// never contend for Chrome's profile lock.
pub async fn launch_session_browser(config: &BrowserConfig, headless: bool) -> BrowserResult<BrowserWrapper> {
    let user_data_dir =
        std::env::temp_dir().join(format!("alcf_mcp_session_{}", uuid::Uuid::new_v4()));

    info!("Launching session browser (headless={})", headless);

    let (browser, handler) = crate::browser_setup::launch_browser(
        headless,
        Some(user_data_dir.clone()),
        config,
    )
    .await
    .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}

/// Create a blank page for stealth injection
///
/// The page must be blank before navigation so launch flags apply before the
/// target document loads.
pub async fn create_blank_page(wrapper: &BrowserWrapper) -> BrowserResult<Page> {
    let page = wrapper
        .browser()
        .new_page("about:blank")
        .await
        .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

    info!("Created blank page");
    Ok(page)
}
