//! Element polling utility for SPA support
//!
//! Streamlit renders the chat widgets from JavaScript after the load event
//! fires, so the input control has to be polled for rather than queried once.

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use tokio::time::Instant;

/// Wait for any element matching `selector` using exponential backoff polling
///
/// Returns `None` when the timeout elapses without a match; the caller decides
/// how a missing element is classified.
///
/// # Polling Strategy
/// - Starts at 100ms intervals
/// - Doubles each retry, capped at 1 second
/// - Total duration limited by `timeout`
pub async fn wait_for_element(page: &Page, selector: &str, timeout: Duration) -> Option<Element> {
    let start = Instant::now();
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);

    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Some(element);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::debug!(
                "Element not found after {}ms: '{}'",
                timeout.as_millis(),
                selector
            );
            return None;
        }

        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        poll_interval = (poll_interval * 2).min(max_interval);
    }
}
