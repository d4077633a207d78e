//! Shared configuration constants for the ALCF tools
//!
//! Default values used across the driver, detector and shaper so the same
//! number never appears twice.

/// Chrome user agent string for stealth mode
///
/// Chrome releases new stable versions ~every 4 weeks.
/// Update quarterly to stay within reasonable version window.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Entry page of the AskALCF assistant.
pub const ASK_ALCF_URL: &str = "https://ask.alcf.anl.gov";

/// Maximum answer size in characters before truncation.
pub const CHARACTER_LIMIT: usize = 25_000;

pub const MIN_QUESTION_CHARS: usize = 5;
pub const MAX_QUESTION_CHARS: usize = 1_000;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const MIN_TIMEOUT_MS: u64 = 10_000;
pub const MAX_TIMEOUT_MS: u64 = 180_000;

pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_GRACE_WINDOW_MS: u64 = 5_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_DEBOUNCE_MS: u64 = 750;
pub const DEFAULT_SETTLE_MS: u64 = 1_000;
