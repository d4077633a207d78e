pub mod constants;
mod errors;
mod wait_for_element;

pub use errors::{AskError, ErrorKind};
pub use wait_for_element::wait_for_element;

/// Shorten text for log lines, on a character boundary.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
