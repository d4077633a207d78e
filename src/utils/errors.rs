use serde::Serialize;
use thiserror::Error;

use crate::browser::BrowserError;

/// The five failure kinds an invocation can end in.
///
/// Exactly one is reported per failed call; none of them is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    ConnectionError,
    TimeoutError,
    PageStructureError,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::TimeoutError => "timeout_error",
            ErrorKind::PageStructureError => "page_structure_error",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of one question/answer invocation.
///
/// Every message names its kind and ends with one concrete remediation.
#[derive(Error, Debug)]
pub enum AskError {
    #[error("Validation error: {field} {reason}. Adjust the argument and call again.")]
    Validation { field: &'static str, reason: String },

    #[error(
        "Connection error: could not load {url} ({reason}). \
         Check your internet connection and verify that the site is reachable."
    )]
    Connection { url: String, reason: String },

    #[error(
        "Timeout error: the answer was still being generated after {timeout_ms}ms. \
         Increase timeout_ms (maximum 180000) or try again later."
    )]
    Timeout { timeout_ms: u64 },

    #[error(
        "Page structure error: {element} not found (locators `{locators}`, contract {version}). \
         The page layout may have changed; report this structural drift to the server maintainer."
    )]
    PageStructure {
        element: &'static str,
        locators: String,
        version: String,
    },

    #[error("Unknown error while {context}: {source:#}. Re-run with --verbose and report the failure.")]
    Unknown {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AskError::Validation { .. } => ErrorKind::ValidationError,
            AskError::Connection { .. } => ErrorKind::ConnectionError,
            AskError::Timeout { .. } => ErrorKind::TimeoutError,
            AskError::PageStructure { .. } => ErrorKind::PageStructureError,
            AskError::Unknown { .. } => ErrorKind::UnknownError,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AskError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AskError::Unknown {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Browser-layer failures are unexpected by definition; navigation failures
/// are classified at the call site instead.
impl From<BrowserError> for AskError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::LaunchFailed(_) => AskError::Unknown {
                context: "launching the browser (install Chrome/Chromium or set CHROMIUM_PATH)"
                    .to_string(),
                source: anyhow::Error::new(err),
            },
            other => AskError::unknown("opening the chat page", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_kind_and_remediation() {
        let timeout = AskError::Timeout { timeout_ms: 10_000 };
        assert_eq!(timeout.kind(), ErrorKind::TimeoutError);
        let msg = timeout.to_string();
        assert!(msg.starts_with("Timeout error"));
        assert!(msg.contains("Increase timeout_ms"));

        let drift = AskError::PageStructure {
            element: "chat input",
            locators: "textarea".into(),
            version: "2025-01".into(),
        };
        assert!(drift.to_string().contains("structural drift"));

        let conn = AskError::Connection {
            url: "https://ask.alcf.anl.gov".into(),
            reason: "net::ERR_NAME_NOT_RESOLVED".into(),
        };
        assert_eq!(conn.kind().as_str(), "connection_error");
        assert!(conn.to_string().contains("internet connection"));
    }

    #[test]
    fn launch_failures_classify_as_unknown() {
        let err: AskError = BrowserError::LaunchFailed("no chrome".into()).into();
        assert_eq!(err.kind(), ErrorKind::UnknownError);
        assert!(err.to_string().contains("CHROMIUM_PATH"));
    }
}
