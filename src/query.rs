//! Invocation inputs and their bounds

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::AskError;
use crate::utils::constants::{
    DEFAULT_TIMEOUT_MS, MAX_QUESTION_CHARS, MAX_TIMEOUT_MS, MIN_QUESTION_CHARS, MIN_TIMEOUT_MS,
};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Machine-readable JSON record
    #[serde(alias = "json")]
    Structured,
    /// Human-readable Markdown document
    #[default]
    #[serde(alias = "markdown")]
    Document,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(OutputFormat::Structured),
            "document" | "markdown" => Ok(OutputFormat::Document),
            other => Err(format!(
                "unknown format '{other}' (expected structured|json|document|markdown)"
            )),
        }
    }
}

/// One validated question. Construct with [`Query::new`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    question: String,
    timeout_ms: u64,
    format: OutputFormat,
}

impl Query {
    /// Validate raw inputs. Surrounding whitespace is trimmed before the
    /// length check; `timeout_ms` defaults to 60000.
    pub fn new(question: &str, timeout_ms: Option<u64>, format: OutputFormat) -> Result<Self, AskError> {
        let question = question.trim();
        let chars = question.chars().count();
        if chars == 0 {
            return Err(AskError::validation("question", "cannot be empty"));
        }
        if !(MIN_QUESTION_CHARS..=MAX_QUESTION_CHARS).contains(&chars) {
            return Err(AskError::validation(
                "question",
                format!(
                    "must be between {MIN_QUESTION_CHARS} and {MAX_QUESTION_CHARS} characters (got {chars})"
                ),
            ));
        }

        let timeout_ms = timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
            return Err(AskError::validation(
                "timeout_ms",
                format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} (got {timeout_ms})"),
            ));
        }

        Ok(Self {
            question: question.to_string(),
            timeout_ms,
            format,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Invocation-time toggles; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub headless: bool,
    pub verbose: bool,
}

impl RunOptions {
    /// Log filter for this run when `RUST_LOG` does not say otherwise.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "alcf_mcp=debug,info" } else { "info" }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            headless: true,
            verbose: false,
        }
    }
}

/// ALCF systems the convenience tool knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub enum SystemName {
    Aurora,
    Polaris,
    #[serde(rename = "AI Testbed")]
    AiTestbed,
    Cerebras,
    SambaNova,
    Groq,
}

impl SystemName {
    pub const ALL: [SystemName; 6] = [
        SystemName::Aurora,
        SystemName::Polaris,
        SystemName::AiTestbed,
        SystemName::Cerebras,
        SystemName::SambaNova,
        SystemName::Groq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemName::Aurora => "Aurora",
            SystemName::Polaris => "Polaris",
            SystemName::AiTestbed => "AI Testbed",
            SystemName::Cerebras => "Cerebras",
            SystemName::SambaNova => "SambaNova",
            SystemName::Groq => "Groq",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SystemName::Aurora => "The exascale supercomputer",
            SystemName::Polaris => "GPU-accelerated supercomputer",
            SystemName::AiTestbed => "Collection of AI accelerators",
            SystemName::Cerebras => "Cerebras CS-2 wafer-scale system",
            SystemName::SambaNova => "SambaNova DataScale system",
            SystemName::Groq => "Groq LPU systems",
        }
    }

    /// The canned question sent for this system.
    pub fn question(self) -> String {
        format!(
            "What is {} and what are its key specifications, architecture, and capabilities?",
            self.as_str()
        )
    }
}

impl fmt::Display for SystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemName {
    type Err = AskError;

    /// Case-insensitive; spaces, hyphens and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        SystemName::ALL
            .into_iter()
            .find(|name| name.as_str().replace(' ', "").to_lowercase() == key)
            .ok_or_else(|| {
                let known: Vec<_> = SystemName::ALL.iter().map(|n| n.as_str()).collect();
                AskError::validation(
                    "system_name",
                    format!("'{}' is not a known system (expected one of: {})", s.trim(), known.join(", ")),
                )
            })
    }
}

impl<'de> Deserialize<'de> for SystemName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
