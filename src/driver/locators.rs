//! Fixed, versioned element-location contract for the AskALCF chat page
//!
//! The driver tolerates different answer *content*, never different markup:
//! when none of these locators match, the call fails with a page-structure
//! error instead of guessing.

use serde::{Deserialize, Serialize};

pub const LOCATOR_VERSION: &str = "2025-01";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocatorSet {
    #[serde(default = "default_version")]
    pub version: String,

    /// Chat input control, tried as one CSS selector group
    #[serde(default = "default_input")]
    pub input: Vec<String>,

    /// Submit controls, tried in order
    #[serde(default = "default_submit")]
    pub submit: Vec<String>,

    /// Pressing Enter in the input is an accepted submission path
    #[serde(default = "default_enter_submits")]
    pub enter_submits: bool,

    /// Visible text of the generation indicator, matched case-insensitively
    #[serde(default = "default_indicator_text")]
    pub indicator_text: String,

    /// Chat message containers; the last match holds the answer
    #[serde(default = "default_answer")]
    pub answer: Vec<String>,
}

fn default_version() -> String {
    LOCATOR_VERSION.to_string()
}

fn default_input() -> Vec<String> {
    [
        r#"textarea[data-testid="stChatInputTextArea"]"#,
        r#"textarea[placeholder*="Ask"]"#,
        r#"input[placeholder*="Ask"]"#,
        r#"textarea[data-testid*="chatInput"]"#,
        r#"input[data-testid*="chatInput"]"#,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_submit() -> Vec<String> {
    [
        r#"button[data-testid="stChatInputSubmitButton"]"#,
        r#"button[kind="primary"]"#,
        r#"button[type="submit"]"#,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_enter_submits() -> bool {
    true
}

fn default_indicator_text() -> String {
    "Generating answer".to_string()
}

fn default_answer() -> Vec<String> {
    vec![r#"[data-testid="stChatMessage"]"#.to_string()]
}

impl Default for LocatorSet {
    fn default() -> Self {
        Self {
            version: default_version(),
            input: default_input(),
            submit: default_submit(),
            enter_submits: default_enter_submits(),
            indicator_text: default_indicator_text(),
            answer: default_answer(),
        }
    }
}

impl LocatorSet {
    pub fn input_group(&self) -> String {
        self.input.join(", ")
    }

    pub fn answer_group(&self) -> String {
        self.answer.join(", ")
    }

    /// JavaScript expression that is `true` while the indicator text is visible.
    pub fn indicator_probe_js(&self) -> String {
        // serde_json string encoding doubles as JS string-literal escaping
        let needle = serde_json::to_string(&self.indicator_text.to_lowercase())
            .unwrap_or_else(|_| "\"\"".to_string());
        format!(
            r#"(() => {{
    const needle = {needle};
    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT);
    while (walker.nextNode()) {{
        const node = walker.currentNode;
        if (!(node.textContent || '').toLowerCase().includes(needle)) continue;
        const el = node.parentElement;
        if (!el) continue;
        const style = window.getComputedStyle(el);
        if (style.display === 'none' || style.visibility === 'hidden') continue;
        if (el.getClientRects().length > 0) return true;
    }}
    return false;
}})()"#
        )
    }
}
