mod common;

use std::sync::Arc;

use alcf_mcp::{AlcfServer, AskQuestionArgs, OutputFormat, SystemInfoArgs, SystemName};
use common::{PageScript, ScriptedLauncher, orchestrator};
use rmcp::ServerHandler;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::json;

fn make_server(script: PageScript) -> (AlcfServer, Arc<common::Counters>) {
    let (orch, counters) = orchestrator(ScriptedLauncher::new(script));
    (AlcfServer::new(Arc::new(orch)), counters)
}

fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

fn ask_args(value: serde_json::Value) -> AskQuestionArgs {
    serde_json::from_value(value).unwrap()
}

#[tokio::test(start_paused = true)]
async fn ask_question_defaults_to_a_markdown_document() {
    let (server, _) = make_server(PageScript::Instant);

    let result = server
        .ask_question(Parameters(ask_args(json!({ "question": "What is Aurora?" }))))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    let text = text_of(&result);
    assert!(text.starts_with("# ALCF Query Response"));
    assert!(text.contains("**Question:** What is Aurora?"));
    assert!(text.contains("*Source: [ask.alcf.anl.gov](https://ask.alcf.anl.gov)*"));
}

#[tokio::test(start_paused = true)]
async fn structured_format_carries_structured_content() {
    let (server, _) = make_server(PageScript::Instant);

    let result = server
        .ask_question(Parameters(ask_args(json!({
            "question": "What is Aurora?",
            "response_format": "json",
            "timeout": 20000,
        }))))
        .await
        .unwrap();

    let structured = result.structured_content.clone().unwrap();
    assert_eq!(structured["question"], "What is Aurora?");
    assert_eq!(structured["source"], "ask.alcf.anl.gov");
    assert_eq!(structured["truncated"], false);

    let from_text: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(from_text, structured);
}

#[tokio::test(start_paused = true)]
async fn failures_are_tool_errors_in_the_requested_format() {
    let (server, counters) = make_server(PageScript::Instant);

    let result = server
        .ask_question(Parameters(ask_args(json!({
            "question": "Hi",
            "response_format": "structured",
        }))))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    let payload: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(payload["error"], true);
    assert_eq!(payload["kind"], "validation_error");
    assert_eq!(payload["question"], "Hi");
    assert_eq!(counters.opened(), 0);

    let (server, counters) = make_server(PageScript::MissingInput);
    let result = server
        .ask_question(Parameters(ask_args(json!({ "question": "What is Polaris?" }))))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).starts_with("# Error"));
    assert!(text_of(&result).contains("Page structure error"));
    assert_eq!(counters.closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn system_info_asks_the_canned_question() {
    let (server, counters) = make_server(PageScript::Instant);

    let args: SystemInfoArgs = serde_json::from_value(json!({ "system_name": "AI Testbed" })).unwrap();
    assert_eq!(args.system_name, SystemName::AiTestbed);

    let result = server.get_system_info(Parameters(args)).await.unwrap();
    assert_ne!(result.is_error, Some(true));
    assert!(text_of(&result).contains(
        "**Question:** What is AI Testbed and what are its key specifications, architecture, and capabilities?"
    ));
    assert_eq!(counters.opened(), 1);
    assert_eq!(counters.closed(), 1);
}

#[test]
fn arguments_reject_unknown_fields_and_systems() {
    assert!(
        serde_json::from_value::<AskQuestionArgs>(json!({
            "question": "What is Aurora?",
            "verbose": true,
        }))
        .is_err()
    );
    assert!(serde_json::from_value::<SystemInfoArgs>(json!({ "system_name": "Frontier" })).is_err());

    let args = ask_args(json!({ "question": "What is Aurora?" }));
    assert_eq!(args.timeout_ms, None);
    assert_eq!(args.response_format, OutputFormat::Document);
}

#[test]
fn server_advertises_tools() {
    let (server, _) = make_server(PageScript::Instant);
    let info = server.get_info();
    assert!(info.capabilities.tools.is_some());
    assert_eq!(info.server_info.name, "alcf_mcp");
}
