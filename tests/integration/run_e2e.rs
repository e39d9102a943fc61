//! Runner behavior through the public API: result shape, log lines, order.

use serde_json::json;

use maestro::config::Config;
use maestro::orchestration::{
    parse_document, LogPhase, OrchestrationDefinition, RunLog, TaskRunner, EXAMPLE_DEFINITION,
};
use maestro::{Error, Provider};

use crate::fixtures::{Call, StubClient};

fn example() -> OrchestrationDefinition {
    let document = parse_document(EXAMPLE_DEFINITION).unwrap();
    OrchestrationDefinition::from_value(&document).unwrap()
}

/// Test: the built-in example with a provider that answers "Hello!"
#[tokio::test]
async fn test_example_end_to_end() {
    let client = StubClient::replying(Provider::Gemini, &["Hello!"]);
    let mut log = RunLog::new();

    let result = TaskRunner::new(&client, &Config::default())
        .run(&example(), &mut log)
        .await
        .unwrap();

    assert_eq!(
        result.to_value(),
        json!({"greeting_task": {"output": "Hello!"}})
    );
    assert_eq!(
        client.calls(),
        vec![Call {
            model: "gemini-pro".to_string(),
            prompt: "Generate a warm greeting for a new user. Keep it concise.".to_string(),
        }]
    );
    assert_eq!(
        log.render(),
        "Starting orchestration using Gemini...\n\
         Executing task: greeting_task using Gemini\n\
         Task greeting_task completed. Output: Hello!...\n\
         Orchestration completed.\n"
    );
}

#[tokio::test]
async fn test_empty_tasks_makes_no_calls() {
    let client = StubClient::replying(Provider::OpenAi, &[]);
    let definition = OrchestrationDefinition::from_value(&json!({"name": "Empty", "tasks": {}})).unwrap();
    let mut log = RunLog::new();

    let result = TaskRunner::new(&client, &Config::default())
        .run(&definition, &mut log)
        .await
        .unwrap();

    assert_eq!(result.to_value(), json!({"error": "No tasks defined"}));
    assert!(client.calls().is_empty());
    let lines: Vec<String> = log.entries().iter().map(|e| e.line()).collect();
    assert_eq!(
        lines,
        vec![
            "Starting orchestration using OpenAI ChatGPT...",
            "[WARNING] No tasks defined in orchestration. Skipping execution.",
        ]
    );
}

#[tokio::test]
async fn test_tasks_without_model_use_provider_default() {
    let client = StubClient::replying(Provider::OpenAi, &["1", "2"]);
    let definition = OrchestrationDefinition::from_value(&json!({"tasks": {
        "a": {"prompt": "first"},
        "b": {"model": "gpt-4o-mini"}
    }}))
    .unwrap();

    let result = TaskRunner::new(&client, &Config::default())
        .run(&definition, &mut RunLog::new())
        .await
        .unwrap();

    assert_eq!(
        client.calls(),
        vec![
            Call {
                model: "gpt-4o".to_string(),
                prompt: "first".to_string()
            },
            Call {
                model: "gpt-4o-mini".to_string(),
                prompt: String::new()
            },
        ]
    );
    let keys: Vec<&String> = result.outputs().unwrap().keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[tokio::test]
async fn test_long_output_is_snipped_in_log_only() {
    let long = "x".repeat(200);
    let client = StubClient::replying(Provider::Gemini, &[long.as_str()]);
    let definition = OrchestrationDefinition::from_value(&json!({"tasks": {"t": {}}})).unwrap();
    let mut log = RunLog::new();

    let result = TaskRunner::new(&client, &Config::default())
        .run(&definition, &mut log)
        .await
        .unwrap();

    assert_eq!(result.outputs().unwrap()["t"].output.len(), 200);
    let completion = log
        .entries()
        .iter()
        .find(|e| e.phase == LogPhase::TaskCompleted)
        .unwrap();
    assert_eq!(
        completion.line(),
        format!("Task t completed. Output: {}...", "x".repeat(70))
    );
}

/// Test: the second of two tasks fails
#[tokio::test]
async fn test_failure_aborts_without_partial_result() {
    let client = StubClient::scripted(Provider::Gemini, vec![Some("done"), None]);
    let definition =
        OrchestrationDefinition::from_value(&json!({"tasks": {"a": {}, "b": {}}})).unwrap();
    let mut log = RunLog::new();

    let err = TaskRunner::new(&client, &Config::default())
        .run(&definition, &mut log)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Provider { status: Some(503), .. }));
    let lines: Vec<String> = log.entries().iter().map(|e| e.line()).collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "Executing task: a using Gemini");
    assert_eq!(lines[2], "Task a completed. Output: done...");
    assert_eq!(lines[3], "Executing task: b using Gemini");
    assert!(lines[4].starts_with("[ERROR] An error occurred during orchestration: "));
    assert!(lines[4].contains("overloaded"));
    assert!(!lines.iter().any(|l| l.starts_with("Task b completed")));
}

#[tokio::test]
async fn test_observer_sees_entries_as_they_happen() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut log = RunLog::with_observer(move |entry| sink.lock().unwrap().push(entry.line()));
    let client = StubClient::replying(Provider::Gemini, &["Hello!"]);

    TaskRunner::new(&client, &Config::default())
        .run(&example(), &mut log)
        .await
        .unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen, log.entries().iter().map(|e| e.line()).collect::<Vec<_>>());
}

#[test]
fn test_missing_credential_is_configuration_error() {
    let err = Provider::OpenAi
        .client_with_key(&Config::default(), None)
        .err()
        .unwrap();
    assert!(err.is_configuration());
    assert_eq!(err.to_string(), "OPENAI_API_KEY environment variable not set.");

    let err = Provider::Gemini
        .client_with_key(&Config::default(), Some("  ".to_string()))
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "GOOGLE_API_KEY environment variable not set.");
}
