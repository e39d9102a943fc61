//! Page workflows driven through `update`, with the store on disk.

use serde_json::json;

use maestro::orchestration::{EXAMPLE_DEFINITION, NO_TASKS};
use maestro::store::OrchestrationStore;
use maestro::tea::{Action, NotificationLevel};
use maestro::Provider;

use crate::fixtures::{PageHarness, StubClient, TestStore};

fn harness(entries: &[(&str, serde_json::Value)], replies: &[&str]) -> PageHarness {
    PageHarness::new(
        TestStore::with(entries),
        StubClient::replying(Provider::Gemini, replies),
    )
}

#[tokio::test]
async fn test_save_then_reselect() {
    let mut page = harness(&[], &[]);
    page.model.session.editing_name = "greet".to_string();
    page.model.session.definition_text =
        r#"{"name": "Greet", "tasks": {"hi": {"prompt": "Say hi"}}}"#.to_string();

    page.act(Action::Save).await;

    assert_eq!(page.notification(), "Orchestration 'greet' saved successfully!");
    assert_eq!(page.model.session.selected.as_deref(), Some("greet"));
    assert_eq!(page.model.session.editing_name, "greet");
    let on_disk = page.store.store.load().orchestrations;
    assert_eq!(on_disk["greet"]["tasks"]["hi"]["prompt"], "Say hi");

    page.act(Action::LoadExample).await;
    assert_eq!(page.model.session.definition_text, EXAMPLE_DEFINITION);
    assert!(page.model.session.selected.is_none());

    page.act(Action::SelectSaved(Some("greet".to_string()))).await;
    assert_eq!(
        page.model.session.definition_text,
        "{\n  \"name\": \"Greet\",\n  \"tasks\": {\n    \"hi\": {\n      \"prompt\": \"Say hi\"\n    }\n  }\n}"
    );
    assert_eq!(page.model.highlighted_name().map(String::as_str), Some("greet"));
}

#[tokio::test]
async fn test_save_keeps_name_as_typed() {
    let mut page = harness(&[], &[]);
    page.model.session.editing_name = " a ".to_string();

    page.act(Action::Save).await;

    assert_eq!(page.notification(), "Orchestration ' a ' saved successfully!");
    assert_eq!(page.store.store.load().names(), vec![" a ".to_string()]);
    assert!(!page.model.store_pending);
}

#[tokio::test]
async fn test_save_without_name_leaves_store_alone() {
    let mut page = harness(&[("keep", json!({"tasks": {}}))], &[]);
    page.model.session.editing_name = "   ".to_string();

    page.act(Action::Save).await;

    let notification = page.model.notification.clone().unwrap();
    assert_eq!(notification.level, NotificationLevel::Warning);
    assert_eq!(
        notification.message,
        "Please enter a name to save the orchestration."
    );
    assert_eq!(page.store.store.load().names(), vec!["keep".to_string()]);
}

#[tokio::test]
async fn test_save_invalid_json_is_rejected() {
    let mut page = harness(&[], &[]);
    page.model.session.editing_name = "broken".to_string();
    page.model.session.definition_text = "{ \"tasks\": ".to_string();

    page.act(Action::Save).await;

    assert_eq!(
        page.notification(),
        "Cannot save: Invalid JSON format in Orchestration Definition."
    );
    assert!(!page.store.path().exists());
}

#[tokio::test]
async fn test_delete_selected() {
    let mut page = harness(
        &[("a", json!({"tasks": {}})), ("b", json!({"tasks": {}}))],
        &[],
    );
    page.act(Action::SelectSaved(Some("a".to_string()))).await;

    page.act(Action::DeleteSelected).await;

    assert_eq!(page.notification(), "Orchestration 'a' deleted.");
    assert!(page.model.session.selected.is_none());
    assert_eq!(page.model.session.definition_text, EXAMPLE_DEFINITION);
    assert_eq!(page.store.store.load().names(), vec!["b".to_string()]);
    assert_eq!(page.model.catalog_rows().len(), 2);
}

#[tokio::test]
async fn test_delete_without_selection_warns() {
    let mut page = harness(&[("a", json!({}))], &[]);

    page.act(Action::DeleteSelected).await;

    assert_eq!(page.notification(), "Please select an orchestration to delete.");
    assert_eq!(page.store.store.load().names(), vec!["a".to_string()]);
}

/// Test: another writer removed the entry after it was selected
#[tokio::test]
async fn test_delete_after_external_removal_reloads_catalog() {
    let mut page = harness(&[("a", json!({})), ("b", json!({}))], &[]);
    page.act(Action::SelectSaved(Some("a".to_string()))).await;
    OrchestrationStore::new(page.store.path()).remove("a").unwrap();

    page.act(Action::DeleteSelected).await;

    assert_eq!(page.notification(), "Selected orchestration not found.");
    let cached: Vec<&String> = page.model.orchestrations.keys().collect();
    assert_eq!(cached, vec!["b"]);
}

#[tokio::test]
async fn test_execute_example_shows_result_and_log() {
    let mut page = harness(&[], &["Hello!"]);

    page.act(Action::Execute).await;

    assert!(!page.model.running);
    assert_eq!(page.notification(), "Orchestration completed successfully!");
    assert_eq!(
        page.model.session.result.as_deref(),
        Some("{\n  \"greeting_task\": {\n    \"output\": \"Hello!\"\n  }\n}")
    );
    assert_eq!(
        page.log_lines(),
        vec![
            "Starting orchestration using Gemini...",
            "Executing task: greeting_task using Gemini",
            "Task greeting_task completed. Output: Hello!...",
            "Orchestration completed.",
        ]
    );
}

#[tokio::test]
async fn test_execute_without_tasks() {
    let mut page = harness(&[], &[]);
    page.model.session.definition_text = r#"{"name": "Nothing"}"#.to_string();

    page.act(Action::Execute).await;

    assert!(page.client.calls().is_empty());
    assert_eq!(
        page.model.session.result.as_deref(),
        Some(format!("{{\n  \"error\": \"{}\"\n}}", NO_TASKS).as_str())
    );
    assert_eq!(page.log_lines().len(), 2);
}

#[tokio::test]
async fn test_execute_with_null_or_list_tasks_is_a_no_op_run() {
    for tasks in ["null", "[]"] {
        let mut page = harness(&[], &[]);
        page.model.session.definition_text = format!(r#"{{"name": "x", "tasks": {}}}"#, tasks);

        page.act(Action::Execute).await;

        assert!(page.client.calls().is_empty());
        assert_eq!(page.notification(), "Orchestration completed successfully!");
        assert_eq!(
            page.model.session.result.as_deref(),
            Some(format!("{{\n  \"error\": \"{}\"\n}}", NO_TASKS).as_str()),
            "tasks = {}",
            tasks
        );
        assert_eq!(
            page.log_lines()[1],
            "[WARNING] No tasks defined in orchestration. Skipping execution."
        );
    }
}

#[tokio::test]
async fn test_execute_failure_keeps_log_drops_result() {
    let mut page = harness(&[], &[]);
    page.model.session.result = Some("stale".to_string());

    page.act(Action::Execute).await;

    assert!(!page.model.running);
    assert!(page.model.session.result.is_none());
    assert!(page
        .notification()
        .starts_with("Execution Failed: An unexpected error occurred: "));
    let lines = page.log_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("[ERROR] An error occurred during orchestration: "));
}

#[tokio::test]
async fn test_execute_rejects_blank_and_invalid_definitions() {
    let mut page = harness(&[], &[]);

    page.model.session.definition_text = "{}".to_string();
    page.act(Action::Execute).await;
    assert_eq!(
        page.notification(),
        "Cannot execute with an invalid or empty orchestration definition."
    );

    page.model.session.definition_text = "not json".to_string();
    page.act(Action::Execute).await;
    assert_eq!(
        page.notification(),
        "Invalid JSON format in Orchestration Definition. Please check your syntax."
    );

    assert!(page.client.calls().is_empty());
    assert!(page.log_lines().is_empty());
}

#[tokio::test]
async fn test_clear_all_after_run() {
    let mut page = harness(&[("saved", json!({"tasks": {}}))], &["Hello!"]);
    page.act(Action::SelectSaved(Some("saved".to_string()))).await;
    page.act(Action::LoadExample).await;
    page.act(Action::Execute).await;
    assert!(page.model.session.result.is_some());

    page.act(Action::ClearAll).await;

    assert_eq!(page.model.session.definition_text, EXAMPLE_DEFINITION);
    assert!(page.model.session.editing_name.is_empty());
    assert!(page.model.session.result.is_none());
    assert!(page.log_lines().is_empty());
    assert_eq!(page.store.store.load().names(), vec!["saved".to_string()]);
}

#[tokio::test]
async fn test_toggle_provider_changes_run_labels() {
    let mut page = PageHarness::new(
        TestStore::new(),
        StubClient::replying(Provider::OpenAi, &["Hey"]),
    );
    page.model.session.provider = Provider::Gemini;
    page.act(Action::ToggleProvider).await;
    assert_eq!(page.model.session.provider, Provider::OpenAi);
    assert_eq!(page.notification(), "Provider: OpenAI ChatGPT");

    page.act(Action::Execute).await;

    assert_eq!(page.log_lines()[0], "Starting orchestration using OpenAI ChatGPT...");
    assert_eq!(page.client.calls()[0].model, "gpt-4o");
}
