//! Sequential task runner.
//!
//! Tasks run one at a time, in document order, each as a single completion
//! request. The first failure ends the run: it is logged, and the error is
//! returned without any partial result.

use indexmap::IndexMap;

use super::definition::OrchestrationDefinition;
use super::result::{RunResult, TaskOutput};
use super::run_log::RunLog;
use crate::config::Config;
use crate::provider::{CompletionClient, Provider};
use crate::{mlog, mlog_debug, mlog_warn, Result};

pub struct TaskRunner<'a> {
    client: &'a dyn CompletionClient,
    default_model: String,
}

impl<'a> TaskRunner<'a> {
    pub fn new(client: &'a dyn CompletionClient, config: &Config) -> Self {
        let default_model = config.default_model(client.provider()).to_string();
        Self::with_default_model(client, default_model)
    }

    pub fn with_default_model(client: &'a dyn CompletionClient, default_model: String) -> Self {
        Self {
            client,
            default_model,
        }
    }

    pub async fn run(
        &self,
        definition: &OrchestrationDefinition,
        log: &mut RunLog,
    ) -> Result<RunResult> {
        let provider = self.client.provider();
        mlog!(
            "Run {} start: orchestration={:?} provider={} tasks={}",
            log.run_id().short(),
            definition.display_name(),
            provider,
            definition.tasks.len()
        );
        log.started(provider);

        if definition.tasks.is_empty() {
            log.warning("No tasks defined in orchestration. Skipping execution.");
            return Ok(RunResult::no_tasks());
        }

        let mut outputs = IndexMap::with_capacity(definition.tasks.len());
        for (task_id, task) in &definition.tasks {
            log.task_started(task_id, provider);
            let model = task.effective_model(&self.default_model);
            mlog_debug!("Run {} task={} model={}", log.run_id().short(), task_id, model);

            let output = match self.client.generate(model, task.prompt()).await {
                Ok(output) => output,
                Err(e) => {
                    mlog_warn!("Run {} task={} failed: {}", log.run_id().short(), task_id, e);
                    log.failed(Some(task_id.as_str()), &e);
                    return Err(e);
                }
            };

            log.task_completed(task_id, &output);
            outputs.insert(task_id.clone(), TaskOutput { output });
        }

        log.completed();
        mlog!("Run {} completed", log.run_id().short());
        Ok(RunResult::Completed(outputs))
    }
}

/// Build the provider client from the environment, then run.
///
/// A missing credential is logged like any other run failure, before any task
/// is attempted.
pub async fn execute(
    definition: &OrchestrationDefinition,
    provider: Provider,
    config: &Config,
    log: &mut RunLog,
) -> Result<RunResult> {
    let client = match provider.client(config) {
        Ok(client) => client,
        Err(e) => {
            mlog_warn!("Run {} cannot start: {}", log.run_id().short(), e);
            log.started(provider);
            log.failed(None, &e);
            return Err(e);
        }
    };
    TaskRunner::new(client.as_ref(), config).run(definition, log).await
}
