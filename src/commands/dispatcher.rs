use super::catalog::CommandCatalog;
use super::registry::CommandRegistry;
use super::types::{Command, CommandOutcome};
use crate::error::CommandError;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Result of running one ordered batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// One entry per input command, in input order.
    pub outcomes: Vec<CommandOutcome>,
    /// Fetch-class output keyed by bucket, present when any fetch command ran.
    pub fetched_data: Option<Value>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs command batches strictly in order, isolating per-command failures.
pub struct CommandDispatcher {
    catalog: Arc<CommandCatalog>,
    registry: CommandRegistry,
    timeout: Duration,
}

impl CommandDispatcher {
    pub fn new(
        catalog: Arc<CommandCatalog>,
        registry: CommandRegistry,
        timeout: Duration,
    ) -> Result<Self, CommandError> {
        registry.validate_against(&catalog)?;
        Ok(Self {
            catalog,
            registry,
            timeout,
        })
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    /// Execute `commands` one after another. A failing command never stops
    /// the batch; its outcome records why.
    pub async fn execute(&self, commands: &[Command]) -> DispatchReport {
        let mut outcomes = Vec::with_capacity(commands.len());
        let mut fetched = FetchedData::default();

        for command in commands {
            let bucket = self.catalog.get(&command.name).and_then(|spec| spec.bucket());
            match self.run_one(command).await {
                Ok(data) => {
                    tracing::debug!(command = %command.name, "command succeeded");
                    if let Some(bucket) = bucket {
                        fetched.merge(bucket, data.clone());
                    }
                    outcomes.push(CommandOutcome::succeeded(&command.name, data));
                }
                Err(err) => {
                    tracing::warn!(
                        command = %command.name,
                        kind = %err.kind(),
                        error = %err,
                        "command skipped"
                    );
                    if let Some(bucket) = bucket {
                        fetched.record_failure(bucket, &command.name, &err);
                    }
                    outcomes.push(CommandOutcome::failed(&command.name, &err));
                }
            }
        }

        DispatchReport {
            outcomes,
            fetched_data: fetched.into_value(),
        }
    }

    async fn run_one(&self, command: &Command) -> Result<Option<Value>, CommandError> {
        let unknown = || CommandError::Unknown {
            name: command.name.clone(),
        };
        let spec = self.catalog.get(&command.name).ok_or_else(unknown)?;

        let missing: Vec<String> = spec
            .required_params()
            .filter(|param| !command.has_param(param))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(CommandError::MissingParams {
                name: command.name.clone(),
                missing,
            });
        }

        let handler = self.registry.get(&command.name).ok_or_else(unknown)?;
        match tokio::time::timeout(self.timeout, handler.execute(&command.params)).await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(e)) => Err(CommandError::Execution {
                name: command.name.clone(),
                message: format!("{e:#}"),
            }),
            Err(_) => Err(CommandError::Timeout {
                name: command.name.clone(),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Per-bucket accumulation of fetch output across one batch.
#[derive(Default)]
struct FetchedData {
    buckets: Map<String, Value>,
    errors: Vec<Value>,
    touched: bool,
}

impl FetchedData {
    /// Arrays are concatenated; any other value is appended as one item.
    fn merge(&mut self, bucket: &str, data: Option<Value>) {
        self.touched = true;
        let Value::Array(items) = self
            .buckets
            .entry(bucket)
            .or_insert_with(|| Value::Array(Vec::new()))
        else {
            return;
        };
        match data {
            Some(Value::Array(more)) => items.extend(more),
            Some(Value::Null) | None => {}
            Some(other) => items.push(other),
        }
    }

    fn record_failure(&mut self, bucket: &str, command: &str, err: &CommandError) {
        self.merge(bucket, None);
        self.errors.push(json!({
            "command": command,
            "kind": err.kind(),
            "message": err.to_string(),
        }));
    }

    fn into_value(mut self) -> Option<Value> {
        if !self.touched {
            return None;
        }
        if !self.errors.is_empty() {
            self.buckets.insert("errors".into(), Value::Array(self.errors));
        }
        Some(Value::Object(self.buckets))
    }
}
