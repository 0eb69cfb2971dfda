use super::response::ModelResponse;
use crate::agent::AgentProxy;
use crate::commands::{Command, CommandDispatcher, CommandOutcome};
use crate::error::{ConsciaError, ErrorKind, MemoryError};
use crate::memory::{MemorySnapshot, MemoryStore};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Reply sent to the user whenever a turn is abandoned.
pub const APOLOGY_REPLY: &str = "Sorry, I couldn't process your request.";

/// States a turn moves through. Logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    AwaitingModel,
    Validating,
    FetchRound,
    Finalizing,
    Done,
    Failed,
}

/// The caller-visible result of a turn: `{updated_memory, commands, user_reply}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotReply {
    pub updated_memory: Option<MemorySnapshot>,
    pub commands: Vec<Command>,
    pub user_reply: String,
}

impl BotReply {
    pub fn apology() -> Self {
        Self {
            updated_memory: None,
            commands: Vec::new(),
            user_reply: APOLOGY_REPLY.to_string(),
        }
    }
}

/// Why a turn ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnFailure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub turn_id: Uuid,
    pub reply: BotReply,
    /// Model invocations made during the turn.
    pub rounds: u32,
    /// Every command attempted, fetch rounds included, in execution order.
    pub outcomes: Vec<CommandOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TurnFailure>,
}

impl TurnOutcome {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        self.failure.as_ref().map(|f| f.kind)
    }
}

/// Drives one user turn: model rounds, fetch folding, memory replacement and
/// the final command batch.
pub struct Orchestrator {
    agent: AgentProxy,
    dispatcher: CommandDispatcher,
    store: Arc<dyn MemoryStore>,
    max_rounds: u32,
}

struct Turn {
    id: Uuid,
    round: u32,
    outcomes: Vec<CommandOutcome>,
}

impl Turn {
    fn enter(&self, state: TurnState) {
        tracing::debug!(turn_id = %self.id, round = self.round, state = %state, "turn transition");
    }

    fn fail(self, kind: ErrorKind, message: String) -> TurnOutcome {
        self.enter(TurnState::Failed);
        tracing::warn!(
            turn_id = %self.id,
            round = self.round,
            kind = %kind,
            error = %message,
            "turn abandoned; memory left unchanged"
        );
        TurnOutcome {
            turn_id: self.id,
            reply: BotReply::apology(),
            rounds: self.round,
            outcomes: self.outcomes,
            failure: Some(TurnFailure { kind, message }),
        }
    }
}

impl Orchestrator {
    pub fn new(
        agent: AgentProxy,
        dispatcher: CommandDispatcher,
        store: Arc<dyn MemoryStore>,
        max_rounds: u32,
    ) -> Self {
        Self {
            agent,
            dispatcher,
            store,
            max_rounds: max_rounds.max(1),
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Run one turn for `prompt`.
    ///
    /// Model, parse and round-limit failures come back as an apology inside
    /// `Ok`. Only a memory store failure is returned as `Err`.
    pub async fn handle(&self, prompt: &str) -> Result<TurnOutcome, ConsciaError> {
        let mut turn = Turn {
            id: Uuid::new_v4(),
            round: 0,
            outcomes: Vec::new(),
        };
        tracing::info!(turn_id = %turn.id, max_rounds = self.max_rounds, "turn started");

        let mut additional_data: Option<Value> = None;

        loop {
            turn.round += 1;
            turn.enter(TurnState::AwaitingModel);

            let memory = self.load_memory().await?;
            let raw = match self
                .agent
                .invoke(prompt, &memory, additional_data.as_ref())
                .await
            {
                Ok(raw) => raw,
                Err(err) => return Ok(turn.fail(err.kind(), err.to_string())),
            };

            turn.enter(TurnState::Validating);
            let response = match ModelResponse::parse(&raw) {
                Ok(response) => response,
                Err(err) => return Ok(turn.fail(ErrorKind::ParseError, err.to_string())),
            };

            let catalog = self.dispatcher.catalog();
            let (fetches, deferred): (Vec<Command>, Vec<Command>) = response
                .commands()
                .iter()
                .cloned()
                .partition(|command| catalog.is_fetch(&command.name));

            if fetches.is_empty() {
                turn.enter(TurnState::Finalizing);
                return self.finalize(turn, prompt, &memory, response).await;
            }

            if turn.round >= self.max_rounds {
                let message = format!(
                    "model still requested {} fetch command(s) after {} round(s)",
                    fetches.len(),
                    turn.round
                );
                return Ok(turn.fail(ErrorKind::RoundLimitExceeded, message));
            }

            turn.enter(TurnState::FetchRound);
            if !deferred.is_empty() {
                tracing::info!(
                    turn_id = %turn.id,
                    round = turn.round,
                    discarded = deferred.len(),
                    "discarding non-fetch commands from a fetch round"
                );
            }
            if response.updated_memory.is_some() {
                tracing::debug!(
                    turn_id = %turn.id,
                    round = turn.round,
                    "ignoring updated_memory from a fetch round"
                );
            }

            let report = self.dispatcher.execute(&fetches).await;
            tracing::info!(
                turn_id = %turn.id,
                round = turn.round,
                succeeded = report.succeeded(),
                failed = report.failed(),
                "fetch round complete"
            );
            turn.outcomes.extend(report.outcomes);
            additional_data = report.fetched_data;
        }
    }

    async fn finalize(
        &self,
        mut turn: Turn,
        prompt: &str,
        memory: &MemorySnapshot,
        response: ModelResponse,
    ) -> Result<TurnOutcome, ConsciaError> {
        let ModelResponse {
            updated_memory,
            commands,
            user_reply,
        } = response;

        let updated_memory = match updated_memory {
            Some(proposed) => {
                let next = memory.adopt(proposed);
                if next.archive_contains_verbatim(prompt) {
                    tracing::warn!(
                        turn_id = %turn.id,
                        "archive holds the raw user prompt verbatim"
                    );
                }
                self.store.save(&next).await.map_err(|e| {
                    tracing::error!(
                        turn_id = %turn.id,
                        error = %format!("{e:#}"),
                        "memory persist failed"
                    );
                    MemoryError::Persist(format!("{e:#}"))
                })?;
                tracing::info!(turn_id = %turn.id, backend = self.store.name(), "memory replaced");
                Some(next)
            }
            None => None,
        };

        let commands = commands.unwrap_or_default();
        let report = self.dispatcher.execute(&commands).await;
        tracing::info!(
            turn_id = %turn.id,
            rounds = turn.round,
            commands = commands.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "turn complete"
        );
        turn.outcomes.extend(report.outcomes);
        turn.enter(TurnState::Done);

        Ok(TurnOutcome {
            turn_id: turn.id,
            reply: BotReply {
                updated_memory,
                commands,
                user_reply,
            },
            rounds: turn.round,
            outcomes: turn.outcomes,
            failure: None,
        })
    }

    async fn load_memory(&self) -> Result<MemorySnapshot, MemoryError> {
        self.store.load().await.map_err(|e| {
            tracing::error!(
                backend = self.store.name(),
                error = %format!("{e:#}"),
                "memory load failed"
            );
            MemoryError::Load(format!("{e:#}"))
        })
    }
}
