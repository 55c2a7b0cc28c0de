//! Drives one summary through the assistant service.
//!
//! Flow: create assistant → create thread → post chunks in order → post the
//! prompt → start a run → poll until it ends → read the newest message.

use crate::assistant::client::AssistantApi;
use crate::assistant::types::{AssistantSpec, Message, Role, Run, RunStatus};
use crate::config::{AssistantConfig, PollingConfig};
use crate::error::{Result, TrsuError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often and how long to check a run's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the run ends or the wait is cancelled.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            max_polls: config.max_polls(),
        }
    }
}

impl From<&AssistantConfig> for AssistantSpec {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            model: config.model.clone(),
            name: config.name.clone(),
            instructions: config.instructions.clone(),
        }
    }
}

/// Receives every run status seen while polling.
pub trait RunObserver: Send + Sync {
    fn on_status(&self, run: &Run, poll: u32);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_status(&self, _run: &Run, _poll: u32) {}
}

/// Outcome of a completed conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub reply: String,
    pub assistant_id: String,
    pub thread_id: String,
    pub run_id: String,
    pub messages_posted: usize,
    pub polls: u32,
}

pub struct Conversation<A> {
    api: A,
    spec: AssistantSpec,
    policy: PollPolicy,
    cancel: CancellationToken,
    observer: Box<dyn RunObserver>,
}

impl<A: AssistantApi> Conversation<A> {
    pub fn new(api: A, spec: AssistantSpec) -> Self {
        Self {
            api,
            spec,
            policy: PollPolicy::default(),
            cancel: CancellationToken::new(),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort the conversation when `token` is cancelled.
    ///
    /// Pending requests are dropped and no further request is sent.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Post `chunks` and then `prompt` to a fresh thread and return the
    /// assistant's reply.
    ///
    /// Chunks are posted one at a time, in order. Empty or blank chunks are
    /// skipped since the service rejects empty message content.
    pub async fn summarize(&self, prompt: &str, chunks: &[String]) -> Result<Summary> {
        let assistant = self
            .interruptible("creating the assistant", self.api.create_assistant(&self.spec))
            .await?;
        tracing::info!(assistant = %assistant.id, model = %self.spec.model, "assistant created");

        let thread = self
            .interruptible("creating the thread", self.api.create_thread())
            .await?;
        tracing::info!(thread = %thread.id, "thread created");

        let mut messages_posted = 0usize;
        for (index, chunk) in chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                tracing::debug!(index, "skipping empty chunk");
                continue;
            }
            let message = self
                .interruptible(
                    "posting chunks",
                    self.api.post_message(&thread.id, Role::User, chunk),
                )
                .await?;
            messages_posted += 1;
            tracing::info!(
                index,
                of = chunks.len(),
                message = %message.id,
                "chunk added to the thread"
            );
        }

        self.interruptible(
            "posting the prompt",
            self.api.post_message(&thread.id, Role::User, prompt),
        )
        .await?;
        messages_posted += 1;
        tracing::info!("prompt added to the thread");

        let run = self
            .interruptible("starting the run", self.api.start_run(&thread.id, &assistant.id))
            .await?;
        tracing::info!(run = %run.id, status = %run.status, "run started");

        let (run, polls) = self.wait_for_run(&thread.id, &run.id).await?;
        let messages = self
            .interruptible("reading the reply", self.api.list_messages(&thread.id))
            .await?;
        let reply = reply_text(&messages)?;
        tracing::info!(run = %run.id, polls, bytes = reply.len(), "run completed");

        Ok(Summary {
            reply,
            assistant_id: assistant.id,
            thread_id: thread.id,
            run_id: run.id,
            messages_posted,
            polls,
        })
    }

    /// Await `call` unless the cancellation token fires first.
    async fn interruptible<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        if self.cancel.is_cancelled() {
            return Err(TrsuError::Interrupted { stage });
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TrsuError::Interrupted { stage }),
            result = call => result,
        }
    }

    /// Check the run until it reaches a terminal status.
    ///
    /// The first check happens immediately, later ones after each interval.
    /// Returns the completed run and the number of checks made.
    pub async fn wait_for_run(&self, thread_id: &str, run_id: &str) -> Result<(Run, u32)> {
        let mut polls = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Err(TrsuError::Cancelled {
                    run_id: run_id.to_string(),
                });
            }

            let run = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(TrsuError::Cancelled {
                        run_id: run_id.to_string(),
                    });
                }
                run = self.api.get_run(thread_id, run_id) => run?,
            };
            polls += 1;
            self.observer.on_status(&run, polls);
            tracing::debug!(run = %run.id, status = %run.status, poll = polls, "run status");

            match run.status {
                RunStatus::Completed => return Ok((run, polls)),
                status if status.is_terminal() => return Err(run.failure()),
                _ => {}
            }

            if let Some(max) = self.policy.max_polls
                && polls >= max
            {
                return Err(TrsuError::PollTimeout {
                    run_id: run_id.to_string(),
                    polls,
                });
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(TrsuError::Cancelled {
                        run_id: run_id.to_string(),
                    });
                }
                _ = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }
}

/// The reply is the first content block of the newest message.
pub fn reply_text(messages: &[Message]) -> Result<String> {
    let newest = messages.first().ok_or_else(|| TrsuError::EmptyReply {
        message: "thread has no messages".to_string(),
    })?;
    newest
        .first_text()
        .map(str::to_string)
        .ok_or_else(|| TrsuError::EmptyReply {
            message: format!("message {} has no text content", newest.id),
        })
}
