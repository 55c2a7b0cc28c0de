//! In-memory assistant service for tests and dry runs.

use crate::assistant::client::AssistantApi;
use crate::assistant::types::{
    Assistant, AssistantSpec, Message, MessageContent, Role, Run, RunError, RunStatus, TextContent,
    Thread,
};
use crate::error::{Result, TrsuError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// One call received by [`MockAssistantApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CreateAssistant { name: String, model: String },
    CreateThread,
    PostMessage { thread_id: String, content: String },
    StartRun { thread_id: String, assistant_id: String },
    GetRun { run_id: String },
    ListMessages { thread_id: String },
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<ApiCall>,
    posted: Vec<Message>,
    statuses: VecDeque<RunStatus>,
}

/// Mock assistant service.
///
/// Run status checks pop scripted statuses in order; once the script is
/// exhausted the last status repeats. Completed runs answer with the
/// configured reply as the newest message.
#[derive(Debug)]
pub struct MockAssistantApi {
    reply: Option<String>,
    last_status: RunStatus,
    fail_thread: bool,
    state: Mutex<MockState>,
}

impl Default for MockAssistantApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssistantApi {
    /// Create a mock whose runs complete on the first check.
    pub fn new() -> Self {
        Self {
            reply: Some("mock summary".to_string()),
            last_status: RunStatus::Completed,
            fail_thread: false,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Configure the reply text of the assistant message.
    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Some(reply.to_string());
        self
    }

    /// Configure the run to produce no assistant message at all.
    pub fn without_reply(mut self) -> Self {
        self.reply = None;
        self
    }

    /// Script the statuses returned by successive run checks.
    pub fn with_statuses(mut self, statuses: &[RunStatus]) -> Self {
        if let Some(last) = statuses.last() {
            self.last_status = *last;
        }
        self.lock().statuses = statuses.iter().copied().collect();
        self
    }

    /// Configure the mock to fail on thread creation
    pub fn with_failure(mut self) -> Self {
        self.fail_thread = true;
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Contents of the messages posted so far, in order.
    pub fn posted_contents(&self) -> Vec<String> {
        self.lock()
            .posted
            .iter()
            .filter_map(|m| m.first_text().map(str::to_string))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: ApiCall) {
        self.lock().calls.push(call);
    }
}

fn text_message(id: String, role: Role, value: &str) -> Message {
    Message {
        id,
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: value.to_string(),
            },
        }],
    }
}

#[async_trait]
impl AssistantApi for MockAssistantApi {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant> {
        self.record(ApiCall::CreateAssistant {
            name: spec.name.clone(),
            model: spec.model.clone(),
        });
        Ok(Assistant {
            id: "asst_mock".to_string(),
            model: spec.model.clone(),
            name: Some(spec.name.clone()),
        })
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.record(ApiCall::CreateThread);
        if self.fail_thread {
            return Err(TrsuError::Api {
                status: 500,
                message: "mock thread failure".to_string(),
            });
        }
        Ok(Thread {
            id: "thread_mock".to_string(),
        })
    }

    async fn post_message(&self, thread_id: &str, role: Role, content: &str) -> Result<Message> {
        let mut state = self.lock();
        state.calls.push(ApiCall::PostMessage {
            thread_id: thread_id.to_string(),
            content: content.to_string(),
        });
        let message = text_message(format!("msg_{}", state.posted.len()), role, content);
        state.posted.push(message.clone());
        Ok(message)
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        self.record(ApiCall::StartRun {
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
        });
        Ok(Run {
            id: "run_mock".to_string(),
            status: RunStatus::Queued,
            last_error: None,
            incomplete_details: None,
        })
    }

    async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
        let mut state = self.lock();
        state.calls.push(ApiCall::GetRun {
            run_id: run_id.to_string(),
        });
        let status = state.statuses.pop_front().unwrap_or(self.last_status);
        let last_error = (status == RunStatus::Failed).then(|| RunError {
            code: "server_error".to_string(),
            message: "mock run failure".to_string(),
        });
        Ok(Run {
            id: run_id.to_string(),
            status,
            last_error,
            incomplete_details: None,
        })
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ListMessages {
            thread_id: thread_id.to_string(),
        });
        let reply = self
            .reply
            .as_deref()
            .map(|reply| text_message("msg_reply".to_string(), Role::Assistant, reply));
        Ok(reply
            .into_iter()
            .chain(state.posted.iter().rev().cloned())
            .collect())
    }
}
