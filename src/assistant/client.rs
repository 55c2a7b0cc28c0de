use crate::assistant::types::{Assistant, AssistantSpec, Message, Role, Run, Thread};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote assistant service: personas, threads, messages and runs.
///
/// This trait allows swapping implementations (real HTTP vs mock).
/// Every resource is addressed by the opaque id returned when it was
/// created.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create an assistant persona.
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant>;

    /// Open an empty conversation thread.
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a message to the end of a thread.
    async fn post_message(&self, thread_id: &str, role: Role, content: &str) -> Result<Message>;

    /// Start running an assistant against a thread.
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Fetch the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Messages of a thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>>;
}

/// Implement AssistantApi for Arc<T> so a client can be shared.
#[async_trait]
impl<T: AssistantApi + ?Sized> AssistantApi for Arc<T> {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant> {
        (**self).create_assistant(spec).await
    }

    async fn create_thread(&self) -> Result<Thread> {
        (**self).create_thread().await
    }

    async fn post_message(&self, thread_id: &str, role: Role, content: &str) -> Result<Message> {
        (**self).post_message(thread_id, role, content).await
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        (**self).start_run(thread_id, assistant_id).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        (**self).get_run(thread_id, run_id).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        (**self).list_messages(thread_id).await
    }
}
