//! Remote assistant service: wire types, the API seam, its HTTP and mock
//! implementations, and the conversation that drives a summary.

pub mod client;
pub mod conversation;
pub mod mock;
pub mod openai;
pub mod types;

pub use client::AssistantApi;
pub use conversation::{Conversation, NoopObserver, PollPolicy, RunObserver, Summary, reply_text};
pub use mock::{ApiCall, MockAssistantApi};
pub use openai::OpenAiClient;
pub use types::{AssistantSpec, Message, Role, Run, RunStatus};
