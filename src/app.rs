//! Application entry points.
//!
//! Wires configuration, the tokenizer, the HTTP client and terminal output
//! around the library pipeline.

use crate::assistant::conversation::{Conversation, PollPolicy, RunObserver};
use crate::assistant::openai::OpenAiClient;
use crate::assistant::types::{AssistantSpec, Run};
use crate::chunking::chunk_stats;
use crate::config::{Config, api_key_from_env};
use crate::error::Result;
use crate::pipeline::{Outcome, prepare, summarize_file};
use crate::tokens::{self, TokenCounter};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub model: Option<String>,
    pub token_limit: Option<usize>,
    pub poll_interval: Option<Duration>,
    /// Converted to a status check budget using the poll interval.
    pub timeout: Option<Duration>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.assistant.model = model.clone();
        }
        if let Some(limit) = self.token_limit {
            config.chunking.token_limit = limit;
        }
        if let Some(interval) = self.poll_interval {
            config.polling.interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        }
        if let Some(timeout) = self.timeout {
            config.polling.max_polls = polls_for(timeout, config.polling.interval());
        }
    }
}

/// Number of status checks that fit in `timeout`, at least one.
fn polls_for(timeout: Duration, interval: Duration) -> u32 {
    let interval = interval.as_millis().max(1);
    let polls = timeout.as_millis().div_ceil(interval).max(1);
    u32::try_from(polls).unwrap_or(u32::MAX)
}

/// Shows run progress on a terminal spinner.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl SpinnerObserver {
    fn new(quiet: bool) -> Self {
        if quiet {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.set_message("waiting for the assistant");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

impl RunObserver for SpinnerObserver {
    fn on_status(&self, run: &Run, poll: u32) {
        self.bar
            .set_message(format!("run {} is {} (check {poll})", run.id, run.status));
        if run.status.is_terminal() {
            self.bar.finish_and_clear();
        }
    }
}

/// Run the summarize command: load → split → converse → write.
///
/// # Arguments
/// * `config` - Configuration with command-line overrides already applied
/// * `file` - Input file holding the prompt and the transcript
/// * `quiet` - Hide the spinner and the final message
/// * `cancel` - Cancelled on Ctrl-C to stop the conversation
pub async fn run_summarize(
    config: Config,
    file: &Path,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<Outcome> {
    config.validate()?;

    let counter = tokens::init(&config.chunking.tokenizer_model)?;
    let api_key = api_key_from_env()?;
    let client = OpenAiClient::new(&config.api.base_url, &api_key, config.api.timeout())?;
    tracing::debug!(base_url = client.base_url(), "assistant client ready");

    let conversation = Conversation::new(client, AssistantSpec::from(&config.assistant))
        .with_poll_policy(PollPolicy::from(&config.polling))
        .with_cancellation(cancel)
        .with_observer(SpinnerObserver::new(quiet));

    let outcome = summarize_file(file, config.chunking.token_limit, &counter, &conversation).await?;

    if !quiet {
        println!(
            "{} {}",
            "Summary written to".green(),
            outcome.output.display().bold()
        );
    }
    Ok(outcome)
}

/// Run the chunks command: split the transcript and print per-chunk sizes.
///
/// No credential is needed and no remote call is made.
pub async fn run_chunks(config: Config, file: &Path) -> Result<()> {
    config.validate()?;

    let counter = tokens::init(&config.chunking.tokenizer_model)?;
    let limit = config.chunking.token_limit;
    let prepared = prepare(file, limit, &counter).await?;
    let stats = chunk_stats(&prepared.chunks, &counter);

    println!(
        "{} chunks (limit {} tokens, vocabulary {})",
        stats.len(),
        limit,
        counter.model()
    );
    println!("{:>5}  {:>6}  {:>8}  {:>8}", "chunk", "lines", "tokens", "bytes");
    for (stat, chunk) in stats.iter().zip(&prepared.chunks) {
        let row = format!(
            "{:>5}  {:>6}  {:>8}  {:>8}",
            stat.index, stat.lines, stat.tokens, stat.bytes
        );
        if stat.over_budget(limit) {
            println!("{}  {}", row.yellow(), "(single line over the limit)".yellow());
        } else if chunk.trim().is_empty() {
            println!("{}  {}", row.dimmed(), "(empty, not sent)".dimmed());
        } else {
            println!("{row}");
        }
    }
    println!("prompt: {} tokens", counter.count(&prepared.document.prompt));

    Ok(())
}

/// Watch for interrupts on a task that logs inside the caller's span.
///
/// The first interrupt cancels `token`. The task resolves to `true` once a
/// second interrupt arrives, and to `false` if the signal cannot be watched.
pub fn spawn_interrupt_watcher<F, Fut>(
    token: CancellationToken,
    mut interrupt: F,
) -> JoinHandle<bool>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = std::io::Result<()>> + Send + 'static,
{
    tokio::spawn(
        async move {
            if interrupt().await.is_err() {
                return false;
            }
            tracing::warn!("interrupted, stopping (press Ctrl-C again to quit now)");
            token.cancel();

            if interrupt().await.is_err() {
                return false;
            }
            tracing::warn!("interrupted again, exiting");
            true
        }
        .instrument(tracing::Span::current()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::LOG_TAG;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_second_interrupt_asks_to_exit() {
        let token = CancellationToken::new();
        let watcher = spawn_interrupt_watcher(token.clone(), || async { Ok(()) });

        assert!(watcher.await.unwrap());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_first_interrupt_only_cancels() {
        let token = CancellationToken::new();
        let mut seen = 0;
        let watcher = spawn_interrupt_watcher(token.clone(), move || {
            seen += 1;
            let first = seen == 1;
            async move {
                if first {
                    Ok(())
                } else {
                    std::future::pending().await
                }
            }
        });

        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert!(!watcher.is_finished());
        watcher.abort();
    }

    #[tokio::test]
    async fn test_unavailable_signal_leaves_token_alone() {
        let token = CancellationToken::new();
        let watcher = spawn_interrupt_watcher(token.clone(), || async {
            Err(std::io::Error::other("no signal handler"))
        });

        assert!(!watcher.await.unwrap());
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_interrupt_warning_is_logged_in_callers_span() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let span = tracing::info_span!(LOG_TAG);
        let watcher = {
            let _entered = span.enter();
            spawn_interrupt_watcher(CancellationToken::new(), || async { Ok(()) })
        };
        assert!(watcher.await.unwrap());

        let text = log.text();
        let line = text
            .lines()
            .find(|line| line.contains("interrupted, stopping"))
            .unwrap();
        assert!(line.contains(&format!("{LOG_TAG}:")), "got: {line}");
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let mut config = Config::default();
        Overrides {
            model: Some("gpt-4o-mini".to_string()),
            token_limit: Some(4000),
            poll_interval: Some(Duration::from_millis(250)),
            timeout: None,
        }
        .apply(&mut config);

        assert_eq!(config.assistant.model, "gpt-4o-mini");
        assert_eq!(config.chunking.token_limit, 4000);
        assert_eq!(config.polling.interval_ms, 250);
        assert_eq!(config.polling.max_polls(), None);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = Config::default();
        Overrides::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_timeout_uses_overridden_interval() {
        let mut config = Config::default();
        Overrides {
            poll_interval: Some(Duration::from_millis(500)),
            timeout: Some(Duration::from_secs(10)),
            ..Overrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.polling.max_polls(), Some(20));
    }

    #[test]
    fn test_polls_for_rounds_up() {
        assert_eq!(polls_for(Duration::from_millis(2500), Duration::from_secs(1)), 3);
        assert_eq!(polls_for(Duration::from_secs(3), Duration::from_secs(1)), 3);
    }

    #[test]
    fn test_polls_for_is_at_least_one() {
        assert_eq!(polls_for(Duration::ZERO, Duration::from_secs(1)), 1);
        assert_eq!(polls_for(Duration::from_secs(1), Duration::ZERO), 1000);
    }

    #[tokio::test]
    async fn test_run_chunks_reports_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.txt");
        std::fs::write(&path, "---\nonly a transcript").unwrap();

        let err = run_chunks(Config::default(), &path).await.unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_run_chunks_rejects_invalid_config() {
        let mut config = Config::default();
        config.chunking.token_limit = 0;
        let err = run_chunks(config, Path::new("unused.txt")).await.unwrap_err();
        assert!(err.to_string().contains("token_limit"));
    }
}
