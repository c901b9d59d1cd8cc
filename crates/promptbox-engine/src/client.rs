//! Inference backends.
//!
//! The widget only ever sees [`InferenceClient::generate`]. Model selection,
//! token limits and caching all belong to the backend's own configuration.

use crate::config::{BackendConfig, PromptDelivery, PROMPT_PLACEHOLDER};
use crate::failure::InferenceFailure;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Returned when the backend succeeds but produces no text.
pub const EMPTY_RESPONSE: &str = "No response returned.";

/// A text-generation capability: submit a prompt, receive text or a failure.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Generate a response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, InferenceFailure>;
}

/// Backend that runs a local CLI once per prompt.
#[derive(Debug, Clone)]
pub struct CommandClient {
    config: BackendConfig,
}

impl CommandClient {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    /// Build the argument list, substituting the prompt when it is passed as
    /// an argument.
    fn args_for(&self, prompt: &str) -> Vec<String> {
        let rest = self.config.command_argv.iter().skip(1);
        match self.config.prompt_delivery {
            PromptDelivery::Stdin => rest.cloned().collect(),
            PromptDelivery::Argument => {
                let mut substituted = false;
                let mut args: Vec<String> = rest
                    .map(|arg| {
                        if arg == PROMPT_PLACEHOLDER {
                            substituted = true;
                            prompt.to_string()
                        } else {
                            arg.clone()
                        }
                    })
                    .collect();
                if !substituted {
                    args.push(prompt.to_string());
                }
                args
            }
        }
    }
}

#[async_trait]
impl InferenceClient for CommandClient {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, InferenceFailure> {
        let start = Instant::now();
        let name = &self.config.name;
        let program = self
            .config
            .program()
            .ok_or_else(|| InferenceFailure::new(format!("{name}: no command configured")))?;

        let mut cmd = Command::new(program);
        cmd.args(self.args_for(prompt));

        let uses_stdin = self.config.prompt_delivery == PromptDelivery::Stdin;
        cmd.stdin(if uses_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| InferenceFailure::new(format!("Failed to start {name}: {e}")))?;

        // Feed the prompt while collecting output so neither side can stall
        // the other; dropping stdin signals end of input.
        let stdin = if uses_stdin { child.stdin.take() } else { None };
        let feed = async move {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                    // Backends may exit without reading their input
                    tracing::debug!(backend = %name, error = %e, "prompt not fully written");
                }
            }
        };
        let run = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let timeout_duration = Duration::from_secs(self.config.timeout_seconds);
        let output = match timeout(timeout_duration, run).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(InferenceFailure::new(format!(
                    "{name} timed out after {}s",
                    self.config.timeout_seconds
                )));
            }
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::debug!(backend = %name, duration_ms, status = ?output.status, "backend exited with failure");
            let stderr = stderr.trim();
            return Err(if stderr.is_empty() {
                InferenceFailure::new(format!(
                    "{name} exited with status {}",
                    output.status.code().unwrap_or(-1)
                ))
            } else {
                InferenceFailure::new(stderr)
            });
        }

        tracing::debug!(backend = %name, duration_ms, "backend answered");

        // Some CLIs print their answer on stderr
        let response = if stdout.trim().is_empty() {
            stderr.trim_end()
        } else {
            stdout.trim_end()
        };

        if response.trim().is_empty() {
            Ok(EMPTY_RESPONSE.to_string())
        } else {
            Ok(response.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(argv: &[&str], delivery: PromptDelivery) -> BackendConfig {
        BackendConfig {
            name: "test".into(),
            command_argv: argv.iter().map(|s| (*s).to_string()).collect(),
            prompt_delivery: delivery,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_args_for_stdin_delivery() {
        let client = CommandClient::new(backend(&["ollama", "run", "llama3.2"], PromptDelivery::Stdin));
        assert_eq!(client.args_for("hi"), vec!["run", "llama3.2"]);
    }

    #[test]
    fn test_args_for_argument_delivery() {
        let client = CommandClient::new(backend(&["llm", "{prompt}", "-n"], PromptDelivery::Argument));
        assert_eq!(client.args_for("hi there"), vec!["hi there", "-n"]);

        let client = CommandClient::new(backend(&["gemini", "-p"], PromptDelivery::Argument));
        assert_eq!(client.args_for("hi"), vec!["-p", "hi"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_via_stdin() {
        let client = CommandClient::new(backend(&["cat"], PromptDelivery::Stdin));
        let text = client.generate("hello world").await.unwrap();
        assert_eq!(text, "hello world");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_via_argument() {
        let client = CommandClient::new(backend(
            &["sh", "-c", "printf 'echo: %s\\n' \"$1\"", "sh", "{prompt}"],
            PromptDelivery::Argument,
        ));
        let text = client.generate("ping").await.unwrap();
        assert_eq!(text, "echo: ping");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_falls_back_to_stderr() {
        let client = CommandClient::new(backend(
            &["sh", "-c", "cat >/dev/null; echo answer >&2"],
            PromptDelivery::Stdin,
        ));
        assert_eq!(client.generate("q").await.unwrap(), "answer");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_empty_output() {
        let client = CommandClient::new(backend(&["sh", "-c", "cat >/dev/null"], PromptDelivery::Stdin));
        assert_eq!(client.generate("q").await.unwrap(), EMPTY_RESPONSE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_nonzero_exit_is_failure() {
        let client = CommandClient::new(backend(
            &["sh", "-c", "cat >/dev/null; echo 'model not found' >&2; exit 3"],
            PromptDelivery::Stdin,
        ));
        let failure = client.generate("q").await.unwrap_err();
        assert_eq!(failure.describe(), "model not found");

        let client = CommandClient::new(backend(&["sh", "-c", "exit 4"], PromptDelivery::Argument));
        let failure = client.generate("q").await.unwrap_err();
        assert_eq!(failure.describe(), "test exited with status 4");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_timeout() {
        let mut config = backend(&["sh", "-c", "sleep 5"], PromptDelivery::Argument);
        config.timeout_seconds = 1;
        let client = CommandClient::new(config);

        let failure = client.generate("q").await.unwrap_err();
        assert_eq!(failure.describe(), "test timed out after 1s");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_timeout_covers_unread_stdin() {
        // Larger than any pipe buffer, and the backend never reads it
        let prompt = "x".repeat(1024 * 1024);
        let mut config = backend(&["sh", "-c", "sleep 20"], PromptDelivery::Stdin);
        config.timeout_seconds = 1;
        let client = CommandClient::new(config);

        let failure = tokio::time::timeout(Duration::from_secs(6), client.generate(&prompt))
            .await
            .expect("generate outlived its timeout")
            .unwrap_err();
        assert_eq!(failure.describe(), "test timed out after 1s");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_backend_ignoring_stdin() {
        let client = CommandClient::new(backend(&["sh", "-c", "echo ready"], PromptDelivery::Stdin));
        let prompt = "x".repeat(1024 * 1024);
        assert_eq!(client.generate(&prompt).await.unwrap(), "ready");
    }

    #[tokio::test]
    async fn test_generate_missing_binary() {
        let client = CommandClient::new(backend(
            &["promptbox-definitely-not-a-real-binary"],
            PromptDelivery::Stdin,
        ));
        let failure = client.generate("q").await.unwrap_err();
        assert!(failure.describe().starts_with("Failed to start test"));
    }

    #[tokio::test]
    async fn test_generate_empty_command() {
        let client = CommandClient::new(backend(&[], PromptDelivery::Stdin));
        let failure = client.generate("q").await.unwrap_err();
        assert_eq!(failure.describe(), "test: no command configured");
    }
}
