use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GhError {
    #[error("GitHub CLI is not authenticated: {0} (run `gh auth login`)")]
    AuthenticationRequired(String),

    #[error("pull request not found or not readable: {0}")]
    ReferenceNotFound(String),

    #[error("failed to run the GitHub CLI: {0}")]
    Transport(#[from] std::io::Error),

    #[error("GitHub CLI produced non-UTF-8 output")]
    NonUtf8Output,

    #[error("`gh {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Seam between the fetch/submit operations and the GitHub CLI, so tests can
/// substitute a scripted runner.
#[async_trait]
pub trait GhRunner: Send + Sync {
    /// Run `gh` with the given arguments, optionally piping `stdin` into it,
    /// and return its stdout. Non-zero exits are classified into GhError.
    async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String, GhError>;
}

/// Spawns the real `gh` binary. A pre-authenticated session is a
/// precondition; this client never reads or stores credentials.
pub struct GhCli {
    program: String,
}

impl GhCli {
    pub fn new(program: impl Into<String>) -> Self {
        GhCli {
            program: program.into(),
        }
    }
}

#[async_trait]
impl GhRunner for GhCli {
    async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String, GhError> {
        debug!(program = %self.program, ?args, "invoking gh");
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        if let Some(input) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes()).await?;
                // pipe drops here, closing gh's stdin
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&args.join(" "), &stderr));
        }

        String::from_utf8(output.stdout).map_err(|_| GhError::NonUtf8Output)
    }
}

/// Map a failed `gh` invocation onto a typed error by inspecting stderr.
/// Authentication and not-found phrasings are recognized; anything else
/// stays a generic command failure.
fn classify_failure(command: &str, stderr: &str) -> GhError {
    let lower = stderr.to_lowercase();
    if lower.contains("gh auth login")
        || lower.contains("authentication")
        || lower.contains("bad credentials")
        || lower.contains("http 401")
    {
        return GhError::AuthenticationRequired(first_line(stderr));
    }
    if lower.contains("could not resolve to a pullrequest")
        || lower.contains("no pull requests found")
        || lower.contains("not found")
        || lower.contains("http 404")
    {
        return GhError::ReferenceNotFound(first_line(stderr));
    }
    GhError::CommandFailed {
        command: command.to_string(),
        stderr: stderr.trim().to_string(),
    }
}

fn first_line(text: &str) -> String {
    text.trim().lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Scripted stand-in for the GitHub CLI: hands out canned results in
    /// call order and records every invocation's argv and stdin.
    pub struct FakeGh {
        responses: Mutex<Vec<Result<String, GhError>>>,
        pub calls: Mutex<Vec<Vec<String>>>,
        pub stdins: Mutex<Vec<Option<String>>>,
    }

    impl FakeGh {
        pub fn new(responses: Vec<Result<String, GhError>>) -> Self {
            FakeGh {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
                stdins: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GhRunner for FakeGh {
        async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String, GhError> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|s| s.to_string()).collect());
            self.stdins
                .lock()
                .unwrap()
                .push(stdin.map(|s| s.to_string()));
            let mut responses = self.responses.lock().unwrap();
            assert!(!responses.is_empty(), "FakeGh ran out of scripted responses");
            responses.remove(0)
        }
    }
}
