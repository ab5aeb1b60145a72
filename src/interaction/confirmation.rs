use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Title and body of a yes/no gate shown before an irreversible action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub title: &'static str,
    pub body: &'static str,
}

/// Yes/no gate. Only an explicit affirmative answer returns `true`.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

/// Approves everything; backs the `--yes` flag
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

#[async_trait]
impl Confirmation for AutoApprove {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        tracing::debug!(title = prompt.title, "Auto-approved confirmation");
        true
    }
}

/// Asks on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmation;

#[async_trait]
impl Confirmation for TerminalConfirmation {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        let mut stdout = tokio::io::stdout();
        let question = format!("\n{}\n{}\nProceed? [y/N] ", prompt.title, prompt.body);
        if stdout.write_all(question.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
