#![allow(async_fn_in_trait)]

use std::path;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

// -----------------------------------------------------------------------------
// GitOps trait

/// Operations for interacting with Git
#[cfg_attr(test, automock)]
pub trait GitOps {
    /// Output of `git diff --staged`; empty when nothing is staged.
    async fn staged_diff(&self) -> Result<String>;

    /// Commit the staged changes with `message`.
    /// The combined output is returned whether or not git succeeded.
    async fn commit(&self, message: &str) -> Result<CommandOutput>;
}

/// Output of a finished git process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr.
    pub text: String,
    pub success: bool,
}

// -----------------------------------------------------------------------------
// RealGit

/// Real implementation that calls the git CLI
pub struct RealGit {
    path: path::PathBuf,
}

impl RealGit {
    pub fn new(path: path::PathBuf) -> Self {
        Self { path }
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .current_dir(&self.path)
            .args(args)
            .output()
            .await
            .context("Failed to execute git command")?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput {
            text,
            success: output.status.success(),
        })
    }
}

impl GitOps for RealGit {
    async fn staged_diff(&self) -> Result<String> {
        let output = self.run(&["diff", "--staged"]).await?;
        if !output.success {
            bail!("git command failed: {}", output.text.trim_end());
        }
        Ok(output.text)
    }

    async fn commit(&self, message: &str) -> Result<CommandOutput> {
        self.run(&["commit", "-m", message]).await
    }
}
