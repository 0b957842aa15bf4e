use anyhow::Result;
use anyhow::bail;
use tracing::info;
use tracing::warn;

use crate::App;
use crate::config::Config;
use crate::message;
use crate::ops::git::GitOps;
use crate::ops::tracker::TrackerOps;
use crate::prompt::LineReader;
use crate::selector::StorySelector;

pub const NO_STAGED_CHANGES: &str = "No changes staged to commit.";

/// What was asked for on the command line.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    /// Free text added after the story references.
    pub note: Option<String>,
    /// Story references; the user picks interactively when empty.
    pub stories: Vec<String>,
}

impl<G: GitOps, R: LineReader> App<G, R> {
    /// Commit the staged changes with a message referencing tracker stories.
    ///
    /// 1. Stop if nothing is staged.
    /// 2. Complete the configuration and connect to the tracker with it.
    /// 3. Resolve the requested stories, or let the user pick from their
    ///    active stories.
    /// 4. Commit with the composed message and print git's output, whether
    ///    or not git succeeded.
    pub async fn cmd_commit<T, F>(
        &mut self,
        request: &CommitRequest,
        connect: F,
        stdout: &mut impl std::io::Write,
    ) -> Result<()>
    where
        T: TrackerOps,
        F: FnOnce(&Config) -> Result<T>,
    {
        if self.git.staged_diff().await?.is_empty() {
            bail!(NO_STAGED_CHANGES);
        }

        let config = self.config.ensure_full_config(&mut self.reader, stdout)?;
        let tracker = connect(config)?;
        let selector = StorySelector::new(&tracker);

        let stories = if request.stories.is_empty() {
            let me = config.me()?;
            selector
                .select_interactively(&me, &mut self.reader, stdout)
                .await?
        } else {
            selector.resolve(&request.stories).await?
        };
        if stories.is_empty() {
            bail!("No stories selected.");
        }

        let message = message::compose(&stories, request.note.as_deref());
        info!(stories = stories.len(), "committing");
        let output = self.git.commit(&message).await?;
        if !output.success {
            warn!("git commit exited with an error");
        }
        writeln!(stdout, "{}", output.text.trim_end())?;
        Ok(())
    }
}
