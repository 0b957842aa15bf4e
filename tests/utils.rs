#![allow(async_fn_in_trait)]

use std::path::Path;
use std::process::Stdio;

use git_storyid::ops::tracker::Story;
use git_storyid::ops::tracker::StoryFilter;
use git_storyid::ops::tracker::StoryId;
use git_storyid::ops::tracker::StoryState;
use git_storyid::ops::tracker::TrackerOps;
use tokio::process::Command;

/// Creates a git repository in the given directory.
///
/// This initializes the repo and sets basic git config needed for commits.
/// The directory should already exist.
pub async fn create_git_repo(dir: &Path) -> anyhow::Result<()> {
    git(dir, &["init"]).await?;
    git(dir, &["config", "user.name", "Test User"]).await?;
    git(dir, &["config", "user.email", "test@example.com"]).await?;
    git(dir, &["config", "commit.gpgsign", "false"]).await?;
    Ok(())
}

/// Writes a file and stages it.
pub async fn stage_file(dir: &Path, filename: &str, contents: &str) -> anyhow::Result<()> {
    tokio::fs::write(dir.join(filename), contents).await?;
    git(dir, &["add", filename]).await
}

/// Gets the full message of the latest commit.
pub async fn last_commit_message(dir: &Path) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%B"])
        .current_dir(dir)
        .output()
        .await?;
    anyhow::ensure!(output.status.success(), "git log failed");

    Ok(String::from_utf8(output.stdout)?.trim_end().to_string())
}

/// Counts the commits on the current branch (zero for an unborn branch).
pub async fn commit_count(dir: &Path) -> anyhow::Result<usize> {
    let output = Command::new("git")
        .args(["rev-list", "--count", "HEAD"])
        .current_dir(dir)
        .stderr(Stdio::null())
        .output()
        .await?;
    if !output.status.success() {
        return Ok(0);
    }
    Ok(String::from_utf8(output.stdout)?.trim().parse()?)
}

async fn git(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    anyhow::ensure!(status.success(), "git {} failed", args.join(" "));

    Ok(())
}

/// Tracker backed by a fixed list of stories.
pub struct FakeTracker {
    pub stories: Vec<Story>,
}

impl FakeTracker {
    pub fn new(stories: &[(StoryId, &str)]) -> Self {
        Self {
            stories: stories
                .iter()
                .map(|(id, name)| Story {
                    id: *id,
                    name: name.to_string(),
                    current_state: StoryState::Started,
                })
                .collect(),
        }
    }
}

impl TrackerOps for FakeTracker {
    async fn find_story(&self, id: StoryId) -> anyhow::Result<Option<Story>> {
        Ok(self.stories.iter().find(|story| story.id == id).cloned())
    }

    async fn list_stories(&self, filter: &StoryFilter) -> anyhow::Result<Vec<Story>> {
        Ok(self
            .stories
            .iter()
            .filter(|story| filter.states.contains(&story.current_state))
            .take(filter.limit)
            .cloned()
            .collect())
    }
}
