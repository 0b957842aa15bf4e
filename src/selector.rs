use anyhow::Result;
use anyhow::bail;
use colored::Colorize;
use regex::Regex;
use tracing::debug;

use crate::ops::tracker::Story;
use crate::ops::tracker::StoryFilter;
use crate::ops::tracker::StoryId;
use crate::ops::tracker::StoryState;
use crate::ops::tracker::TrackerOps;
use crate::prompt::LineReader;

/// Maximum number of stories offered for interactive selection.
pub const STORY_LIMIT: usize = 30;

/// States of stories that can be referenced from a commit.
pub const ACTIVE_STATES: [StoryState; 3] = [
    StoryState::Started,
    StoryState::Finished,
    StoryState::Delivered,
];

const INDEXES_PROMPT: &str = "Indexes(csv)";

/// Picks the stories a commit refers to.
pub struct StorySelector<'a, T> {
    tracker: &'a T,
}

impl<'a, T: TrackerOps> StorySelector<'a, T> {
    pub fn new(tracker: &'a T) -> Self {
        Self { tracker }
    }

    /// Look up each story reference given on the command line, e.g. `42` or
    /// `#42`. Empty references are skipped.
    pub async fn resolve(&self, references: &[String]) -> Result<Vec<Story>> {
        let mut stories = vec![];
        for reference in references.iter().map(|r| r.trim()) {
            if reference.is_empty() {
                continue;
            }
            let Some(id) = parse_story_id(reference) else {
                bail!("Story {} not found.", reference);
            };
            let Some(story) = self.tracker.find_story(id).await? else {
                bail!("Story {} not found.", reference);
            };
            stories.push(story);
        }
        Ok(stories)
    }

    /// List the operator's active stories and let them pick by index.
    pub async fn select_interactively(
        &self,
        me: &str,
        reader: &mut impl LineReader,
        stdout: &mut impl std::io::Write,
    ) -> Result<Vec<Story>> {
        let filter = StoryFilter {
            owner: me.to_string(),
            states: ACTIVE_STATES.to_vec(),
            limit: STORY_LIMIT,
        };
        let candidates = self.tracker.list_stories(&filter).await?;
        if candidates.is_empty() {
            bail!("No stories started and owned by you.");
        }

        for (i, story) in candidates.iter().enumerate() {
            writeln!(stdout, "{} {}", format!("[{}]", i + 1).cyan(), story.name)?;
        }
        writeln!(stdout)?;

        let answer = reader.read_line(INDEXES_PROMPT)?;
        let indexes = parse_selection(&answer, candidates.len())?;
        debug!(?indexes, "selected stories");

        Ok(indexes
            .into_iter()
            .map(|index| candidates[index].clone())
            .collect())
    }
}

fn parse_story_id(reference: &str) -> Option<StoryId> {
    reference.strip_prefix('#').unwrap_or(reference).parse().ok()
}

/// Parse a comma-separated list of 1-based indexes into a list of `count`
/// entries. Returns 0-based indexes in the order typed, duplicates included.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>> {
    let separator = Regex::new(r"\s*,\s*")?;
    let mut indexes = vec![];
    for token in separator.split(input.trim()) {
        if token.is_empty() {
            continue;
        }
        match token.parse::<usize>() {
            Ok(index) if (1..=count).contains(&index) => indexes.push(index - 1),
            _ => bail!("Story index {} not found.", token),
        }
    }
    Ok(indexes)
}
