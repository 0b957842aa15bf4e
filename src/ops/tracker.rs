#![allow(async_fn_in_trait)]

use anyhow::Context;
use anyhow::Result;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use tracing::instrument;

use super::tracker_curl::TrackerCurlClient;
use crate::config::Config;

const TRACKER_HOST: &str = "www.pivotaltracker.com";

// -----------------------------------------------------------------------------
// Types

pub type StoryId = u64;

/// A story in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub name: String,
    #[serde(default)]
    pub current_state: StoryState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryState {
    Unscheduled,
    Unstarted,
    Planned,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
    #[default]
    #[serde(other)]
    Other,
}

/// Filter for listing stories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryFilter {
    /// Owner initials.
    pub owner: String,
    pub states: Vec<StoryState>,
    pub limit: usize,
}

// -----------------------------------------------------------------------------
// TrackerOps trait

/// Operations for interacting with the story tracker
#[cfg_attr(test, automock)]
pub trait TrackerOps {
    /// Look up a story by id; `None` if it does not exist.
    async fn find_story(&self, id: StoryId) -> Result<Option<Story>>;

    /// List stories matching `filter`, in the order the tracker returns them.
    async fn list_stories(&self, filter: &StoryFilter) -> Result<Vec<Story>>;
}

// -----------------------------------------------------------------------------
// StoryState impl

impl StoryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Unstarted => "unstarted",
            Self::Planned => "planned",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Delivered => "delivered",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Other => "other",
        }
    }
}

// -----------------------------------------------------------------------------
// StoryFilter impl

impl StoryFilter {
    /// Tracker search syntax, e.g. `owner:BG state:started,finished`.
    pub fn search_query(&self) -> String {
        let states = self
            .states
            .iter()
            .map(StoryState::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!("owner:{} state:{}", self.owner, states)
    }
}

// -----------------------------------------------------------------------------
// PivotalTracker

/// Client for the Pivotal Tracker v5 REST API, scoped to one project.
pub struct PivotalTracker {
    base_url: String,
    project_id: String,
    http_client: TrackerCurlClient,
}

impl PivotalTracker {
    pub fn new(config: &Config) -> Result<Self> {
        let scheme = if config.use_ssl() { "https" } else { "http" };
        Ok(Self {
            base_url: format!("{scheme}://{TRACKER_HOST}/services/v5"),
            project_id: config.project_id()?,
            http_client: TrackerCurlClient::new(config.api_token()?),
        })
    }

    fn stories_url(&self) -> String {
        format!("{}/projects/{}/stories", self.base_url, self.project_id)
    }
}

impl TrackerOps for PivotalTracker {
    #[instrument(skip(self))]
    async fn find_story(&self, id: StoryId) -> Result<Option<Story>> {
        let url = format!("{}/{}", self.stories_url(), id);
        let Some(response) = self.http_client.get(&url, &[]).await? else {
            return Ok(None);
        };
        let story = serde_json::from_str(&response)
            .with_context(|| format!("Failed to parse story {id}"))?;
        Ok(Some(story))
    }

    #[instrument(skip(self))]
    async fn list_stories(&self, filter: &StoryFilter) -> Result<Vec<Story>> {
        let query = [
            ("filter", filter.search_query()),
            ("limit", filter.limit.to_string()),
        ];
        let response = self
            .http_client
            .get(&self.stories_url(), &query)
            .await?
            .context("Project not found")?;
        serde_json::from_str(&response).context("Failed to parse stories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigMap;
    use crate::config::ConfigValue;

    fn config(use_ssl: bool) -> Config {
        Config::new(ConfigMap::from([
            ("api_token".to_string(), ConfigValue::String("abc".into())),
            ("use_ssl".to_string(), ConfigValue::Bool(use_ssl)),
            ("project_id".to_string(), ConfigValue::Integer(1234)),
        ]))
    }

    #[test]
    fn test_deserialize_story() {
        let json = r#"{
            "kind": "story",
            "id": 555,
            "project_id": 1234,
            "name": "  Fix login  ",
            "current_state": "started",
            "owner_ids": [1]
        }"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.id, 555);
        assert_eq!(story.name, "  Fix login  ");
        assert_eq!(story.current_state, StoryState::Started);
    }

    #[test]
    fn test_deserialize_unknown_state() {
        let story: Story =
            serde_json::from_str(r#"{"id": 1, "name": "x", "current_state": "archived"}"#).unwrap();
        assert_eq!(story.current_state, StoryState::Other);
    }

    #[test]
    fn test_search_query() {
        let filter = StoryFilter {
            owner: "BG".to_string(),
            states: vec![
                StoryState::Started,
                StoryState::Finished,
                StoryState::Delivered,
            ],
            limit: 30,
        };
        insta::assert_snapshot!(filter.search_query(), @"owner:BG state:started,finished,delivered");
    }

    #[test]
    fn test_stories_url_follows_ssl_setting() {
        let secure = PivotalTracker::new(&config(true)).unwrap();
        insta::assert_snapshot!(secure.stories_url(), @"https://www.pivotaltracker.com/services/v5/projects/1234/stories");

        let plain = PivotalTracker::new(&config(false)).unwrap();
        assert!(plain.stories_url().starts_with("http://"));
    }

    #[test]
    fn test_new_requires_token() {
        let config = Config::new(ConfigMap::from([(
            "project_id".to_string(),
            ConfigValue::Integer(1),
        )]));
        assert!(PivotalTracker::new(&config).is_err());
    }
}
