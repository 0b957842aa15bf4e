//! Integration layers for the external systems `git-storyid` talks to.
//!
//! - [`git`]: staged diff and commit via the git CLI
//! - [`tracker`]: story lookup and listing in Pivotal Tracker
//! - [`tracker_curl`]: curl-based HTTP client for the tracker API
//!
//! Each external system sits behind a trait with a real implementation and a
//! mock for tests.

pub mod git;
pub mod tracker;
pub mod tracker_curl;
