//! Project store
//!
//! Projects and their vote records live in a remote document store. This
//! module defines the documents this service reads and writes plus the
//! `ProjectStore` seam the router talks to.

mod data_api;
mod pipeline;

pub use data_api::DataApiStore;
pub use pipeline::tally_pipeline;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum contribution of a single voter IP to one project's total
pub const VOTE_CAP_PER_IP: u64 = 10;

/// A votable project as exposed by `GET /projects`
///
/// Vote records are deliberately absent: they never leave the store through
/// this type, whatever the store returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "cat", default)]
    pub category: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// One vote, appended to a project's `votes` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub ip: String,
    pub user_agent: String,
    /// ISO-8601, UTC, millisecond precision
    pub time: String,
}

/// Aggregated, capped vote total of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
}

impl VoteRecord {
    pub fn now(ip: &str, user_agent: &str) -> Self {
        Self {
            ip: ip.to_string(),
            user_agent: user_agent.to_string(),
            time: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Operations the router needs from the project store
#[allow(async_fn_in_trait)]
pub trait ProjectStore {
    /// All projects, without their vote records
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;

    /// Append a vote to `project_id`; `false` when no project matched
    async fn cast_vote(&self, project_id: u64, ip: &str, user_agent: &str)
        -> Result<bool, AppError>;

    /// Per-project totals, each voter IP capped at `VOTE_CAP_PER_IP`,
    /// sorted by total descending
    async fn vote_tallies(&self) -> Result<Vec<VoteTally>, AppError>;
}
