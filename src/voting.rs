//! Voting window
//!
//! A single end timestamp decides whether votes are accepted. There is no
//! start time and no per-project window.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingWindow {
    /// Seconds since epoch
    end_timestamp: i64,
}

/// Body of `GET /status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum VotingStatus {
    Open {
        #[serde(rename = "remainingTime")]
        remaining_time: i64,
    },
    Closed,
}

impl VotingWindow {
    pub const fn new(end_timestamp: i64) -> Self {
        Self { end_timestamp }
    }

    /// Milliseconds left until the window closes; zero or negative once closed
    pub fn remaining_millis(&self, now: DateTime<Utc>) -> i64 {
        self.end_timestamp
            .saturating_mul(1000)
            .saturating_sub(now.timestamp_millis())
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.remaining_millis(now) > 0
    }

    pub fn status(&self, now: DateTime<Utc>) -> VotingStatus {
        match self.remaining_millis(now) {
            remaining if remaining > 0 => VotingStatus::Open {
                remaining_time: remaining,
            },
            _ => VotingStatus::Closed,
        }
    }
}
