//! Leaderboard records and the local merge transport.
//!
//! The wire shape, sort key `(level DESC, xp DESC)`, and top-50 truncation
//! are a compatibility contract; any remote transport must match them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::state::UserState;

pub const LEADERBOARD_LIMIT: usize = 50;

/// One leaderboard row, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub equipped_frame: Option<String>,
    #[serde(default)]
    pub equipped_title: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Last submission time, ISO day key.
    #[serde(default)]
    pub last_active: String,
}

impl LeaderboardEntry {
    /// Build a submission row from the user's current state.
    #[must_use]
    pub fn from_state(state: &UserState, now: NaiveDateTime) -> Self {
        Self {
            username: state.username.clone(),
            level: state.level,
            xp: state.xp,
            equipped_frame: state.equipped_frame.clone(),
            equipped_title: state.equipped_title.clone(),
            profile_picture: state.profile_picture.clone(),
            last_active: crate::clock::day_key(now),
        }
    }
}

/// Pluggable leaderboard backend. [`LocalLeaderboard`] is the in-process
/// reference; an HTTP transport implements the same contract remotely.
pub trait LeaderboardTransport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Upsert a row keyed by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the submission cannot be delivered.
    fn submit(&mut self, entry: LeaderboardEntry) -> Result<(), Self::Error>;

    /// The top rows, ordered by `(level DESC, xp DESC)`, at most
    /// [`LEADERBOARD_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be fetched.
    fn top(&self) -> Result<Vec<LeaderboardEntry>, Self::Error>;
}

/// In-process leaderboard holding the merged top rows directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalLeaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl LocalLeaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously serialized board. Unreadable input yields an
    /// empty board.
    #[must_use]
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log::warn!("discarding unreadable leaderboard cache: {err}");
            Self::new()
        })
    }

    /// # Errors
    ///
    /// Returns an error if the board cannot be serialized.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Upsert, re-sort, truncate. The whole merge in one place so every
    /// transport mutation leaves the board in contract shape.
    pub fn merge(&mut self, entry: LeaderboardEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.username == entry.username)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self.entries
            .sort_by(|a, b| b.level.cmp(&a.level).then(b.xp.cmp(&a.xp)));
        self.entries.truncate(LEADERBOARD_LIMIT);
    }
}

impl LeaderboardTransport for LocalLeaderboard {
    type Error = std::convert::Infallible;

    fn submit(&mut self, entry: LeaderboardEntry) -> Result<(), Self::Error> {
        self.merge(entry);
        Ok(())
    }

    fn top(&self) -> Result<Vec<LeaderboardEntry>, Self::Error> {
        Ok(self.entries.clone())
    }
}
