//! LockIn Habit Engine
//!
//! Platform-agnostic core logic for the LockIn self-improvement game.
//! This crate provides mission rotation, progression, ratings, and cosmetics
//! without UI or platform-specific dependencies. Time enters as an injected
//! `chrono::NaiveDateTime` and randomness as an injected `rand::Rng`, so
//! every state transition is reproducible.

pub mod catalog;
pub mod classify;
pub mod clock;
pub mod frames;
pub mod leaderboard;
pub mod missions;
pub mod progression;
pub mod ranks;
pub mod rating;
pub mod schedule;
pub mod state;
pub mod switcher;

// Re-export commonly used types
pub use catalog::{CadencePools, MissionCatalog};
pub use classify::{Classifier, KeywordTable, classify};
pub use frames::{ALL_FRAMES, FRAME_DEFAULT, evaluate_unlocks, is_unlocked};
pub use leaderboard::{
    LEADERBOARD_LIMIT, LeaderboardEntry, LeaderboardTransport, LocalLeaderboard,
};
pub use missions::{ReconcileOutcome, reconcile_missions};
pub use progression::{
    BADGE_DISCIPLINED, CompletionOutcome, StreakChange, complete_mission, complete_mission_with,
};
pub use ranks::{RANKS, Rank, rank_for_level};
pub use rating::{Ratings, compute_ratings, overall_rating};
pub use schedule::{REPLACEMENT_DELAY_SECS, ReplacementEvent, ReplacementScheduler};
pub use state::{
    CANONICAL_PATHS, CustomMissions, HISTORY_TRIM_KEEP, Language, Mission, MissionCadence,
    MissionId, PathId, PathProgress, UserState,
};
pub use switcher::{SwitchOutcome, change_path};

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the mission and quote catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error>;

    /// Load the keyword table used for cross-path attribution. The default
    /// is the built-in table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    fn load_keywords(&self) -> Result<KeywordTable, Self::Error> {
        Ok(KeywordTable::default())
    }
}

/// Trait for abstracting user-record persistence.
/// Platform-specific implementations should provide this.
pub trait ProgressStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a user's full state blob, keyed by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_user(&self, username: &str, json: &str) -> Result<(), Self::Error>;

    /// Load a user's state blob, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read.
    fn load_user(&self, username: &str) -> Result<Option<String>, Self::Error>;

    /// Delete a user's record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be deleted.
    fn delete_user(&self, username: &str) -> Result<(), Self::Error>;

    /// The identity whose session is currently active, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the pointer cannot be read.
    fn active_user(&self) -> Result<Option<String>, Self::Error>;

    /// Update (or with `None`, clear) the active-identity pointer.
    ///
    /// # Errors
    ///
    /// Returns an error if the pointer cannot be written.
    fn set_active_user(&self, username: Option<&str>) -> Result<(), Self::Error>;
}

/// Main engine for managing user sessions against a catalog source and a
/// persistence backend.
pub struct HabitEngine<L, S>
where
    L: CatalogLoader,
    S: ProgressStorage,
{
    catalog_loader: L,
    storage: S,
}

impl<L, S> HabitEngine<L, S>
where
    L: CatalogLoader,
    S: ProgressStorage,
{
    pub const fn new(catalog_loader: L, storage: S) -> Self {
        Self {
            catalog_loader,
            storage,
        }
    }

    /// Load the catalog from the configured source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn catalog(&self) -> Result<MissionCatalog, L::Error> {
        self.catalog_loader.load_catalog()
    }

    /// Start (or continue) a session for `username`. An existing record is
    /// rehydrated; a new identity gets a fresh default state.
    ///
    /// # Errors
    ///
    /// Returns an error if the record or the active pointer cannot be
    /// accessed.
    pub fn login(&self, username: &str) -> Result<UserState, S::Error> {
        let state = match self.storage.load_user(username)? {
            Some(json) => UserState::from_saved(username, &json),
            None => UserState::new(username),
        };
        self.storage.set_active_user(Some(username))?;
        Ok(state)
    }

    /// Resume the active identity's session, if one is pointed at.
    ///
    /// # Errors
    ///
    /// Returns an error if the pointer or record cannot be read.
    pub fn resume(&self) -> Result<Option<UserState>, S::Error> {
        let Some(username) = self.storage.active_user()? else {
            return Ok(None);
        };
        self.login(&username).map(Some)
    }

    /// Persist the state, marked logged out, and clear the active pointer.
    /// The record itself survives for the next login.
    ///
    /// # Errors
    ///
    /// Returns an error if the record or pointer cannot be written.
    pub fn logout(&self, state: &mut UserState) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        state.is_logged_in = false;
        self.persist(state).map_err(Into::into)?;
        self.storage.set_active_user(None).map_err(Into::into)?;
        Ok(())
    }

    /// Write the full state blob. If the write fails (quota), retained
    /// history is trimmed oldest-first and the write retried once.
    ///
    /// # Errors
    ///
    /// Returns the second write error if trimming did not help, or the
    /// first if there was nothing left to trim.
    pub fn persist(&self, state: &mut UserState) -> Result<(), S::Error> {
        let json = serialize_state(state);
        match self.storage.save_user(&state.username, &json) {
            Ok(()) => Ok(()),
            Err(err) => {
                if !state.trim_history(HISTORY_TRIM_KEEP) {
                    return Err(err);
                }
                log::warn!(
                    "save failed for {}; retrying with trimmed history: {err}",
                    state.username
                );
                self.storage.save_user(&state.username, &serialize_state(state))
            }
        }
    }
}

fn serialize_state(state: &UserState) -> String {
    // UserState has no non-serializable fields; this cannot fail in practice.
    serde_json::to_string(state).unwrap_or_else(|err| {
        log::error!("state serialization failed: {err}");
        String::from("{}")
    })
}
