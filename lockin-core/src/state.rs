//! User progression state: the root aggregate every engine function mutates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ranks::{self, rank_for_level};

/// Baseline number of `daily_stats` entries kept when a persistence write
/// fails and history has to be trimmed oldest-first.
pub const HISTORY_TRIM_KEEP: usize = 90;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathId {
    Productive,
    Stronger,
    Extrovert,
    #[default]
    Discipline,
    MentalHealth,
    Other,
}

/// The five paths that feed the overall rating. `Other` is excluded.
pub const CANONICAL_PATHS: [PathId; 5] = [
    PathId::Productive,
    PathId::Stronger,
    PathId::Extrovert,
    PathId::Discipline,
    PathId::MentalHealth,
];

impl PathId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Productive => "PRODUCTIVE",
            Self::Stronger => "STRONGER",
            Self::Extrovert => "EXTROVERT",
            Self::Discipline => "DISCIPLINE",
            Self::MentalHealth => "MENTAL_HEALTH",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRODUCTIVE" => Ok(Self::Productive),
            "STRONGER" => Ok(Self::Stronger),
            "EXTROVERT" => Ok(Self::Extrovert),
            "DISCIPLINE" => Ok(Self::Discipline),
            "MENTAL_HEALTH" => Ok(Self::MentalHealth),
            "OTHER" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionCadence {
    #[default]
    Regular,
    Daily,
    Weekly,
    Routine,
}

/// Cadences that rotate against a candidate pool with a fixed capacity.
pub const POOLED_CADENCES: [MissionCadence; 3] = [
    MissionCadence::Regular,
    MissionCadence::Daily,
    MissionCadence::Weekly,
];

impl MissionCadence {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Routine => "ROUTINE",
        }
    }

    /// XP granted on completion. ROUTINE pays the REGULAR tier.
    #[must_use]
    pub const fn reward(self) -> u32 {
        match self {
            Self::Regular | Self::Routine => 50,
            Self::Daily => 100,
            Self::Weekly => 200,
        }
    }

    /// Active-slot capacity; `None` means catalog-sized (ROUTINE).
    #[must_use]
    pub const fn capacity(self) -> Option<usize> {
        match self {
            Self::Routine => None,
            _ => Some(3),
        }
    }
}

impl fmt::Display for MissionCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionCadence {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGULAR" => Ok(Self::Regular),
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "ROUTINE" => Ok(Self::Routine),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Id,
}

/// Opaque mission identifier. Regenerating a mission's text always allocates
/// a fresh id, so a stale completion can never hit a recycled slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct MissionId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub text: String,
    #[serde(rename = "type")]
    pub cadence: MissionCadence,
    #[serde(default)]
    pub completed: bool,
}

/// Frozen snapshot of one path's advancement while that path is dormant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathProgress {
    #[serde(default)]
    pub xp: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub last_mission_date: String,
    #[serde(default)]
    pub last_weekly_date: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub highest_rank_achieved: String,
}

impl Default for PathProgress {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            missions: Vec::new(),
            last_mission_date: String::new(),
            last_weekly_date: String::new(),
            badges: Vec::new(),
            highest_rank_achieved: ranks::RANKS[0].name.to_string(),
        }
    }
}

/// User-authored mission text, keyed by cadence. Only consulted while the
/// OTHER path is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomMissions {
    #[serde(default, rename = "REGULAR")]
    pub regular: Vec<String>,
    #[serde(default, rename = "DAILY")]
    pub daily: Vec<String>,
    #[serde(default, rename = "WEEKLY")]
    pub weekly: Vec<String>,
    #[serde(default, rename = "ROUTINE")]
    pub routine: Vec<String>,
}

impl CustomMissions {
    #[must_use]
    pub fn list(&self, cadence: MissionCadence) -> &[String] {
        match cadence {
            MissionCadence::Regular => &self.regular,
            MissionCadence::Daily => &self.daily,
            MissionCadence::Weekly => &self.weekly,
            MissionCadence::Routine => &self.routine,
        }
    }

    fn list_mut(&mut self, cadence: MissionCadence) -> &mut Vec<String> {
        match cadence {
            MissionCadence::Regular => &mut self.regular,
            MissionCadence::Daily => &mut self.daily,
            MissionCadence::Weekly => &mut self.weekly,
            MissionCadence::Routine => &mut self.routine,
        }
    }

    /// Append a mission text; duplicate text within a cadence is rejected.
    pub fn add(&mut self, cadence: MissionCadence, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let list = self.list_mut(cadence);
        if list.iter().any(|existing| existing == text) {
            return false;
        }
        list.push(text.to_string());
        true
    }

    pub fn remove(&mut self, cadence: MissionCadence, text: &str) -> bool {
        let list = self.list_mut(cadence);
        let before = list.len();
        list.retain(|existing| existing != text);
        list.len() != before
    }
}

fn default_level() -> u32 {
    1
}

const fn default_true() -> bool {
    true
}

/// The root aggregate, one per logged-in user.
///
/// The top-level xp/level/missions/badges fields mirror the *active* path's
/// progression; every dormant path lives in `path_progress`. Invariant:
/// `path_progress` never holds an entry for `chosen_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub username: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_true")]
    pub is_logged_in: bool,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub has_prompted_pfp: bool,
    #[serde(default)]
    pub chosen_path: Option<PathId>,

    // Live progression mirror for the active path.
    #[serde(default)]
    pub xp: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub last_mission_date: String,
    #[serde(default)]
    pub last_weekly_date: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub highest_rank_achieved: String,

    #[serde(default)]
    pub path_progress: BTreeMap<PathId, PathProgress>,

    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_active_date: String,
    #[serde(default)]
    pub show_streak_animation: bool,

    // Two-phase level-up transition; the presentation layer clears the flag.
    #[serde(default)]
    pub animating_level_up: bool,
    #[serde(default = "default_level")]
    pub previous_level: u32,

    #[serde(default)]
    pub unlocked_frames: Vec<String>,
    #[serde(default)]
    pub equipped_frame: Option<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub equipped_title: Option<String>,

    /// ISO day key -> missions completed that day. Past entries never mutate.
    #[serde(default)]
    pub daily_stats: BTreeMap<String, u32>,

    #[serde(default)]
    pub custom_missions: CustomMissions,

    #[serde(default)]
    pub next_mission_id: u64,
}

impl UserState {
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            profile_picture: None,
            language: Language::En,
            is_logged_in: true,
            onboarding_completed: false,
            has_prompted_pfp: false,
            chosen_path: None,
            xp: 0,
            level: 1,
            missions: Vec::new(),
            last_mission_date: String::new(),
            last_weekly_date: String::new(),
            badges: Vec::new(),
            highest_rank_achieved: ranks::RANKS[0].name.to_string(),
            path_progress: BTreeMap::new(),
            streak: 0,
            last_active_date: String::new(),
            show_streak_animation: false,
            animating_level_up: false,
            previous_level: 1,
            unlocked_frames: Vec::new(),
            equipped_frame: None,
            titles: Vec::new(),
            equipped_title: None,
            daily_stats: BTreeMap::new(),
            custom_missions: CustomMissions::default(),
            next_mission_id: 1,
        }
    }

    /// Parse a persisted record, default-filling anything a legacy blob
    /// lacks. Never rejects: unparseable input yields a fresh state.
    #[must_use]
    pub fn from_saved(username: &str, json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(mut state) => {
                state.is_logged_in = true;
                state.rehydrate();
                state
            }
            Err(err) => {
                log::warn!("discarding unreadable record for {username}: {err}");
                Self::new(username)
            }
        }
    }

    pub fn allocate_mission_id(&mut self) -> MissionId {
        // Legacy records predate the counter; skip past any ids in use.
        if self.next_mission_id == 0 {
            self.next_mission_id = 1;
        }
        let id = MissionId(self.next_mission_id);
        self.next_mission_id += 1;
        id
    }

    #[must_use]
    pub fn mission(&self, id: MissionId) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id == id)
    }

    /// Fix up invariants a legacy or hand-edited record may violate.
    pub fn rehydrate(&mut self) {
        if self.level == 0 {
            self.level = 1;
        }
        if self.previous_level == 0 {
            self.previous_level = self.level;
        }
        if ranks::rank_index(&self.highest_rank_achieved).is_none() {
            self.highest_rank_achieved = rank_for_level(self.level).name.to_string();
        }
        let max_used = self.missions.iter().map(|m| m.id.0).max().unwrap_or(0);
        if self.next_mission_id <= max_used {
            self.next_mission_id = max_used + 1;
        }
        for progress in self.path_progress.values_mut() {
            if progress.level == 0 {
                progress.level = 1;
            }
            if ranks::rank_index(&progress.highest_rank_achieved).is_none() {
                progress.highest_rank_achieved = rank_for_level(progress.level).name.to_string();
            }
        }
        // The live mirror is authoritative for the active path.
        if let Some(active) = self.chosen_path {
            self.path_progress.remove(&active);
        }
    }

    /// Freeze the live mirror into a dormant snapshot.
    #[must_use]
    pub fn snapshot_live(&self) -> PathProgress {
        PathProgress {
            xp: self.xp,
            level: self.level,
            missions: self.missions.clone(),
            last_mission_date: self.last_mission_date.clone(),
            last_weekly_date: self.last_weekly_date.clone(),
            badges: self.badges.clone(),
            highest_rank_achieved: self.highest_rank_achieved.clone(),
        }
    }

    /// Replace the live mirror with a dormant snapshot.
    pub fn restore_live(&mut self, progress: PathProgress) {
        self.xp = progress.xp;
        self.level = progress.level;
        self.missions = progress.missions;
        self.last_mission_date = progress.last_mission_date;
        self.last_weekly_date = progress.last_weekly_date;
        self.badges = progress.badges;
        self.highest_rank_achieved = progress.highest_rank_achieved;
    }

    /// Push into a monotonically growing, de-duplicated set. Returns whether
    /// the value was newly added.
    pub fn unlock_badge(&mut self, badge: &str) -> bool {
        push_unique(&mut self.badges, badge)
    }

    pub fn unlock_title(&mut self, title: &str) -> bool {
        push_unique(&mut self.titles, title)
    }

    pub fn unlock_frame(&mut self, frame: &str) -> bool {
        push_unique(&mut self.unlocked_frames, frame)
    }

    /// Active-path level plus every dormant path's level.
    #[must_use]
    pub fn total_levels(&self) -> u32 {
        let dormant: u32 = self.path_progress.values().map(|p| p.level).sum();
        self.level.saturating_add(dormant)
    }

    /// Distinct badges across the live mirror and every dormant path.
    #[must_use]
    pub fn total_badges(&self) -> u32 {
        let mut seen: Vec<&str> = Vec::new();
        for badge in self
            .badges
            .iter()
            .chain(self.path_progress.values().flat_map(|p| p.badges.iter()))
        {
            if !seen.contains(&badge.as_str()) {
                seen.push(badge);
            }
        }
        u32::try_from(seen.len()).unwrap_or(u32::MAX)
    }

    /// Lifetime mission completions, from `daily_stats`.
    #[must_use]
    pub fn total_missions_completed(&self) -> u32 {
        self.daily_stats
            .values()
            .fold(0u32, |acc, count| acc.saturating_add(*count))
    }

    /// Drop the oldest `daily_stats` entries until at most `keep` remain.
    /// Returns whether anything was removed. Used as the quota fallback when
    /// a persistence write fails.
    pub fn trim_history(&mut self, keep: usize) -> bool {
        if self.daily_stats.len() <= keep {
            return false;
        }
        while self.daily_stats.len() > keep {
            let Some(oldest) = self.daily_stats.keys().next().cloned() else {
                break;
            };
            self.daily_stats.remove(&oldest);
        }
        true
    }

    /// Wipe all progression while keeping identity and profile fields.
    pub fn reset_progression(&mut self) {
        let fresh = Self::new(&self.username);
        self.chosen_path = None;
        self.onboarding_completed = false;
        self.xp = fresh.xp;
        self.level = fresh.level;
        self.missions = fresh.missions;
        self.last_mission_date = fresh.last_mission_date;
        self.last_weekly_date = fresh.last_weekly_date;
        self.badges = fresh.badges;
        self.highest_rank_achieved = fresh.highest_rank_achieved;
        self.path_progress = fresh.path_progress;
        self.streak = fresh.streak;
        self.last_active_date = fresh.last_active_date;
        self.show_streak_animation = false;
        self.animating_level_up = false;
        self.previous_level = 1;
        self.unlocked_frames = fresh.unlocked_frames;
        self.equipped_frame = None;
        self.titles = fresh.titles;
        self.equipped_title = None;
        self.daily_stats = fresh.daily_stats;
    }
}

fn push_unique(set: &mut Vec<String>, value: &str) -> bool {
    if set.iter().any(|existing| existing == value) {
        false
    } else {
        set.push(value.to_string());
        true
    }
}
