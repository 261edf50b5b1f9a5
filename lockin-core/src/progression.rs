//! Completion handling: XP, levels, ranks, streaks, badges, titles, frames,
//! and cross-path attribution for the custom path.
//!
//! Everything here is a deterministic function of (state, mission id, now).
//! Unknown ids, repeat completions, and missing archive entries degrade to
//! no-ops; nothing errors.

use chrono::NaiveDateTime;

use crate::classify::Classifier;
use crate::clock::{day_gap, day_key, hour_of};
use crate::frames;
use crate::ranks::advance_rank;
use crate::rating::overall_rating;
use crate::state::{MissionId, PathId, UserState};

pub const BADGE_DISCIPLINED: &str = "DISCIPLINED";

pub const TITLE_EARLY_BIRD: &str = "Early Bird";
pub const TITLE_NIGHT_OWL: &str = "Night Owl";
pub const TITLE_UNSTOPPABLE: &str = "Unstoppable";
pub const TITLE_LEGEND: &str = "Legend";
pub const TITLE_VETERAN: &str = "Veteran";
pub const TITLE_MASTER: &str = "Master";

const STREAK_UNSTOPPABLE: u32 = 5;
const STREAK_LEGEND: u32 = 30;
const LEVEL_VETERAN: u32 = 10;
const LEVEL_MASTER: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreakChange {
    /// Repeat completion on the same calendar day.
    #[default]
    Unchanged,
    /// Consecutive-day completion; streak grew by one.
    Extended,
    /// First completion ever, or a gap of more than one day.
    Reset,
}

/// What one completion did. `applied == false` means the id was unknown or
/// already completed and the state is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionOutcome {
    pub applied: bool,
    pub reward: u32,
    pub levels_gained: u32,
    pub rank_after: String,
    pub badge_earned: bool,
    pub streak_change: StreakChange,
    pub new_titles: Vec<String>,
    pub new_frames: Vec<String>,
    /// Path credited by cross-path attribution (OTHER path only).
    pub attributed_to: Option<PathId>,
}

/// Apply the effect of completing exactly one mission, using the built-in
/// keyword classifier for cross-path attribution.
pub fn complete_mission(
    state: &mut UserState,
    id: MissionId,
    now: NaiveDateTime,
) -> CompletionOutcome {
    complete_mission_with(state, id, now, None)
}

/// As [`complete_mission`], with an explicit classifier (swappable keyword
/// table).
pub fn complete_mission_with(
    state: &mut UserState,
    id: MissionId,
    now: NaiveDateTime,
    classifier: Option<&Classifier>,
) -> CompletionOutcome {
    let Some(mission) = state.missions.iter_mut().find(|m| m.id == id) else {
        return CompletionOutcome::default();
    };
    if mission.completed {
        return CompletionOutcome::default();
    }
    mission.completed = true;
    let cadence = mission.cadence;
    let text = mission.text.clone();

    let mut outcome = CompletionOutcome {
        applied: true,
        reward: cadence.reward(),
        ..CompletionOutcome::default()
    };

    // XP and levels on the live mirror.
    let level_before = state.level;
    outcome.levels_gained = apply_xp(&mut state.xp, &mut state.level, outcome.reward);
    if outcome.levels_gained > 0 {
        state.highest_rank_achieved =
            advance_rank(&state.highest_rank_achieved, state.level).to_string();
        for rank in crate::ranks::RANKS.iter() {
            if state.level >= rank.min_level && state.unlock_frame(rank.frame) {
                outcome.new_frames.push(rank.frame.to_string());
            }
        }
        state.animating_level_up = true;
        state.previous_level = level_before;
        log::info!(
            "{} leveled up: {level_before} -> {} ({})",
            state.username,
            state.level,
            state.highest_rank_achieved
        );
    }
    outcome.rank_after = state.highest_rank_achieved.clone();

    // Cross-path attribution: a generalist path still builds per-domain
    // sub-ratings.
    if state.chosen_path == Some(PathId::Other) {
        let target = match classifier {
            Some(classifier) => classifier.classify(&text),
            None => crate::classify::classify(&text),
        };
        let progress = state.path_progress.entry(target).or_default();
        apply_xp(&mut progress.xp, &mut progress.level, outcome.reward);
        progress.highest_rank_achieved =
            advance_rank(&progress.highest_rank_achieved, progress.level).to_string();
        outcome.attributed_to = Some(target);
    }

    // Completion badge: every active mission across every cadence done.
    if state.missions.iter().all(|m| m.completed) && state.unlock_badge(BADGE_DISCIPLINED) {
        outcome.badge_earned = true;
    }

    outcome.streak_change = advance_streak(state, now);
    let today = day_key(now);
    *state.daily_stats.entry(today).or_insert(0) += 1;

    unlock_titles(state, hour_of(now), &mut outcome.new_titles);

    let ovr = overall_rating(state);
    outcome.new_frames.extend(frames::evaluate_unlocks(state, ovr));

    outcome
}

/// Add a reward, levelling up once per `level * 100` threshold crossed.
/// The loop matters: a large enough reward crosses several thresholds in a
/// single completion.
fn apply_xp(xp: &mut u32, level: &mut u32, reward: u32) -> u32 {
    *xp += reward;
    let mut gained = 0;
    while *xp >= *level * 100 {
        *xp -= *level * 100;
        *level += 1;
        gained += 1;
    }
    gained
}

fn advance_streak(state: &mut UserState, now: NaiveDateTime) -> StreakChange {
    let today = day_key(now);
    if state.last_active_date == today {
        return StreakChange::Unchanged;
    }
    let change = if day_gap(&state.last_active_date, &today) == Some(1) {
        state.streak += 1;
        StreakChange::Extended
    } else {
        state.streak = 1;
        StreakChange::Reset
    };
    state.show_streak_animation = true;
    state.last_active_date = today;
    change
}

fn unlock_titles(state: &mut UserState, hour: u32, earned: &mut Vec<String>) {
    let mut unlock = |condition: bool, title: &str, state: &mut UserState| {
        if condition && state.unlock_title(title) {
            earned.push(title.to_string());
        }
    };
    unlock((4..=7).contains(&hour), TITLE_EARLY_BIRD, state);
    unlock(hour >= 22 || hour <= 2, TITLE_NIGHT_OWL, state);
    unlock(state.streak >= STREAK_UNSTOPPABLE, TITLE_UNSTOPPABLE, state);
    unlock(state.streak >= STREAK_LEGEND, TITLE_LEGEND, state);
    unlock(state.level >= LEVEL_VETERAN, TITLE_VETERAN, state);
    unlock(state.level >= LEVEL_MASTER, TITLE_MASTER, state);
}
