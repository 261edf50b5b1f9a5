//! Display-only rating aggregation over the full state. Never mutates.

use serde::{Deserialize, Serialize};

use crate::state::{PathId, UserState};

const SCORE_BASE: f64 = 40.0;
const SCORE_CAP: f64 = 99.0;
const LEVEL_WEIGHT: f64 = 1.5;
const XP_DIVISOR: f64 = 100.0;
const STREAK_WEIGHT: f64 = 1.5;
const BADGE_WEIGHT: f64 = 1.5;

/// The six canonical sub-attribute scores plus the custom path's own score
/// (computed for display, excluded from the overall mean).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ratings {
    pub physical: u32,
    pub discipline: u32,
    pub mental: u32,
    pub ambition: u32,
    pub intellect: u32,
    pub social: u32,
    pub custom: u32,
    pub overall: u32,
}

/// Score for one path: live mirror if active, archived snapshot otherwise,
/// level 1 / xp 0 if never touched.
#[must_use]
pub fn path_score(state: &UserState, path: PathId) -> u32 {
    let (level, xp) = if state.chosen_path == Some(path) {
        (state.level, state.xp)
    } else {
        state
            .path_progress
            .get(&path)
            .map_or((1, 0), |p| (p.level, p.xp))
    };
    clamp_score(SCORE_BASE + f64::from(level) * LEVEL_WEIGHT + f64::from(xp) / XP_DIVISOR)
}

#[must_use]
pub fn discipline_score(state: &UserState) -> u32 {
    clamp_score(SCORE_BASE + f64::from(state.streak) * STREAK_WEIGHT)
}

#[must_use]
pub fn ambition_score(state: &UserState) -> u32 {
    clamp_score(
        SCORE_BASE
            + f64::from(state.total_levels()) * LEVEL_WEIGHT
            + f64::from(state.total_badges()) * BADGE_WEIGHT,
    )
}

/// Compute all sub-scores and the overall rating (floor of the unweighted
/// mean of the six canonical scores).
#[must_use]
pub fn compute_ratings(state: &UserState) -> Ratings {
    let physical = path_score(state, PathId::Stronger);
    let intellect = path_score(state, PathId::Productive);
    let social = path_score(state, PathId::Extrovert);
    let mental = path_score(state, PathId::MentalHealth);
    let discipline = discipline_score(state);
    let ambition = ambition_score(state);
    let custom = path_score(state, PathId::Other);

    let sum = physical + discipline + mental + ambition + intellect + social;
    Ratings {
        physical,
        discipline,
        mental,
        ambition,
        intellect,
        social,
        custom,
        overall: sum / 6,
    }
}

/// Overall rating only, for callers that don't need the breakdown.
#[must_use]
pub fn overall_rating(state: &UserState) -> u32 {
    compute_ratings(state).overall
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u32 {
    raw.min(SCORE_CAP).floor().max(0.0) as u32
}
