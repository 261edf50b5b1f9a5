//! Deterministic multi-day simulation of one player against the engine.
//!
//! Each simulated day runs the same loop the app would: reconcile missions,
//! complete a quota of them, fire due replacement timers, and submit to the
//! leaderboard. Engine invariants are checked after every step and collected
//! as violations rather than panicking, so a sweep over many seeds reports
//! everything it finds.

use chrono::{NaiveDate, NaiveDateTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use lockin_core::{
    LeaderboardEntry, LocalLeaderboard, MissionCadence, MissionCatalog, PathId, Ratings,
    ReplacementScheduler, UserState, change_path, complete_mission, compute_ratings,
    reconcile_missions,
};

const SIM_START: (i32, u32, u32) = (2024, 1, 1);

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u64,
    pub days: u32,
    pub path: PathId,
    pub completions_per_day: usize,
    pub verbose: bool,
}

/// Aggregated result of one simulated run.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub seed: u64,
    pub path: String,
    pub days: u32,
    pub total_completions: u32,
    pub final_level: u32,
    pub final_xp: u32,
    pub final_streak: u32,
    pub final_rank: String,
    pub badges: Vec<String>,
    pub titles: Vec<String>,
    pub unlocked_frames: Vec<String>,
    pub ratings: Ratings,
    pub leaderboard_rows: usize,
    pub violations: Vec<String>,
}

impl SimReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    let catalog = MissionCatalog::builtin();
    let mut state = UserState::new(&format!("sim-{}", config.seed));
    let mut scheduler = ReplacementScheduler::new();
    let mut board = LocalLeaderboard::new();
    let mut violations = Vec::new();

    let start = start_of_day(0);
    change_path(&mut state, config.path, &catalog, start, &mut rng);
    if config.path == PathId::Other {
        seed_custom_missions(&mut state);
    }

    for day in 0..config.days {
        let morning = start_of_day(day);
        reconcile_missions(&mut state, &catalog, morning, &mut rng);
        check_invariants(&state, day, "reconcile", &mut violations);

        let mut completed_today = 0usize;
        while completed_today < config.completions_per_day {
            let Some(mission) = pick_open_mission(&state, &mut rng) else {
                break;
            };
            let now = morning + chrono::Duration::minutes(30 * completed_today as i64);
            let outcome = complete_mission(&mut state, mission, now);
            if !outcome.applied {
                violations.push(format!("day {day}: open mission {mission:?} not applied"));
                break;
            }
            if state
                .mission(mission)
                .is_some_and(|m| m.cadence == MissionCadence::Regular)
            {
                scheduler.schedule(mission, now);
            }
            if config.verbose {
                log::debug!(
                    "day {day}: completed mission {mission:?} (+{} xp, level {})",
                    outcome.reward,
                    state.level
                );
            }
            completed_today += 1;
            check_invariants(&state, day, "completion", &mut violations);
        }

        let evening = morning + chrono::Duration::hours(8);
        scheduler.fire_due(&mut state, &catalog, evening, &mut rng);
        check_invariants(&state, day, "replacement", &mut violations);

        board.merge(LeaderboardEntry::from_state(&state, evening));
    }

    SimReport {
        seed: config.seed,
        path: config.path.to_string(),
        days: config.days,
        total_completions: state.total_missions_completed(),
        final_level: state.level,
        final_xp: state.xp,
        final_streak: state.streak,
        final_rank: state.highest_rank_achieved.clone(),
        badges: state.badges.clone(),
        titles: state.titles.clone(),
        unlocked_frames: state.unlocked_frames.clone(),
        ratings: compute_ratings(&state),
        leaderboard_rows: board.entries().len(),
        violations,
    }
}

fn start_of_day(day: u32) -> NaiveDateTime {
    let (y, m, d) = SIM_START;
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap_or_default()
        .and_hms_opt(9, 0, 0)
        .unwrap_or_default()
        + chrono::Duration::days(i64::from(day))
}

fn seed_custom_missions(state: &mut UserState) {
    for (cadence, texts) in [
        (
            MissionCadence::Regular,
            ["Tidy the workspace", "Go for a run", "Call a friend"].as_slice(),
        ),
        (
            MissionCadence::Daily,
            ["Morning gym session", "Read 20 pages", "Write a journal entry"].as_slice(),
        ),
        (MissionCadence::Weekly, ["Plan the week"].as_slice()),
        (MissionCadence::Routine, ["Wake up early", "Make the bed"].as_slice()),
    ] {
        for text in texts {
            state.custom_missions.add(cadence, text);
        }
    }
}

fn pick_open_mission<R: Rng>(state: &UserState, rng: &mut R) -> Option<lockin_core::MissionId> {
    let open: Vec<_> = state
        .missions
        .iter()
        .filter(|m| !m.completed)
        .map(|m| m.id)
        .collect();
    if open.is_empty() {
        None
    } else {
        Some(open[rng.gen_range(0..open.len())])
    }
}

fn check_invariants(state: &UserState, day: u32, phase: &str, violations: &mut Vec<String>) {
    if state.xp >= state.level * 100 {
        violations.push(format!(
            "day {day} ({phase}): xp {} breaches threshold for level {}",
            state.xp, state.level
        ));
    }
    if let Some(active) = state.chosen_path {
        if state.path_progress.contains_key(&active) {
            violations.push(format!(
                "day {day} ({phase}): archive holds the active path {active}"
            ));
        }
    }
    for cadence in [
        MissionCadence::Regular,
        MissionCadence::Daily,
        MissionCadence::Weekly,
        MissionCadence::Routine,
    ] {
        let mut texts: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == cadence)
            .map(|m| m.text.as_str())
            .collect();
        let total = texts.len();
        texts.sort_unstable();
        texts.dedup();
        if texts.len() != total {
            violations.push(format!(
                "day {day} ({phase}): duplicate {cadence} mission text"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64, path: PathId) -> SimConfig {
        SimConfig {
            seed,
            days: 60,
            path,
            completions_per_day: 4,
            verbose: false,
        }
    }

    #[test]
    fn two_months_on_a_builtin_path_holds_every_invariant() {
        let report = run_simulation(&config(1337, PathId::Stronger));
        assert!(report.passed(), "violations: {:?}", report.violations);
        assert!(report.final_level > 1);
        assert_eq!(report.final_streak, 60);
        assert!(report.titles.contains(&"Unstoppable".to_string()));
    }

    #[test]
    fn custom_path_simulation_attributes_across_domains() {
        let report = run_simulation(&config(42, PathId::Other));
        assert!(report.passed(), "violations: {:?}", report.violations);
        assert!(report.total_completions > 0);
        // Gym and reading custom missions must have fed the sub-ratings.
        assert!(report.ratings.physical > 41 || report.ratings.intellect > 41);
    }

    #[test]
    fn same_seed_reproduces_the_same_report() {
        let a = run_simulation(&config(7, PathId::Discipline));
        let b = run_simulation(&config(7, PathId::Discipline));
        assert_eq!(a.final_level, b.final_level);
        assert_eq!(a.final_xp, b.final_xp);
        assert_eq!(a.unlocked_frames, b.unlocked_frames);
    }

    #[test]
    fn different_seeds_can_diverge() {
        let a = run_simulation(&config(1, PathId::Extrovert));
        let b = run_simulation(&config(2, PathId::Extrovert));
        // Same totals are possible but the mission draws should differ; the
        // weakest observable signal is that both runs stayed clean.
        assert!(a.passed() && b.passed());
    }
}
