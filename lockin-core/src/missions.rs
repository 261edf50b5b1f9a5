//! Mission rotation: keeps the active list in step with the calendar and the
//! chosen path's candidate pools, disturbing in-flight missions as little as
//! possible.

use chrono::NaiveDateTime;
use rand::Rng;

use crate::catalog::MissionCatalog;
use crate::clock::{day_key, week_key};
use crate::state::{Mission, MissionCadence, PathId, POOLED_CADENCES, UserState};

/// What a reconcile pass did. `changed == false` guarantees the state was
/// left bit-for-bit untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileOutcome {
    pub changed: bool,
    pub rolled_daily: bool,
    pub rolled_weekly: bool,
}

/// Bring the active mission list in line with `now` and the path's pools.
///
/// - A new calendar day drops all DAILY and ROUTINE missions.
/// - A new ISO week drops all WEEKLY missions.
/// - Completed REGULAR missions are removed unconditionally.
/// - Every pooled cadence refills to capacity by sampling the pool without
///   replacement, never duplicating text already active in that cadence.
/// - ROUTINE (OTHER path only) is synced to equal the custom routine list
///   exactly, in catalog order, preserving ids and completion of entries
///   whose text survives.
///
/// Exhausted pools degrade to fewer missions; nothing here errors.
pub fn reconcile_missions<R: Rng>(
    state: &mut UserState,
    catalog: &MissionCatalog,
    now: NaiveDateTime,
    rng: &mut R,
) -> ReconcileOutcome {
    let Some(path) = state.chosen_path else {
        return ReconcileOutcome::default();
    };

    let today = day_key(now);
    let this_week = week_key(now);
    let before_missions = state.missions.clone();
    let mut outcome = ReconcileOutcome::default();

    if state.last_mission_date != today {
        state.missions.retain(|mission| {
            !matches!(
                mission.cadence,
                MissionCadence::Daily | MissionCadence::Routine
            )
        });
        state.last_mission_date = today;
        outcome.rolled_daily = true;
        outcome.changed = true;
    }

    if state.last_weekly_date != this_week {
        state
            .missions
            .retain(|mission| mission.cadence != MissionCadence::Weekly);
        state.last_weekly_date = this_week;
        outcome.rolled_weekly = true;
        outcome.changed = true;
    }

    // A finished one-off must be replaced, not left inert.
    state
        .missions
        .retain(|mission| !(mission.cadence == MissionCadence::Regular && mission.completed));

    for cadence in POOLED_CADENCES {
        refill_cadence(state, catalog, path, cadence, rng);
    }

    if path == PathId::Other {
        sync_routine(state, catalog);
    }

    if state.missions != before_missions {
        outcome.changed = true;
    }
    if outcome.changed {
        log::debug!(
            "reconciled missions for {path}: {} active (daily roll: {}, weekly roll: {})",
            state.missions.len(),
            outcome.rolled_daily,
            outcome.rolled_weekly
        );
    }
    outcome
}

/// Texts currently active for one cadence, used for duplicate avoidance.
fn active_texts(state: &UserState, cadence: MissionCadence) -> Vec<String> {
    state
        .missions
        .iter()
        .filter(|mission| mission.cadence == cadence)
        .map(|mission| mission.text.clone())
        .collect()
}

fn refill_cadence<R: Rng>(
    state: &mut UserState,
    catalog: &MissionCatalog,
    path: PathId,
    cadence: MissionCadence,
    rng: &mut R,
) {
    let Some(capacity) = cadence.capacity() else {
        return;
    };
    let active = active_texts(state, cadence);
    if active.len() >= capacity {
        return;
    }

    let mut candidates: Vec<String> = catalog
        .pool(path, cadence, &state.custom_missions)
        .iter()
        .filter(|text| !active.contains(text))
        .cloned()
        .collect();

    let mut active_count = active.len();
    while active_count < capacity && !candidates.is_empty() {
        let idx = rng.gen_range(0..candidates.len());
        let text = candidates.swap_remove(idx);
        let id = state.allocate_mission_id();
        state.missions.push(Mission {
            id,
            text,
            cadence,
            completed: false,
        });
        active_count += 1;
    }
}

/// Make the active ROUTINE set equal the custom routine list, in list order.
/// Entries whose text survives keep their id and completion flag.
fn sync_routine(state: &mut UserState, catalog: &MissionCatalog) {
    let desired: Vec<String> = catalog
        .pool(PathId::Other, MissionCadence::Routine, &state.custom_missions)
        .to_vec();

    let mut existing: Vec<Mission> = Vec::new();
    state.missions.retain(|mission| {
        if mission.cadence == MissionCadence::Routine {
            existing.push(mission.clone());
            false
        } else {
            true
        }
    });

    for text in desired {
        let mission = match existing.iter().position(|m| m.text == text) {
            Some(idx) => existing.swap_remove(idx),
            None => {
                let id = state.allocate_mission_id();
                Mission {
                    id,
                    text,
                    cadence: MissionCadence::Routine,
                    completed: false,
                }
            }
        };
        state.missions.push(mission);
    }
    // Anything left in `existing` was removed from the catalog and is dropped.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PathProgress;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn seeded() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0x10C4)
    }

    fn fresh_state(path: PathId) -> UserState {
        let mut state = UserState::new("tester");
        state.chosen_path = Some(path);
        state.onboarding_completed = true;
        state
    }

    #[test]
    fn initial_reconcile_fills_every_pooled_cadence() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::Discipline);
        let outcome = reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut seeded());

        assert!(outcome.changed);
        assert!(outcome.rolled_daily);
        assert!(outcome.rolled_weekly);
        for cadence in POOLED_CADENCES {
            assert_eq!(
                state
                    .missions
                    .iter()
                    .filter(|m| m.cadence == cadence)
                    .count(),
                3,
                "{cadence} should be at capacity"
            );
        }
        assert_eq!(state.last_mission_date, "2024-03-04");
        assert_eq!(state.last_weekly_date, "2024-W10");
    }

    #[test]
    fn reconcile_without_path_is_a_no_op() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let before = state.clone();
        let outcome = reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut seeded());
        assert!(!outcome.changed);
        assert_eq!(state, before);
    }

    #[test]
    fn same_day_reconcile_leaves_state_untouched() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::Stronger);
        let mut rng = seeded();
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        let before = state.clone();

        let outcome = reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        assert!(!outcome.changed);
        assert_eq!(state, before);
    }

    #[test]
    fn day_rollover_regenerates_daily_only() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::Productive);
        let mut rng = seeded();
        // Monday of ISO week 10.
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        let weekly_before: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Weekly)
            .cloned()
            .collect();
        let daily_ids_before: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Daily)
            .map(|m| m.id)
            .collect();

        // Tuesday, same ISO week.
        let outcome = reconcile_missions(&mut state, &catalog, at(2024, 3, 5), &mut rng);
        assert!(outcome.rolled_daily);
        assert!(!outcome.rolled_weekly);

        let weekly_after: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Weekly)
            .cloned()
            .collect();
        assert_eq!(weekly_before, weekly_after, "weekly missions untouched");
        for mission in state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Daily)
        {
            assert!(
                !daily_ids_before.contains(&mission.id),
                "daily missions regenerate with fresh ids"
            );
            assert!(!mission.completed);
        }
    }

    #[test]
    fn week_rollover_regenerates_weekly() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::Extrovert);
        let mut rng = seeded();
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        let weekly_ids: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Weekly)
            .map(|m| m.id)
            .collect();

        // Next Monday, ISO week 11.
        let outcome = reconcile_missions(&mut state, &catalog, at(2024, 3, 11), &mut rng);
        assert!(outcome.rolled_weekly);
        for mission in state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Weekly)
        {
            assert!(!weekly_ids.contains(&mission.id));
        }
        assert_eq!(state.last_weekly_date, "2024-W11");
    }

    #[test]
    fn completed_regular_is_replaced_from_remaining_pool() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::Discipline);
        let mut rng = seeded();
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);

        let done_id = state
            .missions
            .iter()
            .find(|m| m.cadence == MissionCadence::Regular)
            .map(|m| m.id)
            .unwrap();
        let done_text = state.mission(done_id).unwrap().text.clone();
        state
            .missions
            .iter_mut()
            .find(|m| m.id == done_id)
            .unwrap()
            .completed = true;

        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        assert!(state.mission(done_id).is_none(), "completed one-off removed");
        // Pool has exactly 3 regular texts and the other two are active, so
        // refill can only re-draw the completed text, with a fresh id.
        let regulars: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Regular)
            .collect();
        assert_eq!(regulars.len(), 3);
        assert!(regulars.iter().any(|m| m.text == done_text && !m.completed));
    }

    #[test]
    fn no_duplicate_text_within_a_cadence() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::MentalHealth);
        let mut rng = seeded();
        for day in 1..=20 {
            reconcile_missions(&mut state, &catalog, at(2024, 3, day), &mut rng);
            for cadence in POOLED_CADENCES {
                let mut texts = active_texts(&state, cadence);
                let total = texts.len();
                texts.sort();
                texts.dedup();
                assert_eq!(texts.len(), total, "duplicate {cadence} text on day {day}");
            }
        }
    }

    #[test]
    fn exhausted_pool_yields_fewer_missions() {
        let mut state = fresh_state(PathId::Other);
        state.custom_missions.add(MissionCadence::Daily, "Only one");
        let catalog = MissionCatalog::builtin();
        let outcome = reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut seeded());

        assert!(outcome.changed);
        assert_eq!(
            state
                .missions
                .iter()
                .filter(|m| m.cadence == MissionCadence::Daily)
                .count(),
            1
        );
        assert!(
            state
                .missions
                .iter()
                .filter(|m| m.cadence == MissionCadence::Regular)
                .count()
                == 0,
            "empty pool yields zero missions, not an error"
        );
    }

    #[test]
    fn routine_matches_catalog_order_exactly() {
        let mut state = fresh_state(PathId::Other);
        for text in ["Wake up", "Make bed", "Cold shower", "Plan day"] {
            state.custom_missions.add(MissionCadence::Routine, text);
        }
        let catalog = MissionCatalog::builtin();
        let mut rng = seeded();
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);

        let routine: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Routine)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(routine, ["Wake up", "Make bed", "Cold shower", "Plan day"]);

        // Complete one, drop another, reorder by removing and re-adding.
        let keep_id = state
            .missions
            .iter()
            .find(|m| m.text == "Make bed")
            .map(|m| m.id)
            .unwrap();
        state
            .missions
            .iter_mut()
            .find(|m| m.id == keep_id)
            .unwrap()
            .completed = true;
        state.custom_missions.remove(MissionCadence::Routine, "Cold shower");
        state.custom_missions.add(MissionCadence::Routine, "Read");

        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        let routine: Vec<_> = state
            .missions
            .iter()
            .filter(|m| m.cadence == MissionCadence::Routine)
            .collect();
        let texts: Vec<_> = routine.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["Wake up", "Make bed", "Plan day", "Read"]);
        let kept = routine.iter().find(|m| m.text == "Make bed").unwrap();
        assert_eq!(kept.id, keep_id, "surviving routine entry keeps its id");
        assert!(kept.completed, "surviving routine entry keeps completion");
    }

    #[test]
    fn routine_resets_on_day_rollover() {
        let mut state = fresh_state(PathId::Other);
        state.custom_missions.add(MissionCadence::Routine, "Wake up");
        let catalog = MissionCatalog::builtin();
        let mut rng = seeded();
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut rng);
        let old_id = state.missions[0].id;
        state.missions[0].completed = true;

        reconcile_missions(&mut state, &catalog, at(2024, 3, 5), &mut rng);
        let routine = state
            .missions
            .iter()
            .find(|m| m.cadence == MissionCadence::Routine)
            .unwrap();
        assert_ne!(routine.id, old_id);
        assert!(!routine.completed);
    }

    #[test]
    fn dormant_paths_are_never_touched() {
        let catalog = MissionCatalog::builtin();
        let mut state = fresh_state(PathId::Discipline);
        state
            .path_progress
            .insert(PathId::Stronger, PathProgress::default());
        let archived = state.path_progress.clone();
        reconcile_missions(&mut state, &catalog, at(2024, 3, 4), &mut seeded());
        assert_eq!(state.path_progress, archived);
    }
}
