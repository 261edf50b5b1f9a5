//! Path switching: archive the live mirror, restore or initialize the new
//! path's progression.

use chrono::NaiveDateTime;
use rand::Rng;

use crate::catalog::MissionCatalog;
use crate::clock::{day_key, week_key};
use crate::state::{Mission, PathId, PathProgress, POOLED_CADENCES, UserState};

/// How the switch found the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Already on the requested path; state untouched.
    Unchanged,
    /// The target path had an archived snapshot and it is live again.
    Restored,
    /// The target path was never played; a fresh progression was seeded.
    Initialized,
}

/// Make `new_path` the active path.
///
/// The current live progression is archived under the old path, then the
/// target is restored from its archive entry or initialized fresh with one
/// sampled mission per pooled cadence. `chosen_path` is written last so a
/// panic mid-switch can never leave it pointing at a mismatched mirror.
pub fn change_path<R: Rng>(
    state: &mut UserState,
    new_path: PathId,
    catalog: &MissionCatalog,
    now: NaiveDateTime,
    rng: &mut R,
) -> SwitchOutcome {
    if state.chosen_path == Some(new_path) {
        return SwitchOutcome::Unchanged;
    }

    if let Some(old_path) = state.chosen_path {
        let snapshot = state.snapshot_live();
        state.path_progress.insert(old_path, snapshot);
    }

    let outcome = if let Some(saved) = state.path_progress.remove(&new_path) {
        state.restore_live(saved);
        SwitchOutcome::Restored
    } else {
        let fresh = fresh_progress(state, new_path, catalog, now, rng);
        state.restore_live(fresh);
        SwitchOutcome::Initialized
    };

    state.chosen_path = Some(new_path);
    log::info!("{} switched to {new_path} ({outcome:?})", state.username);
    outcome
}

/// Level 1, no XP, lowest rank, one mission drawn per pooled cadence. The
/// rollover markers start at today so the first reconcile doesn't immediately
/// discard the seeds.
fn fresh_progress<R: Rng>(
    state: &mut UserState,
    path: PathId,
    catalog: &MissionCatalog,
    now: NaiveDateTime,
    rng: &mut R,
) -> PathProgress {
    let mut progress = PathProgress {
        last_mission_date: day_key(now),
        last_weekly_date: week_key(now),
        ..PathProgress::default()
    };
    for cadence in POOLED_CADENCES {
        let pool = catalog.pool(path, cadence, &state.custom_missions);
        if pool.is_empty() {
            continue;
        }
        let text = pool[rng.gen_range(0..pool.len())].clone();
        let id = state.allocate_mission_id();
        progress.missions.push(Mission {
            id,
            text,
            cadence,
            completed: false,
        });
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn seeded() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0x10C4)
    }

    #[test]
    fn first_switch_initializes_fresh_progression() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let outcome = change_path(
            &mut state,
            PathId::Stronger,
            &catalog,
            at(2024, 3, 4),
            &mut seeded(),
        );

        assert_eq!(outcome, SwitchOutcome::Initialized);
        assert_eq!(state.chosen_path, Some(PathId::Stronger));
        assert_eq!(state.level, 1);
        assert_eq!(state.xp, 0);
        assert_eq!(state.highest_rank_achieved, "Bronze");
        assert_eq!(state.missions.len(), 3, "one mission per pooled cadence");
        assert_eq!(state.last_mission_date, "2024-03-04");
        assert!(state.path_progress.is_empty());
    }

    #[test]
    fn fresh_seeds_draw_ids_from_the_state_counter() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let next_before = state.next_mission_id;
        change_path(&mut state, PathId::Stronger, &catalog, at(2024, 3, 4), &mut seeded());

        let mut ids: Vec<u64> = state.missions.iter().map(|m| m.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), state.missions.len(), "seeded ids are unique");
        assert_eq!(state.next_mission_id, next_before + ids.len() as u64);
    }

    #[test]
    fn switching_to_the_same_path_is_a_no_op() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let mut rng = seeded();
        change_path(&mut state, PathId::Discipline, &catalog, at(2024, 3, 4), &mut rng);
        let before = state.clone();

        let outcome = change_path(&mut state, PathId::Discipline, &catalog, at(2024, 3, 5), &mut rng);
        assert_eq!(outcome, SwitchOutcome::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn switch_archives_the_old_path() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let mut rng = seeded();
        change_path(&mut state, PathId::Stronger, &catalog, at(2024, 3, 4), &mut rng);
        state.level = 8;
        state.xp = 120;
        state.badges.push("DISCIPLINED".to_string());

        let outcome = change_path(&mut state, PathId::Productive, &catalog, at(2024, 3, 4), &mut rng);
        assert_eq!(outcome, SwitchOutcome::Initialized);
        let archived = state.path_progress.get(&PathId::Stronger).unwrap();
        assert_eq!(archived.level, 8);
        assert_eq!(archived.xp, 120);
        assert_eq!(archived.badges, ["DISCIPLINED".to_string()]);
        // The fresh path starts clean.
        assert_eq!(state.level, 1);
        assert!(state.badges.is_empty());
    }

    #[test]
    fn round_trip_restores_progress_exactly() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let mut rng = seeded();
        change_path(&mut state, PathId::Stronger, &catalog, at(2024, 3, 4), &mut rng);
        state.level = 5;
        state.xp = 310;
        state.missions[0].completed = true;
        let live_before = state.snapshot_live();

        change_path(&mut state, PathId::Extrovert, &catalog, at(2024, 3, 4), &mut rng);
        let outcome = change_path(&mut state, PathId::Stronger, &catalog, at(2024, 3, 4), &mut rng);

        assert_eq!(outcome, SwitchOutcome::Restored);
        assert_eq!(state.snapshot_live(), live_before);
        assert!(
            !state.path_progress.contains_key(&PathId::Stronger),
            "restored path leaves the archive"
        );
        assert!(state.path_progress.contains_key(&PathId::Extrovert));
    }

    #[test]
    fn global_fields_survive_a_switch() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        let mut rng = seeded();
        change_path(&mut state, PathId::Stronger, &catalog, at(2024, 3, 4), &mut rng);
        state.streak = 12;
        state.titles.push("Early Bird".to_string());
        state.daily_stats.insert("2024-03-04".to_string(), 3);

        change_path(&mut state, PathId::MentalHealth, &catalog, at(2024, 3, 4), &mut rng);
        assert_eq!(state.streak, 12);
        assert_eq!(state.titles, ["Early Bird".to_string()]);
        assert_eq!(state.daily_stats.get("2024-03-04"), Some(&3));
    }

    #[test]
    fn other_path_seeds_from_custom_pools() {
        let catalog = MissionCatalog::builtin();
        let mut state = UserState::new("tester");
        state.custom_missions.add(crate::state::MissionCadence::Regular, "My own thing");
        let outcome = change_path(
            &mut state,
            PathId::Other,
            &catalog,
            at(2024, 3, 4),
            &mut seeded(),
        );

        assert_eq!(outcome, SwitchOutcome::Initialized);
        // Only the REGULAR custom pool has entries; DAILY and WEEKLY are empty.
        assert_eq!(state.missions.len(), 1);
        assert_eq!(state.missions[0].text, "My own thing");
    }
}
