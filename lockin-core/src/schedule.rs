//! Deferred replacement of completed one-off missions.
//!
//! Completing a REGULAR mission leaves it visibly checked for a short delay
//! before the slot recycles. The scheduler holds those one-shot timers as
//! data; the host drives it by calling [`ReplacementScheduler::fire_due`]
//! from its own clock. Firing never grants XP.

use chrono::NaiveDateTime;
use rand::Rng;

use crate::catalog::MissionCatalog;
use crate::state::{Mission, MissionCadence, MissionId, UserState};

pub const REPLACEMENT_DELAY_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    mission: MissionId,
    due: NaiveDateTime,
}

/// What firing one timer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementEvent {
    /// The completed mission was swapped for a fresh draw.
    Replaced { removed: MissionId, added: MissionId },
    /// Pool exhausted; the slot was dropped outright.
    Removed(MissionId),
    /// The mission was gone or no longer eligible when the timer fired.
    Skipped(MissionId),
}

/// Pending one-shot replacement timers, one per mission id.
#[derive(Debug, Clone, Default)]
pub struct ReplacementScheduler {
    pending: Vec<Pending>,
}

impl ReplacementScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a replacement for `mission` at `now + REPLACEMENT_DELAY_SECS`.
    /// Scheduling the same id again is a no-op.
    pub fn schedule(&mut self, mission: MissionId, now: NaiveDateTime) {
        if self.pending.iter().any(|p| p.mission == mission) {
            return;
        }
        self.pending.push(Pending {
            mission,
            due: now + chrono::Duration::seconds(REPLACEMENT_DELAY_SECS),
        });
    }

    /// Drop the timer for one mission, if queued.
    pub fn cancel(&mut self, mission: MissionId) {
        self.pending.retain(|p| p.mission != mission);
    }

    /// Drop every timer. Called on logout and path switch.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fire every timer due at `now`. Eligibility is re-checked by id at
    /// fire time: the mission must still be present, completed, and REGULAR,
    /// otherwise the timer expires as [`ReplacementEvent::Skipped`].
    pub fn fire_due<R: Rng>(
        &mut self,
        state: &mut UserState,
        catalog: &MissionCatalog,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Vec<ReplacementEvent> {
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(p.mission);
                false
            } else {
                true
            }
        });

        due.into_iter()
            .map(|id| fire_one(state, catalog, id, rng))
            .collect()
    }
}

fn fire_one<R: Rng>(
    state: &mut UserState,
    catalog: &MissionCatalog,
    id: MissionId,
    rng: &mut R,
) -> ReplacementEvent {
    let eligible = state
        .mission(id)
        .is_some_and(|m| m.completed && m.cadence == MissionCadence::Regular);
    let Some(path) = state.chosen_path else {
        return ReplacementEvent::Skipped(id);
    };
    if !eligible {
        return ReplacementEvent::Skipped(id);
    }

    let position = state
        .missions
        .iter()
        .position(|m| m.id == id)
        .unwrap_or(state.missions.len());
    state.missions.retain(|m| m.id != id);

    let active: Vec<String> = state
        .missions
        .iter()
        .filter(|m| m.cadence == MissionCadence::Regular)
        .map(|m| m.text.clone())
        .collect();
    let candidates: Vec<String> = catalog
        .pool(path, MissionCadence::Regular, &state.custom_missions)
        .iter()
        .filter(|text| !active.contains(text))
        .cloned()
        .collect();

    if candidates.is_empty() {
        log::debug!("regular pool exhausted for {path}; slot dropped");
        return ReplacementEvent::Removed(id);
    }
    let text = candidates[rng.gen_range(0..candidates.len())].clone();
    let added = state.allocate_mission_id();
    state.missions.insert(
        position.min(state.missions.len()),
        Mission {
            id: added,
            text,
            cadence: MissionCadence::Regular,
            completed: false,
        },
    );
    ReplacementEvent::Replaced { removed: id, added }
}
