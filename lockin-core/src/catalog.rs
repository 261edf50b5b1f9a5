//! Static mission and quote catalogs.
//!
//! The engine treats these as opaque candidate pools per path and cadence.
//! The built-in tables ship with the crate; platforms may load replacements
//! from JSON instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::{CustomMissions, MissionCadence, PathId};

/// Candidate mission text for one path, by pooled cadence. The built-in
/// paths have no ROUTINE pool; only the OTHER path's custom table does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CadencePools {
    #[serde(default, rename = "REGULAR")]
    pub regular: Vec<String>,
    #[serde(default, rename = "DAILY")]
    pub daily: Vec<String>,
    #[serde(default, rename = "WEEKLY")]
    pub weekly: Vec<String>,
}

impl CadencePools {
    #[must_use]
    pub fn list(&self, cadence: MissionCadence) -> &[String] {
        match cadence {
            MissionCadence::Regular => &self.regular,
            MissionCadence::Daily => &self.daily,
            MissionCadence::Weekly => &self.weekly,
            MissionCadence::Routine => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionCatalog {
    #[serde(default)]
    pub missions: BTreeMap<PathId, CadencePools>,
    #[serde(default)]
    pub quotes: BTreeMap<PathId, Vec<String>>,
}

impl MissionCatalog {
    /// Empty catalog (useful for tests; every pool degrades to no missions).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into catalog tables.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Candidate pool for one cadence of one path. For the OTHER path the
    /// pool is the user's custom table; for built-in paths it is the static
    /// catalog. Unknown paths and missing tables yield an empty pool.
    #[must_use]
    pub fn pool<'a>(
        &'a self,
        path: PathId,
        cadence: MissionCadence,
        custom: &'a CustomMissions,
    ) -> &'a [String] {
        if path == PathId::Other {
            custom.list(cadence)
        } else {
            self.missions
                .get(&path)
                .map_or(&[] as &[String], |pools| pools.list(cadence))
        }
    }

    /// Deterministic quote for a path and day key. Stable across reloads on
    /// the same day, rotating as the day changes.
    #[must_use]
    pub fn quote_for(&self, path: PathId, day_key: &str) -> Option<&str> {
        let quotes = self.quotes.get(&path)?;
        if quotes.is_empty() {
            return None;
        }
        let mut input = Vec::with_capacity(day_key.len() + 16);
        input.extend_from_slice(path.as_str().as_bytes());
        input.push(b'|');
        input.extend_from_slice(day_key.as_bytes());
        let idx = fnv1a64(&input) as usize % quotes.len();
        Some(quotes[idx].as_str())
    }

    /// The mission and quote tables every build ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let mut missions = BTreeMap::new();
        let mut quotes = BTreeMap::new();

        missions.insert(
            PathId::Productive,
            pools(
                &["Read a self-help article", "Organize your files", "Plan your week"],
                &["30-minute study focus", "Clean desk", "Write tomorrow's goal"],
                &["Read a book for 2 hours", "Review weekly goals", "Learn a new skill"],
            ),
        );
        missions.insert(
            PathId::Stronger,
            pools(
                &["Do 10 squats", "Stretch for 5 mins", "Eat a healthy snack"],
                &["20 push-ups", "Drink enough water", "Sleep before 11 PM"],
                &["Go for a 5km run", "Meal prep for 3 days", "Try a new workout"],
            ),
        );
        missions.insert(
            PathId::Extrovert,
            pools(
                &["Smile at a stranger", "Ask a question", "Give a compliment"],
                &["Greet one person", "Start one chat", "Maintain eye contact"],
                &["Attend a social event", "Call an old friend", "Have a deep conversation"],
            ),
        );
        missions.insert(
            PathId::Discipline,
            pools(
                &["Make your bed", "Sit with straight posture", "Drink water first thing"],
                &["Take a cold shower", "No social media for 2 hours", "Read 10 pages"],
                &["Digital detox for 1 day", "Wake up at 5 AM all week", "Complete all daily tasks"],
            ),
        );
        missions.insert(
            PathId::MentalHealth,
            pools(
                &["Take 5 deep breaths", "Listen to calming music", "Stretch your neck"],
                &[
                    "10 minutes of meditation",
                    "Write 3 things you are grateful for",
                    "Take a 15-minute walk",
                ],
                &["Therapy or deep reflection", "Spend a day in nature", "Unplug for a weekend"],
            ),
        );

        quotes.insert(
            PathId::Productive,
            strings(&[
                "Focus on being productive instead of busy.",
                "Amateurs sit and wait for inspiration, the rest of us just get up and go to work.",
                "The secret of getting ahead is getting started.",
            ]),
        );
        quotes.insert(
            PathId::Stronger,
            strings(&[
                "No pain, no gain. Shut up and train.",
                "The hard days are the best because that's when champions are made.",
                "Strength does not come from physical capacity. It comes from an indomitable will.",
            ]),
        );
        quotes.insert(
            PathId::Extrovert,
            strings(&[
                "A comfort zone is a beautiful place, but nothing ever grows there.",
                "Every friend was once a stranger.",
                "Life shrinks or expands in proportion to one's courage.",
            ]),
        );
        quotes.insert(
            PathId::Discipline,
            strings(&[
                "Discipline is choosing between what you want now and what you want most.",
                "We must all suffer one of two things: the pain of discipline or the pain of regret.",
                "Success is nothing more than a few simple disciplines, practiced every day.",
            ]),
        );
        quotes.insert(
            PathId::MentalHealth,
            strings(&[
                "Peace is the result of retraining your mind to process life as it is, rather than as you think it should be.",
                "You don't have to control your thoughts. You just have to stop letting them control you.",
                "Self-care is how you take your power back.",
            ]),
        );

        Self { missions, quotes }
    }
}

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|text| (*text).to_string()).collect()
}

fn pools(regular: &[&str], daily: &[&str], weekly: &[&str]) -> CadencePools {
    CadencePools {
        regular: strings(regular),
        daily: strings(daily),
        weekly: strings(weekly),
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}
