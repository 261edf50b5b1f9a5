//! Cosmetic profile frames and their unlock conditions.
//!
//! Rank-tier frames are granted by the progression engine the moment a rank
//! is reached. The special frames below are condition-checked after every
//! completion. Unlocks are monotonic: once in `unlocked_frames`, a frame
//! stays unlocked even if the underlying stat later drops.

use crate::ranks::RANKS;
use crate::state::UserState;

/// The always-available frame; equipping it is represented as
/// `equipped_frame == None`.
pub const FRAME_DEFAULT: &str = "frame-default";

pub const ALL_FRAMES: [&str; 22] = [
    "frame-default",
    "frame-bronze",
    "frame-silver",
    "frame-gold",
    "frame-platinum",
    "frame-diamond",
    "frame-master",
    "frame-grandmaster",
    "frame-challenger",
    "frame-rgb",
    "frame-neon",
    "frame-fire",
    "frame-cyberpunk",
    "frame-hologram",
    "frame-celestial",
    "frame-void",
    "frame-aurora",
    "frame-radiant",
    "frame-abyssal",
    "frame-inferno",
    "frame-ethereal",
    "frame-omniscience",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Streak(u32),
    TotalMissions(u32),
    Badges(u32),
    Ovr(u32),
    Level(u32),
}

pub const SPECIAL_FRAMES: [(&str, Requirement); 13] = [
    ("frame-rgb", Requirement::Streak(7)),
    ("frame-neon", Requirement::TotalMissions(50)),
    ("frame-fire", Requirement::Streak(30)),
    ("frame-cyberpunk", Requirement::Badges(5)),
    ("frame-hologram", Requirement::TotalMissions(100)),
    ("frame-celestial", Requirement::Ovr(80)),
    ("frame-void", Requirement::Level(20)),
    ("frame-aurora", Requirement::Streak(60)),
    ("frame-radiant", Requirement::TotalMissions(200)),
    ("frame-abyssal", Requirement::TotalMissions(666)),
    ("frame-inferno", Requirement::Streak(100)),
    ("frame-ethereal", Requirement::Ovr(95)),
    ("frame-omniscience", Requirement::Ovr(100)),
];

impl Requirement {
    #[must_use]
    pub fn met(self, state: &UserState, ovr: u32) -> bool {
        match self {
            Self::Streak(n) => state.streak >= n,
            Self::TotalMissions(n) => state.total_missions_completed() >= n,
            Self::Badges(n) => state.total_badges() >= n,
            Self::Ovr(n) => ovr >= n,
            Self::Level(n) => state.level >= n,
        }
    }
}

/// Grant every special frame whose condition currently holds. Returns the
/// frames unlocked by this call.
pub fn evaluate_unlocks(state: &mut UserState, ovr: u32) -> Vec<String> {
    let mut unlocked = Vec::new();
    for (frame, requirement) in SPECIAL_FRAMES {
        if requirement.met(state, ovr) && state.unlock_frame(frame) {
            unlocked.push(frame.to_string());
        }
    }
    unlocked
}

/// Display-side check: is the frame usable right now?
#[must_use]
pub fn is_unlocked(state: &UserState, frame: &str, ovr: u32) -> bool {
    if frame == FRAME_DEFAULT {
        return true;
    }
    if state.unlocked_frames.iter().any(|held| held == frame) {
        return true;
    }
    if let Some(rank) = RANKS.iter().find(|rank| rank.frame == frame) {
        return state.level >= rank.min_level;
    }
    SPECIAL_FRAMES
        .iter()
        .any(|(name, requirement)| *name == frame && requirement.met(state, ovr))
}
