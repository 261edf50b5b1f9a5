//! Rank tiers derived from level via a fixed threshold table.

/// A named rank tier. `frame` is the cosmetic frame unlocked on reaching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub name: &'static str,
    pub min_level: u32,
    pub frame: &'static str,
}

pub const RANKS: [Rank; 8] = [
    Rank {
        name: "Bronze",
        min_level: 1,
        frame: "frame-bronze",
    },
    Rank {
        name: "Silver",
        min_level: 3,
        frame: "frame-silver",
    },
    Rank {
        name: "Gold",
        min_level: 6,
        frame: "frame-gold",
    },
    Rank {
        name: "Platinum",
        min_level: 10,
        frame: "frame-platinum",
    },
    Rank {
        name: "Diamond",
        min_level: 15,
        frame: "frame-diamond",
    },
    Rank {
        name: "Master",
        min_level: 21,
        frame: "frame-master",
    },
    Rank {
        name: "Grandmaster",
        min_level: 28,
        frame: "frame-grandmaster",
    },
    Rank {
        name: "Challenger",
        min_level: 36,
        frame: "frame-challenger",
    },
];

/// Highest rank whose threshold the level meets. Levels below the table
/// floor clamp to Bronze.
#[must_use]
pub fn rank_for_level(level: u32) -> &'static Rank {
    RANKS
        .iter()
        .rev()
        .find(|rank| level >= rank.min_level)
        .unwrap_or(&RANKS[0])
}

/// Position of a rank name in the ladder, used for monotonic comparisons.
#[must_use]
pub fn rank_index(name: &str) -> Option<usize> {
    RANKS.iter().position(|rank| rank.name == name)
}

/// The higher of the held rank and the rank earned by `level`. Unknown held
/// names (legacy records) are treated as below Bronze.
#[must_use]
pub fn advance_rank<'a>(held: &'a str, level: u32) -> &'a str {
    let earned = rank_for_level(level);
    let held_idx = rank_index(held);
    let earned_idx = rank_index(earned.name).unwrap_or(0);
    match held_idx {
        Some(idx) if idx >= earned_idx => held,
        _ => earned.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_thresholds_match_table() {
        assert_eq!(rank_for_level(1).name, "Bronze");
        assert_eq!(rank_for_level(2).name, "Bronze");
        assert_eq!(rank_for_level(3).name, "Silver");
        assert_eq!(rank_for_level(14).name, "Platinum");
        assert_eq!(rank_for_level(15).name, "Diamond");
        assert_eq!(rank_for_level(99).name, "Challenger");
        assert_eq!(rank_for_level(0).name, "Bronze");
    }

    #[test]
    fn advance_rank_never_downgrades() {
        assert_eq!(advance_rank("Diamond", 3), "Diamond");
        assert_eq!(advance_rank("Bronze", 6), "Gold");
        assert_eq!(advance_rank("", 1), "Bronze");
        assert_eq!(advance_rank("garbage", 10), "Platinum");
    }

    #[test]
    fn ladder_is_strictly_increasing() {
        for pair in RANKS.windows(2) {
            assert!(pair[0].min_level < pair[1].min_level);
        }
    }
}
