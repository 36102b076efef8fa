//! League rank names

const TIERS: [&str; 8] = [
    "Rookie", "Iron", "Bronze", "Silver", "Gold", "Platinum", "Diamond", "Master",
];

/// First rank number of Master League
const MASTER_LEAGUE_START: i64 = 38;

/// Display name for a league rank number
///
/// Ranks 1-32 are eight tiers of four divisions, 33-37 are Legendary 1-5,
/// 38 and above are Master League levels.
pub fn rank_name(rank: i64) -> String {
    match rank {
        1..=32 => {
            let index = (rank - 1) as usize;
            format!("{} {}", TIERS[index / 4], index % 4 + 1)
        }
        33..=37 => format!("Legendary {}", rank - 32),
        r if r >= MASTER_LEAGUE_START => format!("Master League {}", r - (MASTER_LEAGUE_START - 1)),
        _ => "Unknown".to_string(),
    }
}

/// Relative path of the rank icon used by OBS image sources
pub fn rank_image_name(rank: i64) -> String {
    format!("rank{}_s.png", rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(rank_name(1), "Rookie 1");
        assert_eq!(rank_name(4), "Rookie 4");
        assert_eq!(rank_name(5), "Iron 1");
        assert_eq!(rank_name(20), "Gold 4");
        assert_eq!(rank_name(21), "Platinum 1");
        assert_eq!(rank_name(32), "Master 4");
    }

    #[test]
    fn test_legendary_and_master_league() {
        assert_eq!(rank_name(33), "Legendary 1");
        assert_eq!(rank_name(37), "Legendary 5");
        assert_eq!(rank_name(38), "Master League 1");
        assert_eq!(rank_name(40), "Master League 3");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(rank_name(0), "Unknown");
        assert_eq!(rank_name(-4), "Unknown");
    }

    #[test]
    fn test_image_name() {
        assert_eq!(rank_image_name(17), "rank17_s.png");
    }
}
