use crate::models::Tier;

/// Ascending tier table. A score belongs to the first tier whose cutoff is
/// greater than or equal to it, so a score sitting exactly on a cutoff stays
/// in the lower tier.
pub const TIERS: &[Tier] = &[
    Tier { label: "Silver I", cutoff: 300.0, min_kd: 0.0, badge: "🥈" },
    Tier { label: "Silver Elite", cutoff: 500.0, min_kd: 0.0, badge: "🥈" },
    Tier { label: "Gold Nova", cutoff: 700.0, min_kd: 0.8, badge: "⭐" },
    Tier { label: "Gold Nova Master", cutoff: 900.0, min_kd: 0.95, badge: "🌟" },
    Tier { label: "Master Guardian", cutoff: 1050.0, min_kd: 1.1, badge: "🛡️" },
    Tier { label: "Legendary Eagle", cutoff: 1200.0, min_kd: 1.3, badge: "🦅" },
    Tier { label: "Supreme Master", cutoff: 1350.0, min_kd: 1.6, badge: "💎" },
    Tier { label: "Global Elite", cutoff: f64::INFINITY, min_kd: 2.0, badge: "🌍" },
];

/// Tier for a score alone (no K/D floor)
pub fn tier_for_score(score: f64) -> usize {
    TIERS
        .iter()
        .position(|t| t.cutoff >= score)
        .unwrap_or(TIERS.len() - 1)
}

/// Classify a player by score, then hold them down until their K/D clears the
/// tier's floor. A high score with a low K/D can therefore land below the
/// tier the score alone would give.
pub fn classify(score: f64, kd: f64) -> &'static Tier {
    let mut idx = tier_for_score(score);
    while idx > 0 && kd < TIERS[idx].min_kd {
        idx -= 1;
    }
    &TIERS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ascending() {
        for pair in TIERS.windows(2) {
            assert!(pair[0].cutoff < pair[1].cutoff);
            assert!(pair[0].min_kd <= pair[1].min_kd);
        }
        assert_eq!(TIERS[0].min_kd, 0.0);
    }

    #[test]
    fn test_boundary_stays_in_lower_tier() {
        assert_eq!(classify(300.0, 5.0).label, "Silver I");
        assert_eq!(classify(300.5, 5.0).label, "Silver Elite");
        assert_eq!(classify(1350.0, 5.0).label, "Supreme Master");
    }

    #[test]
    fn test_above_last_cutoff_is_top_tier() {
        assert_eq!(classify(5000.0, 3.0).label, "Global Elite");
    }

    #[test]
    fn test_low_score() {
        assert_eq!(classify(0.0, 0.0).label, "Silver I");
        assert_eq!(classify(-10.0, 0.0).label, "Silver I");
    }

    #[test]
    fn test_kd_floor_holds_player_down() {
        // Score alone says Global Elite, K/D only clears Legendary Eagle
        assert_eq!(tier_for_score(1500.0), TIERS.len() - 1);
        assert_eq!(classify(1500.0, 1.4).label, "Legendary Eagle");

        // Zero K/D falls all the way to the floorless tiers
        assert_eq!(classify(800.0, 0.0).label, "Silver Elite");
    }
}
