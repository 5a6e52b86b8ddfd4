use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TEAM_SIZE: usize = 5;
pub const TEAM_NAMES: &[&str] = &["Alpha", "Omega", "Gamma", "Delta", "Epsilon", "Zeta"];
pub const MAX_TEAMS: usize = TEAM_NAMES.len();
pub const MIN_MATCHES_FOR_TIER: i64 = 3;
pub const UNKNOWN_NICK: &str = "Unknown";
pub const INSIGHT_TOP_N: usize = 10;

/// Weights and caps of the composite ranking score.
///
/// `score = min(kd, kd_cap) * kd_weight + min(kpm, kpm_cap) * kpm_weight
///        + min(apm, apm_cap) * apm_weight + log10(matches) * matches_weight`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub kd_cap: f64,
    pub kd_weight: f64,
    pub kpm_cap: f64,
    pub kpm_weight: f64,
    pub apm_cap: f64,
    pub apm_weight: f64,
    pub matches_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            kd_cap: 2.5,
            kd_weight: 400.0,
            kpm_cap: 25.0,
            kpm_weight: 10.0,
            apm_cap: 15.0,
            apm_weight: 10.0,
            matches_weight: 100.0,
        }
    }
}

/// Player from the entity store
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub nick: String,
    pub created_at: DateTime<Utc>,
}

/// Season from the entity store
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Accumulated statistics of one player in one season
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Stat {
    pub id: Uuid,
    pub player_id: Uuid,
    pub season_id: Uuid,
    pub matches: i64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub damage: i64,
    pub created_at: DateTime<Utc>,
}

impl Stat {
    /// Create the first record for a (player, season) pair
    pub fn from_entry(entry: &StatEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id: entry.player_id,
            season_id: entry.season_id,
            matches: entry.matches,
            kills: entry.kills,
            deaths: entry.deaths,
            assists: entry.assists,
            damage: entry.damage,
            created_at: Utc::now(),
        }
    }

    /// Add a new submission on top of the stored counters. On overflow the
    /// record is left untouched.
    pub fn accumulate(&mut self, entry: &StatEntry) -> Result<(), StoreError> {
        let add = |field: &'static str, total: i64, extra: i64| {
            total.checked_add(extra).ok_or(StoreError::CounterOverflow(field))
        };
        let matches = add("matches", self.matches, entry.matches)?;
        let kills = add("kills", self.kills, entry.kills)?;
        let deaths = add("deaths", self.deaths, entry.deaths)?;
        let assists = add("assists", self.assists, entry.assists)?;
        let damage = add("damage", self.damage, entry.damage)?;

        self.matches = matches;
        self.kills = kills;
        self.deaths = deaths;
        self.assists = assists;
        self.damage = damage;
        Ok(())
    }
}

/// One stats submission from the admin form
#[derive(Debug, Clone, Deserialize)]
pub struct StatEntry {
    pub player_id: Uuid,
    pub season_id: Uuid,
    pub matches: i64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub damage: i64,
}

impl StatEntry {
    /// Name of the first negative counter, if any
    pub fn negative_field(&self) -> Option<&'static str> {
        [
            ("matches", self.matches),
            ("kills", self.kills),
            ("deaths", self.deaths),
            ("assists", self.assists),
            ("damage", self.damage),
        ]
        .into_iter()
        .find(|(_, value)| *value < 0)
        .map(|(name, _)| name)
    }
}

/// Derived ranking entry, never persisted
#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    pub player_id: Uuid,
    pub season_id: Uuid,
    pub nick: String,
    pub matches: i64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub damage: i64,
    pub kd: f64,
    pub damage_per_match: f64,
    /// Only set once the player has `MIN_MATCHES_FOR_TIER` matches
    pub score: Option<f64>,
    pub tier: Option<&'static Tier>,
}

/// Skill bracket with its upper score cutoff and K/D floor
#[derive(Debug, PartialEq, Serialize)]
pub struct Tier {
    pub label: &'static str,
    pub cutoff: f64,
    pub min_kd: f64,
    pub badge: &'static str,
}

/// Result of team balancing for one team
#[derive(Debug, Clone)]
pub struct TeamAssignment {
    pub index: usize,
    pub name: &'static str,
    pub members: Vec<RankingRow>,
    pub kd_sum: f64,
    pub avg_kd: f64,
}
