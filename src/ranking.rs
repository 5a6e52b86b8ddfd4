use crate::models::{
    Player, RankingRow, ScoreWeights, Stat, MIN_MATCHES_FOR_TIER, UNKNOWN_NICK,
};
use crate::tier::classify;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Column a ranking can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Nick,
    Matches,
    Kills,
    Deaths,
    Assists,
    Damage,
    #[default]
    Kd,
    DamagePerMatch,
    Score,
}

impl SortKey {
    pub const ALL: &'static [SortKey] = &[
        SortKey::Nick,
        SortKey::Matches,
        SortKey::Kills,
        SortKey::Deaths,
        SortKey::Assists,
        SortKey::Damage,
        SortKey::DamagePerMatch,
        SortKey::Kd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Nick => "nick",
            SortKey::Matches => "matches",
            SortKey::Kills => "kills",
            SortKey::Deaths => "deaths",
            SortKey::Assists => "assists",
            SortKey::Damage => "damage",
            SortKey::Kd => "kd",
            SortKey::DamagePerMatch => "damage_per_match",
            SortKey::Score => "score",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SortKey::Nick => "Nick",
            SortKey::Matches => "Matches",
            SortKey::Kills => "Kills",
            SortKey::Deaths => "Deaths",
            SortKey::Assists => "Assists",
            SortKey::Damage => "Damage",
            SortKey::Kd => "K/D",
            SortKey::DamagePerMatch => "Dmg/Match",
            SortKey::Score => "Score",
        }
    }

    fn compare(self, a: &RankingRow, b: &RankingRow) -> Ordering {
        match self {
            // Case-insensitive, with exact case as the tiebreak
            SortKey::Nick => a
                .nick
                .to_lowercase()
                .cmp(&b.nick.to_lowercase())
                .then_with(|| a.nick.cmp(&b.nick)),
            SortKey::Matches => a.matches.cmp(&b.matches),
            SortKey::Kills => a.kills.cmp(&b.kills),
            SortKey::Deaths => a.deaths.cmp(&b.deaths),
            SortKey::Assists => a.assists.cmp(&b.assists),
            SortKey::Damage => a.damage.cmp(&b.damage),
            SortKey::Kd => a.kd.total_cmp(&b.kd),
            SortKey::DamagePerMatch => a.damage_per_match.total_cmp(&b.damage_per_match),
            // Unscored rows sort below every scored one
            SortKey::Score => match (a.score, b.score) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    pub fn toggle(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub dir: SortDir,
}

impl Sort {
    pub fn new(key: SortKey, dir: SortDir) -> Self {
        Self { key, dir }
    }
}

/// Kills per death. A deathless player's kill count is used as the ratio.
pub fn kd(kills: i64, deaths: i64) -> f64 {
    if deaths == 0 {
        kills as f64
    } else {
        kills as f64 / deaths as f64
    }
}

pub fn damage_per_match(damage: i64, matches: i64) -> f64 {
    if matches == 0 {
        0.0
    } else {
        damage as f64 / matches as f64
    }
}

/// Composite score with capped rates and a log-scaled match bonus
pub fn score(stat: &Stat, weights: &ScoreWeights) -> f64 {
    let matches = stat.matches.max(1) as f64;
    let kpm = stat.kills as f64 / matches;
    let apm = stat.assists as f64 / matches;

    kd(stat.kills, stat.deaths).min(weights.kd_cap) * weights.kd_weight
        + kpm.min(weights.kpm_cap) * weights.kpm_weight
        + apm.min(weights.apm_cap) * weights.apm_weight
        + matches.log10() * weights.matches_weight
}

fn make_row(stat: &Stat, nick: String, weights: &ScoreWeights) -> RankingRow {
    let kd = kd(stat.kills, stat.deaths);
    let (score, tier) = if stat.matches >= MIN_MATCHES_FOR_TIER {
        let score = score(stat, weights);
        (Some(score), Some(classify(score, kd)))
    } else {
        (None, None)
    };

    RankingRow {
        player_id: stat.player_id,
        season_id: stat.season_id,
        nick,
        matches: stat.matches,
        kills: stat.kills,
        deaths: stat.deaths,
        assists: stat.assists,
        damage: stat.damage,
        kd,
        damage_per_match: damage_per_match(stat.damage, stat.matches),
        score,
        tier,
    }
}

/// Stable in-place sort; equal keys keep their relative order in both directions
pub fn sort_rows(rows: &mut [RankingRow], sort: Sort) {
    match sort.dir {
        SortDir::Asc => rows.sort_by(|a, b| sort.key.compare(a, b)),
        SortDir::Desc => rows.sort_by(|a, b| sort.key.compare(b, a)),
    }
}

/// Build the ranking of one season. Stats whose player is missing are kept
/// under the `Unknown` nick so the rest of the season still shows.
pub fn compute_ranking(
    stats: &[Stat],
    players: &[Player],
    season_id: Uuid,
    sort: Sort,
    weights: &ScoreWeights,
) -> Vec<RankingRow> {
    let nicks: HashMap<Uuid, &str> = players.iter().map(|p| (p.id, p.nick.as_str())).collect();

    let mut rows: Vec<RankingRow> = stats
        .iter()
        .filter(|s| s.season_id == season_id)
        .map(|s| {
            let nick = match nicks.get(&s.player_id) {
                Some(nick) => nick.to_string(),
                None => {
                    tracing::warn!(stat_id = %s.id, player_id = %s.player_id, "stat references a missing player");
                    UNKNOWN_NICK.to_string()
                }
            };
            make_row(s, nick, weights)
        })
        .collect();

    sort_rows(&mut rows, sort);
    rows
}

/// Tier-qualified rows only, best score first
pub fn tier_ladder(rows: &[RankingRow]) -> Vec<RankingRow> {
    let mut ladder: Vec<RankingRow> = rows.iter().filter(|r| r.tier.is_some()).cloned().collect();
    sort_rows(&mut ladder, Sort::new(SortKey::Score, SortDir::Desc));
    ladder
}

/// One row per known player for a season, with zeroed counters for players
/// who have not played it yet. Ordered by nick.
pub fn player_pool(
    stats: &[Stat],
    players: &[Player],
    season_id: Uuid,
    weights: &ScoreWeights,
) -> Vec<RankingRow> {
    let by_player: HashMap<Uuid, &Stat> = stats
        .iter()
        .filter(|s| s.season_id == season_id)
        .map(|s| (s.player_id, s))
        .collect();

    let mut pool: Vec<RankingRow> = players
        .iter()
        .map(|p| match by_player.get(&p.id) {
            Some(stat) => make_row(stat, p.nick.clone(), weights),
            None => RankingRow {
                player_id: p.id,
                season_id,
                nick: p.nick.clone(),
                matches: 0,
                kills: 0,
                deaths: 0,
                assists: 0,
                damage: 0,
                kd: 0.0,
                damage_per_match: 0.0,
                score: None,
                tier: None,
            },
        })
        .collect();

    sort_rows(&mut pool, Sort::new(SortKey::Nick, SortDir::Asc));
    pool
}
