use crate::error::BalanceError;
use crate::models::{RankingRow, TeamAssignment, MAX_TEAMS, TEAM_NAMES, TEAM_SIZE};
use std::collections::HashSet;
use uuid::Uuid;

/// Pick the open team with the lowest K/D sum, then the fewest members, then
/// the lowest index. Full teams are skipped so every team ends at `TEAM_SIZE`.
fn weakest_team(teams: &[TeamAssignment]) -> usize {
    teams
        .iter()
        .filter(|team| team.members.len() < TEAM_SIZE)
        .min_by(|a, b| {
            a.kd_sum
                .total_cmp(&b.kd_sum)
                .then(a.members.len().cmp(&b.members.len()))
                .then(a.index.cmp(&b.index))
        })
        .map(|team| team.index)
        .unwrap_or(0)
}

/// Split the selected players into `team_count` teams of `TEAM_SIZE` using
/// greedy K/D balancing. Strongest players are placed first, each on the
/// currently weakest team.
pub fn balance_teams(
    pool: &[RankingRow],
    selected_ids: &[Uuid],
    team_count: usize,
) -> Result<Vec<TeamAssignment>, BalanceError> {
    if team_count == 0 || team_count > MAX_TEAMS {
        return Err(BalanceError::InvalidTeamCount {
            got: team_count,
            max: MAX_TEAMS,
        });
    }

    let selected: HashSet<Uuid> = selected_ids.iter().copied().collect();
    let expected = team_count * TEAM_SIZE;
    if selected.len() != expected {
        return Err(BalanceError::InvalidSelectionSize {
            selected: selected.len(),
            expected,
            team_count,
            team_size: TEAM_SIZE,
        });
    }

    if let Some(missing) = selected_ids
        .iter()
        .find(|id| !pool.iter().any(|row| row.player_id == **id))
    {
        return Err(BalanceError::UnknownPlayer(*missing));
    }

    let mut players: Vec<&RankingRow> = pool
        .iter()
        .filter(|row| selected.contains(&row.player_id))
        .collect();
    players.sort_by(|a, b| b.kd.total_cmp(&a.kd));

    let mut teams: Vec<TeamAssignment> = (0..team_count)
        .map(|index| TeamAssignment {
            index,
            name: TEAM_NAMES[index],
            members: Vec::with_capacity(TEAM_SIZE),
            kd_sum: 0.0,
            avg_kd: 0.0,
        })
        .collect();

    for player in players {
        let target = weakest_team(&teams);
        let team = &mut teams[target];
        team.kd_sum += player.kd;
        team.members.push(player.clone());
    }

    for team in &mut teams {
        team.avg_kd = team.kd_sum / team.members.len() as f64;
    }

    tracing::debug!(
        team_count,
        spread = kd_spread(&teams),
        "balanced teams"
    );

    Ok(teams)
}

/// Difference between the strongest and weakest team's average K/D
pub fn kd_spread(teams: &[TeamAssignment]) -> f64 {
    let max = teams.iter().map(|t| t.avg_kd).fold(f64::NEG_INFINITY, f64::max);
    let min = teams.iter().map(|t| t.avg_kd).fold(f64::INFINITY, f64::min);
    if teams.is_empty() {
        0.0
    } else {
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(nick: &str, kd: f64) -> RankingRow {
        RankingRow {
            player_id: Uuid::new_v4(),
            season_id: Uuid::nil(),
            nick: nick.to_string(),
            matches: 10,
            kills: 0,
            deaths: 0,
            assists: 0,
            damage: 0,
            kd,
            damage_per_match: 0.0,
            score: None,
            tier: None,
        }
    }

    fn make_pool(kds: &[f64]) -> Vec<RankingRow> {
        kds.iter()
            .enumerate()
            .map(|(i, kd)| make_row(&format!("P{}", i), *kd))
            .collect()
    }

    fn ids(pool: &[RankingRow]) -> Vec<Uuid> {
        pool.iter().map(|r| r.player_id).collect()
    }

    const TEN_KDS: [f64; 10] = [3.0, 2.8, 2.5, 2.0, 1.8, 1.5, 1.2, 1.0, 0.8, 0.5];

    #[test]
    fn test_first_two_assignments_split() {
        let pool = make_pool(&TEN_KDS);
        let teams = balance_teams(&pool, &ids(&pool), 2).unwrap();

        assert_eq!(teams[0].members[0].kd, 3.0);
        assert_eq!(teams[1].members[0].kd, 2.8);
        assert_eq!(teams[0].name, "Alpha");
        assert_eq!(teams[1].name, "Omega");
    }

    #[test]
    fn test_partition_property() {
        let pool = make_pool(&[
            2.1, 0.4, 1.7, 1.1, 0.9, 3.3, 1.0, 1.0, 0.2, 2.6, 1.4, 0.7, 1.9, 0.3, 1.2,
        ]);
        let selected = ids(&pool);
        let teams = balance_teams(&pool, &selected, 3).unwrap();

        let placed: Vec<Uuid> = teams
            .iter()
            .flat_map(|t| t.members.iter().map(|m| m.player_id))
            .collect();
        let unique: HashSet<Uuid> = placed.iter().copied().collect();

        assert_eq!(placed.len(), selected.len());
        assert_eq!(unique, selected.into_iter().collect::<HashSet<_>>());
        for team in &teams {
            assert_eq!(team.members.len(), TEAM_SIZE);
        }
    }

    #[test]
    fn test_each_assignment_goes_to_weakest_team() {
        let pool = make_pool(&TEN_KDS);
        let teams = balance_teams(&pool, &ids(&pool), 2).unwrap();

        // Replay the placements in K/D order and check each one was made on the
        // team with the lowest running sum at that moment
        let mut order: Vec<(usize, f64)> = teams
            .iter()
            .flat_map(|t| t.members.iter().map(move |m| (t.index, m.kd)))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut sums = vec![0.0; teams.len()];
        let mut counts = vec![0usize; teams.len()];
        for (team, kd) in order {
            let lowest = sums
                .iter()
                .zip(&counts)
                .filter(|(_, count)| **count < TEAM_SIZE)
                .map(|(sum, _)| *sum)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(sums[team], lowest);
            sums[team] += kd;
            counts[team] += 1;
        }
        assert_eq!(counts, vec![5, 5]);
    }

    #[test]
    fn test_average_kd() {
        let pool = make_pool(&TEN_KDS);
        let teams = balance_teams(&pool, &ids(&pool), 2).unwrap();

        for team in &teams {
            let sum: f64 = team.members.iter().map(|m| m.kd).sum();
            assert!((team.kd_sum - sum).abs() < 1e-9);
            assert!((team.avg_kd - sum / 5.0).abs() < 1e-9);
        }
        assert!(kd_spread(&teams) < 0.5);
    }

    #[test]
    fn test_equal_sums_prefer_fewer_members() {
        let pool = make_pool(&[0.0; 10]);
        let teams = balance_teams(&pool, &ids(&pool), 2).unwrap();

        let alpha: Vec<&str> = teams[0].members.iter().map(|m| m.nick.as_str()).collect();
        assert_eq!(alpha, vec!["P0", "P2", "P4", "P6", "P8"]);
    }

    #[test]
    fn test_full_team_takes_no_more_players() {
        // Omega stays below Alpha's sum the whole time but closes at five
        let pool = make_pool(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let teams = balance_teams(&pool, &ids(&pool), 2).unwrap();

        assert_eq!(teams[0].members.len(), 5);
        assert_eq!(teams[1].members.len(), 5);
        assert_eq!(teams[0].kd_sum, 1.0);
        assert_eq!(teams[1].kd_sum, 0.0);
    }

    #[test]
    fn test_invalid_selection_size() {
        let pool = make_pool(&TEN_KDS);
        let selected = &ids(&pool)[..7];

        let err = balance_teams(&pool, selected, 2).unwrap_err();
        assert_eq!(
            err,
            BalanceError::InvalidSelectionSize {
                selected: 7,
                expected: 10,
                team_count: 2,
                team_size: TEAM_SIZE,
            }
        );
    }

    #[test]
    fn test_duplicate_ids_do_not_count_twice() {
        let pool = make_pool(&TEN_KDS);
        let mut selected = ids(&pool)[..9].to_vec();
        selected.push(selected[0]);

        assert!(matches!(
            balance_teams(&pool, &selected, 2),
            Err(BalanceError::InvalidSelectionSize { selected: 9, .. })
        ));
    }

    #[test]
    fn test_invalid_team_count() {
        let pool = make_pool(&TEN_KDS);
        assert!(matches!(
            balance_teams(&pool, &ids(&pool), 0),
            Err(BalanceError::InvalidTeamCount { got: 0, .. })
        ));
        assert!(matches!(
            balance_teams(&pool, &[], MAX_TEAMS + 1),
            Err(BalanceError::InvalidTeamCount { .. })
        ));
    }

    #[test]
    fn test_unknown_player() {
        let pool = make_pool(&TEN_KDS);
        let mut selected = ids(&pool)[..9].to_vec();
        let stranger = Uuid::new_v4();
        selected.push(stranger);

        assert_eq!(
            balance_teams(&pool, &selected, 2).unwrap_err(),
            BalanceError::UnknownPlayer(stranger)
        );
    }
}
