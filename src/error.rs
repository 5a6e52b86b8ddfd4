use thiserror::Error;
use uuid::Uuid;

/// Reasons the team balancer refuses to run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("select exactly {expected} players for {team_count} teams of {team_size} (got {selected})")]
    InvalidSelectionSize {
        selected: usize,
        expected: usize,
        team_count: usize,
        team_size: usize,
    },
    #[error("team count must be between 1 and {max} (got {got})")]
    InvalidTeamCount { got: usize, max: usize },
    #[error("player {0} is not part of this season's pool")]
    UnknownPlayer(Uuid),
}

/// Failures of the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("unknown player {0}")]
    UnknownPlayer(Uuid),
    #[error("unknown season {0}")]
    UnknownSeason(Uuid),
    #[error("invalid stats: {0} must not be negative")]
    InvalidEntry(&'static str),
    #[error("invalid stats: the season total for {0} is out of range")]
    CounterOverflow(&'static str),
}

/// Failures talking to the text generation service
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_size_message() {
        let err = BalanceError::InvalidSelectionSize {
            selected: 7,
            expected: 10,
            team_count: 2,
            team_size: 5,
        };
        assert_eq!(
            err.to_string(),
            "select exactly 10 players for 2 teams of 5 (got 7)"
        );
    }
}
