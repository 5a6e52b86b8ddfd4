pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use crate::models::{Player, Season, Stat, StatEntry};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Players, seasons and per-season stats. Deleting a player or a season also
/// deletes the stats that reference it.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// All players ordered by nick
    async fn list_players(&self) -> Result<Vec<Player>, StoreError>;
    /// All seasons, newest first
    async fn list_seasons(&self) -> Result<Vec<Season>, StoreError>;
    async fn list_stats(&self) -> Result<Vec<Stat>, StoreError>;

    async fn add_player(&self, nick: &str) -> Result<Player, StoreError>;
    async fn rename_player(&self, id: Uuid, nick: &str) -> Result<Option<Player>, StoreError>;
    async fn delete_player(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn add_season(&self, name: &str) -> Result<Season, StoreError>;
    async fn rename_season(&self, id: Uuid, name: &str) -> Result<Option<Season>, StoreError>;
    async fn delete_season(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Add a submission to the (player, season) record, creating it on first use
    async fn record_stats(&self, entry: &StatEntry) -> Result<Stat, StoreError>;
}

/// Snapshot of everything the ranking pages need
pub struct Snapshot {
    pub players: Vec<Player>,
    pub seasons: Vec<Season>,
    pub stats: Vec<Stat>,
}

pub async fn snapshot(store: &dyn EntityStore) -> Result<Snapshot, StoreError> {
    let (players, seasons, stats) = tokio::try_join!(
        store.list_players(),
        store.list_seasons(),
        store.list_stats()
    )?;
    Ok(Snapshot {
        players,
        seasons,
        stats,
    })
}

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Run a read up to `retries + 1` times, backing off linearly between attempts
pub async fn with_retries<T, F, Fut>(retries: u32, what: &str, mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!(attempt, error = %e, "{} failed, retrying", what);
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}
