use super::{with_retries, EntityStore};
use crate::error::StoreError;
use crate::models::{Player, Season, Stat, StatEntry};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const STAT_COLUMNS: &str =
    "id, player_id, season_id, matches, kills, deaths, assists, damage, created_at";

/// Postgres-backed store. Cascades and the one-record-per-pair rule are
/// enforced by the schema in `migrations/`.
pub struct PgStore {
    pool: PgPool,
    read_retries: u32,
}

impl PgStore {
    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str, read_retries: u32) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool, read_retries })
    }
}

#[async_trait]
impl EntityStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        let pool = &self.pool;
        with_retries(self.read_retries, "list players", || async move {
            sqlx::query_as::<_, Player>(
                "SELECT id, nick, created_at FROM players ORDER BY LOWER(nick)",
            )
            .fetch_all(pool)
            .await
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_seasons(&self) -> Result<Vec<Season>, StoreError> {
        let pool = &self.pool;
        with_retries(self.read_retries, "list seasons", || async move {
            sqlx::query_as::<_, Season>(
                "SELECT id, name, created_at FROM seasons ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_stats(&self) -> Result<Vec<Stat>, StoreError> {
        let pool = &self.pool;
        let query = format!("SELECT {STAT_COLUMNS} FROM stats ORDER BY created_at");
        let query = query.as_str();
        with_retries(self.read_retries, "list stats", || async move {
            sqlx::query_as::<_, Stat>(query)
                .fetch_all(pool)
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn add_player(&self, nick: &str) -> Result<Player, StoreError> {
        Ok(sqlx::query_as::<_, Player>(
            "INSERT INTO players (id, nick) VALUES ($1, $2) RETURNING id, nick, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(nick)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn rename_player(&self, id: Uuid, nick: &str) -> Result<Option<Player>, StoreError> {
        Ok(sqlx::query_as::<_, Player>(
            "UPDATE players SET nick = $1 WHERE id = $2 RETURNING id, nick, created_at",
        )
        .bind(nick)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_player(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_season(&self, name: &str) -> Result<Season, StoreError> {
        Ok(sqlx::query_as::<_, Season>(
            "INSERT INTO seasons (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn rename_season(&self, id: Uuid, name: &str) -> Result<Option<Season>, StoreError> {
        Ok(sqlx::query_as::<_, Season>(
            "UPDATE seasons SET name = $1 WHERE id = $2 RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_season(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_stats(&self, entry: &StatEntry) -> Result<Stat, StoreError> {
        if let Some(field) = entry.negative_field() {
            return Err(StoreError::InvalidEntry(field));
        }

        let query = format!(
            "INSERT INTO stats (id, player_id, season_id, matches, kills, deaths, assists, damage)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (player_id, season_id) DO UPDATE SET
                matches = stats.matches + EXCLUDED.matches,
                kills = stats.kills + EXCLUDED.kills,
                deaths = stats.deaths + EXCLUDED.deaths,
                assists = stats.assists + EXCLUDED.assists,
                damage = stats.damage + EXCLUDED.damage
             RETURNING {STAT_COLUMNS}"
        );

        let result = sqlx::query_as::<_, Stat>(&query)
            .bind(Uuid::new_v4())
            .bind(entry.player_id)
            .bind(entry.season_id)
            .bind(entry.matches)
            .bind(entry.kills)
            .bind(entry.deaths)
            .bind(entry.assists)
            .bind(entry.damage)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(stat) => Ok(stat),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                if db.constraint() == Some("stats_season_id_fkey") {
                    Err(StoreError::UnknownSeason(entry.season_id))
                } else {
                    Err(StoreError::UnknownPlayer(entry.player_id))
                }
            }
            // numeric_value_out_of_range: a BIGINT total would overflow
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("22003") => {
                Err(StoreError::CounterOverflow("a season counter"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
