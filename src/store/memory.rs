use super::EntityStore;
use crate::error::StoreError;
use crate::models::{Player, Season, Stat, StatEntry};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    players: Vec<Player>,
    seasons: Vec<Season>,
    stats: Vec<Stat>,
}

/// Process-local store, used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        let mut players = self.tables.read().await.players.clone();
        players.sort_by_key(|p| p.nick.to_lowercase());
        Ok(players)
    }

    async fn list_seasons(&self) -> Result<Vec<Season>, StoreError> {
        // Insertion order breaks created_at ties, later first
        let mut seasons = self.tables.read().await.seasons.clone();
        seasons.reverse();
        seasons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(seasons)
    }

    async fn list_stats(&self) -> Result<Vec<Stat>, StoreError> {
        Ok(self.tables.read().await.stats.clone())
    }

    async fn add_player(&self, nick: &str) -> Result<Player, StoreError> {
        let player = Player {
            id: Uuid::new_v4(),
            nick: nick.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.players.push(player.clone());
        Ok(player)
    }

    async fn rename_player(&self, id: Uuid, nick: &str) -> Result<Option<Player>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.players.iter_mut().find(|p| p.id == id).map(|p| {
            p.nick = nick.to_string();
            p.clone()
        }))
    }

    async fn delete_player(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.players.len();
        tables.players.retain(|p| p.id != id);
        if tables.players.len() == before {
            return Ok(false);
        }
        tables.stats.retain(|s| s.player_id != id);
        Ok(true)
    }

    async fn add_season(&self, name: &str) -> Result<Season, StoreError> {
        let season = Season {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.seasons.push(season.clone());
        Ok(season)
    }

    async fn rename_season(&self, id: Uuid, name: &str) -> Result<Option<Season>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.seasons.iter_mut().find(|s| s.id == id).map(|s| {
            s.name = name.to_string();
            s.clone()
        }))
    }

    async fn delete_season(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.seasons.len();
        tables.seasons.retain(|s| s.id != id);
        if tables.seasons.len() == before {
            return Ok(false);
        }
        tables.stats.retain(|s| s.season_id != id);
        Ok(true)
    }

    async fn record_stats(&self, entry: &StatEntry) -> Result<Stat, StoreError> {
        if let Some(field) = entry.negative_field() {
            return Err(StoreError::InvalidEntry(field));
        }

        let mut tables = self.tables.write().await;
        if !tables.players.iter().any(|p| p.id == entry.player_id) {
            return Err(StoreError::UnknownPlayer(entry.player_id));
        }
        if !tables.seasons.iter().any(|s| s.id == entry.season_id) {
            return Err(StoreError::UnknownSeason(entry.season_id));
        }

        let existing = tables
            .stats
            .iter()
            .position(|s| s.player_id == entry.player_id && s.season_id == entry.season_id);
        let stat = match existing {
            Some(idx) => {
                let stat = &mut tables.stats[idx];
                stat.accumulate(entry)?;
                stat.clone()
            }
            None => {
                let stat = Stat::from_entry(entry);
                tables.stats.push(stat.clone());
                stat
            }
        };
        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(player_id: Uuid, season_id: Uuid, matches: i64, kills: i64, deaths: i64) -> StatEntry {
        StatEntry {
            player_id,
            season_id,
            matches,
            kills,
            deaths,
            assists: 0,
            damage: 0,
        }
    }

    #[tokio::test]
    async fn test_record_stats_accumulates() {
        let store = MemoryStore::default();
        let player = store.add_player("Ghost").await.unwrap();
        let season = store.add_season("S1").await.unwrap();

        store.record_stats(&entry(player.id, season.id, 2, 10, 3)).await.unwrap();
        let stat = store.record_stats(&entry(player.id, season.id, 1, 5, 2)).await.unwrap();

        assert_eq!((stat.kills, stat.deaths, stat.matches), (15, 5, 3));
        assert_eq!(store.list_stats().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_stats_rejects_overflowing_totals() {
        let store = MemoryStore::default();
        let player = store.add_player("Ghost").await.unwrap();
        let season = store.add_season("S1").await.unwrap();

        store.record_stats(&entry(player.id, season.id, 1, i64::MAX, 0)).await.unwrap();
        let result = store.record_stats(&entry(player.id, season.id, 1, i64::MAX, 0)).await;
        assert!(matches!(result, Err(StoreError::CounterOverflow("kills"))));

        let stats = store.list_stats().await.unwrap();
        assert_eq!((stats[0].matches, stats[0].kills), (1, i64::MAX));
    }

    #[tokio::test]
    async fn test_record_stats_rejects_unknown_refs() {
        let store = MemoryStore::default();
        let player = store.add_player("Ghost").await.unwrap();

        let result = store.record_stats(&entry(player.id, Uuid::new_v4(), 1, 1, 1)).await;
        assert!(matches!(result, Err(StoreError::UnknownSeason(_))));

        let result = store.record_stats(&entry(Uuid::new_v4(), Uuid::new_v4(), 1, 1, 1)).await;
        assert!(matches!(result, Err(StoreError::UnknownPlayer(_))));
    }

    #[tokio::test]
    async fn test_record_stats_rejects_negative() {
        let store = MemoryStore::default();
        let result = store.record_stats(&entry(Uuid::nil(), Uuid::nil(), 1, -3, 0)).await;
        assert!(matches!(result, Err(StoreError::InvalidEntry("kills"))));
    }

    #[tokio::test]
    async fn test_delete_player_cascades() {
        let store = MemoryStore::default();
        let ghost = store.add_player("Ghost").await.unwrap();
        let viper = store.add_player("Viper").await.unwrap();
        let season = store.add_season("S1").await.unwrap();
        store.record_stats(&entry(ghost.id, season.id, 1, 1, 1)).await.unwrap();
        store.record_stats(&entry(viper.id, season.id, 1, 1, 1)).await.unwrap();

        assert!(store.delete_player(ghost.id).await.unwrap());
        assert!(!store.delete_player(ghost.id).await.unwrap());

        let stats = store.list_stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].player_id, viper.id);
    }

    #[tokio::test]
    async fn test_delete_season_cascades() {
        let store = MemoryStore::default();
        let ghost = store.add_player("Ghost").await.unwrap();
        let s1 = store.add_season("S1").await.unwrap();
        let s2 = store.add_season("S2").await.unwrap();
        store.record_stats(&entry(ghost.id, s1.id, 1, 1, 1)).await.unwrap();
        store.record_stats(&entry(ghost.id, s2.id, 1, 1, 1)).await.unwrap();

        assert!(store.delete_season(s1.id).await.unwrap());

        let stats = store.list_stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].season_id, s2.id);
    }

    #[tokio::test]
    async fn test_seasons_newest_first() {
        let store = MemoryStore::default();
        store.add_season("S1").await.unwrap();
        store.add_season("S2").await.unwrap();

        let seasons = store.list_seasons().await.unwrap();
        assert_eq!(seasons[0].name, "S2");
    }

    #[tokio::test]
    async fn test_rename() {
        let store = MemoryStore::default();
        let player = store.add_player("Ghost").await.unwrap();

        let renamed = store.rename_player(player.id, "Phantom").await.unwrap();
        assert_eq!(renamed.unwrap().nick, "Phantom");
        assert!(store.rename_player(Uuid::new_v4(), "x").await.unwrap().is_none());
        assert!(store.rename_season(Uuid::new_v4(), "x").await.unwrap().is_none());
    }
}
