pub mod admin;
pub mod insights;
pub mod layout;
pub mod ranking;
pub mod teams;

use crate::models::Season;
use uuid::Uuid;

/// The requested season if it exists, otherwise the newest one
pub fn selected_season(seasons: &[Season], requested: Option<Uuid>) -> Option<&Season> {
    requested
        .and_then(|id| seasons.iter().find(|s| s.id == id))
        .or_else(|| seasons.first())
}
