use crate::auth::{is_authenticated, unauthorized};
use crate::error::StoreError;
use crate::models::{Player, Season, StatEntry};
use crate::ranking::kd;
use crate::store::snapshot;
use crate::views::layout::{base, error, season_options, AuthState};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::{cookie::CookieJar, Form};
use maud::{html, Markup};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Players and seasons share the same list widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Player,
    Season,
}

impl Kind {
    fn api(self) -> &'static str {
        match self {
            Kind::Player => "/api/players",
            Kind::Season => "/api/seasons",
        }
    }

    fn list_id(self) -> &'static str {
        match self {
            Kind::Player => "player-list",
            Kind::Season => "season-list",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Kind::Player => "player",
            Kind::Season => "season",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    auth_error: Option<u8>,
}

/// Admin page - players, seasons and stat entry
pub async fn page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<AdminQuery>,
) -> impl IntoResponse {
    let logged_in = is_authenticated(&jar, &state);
    let auth = AuthState::new(state.admin_password.is_some(), logged_in);

    let snap = match snapshot(state.store.as_ref()).await {
        Ok(snap) => snap,
        Err(e) => {
            tracing::error!(error = %e, "failed to load admin data");
            let content = error("Could not reach the league database. Try again shortly.");
            return Html(base("Admin", "admin", &auth, content).into_string());
        }
    };

    let content = html! {
        h2 { "League Admin" }
        @if query.auth_error.is_some() {
            p class="error" { "Wrong password." }
        }
        @if !logged_in {
            p class="secondary login-hint" { "Login to manage the league." }
        }

        details open {
            summary { "Record match stats" }
            form hx-post="/api/stats" hx-target="#stats-result" {
                div class="grid" {
                    (player_select(&snap.players, logged_in, false))
                    (season_select(&snap.seasons, logged_in, false))
                }
                div class="grid" {
                    (number_input("matches", "Matches", 1, logged_in))
                    (number_input("kills", "Kills", 0, logged_in))
                    (number_input("deaths", "Deaths", 0, logged_in))
                    (number_input("assists", "Assists", 0, logged_in))
                    (number_input("damage", "Damage", 0, logged_in))
                }
                button type="submit" disabled[!logged_in] { "Save stats" }
            }
            div id="stats-result" {}
        }

        hr;

        div class="grid" {
            section {
                h3 { "Players" }
                (add_form(Kind::Player, "nick", "Player nick", logged_in))
                div id=(Kind::Player.list_id()) {
                    (render_players(&snap.players, logged_in))
                }
            }
            section {
                h3 { "Seasons" }
                (add_form(Kind::Season, "name", "Season name", logged_in))
                div id=(Kind::Season.list_id()) {
                    (render_seasons(&snap.seasons, logged_in))
                }
            }
        }
    };

    Html(base("Admin", "admin", &auth, content).into_string())
}

fn number_input(name: &str, label: &str, value: i64, enabled: bool) -> Markup {
    html! {
        label {
            (label)
            input type="number" name=(name) value=(value) min="0" required disabled[!enabled];
        }
    }
}

fn add_form(kind: Kind, field: &str, placeholder: &str, logged_in: bool) -> Markup {
    html! {
        form hx-post=(kind.api()) hx-target=(format!("#{}", kind.list_id())) hx-swap="innerHTML" {
            fieldset role="group" {
                input type="text" name=(field) placeholder=(placeholder) required disabled[!logged_in];
                button type="submit" disabled[!logged_in] { "Add" }
            }
        }
    }
}

fn render_entity_list(kind: Kind, items: &[(Uuid, &str)], field: &str, logged_in: bool) -> Markup {
    if items.is_empty() {
        return html! {
            p class="muted" { "No " (kind.noun()) "s yet." }
        };
    }

    let target = format!("#{}", kind.list_id());
    html! {
        ul class="player-list" {
            @for (id, label) in items {
                li {
                    form hx-post=(format!("{}/{}", kind.api(), id)) hx-target=(target) hx-swap="innerHTML" {
                        fieldset role="group" {
                            input type="text" name=(field) value=(label) required disabled[!logged_in];
                            button type="submit" class="secondary" disabled[!logged_in] { "Rename" }
                            button
                                type="button"
                                class="secondary outline"
                                hx-delete=(format!("{}/{}", kind.api(), id))
                                hx-target=(target)
                                hx-swap="innerHTML"
                                hx-confirm=(format!("Delete {} and all of its stats?", label))
                                disabled[!logged_in]
                            {
                                "Delete"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_players(players: &[Player], logged_in: bool) -> Markup {
    let items: Vec<(Uuid, &str)> = players.iter().map(|p| (p.id, p.nick.as_str())).collect();
    render_entity_list(Kind::Player, &items, "nick", logged_in)
}

fn render_seasons(seasons: &[Season], logged_in: bool) -> Markup {
    let items: Vec<(Uuid, &str)> = seasons.iter().map(|s| (s.id, s.name.as_str())).collect();
    render_entity_list(Kind::Season, &items, "name", logged_in)
}

/// Stats form player picker. With `oob` set it replaces the one already on the page.
fn player_select(players: &[Player], enabled: bool, oob: bool) -> Markup {
    html! {
        select id="stat-player" name="player_id" required disabled[!enabled] hx-swap-oob=[oob.then_some("true")] {
            option value="" { "Select a player..." }
            @for player in players {
                option value=(player.id) { (player.nick) }
            }
        }
    }
}

fn season_select(seasons: &[Season], enabled: bool, oob: bool) -> Markup {
    html! {
        select id="stat-season" name="season_id" required disabled[!enabled] hx-swap-oob=[oob.then_some("true")] {
            (season_options(seasons, seasons.first().map(|s| s.id)))
        }
    }
}

/// Re-render a list after a mutation, along with the matching stats form picker
async fn refreshed_list(state: &AppState, kind: Kind) -> Response {
    let result = match kind {
        Kind::Player => state.store.list_players().await.map(|players| {
            html! {
                (render_players(&players, true))
                (player_select(&players, true, true))
            }
        }),
        Kind::Season => state.store.list_seasons().await.map(|seasons| {
            html! {
                (render_seasons(&seasons, true))
                (season_select(&seasons, true, true))
            }
        }),
    };
    match result {
        Ok(markup) => Html(markup.into_string()).into_response(),
        Err(e) => store_failure(kind, "reload", e),
    }
}

fn store_failure(kind: Kind, action: &str, e: StoreError) -> Response {
    tracing::error!(error = %e, "failed to {} {}", action, kind.noun());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(error(&format!("Failed to {} {}", action, kind.noun())).into_string()),
    )
        .into_response()
}

fn clean_label(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[derive(Debug, Deserialize)]
pub struct PlayerForm {
    nick: String,
}

#[derive(Debug, Deserialize)]
pub struct SeasonForm {
    name: String,
}

fn empty_label(kind: Kind) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(error(&format!("The {} needs a name", kind.noun())).into_string()),
    )
        .into_response()
}

fn not_found(kind: Kind) -> Response {
    (StatusCode::NOT_FOUND, format!("{} not found", kind.noun())).into_response()
}

/// Create a new player (htmx endpoint)
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<PlayerForm>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }
    let Some(nick) = clean_label(&form.nick) else {
        return empty_label(Kind::Player);
    };

    match state.store.add_player(nick).await {
        Ok(player) => {
            tracing::info!(player_id = %player.id, nick = %player.nick, "player added");
            refreshed_list(&state, Kind::Player).await
        }
        Err(e) => store_failure(Kind::Player, "create", e),
    }
}

/// Rename a player (htmx endpoint)
pub async fn rename_player(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(form): Form<PlayerForm>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }
    let Some(nick) = clean_label(&form.nick) else {
        return empty_label(Kind::Player);
    };

    match state.store.rename_player(id, nick).await {
        Ok(Some(_)) => refreshed_list(&state, Kind::Player).await,
        Ok(None) => not_found(Kind::Player),
        Err(e) => store_failure(Kind::Player, "rename", e),
    }
}

/// Delete a player and their stats (htmx endpoint)
pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }

    match state.store.delete_player(id).await {
        Ok(true) => {
            tracing::info!(player_id = %id, "player deleted");
            refreshed_list(&state, Kind::Player).await
        }
        Ok(false) => not_found(Kind::Player),
        Err(e) => store_failure(Kind::Player, "delete", e),
    }
}

/// Create a new season (htmx endpoint)
pub async fn create_season(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SeasonForm>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }
    let Some(name) = clean_label(&form.name) else {
        return empty_label(Kind::Season);
    };

    match state.store.add_season(name).await {
        Ok(season) => {
            tracing::info!(season_id = %season.id, name = %season.name, "season added");
            refreshed_list(&state, Kind::Season).await
        }
        Err(e) => store_failure(Kind::Season, "create", e),
    }
}

/// Rename a season (htmx endpoint)
pub async fn rename_season(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
    Form(form): Form<SeasonForm>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }
    let Some(name) = clean_label(&form.name) else {
        return empty_label(Kind::Season);
    };

    match state.store.rename_season(id, name).await {
        Ok(Some(_)) => refreshed_list(&state, Kind::Season).await,
        Ok(None) => not_found(Kind::Season),
        Err(e) => store_failure(Kind::Season, "rename", e),
    }
}

/// Delete a season and its stats (htmx endpoint)
pub async fn delete_season(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }

    match state.store.delete_season(id).await {
        Ok(true) => {
            tracing::info!(season_id = %id, "season deleted");
            refreshed_list(&state, Kind::Season).await
        }
        Ok(false) => not_found(Kind::Season),
        Err(e) => store_failure(Kind::Season, "delete", e),
    }
}

/// Add a stats submission to the player's season totals (htmx endpoint)
pub async fn record_stats(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(entry): Form<StatEntry>,
) -> Response {
    if !is_authenticated(&jar, &state) {
        return unauthorized().into_response();
    }

    match state.store.record_stats(&entry).await {
        Ok(stat) => {
            tracing::info!(
                player_id = %stat.player_id,
                season_id = %stat.season_id,
                matches = stat.matches,
                "stats recorded"
            );
            Html(
                html! {
                    p class="success-message" {
                        "Saved. Season totals: "
                        (stat.matches) " matches, "
                        (stat.kills) "/" (stat.deaths) "/" (stat.assists)
                        " K/D/A, K/D " (format!("{:.2}", kd(stat.kills, stat.deaths)))
                    }
                }
                .into_string(),
            )
            .into_response()
        }
        Err(
            e @ (StoreError::InvalidEntry(_)
            | StoreError::CounterOverflow(_)
            | StoreError::UnknownPlayer(_)
            | StoreError::UnknownSeason(_)),
        ) => {
            (StatusCode::BAD_REQUEST, Html(error(&e.to_string()).into_string())).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to record stats");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error("Failed to save stats").into_string()),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("  Ghost "), Some("Ghost"));
        assert_eq!(clean_label("   "), None);
    }

    #[test]
    fn test_select_swaps_out_of_band_only_on_refresh() {
        let players = vec![Player {
            id: Uuid::nil(),
            nick: "Ghost".to_string(),
            created_at: chrono::Utc::now(),
        }];

        let refresh = player_select(&players, true, true).into_string();
        assert!(refresh.contains(r#"id="stat-player""#));
        assert!(refresh.contains(r#"hx-swap-oob="true""#));
        assert!(refresh.contains("Ghost"));

        let page = player_select(&players, true, false).into_string();
        assert!(!page.contains("hx-swap-oob"));
    }

    #[test]
    fn test_empty_list_message() {
        let markup = render_players(&[], true).into_string();
        assert!(markup.contains("No players yet."));
    }
}
