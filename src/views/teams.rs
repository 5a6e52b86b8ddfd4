use crate::auth::is_authenticated;
use crate::balance::{balance_teams, kd_spread};
use crate::models::{TeamAssignment, MAX_TEAMS, TEAM_SIZE};
use crate::ranking::player_pool;
use crate::store::snapshot;
use crate::views::layout::{base, error, render_kd, season_options, AuthState};
use crate::views::selected_season;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
};
use axum_extra::extract::{cookie::CookieJar, Form};
use maud::{html, Markup};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_TEAM_COUNT: usize = 2;

#[derive(Debug, Deserialize)]
pub struct TeamsQuery {
    season: Option<Uuid>,
}

/// Team draw page - player check-in and balanced team generation
pub async fn page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<TeamsQuery>,
) -> impl IntoResponse {
    let auth = AuthState::new(
        state.admin_password.is_some(),
        is_authenticated(&jar, &state),
    );

    let snap = match snapshot(state.store.as_ref()).await {
        Ok(snap) => snap,
        Err(e) => {
            tracing::error!(error = %e, "failed to load players for team draw");
            let content = error("Could not reach the league database. Try again shortly.");
            return Html(base("Team Draw", "teams", &auth, content).into_string());
        }
    };

    let Some(season) = selected_season(&snap.seasons, query.season) else {
        let content = html! {
            h2 { "Team Draw" }
            p { "No seasons yet. Teams are balanced on a season's K/D, so create one first." }
        };
        return Html(base("Team Draw", "teams", &auth, content).into_string());
    };

    let pool = player_pool(&snap.stats, &snap.players, season.id, &state.weights);

    let content = html! {
        h2 { "Team Draw" }
        p class="muted" { "Teams of " (TEAM_SIZE) " balanced by K/D." }

        form method="get" action="/teams" {
            label {
                "Season used for K/D"
                select name="season" onchange="this.form.submit()" {
                    (season_options(&snap.seasons, Some(season.id)))
                }
            }
        }

        @if pool.is_empty() {
            p { "No players yet. Add players on the Admin page." }
        } @else {
            form id="draw-form" hx-post="/api/teams" hx-target="#teams-display" {
                input type="hidden" name="season_id" value=(season.id);
                label {
                    "Number of teams"
                    select name="team_count" {
                        @for n in 2..=MAX_TEAMS {
                            option value=(n) selected[n == DEFAULT_TEAM_COUNT] {
                                (n) " teams (" (n * TEAM_SIZE) " players)"
                            }
                        }
                    }
                }
                div class="checkbox-grid" {
                    @for row in &pool {
                        label {
                            input type="checkbox" name="player_ids" value=(row.player_id);
                            (row.nick) " " span class="muted" { "(" (format!("{:.2}", row.kd)) ")" }
                        }
                    }
                }
                button type="submit" { "Draw teams" }
            }
        }

        div id="teams-display" {}
    };

    Html(base("Team Draw", "teams", &auth, content).into_string())
}

/// Form data for team generation
#[derive(Debug, Deserialize)]
pub struct DrawForm {
    season_id: Uuid,
    team_count: usize,
    #[serde(default)]
    player_ids: Vec<Uuid>,
}

/// Balance the checked-in players (htmx endpoint)
pub async fn draw_teams(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DrawForm>,
) -> impl IntoResponse {
    let snap = match snapshot(state.store.as_ref()).await {
        Ok(snap) => snap,
        Err(e) => {
            tracing::error!(error = %e, "failed to load players for team draw");
            return Html(error("Failed to load players").into_string());
        }
    };

    let pool = player_pool(&snap.stats, &snap.players, form.season_id, &state.weights);

    match balance_teams(&pool, &form.player_ids, form.team_count) {
        Ok(teams) => Html(render_teams(&teams).into_string()),
        Err(e) => {
            tracing::info!(error = %e, "team draw rejected");
            Html(error(&e.to_string()).into_string())
        }
    }
}

fn render_teams(teams: &[TeamAssignment]) -> Markup {
    html! {
        p class="muted" { "Average K/D spread: " (format!("{:.2}", kd_spread(teams))) }
        div class="team-grid" {
            @for team in teams {
                article {
                    header {
                        strong { "Team " (team.name) }
                        " · avg K/D " (render_kd(team.avg_kd))
                    }
                    ul class="player-list" {
                        @for member in &team.members {
                            li {
                                span { (member.nick) }
                                span { (render_kd(member.kd)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
