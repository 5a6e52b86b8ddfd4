use crate::auth::is_authenticated;
use crate::models::{RankingRow, MIN_MATCHES_FOR_TIER};
use crate::ranking::{compute_ranking, tier_ladder, Sort, SortDir, SortKey};
use crate::store::snapshot;
use crate::views::layout::{base, render_kd, render_tier, season_options, AuthState};
use crate::views::selected_season;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;
use maud::{html, Markup};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    season: Option<Uuid>,
    sort: Option<SortKey>,
    dir: Option<SortDir>,
}

/// Ranking page - season table and tier ladder
pub async fn page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<RankingQuery>,
) -> impl IntoResponse {
    let auth = AuthState::new(
        state.admin_password.is_some(),
        is_authenticated(&jar, &state),
    );

    let snap = match snapshot(state.store.as_ref()).await {
        Ok(snap) => snap,
        Err(e) => {
            tracing::error!(error = %e, "failed to load ranking data");
            let content = html! { p class="error" { "Could not reach the league database. Try again shortly." } };
            return Html(base("Ranking", "ranking", &auth, content).into_string());
        }
    };

    let Some(season) = selected_season(&snap.seasons, query.season) else {
        let content = html! {
            h2 { "Ranking" }
            p { "No seasons yet. Create one on the Admin page." }
        };
        return Html(base("Ranking", "ranking", &auth, content).into_string());
    };

    let sort = Sort::new(query.sort.unwrap_or_default(), query.dir.unwrap_or_default());
    let rows = compute_ranking(&snap.stats, &snap.players, season.id, sort, &state.weights);
    let ladder = tier_ladder(&rows);

    let content = html! {
        h2 { "Ranking" }

        form method="get" action="/" {
            div class="grid" {
                select name="season" onchange="this.form.submit()" {
                    (season_options(&snap.seasons, Some(season.id)))
                }
                p class="muted" { (rows.len()) " active players this season" }
            }
        }

        (render_table(&rows, season.id, sort))

        h3 { "Tiers" }
        p class="muted" { "Players need " (MIN_MATCHES_FOR_TIER) " matches to be ranked into a tier." }
        (render_ladder(&ladder))

        hr;

        h3 { "Analyst commentary" }
        form hx-post="/api/insights" hx-target="#insight" hx-indicator="#insight-spinner" {
            input type="hidden" name="season_id" value=(season.id);
            button type="submit" disabled[rows.is_empty()] {
                "Generate insight"
                span id="insight-spinner" class="htmx-indicator spinner" {}
            }
        }
        div id="insight" class="insight" {}
    };

    Html(base("Ranking", "ranking", &auth, content).into_string())
}

/// Link for a column header: clicking the active column flips direction,
/// any other column starts descending (nick starts ascending)
fn sort_link(season_id: Uuid, key: SortKey, current: Sort) -> String {
    let dir = if key == current.key {
        current.dir.toggle()
    } else if key == SortKey::Nick {
        SortDir::Asc
    } else {
        SortDir::Desc
    };
    format!("/?season={}&sort={}&dir={}", season_id, key, dir.as_str())
}

fn sort_marker(key: SortKey, current: Sort) -> &'static str {
    match (key == current.key, current.dir) {
        (false, _) => "",
        (true, SortDir::Asc) => " ▲",
        (true, SortDir::Desc) => " ▼",
    }
}

fn render_table(rows: &[RankingRow], season_id: Uuid, sort: Sort) -> Markup {
    if rows.is_empty() {
        return html! {
            p { "No stats recorded for this season yet." }
        };
    }

    html! {
        div class="table-container" {
            table {
                thead {
                    tr {
                        th { "#" }
                        @for key in SortKey::ALL {
                            th {
                                a href=(sort_link(season_id, *key, sort)) {
                                    (key.title()) (sort_marker(*key, sort))
                                }
                            }
                        }
                    }
                }
                tbody {
                    @for (i, row) in rows.iter().enumerate() {
                        tr {
                            td { (i + 1) }
                            td { strong { (row.nick) } }
                            td { (row.matches) }
                            td { (row.kills) }
                            td { (row.deaths) }
                            td { (row.assists) }
                            td { (row.damage) }
                            td { (format!("{:.0}", row.damage_per_match)) }
                            td { (render_kd(row.kd)) }
                        }
                    }
                }
            }
        }
    }
}

fn render_ladder(ladder: &[RankingRow]) -> Markup {
    if ladder.is_empty() {
        return html! {
            p class="muted" { "Nobody has played enough matches yet." }
        };
    }

    html! {
        ul class="player-list" {
            @for row in ladder {
                li {
                    span { strong { (row.nick) } " " (render_tier(row.tier)) }
                    span class="muted" {
                        "score " (format!("{:.0}", row.score.unwrap_or_default()))
                        " · K/D " (format!("{:.2}", row.kd))
                    }
                }
            }
        }
    }
}
