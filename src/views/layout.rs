use crate::models::{Season, Tier};
use maud::{html, Markup, DOCTYPE};
use uuid::Uuid;

/// Auth state for layout
pub struct AuthState {
    pub enabled: bool,
    pub logged_in: bool,
}

impl AuthState {
    pub fn new(enabled: bool, logged_in: bool) -> Self {
        Self { enabled, logged_in }
    }
}

/// Base layout wrapper for all pages
pub fn base(title: &str, current_page: &str, auth: &AuthState, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - Friends League" }
                // PicoCSS
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";
                // htmx
                script src="https://unpkg.com/htmx.org@2.0.4" {}
                style {
                    r#"
                    .nav-buttons { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-bottom: 1rem; }
                    .nav-buttons a { flex: 1; text-align: center; min-width: 120px; }
                    .team-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 1rem; }
                    .player-list { list-style: none; padding: 0; }
                    .player-list li { padding: 0.5rem; border-bottom: 1px solid var(--pico-muted-border-color); display: flex; justify-content: space-between; }
                    .tier { display: inline-block; padding: 0.1rem 0.4rem; border-radius: 4px; font-size: 0.75rem; background: var(--pico-primary-background); color: var(--pico-primary-inverse); }
                    .kd-high { color: var(--pico-ins-color); font-weight: bold; }
                    .kd-low { color: var(--pico-del-color); }
                    .muted { font-size: 0.875rem; color: var(--pico-muted-color); }
                    .checkbox-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 0.5rem; }
                    .header-row { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; margin-bottom: 1rem; }
                    .auth-form { display: flex; gap: 0.5rem; align-items: stretch; margin: 0; }
                    .auth-form input, .auth-form button { margin: 0; padding: 0.5rem 0.75rem; height: auto; }
                    .auth-form input { width: 150px; }
                    .auth-status { display: flex; gap: 0.5rem; align-items: center; }
                    .insight p { line-height: 1.6; }
                    "#
                }
            }
            body {
                main class="container" {
                    div class="header-row" {
                        h1 style="margin: 0;" { "Friends League" }

                        @if auth.enabled {
                            @if auth.logged_in {
                                div class="auth-status" {
                                    span style="color: var(--pico-ins-color);" { "Admin" }
                                    form action="/api/logout" method="post" class="auth-form" {
                                        button type="submit" class="secondary outline" { "Logout" }
                                    }
                                }
                            } @else {
                                form action="/api/login" method="post" class="auth-form" {
                                    input type="password" name="password" placeholder="Admin password" required;
                                    button type="submit" { "Login" }
                                }
                            }
                        }
                    }

                    nav class="nav-buttons" {
                        a href="/" role="button" class=(nav_class(current_page, "ranking")) {
                            "Ranking"
                        }
                        a href="/teams" role="button" class=(nav_class(current_page, "teams")) {
                            "Team Draw"
                        }
                        a href="/admin" role="button" class=(nav_class(current_page, "admin")) {
                            "Admin"
                        }
                    }

                    hr;

                    (content)
                }
            }
        }
    }
}

fn nav_class(current_page: &str, page: &str) -> &'static str {
    if current_page == page {
        "primary"
    } else {
        "secondary outline"
    }
}

/// Season picker; `selected` is highlighted
pub fn season_options(seasons: &[Season], selected: Option<Uuid>) -> Markup {
    html! {
        @for season in seasons {
            option value=(season.id) selected[Some(season.id) == selected] { (season.name) }
        }
    }
}

/// Format K/D with two decimals and a color band
pub fn render_kd(kd: f64) -> Markup {
    let class = if kd >= 1.5 {
        "kd-high"
    } else if kd < 1.0 {
        "kd-low"
    } else {
        ""
    };
    html! {
        span class=(class) { (format!("{:.2}", kd)) }
    }
}

/// Tier badge, or a dash for players below the match threshold
pub fn render_tier(tier: Option<&Tier>) -> Markup {
    html! {
        @match tier {
            Some(tier) => {
                span class="tier" title=(format!("K/D floor {:.2}", tier.min_kd)) { (tier.badge) " " (tier.label) }
            }
            None => {
                span class="muted" { "-" }
            }
        }
    }
}

/// Error paragraph used by htmx fragments
pub fn error(message: &str) -> Markup {
    html! {
        p class="error" { (message) }
    }
}
