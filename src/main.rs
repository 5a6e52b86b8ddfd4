mod auth;
mod balance;
mod config;
mod error;
mod insight;
mod models;
mod ranking;
mod store;
mod tier;
mod views;

use axum::{
    routing::{get, post},
    Router,
};
use config::Config;
use insight::InsightClient;
use models::ScoreWeights;
use std::sync::Arc;
use store::{EntityStore, MemoryStore, PgStore};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub insight: InsightClient,
    pub weights: ScoreWeights,
    pub admin_password: Option<String>,
    /// Value of the admin cookie for this process
    pub session_token: String,
    pub secure_cookies: bool,
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(views::ranking::page))
        .route("/teams", get(views::teams::page))
        .route("/admin", get(views::admin::page))
        // API - Auth
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        // API - Players
        .route("/api/players", post(views::admin::create_player))
        .route(
            "/api/players/{id}",
            post(views::admin::rename_player).delete(views::admin::delete_player),
        )
        // API - Seasons
        .route("/api/seasons", post(views::admin::create_season))
        .route(
            "/api/seasons/{id}",
            post(views::admin::rename_season).delete(views::admin::delete_season),
        )
        // API - Stats, teams, insights
        .route("/api/stats", post(views::admin::record_stats))
        .route("/api/teams", post(views::teams::draw_teams))
        .route("/api/insights", post(views::insights::generate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn EntityStore> = match config.database_url.as_deref() {
        Some(url) => Arc::new(PgStore::connect(url, config.store_read_retries).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, data will be lost on restart");
            Arc::new(MemoryStore::default())
        }
    };
    tracing::info!(backend = store.name(), "store ready");

    let insight = InsightClient::new(
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
    )?;
    if !insight.is_configured() {
        tracing::info!("GEMINI_API_KEY not set, insights disabled");
    }
    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set, admin actions are open to everyone");
    }

    let state = Arc::new(AppState {
        store,
        insight,
        weights: ScoreWeights::default(),
        admin_password: config.admin_password,
        session_token: Uuid::new_v4().to_string(),
        secure_cookies: config.secure_cookies,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

#[cfg(test)]
pub fn test_state(password: Option<&str>) -> AppState {
    let defaults = Config::default();
    AppState {
        store: Arc::new(MemoryStore::default()),
        insight: InsightClient::new(defaults.gemini_base_url, defaults.gemini_model, None)
            .expect("client builds"),
        weights: ScoreWeights::default(),
        admin_password: password.map(str::to_string),
        session_token: Uuid::new_v4().to_string(),
        secure_cookies: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ranking_page_renders_without_seasons() {
        let router = build_router(Arc::new(test_state(None)));
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("No seasons yet"));
    }

    #[tokio::test]
    async fn test_mutations_require_login() {
        let router = build_router(Arc::new(test_state(Some("secret"))));
        let response = router
            .oneshot(form_request("/api/players", "nick=Ghost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_open_admin_creates_player() {
        let state = Arc::new(test_state(None));
        let router = build_router(state.clone());
        let response = router
            .oneshot(form_request("/api/players", "nick=%20Ghost%20"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains(r#"id="stat-player""#));
        assert!(body.contains(r#"hx-swap-oob="true""#));

        let players = state.store.list_players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].nick, "Ghost");
    }

    #[tokio::test]
    async fn test_draw_rejects_wrong_selection() {
        let state = Arc::new(test_state(None));
        let season = state.store.add_season("S1").await.unwrap();
        let router = build_router(state);
        let body = format!("season_id={}&team_count=2", season.id);
        let response = router.oneshot(form_request("/api/teams", &body)).await.unwrap();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("select exactly 10 players for 2 teams of 5 (got 0)"));
    }
}
