use crate::error::InsightError;
use crate::insight::FALLBACK_MESSAGE;
use crate::models::INSIGHT_TOP_N;
use crate::ranking::{compute_ranking, Sort};
use crate::store::snapshot;
use crate::views::layout::error;
use crate::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use axum_extra::extract::Form;
use maud::{html, Markup};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InsightForm {
    season_id: Uuid,
}

/// Generate analyst commentary for a season (htmx endpoint)
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<InsightForm>,
) -> impl IntoResponse {
    let snap = match snapshot(state.store.as_ref()).await {
        Ok(snap) => snap,
        Err(e) => {
            tracing::error!(error = %e, "failed to load ranking for insight");
            return Html(error("Failed to load the ranking").into_string());
        }
    };

    let Some(season) = snap.seasons.iter().find(|s| s.id == form.season_id) else {
        return Html(error("Season not found").into_string());
    };

    let rows = compute_ranking(
        &snap.stats,
        &snap.players,
        season.id,
        Sort::default(),
        &state.weights,
    );
    if rows.is_empty() {
        return Html(error("No stats recorded for this season yet.").into_string());
    }

    let text = match state.insight.generate(&season.name, &rows, INSIGHT_TOP_N).await {
        Ok(text) => text,
        Err(InsightError::MissingApiKey) => {
            return Html(error("Insights are not configured. Set GEMINI_API_KEY to enable them.").into_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, season_id = %season.id, "insight generation failed");
            FALLBACK_MESSAGE.to_string()
        }
    };

    Html(render_insight(&text).into_string())
}

fn render_insight(text: &str) -> Markup {
    html! {
        article {
            @for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                p { (line) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_insight_splits_paragraphs() {
        let markup = render_insight("First take.\n\n  Second take.  \n").into_string();
        assert_eq!(markup, "<article><p>First take.</p><p>Second take.</p></article>");
    }
}
