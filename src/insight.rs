use crate::error::InsightError;
use crate::models::RankingRow;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const FALLBACK_MESSAGE: &str = "The analyst is taking the day off. Try again later.";
const TEMPERATURE: f32 = 0.8;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn summary_line(row: &RankingRow) -> String {
    format!(
        "{}: KD {:.2}, Damage {}, Assists {}",
        row.nick, row.kd, row.damage, row.assists
    )
}

/// Plain-text digest of the top `top_n` rows, one line per player.
/// K/D always carries two decimals so the prompt is stable for equal input.
/// When rows are cut off, the real last place is appended on its own line.
pub fn ranking_summary(rows: &[RankingRow], top_n: usize) -> String {
    let top = rows.iter().take(top_n).map(summary_line).join("\n");
    match rows.last() {
        Some(last) if rows.len() > top_n => format!("{top}\n...\nLast place: {}", summary_line(last)),
        _ => top,
    }
}

pub fn build_prompt(season_name: &str, summary: &str) -> String {
    format!(
        "As a professional e-sports analyst, write a short analysis of the {season_name} ranking.\n\
         Name the MVP (based on K/D and damage) and give a funny piece of advice to the last-place player.\n\
         Keep it brief (150 words at most).\n\
         \n\
         Ranking data:\n\
         {summary}"
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Client for the hosted text generation API
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl InsightClient {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Result<Self, InsightError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Ask the model for commentary on a season's ranking
    pub async fn generate(&self, season_name: &str, rows: &[RankingRow], top_n: usize) -> Result<String, InsightError> {
        let api_key = self.api_key.as_deref().ok_or(InsightError::MissingApiKey)?;
        let prompt = build_prompt(season_name, &ranking_summary(rows, top_n));

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        tracing::debug!(model = %self.model, players = rows.len().min(top_n), "requesting ranking insight");

        let response: GenerateResponse = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_text().ok_or(InsightError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_row(nick: &str, kd: f64, damage: i64, assists: i64) -> RankingRow {
        RankingRow {
            player_id: Uuid::new_v4(),
            season_id: Uuid::nil(),
            nick: nick.to_string(),
            matches: 3,
            kills: 0,
            deaths: 0,
            assists,
            damage,
            kd,
            damage_per_match: 0.0,
            score: None,
            tier: None,
        }
    }

    #[test]
    fn test_summary_format() {
        let rows = vec![
            make_row("Ghost", 1.875, 25000, 45),
            make_row("Viper", 2.0 / 3.0, 18000, 80),
        ];
        assert_eq!(
            ranking_summary(&rows, 10),
            "Ghost: KD 1.88, Damage 25000, Assists 45\nViper: KD 0.67, Damage 18000, Assists 80"
        );
    }

    #[test]
    fn test_summary_takes_top_n() {
        let rows = vec![
            make_row("A", 3.0, 1, 1),
            make_row("B", 2.0, 1, 1),
            make_row("C", 1.0, 1, 1),
        ];
        assert_eq!(ranking_summary(&rows, 3).lines().count(), 3);
        assert_eq!(ranking_summary(&[], 5), "");
    }

    #[test]
    fn test_summary_keeps_real_last_place() {
        let rows: Vec<_> = (0..12)
            .map(|i| make_row(&format!("P{i}"), 3.0 - i as f64 * 0.1, 1, 1))
            .collect();
        let summary = ranking_summary(&rows, 10);

        assert_eq!(summary.lines().count(), 12);
        assert!(!summary.contains("P10:"));
        assert!(summary.ends_with("...\nLast place: P11: KD 1.90, Damage 1, Assists 1"));
    }

    #[test]
    fn test_prompt_contains_season_and_data() {
        let prompt = build_prompt("Season 1", "A: KD 2.00, Damage 10, Assists 1");
        assert!(prompt.contains("Season 1 ranking"));
        assert!(prompt.ends_with("Ranking data:\nA: KD 2.00, Damage 10, Assists 1"));
    }

    #[test]
    fn test_parse_response_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Ghost is the MVP."},{"text":" GG."}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Ghost is the MVP. GG."));
    }

    #[test]
    fn test_parse_empty_response() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(response.into_text().is_none());

        let response: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[tokio::test]
    async fn test_generate_without_key() {
        let client = InsightClient::new(DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string(), None).unwrap();
        assert!(!client.is_configured());
        let result = client.generate("S1", &[], 10).await;
        assert!(matches!(result, Err(InsightError::MissingApiKey)));
    }
}
