//! Gemini text-generation client: SEO title suggestions from search
//! results, and full article bodies from a title plus a user prompt.

use crate::api::BlogPost;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Suggest `count` blog titles from the top search results.
    pub async fn generate_titles(&self, posts: &[BlogPost], count: usize) -> Result<Vec<String>> {
        let mut summary = String::new();
        for (i, post) in posts.iter().take(10).enumerate() {
            summary.push_str(&format!("{}. {}\n{}\n\n", i + 1, post.title, post.description));
        }

        let prompt = format!(
            "다음은 특정 키워드로 검색한 상위 블로그 글들의 제목과 내용입니다:\n\n{}\n\
             위 내용들을 분석하여 SEO에 최적화되고 클릭률이 높은 블로그 제목을 {}개 생성해주세요.\n\
             제목만 번호와 함께 나열해주세요.",
            summary, count
        );

        let text = self.generate(&prompt).await?;
        let titles = parse_title_lines(&text);
        info!("generated {} title candidates", titles.len());
        Ok(titles)
    }

    /// Generate a full article body for a title.
    pub async fn generate_article(&self, title: &str, prompt: &str) -> Result<String> {
        let full_prompt = format!(
            "제목: {}\n\n{}\n\n위 제목으로 블로그 글을 작성해주세요.",
            title, prompt
        );
        let body = self.generate(&full_prompt).await?;
        info!("generated article body for '{}'", title);
        Ok(body)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = GENERATE_URL.replace("{model}", &self.model);
        let response = self
            .http
            .post(&url)
            .header("X-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "gemini returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        extract_text(body).ok_or_else(|| Error::Api("gemini returned no candidates".into()))
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    let text = response
        .candidates
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .next()?
        .text;
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Pull titles out of a numbered or dashed list, dropping the markers.
fn parse_title_lines(text: &str) -> Vec<String> {
    let mut titles = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let starts_numbered = line.chars().next().is_some_and(|c| c.is_ascii_digit());
        if !starts_numbered && !line.starts_with('-') {
            continue;
        }
        let title = line
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or(line)
            .trim_start_matches('-')
            .trim();
        if !title.is_empty() {
            titles.push(title.to_string());
        }
    }
    titles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_title_list() {
        let text = "추천 제목입니다:\n\n1. 여름 휴가 준비물 총정리\n2. 제주 3박 4일 코스\n\n이상입니다.";
        let titles = parse_title_lines(text);
        assert_eq!(titles, vec!["여름 휴가 준비물 총정리", "제주 3박 4일 코스"]);
    }

    #[test]
    fn parses_dashed_title_list() {
        let titles = parse_title_lines("- 첫 번째\n- 두 번째");
        assert_eq!(titles, vec!["첫 번째", "두 번째"]);
    }

    #[test]
    fn extracts_candidate_text() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "generated body"}]}}
            ]
        }"#;
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(resp).unwrap(), "generated body");
    }

    #[test]
    fn empty_candidates_yield_none() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(extract_text(resp).is_none());
    }
}
