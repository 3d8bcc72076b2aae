//! Naver blog search client.

use crate::{Error, Result};
use serde::Deserialize;
use tracing::info;

const SEARCH_URL: &str = "https://openapi.naver.com/v1/search/blog";

/// One blog post from the search results, with markup stripped.
#[derive(Debug, Clone)]
pub struct BlogPost {
    pub title: String,
    pub description: String,
    pub link: String,
    pub blogger_name: String,
    pub post_date: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    bloggername: String,
    #[serde(default)]
    postdate: String,
}

pub struct NaverSearchClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl NaverSearchClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Search blog posts for a keyword, by similarity, up to `display`
    /// results.
    pub async fn search_blogs(&self, keyword: &str, display: u32) -> Result<Vec<BlogPost>> {
        let response = self
            .http
            .get(SEARCH_URL)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[
                ("query", keyword),
                ("display", &display.to_string()),
                ("sort", "sim"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "naver search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        let posts: Vec<BlogPost> = body.items.into_iter().map(BlogPost::from).collect();
        info!("naver search: {} posts for '{}'", posts.len(), keyword);
        Ok(posts)
    }
}

impl From<SearchItem> for BlogPost {
    fn from(item: SearchItem) -> Self {
        Self {
            title: strip_bold(&item.title),
            description: strip_bold(&item.description),
            link: item.link,
            blogger_name: item.bloggername,
            post_date: item.postdate,
        }
    }
}

/// The search API highlights matches with `<b>` tags; drop them.
fn strip_bold(s: &str) -> String {
    s.replace("<b>", "").replace("</b>", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_highlight_tags() {
        assert_eq!(strip_bold("<b>여름</b> 휴가 <b>꿀팁</b>"), "여름 휴가 꿀팁");
        assert_eq!(strip_bold("no tags"), "no tags");
    }

    #[test]
    fn deserializes_search_response() {
        let json = r#"{
            "items": [
                {"title": "<b>t</b>", "description": "d", "link": "https://x",
                 "bloggername": "b", "postdate": "20240601"},
                {"title": "partial"}
            ]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 2);
        let post = BlogPost::from(resp.items.into_iter().next().unwrap());
        assert_eq!(post.title, "t");
        assert_eq!(post.post_date, "20240601");
    }

    #[test]
    fn empty_response_yields_no_posts() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.items.is_empty());
    }
}
