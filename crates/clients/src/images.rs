//! Pixabay stock-image adapter.
//!
//! The API key is optional: without one the client reports itself as
//! unconfigured and the tool layer answers with guidance instead of an
//! error.

use serde::Deserialize;

use research_core::{Config, ResearchError, Result};

use crate::http;

const API_BASE: &str = "https://pixabay.com/api/";

#[derive(Debug, Clone, serde::Serialize)]
pub struct ImageResult {
    pub tags: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub views: u64,
    pub downloads: u64,
    pub likes: u64,
    pub user: String,
    pub preview_url: String,
    pub large_url: String,
    pub full_hd_url: Option<String>,
}

#[derive(Clone)]
pub struct PixabayClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl PixabayClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http::build_client(config, config.search_timeout),
            api_key: config.pixabay_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search stock images. `image_type` ∈ {all, photo, illustration,
    /// vector}; `orientation` ∈ {all, horizontal, vertical}.
    pub async fn search(
        &self,
        query: &str,
        image_type: &str,
        orientation: &str,
        max_results: usize,
    ) -> Result<Vec<ImageResult>> {
        let Some(key) = &self.api_key else {
            return Err(ResearchError::InputInvalid(
                "Pixabay is not configured (set PIXABAY_API_KEY)".into(),
            ));
        };

        // Pixabay rejects per_page below 3.
        let per_page = max_results.clamp(3, 200);
        let response = self
            .http
            .get(API_BASE)
            .query(&[
                ("key", key.as_str()),
                ("q", query),
                ("image_type", image_type),
                ("orientation", orientation),
                ("per_page", &per_page.to_string()),
                ("safesearch", "true"),
            ])
            .send()
            .await
            .map_err(|e| ResearchError::from_reqwest("Pixabay", e))?
            .error_for_status()
            .map_err(|e| ResearchError::from_reqwest("Pixabay", e))?;

        let doc: PixabayResponse =
            response
                .json()
                .await
                .map_err(|_| ResearchError::UpstreamMalformed {
                    upstream: "Pixabay".into(),
                    excerpt: "search response was not JSON".into(),
                })?;

        Ok(doc
            .hits
            .into_iter()
            .take(max_results)
            .map(|hit| ImageResult {
                tags: hit
                    .tags
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
                width: hit.image_width,
                height: hit.image_height,
                views: hit.views,
                downloads: hit.downloads,
                likes: hit.likes,
                user: hit.user,
                preview_url: hit.preview_url,
                large_url: hit.large_image_url,
                full_hd_url: hit.full_hd_url,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Deserialize)]
struct PixabayHit {
    #[serde(default)]
    tags: String,
    #[serde(rename = "imageWidth", default)]
    image_width: u32,
    #[serde(rename = "imageHeight", default)]
    image_height: u32,
    #[serde(default)]
    views: u64,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    user: String,
    #[serde(rename = "previewURL", default)]
    preview_url: String,
    #[serde(rename = "largeImageURL", default)]
    large_image_url: String,
    #[serde(rename = "fullHDURL")]
    full_hd_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_tags_split_and_trim() {
        let raw = r#"{"hits":[{"tags":"sunset, beach ,  sea","imageWidth":100,
            "imageHeight":50,"views":7,"downloads":3,"likes":1,"user":"ann",
            "previewURL":"p","largeImageURL":"l"}]}"#;
        let doc: PixabayResponse = serde_json::from_str(raw).unwrap();
        let hit = &doc.hits[0];
        let tags: Vec<String> = hit
            .tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(tags, vec!["sunset", "beach", "sea"]);
        assert!(hit.full_hd_url.is_none());
    }
}
