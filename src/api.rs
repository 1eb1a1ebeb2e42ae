//! HTTP transport to the keyframe search backend.
//!
//! Response bodies are decoded against explicit schemas: a body missing
//! `results`, `total_page` or `frames` is a decode error, not an empty list.

use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::constants;
use crate::query::{FrameId, SearchPayload};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("server returned {status}: {body}")]
  Status { status: StatusCode, body: String },
  #[error("unexpected response: {0}")]
  Decode(#[from] serde_json::Error),
}

// --- Schemas ---

/// One retrieved keyframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
  pub id: FrameId,
  pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
  pub results: Vec<ResultItem>,
  pub total_page: u32,
}

/// A frame adjacent to the one neighbors were requested for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NeighborFrame {
  #[serde(alias = "imgpath")]
  pub path: String,
  #[serde(default)]
  pub id: Option<FrameId>,
}

#[derive(Debug, Deserialize)]
struct NeighborResponse {
  frames: Vec<NeighborFrame>,
}

#[derive(Debug, Deserialize)]
struct ObjectClasses {
  classes: Vec<String>,
}

/// User relevance judgement on a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
  #[serde(rename = "pos")]
  Positive,
  #[serde(rename = "neg")]
  Negative,
}

#[derive(Debug, Serialize)]
struct Feedback<'a> {
  id: &'a FrameId,
  label: Rating,
}

pub fn decode_search(body: &str) -> Result<SearchResponse, ApiError> {
  Ok(serde_json::from_str(body)?)
}

pub fn decode_neighbors(body: &str) -> Result<Vec<NeighborFrame>, ApiError> {
  Ok(serde_json::from_str::<NeighborResponse>(body)?.frames)
}

// --- Client ---

#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let http = Client::builder().timeout(timeout).build().context("Failed to build HTTP client")?;
    Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn url(&self, route: &str) -> String {
    format!("{}{}", self.base_url, route)
  }

  /// Read a successful body as text; non-2xx bodies become the error detail.
  async fn body_text(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
      return Err(ApiError::Status { status, body });
    }
    Ok(body)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
    let response = self.http.get(url).send().await?;
    let body = Self::body_text(response).await?;
    Ok(serde_json::from_str(&body)?)
  }

  /// Object class names for filter autocompletion. Any failure yields an empty list.
  pub async fn object_classes(&self) -> Vec<String> {
    match self.get_json::<ObjectClasses>(&self.url(&constants().route_objects)).await {
      Ok(list) => list.classes,
      Err(e) => {
        warn!(err = %e, "api: object class list unavailable");
        Vec::new()
      }
    }
  }

  pub async fn search(&self, payload: &SearchPayload) -> Result<SearchResponse, ApiError> {
    debug!(page = payload.page, size = payload.size, "api: POST search");
    let response = self.http.post(self.url(&constants().route_search)).json(payload).send().await?;
    let body = Self::body_text(response).await?;
    decode_search(&body)
  }

  pub async fn neighbors(&self, id: &FrameId, k: usize) -> Result<Vec<NeighborFrame>, ApiError> {
    let url =
      format!("{}?imgid={}&k={}", self.url(&constants().route_neighbors), urlencoding::encode(id.as_str()), k);
    debug!(id = %id, k, "api: GET neighbors");
    let response = self.http.get(url).send().await?;
    let body = Self::body_text(response).await?;
    decode_neighbors(&body)
  }

  pub fn image_url(&self, path: &str) -> String {
    format!("{}?fpath={}", self.url(&constants().route_image), urlencoding::encode(path))
  }

  /// Image-search page for `id`, opened outside the client.
  pub fn image_search_url(&self, id: &FrameId) -> String {
    format!("{}?imgid={}", self.url(&constants().route_image_search), urlencoding::encode(id.as_str()))
  }

  pub async fn fetch_image(&self, path: &str) -> Result<DynamicImage> {
    let url = self.image_url(path);
    let response = self.http.get(&url).send().await.with_context(|| format!("Failed to request {}", url))?;
    if !response.status().is_success() {
      return Err(anyhow!("Image request returned {} for {}", response.status(), path));
    }
    let bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?;
    image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image {}", path))
  }

  pub async fn submit_feedback(&self, id: &FrameId, label: Rating) -> Result<(), ApiError> {
    let response =
      self.http.post(self.url(&constants().route_feedback)).json(&Feedback { id, label }).send().await?;
    Self::body_text(response).await.map(|_| ())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- decode_search ---

  #[test]
  fn search_response_decodes() {
    let body = r#"{"total_page": 4, "results": [{"id": 12, "path": "/data/L01/L01_V001/001.jpg"}]}"#;
    let r = decode_search(body).unwrap();
    assert_eq!(r.total_page, 4);
    assert_eq!(r.results[0].id, FrameId::new("12"));
  }

  #[test]
  fn search_response_missing_fields_fails_closed() {
    assert!(matches!(decode_search(r#"{"results": []}"#), Err(ApiError::Decode(_))));
    assert!(matches!(decode_search(r#"{"total_page": 1}"#), Err(ApiError::Decode(_))));
    assert!(matches!(decode_search("not json"), Err(ApiError::Decode(_))));
  }

  // --- decode_neighbors ---

  #[test]
  fn neighbors_accept_imgpath_and_string_ids() {
    let body = r#"{"frames": [{"id": "41", "imgpath": "a/b/041.jpg"}, {"path": "a/b/042.jpg"}]}"#;
    let frames = decode_neighbors(body).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].path, "a/b/041.jpg");
    assert_eq!(frames[0].id, Some(FrameId::new("41")));
    assert_eq!(frames[1].id, None);
  }

  #[test]
  fn neighbors_missing_frames_fails_closed() {
    assert!(matches!(decode_neighbors("{}"), Err(ApiError::Decode(_))));
    assert_eq!(decode_neighbors(r#"{"frames": []}"#).unwrap(), Vec::new());
  }

  // --- urls ---

  #[test]
  fn image_urls_are_encoded() {
    let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
    assert_eq!(client.image_url("a b/c.jpg"), "http://localhost:8000/keyframe/get_img?fpath=a%20b%2Fc.jpg");
    assert_eq!(client.image_search_url(&FrameId::new("7")), "http://localhost:8000/keyframe/imgsearch?imgid=7");
  }

  #[test]
  fn feedback_body_shape() {
    let id = FrameId::number(9);
    let json = serde_json::to_string(&Feedback { id: &id, label: Rating::Negative }).unwrap();
    assert_eq!(json, r#"{"id":9,"label":"neg"}"#);
    let id = FrameId::new("007");
    let json = serde_json::to_string(&Feedback { id: &id, label: Rating::Positive }).unwrap();
    assert_eq!(json, r#"{"id":"007","label":"pos"}"#);
  }
}
