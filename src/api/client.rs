use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

/// The remote tier: one request per logical operation.
///
/// Any transport failure or non-success status is an `Err`; callers do not
/// distinguish between them.
#[async_trait]
pub trait RemoteSource: Send + Sync {
  async fn get(&self, path: &str) -> Result<Value>;

  async fn post(&self, path: &str, body: &Value) -> Result<Value>;

  async fn put(&self, path: &str, body: &Value) -> Result<Value>;

  async fn delete(&self, path: &str) -> Result<Value>;

  /// Whether the server answers on its root page.
  async fn check_health(&self) -> bool;
}

/// HTTP client for the booking site's REST API
#[derive(Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: String,
  root_url: Url,
}

impl ApiClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    let root_url = root_url(&config.base_url)?;

    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      root_url,
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let url = format!("{}{}", self.base_url, path);
    debug!(%method, %url, "Sending request");
    self.client.request(method, url)
  }

  async fn send(&self, request: RequestBuilder, path: &str) -> Result<Value> {
    let response = request
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", path, e))?
      .error_for_status()
      .map_err(|e| eyre!("Server rejected {}: {}", path, e))?;

    response
      .json::<Value>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", path, e))
  }
}

#[async_trait]
impl RemoteSource for ApiClient {
  async fn get(&self, path: &str) -> Result<Value> {
    self.send(self.request(Method::GET, path), path).await
  }

  async fn post(&self, path: &str, body: &Value) -> Result<Value> {
    self
      .send(self.request(Method::POST, path).json(body), path)
      .await
  }

  async fn put(&self, path: &str, body: &Value) -> Result<Value> {
    self
      .send(self.request(Method::PUT, path).json(body), path)
      .await
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    self.send(self.request(Method::DELETE, path), path).await
  }

  async fn check_health(&self) -> bool {
    match self.client.get(self.root_url.clone()).send().await {
      Ok(response) => response.status().is_success(),
      Err(e) => {
        debug!(error = %e, "Health check failed");
        false
      }
    }
  }
}

/// Server root for an API base URL: `http://host:5000/api` -> `http://host:5000/`.
fn root_url(base_url: &str) -> Result<Url> {
  let mut url =
    Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL '{}': {}", base_url, e))?;

  let trimmed = url.path().trim_end_matches('/');
  let root = trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string();
  url.set_path(&format!("{}/", root));
  Ok(url)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::Accessor;
  use crate::mirror::{LocalMirror, Origin, SqliteStorage};
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Serve `status_line` with a small JSON body to every connection.
  /// Returns the API base URL.
  async fn serve_status(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      while let Ok((mut socket, _)) = listener.accept().await {
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let body = r#"{"siteTitle":"The King Play Elite"}"#;
        let response = format!(
          "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
          status_line,
          body.len(),
          body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
      }
    });

    format!("http://{}/api", addr)
  }

  #[test]
  fn test_root_url_strips_api_suffix() {
    let url = root_url("http://localhost:5000/api").unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/");

    let url = root_url("https://example.com/site/api/").unwrap();
    assert_eq!(url.as_str(), "https://example.com/site/");
  }

  #[test]
  fn test_root_url_without_api_suffix() {
    let url = root_url("http://localhost:5000").unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/");
  }

  #[test]
  fn test_invalid_base_url() {
    assert!(root_url("not a url").is_err());
  }

  #[test]
  fn test_base_url_trailing_slash_trimmed() {
    let config = ApiConfig {
      base_url: "http://localhost:5000/api/".to_string(),
      timeout_secs: Some(2),
    };
    let client = ApiClient::new(&config).unwrap();
    assert_eq!(client.base_url(), "http://localhost:5000/api");
  }

  #[tokio::test]
  async fn test_server_error_status_is_an_error() {
    let config = ApiConfig {
      base_url: serve_status("HTTP/1.1 500 Internal Server Error").await,
      timeout_secs: Some(5),
    };
    let client = ApiClient::new(&config).unwrap();

    assert!(client.get("/plans").await.is_err());
    assert!(client.delete("/plans/basic").await.is_err());
    assert!(!client.check_health().await);

    let mirror = LocalMirror::new(SqliteStorage::open_in_memory().unwrap());
    let accessor = Accessor::new(client, mirror);
    let plans = accessor.get("/plans", None).await;
    assert_eq!(plans.origin, Origin::Seed);
    assert_eq!(plans.data.unwrap().as_array().unwrap().len(), 3);
    assert!(accessor.mirror().load("/plans").is_none());
  }

  #[tokio::test]
  async fn test_success_status_is_parsed() {
    let config = ApiConfig {
      base_url: serve_status("HTTP/1.1 200 OK").await,
      timeout_secs: Some(5),
    };
    let client = ApiClient::new(&config).unwrap();
    let body = client.get("/settings").await.unwrap();
    assert_eq!(body["siteTitle"], "The King Play Elite");
  }

  #[tokio::test]
  async fn test_unreachable_server_is_an_error() {
    // Port 9 (discard) on localhost is not expected to run an HTTP server
    let config = ApiConfig {
      base_url: "http://127.0.0.1:9/api".to_string(),
      timeout_secs: Some(2),
    };
    let client = ApiClient::new(&config).unwrap();
    assert!(client.get("/plans").await.is_err());
    assert!(!client.check_health().await);
  }
}
