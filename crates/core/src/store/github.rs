use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::document;
use super::traits::{HoldingsStore, VersionToken};
use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

const API_BASE: &str = "https://api.github.com";
const DEFAULT_COMMIT_MESSAGE: &str = "Update holdings";

/// Holdings store backed by a single JSON file in a GitHub repository,
/// via the contents API.
///
/// - Read: `GET /repos/{repo}/contents/{path}` → base64 body + blob `sha`.
/// - Write: `PUT` with the new body and the `sha` from the last read. GitHub
///   rejects the write with 409 when the blob changed upstream; that is the
///   optimistic-concurrency guard, and the blob `sha` is our version token.
///
/// Requires a bearer token with contents write access to the repository.
pub struct GitHubStore {
    client: Client,
    repo: String,
    path: String,
    token: String,
    commit_message: String,
}

impl GitHubStore {
    /// Store for `{owner}/{repo}` and a file path inside it.
    pub fn new(
        repo: impl Into<String>,
        path: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("stock-sentry/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            repo: repo.into(),
            path: path.into(),
            token: token.into(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    /// Store configured from the environment variables the hosted deployment
    /// injects: `GITHUB_TOKEN`, `REPO_NAME` (owner/repo), `FILE_PATH`.
    pub fn from_env() -> Result<Self, CoreError> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| CoreError::ValidationError("GITHUB_TOKEN is not set".into()))?;
        let repo = std::env::var("REPO_NAME")
            .map_err(|_| CoreError::ValidationError("REPO_NAME is not set".into()))?;
        let path = std::env::var("FILE_PATH")
            .map_err(|_| CoreError::ValidationError("FILE_PATH is not set".into()))?;
        Ok(Self::new(repo, path, token))
    }

    /// Override the commit message used on writes.
    #[must_use]
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    fn contents_url(&self) -> String {
        format!("{API_BASE}/repos/{}/contents/{}", self.repo, self.path)
    }

    fn api_error(&self, status: StatusCode, detail: &str) -> CoreError {
        CoreError::Api {
            provider: "GitHub".into(),
            message: format!("{detail} (HTTP {status})"),
        }
    }
}

// ── GitHub contents API response types ──────────────────────────────

#[derive(Deserialize)]
struct ContentsResponse {
    /// File body, base64 with embedded line breaks
    content: String,
    /// Blob SHA of the current revision
    sha: String,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
}

#[async_trait]
impl HoldingsStore for GitHubStore {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn load(&self) -> Result<(Portfolio, VersionToken), CoreError> {
        let resp = self
            .client
            .get(self.contents_url())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(CoreError::NotFound(format!(
                    "{}/{}",
                    self.repo, self.path
                )));
            }
            status => {
                return Err(self.api_error(status, "Failed to read holdings document"));
            }
        }

        let contents: ContentsResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: "GitHub".into(),
            message: format!("Failed to parse contents response: {e}"),
        })?;

        // GitHub wraps base64 at 60 columns; strip the line breaks first
        let packed: String = contents
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let raw = base64::engine::general_purpose::STANDARD
            .decode(packed)
            .map_err(|e| CoreError::InvalidDocument(format!("Invalid base64 content: {e}")))?;
        let body = String::from_utf8(raw)
            .map_err(|e| CoreError::InvalidDocument(format!("Document is not UTF-8: {e}")))?;

        let portfolio = document::decode(&body)?;
        Ok((portfolio, VersionToken::new(contents.sha)))
    }

    async fn save(
        &self,
        portfolio: &Portfolio,
        token: &VersionToken,
    ) -> Result<VersionToken, CoreError> {
        let body = document::encode(portfolio)?;
        let payload = json!({
            "message": self.commit_message,
            "content": base64::engine::general_purpose::STANDARD.encode(body),
            "sha": token.as_str(),
        });

        let resp = self
            .client
            .put(self.contents_url())
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .json(&payload)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {}
            StatusCode::CONFLICT => {
                return Err(CoreError::Conflict(format!(
                    "version token {token} is stale for {}/{}",
                    self.repo, self.path
                )));
            }
            StatusCode::NOT_FOUND => {
                return Err(CoreError::NotFound(format!(
                    "{}/{}",
                    self.repo, self.path
                )));
            }
            status => {
                return Err(self.api_error(status, "Failed to write holdings document"));
            }
        }

        let put: PutResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: "GitHub".into(),
            message: format!("Failed to parse write response: {e}"),
        })?;

        Ok(VersionToken::new(put.content.sha))
    }
}
