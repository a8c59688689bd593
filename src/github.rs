//! Document store backed by the GitHub repository contents API. Each
//! document is a file on a branch; its blob `sha` is the revision token.

use crate::config::GitHubConfig;
use crate::errors::StoreError;
use crate::storage::{DocumentStore, StoredDocument};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "daily-cards";
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    message: String,
    sha: &'a str,
    branch: &'a str,
}

pub struct GitHubContentsStore {
    client: Client,
    config: GitHubConfig,
    timeout: Duration,
}

impl GitHubContentsStore {
    pub fn new(config: GitHubConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            config,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.repo,
            path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("token {}", self.config.token))
            .header("Accept", ACCEPT)
    }

    fn transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout.as_secs())
        } else if err.is_decode() {
            StoreError::Malformed(err.to_string())
        } else {
            StoreError::Transient(err.to_string())
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|err| self.transport_error(err))
    }
}

async fn status_error(path: &str, response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify(status, path, body)
}

fn classify(status: StatusCode, path: &str, body: String) -> StoreError {
    match status.as_u16() {
        401 => StoreError::AuthFailure(body),
        403 => StoreError::PermissionDenied(body),
        404 => StoreError::NotFound(path.to_string()),
        409 | 422 => StoreError::VersionConflict(path.to_string()),
        408 | 429 => StoreError::Transient(format!("HTTP {status}")),
        code if status.is_server_error() => StoreError::Transient(format!("HTTP {code}")),
        code => StoreError::Unexpected { status: code, body },
    }
}

/// The API wraps base64 at 60 columns.
fn decode_content(content: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|err| StoreError::Malformed(format!("content is not base64: {err}")))
}

#[async_trait]
impl DocumentStore for GitHubContentsStore {
    async fn get(&self, path: &str) -> Result<Option<StoredDocument>, StoreError> {
        let request = self
            .client
            .get(self.url(path))
            .query(&[("ref", self.config.branch.as_str())]);
        let response = self.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(path, response).await);
        }

        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|err| self.transport_error(err))?;
        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(StoreError::Malformed(format!(
                    "unsupported content encoding '{encoding}'"
                )));
            }
        }
        let bytes = match body.content.as_deref() {
            Some(content) => decode_content(content)?,
            None => Vec::new(),
        };
        debug!(path, sha = %body.sha, size = bytes.len(), "github get");

        Ok(Some(StoredDocument {
            bytes,
            version: body.sha,
        }))
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        expected_version: Option<&str>,
    ) -> Result<(), StoreError> {
        let payload = PutRequest {
            message: format!("Update {path}"),
            content: STANDARD.encode(bytes),
            branch: &self.config.branch,
            sha: expected_version,
        };
        let response = self.send(self.client.put(self.url(path)).json(&payload)).await?;

        if !response.status().is_success() {
            return Err(status_error(path, response).await);
        }
        debug!(path, status = %response.status(), "github put");
        Ok(())
    }

    async fn delete(&self, path: &str, version: &str) -> Result<(), StoreError> {
        let payload = DeleteRequest {
            message: format!("Delete {path}"),
            sha: version,
            branch: &self.config.branch,
        };
        let response = self
            .send(self.client.delete(self.url(path)).json(&payload))
            .await?;

        if !response.status().is_success() {
            return Err(status_error(path, response).await);
        }
        debug!(path, "github delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_statuses() {
        for code in [409, 422] {
            let status = StatusCode::from_u16(code).unwrap();
            let err = classify(status, "progress/a.json", String::new());
            assert!(matches!(err, StoreError::VersionConflict(ref p) if p == "progress/a.json"));
        }
    }

    #[test]
    fn auth_statuses_are_not_retryable() {
        let unauthorized = classify(StatusCode::UNAUTHORIZED, "p", "Bad credentials".into());
        assert!(matches!(unauthorized, StoreError::AuthFailure(_)));
        let forbidden = classify(StatusCode::FORBIDDEN, "p", String::new());
        assert!(matches!(forbidden, StoreError::PermissionDenied(_)));
        assert!(!forbidden.is_retryable());
    }

    #[test]
    fn server_errors_are_transient() {
        assert!(classify(StatusCode::BAD_GATEWAY, "p", String::new()).is_retryable());
        assert!(classify(StatusCode::TOO_MANY_REQUESTS, "p", String::new()).is_retryable());
        let other = classify(StatusCode::IM_A_TEAPOT, "p", "short and stout".into());
        assert!(matches!(other, StoreError::Unexpected { status: 418, .. }));
    }

    #[test]
    fn decodes_wrapped_base64() {
        let wrapped = "eyJjb21w\nbGV0ZWQi\nOiBbXX0=\n";
        assert_eq!(decode_content(wrapped).unwrap(), br#"{"completed": []}"#);
        assert!(matches!(
            decode_content("not base64!"),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn url_joins_repo_and_path() {
        let store = GitHubContentsStore::new(
            GitHubConfig {
                api_base: "https://api.github.com/".into(),
                token: "t".into(),
                repo: "owner/data".into(),
                branch: "main".into(),
            },
            Duration::from_secs(20),
        )
        .unwrap();
        assert_eq!(
            store.url("progress/u1.json"),
            "https://api.github.com/repos/owner/data/contents/progress/u1.json"
        );
    }
}
