//! reqwest implementation of [`SiteApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    CommentPage, Cursor, MeResponse, NewComment, VoteKind, VoteRequest, VoteTally,
};
use super::{ApiError, SiteApi};
use crate::config::SiteConfig;

/// HTTP client for the site backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Client for `base_url` (e.g. `https://example.com`) with a per-request
    /// timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base.clone(), config.request_timeout)
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_owned()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Fail unless the status is one of `accepted`.
fn check(resp: &Response, endpoint: &str, accepted: &[StatusCode]) -> Result<(), ApiError> {
    let status = resp.status();
    debug!(endpoint, status = status.as_u16(), "response");
    if accepted.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            endpoint: endpoint.to_owned(),
        })
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait(?Send)]
impl SiteApi for HttpApi {
    async fn current_user(&self) -> Result<MeResponse, ApiError> {
        let resp = self.client.get(self.url("/api/users/me")).send().await?;
        // Logged-out users get 401 with the login URI in the body.
        check(&resp, "/api/users/me", &[StatusCode::OK, StatusCode::UNAUTHORIZED])?;
        decode(resp).await
    }

    async fn logout(&self, logout_uri: &str) -> Result<(), ApiError> {
        let resp = self.client.get(self.url(logout_uri)).send().await?;
        if resp.status().is_success() || resp.status().is_redirection() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: resp.status().as_u16(),
                endpoint: logout_uri.to_owned(),
            })
        }
    }

    async fn comments(
        &self,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<CommentPage, ApiError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.0.clone()));
        }
        let resp = self
            .client
            .get(self.url("/api/comments"))
            .query(&query)
            .send()
            .await?;
        check(&resp, "/api/comments", &[StatusCode::OK])?;
        decode(resp).await
    }

    async fn post_comment(&self, comment: &NewComment) -> Result<(), ApiError> {
        let form = multipart::Form::new()
            .text("name", comment.name.clone())
            .text("content", comment.content.clone());
        let resp = self
            .client
            .post(self.url("/api/comments"))
            .multipart(form)
            .send()
            .await?;
        check(&resp, "/api/comments", &[StatusCode::OK])
    }

    async fn vote(&self, id: i64, kind: VoteKind) -> Result<(), ApiError> {
        let endpoint = format!("/api/vote/{id}");
        let resp = self
            .client
            .post(self.url(&endpoint))
            .json(&VoteRequest { kind })
            .send()
            .await?;
        check(&resp, &endpoint, &[StatusCode::OK])
    }

    async fn tally(&self, id: i64) -> Result<VoteTally, ApiError> {
        let endpoint = format!("/api/vote/{id}");
        let resp = self.client.get(self.url(&endpoint)).send().await?;
        check(&resp, &endpoint, &[StatusCode::OK])?;
        decode(resp).await
    }
}
