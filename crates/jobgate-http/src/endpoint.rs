//! Base URLs and response decoding shared by the adapters.

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use jobgate_core::domain::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("invalid {name} url '{url}': {reason}")]
    InvalidBaseUrl {
        name: &'static str,
        url: String,
        reason: String,
    },

    #[error("cannot build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A base URL to which a resource suffix is appended verbatim
/// (`http://task-manager/tasks/` + `2024-09-13T09:30:00Z`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    pub fn parse(name: &'static str, base: &str) -> Result<Self, SetupError> {
        Url::parse(base).map_err(|e| SetupError::InvalidBaseUrl {
            name,
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            base: base.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub(crate) fn join(&self, suffix: &str) -> Result<Url, UpstreamError> {
        let raw = format!("{}{}", self.base, suffix);
        Url::parse(&raw).map_err(|e| UpstreamError::InvalidUrl(format!("{raw}: {e}")))
    }
}

pub(crate) fn transport(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(e.to_string())
}

/// Turn a raw response into a value: 2xx with a decodable, non-empty body.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: Result<Response, reqwest::Error>,
) -> Result<T, UpstreamError> {
    let response = response.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::UnexpectedStatus(status.as_u16()));
    }
    let body = response.bytes().await.map_err(transport)?;
    if body.is_empty() {
        return Err(UpstreamError::EmptyBody);
    }
    serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
}
