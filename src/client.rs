use crate::models::{AuditEvent, DashboardSummary, EventsEnvelope};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Most recent events requested per refresh.
pub const EVENT_LIMIT: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Summary,
    Events,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Endpoint::Summary => "summary",
            Endpoint::Events => "events",
        })
    }
}

/// Everything that can go wrong talking to the gateway. The session only
/// ever shows the rendered message.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} failed ({status})")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("{endpoint} returned malformed JSON: {source}")]
    Body {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Body { endpoint, .. } => *endpoint,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cognis-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        match endpoint {
            Endpoint::Summary => format!("{}/dashboard/summary", self.base_url),
            Endpoint::Events => format!("{}/audit/events?limit={EVENT_LIMIT}", self.base_url),
        }
    }

    /// Issue the GET and reject non-2xx statuses. The body is left unread
    /// so both statuses can be checked before either body is decoded.
    pub async fn send(&self, endpoint: Endpoint) -> Result<reqwest::Response, FetchError> {
        let url = self.url(endpoint);
        tracing::debug!(%endpoint, %url, "requesting");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = resp.status();
        tracing::debug!(%endpoint, status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

pub async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: Endpoint,
) -> Result<T, FetchError> {
    resp.json()
        .await
        .map_err(|source| FetchError::Body { endpoint, source })
}

pub async fn decode_summary(resp: reqwest::Response) -> Result<DashboardSummary, FetchError> {
    decode(resp, Endpoint::Summary).await
}

pub async fn decode_events(resp: reqwest::Response) -> Result<Vec<AuditEvent>, FetchError> {
    let envelope: EventsEnvelope = decode(resp, Endpoint::Events).await?;
    Ok(envelope.events)
}
