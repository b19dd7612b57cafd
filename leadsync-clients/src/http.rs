//! Shared request helper: auth header, JSON bodies, error translation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use leadsync_core::ApiError;

/// Characters of an error body kept in logs and errors.
const ERROR_BODY_LIMIT: usize = 200;

pub(crate) struct HttpService {
    agent: ureq::Agent,
    service: &'static str,
    base_url: String,
    authorization: String,
    rate_limit_pause: Duration,
}

impl HttpService {
    pub(crate) fn new(
        service: &'static str,
        base_url: impl Into<String>,
        authorization: impl Into<String>,
        rate_limit_pause: Duration,
    ) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization: authorization.into(),
            rate_limit_pause,
        }
    }

    pub(crate) fn service(&self) -> &'static str {
        self.service
    }

    /// `<base_url>/<path>`; an empty path addresses the base URL itself.
    pub(crate) fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Send one request and decode the JSON response body as `T`.
    ///
    /// An empty success body decodes as JSON `null`.
    pub(crate) fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                let text = response.into_string().map_err(|e| self.decode_error(e))?;
                let text = if text.trim().is_empty() { "null" } else { text.as_str() };
                serde_json::from_str(text).map_err(|e| self.decode_error(e))
            }
            Err(ureq::Error::Status(429, _)) => {
                tracing::warn!(
                    "{} rate limit hit (429) on {method} {url}; pausing for {:?}",
                    self.service,
                    self.rate_limit_pause
                );
                std::thread::sleep(self.rate_limit_pause);
                Err(ApiError::RateLimited {
                    service: self.service,
                })
            }
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                let message = truncate(&text, ERROR_BODY_LIMIT);
                tracing::error!("{} API error ({status}) on {method} {url}: {message}", self.service);
                Err(ApiError::Status {
                    service: self.service,
                    status,
                    message,
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                tracing::error!("{} connection error on {method} {url}: {transport}", self.service);
                Err(ApiError::Transport {
                    service: self.service,
                    message: transport.to_string(),
                })
            }
        }
    }

    fn decode_error(&self, err: impl std::fmt::Display) -> ApiError {
        ApiError::Decode {
            service: self.service,
            message: err.to_string(),
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(limit).collect();
    format!("{head}…")
}
