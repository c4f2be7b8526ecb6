//! HTTP utilities for NetOrca REST API calls

use super::error::{NetOrcaError, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Idle connections kept per host by the pool
const MAX_IDLE_CONNECTIONS: usize = 10;

/// How long an idle pooled connection is kept open
const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and drops non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for NetOrca API calls.
///
/// Only HTTP 200 counts as success. Each call is a single attempt.
#[derive(Clone)]
pub struct NetOrcaHttpClient {
    client: Client,
}

impl NetOrcaHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("netorca-provider/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .pool_idle_timeout(IDLE_CONNECTION_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request and return the raw response body
    pub async fn get(&self, url: &str, authorization: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let request = self.client.get(url);
        self.send(Method::GET, url, authorization, request).await
    }

    /// Make a PATCH request with a JSON body and return the raw response body
    pub async fn patch(&self, url: &str, authorization: &str, body: &Value) -> Result<String> {
        tracing::debug!("PATCH {}", url);

        let request = self.client.patch(url).json(body);
        self.send(Method::PATCH, url, authorization, request).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        authorization: &str,
        request: RequestBuilder,
    ) -> Result<String> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            // Only the sanitized body is logged; the error keeps it verbatim
            tracing::error!(
                "API error: {} {} - {} - {}",
                method,
                url,
                status,
                sanitize_for_log(&body)
            );
            return Err(NetOrcaError::Request {
                status: status.as_u16(),
                body,
                url: url.to_string(),
                method: method.to_string(),
            });
        }

        Ok(body)
    }
}
