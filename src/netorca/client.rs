//! NetOrca Client
//!
//! Main client for interacting with the NetOrca API, combining the API key
//! and HTTP functionality. Built once per provider process and shared.

use super::error::{NetOrcaError, Result};
use super::http::NetOrcaHttpClient;
use super::query::Pov;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Format an API key as an `Authorization` header value
pub fn format_api_key(api_key: &str) -> String {
    format!("Api-Key {}", api_key)
}

/// Main NetOrca client
#[derive(Clone)]
pub struct NetOrcaClient {
    http: NetOrcaHttpClient,
    base_url: String,
    authorization: String,
}

impl std::fmt::Debug for NetOrcaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetOrcaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NetOrcaClient {
    /// Create a new NetOrca client
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        tracing::info!("Building NetOrca client for {}", base_url);

        Ok(Self {
            http: NetOrcaHttpClient::new()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format_api_key(api_key),
        })
    }

    /// The `Authorization` header value sent with every request
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// GET a URL and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.http.get(url, self.authorization()).await?;
        decode(&body, url)
    }

    /// PATCH a URL with a JSON body. The response body is not inspected.
    pub async fn patch(&self, url: &str, body: &Value) -> Result<()> {
        self.http.patch(url, self.authorization(), body).await?;
        Ok(())
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an orcabase collection URL, e.g. `{base}/v1/orcabase/consumer/service_items/`
    pub fn collection_url(&self, pov: Pov, collection: &str) -> String {
        format!("{}/v1/orcabase/{}/{}/", self.base_url, pov, collection)
    }

    /// Build an orcabase record URL, e.g. `{base}/v1/orcabase/consumer/change_instances/12/`
    pub fn record_url(&self, pov: Pov, collection: &str, id: i64) -> String {
        format!("{}{}/", self.collection_url(pov, collection), id)
    }
}

fn decode<T: DeserializeOwned>(body: &str, url: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| NetOrcaError::decode(format!("response from {}", url), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NetOrcaClient {
        NetOrcaClient::new("https://netorca.example/", "123456").unwrap()
    }

    #[test]
    fn test_api_key_is_formatted() {
        assert_eq!(client().authorization(), "Api-Key 123456");
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        assert_eq!(
            client().collection_url(Pov::Consumer, "x"),
            "https://netorca.example/v1/orcabase/consumer/x/"
        );
    }

    #[test]
    fn test_collection_url() {
        assert_eq!(
            client().collection_url(Pov::ServiceOwner, "service_items"),
            "https://netorca.example/v1/orcabase/serviceowner/service_items/"
        );
    }

    #[test]
    fn test_record_url() {
        assert_eq!(
            client().record_url(Pov::Consumer, "change_instances", 123),
            "https://netorca.example/v1/orcabase/consumer/change_instances/123/"
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let out = format!("{:?}", client());
        assert!(!out.contains("123456"));
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let err = decode::<Value>("not json", "https://netorca.example/x/").unwrap_err();
        assert!(matches!(err, NetOrcaError::Decode { .. }));
    }
}
