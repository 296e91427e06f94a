// Hosted backend HTTP client.
// Handles API key authentication and request/response processing.

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;

use crate::config::Config;
use crate::error::{HuddleError, Result};

/// Client for the hosted database REST interface.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new client for `base_url` authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key).map_err(|e| HuddleError::Other(e.to_string()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| HuddleError::Other(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("huddle-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(HuddleError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a REST path such as `pinned_messages`.
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &T,
    ) -> Result<Response> {
        let url = self.rest_url(path);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(HuddleError::Api)?;

        self.check_response(response).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.rest_url(path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(HuddleError::Api)?;

        self.check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(HuddleError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(HuddleError::NotFound(url))
            }
            status => Err(HuddleError::Backend {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url_joins_cleanly() {
        let client = BackendClient::new("https://example.test/", "key").unwrap();
        assert_eq!(client.base_url(), "https://example.test");
        assert_eq!(
            client.rest_url("/pinned_messages"),
            "https://example.test/rest/v1/pinned_messages"
        );
        assert_eq!(
            client.rest_url("rpc/verify_pass"),
            "https://example.test/rest/v1/rpc/verify_pass"
        );
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(BackendClient::new("https://example.test", "bad\nkey").is_err());
    }
}
