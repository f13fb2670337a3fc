use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::ApiError;

/// Thin JSON-over-HTTP wrapper that classifies every failure as either a
/// backend rejection (non-success status) or a network failure (everything else).
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed =
            reqwest::Url::parse(base_url).with_context(|| format!("Invalid base URL '{base_url}'"))?;
        if parsed.cannot_be_a_base() {
            return Err(anyhow!("Invalid base URL '{base_url}'"));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> Result<T, ApiError> {
        let req = self.http.get(self.endpoint(path)).query(query);
        self.send_json(req, what).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, what: &'static str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.http.post(self.endpoint(path)).json(body);
        self.send_json(req, what).await
    }

    /// POST a JSON body and return the raw response bytes.
    ///
    /// Non-success statuses become [`ApiError::Export`]; the error body is not read.
    pub async fn post_for_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let res = self
            .http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Export { status: status.as_u16() });
        }

        let bytes = res.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let res = req.send().await?;
        let res = reject_unsuccessful(res).await?;

        // Past this point the status was a success; anything unusable is a network failure.
        let bytes = res.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::unreadable(what, source))
    }
}

async fn reject_unsuccessful(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    // An unreadable or non-JSON error body still counts as a backend rejection.
    let body = match res.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|_| empty_object()),
        Err(_) => empty_object(),
    };

    Err(ApiError::Api { status: status.as_u16(), body })
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
