//! Client for the device-management API.

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use hangar_core::filter;
use reqwest::Url;
use serde::Deserialize;

/// Device API client errors.
#[derive(Debug, thiserror::Error)]
pub enum DeviceApiError {
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Raw upstream response relayed verbatim to the caller.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Read operations against the device-management API.
///
/// A trait seam so the resolver and release proxy can be tested with
/// injected fakes.
#[async_trait]
pub trait DeviceApi: Send + Sync + 'static {
    /// Fetch the supervisor version of the device with the given uuid.
    /// Returns None when no matching device record exists.
    async fn supervisor_version(
        &self,
        uuid: &str,
        token: &str,
    ) -> Result<Option<String>, DeviceApiError>;

    /// Fetch the CPU architecture slug backing the device's device type.
    /// Returns None when no matching record exists.
    async fn cpu_architecture(
        &self,
        uuid: &str,
        token: &str,
    ) -> Result<Option<String>, DeviceApiError>;

    /// Forward a supervisor release query and capture the raw response.
    /// No auth header is attached; non-2xx statuses are captured, not errors.
    async fn supervisor_releases(
        &self,
        raw_query: &str,
    ) -> Result<UpstreamResponse, DeviceApiError>;
}

/// OData-style envelope returned by the device-management API.
#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    #[serde(default)]
    d: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// reqwest-backed device API client.
#[derive(Clone)]
pub struct BalenaApi {
    http: reqwest::Client,
    base_url: Url,
}

impl BalenaApi {
    pub fn new(host: &str) -> Result<Self, DeviceApiError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(host)?,
        })
    }

    fn resource_url(&self, resource: &str, query: &str) -> Result<Url, DeviceApiError> {
        let mut url = self.base_url.join(&format!("/v6/{resource}"))?;
        url.set_query(Some(query));
        Ok(url)
    }

    /// Issue an authenticated read and return the named field of the first
    /// record, if any.
    async fn first_record_field(
        &self,
        resource: &str,
        query: &str,
        field: &str,
        token: &str,
    ) -> Result<Option<String>, DeviceApiError> {
        let url = self.resource_url(resource, query)?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DeviceApiError::Status { status, body });
        }

        let envelope: RecordEnvelope = serde_json::from_str(&body)?;
        Ok(envelope
            .d
            .into_iter()
            .next()
            .and_then(|record| record.get(field).cloned())
            .and_then(|value| value.as_str().map(str::to_string)))
    }
}

#[async_trait]
impl DeviceApi for BalenaApi {
    async fn supervisor_version(
        &self,
        uuid: &str,
        token: &str,
    ) -> Result<Option<String>, DeviceApiError> {
        let query = format!(
            "$select=supervisor_version&$filter={}",
            filter::device_uuid_filter(uuid)
        );
        self.first_record_field("device", &query, "supervisor_version", token)
            .await
    }

    async fn cpu_architecture(
        &self,
        uuid: &str,
        token: &str,
    ) -> Result<Option<String>, DeviceApiError> {
        let query = format!(
            "$select=slug&$filter={}",
            filter::device_architecture_filter(uuid)
        );
        self.first_record_field("cpu_architecture", &query, "slug", token)
            .await
    }

    async fn supervisor_releases(
        &self,
        raw_query: &str,
    ) -> Result<UpstreamResponse, DeviceApiError> {
        let url = self.resource_url("supervisor_release", raw_query)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
