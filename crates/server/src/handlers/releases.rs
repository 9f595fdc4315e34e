//! Supervisor release proxy endpoint.

use crate::auth::extract_bearer_token;
use crate::device_api::DeviceApi;
use crate::error::{ApiError, ApiResult};
use crate::resolver::resolve_device_facts;
use crate::state::AppState;
use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use hangar_core::filter::{self, FilterKind};
use std::sync::Arc;

/// GET /v6/supervisor_release - Resolve and forward a release lookup.
///
/// When the inbound `$filter` pins a device by uuid, the uuid is resolved
/// into a (supervisor version, architecture slug) pair and the outgoing
/// filter rewritten accordingly. Any failure along the resolution path
/// falls back to forwarding the original query unchanged; only the final
/// upstream call can fail the request.
pub async fn proxy_supervisor_release(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let raw_query = raw_query.unwrap_or_default();
    let token = extract_bearer_token(&headers);
    let forwarded = rewrite_query(&state.devices, &raw_query, token).await;

    let upstream = state
        .devices
        .supervisor_releases(&forwarded)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    // Relay status and body verbatim; a non-2xx status is the upstream's
    // answer, not a proxy failure.
    let mut response = (upstream.status, upstream.body).into_response();
    if let Some(content_type) = upstream.content_type
        && let Ok(value) = content_type.parse()
    {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    Ok(response)
}

/// Produce the final query string to forward upstream.
///
/// Returns the original raw query byte-for-byte unless the filter names a
/// device uuid AND both device facts resolve.
async fn rewrite_query(
    devices: &Arc<dyn DeviceApi>,
    raw_query: &str,
    token: Option<&str>,
) -> String {
    let Some(inbound_filter) = query_param(raw_query, "$filter") else {
        return raw_query.to_string();
    };

    let uuid = match filter::classify(&inbound_filter) {
        FilterKind::DeviceUuid(uuid) => uuid,
        FilterKind::Malformed | FilterKind::Resolved => return raw_query.to_string(),
    };

    // The resolution calls carry the caller's token; without one the
    // lookups cannot be made and the query goes out as received.
    let Some(token) = token else {
        tracing::warn!(uuid = %uuid, "uuid filter without bearer token, forwarding unresolved");
        return raw_query.to_string();
    };

    let facts = resolve_device_facts(devices, &uuid, token).await;
    match (facts.architecture_slug, facts.supervisor_version) {
        (Some(slug), Some(version)) => {
            let select = query_param(raw_query, "$select").unwrap_or_default();
            filter::resolved_release_query(&select, &slug, &version)
        }
        _ => {
            tracing::warn!(uuid = %uuid, "device facts incomplete, forwarding unresolved");
            raw_query.to_string()
        }
    }
}

/// Extract a single decoded query parameter from a raw query string.
fn query_param(raw_query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(raw_query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_api::{DeviceApiError, UpstreamResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake device API returning fixed facts and counting resolution calls.
    #[derive(Default)]
    struct FakeApi {
        version: Option<String>,
        slug: Option<String>,
        resolution_calls: AtomicUsize,
    }

    #[async_trait]
    impl DeviceApi for FakeApi {
        async fn supervisor_version(
            &self,
            _uuid: &str,
            _token: &str,
        ) -> Result<Option<String>, DeviceApiError> {
            self.resolution_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.version.clone())
        }

        async fn cpu_architecture(
            &self,
            _uuid: &str,
            _token: &str,
        ) -> Result<Option<String>, DeviceApiError> {
            self.resolution_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.slug.clone())
        }

        async fn supervisor_releases(
            &self,
            _raw_query: &str,
        ) -> Result<UpstreamResponse, DeviceApiError> {
            unimplemented!("not used by rewrite tests")
        }
    }

    fn api(version: Option<&str>, slug: Option<&str>) -> (Arc<FakeApi>, Arc<dyn DeviceApi>) {
        let fake = Arc::new(FakeApi {
            version: version.map(str::to_string),
            slug: slug.map(str::to_string),
            resolution_calls: AtomicUsize::new(0),
        });
        let dynamic: Arc<dyn DeviceApi> = fake.clone();
        (fake, dynamic)
    }

    #[tokio::test]
    async fn no_uuid_filter_forwards_unchanged_without_resolution() {
        let (fake, devices) = api(Some("12.3.4"), Some("aarch64"));
        let raw = "$select=id&$filter=supervisor_version%20eq%20'v1.2.3'";

        let forwarded = rewrite_query(&devices, raw, Some("token")).await;
        assert_eq!(forwarded, raw);
        assert_eq!(fake.resolution_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_uuid_clause_forwards_unchanged() {
        let (fake, devices) = api(Some("12.3.4"), Some("aarch64"));
        let raw = "$select=id&$filter=uuid%20ne%20'abc123'";

        let forwarded = rewrite_query(&devices, raw, Some("token")).await;
        assert_eq!(forwarded, raw);
        assert_eq!(fake.resolution_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_token_forwards_unchanged() {
        let (fake, devices) = api(Some("12.3.4"), Some("aarch64"));
        let raw = "$select=id&$filter=uuid%20eq%20'abc123'";

        let forwarded = rewrite_query(&devices, raw, None).await;
        assert_eq!(forwarded, raw);
        assert_eq!(fake.resolution_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn complete_facts_rewrite_the_query() {
        let (_fake, devices) = api(Some("12.3.4"), Some("aarch64"));
        let raw = "$select=id,supervisor_version&$filter=uuid%20eq%20'abc123'";

        let forwarded = rewrite_query(&devices, raw, Some("token")).await;
        assert!(forwarded.contains("$select=id,supervisor_version"));
        assert!(forwarded.contains("slug eq 'aarch64'"));
        assert!(forwarded.contains("supervisor_version eq 'v12%2E3%2E4'"));
        assert!(forwarded.contains("$top=1"));
        assert!(!forwarded.contains("uuid"));
    }

    #[tokio::test]
    async fn incomplete_facts_fall_back_byte_for_byte() {
        let (fake, devices) = api(Some("12.3.4"), None);
        let raw = "$select=id&$filter=uuid%20eq%20'abc123'&$top=5";

        let forwarded = rewrite_query(&devices, raw, Some("token")).await;
        assert_eq!(forwarded, raw);
        assert_eq!(fake.resolution_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_filter_param_forwards_unchanged() {
        let (fake, devices) = api(None, None);
        let raw = "$select=id";

        let forwarded = rewrite_query(&devices, raw, Some("token")).await;
        assert_eq!(forwarded, raw);
        assert_eq!(fake.resolution_calls.load(Ordering::SeqCst), 0);
    }
}
