//! Device image download endpoint.

use crate::auth::extract_bearer_token;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use hangar_core::image_key;
use serde::Deserialize;

/// Query parameters accepted by `/download`.
///
/// Only `deviceType` and `version` drive the object key; the rest are
/// accepted for compatibility with image-builder clients and logged for
/// diagnostics.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadParams {
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub version: String,
    pub development_mode: Option<String>,
    pub app_id: Option<String>,
    pub file_type: Option<String>,
    pub image_type: Option<String>,
    pub app_update_poll_interval: Option<String>,
    pub network: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_key: Option<String>,
}

/// GET /download - Stream a built device image from the object store.
pub async fn download_image(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    tracing::debug!(
        device_type = %params.device_type,
        version = %params.version,
        development_mode = ?params.development_mode,
        app_id = ?params.app_id,
        file_type = ?params.file_type,
        image_type = ?params.image_type,
        app_update_poll_interval = ?params.app_update_poll_interval,
        network = ?params.network,
        "image download requested"
    );

    if params.device_type.is_empty() {
        return Err(ApiError::BadRequest(
            "deviceType param must be provided".to_string(),
        ));
    }
    if extract_bearer_token(&headers).is_none() {
        return Err(ApiError::BadRequest(
            "authorization header must be provided".to_string(),
        ));
    }

    let key = image_key(
        &state.config.images.prefix,
        &params.device_type,
        &params.version,
    );

    // Fetch the size first so Content-Length is on the wire before the
    // body starts streaming.
    let meta = state.storage.head(&key).await?;
    let stream = state.storage.get_stream(&key).await?;

    // Errors past this point arrive mid-stream, after the status line and
    // headers have been sent. The response aborts; all we can do is log.
    let key_for_log = key.clone();
    let body_stream = stream.map(move |result| {
        result.map_err(|e| {
            tracing::error!(
                key = %key_for_log,
                error = %e,
                "image streaming failed mid-transfer"
            );
            std::io::Error::other(e.to_string())
        })
    });

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/octet-stream".to_string()),
            (CONTENT_LENGTH, meta.size.to_string()),
        ],
        Body::from_stream(body_stream),
    )
        .into_response())
}
