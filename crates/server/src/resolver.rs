//! Device fact resolution for release query rewriting.

use crate::device_api::DeviceApi;
use std::sync::Arc;

/// Facts resolved for a device identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceFacts {
    pub supervisor_version: Option<String>,
    pub architecture_slug: Option<String>,
}

impl DeviceFacts {
    /// Both facts are required before a filter can be rewritten.
    pub fn is_complete(&self) -> bool {
        self.supervisor_version.is_some() && self.architecture_slug.is_some()
    }
}

/// Resolve a device uuid into its supervisor version and architecture slug.
///
/// The two lookups share no data dependency and are issued concurrently.
/// A failed or empty lookup leaves its field unset; the caller falls back
/// to forwarding the original query unchanged. No retries.
pub async fn resolve_device_facts(
    api: &Arc<dyn DeviceApi>,
    uuid: &str,
    token: &str,
) -> DeviceFacts {
    let (version, slug) = tokio::join!(
        api.supervisor_version(uuid, token),
        api.cpu_architecture(uuid, token),
    );

    let supervisor_version = version.unwrap_or_else(|e| {
        tracing::warn!(uuid = %uuid, error = %e, "supervisor version lookup failed");
        None
    });
    let architecture_slug = slug.unwrap_or_else(|e| {
        tracing::warn!(uuid = %uuid, error = %e, "cpu architecture lookup failed");
        None
    });

    DeviceFacts {
        supervisor_version,
        architecture_slug,
    }
}
