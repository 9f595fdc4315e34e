//! OData-style filter expressions for supervisor release lookups.
//!
//! Inbound release queries arrive in two shapes: a device lookup
//! (`uuid eq '<hex>'`) that must be resolved into a concrete
//! version/architecture pair before forwarding, and an already-resolved
//! filter that is forwarded untouched. This module classifies the inbound
//! shape and builds the outgoing predicates.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Classification of an inbound `$filter` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Contains a `uuid eq '<hex>'` clause; resolution is required.
    DeviceUuid(String),
    /// Mentions `uuid` but the clause shape is unrecognized. The query
    /// is forwarded unchanged (degraded path, not an error).
    Malformed,
    /// No uuid clause; the filter is ready to forward as-is.
    Resolved,
}

/// Classify a raw `$filter` string.
pub fn classify(filter: &str) -> FilterKind {
    if !filter.contains("uuid") {
        return FilterKind::Resolved;
    }
    match extract_uuid(filter) {
        Some(uuid) => FilterKind::DeviceUuid(uuid),
        None => FilterKind::Malformed,
    }
}

/// Extract the hex identifier from a `uuid eq '<hex>'` clause.
fn extract_uuid(filter: &str) -> Option<String> {
    let start = filter.find("uuid eq '")? + "uuid eq '".len();
    let rest = &filter[start..];
    let end = rest.find('\'')?;
    let candidate = &rest[..end];
    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(candidate.to_string())
}

/// Filter selecting a device by its uuid.
pub fn device_uuid_filter(uuid: &str) -> String {
    format!("uuid eq '{}'", utf8_percent_encode(uuid, NON_ALPHANUMERIC))
}

/// Filter selecting the CPU architecture backing a device's device type,
/// via nested existence predicates keyed by the device uuid.
pub fn device_architecture_filter(uuid: &str) -> String {
    format!(
        "is_supported_by__device_type/any(dt:dt/is_of__device/any(d:d/uuid eq '{}'))",
        utf8_percent_encode(uuid, NON_ALPHANUMERIC)
    )
}

/// Build the forwarded query for a resolved (architecture, version) pair.
///
/// The query keeps the caller's `$select`, pins `$top=1`, and asserts the
/// release targets a device type of the resolved architecture at
/// supervisor version `v<version>`. Literal components are
/// percent-encoded before embedding; the surrounding grammar is emitted
/// verbatim for the upstream parser.
pub fn resolved_release_query(
    select: &str,
    architecture_slug: &str,
    supervisor_version: &str,
) -> String {
    let slug = utf8_percent_encode(architecture_slug, NON_ALPHANUMERIC);
    let version = utf8_percent_encode(supervisor_version, NON_ALPHANUMERIC);
    format!(
        "$select={select}&$filter=is_for__device_type/any(dt:dt/is_of__cpu_architecture/any(a:a/slug eq '{slug}')) and supervisor_version eq 'v{version}'&$top=1"
    )
}
