//! WMS capability discovery.
//!
//! Only three facts are read from a GetCapabilities response: the protocol
//! version, the service name and the GetMap endpoint. Everything else in the
//! document is ignored.

use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;
use wms_common::{WmsError, WmsResult, WmsVersion};

use crate::client::Transport;
use crate::xml::{find_child, find_path, parse_document, XLINK_NS};

/// Service name used when the document does not provide one.
pub const DEFAULT_SERVICE_NAME: &str = "WMS";

const GET_MAP_PATH: [&str; 3] = ["Capability", "Request", "GetMap"];
const ONLINE_RESOURCE_PATH: [&str; 4] = ["DCPType", "HTTP", "Get", "OnlineResource"];

/// What the source needs to know about a map service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub version: WmsVersion,
    pub service_name: String,
    pub get_map_endpoint: String,
}

/// Build the GetCapabilities URL for a service URL.
///
/// Any query string or fragment already present on `url` is dropped.
pub fn capabilities_request_url(url: &str) -> String {
    format!("{}?request=GetCapabilities", base_url(url))
}

/// Fetch and parse the capability document behind `url`.
#[instrument(skip(transport))]
pub async fn resolve(transport: &dyn Transport, url: &str) -> WmsResult<ServiceDescriptor> {
    parse_http_url(base_url(url))?;

    let request_url = capabilities_request_url(url);
    let body = transport.get(&request_url).await?;
    let xml = std::str::from_utf8(&body).map_err(|e| {
        WmsError::Parse(format!(
            "Capability document from '{}' is not valid UTF-8: {}",
            request_url, e
        ))
    })?;

    let descriptor = parse_capabilities(xml, url)?;
    info!(
        version = %descriptor.version,
        service = %descriptor.service_name,
        endpoint = %descriptor.get_map_endpoint,
        "Resolved WMS capabilities"
    );
    Ok(descriptor)
}

/// Extract a [`ServiceDescriptor`] from a capability document.
///
/// `capabilities_url` is the URL the document was requested from; it is the
/// base for relative endpoints and the fallback when the GetMap resource has
/// no `xlink:href`.
pub fn parse_capabilities(xml: &str, capabilities_url: &str) -> WmsResult<ServiceDescriptor> {
    let root = parse_document(xml)?;

    let raw_version = root
        .attribute("version")
        .ok_or_else(|| WmsError::MissingCapability {
            path: format!("{}@version", root.name),
            message: "Could not find version attribute".to_string(),
        })?;
    let version: WmsVersion = raw_version.parse()?;
    if !version.is_supported() {
        return Err(WmsError::UnsupportedVersion(version.to_string()));
    }

    let service = find_child(&root, "Service").ok_or_else(|| WmsError::MissingCapability {
        path: format!("{}/Service", root.name),
        message: "Could not find Service node".to_string(),
    })?;

    let service_name = match find_child(service, "Name").map(|n| n.text.trim()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            warn!(
                "No service name in capability document, using '{}'",
                DEFAULT_SERVICE_NAME
            );
            DEFAULT_SERVICE_NAME.to_string()
        }
    };

    let get_map = find_path(&root, &GET_MAP_PATH).ok_or_else(|| WmsError::MissingCapability {
        path: format!("{}/{}", root.name, GET_MAP_PATH.join("/")),
        message: "Could not find GetMap node".to_string(),
    })?;

    let online_resource =
        find_path(get_map, &ONLINE_RESOURCE_PATH).ok_or_else(|| WmsError::MissingCapability {
            path: format!(
                "{}/{}/{}",
                root.name,
                GET_MAP_PATH.join("/"),
                ONLINE_RESOURCE_PATH.join("/")
            ),
            message: "Could not find OnlineResource node".to_string(),
        })?;

    let get_map_endpoint = match online_resource.attribute_ns("href", XLINK_NS) {
        Some(href) if !href.trim().is_empty() => resolve_endpoint(href.trim(), capabilities_url)?,
        _ => {
            warn!(
                url = %capabilities_url,
                "GetMap OnlineResource has no xlink:href, using the capabilities URL"
            );
            parse_http_url(base_url(capabilities_url))?;
            base_url(capabilities_url).to_string()
        }
    };

    Ok(ServiceDescriptor {
        version,
        service_name,
        get_map_endpoint,
    })
}

/// Turn an `xlink:href` into an absolute http(s) endpoint.
///
/// Absolute hrefs are kept verbatim; relative ones are joined onto the
/// capabilities URL so they inherit its scheme and host.
fn resolve_endpoint(href: &str, capabilities_url: &str) -> WmsResult<String> {
    match Url::parse(href) {
        Ok(absolute) => {
            check_scheme(&absolute, href)?;
            Ok(href.to_string())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = parse_http_url(base_url(capabilities_url))?;
            let joined = base.join(href).map_err(|e| {
                WmsError::Configuration(format!("Invalid GetMap endpoint '{}': {}", href, e))
            })?;
            Ok(joined.to_string())
        }
        Err(e) => Err(WmsError::Configuration(format!(
            "Invalid GetMap endpoint '{}': {}",
            href, e
        ))),
    }
}

fn base_url(url: &str) -> &str {
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    &url[..end]
}

fn parse_http_url(url: &str) -> WmsResult<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| WmsError::Configuration(format!("Invalid service URL '{}': {}", url, e)))?;
    check_scheme(&parsed, url)?;
    Ok(parsed)
}

fn check_scheme(parsed: &Url, raw: &str) -> WmsResult<()> {
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WmsError::Configuration(format!(
            "Unsupported scheme '{}' in '{}', expected http or https",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_request_url_strips_query() {
        assert_eq!(
            capabilities_request_url("http://example/wms"),
            "http://example/wms?request=GetCapabilities"
        );
        assert_eq!(
            capabilities_request_url("http://example/wms?service=WMS&request=GetMap"),
            "http://example/wms?request=GetCapabilities"
        );
        assert_eq!(
            capabilities_request_url("http://example/wms#frag"),
            "http://example/wms?request=GetCapabilities"
        );
    }

    #[test]
    fn test_relative_endpoint_inherits_scheme_and_host() {
        assert_eq!(
            resolve_endpoint("/ows/getmap", "https://maps.example.org/wms?x=1").unwrap(),
            "https://maps.example.org/ows/getmap"
        );
    }

    #[test]
    fn test_absolute_endpoint_kept_verbatim() {
        assert_eq!(
            resolve_endpoint("http://other/wms?map=a.map&", "http://example/wms").unwrap(),
            "http://other/wms?map=a.map&"
        );
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let err = resolve_endpoint("ftp://example/wms", "http://example/wms").unwrap_err();
        assert!(matches!(err, WmsError::Configuration(_)));
    }
}
