//! GetMap request templating.
//!
//! A [`RequestTemplate`] is built once per source and filled with a new
//! bounding box for every frame.

use serde::Serialize;
use wms_common::{BoundingBox, WmsError, WmsResult, EPSG_4326};

use crate::capabilities::ServiceDescriptor;
use crate::encode::percent_encode;

/// Endpoint used when no capabilities URL is configured.
pub const FALLBACK_ENDPOINT: &str = "https://ows.terrestris.de/osm/service";

/// Layer requested from [`FALLBACK_ENDPOINT`].
pub const FALLBACK_LAYER: &str = "OSM-WMS";

/// A GetMap URL with a hole for the four bounding box edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTemplate {
    /// Everything up to and including `bbox=`.
    prefix: String,
    /// Separator written between the four edges.
    separator: String,
    /// Everything after the last edge.
    suffix: String,
}

impl RequestTemplate {
    /// Build the template for a resolved service.
    ///
    /// WMS 1.1.x requests carry the reference system as `srs`, WMS 1.3.0 as
    /// `crs`; the remaining parameters are the same for every version.
    pub fn build(
        descriptor: &ServiceDescriptor,
        layers: &str,
        width: u32,
        height: u32,
    ) -> WmsResult<Self> {
        let reference_param = descriptor
            .version
            .reference_param()
            .ok_or_else(|| WmsError::UnsupportedVersion(descriptor.version.to_string()))?;

        let endpoint = descriptor.get_map_endpoint.trim();
        if endpoint.is_empty() {
            return Err(WmsError::Configuration(
                "GetMap endpoint is empty".to_string(),
            ));
        }
        if descriptor.service_name.is_empty() {
            return Err(WmsError::Configuration("Service name is empty".to_string()));
        }
        check_size(width, height)?;

        let prefix = format!(
            "{}{}service={}&version={}&request=GetMap&layers={}&styles=&format=image/png&bbox=",
            endpoint,
            query_separator(endpoint),
            percent_encode(&descriptor.service_name),
            descriptor.version,
            percent_encode(layers),
        );
        let suffix = format!(
            "&width={}&height={}&{}={}",
            width, height, reference_param, EPSG_4326
        );

        Ok(Self {
            prefix,
            separator: ",".to_string(),
            suffix,
        })
    }

    /// The fixed WMS 1.1.1 request used without capability discovery.
    pub fn fallback(width: u32, height: u32) -> WmsResult<Self> {
        check_size(width, height)?;

        Ok(Self {
            prefix: format!(
                "{}?service=WMS&version=1.1.1&request=GetMap&layers={}&styles=&format=image%2Fpng&bbox=",
                FALLBACK_ENDPOINT, FALLBACK_LAYER
            ),
            separator: "%2C".to_string(),
            suffix: format!(
                "&width={}&height={}&srs=EPSG%3A4326&transparent=true",
                width, height
            ),
        })
    }

    /// Concrete request URL for one frame.
    pub fn fill(&self, bbox: &BoundingBox) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            bbox.to_wms_string_with(&self.separator),
            self.suffix
        )
    }

    /// Human-readable form with named placeholders, for logs and `probe`.
    pub fn pattern(&self) -> String {
        format!(
            "{}{{west}}{sep}{{south}}{sep}{{east}}{sep}{{north}}{}",
            self.prefix,
            self.suffix,
            sep = self.separator
        )
    }
}

/// `?` for a bare endpoint, `&` when it already has a query, nothing when it
/// already ends in either.
fn query_separator(endpoint: &str) -> &'static str {
    if endpoint.ends_with('?') || endpoint.ends_with('&') {
        ""
    } else if endpoint.contains('?') {
        "&"
    } else {
        "?"
    }
}

fn check_size(width: u32, height: u32) -> WmsResult<()> {
    if width == 0 || height == 0 {
        return Err(WmsError::InvalidOption {
            option: "size".to_string(),
            message: format!("{}x{} has an empty dimension", width, height),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wms_common::WmsVersion;

    fn descriptor(version: WmsVersion, endpoint: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            version,
            service_name: "WMS".to_string(),
            get_map_endpoint: endpoint.to_string(),
        }
    }

    #[test]
    fn test_query_separator() {
        assert_eq!(query_separator("http://a/wms"), "?");
        assert_eq!(query_separator("http://a/wms?"), "");
        assert_eq!(query_separator("http://a/wms?map=x"), "&");
        assert_eq!(query_separator("http://a/wms?map=x&"), "");
    }

    #[test]
    fn test_existing_query_is_extended() {
        let template =
            RequestTemplate::build(&descriptor(WmsVersion::V1_1_1, "http://a/wms?map=x"), "l", 1, 1)
                .unwrap();
        assert!(template
            .fill(&BoundingBox::world())
            .starts_with("http://a/wms?map=x&service=WMS&version=1.1.1&"));
    }

    #[test]
    fn test_pattern_names_the_edges() {
        let template =
            RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, "http://a/wms"), "", 2, 3)
                .unwrap();
        assert!(template
            .pattern()
            .contains("bbox={west},{south},{east},{north}&width=2&height=3&crs=EPSG:4326"));
    }
}
