//! Tests for GetMap request templating.

use percent_encoding::percent_decode_str;
use wms_common::{BoundingBox, WmsError, WmsVersion};
use wms_protocol::getmap::FALLBACK_ENDPOINT;
use wms_protocol::{RequestTemplate, ServiceDescriptor};

fn descriptor(version: WmsVersion, service_name: &str) -> ServiceDescriptor {
    ServiceDescriptor {
        version,
        service_name: service_name.to_string(),
        get_map_endpoint: "http://example/wms/getmap".to_string(),
    }
}

fn query_value<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[test]
fn test_wms_1_3_0_world_request() {
    let template = RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, "WMS"), "", 256, 256)
        .unwrap();
    assert_eq!(
        template.fill(&BoundingBox::world()),
        "http://example/wms/getmap?service=WMS&version=1.3.0&request=GetMap&layers=&styles=&format=image/png&bbox=-180.000000,-90.000000,180.000000,90.000000&width=256&height=256&crs=EPSG:4326"
    );
}

#[test]
fn test_wms_1_1_x_uses_srs() {
    for version in [WmsVersion::V1_1_0, WmsVersion::V1_1_1] {
        let template =
            RequestTemplate::build(&descriptor(version, "WMS"), "roads", 640, 480).unwrap();
        let url = template.fill(&BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(query_value(&url, "srs"), Some("EPSG:4326"));
        assert_eq!(query_value(&url, "crs"), None);
        assert_eq!(query_value(&url, "version"), Some(version.as_str()));
        assert_eq!(query_value(&url, "bbox"), Some("1.000000,2.000000,3.000000,4.000000"));
        assert_eq!(query_value(&url, "width"), Some("640"));
        assert_eq!(query_value(&url, "height"), Some("480"));
    }
}

#[test]
fn test_only_reference_param_differs_between_versions() {
    let bbox = BoundingBox::new(-10.0, 40.0, 10.0, 50.0);
    let old = RequestTemplate::build(&descriptor(WmsVersion::V1_1_1, "WMS"), "a", 8, 8)
        .unwrap()
        .fill(&bbox);
    let new = RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, "WMS"), "a", 8, 8)
        .unwrap()
        .fill(&bbox);

    assert_eq!(
        old.replace("version=1.1.1", "version=1.3.0")
            .replace("srs=", "crs="),
        new
    );
}

#[test]
fn test_version_1_0_0_cannot_be_templated() {
    let err = RequestTemplate::build(&descriptor(WmsVersion::V1_0_0, "WMS"), "", 8, 8).unwrap_err();
    assert!(matches!(err, WmsError::UnsupportedVersion(_)));
}

#[test]
fn test_empty_fields_are_rejected() {
    let mut empty_endpoint = descriptor(WmsVersion::V1_3_0, "WMS");
    empty_endpoint.get_map_endpoint = " ".to_string();
    assert!(RequestTemplate::build(&empty_endpoint, "", 8, 8).is_err());

    assert!(RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, ""), "", 8, 8).is_err());
    assert!(RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, "WMS"), "", 0, 8).is_err());
}

#[test]
fn test_layers_and_service_name_round_trip_through_decoding() {
    let layers = "topp:states,roads & rivers";
    let service = "My WMS (test)";
    let url = RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, service), layers, 8, 8)
        .unwrap()
        .fill(&BoundingBox::world());

    let encoded_layers = query_value(&url, "layers").unwrap();
    let encoded_service = query_value(&url, "service").unwrap();
    assert!(!encoded_layers.contains(',') && !encoded_layers.contains(' '));
    assert_eq!(percent_decode_str(encoded_layers).decode_utf8().unwrap(), layers);
    assert_eq!(percent_decode_str(encoded_service).decode_utf8().unwrap(), service);
}

#[test]
fn test_template_is_reusable() {
    let template = RequestTemplate::build(&descriptor(WmsVersion::V1_3_0, "WMS"), "", 4, 4)
        .unwrap();
    let first = template.fill(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    let second = template.fill(&BoundingBox::new(0.5, 0.5, 1.5, 1.5));
    assert_ne!(first, second);
    assert_eq!(first, template.fill(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)));
}

#[test]
fn test_fallback_template() {
    let url = RequestTemplate::fallback(640, 480)
        .unwrap()
        .fill(&BoundingBox::new(-180.0, -90.0, 180.0, 90.0));
    assert_eq!(
        url,
        format!(
            "{}?service=WMS&version=1.1.1&request=GetMap&layers=OSM-WMS&styles=&format=image%2Fpng&bbox=-180.000000%2C-90.000000%2C180.000000%2C90.000000&width=640&height=480&srs=EPSG%3A4326&transparent=true",
            FALLBACK_ENDPOINT
        )
    );
}
