//! Common test fixtures for wms-video tests.
//!
//! Capability documents here follow the shape real servers return: WMS 1.3.0
//! uses a `WMS_Capabilities` root in the `http://www.opengis.net/wms`
//! namespace, older versions a `WMT_MS_Capabilities` root.

/// Capability documents.
pub mod capabilities {
    /// Base URL the fixtures are served from in tests.
    pub const BASE_URL: &str = "http://example/wms";

    /// GetMap endpoint advertised by [`document`] by default.
    pub const GETMAP_URL: &str = "http://example/wms/getmap";

    /// Build a capability document.
    ///
    /// `service_name` and `href` are omitted from the document when `None`.
    pub fn document(version: &str, service_name: Option<&str>, href: Option<&str>) -> String {
        let name = service_name
            .map(|n| format!("<Name>{}</Name>", n))
            .unwrap_or_default();
        let href = href
            .map(|h| format!(r#" xlink:href="{}""#, h))
            .unwrap_or_default();
        let (open, close) = root_element(version);

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
{open}
  <Service>
    {name}
    <Title>Test map service</Title>
    <OnlineResource xlink:type="simple" xlink:href="http://example/"/>
  </Service>
  <Capability>
    <Request>
      <GetCapabilities>
        <Format>text/xml</Format>
        <DCPType><HTTP><Get><OnlineResource xlink:type="simple" xlink:href="http://example/wms/caps"/></Get></HTTP></DCPType>
      </GetCapabilities>
      <GetMap>
        <Format>image/png</Format>
        <Format>image/jpeg</Format>
        <DCPType>
          <HTTP>
            <Get><OnlineResource xlink:type="simple"{href}/></Get>
            <Post><OnlineResource xlink:type="simple" xlink:href="http://example/wms/post"/></Post>
          </HTTP>
        </DCPType>
      </GetMap>
    </Request>
    <Layer>
      <Title>Root</Title>
      <Layer queryable="1"><Name>roads</Name><Title>Roads</Title></Layer>
    </Layer>
  </Capability>
{close}"#
        )
    }

    /// A WMS 1.3.0 document named "WMS" pointing at [`GETMAP_URL`].
    pub fn v1_3_0() -> String {
        document("1.3.0", Some("WMS"), Some(GETMAP_URL))
    }

    /// A WMS 1.1.1 document named "WMS" pointing at [`GETMAP_URL`].
    pub fn v1_1_1() -> String {
        document("1.1.1", Some("WMS"), Some(GETMAP_URL))
    }

    /// Document without a `Service` element.
    pub fn without_service() -> String {
        r#"<?xml version="1.0"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Capability><Request><GetMap>
    <DCPType><HTTP><Get><OnlineResource xlink:href="http://example/wms/getmap"/></Get></HTTP></DCPType>
  </GetMap></Request></Capability>
</WMS_Capabilities>"#
            .to_string()
    }

    /// Document whose `Capability` has no `GetMap` request.
    pub fn without_getmap() -> String {
        r#"<?xml version="1.0"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service><Name>WMS</Name></Service>
  <Capability><Request><GetCapabilities/></Request></Capability>
</WMS_Capabilities>"#
            .to_string()
    }

    /// Document whose `GetMap` has no `OnlineResource` under `DCPType/HTTP/Get`.
    pub fn without_online_resource() -> String {
        r#"<?xml version="1.0"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">
  <Service><Name>WMS</Name></Service>
  <Capability><Request><GetMap><DCPType><HTTP><Get/></HTTP></DCPType></GetMap></Request></Capability>
</WMS_Capabilities>"#
            .to_string()
    }

    /// Document whose root has no `version` attribute.
    pub fn without_version() -> String {
        document("1.3.0", Some("WMS"), Some(GETMAP_URL)).replacen(r#" version="1.3.0""#, "", 1)
    }

    fn root_element(version: &str) -> (String, String) {
        if version == "1.3.0" {
            (
                format!(
                    r#"<WMS_Capabilities version="{}" xmlns="http://www.opengis.net/wms" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
                    version
                ),
                "</WMS_Capabilities>".to_string(),
            )
        } else {
            (
                format!(
                    r#"<WMT_MS_Capabilities version="{}" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
                    version
                ),
                "</WMT_MS_Capabilities>".to_string(),
            )
        }
    }
}

/// Expression sets used by source tests, as (xref, yref, x1, x2, y1, y2).
pub mod expressions {
    /// The whole world, constant over time.
    pub const WORLD: [&str; 6] = ["0", "0", "-180", "180", "-90", "90"];

    /// A 20x10 degree window panning east by one degree per second.
    pub const PAN_EAST: [&str; 6] = ["t", "45", "xref-10", "xref+10", "yref-5", "yref+5"];
}
