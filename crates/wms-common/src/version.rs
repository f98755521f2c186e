//! WMS protocol versions and the spatial-reference parameter they use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only spatial reference the source requests maps in.
pub const EPSG_4326: &str = "EPSG:4326";

/// WMS protocol versions that may appear in a capability document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WmsVersion {
    /// Recognized in documents, but GetMap requests cannot be built for it.
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.0")]
    V1_1_0,
    #[serde(rename = "1.1.1")]
    V1_1_1,
    #[serde(rename = "1.3.0")]
    V1_3_0,
}

impl WmsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WmsVersion::V1_0_0 => "1.0.0",
            WmsVersion::V1_1_0 => "1.1.0",
            WmsVersion::V1_1_1 => "1.1.1",
            WmsVersion::V1_3_0 => "1.3.0",
        }
    }

    /// Whether GetMap requests can be templated for this version.
    pub fn is_supported(&self) -> bool {
        !matches!(self, WmsVersion::V1_0_0)
    }

    /// Name of the spatial-reference query parameter.
    ///
    /// WMS 1.1.x calls it `srs`, WMS 1.3.0 renamed it to `crs`.
    /// Returns `None` for versions that are not supported.
    pub fn reference_param(&self) -> Option<&'static str> {
        match self {
            WmsVersion::V1_0_0 => None,
            WmsVersion::V1_1_0 | WmsVersion::V1_1_1 => Some("srs"),
            WmsVersion::V1_3_0 => Some("crs"),
        }
    }
}

impl FromStr for WmsVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0.0" => Ok(WmsVersion::V1_0_0),
            "1.1.0" => Ok(WmsVersion::V1_1_0),
            "1.1.1" => Ok(WmsVersion::V1_1_1),
            "1.3.0" => Ok(WmsVersion::V1_3_0),
            other => Err(VersionParseError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for WmsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VersionParseError {
    #[error("Unknown WMS version: '{0}'")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("1.0.0".parse::<WmsVersion>().unwrap(), WmsVersion::V1_0_0);
        assert_eq!("1.1.0".parse::<WmsVersion>().unwrap(), WmsVersion::V1_1_0);
        assert_eq!(" 1.1.1 ".parse::<WmsVersion>().unwrap(), WmsVersion::V1_1_1);
        assert_eq!("1.3.0".parse::<WmsVersion>().unwrap(), WmsVersion::V1_3_0);
        assert!("2.0.0".parse::<WmsVersion>().is_err());
        assert!("".parse::<WmsVersion>().is_err());
    }

    #[test]
    fn test_reference_param() {
        assert_eq!(WmsVersion::V1_1_0.reference_param(), Some("srs"));
        assert_eq!(WmsVersion::V1_1_1.reference_param(), Some("srs"));
        assert_eq!(WmsVersion::V1_3_0.reference_param(), Some("crs"));
        assert_eq!(WmsVersion::V1_0_0.reference_param(), None);
        assert!(!WmsVersion::V1_0_0.is_supported());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for v in [WmsVersion::V1_1_0, WmsVersion::V1_1_1, WmsVersion::V1_3_0] {
            assert_eq!(v.to_string().parse::<WmsVersion>().unwrap(), v);
        }
    }
}
