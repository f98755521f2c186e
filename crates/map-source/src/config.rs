//! Source configuration loading and validation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bbox_expr::ExprSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wms_common::{WmsError, WmsResult};

/// Everything a [`MapSource`](crate::MapSource) needs, read-only after init.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(alias = "s")]
    pub size: FrameSize,
    #[serde(alias = "r")]
    pub rate: FrameRate,
    /// Terminal pts; only the driving pipeline looks at it.
    pub end_pts: f64,
    #[serde(flatten)]
    pub expressions: ExprSet,
    /// Capabilities URL. Without one the built-in OSM service is used.
    pub url: Option<String>,
    /// Comma separated WMS layer list.
    pub layers: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            size: FrameSize::default(),
            rate: FrameRate::default(),
            end_pts: 400.0,
            expressions: ExprSet::default(),
            url: None,
            layers: String::new(),
        }
    }
}

impl SourceConfig {
    /// Load configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> WmsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WmsError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> WmsResult<Self> {
        serde_yaml::from_str(content).map_err(|e| WmsError::Configuration(e.to_string()))
    }

    /// Validate configuration.
    pub fn validate(&self) -> WmsResult<()> {
        self.size.check()?;
        if self.rate.num == 0 || self.rate.den == 0 {
            return Err(invalid("rate", format!("{} must be > 0", self.rate)));
        }
        if !(self.end_pts >= 0.0) {
            return Err(invalid("end_pts", format!("{} must be >= 0", self.end_pts)));
        }
        for (var, src) in self.expressions.in_order() {
            if src.trim().is_empty() {
                return Err(invalid(var.name(), "expression is empty"));
            }
        }
        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                return Err(invalid("url", "value is empty"));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("url", format!("'{}' is not an http(s) URL", url)));
            }
        }
        Ok(())
    }

    /// Seconds per pts tick.
    pub fn time_base(&self) -> f64 {
        self.rate.den as f64 / self.rate.num as f64
    }

    /// Number of frames the pipeline should pull before stopping.
    pub fn frame_count(&self) -> u64 {
        self.end_pts.ceil() as u64
    }
}

fn invalid(option: &str, message: impl Into<String>) -> WmsError {
    WmsError::InvalidOption {
        option: option.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigParseError {
    #[error("invalid frame size '{0}', expected WxH or a size name")]
    Size(String),
    #[error("invalid frame rate '{0}'")]
    Rate(String),
}

impl From<ConfigParseError> for WmsError {
    fn from(err: ConfigParseError) -> Self {
        WmsError::Configuration(err.to_string())
    }
}

/// Output raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

const SIZE_ABBREVIATIONS: &[(&str, u32, u32)] = &[
    ("qvga", 320, 240),
    ("vga", 640, 480),
    ("svga", 800, 600),
    ("xga", 1024, 768),
    ("hd480", 852, 480),
    ("hd720", 1280, 720),
    ("hd1080", 1920, 1080),
];

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Reject sizes whose frame buffer could not be addressed.
    pub fn check(&self) -> WmsResult<()> {
        let (w, h) = (self.width as u64, self.height as u64);
        if w == 0 || h == 0 || (w + 128) * (h + 128) >= (i32::MAX / 8) as u64 {
            return Err(invalid(
                "size",
                format!("picture size {} is invalid", self),
            ));
        }
        Ok(())
    }

    /// Bytes in one packed RGB0 frame.
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for FrameSize {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, w, h)) = SIZE_ABBREVIATIONS
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(s))
        {
            return Ok(Self::new(*w, *h));
        }
        let err = || ConfigParseError::Size(s.to_string());
        let (w, h) = s.split_once(|c: char| c == 'x' || c == 'X').ok_or_else(err)?;
        Ok(Self::new(
            w.trim().parse().map_err(|_| err())?,
            h.trim().parse().map_err(|_| err())?,
        ))
    }
}

impl TryFrom<String> for FrameSize {
    type Error = ConfigParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameSize> for String {
    fn from(size: FrameSize) -> Self {
        size.to_string()
    }
}

/// Output frame rate as a reduced fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RateValue", into = "String")]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub fn new(num: u32, den: u32) -> Self {
        let g = gcd(num, den).max(1);
        Self {
            num: num / g,
            den: den / g,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(25, 1)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for FrameRate {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ConfigParseError::Rate(s.to_string());
        match s.to_ascii_lowercase().as_str() {
            "ntsc" => return Ok(Self::new(30000, 1001)),
            "pal" => return Ok(Self::new(25, 1)),
            _ => {}
        }
        if let Some((num, den)) = s.split_once('/') {
            let num: u32 = num.trim().parse().map_err(|_| err())?;
            let den: u32 = den.trim().parse().map_err(|_| err())?;
            if den == 0 {
                return Err(err());
            }
            return Ok(Self::new(num, den));
        }
        match s.split_once('.') {
            None => Ok(Self::new(s.parse().map_err(|_| err())?, 1)),
            Some((int, frac)) => {
                if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                let den = 10u32.pow(frac.len() as u32);
                let int: u32 = if int.is_empty() {
                    0
                } else {
                    int.parse().map_err(|_| err())?
                };
                let frac: u32 = if frac.is_empty() {
                    0
                } else {
                    frac.parse().map_err(|_| err())?
                };
                let num = int
                    .checked_mul(den)
                    .and_then(|n| n.checked_add(frac))
                    .ok_or_else(err)?;
                Ok(Self::new(num, den))
            }
        }
    }
}

/// YAML gives `25` as a number and `30000/1001` as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RateValue {
    Int(u32),
    Float(f64),
    Text(String),
}

impl TryFrom<RateValue> for FrameRate {
    type Error = ConfigParseError;

    fn try_from(value: RateValue) -> Result<Self, Self::Error> {
        match value {
            RateValue::Int(n) => Ok(Self::new(n, 1)),
            RateValue::Float(f) => f.to_string().parse(),
            RateValue::Text(s) => s.parse(),
        }
    }
}

impl From<FrameRate> for String {
    fn from(rate: FrameRate) -> Self {
        rate.to_string()
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.size, FrameSize::new(640, 480));
        assert_eq!(config.rate, FrameRate::new(25, 1));
        assert_eq!(config.end_pts, 400.0);
        assert_eq!(config.expressions, ExprSet::default());
        assert!(config.url.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config.time_base(), 0.04);
        assert_eq!(config.frame_count(), 400);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!("256x128".parse::<FrameSize>().unwrap(), FrameSize::new(256, 128));
        assert_eq!("hd720".parse::<FrameSize>().unwrap(), FrameSize::new(1280, 720));
        assert_eq!("VGA".parse::<FrameSize>().unwrap(), FrameSize::new(640, 480));
        assert!("256".parse::<FrameSize>().is_err());
        assert!("ax2".parse::<FrameSize>().is_err());
        assert!("-1x2".parse::<FrameSize>().is_err());
    }

    #[test]
    fn test_size_check() {
        assert!(FrameSize::new(0, 10).check().is_err());
        assert!(FrameSize::new(10, 0).check().is_err());
        assert!(FrameSize::new(100_000, 100_000).check().is_err());
        assert!(FrameSize::new(1920, 1080).check().is_ok());
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!("25".parse::<FrameRate>().unwrap(), FrameRate::new(25, 1));
        assert_eq!("30000/1001".parse::<FrameRate>().unwrap(), FrameRate::new(30000, 1001));
        assert_eq!("ntsc".parse::<FrameRate>().unwrap(), FrameRate::new(30000, 1001));
        assert_eq!("pal".parse::<FrameRate>().unwrap(), FrameRate::new(25, 1));
        assert_eq!("12.5".parse::<FrameRate>().unwrap(), FrameRate::new(25, 2));
        assert_eq!("50/2".parse::<FrameRate>().unwrap(), FrameRate::new(25, 1));
        assert!("1/0".parse::<FrameRate>().is_err());
        assert!("fast".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_yaml_with_aliases() {
        let config = SourceConfig::from_yaml(
            r#"
s: 256x256
r: 10
end_pts: 3
x1: "t - 10"
url: http://example/wms
layers: roads,rivers
"#,
        )
        .unwrap();
        assert_eq!(config.size, FrameSize::new(256, 256));
        assert_eq!(config.rate, FrameRate::new(10, 1));
        assert_eq!(config.end_pts, 3.0);
        assert_eq!(config.expressions.x1, "t - 10");
        assert_eq!(config.expressions.x2, "180");
        assert_eq!(config.url.as_deref(), Some("http://example/wms"));
        assert_eq!(config.layers, "roads,rivers");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_fractional_rates() {
        let config = SourceConfig::from_yaml("rate: 12.5\n").unwrap();
        assert_eq!(config.rate, FrameRate::new(25, 2));
        let config = SourceConfig::from_yaml("rate: 24000/1001\n").unwrap();
        assert_eq!(config.rate, FrameRate::new(24000, 1001));
    }

    #[test]
    fn test_yaml_bad_size_is_configuration_error() {
        let err = SourceConfig::from_yaml("size: huge\n").unwrap_err();
        assert_eq!(err.category(), "ConfigurationError");
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = SourceConfig {
            rate: FrameRate { num: 0, den: 1 },
            ..SourceConfig::default()
        };
        assert!(config.validate().is_err());

        config = SourceConfig {
            end_pts: -1.0,
            ..SourceConfig::default()
        };
        assert!(config.validate().is_err());

        config = SourceConfig::default();
        config.expressions.y2 = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("y2"));

        config = SourceConfig {
            url: Some("ftp://example/wms".to_string()),
            ..SourceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        std::fs::write(&path, "size: qvga\n").unwrap();
        let config = SourceConfig::from_file(&path).unwrap();
        assert_eq!(config.size, FrameSize::new(320, 240));

        let err = SourceConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.is_fatal_at_init());
    }
}
