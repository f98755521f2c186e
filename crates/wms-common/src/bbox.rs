//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box requested from a map service.
///
/// `x1`/`y1` are the west/south edges and `x2`/`y2` the east/north edges,
/// in the units of the request CRS (degrees for EPSG:4326). The box is
/// produced by user expressions, so nothing forces `x1 <= x2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a new bounding box from west, south, east, north.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The whole world in EPSG:4326.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Format as the value of a WMS `bbox` query parameter.
    ///
    /// Every edge is printed with six decimals so the same box always
    /// produces the same request URL.
    pub fn to_wms_string(&self) -> String {
        self.to_wms_string_with(",")
    }

    /// Like [`to_wms_string`](Self::to_wms_string), with the edges joined by
    /// `separator` (for example an already percent-encoded comma).
    pub fn to_wms_string_with(&self, separator: &str) -> String {
        format!(
            "{:.6}{sep}{:.6}{sep}{:.6}{sep}{:.6}",
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            sep = separator
        )
    }
}
