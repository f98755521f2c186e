//! Common types shared by the WMS video source crates.

pub mod bbox;
pub mod error;
pub mod version;

pub use bbox::BoundingBox;
pub use error::{WmsError, WmsResult};
pub use version::{WmsVersion, EPSG_4326};
