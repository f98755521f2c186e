//! Shared test utilities for the wms-video workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Capability document fixtures for every WMS version
//! - PNG payload generators standing in for GetMap responses
//! - Approximate floating-point assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{capabilities, png_bytes};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of the four edges of a bounding box.
///
/// The left side is anything with `x1`, `y1`, `x2`, `y2` fields; the right
/// side is a `(west, south, east, north)` tuple.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_bbox_approx_eq;
///
/// assert_bbox_approx_eq!(bbox, (-180.0, -90.0, 180.0, 90.0), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_bbox_approx_eq {
    ($bbox:expr, ($x1:expr, $y1:expr, $x2:expr, $y2:expr), $epsilon:expr) => {{
        let bbox = &$bbox;
        $crate::assert_approx_eq!(bbox.x1, $x1, $epsilon);
        $crate::assert_approx_eq!(bbox.y1, $y1, $epsilon);
        $crate::assert_approx_eq!(bbox.x2, $x2, $epsilon);
        $crate::assert_approx_eq!(bbox.y2, $y2, $epsilon);
    }};
}
