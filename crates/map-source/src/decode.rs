//! GetMap payload decoding.
//!
//! Whatever the server returns (PNG, JPEG, with or without alpha) is
//! converted to packed RGB0 at the configured frame size.

use bytes::Bytes;
use image::imageops::FilterType;
use tracing::debug;
use wms_common::{WmsError, WmsResult};

use crate::config::FrameSize;

/// Decode an image payload into an RGB0 buffer of exactly `size`.
pub fn decode_rgb0(payload: &[u8], size: FrameSize, url: &str) -> WmsResult<Bytes> {
    let decoded = image::load_from_memory(payload).map_err(|e| WmsError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let decoded = if decoded.width() != size.width || decoded.height() != size.height {
        debug!(
            got_width = decoded.width(),
            got_height = decoded.height(),
            want = %size,
            "resizing map image"
        );
        decoded.resize_exact(size.width, size.height, FilterType::Triangle)
    } else {
        decoded
    };

    let rgb = decoded.to_rgb8();
    let mut out = Vec::new();
    out.try_reserve_exact(size.frame_bytes()).map_err(|e| {
        WmsError::Resource(format!("cannot allocate {} frame: {}", size, e))
    })?;
    for px in rgb.pixels() {
        out.extend_from_slice(&[px[0], px[1], px[2], 0xFF]);
    }
    Ok(Bytes::from(out))
}
