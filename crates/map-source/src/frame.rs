use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use wms_common::BoundingBox;

/// Layout of [`Frame::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Packed R, G, B and one unused byte (always 0xFF) per pixel.
    Rgb0,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb0 => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Rgb0 => f.write_str("rgb0"),
        }
    }
}

/// One decoded map image with its timestamp.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pts: u64,
    /// In pts ticks; always 1.
    pub duration: u64,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// `height` rows of `width * 4` bytes, top row first.
    pub data: Bytes,
    /// The box this frame shows.
    pub bbox: BoundingBox,
    /// The request the image came from.
    pub url: String,
}

impl Frame {
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Pixel at (x, y) as `[r, g, b, pad]`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
