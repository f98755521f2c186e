//! Test payload generators standing in for GetMap responses.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

/// Encode a solid-color PNG of the given size.
///
/// # Example
///
/// ```
/// use test_utils::png_bytes;
///
/// let png = png_bytes(4, 2, [255, 0, 0, 255]);
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Encode a PNG where each pixel is `(x % 256, y % 256, 128, 255)`.
///
/// Useful for checking that decoding keeps rows and columns in place.
pub fn gradient_png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_png(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    }))
}

fn encode_png(img: RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_bytes_decodes_to_requested_size() {
        let png = png_bytes(7, 3, [1, 2, 3, 255]);
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (7, 3));
        assert_eq!(decoded.get_pixel(6, 2).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_gradient_png_pixels() {
        let png = gradient_png_bytes(300, 2);
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(299, 1).0, [43, 1, 128, 255]);
    }
}
