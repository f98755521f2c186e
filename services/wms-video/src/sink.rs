//! Frame outputs.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use map_source::Frame;

/// Receives frames in pts order.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes `frame_NNNNNN.png` files, named by pts.
pub struct PngDirSink {
    dir: PathBuf,
}

impl PngDirSink {
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn frame_path(&self, pts: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", pts))
    }
}

impl FrameSink for PngDirSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let rgb: Vec<u8> = frame
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let img = RgbImage::from_raw(frame.width, frame.height, rgb)
            .context("frame buffer does not match its size")?;
        let path = self.frame_path(frame.pts);
        img.save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Writes packed RGB0 frames back to back.
pub struct RawSink<W: Write> {
    out: W,
}

impl<W: Write> RawSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for RawSink<W> {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.out
            .write_all(&frame.data)
            .with_context(|| format!("writing frame {}", frame.pts))
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("flushing output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use map_source::PixelFormat;
    use wms_common::BoundingBox;

    fn frame(pts: u64) -> Frame {
        Frame {
            pts,
            duration: 1,
            width: 2,
            height: 1,
            format: PixelFormat::Rgb0,
            data: Bytes::from_static(&[1, 2, 3, 0xFF, 4, 5, 6, 0xFF]),
            bbox: BoundingBox::world(),
            url: "http://example/wms/getmap".to_string(),
        }
    }

    #[test]
    fn test_png_dir_sink_names_by_pts() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngDirSink::create(dir.path().join("out")).unwrap();
        sink.write_frame(&frame(12)).unwrap();

        let written = image::open(dir.path().join("out/frame_000012.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(written.dimensions(), (2, 1));
        assert_eq!(written.get_pixel(1, 0).0, [4, 5, 6]);
    }

    #[test]
    fn test_raw_sink_concatenates() {
        let mut sink = RawSink::new(Vec::new());
        sink.write_frame(&frame(0)).unwrap();
        sink.write_frame(&frame(1)).unwrap();
        sink.finish().unwrap();
        let out = sink.into_inner();
        assert_eq!(out.len(), 16);
        assert_eq!(&out[8..12], &[1, 2, 3, 0xFF]);
    }
}
