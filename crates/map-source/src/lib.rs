//! A video source that renders one WMS map image per frame.
//!
//! [`MapSource`] ties together capability discovery, GetMap templating and
//! the per-frame bbox expressions, and hands out timestamped RGB0 frames.

pub mod clock;
pub mod config;
pub mod decode;
pub mod frame;
pub mod metrics;
pub mod source;

pub use clock::FrameClock;
pub use config::{ConfigParseError, FrameRate, FrameSize, SourceConfig};
pub use frame::{Frame, PixelFormat};
pub use metrics::{MetricsSnapshot, SourceMetrics};
pub use source::{MapSource, SourceState};
