//! Driver for the WMS map video source.
//!
//! Builds a [`map_source::MapSource`] from YAML and flags, then either
//! renders frames to PNG files or raw stdout, or prints what the source
//! resolved.

pub mod args;
pub mod probe;
pub mod render;
pub mod sink;

pub use args::{Cli, Commands, ProbeArgs, RenderArgs, SourceArgs};
pub use probe::ProbeReport;
pub use render::{render, ReorderBuffer, RenderSummary};
pub use sink::{FrameSink, PngDirSink, RawSink};
