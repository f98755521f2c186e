//! Pulling frames from a source with several requests in flight.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use map_source::{Frame, MapSource};
use serde::Serialize;
use tracing::{debug, info};

use crate::sink::FrameSink;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderSummary {
    pub frames: u64,
    pub first_pts: u64,
    pub elapsed_ms: f64,
}

/// Produce `frames` frames with up to `workers` concurrent requests and
/// hand them to `sink` in pts order.
///
/// Each request reads its map time when it starts, while pts is taken when
/// it completes. With more than one worker, requests started together share
/// a map time, so adjacent frames may repeat the same map. Frames still get
/// distinct, contiguous pts.
///
/// The first failing frame aborts the run; frames still in flight are
/// dropped.
pub async fn render(
    source: Arc<MapSource>,
    frames: u64,
    workers: usize,
    sink: &mut dyn FrameSink,
) -> Result<RenderSummary> {
    let started = Instant::now();
    let first_pts = source.next_pts();
    let mut pending = ReorderBuffer::new(first_pts);

    let mut results = stream::iter(0..frames)
        .map(|_| {
            let source = Arc::clone(&source);
            async move { source.produce_frame().await }
        })
        .buffer_unordered(workers.max(1));

    while let Some(result) = results.next().await {
        let frame = result.with_context(|| {
            format!("producing frame after pts {}", pending.next_pts())
        })?;
        debug!(pts = frame.pts, "frame ready");
        for frame in pending.push(frame) {
            sink.write_frame(&frame)?;
        }
    }
    sink.finish()?;

    let summary = RenderSummary {
        frames,
        first_pts,
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
    };
    info!(
        frames = summary.frames,
        elapsed_ms = summary.elapsed_ms,
        "render complete"
    );
    Ok(summary)
}

/// Holds frames that finished early until every smaller pts has arrived.
#[derive(Debug)]
pub struct ReorderBuffer {
    next: u64,
    waiting: BTreeMap<u64, Frame>,
}

impl ReorderBuffer {
    pub fn new(first_pts: u64) -> Self {
        Self {
            next: first_pts,
            waiting: BTreeMap::new(),
        }
    }

    pub fn next_pts(&self) -> u64 {
        self.next
    }

    /// Add a frame and return every frame that is now ready, in order.
    pub fn push(&mut self, frame: Frame) -> Vec<Frame> {
        self.waiting.insert(frame.pts, frame);
        let mut ready = Vec::new();
        while let Some(frame) = self.waiting.remove(&self.next) {
            self.next += 1;
            ready.push(frame);
        }
        ready
    }

    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }
}
