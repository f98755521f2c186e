use serde::Serialize;
use wms_protocol::ServiceDescriptor;

use map_source::{FrameRate, FrameSize, MapSource};

/// What `wms-video probe` prints.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// `None` when the built-in service is used.
    pub service: Option<ServiceDescriptor>,
    pub template: String,
    pub first_url: String,
    pub size: FrameSize,
    pub rate: FrameRate,
    pub time_base: f64,
    pub frames: u64,
}

impl ProbeReport {
    pub fn from_source(source: &MapSource) -> Self {
        let config = source.config();
        let (_, first_url) = source.request_at(source.next_pts() as f64 * source.time_base());

        Self {
            service: source.descriptor().cloned(),
            template: source.template().pattern(),
            first_url,
            size: config.size,
            rate: config.rate,
            time_base: source.time_base(),
            frames: config.frame_count(),
        }
    }
}
