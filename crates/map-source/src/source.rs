//! The map video source.
//!
//! Each frame runs the same cycle: evaluate the bbox expressions at the
//! current time, fill the GetMap template, fetch and decode the image, then
//! take a pts from the shared clock. Only the last step is serialized, so
//! concurrent callers fetch in parallel but still receive distinct,
//! increasing timestamps.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bbox_expr::BboxExpressions;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use wms_common::{BoundingBox, WmsError, WmsResult};
use wms_protocol::getmap::FALLBACK_ENDPOINT;
use wms_protocol::{resolve, RequestTemplate, ServiceDescriptor, Transport};

use crate::clock::FrameClock;
use crate::config::SourceConfig;
use crate::decode::decode_rgb0;
use crate::frame::{Frame, PixelFormat};
use crate::metrics::SourceMetrics;

/// Lifecycle of a [`MapSource`]. A source only exists once initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Initialized,
    Producing,
    Terminated,
}

impl SourceState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SourceState::Initialized,
            1 => SourceState::Producing,
            _ => SourceState::Terminated,
        }
    }
}

pub struct MapSource {
    config: SourceConfig,
    time_base: f64,
    descriptor: Option<ServiceDescriptor>,
    template: RequestTemplate,
    expressions: BboxExpressions,
    transport: Arc<dyn Transport>,
    clock: FrameClock,
    state: AtomicU8,
    metrics: SourceMetrics,
}

impl std::fmt::Debug for MapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSource")
            .field("config", &self.config)
            .field("descriptor", &self.descriptor)
            .field("template", &self.template)
            .field("state", &self.state())
            .field("next_pts", &self.clock.current())
            .finish_non_exhaustive()
    }
}

impl MapSource {
    /// Validate the configuration, compile the expressions and, when a
    /// `url` is configured, resolve the service's capabilities.
    ///
    /// Any error here is fatal: the source is never created.
    #[instrument(skip_all, fields(url = config.url.as_deref().unwrap_or(FALLBACK_ENDPOINT)))]
    pub async fn init(config: SourceConfig, transport: Arc<dyn Transport>) -> WmsResult<Self> {
        config.validate()?;
        let expressions = BboxExpressions::compile(&config.expressions)?;
        let (width, height) = (config.size.width, config.size.height);

        let (descriptor, template) = match config.url.as_deref() {
            Some(url) => {
                let descriptor = resolve(transport.as_ref(), url).await?;
                let template = RequestTemplate::build(&descriptor, &config.layers, width, height)?;
                (Some(descriptor), template)
            }
            None => {
                debug!("no capabilities url, using the built-in service");
                (None, RequestTemplate::fallback(width, height)?)
            }
        };

        info!(
            size = %config.size,
            rate = %config.rate,
            version = descriptor.as_ref().map(|d| d.version.as_str()),
            template = %template.pattern(),
            "map source initialized"
        );

        Ok(Self {
            time_base: config.time_base(),
            config,
            descriptor,
            template,
            expressions,
            transport,
            clock: FrameClock::new(),
            state: AtomicU8::new(SourceState::Initialized as u8),
            metrics: SourceMetrics::new(),
        })
    }

    /// Produce the next frame.
    ///
    /// A failed call returns the error and leaves the pts counter untouched.
    /// Expressions are compiled by [`init`](Self::init), so expression
    /// errors surface there and never from this call.
    pub async fn produce_frame(&self) -> WmsResult<Frame> {
        self.start_producing()?;

        let t = self.clock.current() as f64 * self.time_base;
        let (bbox, url) = self.request_at(t);

        let data = match self.fetch_decode(&url).await {
            Ok(data) => data,
            Err(e) => {
                self.metrics.record_error(e.category());
                warn!(error = %e, category = e.category(), t, "frame production failed");
                return Err(e);
            }
        };

        // The source may have been stopped while the fetch was in flight.
        self.ensure_not_terminated()?;

        let pts = self.clock.advance(|pts| {
            info!(
                "Draw from pts: {} [({:.6} {:.6}), ({:.6} {:.6})]",
                pts, bbox.x1, bbox.y1, bbox.x2, bbox.y2
            );
            info!("Used url: {}", url);
        });
        self.metrics.record_frame();

        Ok(Frame {
            pts,
            duration: 1,
            width: self.config.size.width,
            height: self.config.size.height,
            format: PixelFormat::Rgb0,
            data,
            bbox,
            url,
        })
    }

    /// Stop producing. Later [`produce_frame`](Self::produce_frame) calls fail.
    pub fn stop(&self) {
        let previous = self
            .state
            .swap(SourceState::Terminated as u8, Ordering::AcqRel);
        if SourceState::from_u8(previous) != SourceState::Terminated {
            let m = self.metrics.snapshot();
            info!(
                frames = m.frames,
                errors = m.errors,
                next_pts = self.clock.current(),
                "map source stopped"
            );
        }
    }

    /// The box and GetMap URL for frame time `t`, without fetching.
    pub fn request_at(&self, t: f64) -> (BoundingBox, String) {
        let bbox = self.expressions.evaluate(t);
        let url = self.template.fill(&bbox);
        (bbox, url)
    }

    async fn fetch_decode(&self, url: &str) -> WmsResult<Bytes> {
        let started = Instant::now();
        let payload = self.transport.get(url).await?;
        self.metrics.record_fetch(started.elapsed());

        let size = self.config.size;
        let url = url.to_string();
        tokio::task::spawn_blocking(move || decode_rgb0(&payload, size, &url))
            .await
            .map_err(|e| WmsError::Resource(format!("decode task failed: {}", e)))?
    }

    fn start_producing(&self) -> WmsResult<()> {
        match self.state.compare_exchange(
            SourceState::Initialized as u8,
            SourceState::Producing as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(()),
            Err(_) => self.ensure_not_terminated(),
        }
    }

    fn ensure_not_terminated(&self) -> WmsResult<()> {
        if self.state() == SourceState::Terminated {
            return Err(WmsError::InvalidState("source has been stopped".to_string()));
        }
        Ok(())
    }

    pub fn state(&self) -> SourceState {
        SourceState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The resolved service, `None` when the built-in endpoint is used.
    pub fn descriptor(&self) -> Option<&ServiceDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// Seconds per pts tick.
    pub fn time_base(&self) -> f64 {
        self.time_base
    }

    /// The pts the next successful frame will get.
    pub fn next_pts(&self) -> u64 {
        self.clock.current()
    }

    pub fn metrics(&self) -> &SourceMetrics {
        &self.metrics
    }
}

impl Drop for MapSource {
    fn drop(&mut self) {
        self.stop();
    }
}
