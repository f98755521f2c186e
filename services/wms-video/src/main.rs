//! WMS video frame renderer.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use map_source::MapSource;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wms_protocol::{HttpTransport, Transport};

use wms_video::{render, Cli, Commands, FrameSink, PngDirSink, ProbeReport, RawSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli)?;

    if let Some(addr) = cli.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("installing Prometheus exporter")?;
        info!(%addr, "Prometheus metrics exporter listening");
    }

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);

    match cli.command {
        Commands::Render(args) => {
            let config = args.source.to_config()?;
            let frames = config.frame_count();
            let source = Arc::new(
                MapSource::init(config, transport)
                    .await
                    .context("initializing map source")?,
            );

            let mut sink: Box<dyn FrameSink> = if args.output == "-" {
                Box::new(RawSink::new(std::io::stdout().lock()))
            } else {
                Box::new(PngDirSink::create(&args.output)?)
            };

            info!(frames, workers = args.workers, output = %args.output, "rendering");
            let result = render(Arc::clone(&source), frames, args.workers, sink.as_mut()).await;
            source.stop();
            let summary = result?;

            let metrics = source.metrics().snapshot();
            info!(
                frames = summary.frames,
                elapsed_ms = summary.elapsed_ms,
                avg_fetch_ms = metrics.avg_fetch_ms,
                max_fetch_ms = metrics.max_fetch_ms,
                "done"
            );
        }
        Commands::Probe(args) => {
            let config = args.source.to_config()?;
            let source = MapSource::init(config, transport)
                .await
                .context("initializing map source")?;
            let report = ProbeReport::from_source(&source);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout may carry raw frames, so logs go to stderr.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    if cli.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
