//! Command line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use map_source::{FrameRate, FrameSize, SourceConfig};

#[derive(Parser, Debug)]
#[command(name = "wms-video")]
#[command(about = "Render a sequence of WMS map images as video frames", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Serve Prometheus metrics on this address
    #[arg(long, global = true, env = "METRICS_LISTEN")]
    pub metrics_listen: Option<SocketAddr>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Produce frames until end_pts is reached
    Render(RenderArgs),

    /// Resolve the service and print the request template as JSON
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Concurrent frame requests
    #[arg(short, long, default_value = "1")]
    pub workers: usize,

    /// Output directory for PNG frames, or "-" for raw RGB0 on stdout
    #[arg(short, long)]
    pub output: String,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Source options. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// YAML source configuration
    #[arg(short, long, env = "WMS_VIDEO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Frame size (WxH or a name such as vga, hd720)
    #[arg(short, long)]
    pub size: Option<FrameSize>,

    /// Frame rate (25, 29.97, 30000/1001, ntsc, pal)
    #[arg(short, long)]
    pub rate: Option<FrameRate>,

    /// Terminal pts
    #[arg(long)]
    pub end_pts: Option<f64>,

    /// Reference x expression
    #[arg(long, allow_hyphen_values = true)]
    pub xref: Option<String>,

    /// Reference y expression
    #[arg(long, allow_hyphen_values = true)]
    pub yref: Option<String>,

    /// West edge expression
    #[arg(long, allow_hyphen_values = true)]
    pub x1: Option<String>,

    /// East edge expression
    #[arg(long, allow_hyphen_values = true)]
    pub x2: Option<String>,

    /// South edge expression
    #[arg(long, allow_hyphen_values = true)]
    pub y1: Option<String>,

    /// North edge expression
    #[arg(long, allow_hyphen_values = true)]
    pub y2: Option<String>,

    /// Capabilities URL of the map service
    #[arg(short, long, env = "WMS_URL")]
    pub url: Option<String>,

    /// Comma separated layer list
    #[arg(short, long)]
    pub layers: Option<String>,
}

impl SourceArgs {
    /// Merge the configuration file (if any) with the command line.
    pub fn to_config(&self) -> Result<SourceConfig> {
        let mut config = match &self.config {
            Some(path) => SourceConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SourceConfig::default(),
        };

        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(rate) = self.rate {
            config.rate = rate;
        }
        if let Some(end_pts) = self.end_pts {
            config.end_pts = end_pts;
        }
        let exprs = &mut config.expressions;
        for (target, value) in [
            (&mut exprs.xref, &self.xref),
            (&mut exprs.yref, &self.yref),
            (&mut exprs.x1, &self.x1),
            (&mut exprs.x2, &self.x2),
            (&mut exprs.y1, &self.y1),
            (&mut exprs.y2, &self.y2),
        ] {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        if let Some(url) = &self.url {
            config.url = Some(url.clone());
        }
        if let Some(layers) = &self.layers {
            config.layers = layers.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "wms-video",
            "render",
            "--size",
            "hd720",
            "--rate",
            "ntsc",
            "--x1",
            "-10",
            "--url",
            "http://example/wms",
            "--workers",
            "4",
            "--output",
            "-",
        ])
        .unwrap();

        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.workers, 4);
        assert_eq!(args.output, "-");
        let config = args.source.to_config().unwrap();
        assert_eq!(config.size, FrameSize::new(1280, 720));
        assert_eq!(config.rate, FrameRate::new(30000, 1001));
        assert_eq!(config.expressions.x1, "-10");
        assert_eq!(config.expressions.x2, "180");
        assert_eq!(config.url.as_deref(), Some("http://example/wms"));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.yaml");
        std::fs::write(&path, "size: 64x32\nend_pts: 10\nlayers: roads\n").unwrap();

        let args = SourceArgs {
            config: Some(path),
            end_pts: Some(3.0),
            ..SourceArgs::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.size, FrameSize::new(64, 32));
        assert_eq!(config.end_pts, 3.0);
        assert_eq!(config.layers, "roads");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = SourceArgs {
            y2: Some(String::new()),
            ..SourceArgs::default()
        };
        assert!(args.to_config().is_err());
    }
}
