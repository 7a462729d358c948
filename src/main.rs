use anyhow::Result;
use clap::Parser;
use tracing::info;

mod config;
mod error;
mod face;
mod host;
mod render;

use crate::config::FaceConfig;
use crate::host::runtime::WatchRuntime;

#[derive(Parser, Debug)]
#[command(
    name = "oled-saver",
    about = "Digital watch face that moves the time every minute to avoid burn-in"
)]
struct Args {
    /// Display width in pixels
    #[arg(long, default_value_t = 454)]
    width: u32,

    /// Display height in pixels
    #[arg(long, default_value_t = 454)]
    height: u32,

    /// Display shape: round, rect
    #[arg(long, default_value = "round")]
    shape: String,

    /// Minimum combined edge clearance on round displays (px)
    #[arg(long, default_value_t = 20)]
    clearance: i32,

    /// Placement attempts before using the best sample
    #[arg(long, default_value_t = 50)]
    max_attempts: u32,

    /// TrueType font for the time text
    #[arg(short, long, default_value = "assets/DejaVuSans.ttf")]
    font: String,

    /// Time text size in pixels
    #[arg(long, default_value_t = 120.0)]
    text_size: f32,

    /// Notification dot anchor: below, within
    #[arg(long, default_value = "below")]
    dot_anchor: String,

    /// Unread notification count at startup
    #[arg(long, default_value_t = 0)]
    unread: u32,

    /// Output mode: png, raw, none
    #[arg(long, default_value = "png")]
    output: String,

    /// Output file path (for png mode)
    #[arg(long, default_value = "face.png")]
    output_path: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // logs go to stderr so raw frames can own stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        "oled-saver v{} starting ({}x{} {})",
        env!("CARGO_PKG_VERSION"),
        args.width,
        args.height,
        args.shape
    );

    let defaults = FaceConfig::default();
    let config = FaceConfig {
        width: args.width,
        height: args.height,
        shape: args.shape.parse().map_err(anyhow::Error::msg)?,
        min_clearance: args.clearance,
        max_attempts: args.max_attempts,
        font_path: args.font.into(),
        text_size: args.text_size,
        dot_anchor: args.dot_anchor.parse().map_err(anyhow::Error::msg)?,
        unread: args.unread,
        output_mode: args.output.parse().unwrap_or(defaults.output_mode),
        output_path: args.output_path.into(),
    };

    let mut runtime = WatchRuntime::new(config)?;

    // Control commands from stdin in background
    let control_handle = tokio::spawn(host::events::read_stdin(runtime.event_sender()));

    runtime.run().await?;

    control_handle.abort();
    info!("oled-saver shutdown");
    Ok(())
}
