//! Converts an animated GIF into a frame directory for facebox-player.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use facebox::convert::{DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, convert_gif};
use log::info;

#[derive(Parser, Debug)]
#[command(
    name = "facebox-gif2frames",
    about = "Split an animated GIF into .bmp frames sized for the display",
    after_help = "Example:\n  facebox-gif2frames boot.gif booting"
)]
struct Args {
    /// Largest frame width after scaling
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    max_width: u32,

    /// Largest frame height after scaling
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    max_height: u32,

    gif: PathBuf,

    /// Directory to write frames into, created if missing
    output: PathBuf,
}

fn main() -> Result<()> {
    facebox::init_logging(log::LevelFilter::Info);
    let args = Args::parse();

    let written = convert_gif(&args.gif, &args.output, args.max_width, args.max_height)
        .with_context(|| format!("failed to convert {}", args.gif.display()))?;
    info!(
        "wrote {written} frames from {} to {}",
        args.gif.display(),
        args.output.display()
    );
    Ok(())
}
