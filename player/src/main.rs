//! Plays a directory of bitmap frames on the framebuffer.
//!
//! Spawned by facebox-daemon, one process per animation, and stopped with
//! SIGTERM when the daemon wants the screen for something else.

mod framebuffer;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use facebox::compositor::{Compositor, FrameSink};
use facebox::frames::FrameSequence;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::framebuffer::Framebuffer;

#[derive(Parser, Debug)]
#[command(
    name = "facebox-player",
    about = "Play a directory of .bmp frames on the framebuffer",
    after_help = "Example:\n  facebox-player -d 200 -l bmp_sequence"
)]
struct Args {
    /// Delay between frames in milliseconds
    #[arg(short = 'd', long = "delay", default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    delay_ms: u64,

    /// Play the animation once (default: loop forever)
    #[arg(short = 'l', long = "loop")]
    once: bool,

    /// Framebuffer device to draw on
    #[arg(long, default_value = "/dev/fb0")]
    framebuffer: PathBuf,

    /// Directory of frames, played in file name order
    directory: PathBuf,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Finished,
    Cancelled,
}

/// Show every frame in order, `delay` apart, until the sequence is done (or
/// forever unless `once`). Frames that fail to decode are skipped without
/// waiting.
async fn play<S: FrameSink>(
    compositor: &mut Compositor<S>,
    frames: &FrameSequence,
    delay: Duration,
    once: bool,
    shutdown_token: &CancellationToken,
) -> Result<Outcome> {
    loop {
        let mut shown = 0;
        for frame in frames.iter() {
            if shutdown_token.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            if let Err(e) = compositor.show_file(frame) {
                warn!("skipping {}: {e}", frame.display());
                continue;
            }
            shown += 1;

            tokio::select! {
                _ = shutdown_token.cancelled() => return Ok(Outcome::Cancelled),
                _ = tokio::time::sleep(delay) => {},
            }
        }

        if shown == 0 {
            bail!("none of the {} frames could be decoded", frames.len());
        }
        if once {
            return Ok(Outcome::Finished);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let framebuffer = Framebuffer::open(&args.framebuffer)?;
    let geometry = framebuffer.geometry();
    info!(
        "screen {}x{}, {} bpp, line length {}",
        geometry.width, geometry.height, geometry.bits_per_pixel, geometry.line_length
    );

    let frames = FrameSequence::scan(&args.directory)?;
    info!("found {} frames in {}", frames.len(), args.directory.display());

    let mut compositor = Compositor::new(framebuffer).context("unusable framebuffer")?;

    let shutdown_token = CancellationToken::new();
    facebox::shutdown::cancel_on_signal(shutdown_token.clone());

    let delay = Duration::from_millis(args.delay_ms);
    match play(&mut compositor, &frames, delay, args.once, &shutdown_token).await? {
        Outcome::Finished => info!("animation finished"),
        Outcome::Cancelled => info!("animation stopped"),
    }
    Ok(())
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        // usage errors exit with 1 like every other startup failure
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}

fn main() -> Result<()> {
    facebox::init_logging(log::LevelFilter::Info);
    let args = parse_args();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(run(args))
}
