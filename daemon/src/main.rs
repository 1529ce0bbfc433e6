use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use facebox_daemon::config::parse_config;
use facebox_daemon::error::DaemonError;
use facebox_daemon::input::{InputDevice, InputSource, spawn_reader};
use facebox_daemon::orchestrator::Orchestrator;
use log::{error, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

// readers parked in blocking reads on /dev/input never finish on their own
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(version, about = "Button handling and animation control for facebox devices")]
struct Args {
    #[arg(long, default_value = "./facebox.toml")]
    config: PathBuf,
}

async fn run(args: Args) -> Result<(), DaemonError> {
    let config = parse_config(&args.config).await?;

    let power = InputDevice::open(&config.power_input_path, InputSource::Power).await?;
    let volume = InputDevice::open(&config.volume_input_path, InputSource::Volume).await?;

    let shutdown_token = CancellationToken::new();
    facebox::shutdown::cancel_on_signal(shutdown_token.clone());

    let task_tracker = TaskTracker::new();
    let (tx, rx) = mpsc::channel(32);
    spawn_reader(&task_tracker, power, tx.clone(), shutdown_token.clone());
    spawn_reader(&task_tracker, volume, tx, shutdown_token.clone());
    task_tracker.close();

    let mut orchestrator = Orchestrator::new(&config);
    orchestrator.init_volume().await;
    orchestrator.boot(&shutdown_token).await;
    if !shutdown_token.is_cancelled() {
        orchestrator.run(rx, shutdown_token.clone()).await;
    } else {
        orchestrator.shutdown().await;
    }
    Ok(())
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}

fn main() {
    facebox::init_logging(log::LevelFilter::Info);
    let args = parse_args();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("{}", DaemonError::RuntimeError(e));
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(args));
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    match result {
        Ok(()) => info!("exiting"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
