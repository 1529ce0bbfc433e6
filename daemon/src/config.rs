use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::DaemonError;

/// An external program followed by any leading arguments, e.g.
/// `["amixer", "-c", "0"]`. Per-call arguments are appended after these.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExternalCommand(pub Vec<String>);

impl ExternalCommand {
    pub fn program(program: &str) -> Self {
        Self(vec![program.to_string()])
    }

    pub fn to_command(&self) -> std::io::Result<Command> {
        let (program, args) = self.0.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
        })?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub power_input_path: PathBuf,
    pub volume_input_path: PathBuf,

    pub battery_status_path: PathBuf,
    pub battery_capacity_path: PathBuf,
    pub led_brightness_path: PathBuf,
    pub led_trigger_path: PathBuf,
    pub led_blink_ms: u64,

    pub mixer_command: ExternalCommand,
    pub mixer_control: String,

    pub text_command: ExternalCommand,
    pub text_font_size: u32,
    pub text_color: String,
    pub status_flash_ms: u64,
    pub volume_flash_ms: u64,

    pub renderer_command: ExternalCommand,
    pub boot_animation: PathBuf,
    pub boot_frame_delay_ms: u64,
    pub charging_animation: PathBuf,
    pub animations_root: PathBuf,
    pub frame_delay_ms: u64,

    pub script_table_path: PathBuf,

    pub poll_interval_ms: u64,
    pub double_click_ms: u64,
    pub long_press_ms: u64,
    pub idle_threshold_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            power_input_path: "/dev/input/event0".into(),
            volume_input_path: "/dev/input/event1".into(),
            battery_status_path: "/sys/class/power_supply/axp20x-battery/status".into(),
            battery_capacity_path: "/sys/class/power_supply/axp20x-battery/capacity".into(),
            led_brightness_path: "/sys/class/leds/aku-logo/brightness".into(),
            led_trigger_path: "/sys/class/leds/aku-logo/trigger".into(),
            led_blink_ms: 100,
            mixer_command: ExternalCommand::program("amixer"),
            mixer_control: "Power Amplifier".to_string(),
            text_command: ExternalCommand::program("./show_text"),
            text_font_size: 24,
            text_color: "0xFFFF".to_string(),
            status_flash_ms: 1000,
            volume_flash_ms: 500,
            renderer_command: ExternalCommand::program("./facebox-player"),
            boot_animation: "./booting".into(),
            boot_frame_delay_ms: 20,
            charging_animation: "./charging".into(),
            animations_root: "./emotions".into(),
            frame_delay_ms: 100,
            script_table_path: "./key_config.json".into(),
            poll_interval_ms: 100,
            double_click_ms: 300,
            long_press_ms: 800,
            idle_threshold_secs: 5,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn long_press_window(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }
}

pub async fn parse_config<P>(path: P) -> Result<Config, DaemonError>
where
    P: AsRef<Path>,
{
    if let Ok(config_file) = tokio::fs::read_to_string(&path).await {
        Ok(toml::from_str(&config_file)?)
    } else {
        warn!(
            "unable to read config file {}, using default config",
            path.as_ref().display()
        );
        Ok(Config::default())
    }
}
