//! The device control loop.
//!
//! One [`Orchestrator`] owns every piece of mutable device state: the click
//! classifier, the long-press counters, the script table, the renderer
//! supervisor and the [`DeviceMode`]. It is driven from a single task, so
//! none of that state is shared.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use facebox::Key;
use facebox::battery::format_battery_text;
use facebox::classifier::{Gesture, KeyAction, KeyClassifier};
use facebox::frames::list_animations;
use facebox::scripts::{LongPressCounters, ScriptTable};
use facebox::volume::step_volume;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use tokio::process::Command;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use crate::battery::Battery;
use crate::config::Config;
use crate::input::{InputSource, KeyEvent};
use crate::led::Led;
use crate::mixer::Mixer;
use crate::supervisor::AnimationSupervisor;
use crate::text::TextDisplay;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMode {
    pub animation_enabled: bool,
    pub is_idle: bool,
    pub charging_status: bool,
    pub current_volume: u8,
}

impl Default for DeviceMode {
    fn default() -> Self {
        Self {
            animation_enabled: true,
            is_idle: true,
            charging_status: false,
            current_volume: 0,
        }
    }
}

pub struct Orchestrator {
    classifier: KeyClassifier,
    counters: LongPressCounters,
    script_table_path: PathBuf,
    scripts: Option<ScriptTable>,

    supervisor: AnimationSupervisor,
    text: TextDisplay,
    mixer: Mixer,
    led: Led,
    battery: Battery,

    mode: DeviceMode,
    // None until the first key event, so a freshly booted device counts as
    // idle
    last_activity: Option<Instant>,

    poll_interval: Duration,
    idle_threshold: Duration,
    status_flash: Duration,
    volume_flash: Duration,
    boot_animation: PathBuf,
    boot_frame_delay: Duration,
    charging_animation: PathBuf,
    animations_root: PathBuf,
    frame_delay: Duration,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: KeyClassifier::new(config.double_click_window(), config.long_press_window()),
            counters: LongPressCounters::default(),
            script_table_path: config.script_table_path.clone(),
            scripts: None,
            supervisor: AnimationSupervisor::new(config.renderer_command.clone()),
            text: TextDisplay::new(
                config.text_command.clone(),
                config.text_font_size,
                config.text_color.clone(),
            ),
            mixer: Mixer::new(config.mixer_command.clone(), config.mixer_control.clone()),
            led: Led::new(
                config.led_brightness_path.clone(),
                config.led_trigger_path.clone(),
                Duration::from_millis(config.led_blink_ms),
            ),
            battery: Battery::new(
                config.battery_status_path.clone(),
                config.battery_capacity_path.clone(),
            ),
            mode: DeviceMode::default(),
            last_activity: None,
            poll_interval: config.poll_interval(),
            idle_threshold: config.idle_threshold(),
            status_flash: Duration::from_millis(config.status_flash_ms),
            volume_flash: Duration::from_millis(config.volume_flash_ms),
            boot_animation: config.boot_animation.clone(),
            boot_frame_delay: Duration::from_millis(config.boot_frame_delay_ms),
            charging_animation: config.charging_animation.clone(),
            animations_root: config.animations_root.clone(),
            frame_delay: Duration::from_millis(config.frame_delay_ms),
        }
    }

    pub fn mode(&self) -> &DeviceMode {
        &self.mode
    }

    /// Seed the cached volume from the mixer.
    pub async fn init_volume(&mut self) {
        match self.mixer.level().await {
            Ok(level) => {
                info!("current volume: {level}");
                self.mode.current_volume = level;
            }
            Err(e) => warn!("couldn't read initial volume: {e:#}"),
        }
    }

    /// Play the boot animation once and wait for it, unless shutdown arrives
    /// first.
    pub async fn boot(&mut self, shutdown_token: &CancellationToken) {
        let boot_animation = self.boot_animation.clone();
        tokio::select! {
            _ = shutdown_token.cancelled() => info!("shutdown requested during boot animation"),
            result = self.supervisor.play(&boot_animation, true, self.boot_frame_delay) => {
                if let Err(e) = result {
                    warn!("{e}");
                }
            }
        }
    }

    /// Run until `shutdown_token` is cancelled, then stop any animation.
    pub async fn run(&mut self, mut events: Receiver<KeyEvent>, shutdown_token: CancellationToken) {
        info!("monitoring keys");
        let mut events_open = true;
        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => break,
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        self.handle_event(event, Instant::now()).await;
                        while let Ok(event) = events.try_recv() {
                            self.handle_event(event, Instant::now()).await;
                        }
                    }
                    None => {
                        warn!("all input sources closed");
                        events_open = false;
                    }
                },
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
            self.tick(Instant::now()).await;
        }
        self.shutdown().await;
    }

    /// Feed one raw key event to the classifier. Every key event counts as
    /// activity, but only press and release edges drive classification.
    pub async fn handle_event(&mut self, event: KeyEvent, now: Instant) {
        self.last_activity = Some(now);
        self.mode.is_idle = false;

        if event.source == InputSource::Power && event.code != Key::POWER_CODE {
            return;
        }
        match event.value {
            1 => {
                if let Some(action) = self.classifier.press(event.code, now) {
                    self.dispatch(action).await;
                }
            }
            0 => self.classifier.release(now),
            _ => {}
        }
    }

    /// Periodic housekeeping: pending gestures, idle animations and the
    /// battery.
    pub async fn tick(&mut self, now: Instant) {
        if let Some(action) = self.classifier.poll(now) {
            self.dispatch(action).await;
        }
        self.handle_idle(now).await;
        if self.mode.is_idle {
            self.check_battery(now).await;
        }
    }

    pub async fn dispatch(&mut self, action: KeyAction) {
        let Some(key) = Key::from_code(action.code) else {
            debug!("ignoring {:?} on unknown key {}", action.gesture, action.code);
            return;
        };
        info!("{key}: {:?}", action.gesture);
        self.script_table();

        match (key, action.gesture) {
            (Key::Power, Gesture::SingleClick) => self.show_battery_info().await,
            (Key::Power, Gesture::DoubleClick) => self.toggle_animation().await,
            (Key::Power, Gesture::LongPress) => self.power_long_press().await,
            (Key::VolumeUp, Gesture::SingleClick) => self.update_volume(1).await,
            (Key::VolumeUp, Gesture::DoubleClick) => self.update_volume(3).await,
            (Key::VolumeDown, Gesture::SingleClick) => self.update_volume(-1).await,
            (Key::VolumeDown, Gesture::DoubleClick) => self.update_volume(-3).await,
            (key, Gesture::LongPress) => {
                let slot = self.counters.advance(key);
                self.run_long_press_script(key, slot).await;
            }
        }
    }

    fn script_table(&mut self) -> &ScriptTable {
        let path = &self.script_table_path;
        self.scripts.get_or_insert_with(|| match ScriptTable::load(path) {
            Ok(table) => {
                info!("loaded script table from {}", path.display());
                table
            }
            Err(e) => {
                warn!("{e}, long presses will only change display state");
                ScriptTable::default()
            }
        })
    }

    async fn flash_status(&self, text: &str, hold: Duration) {
        if !self.mode.animation_enabled {
            debug!("display disabled, not showing {text:?}");
            return;
        }
        self.text.flash(text, hold).await;
    }

    async fn show_battery_info(&mut self) {
        self.supervisor.stop().await;
        let status = match self.battery.status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("failed to read battery status: {e}");
                return;
            }
        };
        let capacity = match self.battery.capacity().await {
            Ok(capacity) => capacity,
            Err(e) => {
                warn!("failed to read battery capacity: {e}");
                return;
            }
        };
        let text = format_battery_text(&capacity, &status);
        self.flash_status(&text, self.status_flash).await;
    }

    async fn toggle_animation(&mut self) {
        self.supervisor.stop().await;
        self.mode.animation_enabled = !self.mode.animation_enabled;
        let state = if self.mode.animation_enabled {
            "Enabled"
        } else {
            "Disabled"
        };
        info!("animation {state}");
        self.text
            .flash(&format!("Animation: \n{state}"), self.status_flash)
            .await;
    }

    async fn power_long_press(&mut self) {
        let slot = self.counters.advance(Key::Power);
        if slot == 0 {
            self.supervisor.stop().await;
            self.mode.animation_enabled = false;
        } else {
            self.mode.animation_enabled = true;
        }
        self.run_long_press_script(Key::Power, slot).await;
    }

    async fn run_long_press_script(&mut self, key: Key, slot: usize) {
        let command = self.script_table().command(key, slot).map(str::to_owned);
        match command {
            Some(command) => {
                info!("{key} long press, running script {slot}: {command}");
                self.run_script(&command).await;
            }
            None => debug!("no script {slot} configured for {key}"),
        }
    }

    async fn run_script(&self, command: &str) {
        self.led.blink().await;
        let result = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match result {
            Ok(status) if !status.success() => warn!("script {command:?} exited with {status}"),
            Ok(_) => {}
            Err(e) => warn!("failed to run script {command:?}: {e}"),
        }
        self.led.blink().await;
    }

    /// Step the volume by `delta`, starting from the mixer's actual level.
    pub async fn update_volume(&mut self, delta: i32) {
        self.supervisor.stop().await;

        let current = match self.mixer.level().await {
            Ok(level) => level,
            Err(e) => {
                warn!("couldn't read volume, leaving it alone: {e:#}");
                return;
            }
        };
        self.mode.current_volume = current;

        let new_volume = step_volume(current, delta);
        if new_volume == current {
            debug!("volume already at {current}");
            return;
        }
        if let Err(e) = self.mixer.set_level(new_volume).await {
            warn!("{e:#}");
            return;
        }
        self.mode.current_volume = new_volume;
        info!("volume: {new_volume}");
        self.flash_status(&format!("Volume: {new_volume}"), self.volume_flash)
            .await;
    }

    fn inactive_for_threshold(&self, now: Instant) -> bool {
        self.last_activity
            .is_none_or(|last| now.saturating_duration_since(last) >= self.idle_threshold)
    }

    async fn handle_idle(&mut self, now: Instant) {
        if self.classifier.is_holding() || !self.inactive_for_threshold(now) {
            return;
        }
        if !self.mode.is_idle {
            info!("device idle");
            self.mode.is_idle = true;
            return;
        }
        if self.mode.animation_enabled && !self.supervisor.is_running() {
            self.play_random_animation().await;
        }
    }

    async fn play_looping(&mut self, path: &Path) {
        if let Err(e) = self.supervisor.play(path, false, self.frame_delay).await {
            warn!("{e}");
        }
    }

    async fn play_random_animation(&mut self) {
        let animations = match list_animations(&self.animations_root) {
            Ok(animations) => animations,
            Err(e) => {
                warn!(
                    "failed to list animations in {}: {e}",
                    self.animations_root.display()
                );
                return;
            }
        };
        let Some(animation) = animations.choose(&mut rand::thread_rng()) else {
            warn!("no animations found in {}", self.animations_root.display());
            return;
        };
        info!("playing idle animation {}", animation.display());
        self.play_looping(animation).await;
    }

    async fn check_battery(&mut self, now: Instant) {
        let charging = match self.battery.is_charging().await {
            Ok(charging) => charging,
            Err(e) => {
                debug!("failed to read battery status: {e}");
                return;
            }
        };

        if charging != self.mode.charging_status {
            self.mode.charging_status = charging;
            info!("charging: {charging}");
            if charging && self.mode.animation_enabled {
                let charging_animation = self.charging_animation.clone();
                self.play_looping(&charging_animation).await;
            } else {
                self.supervisor.stop().await;
                self.handle_idle(now).await;
            }
        } else if charging && !self.supervisor.is_running() {
            let charging_animation = self.charging_animation.clone();
            self.play_looping(&charging_animation).await;
        }
    }

    pub async fn shutdown(&mut self) {
        info!("shutting down");
        self.supervisor.stop().await;
        self.scripts = None;
    }
}
