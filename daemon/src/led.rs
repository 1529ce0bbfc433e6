use std::path::PathBuf;
use std::time::Duration;

use log::warn;

/// The logo LED, driven through its sysfs class directory.
pub struct Led {
    brightness_path: PathBuf,
    trigger_path: PathBuf,
    blink_duration: Duration,
}

impl Led {
    pub fn new(brightness_path: PathBuf, trigger_path: PathBuf, blink_duration: Duration) -> Self {
        Self {
            brightness_path,
            trigger_path,
            blink_duration,
        }
    }

    async fn write(&self, path: &PathBuf, value: &str) {
        if let Err(e) = tokio::fs::write(path, value).await {
            warn!("failed to write {value:?} to {}: {e}", path.display());
        }
    }

    pub async fn set(&self, on: bool) {
        self.write(&self.brightness_path, if on { "1" } else { "0" })
            .await;
    }

    /// Take the LED off any kernel trigger and flash it off once, leaving it
    /// lit.
    pub async fn blink(&self) {
        self.write(&self.trigger_path, "none").await;
        self.set(false).await;
        tokio::time::sleep(self.blink_duration).await;
        self.set(true).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blink_leaves_led_on() {
        let dir = tempfile::tempdir().unwrap();
        let led = Led::new(
            dir.path().join("brightness"),
            dir.path().join("trigger"),
            Duration::from_millis(1),
        );
        std::fs::write(dir.path().join("trigger"), "heartbeat").unwrap();

        led.blink().await;
        assert_eq!(
            std::fs::read_to_string(dir.path().join("brightness")).unwrap(),
            "1"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("trigger")).unwrap(),
            "none"
        );
    }

    #[tokio::test]
    async fn test_missing_led_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let led = Led::new(
            dir.path().join("no/brightness"),
            dir.path().join("no/trigger"),
            Duration::from_millis(1),
        );
        led.blink().await;
    }
}
