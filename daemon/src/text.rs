use std::process::Stdio;
use std::time::Duration;

use log::warn;

use crate::config::ExternalCommand;

/// The external text renderer, invoked as
/// `<prog> <text> <font_size> <color> <h_align> <v_align>`.
pub struct TextDisplay {
    command: ExternalCommand,
    font_size: u32,
    color: String,
}

impl TextDisplay {
    // centered both ways
    const ALIGN: &'static str = "1";

    pub fn new(command: ExternalCommand, font_size: u32, color: String) -> Self {
        Self {
            command,
            font_size,
            color,
        }
    }

    /// Render `text` and wait for the renderer to exit. An empty string
    /// clears the screen.
    pub async fn show(&self, text: &str) {
        let mut cmd = match self.command.to_command() {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("text renderer misconfigured: {e}");
                return;
            }
        };
        let result = cmd
            .arg(text)
            .arg(self.font_size.to_string())
            .arg(&self.color)
            .args([Self::ALIGN, Self::ALIGN])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match result {
            Ok(status) if !status.success() => warn!("text renderer exited with {status}"),
            Ok(_) => {}
            Err(e) => warn!("failed to run text renderer: {e}"),
        }
    }

    /// Show `text` for `hold`, then clear it.
    pub async fn flash(&self, text: &str, hold: Duration) {
        self.show(text).await;
        tokio::time::sleep(hold).await;
        self.show("").await;
    }
}
