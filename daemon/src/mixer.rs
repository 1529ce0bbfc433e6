use std::process::Stdio;

use anyhow::{Context, Result, bail};
use facebox::volume::parse_mixer_level;

use crate::config::ExternalCommand;

/// The amplifier volume control, reached through an amixer-compatible
/// command.
pub struct Mixer {
    command: ExternalCommand,
    control: String,
}

impl Mixer {
    pub fn new(command: ExternalCommand, control: String) -> Self {
        Self { command, control }
    }

    pub async fn level(&self) -> Result<u8> {
        let out = self
            .command
            .to_command()?
            .args(["get", &self.control])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .context("failed to run mixer")?;
        if !out.status.success() {
            bail!("mixer get {:?} failed: {}", self.control, out.status);
        }
        let stdout = String::from_utf8_lossy(&out.stdout);
        parse_mixer_level(&stdout)
            .with_context(|| format!("no level for {:?} in mixer output", self.control))
    }

    pub async fn set_level(&self, level: u8) -> Result<()> {
        let status = self
            .command
            .to_command()?
            .args(["set", &self.control, &level.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("failed to run mixer")?;
        if !status.success() {
            bail!("mixer set {:?} {level} failed: {status}", self.control);
        }
        Ok(())
    }
}
