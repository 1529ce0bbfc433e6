//! Long-press script table.
//!
//! The table is a JSON document with up to three arrays, one per key, each
//! holding two shell commands:
//!
//! ```json
//! { "power": ["poweroff.sh", "wake.sh"], "volup": ["a", "b"], "voldown": ["c", "d"] }
//! ```
//!
//! Repeated long presses on a key alternate between its two commands.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::Key;

#[derive(Error, Debug)]
pub enum ScriptTableError {
    #[error("failed to read script table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse script table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize, Default)]
struct RawScriptTable {
    power: Option<Vec<String>>,
    volup: Option<Vec<String>>,
    voldown: Option<Vec<String>>,
}

type Slots = [Option<String>; 2];

fn into_slots(commands: Option<Vec<String>>) -> Slots {
    let mut commands = commands.unwrap_or_default().into_iter();
    [commands.next(), commands.next()]
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScriptTable {
    power: Slots,
    volume_up: Slots,
    volume_down: Slots,
}

impl ScriptTable {
    pub fn parse(json: &str) -> Result<Self, ScriptTableError> {
        let raw: RawScriptTable = serde_json::from_str(json)?;
        Ok(Self {
            power: into_slots(raw.power),
            volume_up: into_slots(raw.volup),
            volume_down: into_slots(raw.voldown),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ScriptTableError> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json)
    }

    /// The command in `slot` (0 or 1) for `key`, if configured.
    pub fn command(&self, key: Key, slot: usize) -> Option<&str> {
        let slots = match key {
            Key::Power => &self.power,
            Key::VolumeUp => &self.volume_up,
            Key::VolumeDown => &self.volume_down,
        };
        slots.get(slot)?.as_deref()
    }
}

/// Per-key long-press counts, used to pick which of the two scripts runs.
#[derive(Debug, Default)]
pub struct LongPressCounters {
    power: u64,
    volume_up: u64,
    volume_down: u64,
}

impl LongPressCounters {
    /// Count a completed long press on `key`, returning the script slot it
    /// selects: 0 for the first press, 1 for the second, and so on.
    pub fn advance(&mut self, key: Key) -> usize {
        let counter = match key {
            Key::Power => &mut self.power,
            Key::VolumeUp => &mut self.volume_up,
            Key::VolumeDown => &mut self.volume_down,
        };
        let slot = (*counter % 2) as usize;
        *counter += 1;
        slot
    }

    pub fn count(&self, key: Key) -> u64 {
        match key {
            Key::Power => self.power,
            Key::VolumeUp => self.volume_up,
            Key::VolumeDown => self.volume_down,
        }
    }
}
