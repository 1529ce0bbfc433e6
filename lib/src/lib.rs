use std::fmt;

/// Initialize logging with the given default level. Respects `RUST_LOG`
/// overrides.
pub fn init_logging(default_level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}

pub mod battery;
pub mod classifier;
pub mod compositor;
pub mod convert;
pub mod frames;
pub mod pixel;
pub mod scripts;
pub mod shutdown;
pub mod volume;

/// `EV_KEY` from linux/input-event-codes.h
pub const EV_KEY: u16 = 0x01;

/// The physical keys on the device, identified by their Linux input key codes.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Key {
    Power,
    VolumeUp,
    VolumeDown,
}

impl Key {
    pub const POWER_CODE: u16 = 116;
    pub const VOLUME_UP_CODE: u16 = 115;
    pub const VOLUME_DOWN_CODE: u16 = 114;

    pub const fn code(self) -> u16 {
        match self {
            Key::Power => Self::POWER_CODE,
            Key::VolumeUp => Self::VOLUME_UP_CODE,
            Key::VolumeDown => Self::VOLUME_DOWN_CODE,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            Self::POWER_CODE => Some(Key::Power),
            Self::VOLUME_UP_CODE => Some(Key::VolumeUp),
            Self::VOLUME_DOWN_CODE => Some(Key::VolumeDown),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Power => "power",
            Key::VolumeUp => "volume-up",
            Key::VolumeDown => "volume-down",
        };
        f.write_str(name)
    }
}
