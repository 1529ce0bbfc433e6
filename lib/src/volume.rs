//! Amplifier volume arithmetic.

pub const VOLUME_MIN: u8 = 0;
pub const VOLUME_MAX: u8 = 63;

/// Apply a signed step to a volume level, clamping to the amplifier range.
pub fn step_volume(current: u8, delta: i32) -> u8 {
    let stepped = i32::from(current).saturating_add(delta);
    stepped.clamp(i32::from(VOLUME_MIN), i32::from(VOLUME_MAX)) as u8
}

/// Extract the level from `amixer get` output: the second token of the
/// `Mono:` line, e.g. `  Mono: 40 [63%] [-9.00dB]`.
pub fn parse_mixer_level(output: &str) -> Option<u8> {
    let line = output.lines().find(|line| line.contains("Mono:"))?;
    let level: i64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(level.clamp(i64::from(VOLUME_MIN), i64::from(VOLUME_MAX)) as u8)
}
