//! Parsing of the power-supply sysfs attributes.

/// Substring of the `status` attribute that means the battery is charging.
pub const CHARGING_MARKER: &str = "Charging";

pub fn is_charging(status: &str) -> bool {
    status.contains(CHARGING_MARKER)
}

/// Status text shown on a power-key click.
pub fn format_battery_text(capacity: &str, status: &str) -> String {
    format!("Battery: {}%\n({})", capacity.trim(), status.trim())
}
