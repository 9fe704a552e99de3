//! Capacitive soil-moisture probe calibration.
//!
//! The probe reads high when dry and low when wet.  Raw 12-bit ADC counts
//! are mapped linearly onto 0–100 % and clamped, so readings past either
//! calibration point saturate instead of going negative or above 100.

/// ADC count with the probe in dry air (0 % moisture).
pub const SOIL_DRY_RAW: u16 = 4095;
/// ADC count with the probe submerged (100 % moisture).
pub const SOIL_WET_RAW: u16 = 1200;

/// Convert a raw ADC reading to a moisture percentage in `0..=100`.
///
/// Integer arithmetic, truncating toward zero, matching the classic
/// `map(raw, dry, wet, 0, 100)` idiom the controller is calibrated against.
pub fn raw_to_percent(raw: u16) -> u8 {
    let dry = i32::from(SOIL_DRY_RAW);
    let wet = i32::from(SOIL_WET_RAW);
    let pct = (i32::from(raw) - dry) * 100 / (wet - dry);
    pct.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_points() {
        assert_eq!(raw_to_percent(SOIL_DRY_RAW), 0);
        assert_eq!(raw_to_percent(SOIL_WET_RAW), 100);
    }

    #[test]
    fn midpoint_is_half() {
        assert_eq!(raw_to_percent(2647), 50);
    }

    #[test]
    fn saturates_beyond_calibration() {
        assert_eq!(raw_to_percent(4595), 0);
        assert_eq!(raw_to_percent(u16::MAX), 0);
        assert_eq!(raw_to_percent(700), 100);
        assert_eq!(raw_to_percent(0), 100);
    }
}
