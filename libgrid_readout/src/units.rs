//! Conversions from raw wire fields to physical units.

use super::constants::*;

/// Convert a raw 12-bit temperature reading to degrees Celsius.
///
/// Readings above the sign threshold encode negative temperatures.
pub fn temperature_celsius(raw: u16) -> f64 {
    if raw > TEMPERATURE_SIGN_THRESHOLD {
        (raw as f64 - TEMPERATURE_WRAP) / TEMPERATURE_LSB_PER_DEGREE
    } else {
        raw as f64 / TEMPERATURE_LSB_PER_DEGREE
    }
}

/// Convert a raw voltage monitor reading to volts at the divider input.
pub fn monitor_voltage(raw: u16) -> f64 {
    raw as f64 / ADC_FULL_SCALE * ADC_REFERENCE_VOLTS * VOLTAGE_DIVIDER_RATIO
}

/// Convert a raw current monitor reading to the ADC-referred value.
pub fn monitor_current(raw: u16) -> f64 {
    raw as f64 / ADC_FULL_SCALE * ADC_REFERENCE_VOLTS
}

/// Bias voltage seen by the SiPM, corrected for the monitor series drop.
/// The correction factor doubled with the 6th hardware revision.
pub fn bias_voltage(voltage: f64, current: f64, new_programme: bool) -> f64 {
    if new_programme {
        voltage - 2.0 * current
    } else {
        voltage - current
    }
}

/// Convert a raw uscount timestamp to seconds of detector time.
pub fn uscount_seconds(raw: u64) -> f64 {
    raw as f64 / CLOCK_RATE_HZ
}

/// Convert a raw I-V scan voltage sample to volts.
pub fn scan_voltage(raw: f64) -> f64 {
    raw / ADC_FULL_SCALE * ADC_REFERENCE_VOLTS * VOLTAGE_DIVIDER_RATIO
}

/// Convert a raw I-V scan current sample to the amplifier-referred value.
pub fn scan_current(raw: f64) -> f64 {
    raw / ADC_FULL_SCALE * SCAN_CURRENT_SCALE * ADC_REFERENCE_VOLTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_sign() {
        assert_eq!(temperature_celsius(0), 0.0);
        assert_eq!(temperature_celsius(16), 1.0);
        assert_eq!(temperature_celsius(2048), 128.0);
        assert_eq!(temperature_celsius(2049), (2049.0 - 4096.0) / 16.0);
        assert_eq!(temperature_celsius(4095), -1.0 / 16.0);
    }

    #[test]
    fn test_monitor_scales() {
        assert!((monitor_voltage(4096) - 3.3 * 11.0).abs() < 1e-12);
        assert!((monitor_current(4096) - 3.3).abs() < 1e-12);
        assert_eq!(monitor_voltage(0), 0.0);
    }

    #[test]
    fn test_bias_versions() {
        assert!((bias_voltage(28.0, 0.5, false) - 27.5).abs() < 1e-12);
        assert!((bias_voltage(28.0, 0.5, true) - 27.0).abs() < 1e-12);
    }

    #[test]
    fn test_uscount_clock() {
        assert_eq!(uscount_seconds(0), 0.0);
        assert!((uscount_seconds(24_050_000) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scan_scales() {
        assert!((scan_voltage(4096.0) - 3.3 * 11.0).abs() < 1e-12);
        assert!((scan_current(4096.0) - 2.0 * 3.3).abs() < 1e-12);
    }
}
