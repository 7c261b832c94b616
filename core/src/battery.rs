use crate::config::ImageFormat;

/// ADC reference voltage in millivolts used when the eFuse holds no
/// calibration value.
pub const DEFAULT_VREF_MV: u32 = 1135;

const ADC_FULL_SCALE: f32 = 4096.0;
/// Voltage divider and attenuation of the battery sense pin.
const ADC_SCALE: f32 = 6.566;

const FULL_VOLTAGE: f32 = 4.20;
const EMPTY_VOLTAGE: f32 = 3.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChargeState {
    pub level: u8,
    pub charging: bool,
}

impl ChargeState {
    pub fn from_voltage(volts: f32, charging: bool) -> Self {
        Self {
            level: (voltage_to_soc(volts) * 100.0) as u8,
            charging,
        }
    }

    pub fn format(&self) -> heapless::String<8> {
        heapless::format!("{}{}%", if self.charging { "+" } else { "" }, self.level)
            .unwrap_or_default()
    }
}

pub fn adc_to_voltage(raw: u16, vref_mv: u32) -> f32 {
    raw as f32 / ADC_FULL_SCALE * ADC_SCALE * (vref_mv as f32 / 1000.0)
}

/// Maps a single-cell Li-ion voltage onto a 0.0..=1.0 state of charge.
pub fn voltage_to_soc(volts: f32) -> f32 {
    if volts >= FULL_VOLTAGE {
        return 1.0;
    }
    if volts <= EMPTY_VOLTAGE {
        return 0.0;
    }
    // Quartic fit of the discharge curve, evaluated in f64: the terms cancel
    // down from ~10^5 to ~10^1.
    let v = volts as f64;
    let percent = (((2836.9625 * v - 43987.4889) * v + 255233.8134) * v - 656689.7123) * v
        + 632041.7303;
    ((percent / 100.0) as f32).clamp(0.0, 1.0)
}

/// Average charge drawn by one wake cycle, in mAh.
pub fn cycle_consumption_mah(format: ImageFormat) -> f32 {
    match format {
        ImageFormat::Bmp => 0.44,
        ImageFormat::Jpeg => 0.81,
    }
}

pub fn estimate_runtime_hours(soc: f32, capacity_mah: u32, format: ImageFormat) -> f32 {
    soc * capacity_mah as f32 / cycle_consumption_mah(format)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn soc_endpoints() {
        assert_eq!(voltage_to_soc(4.25), 1.0);
        assert_eq!(voltage_to_soc(4.20), 1.0);
        assert_eq!(voltage_to_soc(3.20), 0.0);
        assert_eq!(voltage_to_soc(2.90), 0.0);
    }

    #[test]
    fn soc_within_range() {
        let mut volts = 3.21;
        while volts < 4.2 {
            let soc = voltage_to_soc(volts);
            assert!((0.0..=1.0).contains(&soc), "{volts} V gave {soc}");
            volts += 0.01;
        }
    }

    #[test]
    fn soc_mid_curve() {
        let soc = voltage_to_soc(3.7);
        assert!(soc > 0.2 && soc < 0.8, "3.7 V gave {soc}");
        assert!(voltage_to_soc(4.1) > voltage_to_soc(3.5));
    }

    #[test]
    fn adc_conversion() {
        assert_eq!(adc_to_voltage(0, DEFAULT_VREF_MV), 0.0);
        let volts = adc_to_voltage(2048, 1000);
        assert!((volts - 3.283).abs() < 0.001);
    }

    #[test]
    fn runtime_estimate() {
        let hours = estimate_runtime_hours(1.0, 2000, ImageFormat::Bmp);
        assert!((hours - 2000.0 / 0.44).abs() < 0.01);
        let hours = estimate_runtime_hours(0.5, 2000, ImageFormat::Jpeg);
        assert!((hours - 1000.0 / 0.81).abs() < 0.01);
        assert_eq!(estimate_runtime_hours(0.0, 2000, ImageFormat::Bmp), 0.0);
    }

    #[test]
    fn charge_state_format() {
        let state = ChargeState { level: 87, charging: true };
        assert_eq!(state.format().as_str(), "+87%");
        let state = ChargeState::from_voltage(4.3, false);
        assert_eq!(state.format().as_str(), "100%");
    }
}
