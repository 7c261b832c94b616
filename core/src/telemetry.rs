use core::fmt::Write;

pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub temperature: f32,
    pub humidity: f32,
}

/// What gets posted to the telemetry endpoint after each wake-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReport {
    pub climate: Climate,
    pub battery_voltage: f32,
}

impl SensorReport {
    /// Fails when the readings do not fit, e.g. a sensor returning garbage
    /// in the order of 10^30.
    pub fn form_body(&self) -> Result<heapless::String<96>, core::fmt::Error> {
        let mut body = heapless::String::new();
        write!(
            body,
            "temperature={:.2}&humidity={:.2}&battery={:.2}",
            self.climate.temperature, self.climate.humidity, self.battery_voltage
        )?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encoding() {
        let report = SensorReport {
            climate: Climate {
                temperature: 21.5,
                humidity: 40.0,
            },
            battery_voltage: 4.123,
        };
        assert_eq!(
            report.form_body().unwrap().as_str(),
            "temperature=21.50&humidity=40.00&battery=4.12"
        );
    }

    #[test]
    fn negative_and_nan() {
        let report = SensorReport {
            climate: Climate {
                temperature: -3.25,
                humidity: f32::NAN,
            },
            battery_voltage: 3.9,
        };
        assert_eq!(
            report.form_body().unwrap().as_str(),
            "temperature=-3.25&humidity=NaN&battery=3.90"
        );
    }

    #[test]
    fn oversized_readings_are_rejected() {
        let report = SensorReport {
            climate: Climate {
                temperature: 1e30,
                humidity: 1e30,
            },
            battery_voltage: 4.0,
        };
        assert_eq!(report.form_body(), Err(core::fmt::Error));
    }
}
