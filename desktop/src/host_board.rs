use std::time::{Instant, SystemTime, UNIX_EPOCH};

use inkframe_core::{board::Board, config::TimeConfig, sleep::WallTime, telemetry::Climate};
use log::{debug, warn};

/// Stands in for the ESP32 board: the host clock replaces NTP and the sensor
/// readings come from the command line.
pub struct HostBoard {
    started: Instant,
    battery_voltage: f32,
    climate: Option<Climate>,
}

impl HostBoard {
    pub fn new(battery_voltage: f32, climate: Option<Climate>) -> Self {
        HostBoard {
            started: Instant::now(),
            battery_voltage,
            climate,
        }
    }
}

/// Minute and second of the local wall clock, `offset_secs` east of UTC.
fn wall_time(unix_secs: u64, offset_secs: i64) -> WallTime {
    let local = (unix_secs as i64 + offset_secs).rem_euclid(3600) as u32;
    WallTime {
        minute: local / 60,
        second: local % 60,
    }
}

impl Board for HostBoard {
    fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn battery_voltage(&mut self) -> f32 {
        self.battery_voltage
    }

    fn read_climate(&mut self) -> Option<Climate> {
        self.climate
    }

    fn sync_time(&mut self, config: &TimeConfig<'_>) -> Option<WallTime> {
        debug!("Time from host clock instead of {}", config.ntp_server);
        let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(now) => now,
            Err(e) => {
                warn!("Host clock before epoch: {e}");
                return None;
            }
        };
        let offset = config.gmt_offset_secs as i64 + config.daylight_offset_secs as i64;
        Some(wall_time(now.as_secs(), offset))
    }
}
