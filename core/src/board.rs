use crate::{config::TimeConfig, sleep::WallTime, telemetry::Climate};

/// Sensors and clocks of the board.
pub trait Board {
    /// Milliseconds since the board woke up.
    fn uptime_ms(&self) -> u64;
    fn battery_voltage(&mut self) -> f32;
    fn read_climate(&mut self) -> Option<Climate>;
    /// Synchronizes the RTC over the network. `None` when no time could be
    /// obtained.
    fn sync_time(&mut self, config: &TimeConfig<'_>) -> Option<WallTime>;
}
