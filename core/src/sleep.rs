/// Seconds added to every sleep. The RTC runs fast in deep sleep; without
/// this the board wakes at xx:59 and again a minute later.
pub const DRIFT_COMPENSATION_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallTime {
    pub minute: u32,
    pub second: u32,
}

/// Time to sleep so that the next wake-up lands on the next multiple of
/// `period_minutes` within the hour.
pub fn sleep_seconds(period_minutes: u32, now: WallTime) -> u32 {
    let period_minutes = period_minutes.max(1);
    let into_period = (now.minute % period_minutes) * 60 + now.second.min(59);
    period_minutes * 60 - into_period + DRIFT_COMPENSATION_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minute: u32, second: u32) -> WallTime {
        WallTime { minute, second }
    }

    #[test]
    fn aligns_to_hour() {
        assert_eq!(sleep_seconds(60, at(0, 0)), 3600 + 30);
        assert_eq!(sleep_seconds(60, at(59, 30)), 30 + 30);
        assert_eq!(sleep_seconds(60, at(15, 10)), 45 * 60 - 10 + 30);
    }

    #[test]
    fn aligns_to_half_hour() {
        assert_eq!(sleep_seconds(30, at(45, 0)), 15 * 60 + 30);
        assert_eq!(sleep_seconds(30, at(29, 59)), 1 + 30);
        assert_eq!(sleep_seconds(30, at(30, 0)), 30 * 60 + 30);
    }

    #[test]
    fn zero_period_is_one_minute() {
        assert_eq!(sleep_seconds(0, at(12, 20)), 40 + 30);
    }

    #[test]
    fn unsynced_clock_sleeps_full_period() {
        assert_eq!(sleep_seconds(15, WallTime::default()), 15 * 60 + 30);
    }
}
