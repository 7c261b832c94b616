//! Device settings. On the board these are compiled in; host tools start from
//! [`Settings::DEFAULT`] and override fields from the command line.

/// Pixel rows reserved at the top of the panel for the status bar.
pub const STATUS_BAR_HEIGHT: usize = 30;

/// Room for the largest BMP the panel can show, 960x540 at up to 32bpp.
pub const BMP_BUFFER_SIZE: usize = 2_200_000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString, strum_macros::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ImageFormat {
    #[strum(serialize = "bmp")]
    Bmp,
    #[strum(to_string = "jpg", serialize = "jpeg")]
    Jpeg,
}

impl ImageFormat {
    pub fn label(&self) -> &'static str {
        (*self).into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeConfig<'a> {
    /// POSIX TZ string, see <https://github.com/nayarsystems/posix_tz_db>.
    pub timezone: &'a str,
    pub ntp_server: &'a str,
    pub fallback_ntp_server: &'a str,
    pub gmt_offset_secs: i32,
    pub daylight_offset_secs: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    pub wifi: Credentials<'a>,
    /// A 960x540 image, or a script generating one. Keep the top 30 rows
    /// white if the status bar is enabled.
    pub image_url: &'a str,
    pub image_format: ImageFormat,
    /// Receives the sensor report as a form POST.
    pub telemetry_url: &'a str,
    pub enable_climate_sensor: bool,
    pub enable_status_bar: bool,
    pub enable_runtime_estimate: bool,
    /// Wake-ups are aligned to multiples of this period within the hour.
    pub sleep_minutes: u32,
    pub battery_capacity_mah: u32,
    pub time: TimeConfig<'a>,
}

impl Settings<'static> {
    pub const DEFAULT: Self = Self {
        wifi: Credentials {
            ssid: "YourSSID",
            password: "UltraSecurePassword",
        },
        image_url: "https://yourdomain.com/jpg.php",
        image_format: ImageFormat::Jpeg,
        telemetry_url: "https://yourdomain.com/sensor.php",
        enable_climate_sensor: false,
        enable_status_bar: true,
        enable_runtime_estimate: true,
        sleep_minutes: 60,
        battery_capacity_mah: 2000,
        time: TimeConfig {
            timezone: "CET-1CEST,M3.5.0,M10.5.0/3",
            ntp_server: "0.pl.pool.ntp.org",
            fallback_ntp_server: "0.pool.ntp.org",
            gmt_offset_secs: 0,
            daylight_offset_secs: 3600,
        },
    };
}

impl Default for Settings<'static> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn image_format_parse() {
        assert_eq!(ImageFormat::from_str("bmp"), Ok(ImageFormat::Bmp));
        assert_eq!(ImageFormat::from_str("BMP"), Ok(ImageFormat::Bmp));
        assert_eq!(ImageFormat::from_str("jpg"), Ok(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_str("jpeg"), Ok(ImageFormat::Jpeg));
        assert!(ImageFormat::from_str("png").is_err());
        assert_eq!(ImageFormat::Jpeg.label(), "jpg");
    }
}
