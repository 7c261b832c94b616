use alloc::{vec, vec::Vec};
use log::{debug, info, warn};

use crate::{
    battery,
    bmp::BmpError,
    board::Board,
    config::{BMP_BUFFER_SIZE, ImageFormat, STATUS_BAR_HEIGHT, Settings},
    decoder::JpegDecoder,
    display::Display,
    download::{self, DownloadError},
    framebuffer::Framebuffer,
    net::Network,
    sleep,
    status_bar::StatusBar,
    telemetry::{Climate, SensorReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    Download(DownloadError),
    Bitmap(BmpError),
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Displayed,
    NetworkUnavailable,
    TimeUnavailable,
    /// The panel keeps showing the previous image.
    RenderFailed(RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub battery_voltage: f32,
    pub sleep_seconds: u32,
    pub elapsed_ms: u64,
}

/// One wake-up: fetch the image, compose the frame, refresh the panel and
/// work out how long to sleep.
pub struct Application<'a> {
    settings: Settings<'a>,
    framebuffer: &'a mut Framebuffer,
    bmp_buffer: Vec<u8>,
}

impl<'a> Application<'a> {
    pub fn new(settings: Settings<'a>, framebuffer: &'a mut Framebuffer) -> Self {
        Self::with_download_capacity(settings, framebuffer, BMP_BUFFER_SIZE)
    }

    pub fn with_download_capacity(
        settings: Settings<'a>,
        framebuffer: &'a mut Framebuffer,
        capacity: usize,
    ) -> Self {
        Application {
            settings,
            framebuffer,
            bmp_buffer: vec![0; capacity],
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &*self.framebuffer
    }

    pub fn run_cycle<N, B, J>(
        &mut self,
        net: &mut N,
        board: &mut B,
        decoder: &mut J,
        display: &mut dyn Display,
    ) -> CycleReport
    where
        N: Network,
        B: Board,
        J: JpegDecoder,
    {
        let started = board.uptime_ms();
        self.framebuffer.clear();

        let climate = if self.settings.enable_climate_sensor {
            self.read_climate(board)
        } else {
            None
        };
        let battery_voltage = board.battery_voltage();

        let mut now = None;
        let outcome = match net.connect(&self.settings.wifi) {
            Err(e) => {
                warn!("WiFi connection FAILED: {e:?}");
                CycleOutcome::NetworkUnavailable
            }
            Ok(()) => {
                let rssi = net.rssi();
                info!("WiFi connected, signal {rssi} dBm");
                now = board.sync_time(&self.settings.time);
                let outcome = match now {
                    None => {
                        warn!("Failed to obtain time.");
                        CycleOutcome::TimeUnavailable
                    }
                    Some(_) => {
                        if let Some(climate) = climate {
                            self.send_telemetry(net, climate, battery_voltage);
                        }
                        match self.render_image(net, decoder) {
                            Ok(()) => CycleOutcome::Displayed,
                            Err(e) => CycleOutcome::RenderFailed(e),
                        }
                    }
                };
                net.disconnect();

                if outcome == CycleOutcome::Displayed {
                    let status = self.status_bar(battery_voltage, rssi, climate);
                    self.present(display, status);
                }
                outcome
            }
        };

        let sleep_seconds = sleep::sleep_seconds(
            self.settings.sleep_minutes,
            now.unwrap_or_default(),
        );
        let elapsed_ms = board.uptime_ms().saturating_sub(started);
        info!(
            "Cycle finished: {:?}, operations took {}.{:03} seconds",
            outcome,
            elapsed_ms / 1000,
            elapsed_ms % 1000
        );
        info!("Deep-sleeping for {sleep_seconds} seconds.");

        CycleReport {
            outcome,
            battery_voltage,
            sleep_seconds,
            elapsed_ms,
        }
    }

    fn read_climate(&self, board: &mut impl Board) -> Option<Climate> {
        let climate = board.read_climate();
        match climate {
            Some(c) => debug!(
                "Humidity: {:.1}%  |  Temperature: {:.1}°C",
                c.humidity, c.temperature
            ),
            None => warn!("Climate sensor did not answer"),
        }
        climate
    }

    fn send_telemetry(&self, net: &mut impl Network, climate: Climate, battery_voltage: f32) {
        let report = SensorReport {
            climate,
            battery_voltage,
        };
        let body = match report.form_body() {
            Ok(body) => body,
            Err(_) => {
                warn!("Sensor readings out of range, telemetry skipped: {report:?}");
                return;
            }
        };
        match net.post_form(self.settings.telemetry_url, &body) {
            Ok(status) => debug!("Telemetry response code: {status}"),
            Err(e) => warn!("Error sending telemetry: {e:?}"),
        }
    }

    fn render_image<N: Network, J: JpegDecoder>(
        &mut self,
        net: &mut N,
        decoder: &mut J,
    ) -> Result<(), RenderError> {
        let url = self.settings.image_url;
        match self.settings.image_format {
            ImageFormat::Bmp => {
                let size = download::fetch_bmp(net, url, &mut self.bmp_buffer)
                    .map_err(RenderError::Download)?;
                debug!("BMP downloaded, parsing...");
                self.framebuffer
                    .composite_bmp(&self.bmp_buffer[..size], STATUS_BAR_HEIGHT)
                    .map_err(|e| {
                        warn!("{e}");
                        RenderError::Bitmap(e)
                    })?;
            }
            ImageFormat::Jpeg => {
                let data = download::fetch_sized(net, url).map_err(RenderError::Download)?;
                decoder.decode(&data, &mut *self.framebuffer).map_err(|e| {
                    warn!("JPEG decoding failed: {e:?}");
                    RenderError::Jpeg
                })?;
            }
        }
        Ok(())
    }

    fn status_bar(&self, battery_voltage: f32, rssi: i32, climate: Option<Climate>) -> StatusBar {
        let runtime_hours = self.settings.enable_runtime_estimate.then(|| {
            battery::estimate_runtime_hours(
                battery::voltage_to_soc(battery_voltage),
                self.settings.battery_capacity_mah,
                self.settings.image_format,
            )
        });
        StatusBar {
            battery_voltage,
            wifi_rssi: rssi,
            temperature: climate.map(|c| c.temperature),
            runtime_hours,
        }
    }

    fn present(&mut self, display: &mut dyn Display, status: StatusBar) {
        if self.settings.enable_status_bar {
            status.draw(&mut *self.framebuffer).ok();
        }
        display.power_on();
        display.clear();
        display.draw_grayscale(&*self.framebuffer);
        display.power_off();
    }
}
