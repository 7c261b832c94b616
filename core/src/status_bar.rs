use embedded_graphics::{
    Drawable,
    mono_font::{MonoTextStyle, iso_8859_1::FONT_7X13},
    pixelcolor::{Gray4, GrayColor},
    prelude::{DrawTarget, Point},
    text::Text,
};

const BASELINE: i32 = 20;
const BATTERY_X: i32 = 10;
const WIFI_X: i32 = 160;
const TEMPERATURE_X: i32 = 350;
const RUNTIME_X: i32 = 550;

type Label = heapless::String<64>;

/// Battery, Wi-Fi and room readings drawn across the top of the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusBar {
    pub battery_voltage: f32,
    pub wifi_rssi: i32,
    pub temperature: Option<f32>,
    pub runtime_hours: Option<f32>,
}

impl StatusBar {
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Gray4>,
    {
        let style = MonoTextStyle::new(&FONT_7X13, Gray4::BLACK);

        let battery: Label =
            heapless::format!("Battery: {:.2} V", self.battery_voltage).unwrap_or_default();
        Text::new(&battery, Point::new(BATTERY_X, BASELINE), style).draw(target)?;

        let wifi: Label =
            heapless::format!("WiFi signal: {} dBm", self.wifi_rssi).unwrap_or_default();
        Text::new(&wifi, Point::new(WIFI_X, BASELINE), style).draw(target)?;

        if let Some(temperature) = self.temperature {
            let room: Label =
                heapless::format!("Room temp: {:.1} °C", temperature).unwrap_or_default();
            Text::new(&room, Point::new(TEMPERATURE_X, BASELINE), style).draw(target)?;
        }

        if let Some(hours) = self.runtime_hours {
            let x = if self.temperature.is_some() {
                RUNTIME_X
            } else {
                TEMPERATURE_X
            };
            let runtime: Label =
                heapless::format!("Hrs left: {:.2} = {:.2} days", hours, hours / 24.0)
                    .unwrap_or_default();
            Text::new(&runtime, Point::new(x, BASELINE), style).draw(target)?;
        }
        Ok(())
    }
}
