use inkframe_core::{
    display::Display,
    framebuffer::{Framebuffer, HEIGHT, WIDTH, packed_pixel},
};
use log::{info, warn};

const DISPLAY_BUFFER_SIZE: usize = WIDTH * HEIGHT;
const WHITE: u32 = 0xFFFFFFFF;

/// ARGB for a 4-bit level, 0 black to 15 white.
fn argb(level: u8) -> u32 {
    0xFF000000 | (level as u32 * 0x111111)
}

/// Previews the panel in a desktop window.
pub struct MinifbDisplay {
    display_buffer: Box<[u32]>,
    window: minifb::Window,
    powered: bool,
}

impl Default for MinifbDisplay {
    fn default() -> Self {
        let mut ret = Self {
            display_buffer: vec![WHITE; DISPLAY_BUFFER_SIZE].into_boxed_slice(),
            window: Self::create_window(minifb::Scale::X1),
            powered: false,
        };
        ret.update_display();
        ret
    }
}

impl MinifbDisplay {
    fn create_window(scale: minifb::Scale) -> minifb::Window {
        let options = minifb::WindowOptions {
            borderless: false,
            title: true,
            resize: true,
            scale,
            ..minifb::WindowOptions::default()
        };
        let mut window = minifb::Window::new("Inkframe", WIDTH, HEIGHT, options)
            .unwrap_or_else(|e| {
                panic!("Unable to open window: {}", e);
            });

        window.set_target_fps(5);
        window
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    fn update_display(&mut self) {
        if let Err(e) = self
            .window
            .update_with_buffer(&self.display_buffer, WIDTH, HEIGHT)
        {
            warn!("Window update failed: {e}");
        }
    }

    /// Keeps the window responsive between refreshes.
    pub fn update(&mut self) {
        self.window.update();
    }
}

impl Display for MinifbDisplay {
    fn power_on(&mut self) {
        self.powered = true;
    }

    fn clear(&mut self) {
        self.display_buffer.fill(WHITE);
        self.update_display();
    }

    fn draw_grayscale(&mut self, framebuffer: &Framebuffer) {
        if !self.powered {
            warn!("Drawing to a powered-off panel");
        }
        info!("Refreshing panel");
        let bytes = framebuffer.as_bytes();
        for (index, pixel) in self.display_buffer.iter_mut().enumerate() {
            *pixel = argb(packed_pixel(bytes, index).unwrap_or(0x0F));
        }
        self.update_display();
    }

    fn power_off(&mut self) {
        self.powered = false;
    }
}
