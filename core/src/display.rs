use crate::framebuffer::Framebuffer;

/// A 4-bit grayscale e-paper panel.
pub trait Display {
    fn power_on(&mut self);
    /// Flashes the panel back to white.
    fn clear(&mut self);
    fn draw_grayscale(&mut self, framebuffer: &Framebuffer);
    fn power_off(&mut self);
}
