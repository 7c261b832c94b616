use crate::framebuffer::Framebuffer;

/// Decodes a complete JPEG file into the panel framebuffer, anchored at the
/// top-left corner.
pub trait JpegDecoder {
    type Error: core::fmt::Debug;

    fn decode(&mut self, data: &[u8], framebuffer: &mut Framebuffer) -> Result<(), Self::Error>;
}
