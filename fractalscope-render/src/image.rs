/// An RGB pixel buffer representing a rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data, 3 bytes per pixel, row-major, row 0 at the top.
    pub pixels: Vec<u8>,
}

impl RgbImage {
    pub const CHANNELS: usize = 3;

    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * Self::CHANNELS],
        }
    }

    /// Color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    fn stride(&self) -> usize {
        self.width as usize * Self::CHANNELS
    }

    /// Reverse the row order in place.
    ///
    /// For uploaders whose texture origin is the bottom-left corner.
    pub fn flip_vertical(&mut self) {
        let stride = self.stride();
        let h = self.height as usize;
        for row in 0..h / 2 {
            let (upper, lower) = self.pixels.split_at_mut((h - 1 - row) * stride);
            upper[row * stride..(row + 1) * stride].swap_with_slice(&mut lower[..stride]);
        }
    }
}
