/// A 24-bit sRGB color stored as `0xRRGGBB`, the way colors are entered in
/// the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);
    pub const BLACK: Rgb = Rgb(0x000000);

    pub fn channels(self) -> [u8; 3] {
        [
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        ]
    }

    /// Gamma-encoded components in `[0, 1]`, as shown by color pickers.
    pub fn to_srgb(self) -> [f32; 3] {
        self.channels().map(|c| c as f32 / 255.0)
    }

    /// Linear components for lighting math.
    pub fn to_linear(self) -> [f32; 3] {
        self.to_srgb().map(srgb_to_linear)
    }

    pub fn from_srgb(rgb: [f32; 3]) -> Self {
        let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u32);
        Rgb((r << 16) | (g << 8) | b)
    }

    pub fn to_hex_string(self) -> String {
        format!("#{:06x}", self.0 & 0xffffff)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
