use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_color(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.0, self.1, self.2, 255)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Colours used by the board renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub light_square: Rgb,
    pub dark_square: Rgb,
    pub square_border: Rgb,
    pub corner_marker: Rgb,
}

impl Palette {
    pub const CLASSIC: Palette = Palette {
        light_square: Rgb(240, 217, 181),
        dark_square: Rgb(181, 136, 99),
        square_border: Rgb(0, 0, 0),
        corner_marker: Rgb(0, 255, 0),
    };

    /// Checkerboard colour; the top-left square is light.
    pub fn square(&self, file: usize, rank: usize) -> Rgb {
        if (file + rank) % 2 == 0 {
            self.light_square
        } else {
            self.dark_square
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::CLASSIC
    }
}
