// Colour conversion utilities and the Chroma frame codec.
//
// The SDK packs a colour as `red + green*256 + blue*65536` (BGR when read as
// hex). Keep that layout exactly; nothing else in the driver uses it.

use chroma_transport::{PackedFrame, COLS, ROWS};

use crate::grid::{Cell, Grid};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_float(self) -> Cell {
        rgb_to_float(self)
    }

    /// Parse a colour string: "#RRGGBB", "red", "green", etc.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                return Some(Self::new(r, g, b));
            }
            return None;
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Some(Self::BLACK),
            "red" => Some(Self::new(255, 0, 0)),
            "green" => Some(Self::new(0, 255, 0)),
            "blue" => Some(Self::new(0, 0, 255)),
            "yellow" => Some(Self::new(255, 255, 0)),
            "cyan" => Some(Self::new(0, 255, 255)),
            "magenta" | "pink" => Some(Self::new(255, 0, 255)),
            "white" => Some(Self::new(255, 255, 255)),
            "orange" => Some(Self::new(255, 165, 0)),
            "purple" => Some(Self::new(128, 0, 255)),
            _ => None,
        }
    }
}

pub fn rgb_to_float(rgb: Rgb8) -> Cell {
    [
        rgb.r as f64 / 255.0,
        rgb.g as f64 / 255.0,
        rgb.b as f64 / 255.0,
    ]
}

/// Round each channel to the nearest step in 0..=255.
pub fn float_to_rgb(cell: Cell) -> Rgb8 {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb8::new(channel(cell[0]), channel(cell[1]), channel(cell[2]))
}

pub fn rgb_to_decimal(rgb: Rgb8) -> u32 {
    rgb.r as u32 + rgb.g as u32 * 256 + rgb.b as u32 * 65536
}

pub fn decimal_to_rgb(decimal: u32) -> Rgb8 {
    Rgb8::new(
        (decimal & 0xFF) as u8,
        ((decimal >> 8) & 0xFF) as u8,
        ((decimal >> 16) & 0xFF) as u8,
    )
}

pub fn float_to_decimal(cell: Cell) -> u32 {
    rgb_to_decimal(float_to_rgb(cell))
}

pub fn decimal_to_float(decimal: u32) -> Cell {
    rgb_to_float(decimal_to_rgb(decimal))
}

/// Encode a composited grid into the frame the SDK expects.
pub fn encode_grid(grid: &Grid) -> PackedFrame {
    let mut frame = [[0u32; COLS]; ROWS];
    for (r, c, cell) in grid.iter() {
        frame[r][c] = float_to_decimal(cell);
    }
    frame
}
