/*
 *  display/color.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Palette colors for bars and background
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::str::FromStr;

use embedded_graphics::pixelcolor::{BinaryColor, Rgb565, Rgb888};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color '{0}' (use a name such as 'green' or '#rrggbb')")]
pub struct InvalidColor(pub String);

/// Surface-independent color, resolved per panel type at wiring time
///
/// Parses from a palette name or `#rrggbb`, which is also how it appears in
/// the YAML configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Gray,
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match *self {
            Color::Black => (0, 0, 0),
            Color::White => (255, 255, 255),
            Color::Red => (255, 0, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
            Color::Yellow => (255, 255, 0),
            Color::Cyan => (0, 255, 255),
            Color::Magenta => (255, 0, 255),
            Color::Gray => (128, 128, 128),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    pub fn to_rgb888(&self) -> Rgb888 {
        let (r, g, b) = self.rgb();
        Rgb888::new(r, g, b)
    }

    /// Convert for 16-bit TFT panels
    pub fn to_rgb565(&self) -> Rgb565 {
        Rgb565::from(self.to_rgb888())
    }

    /// Convert for monochrome displays, threshold at 50% on the brightest channel
    pub fn to_binary(&self) -> BinaryColor {
        let (r, g, b) = self.rgb();
        if r.max(g).max(b) >= 128 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }

    /// Get luminance value (0-255), Rec. 601 weights
    pub fn luminance(&self) -> u8 {
        let (r, g, b) = self.rgb();
        ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
    }

    fn name(&self) -> Option<&'static str> {
        Some(match self {
            Color::Black => "black",
            Color::White => "white",
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Cyan => "cyan",
            Color::Magenta => "magenta",
            Color::Gray => "gray",
            Color::Rgb(..) => return None,
        })
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let named = match t.as_str() {
            "black" => Some(Color::Black),
            "white" => Some(Color::White),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "yellow" => Some(Color::Yellow),
            "cyan" => Some(Color::Cyan),
            "magenta" => Some(Color::Magenta),
            "gray" | "grey" => Some(Color::Gray),
            _ => None,
        };
        if let Some(c) = named {
            return Ok(c);
        }

        let hex = t.strip_prefix('#').ok_or_else(|| InvalidColor(s.to_string()))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(s.to_string()));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| InvalidColor(s.to_string()));
        Ok(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => {
                let (r, g, b) = self.rgb();
                write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
            }
        }
    }
}
