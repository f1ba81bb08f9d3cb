/*
 *  display/traits.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for raster surface abstraction
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

use serde::{Deserialize, Serialize};

use crate::display::error::InvalidRotation;

/// Panel orientation in quarter turns clockwise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether logical width and height are swapped relative to the panel.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees).ok_or(InvalidRotation(degrees))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Minimal raster capability the bar renderer paints through.
///
/// Coordinates are logical, after rotation, origin top-left. Only solid
/// fills are needed: bars are axis-aligned rectangles and the renderer
/// never reads pixels back.
pub trait RasterSurface {
    /// The color type used by this surface
    type Color: Copy + PartialEq + fmt::Debug;

    /// Error reported by the underlying display
    type Error: fmt::Debug;

    /// Logical (width, height) under the current rotation
    fn dimensions(&self) -> (u32, u32);

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error>;

    /// Fill the whole surface
    fn fill_screen(&mut self, color: Self::Color) -> Result<(), Self::Error>;

    /// Fill an axis-aligned rectangle; parts outside the surface are clipped
    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Self::Color,
    ) -> Result<(), Self::Error>;
}

impl<S: RasterSurface + ?Sized> RasterSurface for &mut S {
    type Color = S::Color;
    type Error = S::Error;

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error> {
        (**self).set_rotation(rotation)
    }

    fn fill_screen(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        (**self).fill_screen(color)
    }

    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        (**self).fill_rect(x, y, width, height, color)
    }
}
