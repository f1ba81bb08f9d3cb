/*
 *  display/error.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the display subsystem
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

use std::error::Error;
use std::fmt;

/// Renderer error, generic over the surface's own error type
#[derive(Debug)]
pub enum RenderError<E> {
    /// The surface rejected a paint or setup call
    Surface(E),

    /// Bars, width and height cannot form a bar layout
    InvalidGeometry { bars: u16, width: u32, height: u32 },

    /// Fewer magnitudes than bars were passed to draw_bars()
    MissingMagnitudes { expected: usize, actual: usize },
}

impl<E: fmt::Debug> fmt::Display for RenderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Surface(err) =>
                write!(f, "Display surface error: {:?}", err),
            RenderError::InvalidGeometry { bars, width, height } =>
                write!(f, "Cannot lay out {} bars on a {}x{} surface", bars, width, height),
            RenderError::MissingMagnitudes { expected, actual } =>
                write!(f, "Expected {} bar magnitudes, got {}", expected, actual),
        }
    }
}

// surface errors are only required to be Debug, so no source()
impl<E: fmt::Debug> Error for RenderError<E> {}

/// Rotation that is not a multiple of 90 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRotation(pub u16);

impl fmt::Display for InvalidRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid rotation angle: {} (must be 0, 90, 180, or 270)", self.0)
    }
}

impl Error for InvalidRotation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_messages() {
        let e: RenderError<()> = RenderError::MissingMagnitudes { expected: 8, actual: 3 };
        assert_eq!(e.to_string(), "Expected 8 bar magnitudes, got 3");
        let e: RenderError<()> = RenderError::InvalidGeometry { bars: 0, width: 160, height: 100 };
        assert_eq!(e.to_string(), "Cannot lay out 0 bars on a 160x100 surface");
        assert_eq!(InvalidRotation(45).to_string(),
            "Invalid rotation angle: 45 (must be 0, 90, 180, or 270)");
    }
}
