/*
 *  display/mod.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - raster surfaces and the falling-bar renderer
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod color;

// Surface implementations
pub mod drivers;

// Bars renderer
pub mod bars;

// Re-exports for convenience
pub use traits::{RasterSurface, Rotation};
pub use error::{InvalidRotation, RenderError};
pub use framebuffer::FrameBuf;
pub use color::Color;
pub use drivers::graphics::GraphicsSurface;
pub use drivers::mock::{MockSurface, MockSurfaceError, SurfaceOp};
pub use bars::BarDisplayRenderer;
