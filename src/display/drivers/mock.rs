/*
 *  display/drivers/mock.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock surface for testing without hardware
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
use std::sync::{Arc, Mutex};

use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use thiserror::Error;

use crate::display::framebuffer::FrameBuf;
use crate::display::traits::{RasterSurface, Rotation};

/// One call made on the surface, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp<C> {
    SetRotation(Rotation),
    FillScreen(C),
    FillRect { x: i32, y: i32, width: u32, height: u32, color: C },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MockSurfaceError {
    #[error("Simulated surface failure")]
    SimulatedFailure,
}

/// Internal state for the mock surface (shared for inspection in tests)
#[derive(Debug)]
pub struct MockSurfaceState<C: PixelColor> {
    /// Logical pixels, resized when rotation swaps the axes
    pub framebuffer: FrameBuf<C>,

    /// Every call, oldest first
    pub ops: Vec<SurfaceOp<C>>,

    pub rotation: Rotation,

    /// Fail every call while set
    pub simulate_failure: bool,
}

/// Mock surface for testing
///
/// Records all operations and paints them into a framebuffer, in logical
/// coordinates. Clones share the same state, so a test can keep a handle
/// while the renderer owns the surface.
#[derive(Debug, Clone)]
pub struct MockSurface<C: PixelColor> {
    /// Native (unrotated) width and height
    native: (u32, u32),

    fill: C,

    state: Arc<Mutex<MockSurfaceState<C>>>,
}

impl<C: PixelColor> MockSurface<C> {
    /// Create a surface of `width` x `height`, every pixel set to `fill`
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let state = MockSurfaceState {
            framebuffer: FrameBuf::new(width, height, fill),
            ops: Vec::new(),
            rotation: Rotation::Deg0,
            simulate_failure: false,
        };
        Self {
            native: (width, height),
            fill,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSurfaceState<C>>> {
        Arc::clone(&self.state)
    }

    pub fn set_simulate_failure(&self, fail: bool) {
        self.state.lock().unwrap().simulate_failure = fail;
    }

    /// Snapshot of the recorded operations
    pub fn ops(&self) -> Vec<SurfaceOp<C>> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Drain the recorded operations
    pub fn take_ops(&self) -> Vec<SurfaceOp<C>> {
        std::mem::take(&mut self.state.lock().unwrap().ops)
    }

    /// Number of fill_rect calls recorded
    pub fn rect_count(&self) -> usize {
        self.state.lock().unwrap().ops.iter()
            .filter(|op| matches!(op, SurfaceOp::FillRect { .. }))
            .count()
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<C> {
        self.state.lock().unwrap().framebuffer.pixel(x, y)
    }

    /// Count of pixels holding `color`
    pub fn count(&self, color: C) -> usize {
        self.state.lock().unwrap().framebuffer.count(color)
    }

    /// Run of `color` pixels in column `x`, counted up from the bottom row
    pub fn column_height(&self, x: i32, color: C) -> u32 {
        let state = self.state.lock().unwrap();
        let fb = &state.framebuffer;
        let mut run = 0;
        for y in (0..fb.height() as i32).rev() {
            if fb.pixel(x, y) != Some(color) {
                break;
            }
            run += 1;
        }
        run
    }

    pub fn to_ascii(&self, background: C) -> String {
        self.state.lock().unwrap().framebuffer.to_ascii(background)
    }

    fn logical_size(&self, rotation: Rotation) -> (u32, u32) {
        let (w, h) = self.native;
        if rotation.swaps_axes() { (h, w) } else { (w, h) }
    }
}

impl<C: PixelColor + fmt::Debug> RasterSurface for MockSurface<C> {
    type Color = C;
    type Error = MockSurfaceError;

    fn dimensions(&self) -> (u32, u32) {
        let rotation = self.state.lock().unwrap().rotation;
        self.logical_size(rotation)
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error> {
        let (w, h) = self.logical_size(rotation);
        let mut state = self.state.lock().unwrap();
        if state.simulate_failure {
            return Err(MockSurfaceError::SimulatedFailure);
        }
        state.ops.push(SurfaceOp::SetRotation(rotation));
        if state.rotation.swaps_axes() != rotation.swaps_axes() {
            state.framebuffer = FrameBuf::new(w, h, self.fill);
        }
        state.rotation = rotation;
        Ok(())
    }

    fn fill_screen(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_failure {
            return Err(MockSurfaceError::SimulatedFailure);
        }
        state.ops.push(SurfaceOp::FillScreen(color));
        state.framebuffer.clear_color(color);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_failure {
            return Err(MockSurfaceError::SimulatedFailure);
        }
        state.ops.push(SurfaceOp::FillRect { x, y, width, height, color });
        let area = Rectangle::new(Point::new(x, y), Size::new(width, height));
        // FrameBuf is infallible
        let _ = state.framebuffer.fill_solid(&area, color);
        Ok(())
    }
}
