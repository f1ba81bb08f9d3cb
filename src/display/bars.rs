/*
 *  display/bars.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Incremental falling-bar spectrum renderer
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

use log::{debug, info, warn};

use crate::clock::{Clock, IntervalGate};
use crate::constants::{DEFAULT_FALL_INTERVAL_MS, DEFAULT_FALL_STEP_PX};
use crate::display::error::RenderError;
use crate::display::traits::{RasterSurface, Rotation};

/// Vertical bars that jump up at once and sink back at a bounded rate.
///
/// Each call paints only the strips that changed since the previous call:
/// a rising bar gets the newly covered rows in the foreground color, a
/// falling bar gets the uncovered rows in the background color. Falling is
/// paced by one gate shared by all bars, so every bar that falls in a call
/// falls together, by at most `fall_step` pixels.
///
/// Bars are `width / bars_count` pixels wide, left to right, growing up
/// from the bottom edge. Any remainder columns on the right stay untouched.
pub struct BarDisplayRenderer<S: RasterSurface, C: Clock> {
    surface: S,
    clock: C,
    rotation: Rotation,
    background: S::Color,
    foreground: S::Color,

    fall_gate: IntervalGate,
    fall_step: u32,

    bars_count: u16,
    width: u32,
    height: u32,
    bar_width: u32,
    // currently painted height per bar
    heights: Vec<u32>,
}

impl<S: RasterSurface, C: Clock> BarDisplayRenderer<S, C> {
    pub fn new(surface: S, clock: C, background: S::Color, foreground: S::Color) -> Self {
        Self {
            surface,
            clock,
            rotation: Rotation::Deg0,
            background,
            foreground,
            fall_gate: IntervalGate::new(DEFAULT_FALL_INTERVAL_MS),
            fall_step: DEFAULT_FALL_STEP_PX,
            bars_count: 0,
            width: 0,
            height: 0,
            bar_width: 0,
            heights: Vec::new(),
        }
    }

    /// Lay out `bars_count` bars on a `width` x `height` area and clear it.
    ///
    /// Safe to call again to change the layout: the surface is cleared and
    /// every bar restarts from zero.
    pub fn init(
        &mut self,
        bars_count: u16,
        width: u32,
        height: u32,
        fall_interval_ms: u32,
        fall_step: u32,
    ) -> Result<(), RenderError<S::Error>> {
        if bars_count == 0 || width == 0 || height == 0 || bars_count as u32 > width {
            return Err(RenderError::InvalidGeometry { bars: bars_count, width, height });
        }

        self.surface.set_rotation(self.rotation).map_err(RenderError::Surface)?;
        self.surface.fill_screen(self.background).map_err(RenderError::Surface)?;

        let (sw, sh) = self.surface.dimensions();
        if width > sw || height > sh {
            warn!("Bar area {}x{} exceeds the {}x{} surface, overflow is clipped",
                width, height, sw, sh);
        }

        self.bars_count = bars_count;
        self.width = width;
        self.height = height;
        self.bar_width = width / bars_count as u32;
        self.heights = vec![0; bars_count as usize];
        self.fall_step = fall_step;
        self.fall_gate.set_interval_ms(fall_interval_ms);
        self.fall_gate.arm(self.clock.now_ms());

        info!("Bars: {} x {}px on {}x{} (rotated {}°), fall {}px every {}ms",
            bars_count, self.bar_width, width, height, self.rotation.degrees(),
            fall_step, fall_interval_ms);
        Ok(())
    }

    /// Bring the painted bars towards `magnitudes` (pixels, clamped to height).
    ///
    /// Needs at least one magnitude per bar; extra entries are ignored.
    /// Returns how many bars were repainted.
    pub fn draw_bars(&mut self, magnitudes: &[u32]) -> Result<usize, RenderError<S::Error>> {
        let bars = self.bars_count as usize;
        if magnitudes.len() < bars {
            return Err(RenderError::MissingMagnitudes { expected: bars, actual: magnitudes.len() });
        }

        let fall_open = self.fall_gate.poll(self.clock.now_ms());
        let mut repainted = 0;

        for (i, &raw) in magnitudes.iter().take(bars).enumerate() {
            let target = raw.min(self.height);
            let current = self.heights[i];
            let x = (i as u32 * self.bar_width) as i32;

            if target > current {
                // rise immediately, paint only the newly covered strip
                let top = (self.height - target) as i32;
                self.surface
                    .fill_rect(x, top, self.bar_width, target - current, self.foreground)
                    .map_err(RenderError::Surface)?;
                self.heights[i] = target;
                repainted += 1;
            } else if fall_open && current > 0 && current != target {
                let next = if current <= self.fall_step {
                    0
                } else {
                    current - (current - target).min(self.fall_step)
                };
                if next != current {
                    let top = (self.height - current) as i32;
                    self.surface
                        .fill_rect(x, top, self.bar_width, current - next, self.background)
                        .map_err(RenderError::Surface)?;
                    self.heights[i] = next;
                    repainted += 1;
                }
            }
        }

        if repainted > 0 {
            debug!("Repainted {} of {} bars (fall gate {})", repainted, bars,
                if fall_open { "open" } else { "closed" });
        }
        Ok(repainted)
    }

    pub fn fall_interval_ms(&self) -> u32 {
        self.fall_gate.interval_ms()
    }

    /// Takes effect after the pending fall deadline
    pub fn set_fall_interval_ms(&mut self, interval_ms: u32) {
        self.fall_gate.set_interval_ms(interval_ms);
    }

    pub fn fall_step(&self) -> u32 {
        self.fall_step
    }

    pub fn set_fall_step(&mut self, step: u32) {
        self.fall_step = step;
    }

    pub fn background(&self) -> S::Color {
        self.background
    }

    /// Used from the next painted strip on; nothing is repainted
    pub fn set_background(&mut self, color: S::Color) {
        self.background = color;
    }

    pub fn foreground(&self) -> S::Color {
        self.foreground
    }

    pub fn set_foreground(&mut self, color: S::Color) {
        self.foreground = color;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Applied by the next init()
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn bars_count(&self) -> u16 {
        self.bars_count
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bar_width(&self) -> u32 {
        self.bar_width
    }

    /// Currently painted height of each bar
    pub fn bar_heights(&self) -> &[u32] {
        &self.heights
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn log_detailed_info(&self) {
        info!("Bar area {}x{} (rotated {}°), {} bars of {}px",
            self.width, self.height, self.rotation.degrees(), self.bars_count, self.bar_width);
        info!("Fall {}px every {}ms, colors {:?} on {:?}",
            self.fall_step, self.fall_gate.interval_ms(), self.foreground, self.background);
        debug!("Bar heights {:?}", self.heights);
    }
}
