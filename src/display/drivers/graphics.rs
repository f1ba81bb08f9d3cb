/*
 *  display/drivers/graphics.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raster surface over any embedded-graphics draw target
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

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::display::traits::{RasterSurface, Rotation};

/// Adapts an embedded-graphics `DrawTarget` (a panel driver, a framebuffer)
/// to `RasterSurface`.
///
/// Rotation is applied here, clockwise: logical rectangles are mapped onto
/// the target's native axes and then clipped to its bounding box, so the
/// target only ever sees in-bounds solid fills.
#[derive(Debug)]
pub struct GraphicsSurface<D> {
    target: D,
    rotation: Rotation,
}

impl<D: DrawTarget> GraphicsSurface<D> {
    pub fn new(target: D) -> Self {
        Self { target, rotation: Rotation::Deg0 }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    /// Logical rectangle to native coordinates
    fn to_native(&self, x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        let native = self.target.bounding_box().size;
        let (nw, nh) = (native.width as i32, native.height as i32);
        let (wi, hi) = (w as i32, h as i32);
        let (top_left, size) = match self.rotation {
            Rotation::Deg0 => (Point::new(x, y), Size::new(w, h)),
            Rotation::Deg90 => (Point::new(nw - (y + hi), x), Size::new(h, w)),
            Rotation::Deg180 => (Point::new(nw - (x + wi), nh - (y + hi)), Size::new(w, h)),
            Rotation::Deg270 => (Point::new(y, nh - (x + wi)), Size::new(h, w)),
        };
        Rectangle::new(top_left, size)
    }
}

impl<D> RasterSurface for GraphicsSurface<D>
where
    D: DrawTarget,
    D::Color: fmt::Debug,
    D::Error: fmt::Debug,
{
    type Color = D::Color;
    type Error = D::Error;

    fn dimensions(&self) -> (u32, u32) {
        let Size { width, height } = self.target.bounding_box().size;
        if self.rotation.swaps_axes() { (height, width) } else { (width, height) }
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error> {
        debug!("Surface rotation {}°", rotation.degrees());
        self.rotation = rotation;
        Ok(())
    }

    fn fill_screen(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.target.clear(color)
    }

    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let area = self.to_native(x, y, width, height)
            .intersection(&self.target.bounding_box());
        if area.size.width == 0 || area.size.height == 0 {
            return Ok(());
        }
        self.target.fill_solid(&area, color)
    }
}
