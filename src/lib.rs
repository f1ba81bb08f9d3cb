/*
 *  lib.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sampled audio spectrum on a falling-bar display
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

//! Audio capture through a DMA-backed sample bus in ADC mode, rendered as
//! a falling-bar spectrum on a small raster display.
//!
//! [`acquisition::AcquisitionEngine`] owns the sample buffer and the bus
//! lifecycle. [`display::BarDisplayRenderer`] paints bars incrementally on
//! any [`display::RasterSurface`]. Both take an injectable [`clock::Clock`].

pub mod constants;
pub mod adc;
pub mod clock;
pub mod acquisition;
pub mod display;
pub mod spectrum;
pub mod config;
pub mod func_timer;
