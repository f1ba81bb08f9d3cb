/*
 *  constants.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Hardware limits and defaults shared by acquisition and display
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

// ADC limits. These are fixed by the silicon, not user tunable.

/// Bits of real ADC resolution inside every frame.
pub const ADC_RESOLUTION: u32 = 12;
/// Largest count the ADC can report (0xFFF for 12 bits).
pub const ADC_MAX_VALUE: u32 = (1 << ADC_RESOLUTION) - 1;
/// Mask selecting the ADC value once shifted down to bit 0.
pub const ADC_VALUE_MASK: u32 = ADC_MAX_VALUE;
/// Full-scale input voltage in millivolts.
pub const ADC_MAX_MVOLTS: u32 = 3300;
/// High bits of each frame the sampling unit uses to tag the ADC1 channel.
pub const ADC1_CHANNEL_BITS_PER_FRAME: u32 = 4;
/// ADC1 exposes eight channels; only ADC1 can be bound to the sample bus.
pub const ADC1_CHANNEL_COUNT: u8 = 8;

// Sample bus (I2S in ADC mode)

/// Number of DMA buffers in the ring. One fills while the others drain.
pub const DMA_BUFFER_COUNT: usize = 8;

/// 40 kHz keeps 1024-frame buffers at ~25 ms, roughly 39 Hz per FFT bin.
pub const DEFAULT_SAMPLE_RATE: u32 = 40_000;
pub const DEFAULT_FRAME_COUNT: usize = 1024;
pub const DEFAULT_ADC_CHANNEL: u8 = 4;

/// Bias used by the synthetic test signal, in ADC counts.
pub const SIGNAL_BIAS: u16 = 1500;

// Bars display

pub const DEFAULT_BARS: u16 = 16;
pub const DEFAULT_DISPLAY_WIDTH: u32 = 160;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 128;
pub const DEFAULT_FALL_INTERVAL_MS: u32 = 50;
pub const DEFAULT_FALL_STEP_PX: u32 = 4;
