/*
 *  adc.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame layouts and ADC value-domain conversions
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
use thiserror::Error;

use crate::constants::{
    ADC1_CHANNEL_BITS_PER_FRAME, ADC1_CHANNEL_COUNT, ADC_MAX_MVOLTS, ADC_MAX_VALUE,
    ADC_VALUE_MASK, DEFAULT_ADC_CHANNEL,
};

/// One raw sample slot as written by the sample bus DMA.
///
/// The slot holds the 12-bit ADC reading plus, in its top bits, the id of the
/// channel that produced it. Where the reading sits depends on the
/// [`FrameWidth`] the bus was configured with.
pub trait Frame: Copy + Default + PartialEq + fmt::Debug + Send + 'static {
    /// Storage width of the slot in bits.
    const BITS: u32;

    /// Truncating conversion from a 32-bit raw word.
    fn from_raw(raw: u32) -> Self;

    /// Zero-extended raw word.
    fn raw(self) -> u32;
}

impl Frame for u16 {
    const BITS: u32 = 16;

    #[inline]
    fn from_raw(raw: u32) -> Self {
        raw as u16
    }

    #[inline]
    fn raw(self) -> u32 {
        self as u32
    }
}

impl Frame for u32 {
    const BITS: u32 = 32;

    #[inline]
    fn from_raw(raw: u32) -> Self {
        raw
    }

    #[inline]
    fn raw(self) -> u32 {
        self
    }
}

/// Bytes occupied by one frame of type `F`.
#[inline]
pub const fn frame_bytes<F: Frame>() -> usize {
    std::mem::size_of::<F>()
}

/// Channel id packed into the top bits of a frame.
#[inline]
pub fn channel_from_frame<F: Frame>(frame: F) -> u8 {
    ((frame.raw() >> (F::BITS - ADC1_CHANNEL_BITS_PER_FRAME)) & 0x0F) as u8
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("frame width must be 16, 24 or 32 bits, got {0}")]
pub struct InvalidFrameWidth(pub u8);

/// Bits per sample the bus is configured for.
///
/// 16 bits is the natural fit for the built-in 12-bit ADC. 24 and 32 bit
/// frames are stored in `u32` slots with the reading in the upper half.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FrameWidth {
    #[default]
    Bits16,
    Bits24,
    Bits32,
}

impl FrameWidth {
    pub const fn bits(self) -> u8 {
        match self {
            FrameWidth::Bits16 => 16,
            FrameWidth::Bits24 => 24,
            FrameWidth::Bits32 => 32,
        }
    }

    /// Width of the memory slot a frame of this width lands in.
    pub const fn storage_bits(self) -> u32 {
        match self {
            FrameWidth::Bits16 => 16,
            FrameWidth::Bits24 | FrameWidth::Bits32 => 32,
        }
    }

    /// Whether frames of this width can be stored in `F`.
    pub fn fits<F: Frame>(self) -> bool {
        F::BITS == self.storage_bits()
    }

    /// ADC reading of a raw frame, channel bits stripped.
    #[inline]
    pub fn extract_value(self, raw: u32) -> u16 {
        match self {
            FrameWidth::Bits16 => (raw & ADC_VALUE_MASK) as u16,
            FrameWidth::Bits24 | FrameWidth::Bits32 => ((raw >> 16) & ADC_VALUE_MASK) as u16,
        }
    }

    /// Pack a reading and its channel the way the sampling unit lays them out.
    pub fn pack(self, channel: AdcChannel, value: u16) -> u32 {
        let value = value as u32 & ADC_VALUE_MASK;
        let tag = channel.index() as u32;
        match self {
            FrameWidth::Bits16 => (tag << (16 - ADC1_CHANNEL_BITS_PER_FRAME)) | value,
            FrameWidth::Bits24 | FrameWidth::Bits32 => {
                (tag << (32 - ADC1_CHANNEL_BITS_PER_FRAME)) | (value << 16)
            }
        }
    }
}

impl TryFrom<u8> for FrameWidth {
    type Error = InvalidFrameWidth;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(FrameWidth::Bits16),
            24 => Ok(FrameWidth::Bits24),
            32 => Ok(FrameWidth::Bits32),
            other => Err(InvalidFrameWidth(other)),
        }
    }
}

impl From<FrameWidth> for u8 {
    fn from(width: FrameWidth) -> Self {
        width.bits()
    }
}

impl fmt::Display for FrameWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("ADC1 has channels 0 to 7, got {0}")]
pub struct InvalidAdcChannel(pub u8);

/// ADC1 input channel bound to the sample bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AdcChannel(u8);

impl AdcChannel {
    pub const fn new(index: u8) -> Option<Self> {
        if index < ADC1_CHANNEL_COUNT {
            Some(AdcChannel(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

impl Default for AdcChannel {
    fn default() -> Self {
        AdcChannel(DEFAULT_ADC_CHANNEL)
    }
}

impl TryFrom<u8> for AdcChannel {
    type Error = InvalidAdcChannel;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        AdcChannel::new(index).ok_or(InvalidAdcChannel(index))
    }
}

impl From<AdcChannel> for u8 {
    fn from(channel: AdcChannel) -> Self {
        channel.0
    }
}

impl fmt::Display for AdcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADC1_CH{}", self.0)
    }
}

// value domain conversions, integer math truncates like the hardware docs do

#[inline]
pub fn value_to_mvolts(value: u32) -> u32 {
    (value as u64 * ADC_MAX_MVOLTS as u64 / ADC_MAX_VALUE as u64) as u32
}

#[inline]
pub fn mvolts_to_value(mv: u32) -> u32 {
    (mv as u64 * ADC_MAX_VALUE as u64 / ADC_MAX_MVOLTS as u64) as u32
}

#[inline]
pub fn value_to_volts(value: u32) -> f32 {
    value_to_mvolts(value) as f32 / 1000.0
}

#[inline]
pub fn volts_to_value(volts: f32) -> u32 {
    mvolts_to_value((volts.max(0.0) * 1000.0) as u32)
}
