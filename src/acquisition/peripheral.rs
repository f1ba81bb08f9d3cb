/*
 *  acquisition/peripheral.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sample bus peripheral abstraction
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

use std::time::Duration;

use thiserror::Error;

use crate::adc::{AdcChannel, Frame, FrameWidth};

/// Status codes a sample bus driver can hand back.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralError {
    #[error("invalid argument")]
    InvalidArg,

    #[error("not enough memory")]
    NoMem,

    #[error("driver not installed")]
    NotInstalled,

    #[error("driver error code {0}")]
    Code(i32),
}

/// Operating mode flags of the sample bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralMode {
    /// Bus master, not slave of another bus.
    pub master: bool,

    /// Reading, not writing.
    pub receive: bool,

    /// Fed by the built-in ADC instead of external pins.
    pub adc_built_in: bool,
}

impl PeripheralMode {
    /// Master receiver fed by the internal ADC.
    pub const ADC_CAPTURE: PeripheralMode = PeripheralMode {
        master: true,
        receive: true,
        adc_built_in: true,
    };
}

/// Everything needed to install the sample bus driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralConfig {
    pub mode: PeripheralMode,

    /// Frames per second.
    pub sample_rate: u32,

    pub bits_per_sample: FrameWidth,

    /// Buffers in the DMA ring.
    pub dma_buf_count: usize,

    /// Frames (not bytes) per DMA buffer.
    pub dma_buf_len: usize,

    /// High precision audio PLL as bus clock. Not needed for the ADC.
    pub use_apll: bool,
}

/// How long a read may block waiting for the DMA ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    Forever,
    Timeout(Duration),
}

/// Sample bus driver capability: install, bind an ADC channel, read.
///
/// Implementations wrap the vendor driver on hardware or synthesize data
/// on a host.
pub trait SamplingPeripheral {
    fn install(&mut self, config: &PeripheralConfig) -> Result<(), PeripheralError>;

    fn uninstall(&mut self) -> Result<(), PeripheralError>;

    /// Route one ADC1 channel into the bus.
    fn bind_adc_channel(&mut self, channel: AdcChannel) -> Result<(), PeripheralError>;

    /// Fill `frames` from the DMA ring.
    ///
    /// Returns the number of **bytes** transferred, which may be short of
    /// `frames.len() * size_of::<F>()`.
    fn read<F: Frame>(&mut self, frames: &mut [F], wait: WaitPolicy) -> Result<usize, PeripheralError>;
}

impl<P: SamplingPeripheral> SamplingPeripheral for &mut P {
    fn install(&mut self, config: &PeripheralConfig) -> Result<(), PeripheralError> {
        (**self).install(config)
    }

    fn uninstall(&mut self) -> Result<(), PeripheralError> {
        (**self).uninstall()
    }

    fn bind_adc_channel(&mut self, channel: AdcChannel) -> Result<(), PeripheralError> {
        (**self).bind_adc_channel(channel)
    }

    fn read<F: Frame>(&mut self, frames: &mut [F], wait: WaitPolicy) -> Result<usize, PeripheralError> {
        (**self).read(frames, wait)
    }
}
