/*
 *  acquisition/mod.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Audio acquisition through the DMA-backed sample bus
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

// Peripheral capability and its configuration
pub mod peripheral;
pub mod error;

// Sampling engine
pub mod engine;

// Host stand-in for the I2S/ADC driver
pub mod simulated;

// Re-exports for convenience
pub use peripheral::{PeripheralConfig, PeripheralError, PeripheralMode, SamplingPeripheral, WaitPolicy};
pub use error::{AcquisitionError, FaultStage};
pub use engine::{Acquired, AcquisitionConfig, AcquisitionEngine, ReadStats, SampleBuffer};
pub use simulated::{SimulatedPeripheral, Tone};
