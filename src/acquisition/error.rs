/*
 *  acquisition/error.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the sampling engine
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

use thiserror::Error;

use crate::acquisition::peripheral::PeripheralError;
use crate::adc::FrameWidth;

/// Which peripheral call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStage {
    Uninstall,
    Install,
    BindChannel,
    Read,
}

impl fmt::Display for FaultStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultStage::Uninstall => "driver uninstall",
            FaultStage::Install => "driver install",
            FaultStage::BindChannel => "ADC channel binding",
            FaultStage::Read => "sample read",
        };
        f.write_str(s)
    }
}

/// Sampling engine errors.
///
/// Peripheral and configuration faults leave the sampling path in an
/// undefined state. The engine never retries them; halting, resetting or
/// re-running `init()` is up to the caller.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("{stage} failed: {source}")]
    Peripheral {
        stage: FaultStage,
        #[source]
        source: PeripheralError,
    },

    #[error("{width} frames do not fit {storage_bits}-bit sample slots")]
    FrameWidthMismatch { width: FrameWidth, storage_bits: u32 },

    #[error("invalid acquisition configuration: {0}")]
    InvalidConfig(String),

    #[error("sampling engine used before init()")]
    NotInitialized,
}

impl AcquisitionError {
    pub(crate) fn peripheral(stage: FaultStage, source: PeripheralError) -> Self {
        AcquisitionError::Peripheral { stage, source }
    }

    /// Unrecoverable hardware or configuration fault.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AcquisitionError::NotInitialized)
    }
}
