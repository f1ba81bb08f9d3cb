/*
 *  acquisition/simulated.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Simulated sample bus for running the pipeline without hardware
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

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::acquisition::peripheral::{PeripheralConfig, PeripheralError, SamplingPeripheral, WaitPolicy};
use crate::adc::{AdcChannel, Frame, frame_bytes};
use crate::constants::{ADC_MAX_VALUE, SIGNAL_BIAS};

/// One sine component of the simulated input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    /// Peak deviation from the bias, in ADC counts.
    pub amplitude: u16,
}

/// Stands in for the I2S/ADC driver: a sum of tones on a DC bias plus
/// uniform noise, packed with the channel tag like real frames.
///
/// Phase carries across reads. With `realtime` set, reads block for as long
/// as the hardware would need to sample the requested frames.
#[derive(Debug)]
pub struct SimulatedPeripheral {
    tones: Vec<Tone>,
    bias: u16,
    noise: u16,
    realtime: bool,
    installed: Option<PeripheralConfig>,
    channel: Option<AdcChannel>,
    sample_index: u64,
    rng: StdRng,
}

impl SimulatedPeripheral {
    pub fn new(tones: Vec<Tone>) -> Self {
        Self {
            tones,
            bias: SIGNAL_BIAS,
            noise: 0,
            realtime: false,
            installed: None,
            channel: None,
            sample_index: 0,
            rng: StdRng::seed_from_u64(0x5EED),
        }
    }

    pub fn with_bias(mut self, bias: u16) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_noise(mut self, noise: u16) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    pub fn bound_channel(&self) -> Option<AdcChannel> {
        self.channel
    }

    fn sample(&mut self, n: u64, sample_rate: u32) -> u16 {
        let t = n as f64 / sample_rate as f64;
        let mut v = self.bias as f64;
        for tone in &self.tones {
            v += tone.amplitude as f64 * (std::f64::consts::TAU * tone.frequency_hz as f64 * t).sin();
        }
        if self.noise > 0 {
            let n = self.noise as i32;
            v += self.rng.random_range(-n..=n) as f64;
        }
        v.round().clamp(0.0, ADC_MAX_VALUE as f64) as u16
    }
}

impl SamplingPeripheral for SimulatedPeripheral {
    fn install(&mut self, config: &PeripheralConfig) -> Result<(), PeripheralError> {
        if self.installed.is_some() {
            return Err(PeripheralError::InvalidArg);
        }
        if config.sample_rate == 0 || config.dma_buf_len == 0 || config.dma_buf_count < 2 {
            return Err(PeripheralError::InvalidArg);
        }
        info!("Simulated sample bus: {} sps, {} x {} frame DMA ring, {} tone(s)",
            config.sample_rate, config.dma_buf_count, config.dma_buf_len, self.tones.len());
        self.installed = Some(config.clone());
        Ok(())
    }

    fn uninstall(&mut self) -> Result<(), PeripheralError> {
        self.installed.take().ok_or(PeripheralError::NotInstalled)?;
        self.channel = None;
        Ok(())
    }

    fn bind_adc_channel(&mut self, channel: AdcChannel) -> Result<(), PeripheralError> {
        let config = self.installed.as_ref().ok_or(PeripheralError::NotInstalled)?;
        if !config.mode.adc_built_in {
            return Err(PeripheralError::InvalidArg);
        }
        self.channel = Some(channel);
        Ok(())
    }

    fn read<F: Frame>(&mut self, frames: &mut [F], wait: WaitPolicy) -> Result<usize, PeripheralError> {
        let config = self.installed.clone().ok_or(PeripheralError::NotInstalled)?;
        let channel = self.channel.ok_or(PeripheralError::InvalidArg)?;
        let width = config.bits_per_sample;
        if !width.fits::<F>() {
            return Err(PeripheralError::InvalidArg);
        }

        // a bounded wait only gets what the ADC could sample in that time
        let wanted = match wait {
            WaitPolicy::Forever => frames.len(),
            WaitPolicy::Timeout(t) => {
                let possible = (t.as_secs_f64() * config.sample_rate as f64) as usize;
                possible.min(frames.len())
            }
        };

        for slot in frames.iter_mut().take(wanted) {
            let n = self.sample_index;
            self.sample_index += 1;
            let value = self.sample(n, config.sample_rate);
            *slot = F::from_raw(width.pack(channel, value));
        }

        if self.realtime && wanted > 0 {
            let secs = wanted as f64 / config.sample_rate as f64;
            std::thread::sleep(Duration::from_secs_f64(secs));
        }

        debug!("Simulated read of {} frames", wanted);
        Ok(wanted * frame_bytes::<F>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::peripheral::PeripheralMode;
    use crate::adc::{FrameWidth, channel_from_frame};

    fn bus(width: FrameWidth, rate: u32) -> PeripheralConfig {
        PeripheralConfig {
            mode: PeripheralMode::ADC_CAPTURE,
            sample_rate: rate,
            bits_per_sample: width,
            dma_buf_count: 8,
            dma_buf_len: 16,
            use_apll: false,
        }
    }

    fn ready(tones: Vec<Tone>, width: FrameWidth) -> SimulatedPeripheral {
        let mut p = SimulatedPeripheral::new(tones);
        p.install(&bus(width, 40_000)).unwrap();
        p.bind_adc_channel(AdcChannel::new(4).unwrap()).unwrap();
        p
    }

    #[test]
    fn test_silence_reads_bias_with_channel_tag() {
        let mut p = ready(Vec::new(), FrameWidth::Bits16);
        let mut frames = [0u16; 16];
        let bytes = p.read(&mut frames, WaitPolicy::Forever).unwrap();
        assert_eq!(bytes, 32);
        for f in frames {
            assert_eq!(FrameWidth::Bits16.extract_value(f as u32), SIGNAL_BIAS);
            assert_eq!(channel_from_frame(f), 4);
        }
    }

    #[test]
    fn test_phase_continues_across_reads() {
        let tone = Tone { frequency_hz: 10_000.0, amplitude: 100 };
        let mut p = ready(vec![tone], FrameWidth::Bits32);
        let mut a = [0u32; 3];
        let mut b = [0u32; 3];
        p.read(&mut a, WaitPolicy::Forever).unwrap();
        p.read(&mut b, WaitPolicy::Forever).unwrap();
        let values: Vec<u16> = a.iter().chain(b.iter())
            .map(|&f| FrameWidth::Bits32.extract_value(f))
            .collect();
        assert_eq!(values, vec![1500, 1600, 1500, 1400, 1500, 1600]);
    }

    #[test]
    fn test_timeout_limits_frames() {
        let mut p = ready(Vec::new(), FrameWidth::Bits16);
        let mut frames = [0u16; 1024];
        // 40 ksps for 1 ms is 40 frames
        let bytes = p.read(&mut frames, WaitPolicy::Timeout(Duration::from_millis(1))).unwrap();
        assert_eq!(bytes, 80);
    }

    #[test]
    fn test_noise_stays_in_adc_range() {
        let mut p = SimulatedPeripheral::new(vec![Tone { frequency_hz: 440.0, amplitude: 2000 }])
            .with_noise(400)
            .with_seed(7);
        p.install(&bus(FrameWidth::Bits16, 40_000)).unwrap();
        p.bind_adc_channel(AdcChannel::new(0).unwrap()).unwrap();
        let mut frames = [0u16; 256];
        p.read(&mut frames, WaitPolicy::Forever).unwrap();
        assert!(frames.iter().all(|&f| (f as u32) <= ADC_MAX_VALUE));
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut p = SimulatedPeripheral::new(Vec::new());
        let mut frames = [0u16; 4];
        assert_eq!(p.read(&mut frames, WaitPolicy::Forever), Err(PeripheralError::NotInstalled));
        assert_eq!(p.bind_adc_channel(AdcChannel::default()), Err(PeripheralError::NotInstalled));
        assert_eq!(p.uninstall(), Err(PeripheralError::NotInstalled));

        p.install(&bus(FrameWidth::Bits16, 8_000)).unwrap();
        assert_eq!(p.install(&bus(FrameWidth::Bits16, 8_000)), Err(PeripheralError::InvalidArg));
        assert_eq!(p.read(&mut frames, WaitPolicy::Forever), Err(PeripheralError::InvalidArg));

        p.bind_adc_channel(AdcChannel::default()).unwrap();
        let mut wide = [0u32; 4];
        assert_eq!(p.read(&mut wide, WaitPolicy::Forever), Err(PeripheralError::InvalidArg));

        p.uninstall().unwrap();
        assert!(!p.is_installed());
        assert!(p.bound_channel().is_none());
    }

    #[test]
    fn test_rejects_bad_install() {
        let mut p = SimulatedPeripheral::new(Vec::new());
        assert_eq!(p.install(&bus(FrameWidth::Bits16, 0)), Err(PeripheralError::InvalidArg));
    }
}
