/*
 *  acquisition/engine.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sample bus + built-in ADC acquisition engine
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

use std::ops::Deref;

use log::{debug, error, info, warn};

use crate::acquisition::error::{AcquisitionError, FaultStage};
use crate::acquisition::peripheral::{
    PeripheralConfig, PeripheralError, PeripheralMode, SamplingPeripheral, WaitPolicy,
};
use crate::adc::{self, AdcChannel, Frame, FrameWidth, frame_bytes};
use crate::clock::Clock;
use crate::constants::{
    ADC_MAX_VALUE, DEFAULT_FRAME_COUNT, DEFAULT_SAMPLE_RATE, DMA_BUFFER_COUNT, SIGNAL_BIAS,
};

/// Sampling parameters. Everything but the offset takes effect at the next
/// [`AcquisitionEngine::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionConfig {
    pub adc_channel: AdcChannel,

    /// Bound by the ADC, not the bus. The bus itself fills buffers at
    /// ~1.4 Msps, documented ADC limit is 150 ksps.
    pub sample_rate: u32,

    /// Frames per read, also the DMA buffer length.
    pub frame_count: usize,

    pub frame_width: FrameWidth,

    /// DC bias in ADC counts. Half scale (~2048) is ideal; measure yours
    /// with [`AcquisitionEngine::calculate_offset_value`].
    pub offset: u16,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            adc_channel: AdcChannel::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_count: DEFAULT_FRAME_COUNT,
            frame_width: FrameWidth::Bits16,
            offset: 0,
        }
    }
}

/// Fixed-capacity frame storage the DMA reads land in.
#[derive(Debug, Clone)]
pub struct SampleBuffer<F: Frame> {
    frames: Vec<F>,
}

impl<F: Frame> SampleBuffer<F> {
    fn new(capacity: usize) -> Self {
        Self { frames: vec![F::default(); capacity] }
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Bytes requested from the bus per read.
    pub fn byte_size(&self) -> usize {
        self.frames.len() * frame_bytes::<F>()
    }

    pub fn as_slice(&self) -> &[F] {
        &self.frames
    }

    fn as_mut_slice(&mut self) -> &mut [F] {
        &mut self.frames
    }
}

impl<F: Frame> Deref for SampleBuffer<F> {
    type Target = [F];

    fn deref(&self) -> &[F] {
        &self.frames
    }
}

/// Result of one read: the whole buffer plus how many leading frames are fresh.
#[derive(Debug, Clone, Copy)]
pub struct Acquired<'a, F: Frame> {
    pub frames: &'a [F],
    pub count: usize,
}

impl<'a, F: Frame> Acquired<'a, F> {
    /// Frames written by this read. Anything after is left over from the last one.
    pub fn filled(&self) -> &'a [F] {
        &self.frames[..self.count.min(self.frames.len())]
    }

    pub fn is_short(&self) -> bool {
        self.count < self.frames.len()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub reads: u64,
    pub short_reads: u64,
    pub frames: u64,
}

/// Parameters the running session was installed with.
#[derive(Debug)]
struct Session<F: Frame> {
    channel: AdcChannel,
    sample_rate: u32,
    width: FrameWidth,
    buffer: SampleBuffer<F>,
}

/// Drives the sample bus in ADC mode and owns the frame buffer.
///
/// `F` is the frame slot type: `u16` for 16-bit frames, `u32` for 24 and
/// 32-bit frames.
pub struct AcquisitionEngine<P, F, C>
where
    P: SamplingPeripheral,
    F: Frame,
    C: Clock,
{
    peripheral: P,
    clock: C,
    config: AcquisitionConfig,
    session: Option<Session<F>>,
    signal_key: Option<(u32, u16)>,
    stats: ReadStats,
}

fn fault(stage: FaultStage, source: PeripheralError) -> AcquisitionError {
    error!("Sample bus {} failed ({}), sampling cannot continue", stage, source);
    AcquisitionError::peripheral(stage, source)
}

impl<P, F, C> AcquisitionEngine<P, F, C>
where
    P: SamplingPeripheral,
    F: Frame,
    C: Clock,
{
    pub fn new(peripheral: P, clock: C) -> Self {
        Self::with_config(peripheral, clock, AcquisitionConfig::default())
    }

    pub fn with_config(peripheral: P, clock: C, config: AcquisitionConfig) -> Self {
        Self {
            peripheral,
            clock,
            config,
            session: None,
            signal_key: None,
            stats: ReadStats::default(),
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn adc_channel(&self) -> AdcChannel {
        self.config.adc_channel
    }

    pub fn set_adc_channel(&mut self, channel: AdcChannel) {
        self.config.adc_channel = channel;
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn set_sample_rate(&mut self, sps: u32) {
        self.config.sample_rate = sps;
    }

    pub fn frame_count(&self) -> usize {
        self.config.frame_count
    }

    pub fn set_frame_count(&mut self, frames: usize) {
        self.config.frame_count = frames;
    }

    pub fn frame_width(&self) -> FrameWidth {
        self.config.frame_width
    }

    pub fn set_frame_width(&mut self, width: FrameWidth) {
        self.config.frame_width = width;
    }

    pub fn offset_value(&self) -> u16 {
        self.config.offset
    }

    pub fn set_offset_value(&mut self, offset: u16) {
        self.config.offset = offset;
    }

    pub fn offset_mvolts(&self) -> u16 {
        adc::value_to_mvolts(self.config.offset as u32) as u16
    }

    /// Sets the offset from millivolts; returns the millivolts actually
    /// represented after quantization to ADC counts.
    pub fn set_offset_mvolts(&mut self, mv: u16) -> u16 {
        self.config.offset = adc::mvolts_to_value(mv as u32).min(ADC_MAX_VALUE) as u16;
        self.offset_mvolts()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Bytes requested per read, 0 before `init()`.
    pub fn buffer_byte_size(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.buffer.byte_size())
    }

    pub fn frames(&self) -> Option<&[F]> {
        self.session.as_ref().map(|s| s.buffer.as_slice())
    }

    pub fn buffer(&self) -> Option<&SampleBuffer<F>> {
        self.session.as_ref().map(|s| &s.buffer)
    }

    pub fn read_stats(&self) -> ReadStats {
        self.stats
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// (Re)acquire the sample bus and allocate a fresh buffer.
    ///
    /// A running session is torn down first. Any driver failure is fatal.
    pub fn init(&mut self) -> Result<&[F], AcquisitionError> {
        let AcquisitionConfig { adc_channel, sample_rate, frame_count, frame_width, .. } =
            self.config.clone();

        info!("Configuring sample bus: {} frames, {} at {} sps on {}",
            frame_count, frame_width, sample_rate, adc_channel);

        if !frame_width.fits::<F>() {
            error!("{} frames cannot be stored in {}-bit slots", frame_width, F::BITS);
            return Err(AcquisitionError::FrameWidthMismatch {
                width: frame_width,
                storage_bits: F::BITS,
            });
        }
        if frame_count == 0 {
            error!("Frame count must be > 0");
            return Err(AcquisitionError::InvalidConfig("frame count must be > 0".into()));
        }
        if sample_rate == 0 {
            error!("Sample rate must be > 0");
            return Err(AcquisitionError::InvalidConfig("sample rate must be > 0".into()));
        }

        if self.session.take().is_some() {
            self.signal_key = None;
            self.peripheral.uninstall().map_err(|e| fault(FaultStage::Uninstall, e))?;
            debug!("Previous sample bus session released");
        }

        let buffer = SampleBuffer::<F>::new(frame_count);

        let bus_config = PeripheralConfig {
            mode: PeripheralMode::ADC_CAPTURE,
            sample_rate,
            bits_per_sample: frame_width,
            dma_buf_count: DMA_BUFFER_COUNT,
            dma_buf_len: frame_count,
            use_apll: false,
        };

        self.peripheral.install(&bus_config).map_err(|e| fault(FaultStage::Install, e))?;
        info!("Sample bus driver installed, {} DMA buffers of {} frames",
            DMA_BUFFER_COUNT, frame_count);

        if let Err(e) = self.peripheral.bind_adc_channel(adc_channel) {
            // leave nothing half-installed behind
            let _ = self.peripheral.uninstall();
            return Err(fault(FaultStage::BindChannel, e));
        }
        info!("ADC mode active, {} bound", adc_channel);

        let session = self.session.insert(Session {
            channel: adc_channel,
            sample_rate,
            width: frame_width,
            buffer,
        });
        Ok(session.buffer.as_slice())
    }

    /// Uninstall the bus driver and drop the buffer.
    pub fn release(&mut self) -> Result<(), AcquisitionError> {
        if self.session.take().is_some() {
            self.signal_key = None;
            self.peripheral.uninstall().map_err(|e| fault(FaultStage::Uninstall, e))?;
            info!("Sample bus released");
        }
        Ok(())
    }

    /// Blocking read of one buffer worth of frames.
    ///
    /// Once the DMA ring has data this returns in microseconds; after it
    /// drains, reads pace at the sample rate (1024 frames at 40 ksps is ~25 ms).
    /// A short read is logged and reported through [`Acquired::count`],
    /// frames past it are stale.
    pub fn read(&mut self) -> Result<Acquired<'_, F>, AcquisitionError> {
        let session = self.session.as_mut().ok_or(AcquisitionError::NotInitialized)?;
        let requested = session.buffer.byte_size();

        let bytes = self
            .peripheral
            .read(session.buffer.as_mut_slice(), WaitPolicy::Forever)
            .map_err(|e| fault(FaultStage::Read, e))?;

        // buffer now holds sampled data, not a synthesized signal
        self.signal_key = None;

        self.stats.reads += 1;
        if bytes != requested {
            warn!("Short read: only {} of {} bytes from the sample bus", bytes, requested);
            self.stats.short_reads += 1;
        }

        let count = bytes.min(requested) / frame_bytes::<F>();
        self.stats.frames += count as u64;

        Ok(Acquired { frames: session.buffer.as_slice(), count })
    }

    /// Mean ADC value over roughly `window_ms` of reads.
    ///
    /// The mean approximates the DC bias only for a zero-mean AC input. The
    /// result is not applied; pass it to [`Self::set_offset_value`].
    pub fn calculate_offset_value(&mut self, window_ms: u32) -> Result<u16, AcquisitionError> {
        let width = self
            .session
            .as_ref()
            .map(|s| s.width)
            .ok_or(AcquisitionError::NotInitialized)?;

        let deadline = self.clock.now_ms().saturating_add(window_ms as u64);
        let mut total: u64 = 0;
        let mut frames: u64 = 0;

        while self.clock.now_ms() < deadline {
            let acquired = self.read()?;
            total += acquired
                .filled()
                .iter()
                .map(|f| width.extract_value(f.raw()) as u64)
                .sum::<u64>();
            frames += acquired.count as u64;
        }

        if frames == 0 {
            warn!("No frames read in a {} ms calibration window, offset left at 0", window_ms);
            return Ok(0);
        }

        let offset = (total / frames) as u16;
        info!("Offset over {} frames in {} ms: {} ({} mV)",
            frames, window_ms, offset, adc::value_to_mvolts(offset as u32));
        Ok(offset)
    }

    /// ADC reading of a frame, channel bits removed.
    #[inline]
    pub fn value_of(&self, frame: F) -> u16 {
        self.extraction_width().extract_value(frame.raw())
    }

    /// Distance of the reading from the DC offset, folding the AC swing
    /// into a unipolar magnitude. With offset 0 this is the raw reading.
    #[inline]
    pub fn effective_value(&self, frame: F) -> u16 {
        self.value_of(frame).abs_diff(self.config.offset)
    }

    /// Signed deviation from the DC offset.
    #[inline]
    pub fn centered_value(&self, frame: F) -> i32 {
        self.value_of(frame) as i32 - self.config.offset as i32
    }

    /// Fill the buffer with a test sine riding on the signal bias.
    ///
    /// Rebuilt only when frequency or amplitude change, or after a read
    /// overwrote the buffer.
    pub fn build_signal(&mut self, frequency: u32, amplitude: u16) -> Result<&[F], AcquisitionError> {
        let session = self.session.as_mut().ok_or(AcquisitionError::NotInitialized)?;
        let key = (frequency, amplitude);

        if self.signal_key != Some(key) {
            self.signal_key = Some(key);
            debug!("Building {} Hz test signal, amplitude {}", frequency, amplitude);

            // radians advanced per frame
            let ratio = std::f64::consts::TAU * frequency as f64 / session.sample_rate as f64;
            let (width, channel) = (session.width, session.channel);
            for (i, slot) in session.buffer.as_mut_slice().iter_mut().enumerate() {
                let v = amplitude as f64 * (i as f64 * ratio).sin() / 2.0 + SIGNAL_BIAS as f64;
                let v = v.round().clamp(0.0, ADC_MAX_VALUE as f64) as u16;
                *slot = F::from_raw(width.pack(channel, v));
            }
        }
        Ok(session.buffer.as_slice())
    }

    pub fn log_detailed_info(&self) {
        match self.session.as_ref() {
            Some(s) => {
                info!("Sampling {} at {} sps, {} frames of {} per read ({} bytes)",
                    s.channel, s.sample_rate, s.buffer.capacity(), s.width, s.buffer.byte_size());
                info!("One read covers {} ms, {:.1} Hz per FFT bin",
                    s.buffer.capacity() as u64 * 1000 / s.sample_rate as u64,
                    s.sample_rate as f32 / s.buffer.capacity() as f32);
            }
            None => info!("Sample bus not initialized"),
        }
        info!("DC offset {} ({} mV), {} reads, {} short",
            self.config.offset, self.offset_mvolts(), self.stats.reads, self.stats.short_reads);
    }

    fn extraction_width(&self) -> FrameWidth {
        self.session.as_ref().map_or(self.config.frame_width, |s| s.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    /// Peripheral double that replays a frame pattern and records calls.
    #[derive(Debug, Default)]
    struct ScriptedPeripheral {
        installs: Vec<PeripheralConfig>,
        uninstalls: usize,
        bound: Option<AdcChannel>,
        reads: usize,
        pattern: Vec<u32>,
        short_bytes: Option<usize>,
        install_error: Option<PeripheralError>,
        bind_error: Option<PeripheralError>,
        read_error: Option<PeripheralError>,
        clock: Option<ManualClock>,
        ms_per_read: u64,
    }

    impl SamplingPeripheral for ScriptedPeripheral {
        fn install(&mut self, config: &PeripheralConfig) -> Result<(), PeripheralError> {
            if let Some(e) = self.install_error {
                return Err(e);
            }
            self.installs.push(config.clone());
            Ok(())
        }

        fn uninstall(&mut self) -> Result<(), PeripheralError> {
            self.uninstalls += 1;
            Ok(())
        }

        fn bind_adc_channel(&mut self, channel: AdcChannel) -> Result<(), PeripheralError> {
            if let Some(e) = self.bind_error {
                return Err(e);
            }
            self.bound = Some(channel);
            Ok(())
        }

        fn read<F: Frame>(&mut self, frames: &mut [F], _wait: WaitPolicy) -> Result<usize, PeripheralError> {
            if let Some(e) = self.read_error {
                return Err(e);
            }
            self.reads += 1;
            if let Some(clock) = &self.clock {
                clock.advance(self.ms_per_read);
            }
            let full = frames.len() * frame_bytes::<F>();
            let bytes = self.short_bytes.unwrap_or(full).min(full);
            let filled = bytes / frame_bytes::<F>();
            if !self.pattern.is_empty() {
                for (i, slot) in frames.iter_mut().take(filled).enumerate() {
                    *slot = F::from_raw(self.pattern[i % self.pattern.len()]);
                }
            }
            Ok(bytes)
        }
    }

    fn engine(frames: usize) -> AcquisitionEngine<ScriptedPeripheral, u16, ManualClock> {
        let config = AcquisitionConfig { frame_count: frames, ..Default::default() };
        AcquisitionEngine::with_config(ScriptedPeripheral::default(), ManualClock::new(0), config)
    }

    fn ch4() -> AdcChannel {
        AdcChannel::new(4).unwrap()
    }

    #[test]
    fn test_init_installs_adc_capture_ring() {
        let mut eng = engine(1024);
        let buf = eng.init().unwrap();
        assert_eq!(buf.len(), 1024);
        assert_eq!(eng.buffer_byte_size(), 2048);

        let p = eng.peripheral();
        assert_eq!(p.installs.len(), 1);
        let cfg = &p.installs[0];
        assert_eq!(cfg.mode, PeripheralMode::ADC_CAPTURE);
        assert_eq!(cfg.sample_rate, 40_000);
        assert_eq!(cfg.bits_per_sample, FrameWidth::Bits16);
        assert!(cfg.dma_buf_count >= 8);
        assert_eq!(cfg.dma_buf_len, 1024);
        assert!(!cfg.use_apll);
        assert_eq!(p.bound, Some(ch4()));
        assert_eq!(p.uninstalls, 0);
    }

    #[test]
    fn test_reinit_tears_down_previous_session() {
        let mut eng = engine(256);
        eng.init().unwrap();
        eng.set_frame_count(512);
        eng.set_sample_rate(22_050);
        assert_eq!(eng.buffer_byte_size(), 512, "new length waits for init");

        assert_eq!(eng.init().unwrap().len(), 512);
        let p = eng.peripheral();
        assert_eq!(p.uninstalls, 1);
        assert_eq!(p.installs.len(), 2);
        assert_eq!(p.installs[1].sample_rate, 22_050);
    }

    #[test]
    fn test_frame_width_must_fit_slot() {
        let mut eng = engine(64);
        eng.set_frame_width(FrameWidth::Bits32);
        let err = eng.init().unwrap_err();
        assert!(matches!(err, AcquisitionError::FrameWidthMismatch { storage_bits: 16, .. }));
        assert!(err.is_fatal());
        assert!(eng.peripheral().installs.is_empty());
    }

    #[test]
    fn test_zero_frame_count_rejected() {
        let mut eng = engine(0);
        assert!(matches!(eng.init(), Err(AcquisitionError::InvalidConfig(_))));
    }

    #[test]
    fn test_install_failure_is_fatal() {
        let mut eng = engine(64);
        eng.peripheral_mut().install_error = Some(PeripheralError::NoMem);
        let err = eng.init().unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Peripheral { stage: FaultStage::Install, source: PeripheralError::NoMem }
        ));
        assert!(err.is_fatal());
        assert!(!eng.is_initialized());
    }

    #[test]
    fn test_bind_failure_uninstalls_driver() {
        let mut eng = engine(64);
        eng.peripheral_mut().bind_error = Some(PeripheralError::InvalidArg);
        let err = eng.init().unwrap_err();
        assert!(matches!(err, AcquisitionError::Peripheral { stage: FaultStage::BindChannel, .. }));
        assert_eq!(eng.peripheral().uninstalls, 1);
        assert!(!eng.is_initialized());
    }

    #[test]
    fn test_read_before_init() {
        let mut eng = engine(64);
        assert!(matches!(eng.read(), Err(AcquisitionError::NotInitialized)));
        assert!(matches!(eng.calculate_offset_value(10), Err(AcquisitionError::NotInitialized)));
        assert!(matches!(eng.build_signal(100, 100), Err(AcquisitionError::NotInitialized)));
    }

    #[test]
    fn test_full_read_reports_frames_not_bytes() {
        let mut eng = engine(1024);
        eng.peripheral_mut().pattern = vec![0x4800];
        eng.init().unwrap();
        let got = eng.read().unwrap();
        assert_eq!(got.count, 1024);
        assert!(!got.is_short());
        assert!(got.filled().iter().all(|&f| f == 0x4800));
        assert_eq!(eng.read_stats().short_reads, 0);
    }

    #[test]
    fn test_short_read_is_a_warning_not_an_error() {
        let mut eng = engine(1024);
        eng.init().unwrap();
        eng.peripheral_mut().short_bytes = Some(1000 * 2);
        let got = eng.read().unwrap();
        assert_eq!(got.count, 1000);
        assert!(got.is_short());
        assert_eq!(got.filled().len(), 1000);
        assert_eq!(got.frames.len(), 1024);
        let stats = eng.read_stats();
        assert_eq!((stats.reads, stats.short_reads, stats.frames), (1, 1, 1000));
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let mut eng = engine(64);
        eng.init().unwrap();
        eng.peripheral_mut().read_error = Some(PeripheralError::Code(-1));
        let err = eng.read().unwrap_err();
        assert!(matches!(err, AcquisitionError::Peripheral { stage: FaultStage::Read, .. }));
    }

    #[test]
    fn test_offset_counts_every_frame_of_every_batch() {
        let clock = ManualClock::new(0);
        let peripheral = ScriptedPeripheral {
            // one hot frame per batch, first slot; skipping it would give 0
            pattern: vec![0x4000 | 4000, 0x4000, 0x4000, 0x4000],
            clock: Some(clock.clone()),
            ms_per_read: 10,
            ..Default::default()
        };
        let config = AcquisitionConfig { frame_count: 4, ..Default::default() };
        let mut eng: AcquisitionEngine<_, u16, _> =
            AcquisitionEngine::with_config(peripheral, clock.clone(), config);
        eng.init().unwrap();

        let offset = eng.calculate_offset_value(100).unwrap();
        assert_eq!(offset, 1000);
        assert_eq!(eng.peripheral().reads, 10);
        assert_eq!(eng.offset_value(), 0, "calibration does not apply itself");
    }

    #[test]
    fn test_offset_of_symmetric_swing_is_its_midpoint() {
        let clock = ManualClock::new(0);
        let peripheral = ScriptedPeripheral {
            pattern: vec![1000, 3000],
            clock: Some(clock.clone()),
            ms_per_read: 25,
            ..Default::default()
        };
        let mut eng: AcquisitionEngine<_, u16, _> = AcquisitionEngine::with_config(
            peripheral,
            clock,
            AcquisitionConfig { frame_count: 8, ..Default::default() },
        );
        eng.init().unwrap();
        assert_eq!(eng.calculate_offset_value(2000).unwrap(), 2000);
    }

    #[test]
    fn test_empty_calibration_window_returns_zero() {
        let mut eng = engine(16);
        eng.init().unwrap();
        assert_eq!(eng.calculate_offset_value(0).unwrap(), 0);
        assert_eq!(eng.peripheral().reads, 0);
    }

    #[test]
    fn test_effective_value_folds_around_offset() {
        let mut eng = engine(16);
        eng.set_offset_value(2000);
        let above = FrameWidth::Bits16.pack(ch4(), 2500) as u16;
        let below = FrameWidth::Bits16.pack(ch4(), 1500) as u16;
        assert_eq!(eng.effective_value(above), 500);
        assert_eq!(eng.effective_value(below), 500);
        assert_eq!(eng.centered_value(below), -500);

        eng.set_offset_value(0);
        assert_eq!(eng.effective_value(above), 2500);
    }

    #[test]
    fn test_effective_value_32_bit_frames() {
        let config = AcquisitionConfig {
            frame_width: FrameWidth::Bits32,
            frame_count: 8,
            offset: 100,
            ..Default::default()
        };
        let mut eng: AcquisitionEngine<_, u32, _> =
            AcquisitionEngine::with_config(ScriptedPeripheral::default(), ManualClock::new(0), config);
        eng.init().unwrap();
        let frame = FrameWidth::Bits32.pack(ch4(), 40) | 0xFFFF;
        assert_eq!(eng.effective_value(frame), 60);
    }

    #[test]
    fn test_offset_millivolts() {
        let mut eng = engine(16);
        let mv = eng.set_offset_mvolts(1650);
        assert!(mv <= 1650 && 1650 - mv <= 1);
        assert_eq!(eng.offset_value(), 2047);
        assert_eq!(eng.offset_mvolts(), mv);
        let again = eng.set_offset_mvolts(mv);
        assert!(again <= mv && mv - again <= 1);
    }

    #[test]
    fn test_build_signal_quarter_rate_sine() {
        let mut eng = engine(8);
        eng.init().unwrap();
        // sample_rate / 4 puts successive frames 90 degrees apart
        let frames = eng.build_signal(10_000, 200).unwrap().to_vec();
        let values: Vec<u16> = frames.iter().map(|&f| eng.value_of(f)).collect();
        assert_eq!(&values[..4], &[1500, 1600, 1500, 1400]);
        assert!(frames.iter().all(|&f| adc::channel_from_frame(f) == 4));
    }

    #[test]
    fn test_build_signal_rebuilds_on_amplitude_change() {
        let mut eng = engine(8);
        eng.init().unwrap();
        let small = eng.build_signal(10_000, 200).unwrap()[1];
        let large = eng.build_signal(10_000, 1000).unwrap()[1];
        assert_eq!(eng.value_of(small), 1600);
        assert_eq!(eng.value_of(large), 2000);
    }

    #[test]
    fn test_build_signal_rebuilds_after_read() {
        let mut eng = engine(8);
        eng.peripheral_mut().pattern = vec![0];
        eng.init().unwrap();
        eng.build_signal(10_000, 200).unwrap();
        eng.read().unwrap();
        let after = eng.build_signal(10_000, 200).unwrap()[1];
        assert_eq!(eng.value_of(after), 1600);
    }

    #[test]
    fn test_release_uninstalls_once() {
        let mut eng = engine(8);
        eng.init().unwrap();
        eng.release().unwrap();
        eng.release().unwrap();
        assert_eq!(eng.peripheral().uninstalls, 1);
        assert!(eng.frames().is_none());
    }
}
