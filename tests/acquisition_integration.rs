/*
 *  tests/acquisition_integration.rs
 *
 *  Integration tests for the sampling engine and the full pipeline
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 */

use embedded_graphics::pixelcolor::BinaryColor;

use spectrum_bars::acquisition::{
    AcquisitionConfig, AcquisitionEngine, AcquisitionError, FaultStage, PeripheralConfig,
    PeripheralError, SamplingPeripheral, SimulatedPeripheral, Tone, WaitPolicy,
};
use spectrum_bars::adc::{AdcChannel, Frame, FrameWidth, frame_bytes};
use spectrum_bars::clock::{ManualClock, MonotonicClock};
use spectrum_bars::display::{BarDisplayRenderer, MockSurface};
use spectrum_bars::spectrum::SpectrumEngine;

/// Bus that never delivers more than `limit` frames per read.
struct StarvedBus {
    config: Option<PeripheralConfig>,
    channel: Option<AdcChannel>,
    limit: usize,
    value: u16,
}

impl StarvedBus {
    fn new(limit: usize, value: u16) -> Self {
        Self { config: None, channel: None, limit, value }
    }
}

impl SamplingPeripheral for StarvedBus {
    fn install(&mut self, config: &PeripheralConfig) -> Result<(), PeripheralError> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn uninstall(&mut self) -> Result<(), PeripheralError> {
        self.config.take().map(|_| ()).ok_or(PeripheralError::NotInstalled)
    }

    fn bind_adc_channel(&mut self, channel: AdcChannel) -> Result<(), PeripheralError> {
        self.channel = Some(channel);
        Ok(())
    }

    fn read<F: Frame>(&mut self, frames: &mut [F], _wait: WaitPolicy) -> Result<usize, PeripheralError> {
        let width = self.config.as_ref().ok_or(PeripheralError::NotInstalled)?.bits_per_sample;
        let channel = self.channel.ok_or(PeripheralError::InvalidArg)?;
        let n = self.limit.min(frames.len());
        for slot in &mut frames[..n] {
            *slot = F::from_raw(width.pack(channel, self.value));
        }
        Ok(n * frame_bytes::<F>())
    }
}

#[test]
fn test_short_read_reports_partial_count() {
    let mut engine: AcquisitionEngine<_, u16, _> =
        AcquisitionEngine::new(StarvedBus::new(1000, 1800), ManualClock::new(0));
    engine.init().unwrap();
    assert_eq!(engine.buffer_byte_size(), 2048);

    let acquired = engine.read().unwrap();
    assert_eq!(acquired.count, 1000);
    assert!(acquired.is_short());
    assert_eq!(acquired.filled().len(), 1000);
    assert_eq!(acquired.frames.len(), 1024);

    let stats = engine.read_stats();
    assert_eq!((stats.reads, stats.short_reads, stats.frames), (1, 1, 1000));
}

#[test]
fn test_read_failure_is_fatal() {
    struct DeadBus;
    impl SamplingPeripheral for DeadBus {
        fn install(&mut self, _: &PeripheralConfig) -> Result<(), PeripheralError> { Ok(()) }
        fn uninstall(&mut self) -> Result<(), PeripheralError> { Ok(()) }
        fn bind_adc_channel(&mut self, _: AdcChannel) -> Result<(), PeripheralError> { Ok(()) }
        fn read<F: Frame>(&mut self, _: &mut [F], _: WaitPolicy) -> Result<usize, PeripheralError> {
            Err(PeripheralError::Code(-1))
        }
    }

    let mut engine: AcquisitionEngine<_, u16, _> = AcquisitionEngine::new(DeadBus, ManualClock::new(0));
    engine.init().unwrap();
    match engine.read() {
        Err(e @ AcquisitionError::Peripheral { stage: FaultStage::Read, .. }) => assert!(e.is_fatal()),
        other => panic!("unexpected {:?}", other.map(|a| a.count)),
    }
}

#[test]
fn test_simulated_bus_calibrates_to_bias() {
    let config = AcquisitionConfig { frame_width: FrameWidth::Bits32, ..Default::default() };
    let tones = vec![Tone { frequency_hz: 1_000.0, amplitude: 400 }];
    // paced reads, so the monotonic clock moves while calibrating
    let bus = SimulatedPeripheral::new(tones).with_bias(2000).with_realtime(true);
    let mut engine: AcquisitionEngine<_, u32, _> =
        AcquisitionEngine::with_config(bus, MonotonicClock::new(), config);
    engine.init().unwrap();

    assert_eq!(engine.calculate_offset_value(0).unwrap(), 0);

    let offset = engine.calculate_offset_value(30).unwrap();
    assert!((1990..=2010).contains(&offset), "offset {}", offset);
    assert!(engine.read_stats().reads >= 2);

    engine.set_offset_value(offset);
    let acquired_peak = engine.read().unwrap().filled().iter().copied().max().unwrap_or(0);
    assert!(engine.centered_value(acquired_peak) > 300);
}

#[test]
fn test_pipeline_lights_the_tone_band() {
    let sample_rate = 40_000;
    let tones = vec![Tone { frequency_hz: 5_000.0, amplitude: 1_000 }];
    let mut engine: AcquisitionEngine<_, u16, _> =
        AcquisitionEngine::new(SimulatedPeripheral::new(tones), ManualClock::new(0));
    engine.init().unwrap();
    engine.set_offset_value(1500);

    let count = engine.read().unwrap().count;
    let samples: Vec<i32> = engine.frames().unwrap()[..count]
        .iter()
        .map(|&f| engine.centered_value(f))
        .collect();

    let bars = 16;
    let mut spectrum = SpectrumEngine::new(sample_rate, count, bars);
    let heights = spectrum.bar_heights(&samples, 100);

    let surface = MockSurface::new(160, 100, BinaryColor::Off);
    let mut renderer = BarDisplayRenderer::new(surface.clone(), ManualClock::new(0), BinaryColor::Off, BinaryColor::On);
    renderer.init(bars as u16, 160, 100, 50, 4).unwrap();
    renderer.draw_bars(&heights).unwrap();

    let bin = 5_000 * 1024 / sample_rate as usize;
    let band = spectrum.band_edges().iter().position(|&(a, b)| bin >= a && bin < b).unwrap();
    let tallest = (0..bars).max_by_key(|&i| renderer.bar_heights()[i]).unwrap();
    assert_eq!(tallest, band);
    assert_eq!(surface.column_height(band as i32 * 10, BinaryColor::On), renderer.bar_heights()[band]);
}
