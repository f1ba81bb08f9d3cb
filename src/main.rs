/*
 *  main.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host runner: simulated sample bus into a framebuffer bar display
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

use anyhow::{Context, Result};
use env_logger::Env;
use log::{debug, info};

use spectrum_bars::acquisition::{AcquisitionEngine, SimulatedPeripheral};
use spectrum_bars::adc::{Frame, value_to_mvolts};
use spectrum_bars::clock::MonotonicClock;
use spectrum_bars::config::{self, Config};
use spectrum_bars::display::{BarDisplayRenderer, FrameBuf, GraphicsSurface};
use spectrum_bars::func_timer::FrameTimer;
use spectrum_bars::spectrum::SpectrumEngine;

fn main() -> Result<()> {
    let cfg = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{}", env!("CARGO_PKG_VERSION"));

    // the frame slot type follows the configured frame width
    let width = cfg.acquisition_config()?.frame_width;
    if width.storage_bits() == 16 {
        run::<u16>(&cfg)
    } else {
        run::<u32>(&cfg)
    }
}

fn run<F: Frame>(cfg: &Config) -> Result<()> {
    let acq = cfg.acquisition_config()?;
    let disp = cfg.display_settings()?;
    let sim = cfg.simulation_settings();

    let peripheral = SimulatedPeripheral::new(sim.tones)
        .with_bias(sim.bias)
        .with_noise(sim.noise)
        .with_realtime(sim.realtime);
    let mut engine: AcquisitionEngine<_, F, _> =
        AcquisitionEngine::with_config(peripheral, MonotonicClock::new(), acq);
    engine.init().context("starting the sample bus")?;

    let calibrate_ms = cfg.calibrate_ms();
    if calibrate_ms > 0 {
        let offset = engine.calculate_offset_value(calibrate_ms)
            .context("calibrating the DC offset")?;
        engine.set_offset_value(offset);
        info!("Calibrated DC offset over {}ms: {} ({} mV)",
            calibrate_ms, offset, value_to_mvolts(offset as u32));
    }
    engine.log_detailed_info();

    // panel in native orientation, the renderer rotates onto it
    let (pw, ph) = if disp.rotation.swaps_axes() {
        (disp.height, disp.width)
    } else {
        (disp.width, disp.height)
    };
    let background = disp.background.to_rgb565();
    let foreground = disp.foreground.to_rgb565();
    let surface = GraphicsSurface::new(FrameBuf::new(pw, ph, background));

    let mut renderer = BarDisplayRenderer::new(surface, MonotonicClock::new(), background, foreground);
    renderer.set_rotation(disp.rotation);
    renderer.init(disp.bars, disp.width, disp.height, disp.fall_interval_ms, disp.fall_step_px)
        .context("laying out the bars")?;
    renderer.log_detailed_info();

    let mut spectrum = SpectrumEngine::new(engine.sample_rate(), engine.frame_count(), disp.bars as usize);
    // one read's worth of signal time
    let budget = Duration::from_secs_f64(engine.frame_count() as f64 / engine.sample_rate() as f64);
    let mut samples: Vec<i32> = Vec::with_capacity(engine.frame_count());

    let frames = cfg.frames();
    info!("Running {} frames", if frames == 0 { "unbounded".to_string() } else { frames.to_string() });

    let mut n: u64 = 0;
    while frames == 0 || n < frames {
        let _timer = FrameTimer::new("frame", budget);

        let count = engine.read()?.count;
        let filled = &engine.frames().unwrap_or_default()[..count];
        samples.clear();
        samples.extend(filled.iter().map(|&f| engine.centered_value(f)));

        let heights = spectrum.bar_heights(&samples, disp.height);
        let repainted = renderer.draw_bars(&heights)?;
        debug!("Frame {}: {} samples, {} bars repainted", n, count, repainted);
        n += 1;
    }

    let stats = engine.read_stats();
    info!("Done: {} reads, {} short, {} frames sampled", stats.reads, stats.short_reads, stats.frames);
    renderer.log_detailed_info();
    debug!("Final display\n{}", renderer.surface().target().to_ascii(background));

    engine.release()?;
    Ok(())
}
