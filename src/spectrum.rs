/*
 *  spectrum.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Band magnitudes from centred ADC samples
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

use std::sync::Arc;

use log::debug;
use rustfft::num_complex::Complex;

use crate::constants::ADC_MAX_VALUE;

// dBFS range mapped onto bar height
const BAR_FLOOR_DB: f32 = -72.0;
const BAR_CEIL_DB: f32 = -6.0;
const EPS: f32 = 1e-12;
const SPECTRUM_MIN_HZ: f32 = 20.0;              // start of spectrum
const FFT_MIN: usize = 128;
const FFT_MAX: usize = 4096;

// half the ADC span: a centred sample of this size is full scale
const FULL_SCALE: f32 = ((ADC_MAX_VALUE + 1) / 2) as f32;

#[inline]
fn db_to_height(db: f32, height: u32) -> u32 {
    let x = ((db - BAR_FLOOR_DB) / (BAR_CEIL_DB - BAR_FLOOR_DB)).clamp(0.0, 1.0);
    (x * height as f32).round() as u32
}

/// Hann-windowed FFT folded into log-spaced bands.
///
/// Takes the engine's DC-removed samples (`centered_value`) and produces
/// one dBFS figure per band, or bar heights ready for the renderer.
pub struct SpectrumEngine {
    sr: u32,
    nfft: usize,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    p_scale: f32,       // (2 / win_sum)^2  ~ (4/N)^2
    buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magsq: Vec<f32>,                 // one-sided power spectrum (normalized)
    bands: usize,
    band_edges: Vec<(usize, usize)>,
}

impl SpectrumEngine {
    pub fn new(sr: u32, samples_len: usize, bands: usize) -> Self {
        let want = samples_len.clamp(FFT_MIN, FFT_MAX);
        let nfft = want.next_power_of_two().clamp(FFT_MIN, FFT_MAX);

        let mut planner = rustfft::FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(nfft);

        // Hann
        let window = (0..nfft)
            .map(|i| 0.5f32 * (1.0 - (2.0 * std::f32::consts::PI * (i as f32) / (nfft as f32)).cos()))
            .collect::<Vec<_>>();

        let win_sum: f32 = window.iter().copied().sum();
        let p_scale = (2.0 / win_sum).powi(2);

        let buf = vec![Complex::new(0.0, 0.0); nfft];
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let magsq = vec![0.0; nfft / 2];

        let band_edges = Self::build_log_bands(sr, nfft, bands);
        debug!("Spectrum: {} point FFT at {} sps into {} bands", nfft, sr, bands);

        Self { sr, nfft, fft, window, p_scale, buf, scratch, magsq, bands, band_edges }
    }

    /// Bin ranges `[start, end)` for `bands` log-spaced bands between 20 Hz
    /// and just under Nyquist. Every range holds at least one bin.
    pub fn build_log_bands(sr: u32, nfft: usize, bands: usize) -> Vec<(usize, usize)> {
        let nyq = sr as f32 / 2.0;
        let fmin = SPECTRUM_MIN_HZ.min(nyq - 1.0).max(1.0);
        let fmax = (nyq * 0.98).max(fmin + 1.0);
        let mut edges = Vec::with_capacity(bands + 1);
        for i in 0..=bands {
            let t = i as f32 / (bands as f32);
            // log spacing
            let f = fmin * (fmax / fmin).powf(t);
            let k = ((f * (nfft as f32) / (sr as f32)).floor() as isize)
                .clamp(1, (nfft as isize / 2) - 1) as usize;
            edges.push(k);
        }
        edges.windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                if b <= a { (a, (a + 1).min(nfft / 2)) } else { (a, b) }
            })
            .collect()
    }

    pub fn sample_rate(&self) -> u32 { self.sr }
    pub fn fft_len(&self) -> usize { self.nfft }
    pub fn bands(&self) -> usize { self.bands }
    pub fn band_edges(&self) -> &[(usize, usize)] { &self.band_edges }

    /// Rebuild when the sample rate changes or the read got much shorter.
    pub fn ensure(&mut self, sr: u32, samples_len: usize) {
        if self.sr != sr || samples_len < self.nfft / 2 {
            *self = Self::new(sr, samples_len, self.bands);
        }
    }

    /// Power dBFS per band (single-sided), newest `fft_len()` samples.
    pub fn compute_db_bands(&mut self, samples: &[i32]) -> Vec<f32> {
        let need = self.nfft.min(samples.len());
        let start = samples.len() - need;

        // windowed real signal into buf, zero padded
        for (i, slot) in self.buf.iter_mut().enumerate() {
            let s = if i < need { samples[start + i] as f32 / FULL_SCALE } else { 0.0 };
            *slot = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buf, &mut self.scratch);

        // One-sided, normalized power. Double bins except DC.
        for (k, p) in self.magsq.iter_mut().enumerate() {
            let c = self.buf[k];
            let mut v = (c.re * c.re + c.im * c.im) * self.p_scale;
            if k != 0 { v *= 2.0; }
            *p = v.max(0.0);
        }

        self.band_edges.iter()
            .map(|&(a, b)| {
                let acc: f32 = self.magsq[a..b].iter().sum();
                let avg_p = acc / (b - a) as f32;
                10.0 * avg_p.max(EPS).log10()
            })
            .collect()
    }

    /// Band levels scaled to 0..=height pixels.
    pub fn bar_heights(&mut self, samples: &[i32], height: u32) -> Vec<u32> {
        self.compute_db_bands(samples)
            .into_iter()
            .map(|db| db_to_height(db, height))
            .collect()
    }
}
