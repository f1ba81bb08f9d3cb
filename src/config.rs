/*
 *  config.rs
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, CLI overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::acquisition::{AcquisitionConfig, Tone};
use crate::adc::{AdcChannel, FrameWidth, mvolts_to_value};
use crate::constants::*;
use crate::display::{Color, Rotation};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every field is optional so files and CLI
/// flags can be layered; the resolvers below fill in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// loop iterations, 0 runs until interrupted
    pub frames: Option<u64>,
    /// DC calibration window before the loop, 0 skips it
    pub calibrate_ms: Option<u32>,

    pub acquisition: Option<SamplingConfig>,
    /// display geometry & bar behavior
    pub display: Option<DisplayConfig>,
    /// synthetic input standing in for the ADC
    pub simulation: Option<SimulationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SamplingConfig {
    pub adc_channel: Option<u8>,       // ADC1 channel 0-7
    pub sample_rate_hz: Option<u32>,
    pub frame_count: Option<usize>,
    pub frame_bits: Option<u8>,        // 16 | 24 | 32
    pub offset: Option<u16>,           // counts
    pub offset_mv: Option<u16>,        // or millivolts, not both
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bars: Option<u16>,
    pub rotate_deg: Option<u16>,
    pub fall_interval_ms: Option<u32>,
    pub fall_step_px: Option<u32>,
    pub background: Option<Color>,     // name or #rrggbb
    pub foreground: Option<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimulationConfig {
    pub tones: Option<Vec<Tone>>,
    pub noise: Option<u16>,
    pub bias: Option<u16>,
    pub realtime: Option<bool>,
}

/// Fully resolved display settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
    pub bars: u16,
    pub rotation: Rotation,
    pub fall_interval_ms: u32,
    pub fall_step_px: u32,
    pub background: Color,
    pub foreground: Color,
}

/// Fully resolved simulation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub tones: Vec<Tone>,
    pub noise: u16,
    pub bias: u16,
    pub realtime: bool,
}

fn default_tones() -> Vec<Tone> {
    vec![
        Tone { frequency_hz: 220.0, amplitude: 600 },
        Tone { frequency_hz: 1_250.0, amplitude: 400 },
        Tone { frequency_hz: 6_000.0, amplitude: 200 },
    ]
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn frames(&self) -> u64 {
        self.frames.unwrap_or(0)
    }

    pub fn calibrate_ms(&self) -> u32 {
        self.calibrate_ms.unwrap_or(0)
    }

    /// Engine configuration with defaults filled in and ranges checked.
    pub fn acquisition_config(&self) -> Result<AcquisitionConfig, ConfigError> {
        let a = self.acquisition.clone().unwrap_or_default();

        let channel = a.adc_channel.unwrap_or(DEFAULT_ADC_CHANNEL);
        let adc_channel = AdcChannel::try_from(channel)
            .map_err(|e| ConfigError::Validation(format!("acquisition adc_channel: {e}")))?;

        let frame_width = match a.frame_bits {
            Some(bits) => FrameWidth::try_from(bits)
                .map_err(|e| ConfigError::Validation(format!("acquisition frame_bits: {e}")))?,
            None => FrameWidth::default(),
        };

        let sample_rate = a.sample_rate_hz.unwrap_or(DEFAULT_SAMPLE_RATE);
        if sample_rate == 0 {
            return Err(ConfigError::Validation("acquisition sample_rate_hz must be > 0".into()));
        }
        let frame_count = a.frame_count.unwrap_or(DEFAULT_FRAME_COUNT);
        if frame_count == 0 {
            return Err(ConfigError::Validation("acquisition frame_count must be > 0".into()));
        }

        let offset = match (a.offset, a.offset_mv) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Validation(
                    "acquisition offset and offset_mv are exclusive".into()));
            }
            (Some(counts), None) => counts as u32,
            (None, Some(mv)) => mvolts_to_value(mv as u32),
            (None, None) => 0,
        };
        if offset > ADC_MAX_VALUE {
            return Err(ConfigError::Validation(format!(
                "acquisition offset must be <= {ADC_MAX_VALUE} counts ({ADC_MAX_MVOLTS} mV)")));
        }
        let offset = offset as u16;

        Ok(AcquisitionConfig { adc_channel, sample_rate, frame_count, frame_width, offset })
    }

    pub fn display_settings(&self) -> Result<DisplaySettings, ConfigError> {
        let d = self.display.clone().unwrap_or_default();
        let width = d.width.unwrap_or(DEFAULT_DISPLAY_WIDTH);
        let height = d.height.unwrap_or(DEFAULT_DISPLAY_HEIGHT);
        let bars = d.bars.unwrap_or(DEFAULT_BARS);

        if width == 0 || height == 0 {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if bars == 0 || bars as u32 > width {
            return Err(ConfigError::Validation(format!(
                "display bars must be 1..={width} for a {width} pixel wide display")));
        }
        let rotation = match d.rotate_deg {
            Some(deg) => Rotation::try_from(deg)
                .map_err(|_| ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))?,
            None => Rotation::Deg0,
        };

        Ok(DisplaySettings {
            width,
            height,
            bars,
            rotation,
            fall_interval_ms: d.fall_interval_ms.unwrap_or(DEFAULT_FALL_INTERVAL_MS),
            fall_step_px: d.fall_step_px.unwrap_or(DEFAULT_FALL_STEP_PX),
            background: d.background.unwrap_or(Color::Black),
            foreground: d.foreground.unwrap_or(Color::Green),
        })
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        let s = self.simulation.clone().unwrap_or_default();
        SimulationSettings {
            tones: s.tones.unwrap_or_else(default_tones),
            noise: s.noise.unwrap_or(0),
            bias: s.bias.unwrap_or(SIGNAL_BIAS),
            realtime: s.realtime.unwrap_or(true),
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "spectrum-bars", about = "Sampled audio spectrum on falling bars")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// loop iterations, 0 runs until interrupted
    #[arg(long)]
    pub frames: Option<u64>,
    /// DC calibration window in ms, 0 skips it
    #[arg(long)]
    pub calibrate_ms: Option<u32>,
    #[arg(long)]
    pub adc_channel: Option<u8>,
    #[arg(long)]
    pub sample_rate_hz: Option<u32>,
    #[arg(long)]
    pub frame_count: Option<usize>,
    #[arg(long)]
    pub frame_bits: Option<u8>,
    #[arg(long)]
    pub offset: Option<u16>,
    #[arg(long)]
    pub offset_mv: Option<u16>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub bars: Option<u16>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    #[arg(long)]
    pub fall_interval_ms: Option<u32>,
    #[arg(long)]
    pub fall_step_px: Option<u32>,
    #[arg(long)]
    pub background: Option<Color>,
    #[arg(long)]
    pub foreground: Option<Color>,
    #[arg(long)]
    pub noise: Option<u16>,
    #[arg(long, action = ArgAction::Set)]
    pub realtime: Option<bool>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer the YAML file and `cli` over the defaults, then validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/spectrum-bars/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/spectrum-bars/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/spectrum-bars.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["spectrum-bars.yaml", "config/spectrum-bars.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.frames.is_some()         { dst.frames = src.frames; }
    if src.calibrate_ms.is_some()   { dst.calibrate_ms = src.calibrate_ms; }

    match (&mut dst.acquisition, src.acquisition) {
        (None, Some(c)) => dst.acquisition = Some(c),
        (Some(d), Some(s)) => merge_sampling(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.simulation, src.simulation) {
        (None, Some(c)) => dst.simulation = Some(c),
        (Some(d), Some(s)) => merge_simulation(d, s),
        _ => {}
    }
}

fn merge_sampling(dst: &mut SamplingConfig, src: SamplingConfig) {
    if src.adc_channel.is_some()     { dst.adc_channel = src.adc_channel; }
    if src.sample_rate_hz.is_some()  { dst.sample_rate_hz = src.sample_rate_hz; }
    if src.frame_count.is_some()     { dst.frame_count = src.frame_count; }
    if src.frame_bits.is_some()      { dst.frame_bits = src.frame_bits; }
    if src.offset.is_some()          { dst.offset = src.offset; }
    if src.offset_mv.is_some()       { dst.offset_mv = src.offset_mv; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()            { dst.width = src.width; }
    if src.height.is_some()           { dst.height = src.height; }
    if src.bars.is_some()             { dst.bars = src.bars; }
    if src.rotate_deg.is_some()       { dst.rotate_deg = src.rotate_deg; }
    if src.fall_interval_ms.is_some() { dst.fall_interval_ms = src.fall_interval_ms; }
    if src.fall_step_px.is_some()     { dst.fall_step_px = src.fall_step_px; }
    if src.background.is_some()       { dst.background = src.background; }
    if src.foreground.is_some()       { dst.foreground = src.foreground; }
}

fn merge_simulation(dst: &mut SimulationConfig, src: SimulationConfig) {
    if src.tones.is_some()     { dst.tones = src.tones; }
    if src.noise.is_some()     { dst.noise = src.noise; }
    if src.bias.is_some()      { dst.bias = src.bias; }
    if src.realtime.is_some()  { dst.realtime = src.realtime; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()     { cfg.log_level = cli.log_level.clone(); }
    if cli.frames.is_some()        { cfg.frames = cli.frames; }
    if cli.calibrate_ms.is_some()  { cfg.calibrate_ms = cli.calibrate_ms; }

    let acq = cfg.acquisition.get_or_insert_with(SamplingConfig::default);
    if cli.adc_channel.is_some()     { acq.adc_channel = cli.adc_channel; }
    if cli.sample_rate_hz.is_some()  { acq.sample_rate_hz = cli.sample_rate_hz; }
    if cli.frame_count.is_some()     { acq.frame_count = cli.frame_count; }
    if cli.frame_bits.is_some()      { acq.frame_bits = cli.frame_bits; }
    // a CLI offset in either unit replaces both file settings
    if cli.offset.is_some() || cli.offset_mv.is_some() {
        acq.offset = cli.offset;
        acq.offset_mv = cli.offset_mv;
    }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.display_width.is_some()       { display.width = cli.display_width; }
    if cli.display_height.is_some()      { display.height = cli.display_height; }
    if cli.bars.is_some()                { display.bars = cli.bars; }
    if cli.display_rotate_deg.is_some()  { display.rotate_deg = cli.display_rotate_deg; }
    if cli.fall_interval_ms.is_some()    { display.fall_interval_ms = cli.fall_interval_ms; }
    if cli.fall_step_px.is_some()        { display.fall_step_px = cli.fall_step_px; }
    if cli.background.is_some()          { display.background = cli.background; }
    if cli.foreground.is_some()          { display.foreground = cli.foreground; }

    let sim = cfg.simulation.get_or_insert_with(SimulationConfig::default);
    if cli.noise.is_some()     { sim.noise = cli.noise; }
    if cli.realtime.is_some()  { sim.realtime = cli.realtime; }
}

/// Every resolver must succeed for the config to be usable.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.acquisition_config()?;
    cfg.display_settings()?;
    if let Some(tones) = cfg.simulation.as_ref().and_then(|s| s.tones.as_ref()) {
        if tones.iter().any(|t| !t.frequency_hz.is_finite() || t.frequency_hz < 0.0) {
            return Err(ConfigError::Validation("simulation tone frequency_hz must be >= 0".into()));
        }
    }
    Ok(())
}
