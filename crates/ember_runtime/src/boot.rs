//! Boot options
//!
//! # Sources (in priority order)
//!
//! 1. Command line: `ember --config sim.toml --ticks 600`
//! 2. Environment: `EMBER_CONFIG=sim.toml`, `EMBER_TICKS=600`
//! 3. Defaults

use std::path::PathBuf;

use thiserror::Error;

/// How long and with what settings to run
#[derive(Debug, Clone, PartialEq)]
pub struct BootOptions {
    /// TOML simulation config; defaults are used when absent
    pub config_path: Option<PathBuf>,
    /// Fixed steps to simulate
    pub ticks: u64,
    /// Steps per second of simulated time
    pub rate: u32,
    /// Log a status line every this many ticks
    pub report_every: u64,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            ticks: 600,
            rate: 60,
            report_every: 60,
        }
    }
}

/// Bad boot option
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BootError {
    #[error("{0} needs a value")]
    MissingValue(String),

    #[error("{0}: '{1}' is not a positive number")]
    BadNumber(String, String),

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
}

impl BootOptions {
    /// Read the environment, then let `args` override it
    pub fn load(args: impl IntoIterator<Item = String>) -> Result<Self, BootError> {
        let mut options = Self::default();
        if let Ok(path) = std::env::var("EMBER_CONFIG") {
            options.config_path = Some(PathBuf::from(path));
        }
        if let Ok(ticks) = std::env::var("EMBER_TICKS") {
            options.ticks = parse_positive("EMBER_TICKS", &ticks)?;
        }
        options.apply_args(args)?;
        Ok(options)
    }

    fn apply_args(&mut self, args: impl IntoIterator<Item = String>) -> Result<(), BootError> {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| BootError::MissingValue(arg.clone()));
            match arg.as_str() {
                "--config" | "-c" => self.config_path = Some(PathBuf::from(value()?)),
                "--ticks" | "-t" => self.ticks = parse_positive(&arg, &value()?)?,
                "--rate" => self.rate = parse_positive(&arg, &value()?)? as u32,
                "--report-every" => self.report_every = parse_positive(&arg, &value()?)?,
                _ => return Err(BootError::UnknownArgument(arg.clone())),
            }
        }
        Ok(())
    }

    /// Seconds per tick
    pub fn step(&self) -> f32 {
        1.0 / self.rate as f32
    }

    pub fn print_summary(&self) {
        log::info!("Boot options:");
        match &self.config_path {
            Some(path) => log::info!("  Config: {}", path.display()),
            None => log::info!("  Config: defaults"),
        }
        log::info!("  Ticks: {} at {} Hz", self.ticks, self.rate);
    }
}

fn parse_positive(flag: &str, value: &str) -> Result<u64, BootError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(BootError::BadNumber(flag.to_string(), value.to_string())),
    }
}
