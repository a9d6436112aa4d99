//! Render configuration
use crate::error::{RenderError, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use soul_eq::{EqSettings, Slope};
use std::path::{Path, PathBuf};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "eq-render.toml";

/// Environment variable prefix (`SOUL_EQ_EQ__BLOCK_SIZE=256`)
pub const ENV_PREFIX: &str = "SOUL_EQ";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub eq: EqSettings,

    #[serde(default = "default_analysis")]
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisSettings {
    /// Drain the visualization queues on a second thread
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Log a level report every this many collected blocks
    #[serde(default = "default_report_every")]
    pub report_every: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        default_analysis()
    }
}

impl RenderConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `eq-render.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(RenderError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (SOUL_EQ_ + section__key)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.eq.validate()?;

        if self.analysis.report_every == 0 {
            return Err(RenderError::Config(
                "analysis.report_every must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// EQ settings given on the command line; they win over file and environment
#[derive(Debug, Clone, Default, Args)]
pub struct EqOverrides {
    /// Low-cut frequency in Hz
    #[arg(long)]
    pub low_cut: Option<f32>,

    /// Low-cut slope in dB/oct (12, 24, 36, 48)
    #[arg(long)]
    pub low_cut_slope: Option<u32>,

    /// Peak centre frequency in Hz
    #[arg(long)]
    pub peak_freq: Option<f32>,

    /// Peak gain in dB
    #[arg(long, allow_hyphen_values = true)]
    pub peak_gain: Option<f32>,

    /// Peak quality (Q)
    #[arg(long)]
    pub peak_q: Option<f32>,

    /// High-cut frequency in Hz
    #[arg(long)]
    pub high_cut: Option<f32>,

    /// High-cut slope in dB/oct (12, 24, 36, 48)
    #[arg(long)]
    pub high_cut_slope: Option<u32>,

    /// Processing block size in samples
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Force the processing sample rate
    #[arg(long)]
    pub sample_rate: Option<f64>,
}

impl EqOverrides {
    pub fn apply(&self, config: &mut RenderConfig) -> Result<()> {
        let params = &mut config.eq.parameters;

        if let Some(hz) = self.low_cut {
            params.low_cut_frequency = hz;
        }
        if let Some(db) = self.low_cut_slope {
            params.low_cut_slope = parse_slope(db)?;
        }
        if let Some(hz) = self.peak_freq {
            params.peak_frequency = hz;
        }
        if let Some(db) = self.peak_gain {
            params.peak_gain_db = db;
        }
        if let Some(q) = self.peak_q {
            params.peak_quality = q;
        }
        if let Some(hz) = self.high_cut {
            params.high_cut_frequency = hz;
        }
        if let Some(db) = self.high_cut_slope {
            params.high_cut_slope = parse_slope(db)?;
        }
        if let Some(size) = self.block_size {
            config.eq.block_size = size;
        }
        if self.sample_rate.is_some() {
            config.eq.sample_rate = self.sample_rate;
        }

        Ok(())
    }
}

fn parse_slope(db_per_octave: u32) -> Result<Slope> {
    Slope::try_from(db_per_octave).map_err(|_| {
        RenderError::Config(format!(
            "Invalid slope {} dB/oct (expected 12, 24, 36 or 48)",
            db_per_octave
        ))
    })
}

// Default values
fn default_analysis() -> AnalysisSettings {
    AnalysisSettings {
        enabled: default_enabled(),
        report_every: default_report_every(),
    }
}

fn default_enabled() -> bool {
    true
}

fn default_report_every() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.eq.block_size, 512);
        assert!(config.analysis.enabled);
        assert_eq!(config.analysis.report_every, 50);
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[eq]
block_size = 256
fifo_capacity = 8

[eq.parameters]
low_cut_frequency = 90.0
low_cut_slope = 36
peak_gain_db = -4.5

[analysis]
report_every = 5
"#
        )
        .unwrap();

        let config = RenderConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.eq.block_size, 256);
        assert_eq!(config.eq.fifo_capacity, 8);
        assert_eq!(config.eq.parameters.low_cut_frequency, 90.0);
        assert_eq!(config.eq.parameters.low_cut_slope, Slope::Slope36);
        assert_eq!(config.eq.parameters.peak_gain_db, -4.5);
        // Untouched fields keep their defaults
        assert_eq!(config.eq.parameters.peak_frequency, 750.0);
        assert_eq!(config.analysis.report_every, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_slope_in_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[eq.parameters]\nhigh_cut_slope = 18").unwrap();

        assert!(matches!(
            RenderConfig::load(Some(file.path())),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = RenderConfig::load(Some(Path::new("/nonexistent/eq-render.toml")));
        assert!(matches!(result, Err(RenderError::Config(_))));
    }

    #[test]
    fn overrides_win() {
        let mut config = RenderConfig::default();
        let overrides = EqOverrides {
            low_cut: Some(150.0),
            low_cut_slope: Some(48),
            peak_gain: Some(-3.0),
            block_size: Some(64),
            ..Default::default()
        };

        overrides.apply(&mut config).unwrap();

        assert_eq!(config.eq.parameters.low_cut_frequency, 150.0);
        assert_eq!(config.eq.parameters.low_cut_slope, Slope::Slope48);
        assert_eq!(config.eq.parameters.peak_gain_db, -3.0);
        assert_eq!(config.eq.block_size, 64);
    }

    #[test]
    fn bad_slope_override_is_rejected() {
        let overrides = EqOverrides {
            high_cut_slope: Some(6),
            ..Default::default()
        };
        assert!(overrides.apply(&mut RenderConfig::default()).is_err());
    }

    #[test]
    fn out_of_range_parameters_fail_validation() {
        let mut config = RenderConfig::default();
        config.eq.parameters.low_cut_frequency = 5.0;
        assert!(matches!(config.validate(), Err(RenderError::Eq(_))));

        let mut config = RenderConfig::default();
        config.analysis.report_every = 0;
        assert!(matches!(config.validate(), Err(RenderError::Config(_))));
    }
}
