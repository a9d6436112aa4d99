//! Soul EQ render host
//!
//! Offline host for the EQ core: loads [`RenderConfig`] from a TOML file and
//! `SOUL_EQ_*` environment variables, renders WAV files block by block and
//! reports the magnitude response of a configuration.

pub mod config;
pub mod error;
pub mod render;

pub use config::{AnalysisSettings, EqOverrides, RenderConfig};
pub use error::{RenderError, Result};
pub use render::{magnitude_response, render_file, RenderSummary};
