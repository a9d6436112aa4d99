//! eq-render - run audio files through the Soul EQ
use clap::{Parser, Subcommand};
use eq_render::{magnitude_response, render_file, EqOverrides, RenderConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eq-render")]
#[command(about = "Offline renderer for the Soul three-band parametric EQ", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./eq-render.toml if present)
    #[arg(short, long, global = true, env = "SOUL_EQ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a WAV file through the EQ
    Render {
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Skip the visualization queue consumer
        #[arg(long)]
        no_analysis: bool,
        #[command(flatten)]
        overrides: EqOverrides,
    },
    /// Print the magnitude response of the configured EQ
    Response {
        /// Sample rate used for the filter design
        #[arg(long, default_value_t = 48000.0)]
        rate: f64,
        /// Number of log-spaced frequencies
        #[arg(long, default_value_t = 31)]
        points: usize,
        #[command(flatten)]
        overrides: EqOverrides,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soul_eq=info,eq_render=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            no_analysis,
            overrides,
        } => {
            let mut config = load_config(cli.config.as_deref(), &overrides)?;
            if no_analysis {
                config.analysis.enabled = false;
            }

            let summary = render_file(&input, &output, &config)?;
            println!(
                "{} frames @ {} Hz, peak {:.2} dBFS -> {:.2} dBFS",
                summary.frames,
                summary.sample_rate,
                to_db(summary.input_peak),
                to_db(summary.output_peak)
            );
        }
        Commands::Response {
            rate,
            points,
            overrides,
        } => {
            let config = load_config(cli.config.as_deref(), &overrides)?;
            for (frequency, db) in magnitude_response(&config.eq, rate, points)? {
                println!("{:>9.1} Hz  {:>+8.2} dB", frequency, db);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, overrides: &EqOverrides) -> anyhow::Result<RenderConfig> {
    let mut config = RenderConfig::load(path)?;
    overrides.apply(&mut config)?;
    config.validate()?;

    tracing::info!(
        "EQ: low-cut {} Hz / {}, peak {} Hz {:+.1} dB Q {}, high-cut {} Hz / {}",
        config.eq.parameters.low_cut_frequency,
        config.eq.parameters.low_cut_slope,
        config.eq.parameters.peak_frequency,
        config.eq.parameters.peak_gain_db,
        config.eq.parameters.peak_quality,
        config.eq.parameters.high_cut_frequency,
        config.eq.parameters.high_cut_slope
    );
    Ok(config)
}

fn to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -100.0
    } else {
        20.0 * linear.log10()
    }
}
