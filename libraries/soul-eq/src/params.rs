//! EQ parameters
//!
//! [`ParameterSnapshot`] is the immutable, per-block view of the parameters
//! that the DSP code consumes. [`EqParameters`] is the live store written by
//! a control thread and read by the audio thread.
//!
//! Every field of the live store is its own atomic. A snapshot is taken with
//! one relaxed load per field, so two fields may reflect slightly different
//! moments in time. That is fine for an equalizer: the next block picks up
//! whatever the previous one missed.

use crate::error::{EqError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Lowest frequency any band accepts (Hz)
pub const MIN_FREQUENCY: f32 = 20.0;
/// Highest frequency any band accepts (Hz)
pub const MAX_FREQUENCY: f32 = 20000.0;
/// Peak gain range (dB)
pub const MIN_GAIN_DB: f32 = -30.0;
pub const MAX_GAIN_DB: f32 = 30.0;
/// Peak quality range
pub const MIN_QUALITY: f32 = 0.1;
pub const MAX_QUALITY: f32 = 10.0;

/// Roll-off of a cut filter
///
/// Each step adds one second-order section (12 dB/octave) to the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Slope {
    #[default]
    Slope12,
    Slope24,
    Slope36,
    Slope48,
}

impl Slope {
    /// All slopes, steepest last
    pub const ALL: [Slope; 4] = [Slope::Slope12, Slope::Slope24, Slope::Slope36, Slope::Slope48];

    /// Slope from its choice index (0 = 12 dB/oct ... 3 = 48 dB/oct)
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Choice index (0..=3)
    pub fn index(self) -> usize {
        match self {
            Slope::Slope12 => 0,
            Slope::Slope24 => 1,
            Slope::Slope36 => 2,
            Slope::Slope48 => 3,
        }
    }

    /// Number of cascade stages this slope switches on (1..=4)
    pub fn active_stages(self) -> usize {
        self.index() + 1
    }

    /// Butterworth order of the whole cascade
    pub fn order(self) -> usize {
        2 * self.active_stages()
    }

    /// Roll-off in dB per octave
    pub fn db_per_octave(self) -> u32 {
        12 * self.active_stages() as u32
    }

    /// Slope from a dB/octave value (12, 24, 36 or 48)
    pub fn from_db_per_octave(db: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.db_per_octave() == db)
    }
}

impl fmt::Display for Slope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dB/Oct", self.db_per_octave())
    }
}

impl TryFrom<u32> for Slope {
    type Error = EqError;

    fn try_from(db: u32) -> Result<Self> {
        Self::from_db_per_octave(db)
            .ok_or_else(|| EqError::Config(format!("unsupported slope: {db} dB/Oct")))
    }
}

impl From<Slope> for u32 {
    fn from(slope: Slope) -> Self {
        slope.db_per_octave()
    }
}

/// Value range of a host-facing parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    /// Snapping interval (0 = continuous)
    pub step: f32,
    pub default: f32,
}

impl ParameterRange {
    /// Whether `value` lies inside the range (inclusive)
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Clamp into range and snap to the step grid
    ///
    /// Non-finite input falls back to the default.
    pub fn constrain(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default;
        }

        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }

        // Snap in f64 so grid points land on the nearest f32 (1.0, not 0.99999994)
        let (min, step) = (self.min as f64, self.step as f64);
        let snapped = min + ((clamped as f64 - min) / step).round() * step;
        (snapped as f32).clamp(self.min, self.max)
    }
}

/// Identifier of each host-facing parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    LowCutFrequency,
    HighCutFrequency,
    PeakFrequency,
    PeakGain,
    PeakQuality,
    LowCutSlope,
    HighCutSlope,
}

impl ParameterId {
    pub const ALL: [ParameterId; 7] = [
        ParameterId::LowCutFrequency,
        ParameterId::HighCutFrequency,
        ParameterId::PeakFrequency,
        ParameterId::PeakGain,
        ParameterId::PeakQuality,
        ParameterId::LowCutSlope,
        ParameterId::HighCutSlope,
    ];

    /// Stable, human-readable parameter name
    pub fn name(self) -> &'static str {
        match self {
            ParameterId::LowCutFrequency => "Low-Cut Frequency",
            ParameterId::HighCutFrequency => "High-Cut Frequency",
            ParameterId::PeakFrequency => "Peak Frequency",
            ParameterId::PeakGain => "Peak Gain",
            ParameterId::PeakQuality => "Peak Quality",
            ParameterId::LowCutSlope => "Low-Cut Slope",
            ParameterId::HighCutSlope => "High-Cut Slope",
        }
    }

    /// Range, step and default of the parameter
    ///
    /// Slopes are choice parameters; their value is the choice index.
    pub fn range(self) -> ParameterRange {
        let frequency = |default| ParameterRange {
            min: MIN_FREQUENCY,
            max: MAX_FREQUENCY,
            step: 1.0,
            default,
        };

        match self {
            ParameterId::LowCutFrequency => frequency(20.0),
            ParameterId::HighCutFrequency => frequency(20000.0),
            ParameterId::PeakFrequency => frequency(750.0),
            ParameterId::PeakGain => ParameterRange {
                min: MIN_GAIN_DB,
                max: MAX_GAIN_DB,
                step: 0.5,
                default: 0.0,
            },
            ParameterId::PeakQuality => ParameterRange {
                min: MIN_QUALITY,
                max: MAX_QUALITY,
                step: 0.05,
                default: 1.0,
            },
            ParameterId::LowCutSlope | ParameterId::HighCutSlope => ParameterRange {
                min: 0.0,
                max: 3.0,
                step: 1.0,
                default: 0.0,
            },
        }
    }
}

/// Immutable view of all EQ parameters for one processing block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSnapshot {
    pub low_cut_frequency: f32,
    pub high_cut_frequency: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub peak_frequency: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            low_cut_frequency: ParameterId::LowCutFrequency.range().default,
            high_cut_frequency: ParameterId::HighCutFrequency.range().default,
            low_cut_slope: Slope::Slope12,
            high_cut_slope: Slope::Slope12,
            peak_frequency: ParameterId::PeakFrequency.range().default,
            peak_gain_db: ParameterId::PeakGain.range().default,
            peak_quality: ParameterId::PeakQuality.range().default,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

impl ParameterSnapshot {
    /// Check every continuous field against its range
    pub fn validate(&self) -> Result<()> {
        let fields = [
            (ParameterId::LowCutFrequency, self.low_cut_frequency),
            (ParameterId::HighCutFrequency, self.high_cut_frequency),
            (ParameterId::PeakFrequency, self.peak_frequency),
            (ParameterId::PeakGain, self.peak_gain_db),
            (ParameterId::PeakQuality, self.peak_quality),
        ];

        for (id, value) in fields {
            let range = id.range();
            if !range.contains(value) {
                return Err(EqError::ParameterOutOfRange {
                    parameter: id.name(),
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(())
    }

    /// Linear peak gain (10^(dB/20))
    pub fn peak_gain_linear(&self) -> f32 {
        10.0_f32.powf(self.peak_gain_db / 20.0)
    }
}

#[inline]
fn load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

#[inline]
fn store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

#[inline]
fn load_slope(cell: &AtomicU8) -> Slope {
    Slope::from_index(cell.load(Ordering::Relaxed) as usize).unwrap_or_default()
}

/// Live parameter store shared between control and audio threads
///
/// Wrap it in an `Arc`: the control side calls the setters, the audio side
/// calls [`snapshot`](Self::snapshot) once per block. No call blocks.
#[derive(Debug)]
pub struct EqParameters {
    low_cut_frequency: AtomicU32,
    high_cut_frequency: AtomicU32,
    low_cut_slope: AtomicU8,
    high_cut_slope: AtomicU8,
    peak_frequency: AtomicU32,
    peak_gain_db: AtomicU32,
    peak_quality: AtomicU32,
    low_cut_bypassed: AtomicBool,
    peak_bypassed: AtomicBool,
    high_cut_bypassed: AtomicBool,
}

impl EqParameters {
    /// Store holding the default parameter values
    pub fn new() -> Self {
        Self::from_snapshot(&ParameterSnapshot::default())
    }

    /// Store initialised from a snapshot (values are constrained to range)
    pub fn from_snapshot(snapshot: &ParameterSnapshot) -> Self {
        let params = Self {
            low_cut_frequency: AtomicU32::new(0),
            high_cut_frequency: AtomicU32::new(0),
            low_cut_slope: AtomicU8::new(0),
            high_cut_slope: AtomicU8::new(0),
            peak_frequency: AtomicU32::new(0),
            peak_gain_db: AtomicU32::new(0),
            peak_quality: AtomicU32::new(0),
            low_cut_bypassed: AtomicBool::new(false),
            peak_bypassed: AtomicBool::new(false),
            high_cut_bypassed: AtomicBool::new(false),
        };
        params.apply_snapshot(snapshot);
        params
    }

    /// Read every field once
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            low_cut_frequency: load_f32(&self.low_cut_frequency),
            high_cut_frequency: load_f32(&self.high_cut_frequency),
            low_cut_slope: load_slope(&self.low_cut_slope),
            high_cut_slope: load_slope(&self.high_cut_slope),
            peak_frequency: load_f32(&self.peak_frequency),
            peak_gain_db: load_f32(&self.peak_gain_db),
            peak_quality: load_f32(&self.peak_quality),
            low_cut_bypassed: self.low_cut_bypassed.load(Ordering::Relaxed),
            peak_bypassed: self.peak_bypassed.load(Ordering::Relaxed),
            high_cut_bypassed: self.high_cut_bypassed.load(Ordering::Relaxed),
        }
    }

    /// Write every field of `snapshot` (field by field, not atomically as a whole)
    pub fn apply_snapshot(&self, snapshot: &ParameterSnapshot) {
        self.set_low_cut_frequency(snapshot.low_cut_frequency);
        self.set_high_cut_frequency(snapshot.high_cut_frequency);
        self.set_low_cut_slope(snapshot.low_cut_slope);
        self.set_high_cut_slope(snapshot.high_cut_slope);
        self.set_peak_frequency(snapshot.peak_frequency);
        self.set_peak_gain_db(snapshot.peak_gain_db);
        self.set_peak_quality(snapshot.peak_quality);
        self.set_low_cut_bypassed(snapshot.low_cut_bypassed);
        self.set_peak_bypassed(snapshot.peak_bypassed);
        self.set_high_cut_bypassed(snapshot.high_cut_bypassed);
    }

    /// Set a parameter from its raw host value
    ///
    /// Slopes take the choice index as value. Out-of-range values are
    /// clamped and snapped to the parameter's step.
    pub fn set(&self, id: ParameterId, value: f32) {
        let value = id.range().constrain(value);
        match id {
            ParameterId::LowCutFrequency => store_f32(&self.low_cut_frequency, value),
            ParameterId::HighCutFrequency => store_f32(&self.high_cut_frequency, value),
            ParameterId::PeakFrequency => store_f32(&self.peak_frequency, value),
            ParameterId::PeakGain => store_f32(&self.peak_gain_db, value),
            ParameterId::PeakQuality => store_f32(&self.peak_quality, value),
            ParameterId::LowCutSlope => self.low_cut_slope.store(value as u8, Ordering::Relaxed),
            ParameterId::HighCutSlope => self.high_cut_slope.store(value as u8, Ordering::Relaxed),
        }
    }

    /// Raw host value of a parameter (slopes report their choice index)
    pub fn get(&self, id: ParameterId) -> f32 {
        match id {
            ParameterId::LowCutFrequency => load_f32(&self.low_cut_frequency),
            ParameterId::HighCutFrequency => load_f32(&self.high_cut_frequency),
            ParameterId::PeakFrequency => load_f32(&self.peak_frequency),
            ParameterId::PeakGain => load_f32(&self.peak_gain_db),
            ParameterId::PeakQuality => load_f32(&self.peak_quality),
            ParameterId::LowCutSlope => self.low_cut_slope.load(Ordering::Relaxed) as f32,
            ParameterId::HighCutSlope => self.high_cut_slope.load(Ordering::Relaxed) as f32,
        }
    }

    pub fn set_low_cut_frequency(&self, hz: f32) {
        self.set(ParameterId::LowCutFrequency, hz);
    }

    pub fn set_high_cut_frequency(&self, hz: f32) {
        self.set(ParameterId::HighCutFrequency, hz);
    }

    pub fn set_peak_frequency(&self, hz: f32) {
        self.set(ParameterId::PeakFrequency, hz);
    }

    pub fn set_peak_gain_db(&self, gain_db: f32) {
        self.set(ParameterId::PeakGain, gain_db);
    }

    pub fn set_peak_quality(&self, quality: f32) {
        self.set(ParameterId::PeakQuality, quality);
    }

    pub fn set_low_cut_slope(&self, slope: Slope) {
        self.low_cut_slope.store(slope.index() as u8, Ordering::Relaxed);
    }

    pub fn set_high_cut_slope(&self, slope: Slope) {
        self.high_cut_slope.store(slope.index() as u8, Ordering::Relaxed);
    }

    pub fn set_low_cut_bypassed(&self, bypassed: bool) {
        self.low_cut_bypassed.store(bypassed, Ordering::Relaxed);
    }

    pub fn set_peak_bypassed(&self, bypassed: bool) {
        self.peak_bypassed.store(bypassed, Ordering::Relaxed);
    }

    pub fn set_high_cut_bypassed(&self, bypassed: bool) {
        self.high_cut_bypassed.store(bypassed, Ordering::Relaxed);
    }
}

impl Default for EqParameters {
    fn default() -> Self {
        Self::new()
    }
}
