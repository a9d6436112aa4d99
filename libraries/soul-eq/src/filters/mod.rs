//! Filter building blocks
//!
//! All processing is mono and in place on `f32` samples:
//! - **coefficients**: pure coefficient design (peak, Butterworth cut cascades)
//! - **FilterStage**: one biquad with delay state and a bypass switch
//! - **CutCascade**: four stages switched on by slope
//! - **ChannelChain**: low-cut → peak → high-cut

mod cascade;
mod chain;
pub mod coefficients;
mod stage;

pub use cascade::CutCascade;
pub use chain::{ChainPosition, ChannelChain};
pub use coefficients::{BiquadCoefficients, CutCoefficients, MAX_CUT_STAGES};
pub use stage::FilterStage;
