//! Test utilities for EQ testing
//!
//! Signal generators and measurements shared by the integration tests and
//! benchmarks. Enabled with the `test-utils` feature.

pub mod analysis;
pub mod signals;

pub use analysis::*;
pub use signals::*;
