//! Indicator building blocks
//!
//! Every indicator here is a pure function of its input series and returns an
//! output aligned index-for-index with that input. Positions without enough
//! lookback are `None`.
//!
//! # Components
//!
//! - **WeightedAverage**: linearly weighted moving average.
//! - **HullAverage**: lag-reduced average built from three weighted passes.
//! - **RangeSeries**: per-bar midpoint and high-low range.
//! - **BandEngine**: ratcheting volatility bands and the regime state machine.

pub mod helpers;

pub mod average;
pub mod bands;
pub mod range;

pub use average::*;
pub use bands::*;
pub use helpers::*;
pub use range::*;
