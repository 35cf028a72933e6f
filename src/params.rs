//! Parameter metadata for the detector
//!
//! This module describes the tunable detector parameters, enabling:
//! - Grid search over band width and lookback
//! - Parameter documentation
//! - Building configs from loosely typed key/value maps
//!
//! # Example
//!
//! ```rust
//! use hulltrend::params::Parameterized;
//! use hulltrend::prelude::*;
//!
//! for param in DetectorConfig::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{Factor, Period, Result, TrendError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Strictly positive real multiplier
  Factor,
  /// Lookback length (positive integer)
  Period,
  /// Element count such as a buffer size (positive integer)
  Count,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "factor")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn factor(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Factor, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn count(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Count, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(TrendError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Factor => {
        Factor::new(value)?;
        Ok(())
      },
      ParamType::Period | ParamType::Count => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(TrendError::InvalidValue("Value must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED TRAIT
// ============================================================

/// Types that can be described by, and built from, parameter metadata
pub trait Parameterized: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a value with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Factor from params with default fallback
pub fn get_factor(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Factor> {
  let value = params.get(key).copied().unwrap_or(default);
  Factor::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value.is_nan() || value.fract() != 0.0 {
    return Err(TrendError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

/// Helper to get a positive count from params with default fallback
pub fn get_count(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<usize> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value.is_nan() || value < 1.0 {
    return Err(TrendError::InvalidValue("Count must be >= 1"));
  }
  if value.fract() != 0.0 {
    return Err(TrendError::InvalidValue("Count must be a positive integer"));
  }
  Ok(value as usize)
}

// ============================================================
// TESTS
// ============================================================
