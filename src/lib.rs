//! # hulltrend - Hull-band regime detector
//!
//! Classifies a stream of OHLC bars into one of two persistent regimes, UP or
//! DOWN, using a SuperTrend-style band whose width is a Hull moving average of
//! the high-low range.
//!
//! ## Quick Start
//!
//! ```rust
//! use hulltrend::prelude::*;
//!
//! let mut detector = DetectorBuilder::new()
//!     .buffer_size(500)
//!     .period(20)
//!     .factor(3.0)
//!     .build()
//!     .unwrap();
//!
//! for i in 0..100 {
//!     let base = 100.0 + (i as f64 * 0.3).sin() * 5.0;
//!     let outcome = detector
//!         .ingest(Candle::new(base, base + 1.0, base - 1.0, base + 0.5))
//!         .unwrap();
//!     if outcome.changed {
//!         // regime flipped on this bar
//!     }
//! }
//!
//! assert!(detector.current_direction().is_some());
//! ```

pub mod detector;
pub mod indicators;
pub mod params;
pub mod series;
pub mod signals;

pub mod prelude {
    pub use crate::{
        // Facade
        detector::{DetectorBuilder, DetectorConfig, IngestOutcome, SeedReport, TrendDetector},
        // Indicators
        indicators::*,
        // Parameters
        params::{get_count, get_factor, get_period, ParamMeta, ParamType, Parameterized},
        // Pipeline
        series::DerivedSeries,
        // Signals
        signals::{count_changes, reversals, trend_legs, Signal, SignalKind, TrendLeg},
        // Types
        Candle,
        Direction,
        Factor,
        OHLCExt,
        Period,
        Result,
        // Errors
        TrendError,
        OHLC,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, TrendError>;

/// Errors reported by the detector and its building blocks
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Lookback length (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(TrendError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

/// Band-width multiplier (finite and > 0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Factor(f64);

impl Factor {
    /// Create a new Factor, validating the value is finite and strictly positive
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(TrendError::InvalidValue(
                "Factor cannot be NaN or infinite",
            ));
        }
        if value <= 0.0 {
            return Err(TrendError::InvalidValue("Factor must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Factor {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Factor {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Factor::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC data trait
pub trait OHLC {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

impl<T: OHLC + ?Sized> OHLC for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn timestamp(&self) -> Option<i64> {
        (**self).timestamp()
    }
}

/// Extension trait with computed properties for OHLC data
pub trait OHLCExt: OHLC {
    /// Midpoint of the bar, `(high + low) / 2`
    #[inline]
    fn mid(&self) -> f64 {
        (self.high() + self.low()) / 2.0
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLC data consistency.
    ///
    /// Only finiteness (of the fields, the range and the midpoint) and
    /// `high >= low` are checked; open and close are allowed outside the
    /// high-low span.
    fn validate(&self) -> Result<()> {
        let fields = [self.open(), self.high(), self.low(), self.close()];
        if fields.iter().any(|v| v.is_nan()) {
            return Err(TrendError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if fields.iter().any(|v| v.is_infinite()) {
            return Err(TrendError::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(TrendError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if !self.range().is_finite() || !self.mid().is_finite() {
            return Err(TrendError::InvalidCandle {
                index: 0,
                reason: "range overflow",
            });
        }
        Ok(())
    }
}

impl<T: OHLC + ?Sized> OHLCExt for T {}

/// Re-tag a validation error with the position of the offending candle
pub(crate) fn validate_at<T: OHLC>(bar: &T, index: usize) -> Result<()> {
    bar.validate().map_err(|e| match e {
        TrendError::InvalidCandle { reason, .. } => TrendError::InvalidCandle { index, reason },
        other => other,
    })
}

// ============================================================
// CANDLE
// ============================================================

/// Owned OHLC bar, immutable once ingested
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Copy any OHLC source into an owned candle
    pub fn from_ohlc<T: OHLC>(bar: &T) -> Self {
        Self {
            open: bar.open(),
            high: bar.high(),
            low: bar.low(),
            close: bar.close(),
            timestamp: bar.timestamp(),
        }
    }
}

impl OHLC for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

// ============================================================
// DIRECTION
// ============================================================

/// Regime label.
///
/// `Up` anchors the trend line to the upper band, `Down` to the lower band.
/// In the numeric convention this detector grew out of, `Up` is `+1` and
/// `Down` is `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Direction::Down)
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// `+1` for `Up`, `-1` for `Down`
    #[inline]
    pub fn as_sign(self) -> i8 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(200).is_ok());
        assert_eq!(
            Period::new(0),
            Err(TrendError::InvalidValue("Period must be > 0"))
        );
    }

    #[test]
    fn test_factor_validation() {
        assert!(Factor::new(2.5).is_ok());
        assert!(Factor::new(0.0001).is_ok());
        assert!(Factor::new(0.0).is_err());
        assert!(Factor::new(-1.0).is_err());
        assert!(Factor::new(f64::NAN).is_err());
        assert!(Factor::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_factor_deserialize_rejects_negative() {
        let parsed: std::result::Result<Factor, _> = serde_json::from_str("-2.0");
        assert!(parsed.is_err());
        let parsed: Factor = serde_json::from_str("4.0").unwrap();
        assert_eq!(parsed.get(), 4.0);
    }

    #[test]
    fn test_period_deserialize_rejects_zero() {
        let parsed: std::result::Result<Period, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_ohlc_ext() {
        let bar = Candle::new(100.0, 110.0, 90.0, 105.0);
        assert_eq!(bar.mid(), 100.0);
        assert_eq!(bar.range(), 20.0);
        assert!(bar.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_candles() {
        let nan = Candle::new(f64::NAN, 1.0, 0.0, 0.5);
        assert_eq!(
            nan.validate(),
            Err(TrendError::InvalidCandle { index: 0, reason: "NaN in OHLC" })
        );

        let inf = Candle::new(1.0, f64::INFINITY, 0.0, 0.5);
        assert_eq!(
            inf.validate(),
            Err(TrendError::InvalidCandle { index: 0, reason: "Infinite value in OHLC" })
        );

        let inverted = Candle::new(1.0, 0.5, 2.0, 1.0);
        assert_eq!(
            inverted.validate(),
            Err(TrendError::InvalidCandle { index: 0, reason: "high < low" })
        );
    }

    #[test]
    fn test_validate_rejects_overflowing_range() {
        let wide = Candle::new(0.0, 1.7e308, -1.7e308, 0.0);
        assert!(wide.range().is_infinite());
        assert_eq!(
            wide.validate(),
            Err(TrendError::InvalidCandle {
                index: 0,
                reason: "range overflow"
            })
        );

        let high = Candle::new(1.7e308, 1.7e308, 1.7e308, 1.7e308);
        assert!(high.validate().is_err());
    }

    #[test]
    fn test_validate_allows_close_outside_range() {
        // Only high >= low is enforced
        let bar = Candle::new(5.0, 2.0, 1.0, 7.0);
        assert!(bar.validate().is_ok());
    }

    #[test]
    fn test_validate_at_reindexes() {
        let bar = Candle::new(1.0, 0.5, 2.0, 1.0);
        assert_eq!(
            validate_at(&bar, 42),
            Err(TrendError::InvalidCandle { index: 42, reason: "high < low" })
        );
    }

    #[test]
    fn test_direction_helpers() {
        assert!(Direction::Up.is_up());
        assert!(Direction::Down.is_down());
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Up.as_sign(), 1);
        assert_eq!(Direction::Down.as_sign(), -1);
    }

    #[test]
    fn test_candle_serde_skips_missing_timestamp() {
        let json = serde_json::to_string(&Candle::new(1.0, 2.0, 0.5, 1.5)).unwrap();
        assert!(!json.contains("timestamp"));

        let parsed: Candle =
            serde_json::from_str(r#"{"open":1.0,"high":2.0,"low":0.5,"close":1.5,"timestamp":7}"#)
                .unwrap();
        assert_eq!(parsed.timestamp(), Some(7));
    }
}
