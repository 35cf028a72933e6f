//! Streaming regime detector
//!
//! [`TrendDetector`] owns a bounded candle history and re-derives the whole
//! indicator pipeline on every update. Callers feed completed bars one at a
//! time (or in bulk through [`TrendDetector::seed`]) and read back the
//! current direction along with whether it just changed.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace, warn};

use crate::{
    indicators::{DEFAULT_BUFFER_SIZE, DEFAULT_FACTOR, DEFAULT_PERIOD},
    params::{get_count, get_factor, get_period, ParamMeta, Parameterized},
    series::{self, DerivedSeries},
    signals::{self, Signal, TrendLeg},
    validate_at, Candle, Direction, Factor, Period, Result, TrendError, OHLC,
};

// ============================================================
// CONFIG
// ============================================================

/// Detector configuration, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Number of retained candles
    pub buffer_size: usize,
    /// Hull lookback for the range smoothing, also the warm-up threshold
    pub period: Period,
    /// Band-width multiplier
    pub factor: Factor,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            period: Period::new_const(DEFAULT_PERIOD),
            factor: Factor::new_const(DEFAULT_FACTOR),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(TrendError::InvalidConfig(
                "buffer_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Retained candles required before a direction can be produced
    #[inline]
    pub fn warm_up_len(&self) -> usize {
        series::warm_up_len(self.period)
    }
}

static CONFIG_PARAMS: [ParamMeta; 3] = [
    ParamMeta::factor(
        "factor",
        DEFAULT_FACTOR,
        (1.0, 5.0, 0.5),
        "Band width as a multiple of the smoothed range",
    ),
    ParamMeta::period(
        "period",
        DEFAULT_PERIOD as f64,
        (50.0, 300.0, 25.0),
        "Hull lookback for range smoothing and warm-up",
    ),
    ParamMeta::count(
        "buffer_size",
        DEFAULT_BUFFER_SIZE as f64,
        (250.0, 2000.0, 250.0),
        "Number of retained candles",
    ),
];

impl Parameterized for DetectorConfig {
    fn param_meta() -> &'static [ParamMeta] {
        &CONFIG_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            buffer_size: get_count(params, "buffer_size", DEFAULT_BUFFER_SIZE)?,
            period: get_period(params, "period", DEFAULT_PERIOD)?,
            factor: get_factor(params, "factor", DEFAULT_FACTOR)?,
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================
// OUTCOMES
// ============================================================

/// Result of a single [`TrendDetector::ingest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Direction after this candle, `None` while warming up
    pub direction: Option<Direction>,
    /// Direction before this candle
    pub previous: Option<Direction>,
    /// Both directions defined and different
    pub changed: bool,
}

impl IngestOutcome {
    fn new(previous: Option<Direction>, direction: Option<Direction>) -> Self {
        let changed = matches!((previous, direction), (Some(p), Some(d)) if p != d);
        Self {
            direction,
            previous,
            changed,
        }
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        self.direction.is_some()
    }
}

/// Summary of a bulk [`TrendDetector::seed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub ingested: usize,
    pub direction: Option<Direction>,
    /// Regime flips across the whole seeded batch, not only the retained tail
    pub trend_changes: usize,
}

// ============================================================
// DETECTOR
// ============================================================

/// Bounded-history regime detector
#[derive(Debug, Clone)]
pub struct TrendDetector {
    config: DetectorConfig,
    history: VecDeque<Candle>,
    series: DerivedSeries,
    last_direction: Option<Direction>,
    ingested: usize,
}

impl TrendDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;

        let warm_up = config.warm_up_len();
        if config.buffer_size < warm_up {
            warn!(
                buffer_size = config.buffer_size,
                warm_up,
                "buffer cannot hold the warm-up window, direction will stay undefined"
            );
        }

        Ok(Self {
            config,
            history: VecDeque::with_capacity(config.buffer_size.min(warm_up)),
            series: DerivedSeries::default(),
            last_direction: None,
            ingested: 0,
        })
    }

    /// Append one completed candle and re-evaluate.
    ///
    /// A candle with a non-finite field or `high < low` is rejected and leaves
    /// the detector untouched. The error index is the candle's sequence number.
    pub fn ingest<T: OHLC>(&mut self, bar: T) -> Result<IngestOutcome> {
        validate_at(&bar, self.ingested)?;

        self.push(Candle::from_ohlc(&bar));
        self.ingested += 1;

        let outcome = self.evaluate();
        if outcome.changed {
            debug!(
                from = ?outcome.previous,
                to = ?outcome.direction,
                close = bar.close(),
                sequence = self.ingested - 1,
                "regime changed"
            );
        } else {
            trace!(direction = ?outcome.direction, close = bar.close(), "candle ingested");
        }
        Ok(outcome)
    }

    /// Bulk-load candles in chronological order.
    ///
    /// Ends in the same state as ingesting each candle in turn. The whole batch
    /// is validated first; on error nothing is ingested and the index points
    /// into `bars`.
    pub fn seed<T: OHLC>(&mut self, bars: &[T]) -> Result<SeedReport> {
        for (i, bar) in bars.iter().enumerate() {
            validate_at(bar, i)?;
        }

        let trend_changes = if bars.is_empty() {
            0
        } else {
            let full = DerivedSeries::compute(bars, self.config.period, self.config.factor);
            signals::count_changes(&full.direction)
        };

        for bar in bars {
            self.push(Candle::from_ohlc(bar));
        }
        self.ingested += bars.len();

        let outcome = self.evaluate();
        debug!(
            ingested = bars.len(),
            retained = self.history.len(),
            trend_changes,
            direction = ?outcome.direction,
            "seed completed"
        );

        Ok(SeedReport {
            ingested: bars.len(),
            direction: outcome.direction,
            trend_changes,
        })
    }

    /// Last computed direction, without recomputation
    #[inline]
    pub fn current_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    /// Derived series from the last evaluation
    #[inline]
    pub fn series(&self) -> &DerivedSeries {
        &self.series
    }

    #[inline]
    pub fn history(&self) -> &VecDeque<Candle> {
        &self.history
    }

    #[inline]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Total candles accepted since construction or the last reset
    #[inline]
    pub fn ingested(&self) -> usize {
        self.ingested
    }

    #[inline]
    pub fn warm_up_len(&self) -> usize {
        self.config.warm_up_len()
    }

    #[inline]
    pub fn is_warmed_up(&self) -> bool {
        self.history.len() >= self.warm_up_len()
    }

    /// Reversal signals within the retained history
    pub fn signals(&self) -> Vec<Signal> {
        let bars: Vec<&Candle> = self.history.iter().collect();
        signals::reversals(&bars, &self.series.direction)
    }

    /// Trend legs within the retained history
    pub fn legs(&self) -> Vec<TrendLeg> {
        let bars: Vec<&Candle> = self.history.iter().collect();
        signals::trend_legs(&bars, &self.series.direction)
    }

    /// Drop all candles and derived state
    pub fn reset(&mut self) {
        self.history.clear();
        self.series = DerivedSeries::default();
        self.last_direction = None;
        self.ingested = 0;
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn push(&mut self, candle: Candle) {
        if self.history.len() >= self.config.buffer_size {
            self.history.pop_front();
        }
        self.history.push_back(candle);
    }

    fn evaluate(&mut self) -> IngestOutcome {
        let DetectorConfig { period, factor, .. } = self.config;
        self.series = DerivedSeries::compute(&*self.history.make_contiguous(), period, factor);

        let previous = self.last_direction;
        let direction = self.series.last_direction();
        self.last_direction = direction;
        IngestOutcome::new(previous, direction)
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`TrendDetector`]; values are validated in [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct DetectorBuilder {
    buffer_size: usize,
    period: usize,
    factor: f64,
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBuilder {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            period: DEFAULT_PERIOD,
            factor: DEFAULT_FACTOR,
        }
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn config(self) -> Result<DetectorConfig> {
        let config = DetectorConfig {
            buffer_size: self.buffer_size,
            period: Period::new(self.period)?,
            factor: Factor::new(self.factor)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn build(self) -> Result<TrendDetector> {
        TrendDetector::new(self.config()?)
    }
}

// ============================================================
// TESTS
// ============================================================
