//! Ratcheting volatility bands and the UP/DOWN state machine
//!
//! Bands sit at `mid ± factor * smoothed_range`. Each band may only tighten
//! toward price, except that a breach by the previous close lets it snap to
//! the fresh candidate. The regime flips only when price closes through the
//! band the trend line is currently anchored to.

use super::helpers::{approx_eq, TREND_LINE_TOLERANCE};
use crate::{Direction, Factor, Period};

/// One evaluated index of the band fold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandState {
    pub upper: f64,
    pub lower: f64,
    pub trend_line: f64,
    pub direction: Direction,
}

impl BandState {
    /// Whether the trend line was following the upper band
    #[inline]
    pub fn tracks_upper(&self) -> bool {
        approx_eq(self.trend_line, self.upper, TREND_LINE_TOLERANCE)
    }
}

/// Inputs consumed by a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInput {
    pub mid: f64,
    /// Smoothed high-low range at this index
    pub dist: f64,
    pub close: f64,
    pub prev_close: f64,
}

/// Band and direction series aligned with the input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSeries {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub trend_line: Vec<Option<f64>>,
    pub direction: Vec<Option<Direction>>,
}

impl BandSeries {
    fn undefined(len: usize) -> Self {
        Self {
            upper: vec![None; len],
            lower: vec![None; len],
            trend_line: vec![None; len],
            direction: vec![None; len],
        }
    }

    fn set(&mut self, i: usize, state: &BandState) {
        self.upper[i] = Some(state.upper);
        self.lower[i] = Some(state.lower);
        self.trend_line[i] = Some(state.trend_line);
        self.direction[i] = Some(state.direction);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.direction.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.direction.is_empty()
    }
}

/// SuperTrend-style band engine.
///
/// Evaluation starts at index `period`; earlier indices stay undefined even
/// when the smoothed range is already available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandEngine {
    pub factor: Factor,
    pub period: Period,
}

impl BandEngine {
    pub fn new(factor: Factor, period: Period) -> Self {
        Self { factor, period }
    }

    /// Advance the fold by one index.
    ///
    /// `prev` is the state at the previous index, or `None` when that index was
    /// undefined. A `None` predecessor reseeds both the bands and the regime.
    pub fn step(&self, prev: Option<&BandState>, input: BandInput) -> BandState {
        let offset = self.factor.get() * input.dist;
        let candidate_upper = input.mid + offset;
        let candidate_lower = input.mid - offset;

        let prev_lower = prev.map_or(candidate_lower, |p| p.lower);
        let prev_upper = prev.map_or(candidate_upper, |p| p.upper);

        let lower = if candidate_lower > prev_lower || input.prev_close < prev_lower {
            candidate_lower
        } else {
            prev_lower
        };
        let upper = if candidate_upper < prev_upper || input.prev_close > prev_upper {
            candidate_upper
        } else {
            prev_upper
        };

        let direction = match prev {
            None => {
                if input.close <= upper {
                    Direction::Up
                } else {
                    Direction::Down
                }
            }
            Some(p) if p.tracks_upper() => {
                if input.close > upper {
                    Direction::Down
                } else {
                    Direction::Up
                }
            }
            Some(_) => {
                if input.close < lower {
                    Direction::Up
                } else {
                    Direction::Down
                }
            }
        };

        let trend_line = match direction {
            Direction::Down => lower,
            Direction::Up => upper,
        };

        BandState {
            upper,
            lower,
            trend_line,
            direction,
        }
    }

    /// Fold the whole series.
    ///
    /// # Panics
    ///
    /// If `mid`, `smoothed_range` and `close` differ in length.
    pub fn run(&self, mid: &[f64], smoothed_range: &[Option<f64>], close: &[f64]) -> BandSeries {
        assert_eq!(mid.len(), smoothed_range.len(), "mid/smoothed_range length mismatch");
        assert_eq!(mid.len(), close.len(), "mid/close length mismatch");

        let len = mid.len();
        let mut out = BandSeries::undefined(len);
        let mut prev: Option<BandState> = None;

        for i in self.period.get()..len {
            // An overflowed smoothing counts as undefined
            let Some(dist) = smoothed_range[i].filter(|d| d.is_finite()) else {
                prev = None;
                continue;
            };

            let state = self.step(
                prev.as_ref(),
                BandInput {
                    mid: mid[i],
                    dist,
                    close: close[i],
                    prev_close: close[i - 1],
                },
            );
            out.set(i, &state);
            prev = Some(state);
        }

        out
    }
}
