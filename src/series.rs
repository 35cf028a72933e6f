//! Full indicator pipeline over a window of bars
//!
//! `RangeSeries -> HullAverage -> BandEngine`, rebuilt from scratch on every
//! call. The result only depends on the bars and the two parameters.

use crate::{
    indicators::{BandEngine, BandSeries, HullAverage, RangeSeries},
    Direction, Factor, Period, OHLC,
};

/// Every derived series for one window, aligned by index with the bars
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSeries {
    pub mid: Vec<f64>,
    pub range: Vec<f64>,
    pub smoothed_range: Vec<Option<f64>>,
    pub upper_band: Vec<Option<f64>>,
    pub lower_band: Vec<Option<f64>>,
    pub trend_line: Vec<Option<f64>>,
    pub direction: Vec<Option<Direction>>,
}

impl DerivedSeries {
    pub fn compute<T: OHLC>(bars: &[T], period: Period, factor: Factor) -> Self {
        let RangeSeries { mid, range } = RangeSeries::from_bars(bars);
        let smoothed_range = HullAverage::new(period).compute(&range);
        let close: Vec<f64> = bars.iter().map(|b| b.close()).collect();

        let BandSeries {
            upper,
            lower,
            trend_line,
            direction,
        } = BandEngine::new(factor, period).run(&mid, &smoothed_range, &close);

        Self {
            mid,
            range,
            smoothed_range,
            upper_band: upper,
            lower_band: lower,
            trend_line,
            direction,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mid.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }

    /// Direction at the newest index, `None` while warming up
    #[inline]
    pub fn last_direction(&self) -> Option<Direction> {
        self.direction.last().copied().flatten()
    }

    /// Index of the first defined direction
    pub fn first_direction_index(&self) -> Option<usize> {
        self.direction.iter().position(Option::is_some)
    }
}

/// Number of bars needed before a direction can exist.
///
/// The band fold starts at `period`, and the smoothed range needs all three
/// nested Hull windows, whichever comes later.
pub fn warm_up_len(period: Period) -> usize {
    let first = HullAverage::new(period)
        .first_defined_index()
        .max(period.get());
    first.saturating_add(1)
}
