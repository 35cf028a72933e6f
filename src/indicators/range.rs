//! Per-bar midpoint and high-low range

use crate::{OHLCExt, OHLC};

/// Midpoint and range of every bar, aligned by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSeries {
    pub mid: Vec<f64>,
    pub range: Vec<f64>,
}

impl RangeSeries {
    pub fn from_bars<T: OHLC>(bars: &[T]) -> Self {
        let (mid, range) = bars.iter().map(|b| (b.mid(), b.range())).unzip();
        Self { mid, range }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mid.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }
}
