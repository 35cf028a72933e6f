//! Shared constants and comparison helpers for the band indicators

/// Absolute tolerance used when deciding whether the previous trend line was
/// sitting on the upper band.
pub const TREND_LINE_TOLERANCE: f64 = 1e-10;

/// Default Hull lookback for range smoothing and warm-up
pub const DEFAULT_PERIOD: usize = 200;

/// Default band-width multiplier
pub const DEFAULT_FACTOR: f64 = 2.5;

/// Default number of retained candles
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Absolute-tolerance equality. Never true when either side is NaN.
#[inline]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Combine two optional values, yielding `None` if either is missing
#[inline]
pub fn zip_with(a: Option<f64>, b: Option<f64>, f: impl FnOnce(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        _ => None,
    }
}

/// First index holding a defined value
#[inline]
pub fn first_defined<T: Copy>(series: &[Option<T>]) -> Option<usize> {
    series.iter().position(Option::is_some)
}
