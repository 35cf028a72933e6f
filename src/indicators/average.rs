//! Weighted and Hull moving averages
//!
//! Both averages keep the output the same length as the input. Leading
//! positions without a full window are `None`, and a window that contains an
//! undefined value produces `None` rather than a partial average.

use super::helpers::zip_with;
use crate::Period;

// ============================================================
// WEIGHTED AVERAGE
// ============================================================

/// Linearly weighted moving average.
///
/// Within each window the oldest sample has weight 1 and the newest has
/// weight `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedAverage {
    pub period: Period,
}

impl WeightedAverage {
    pub fn new(period: Period) -> Self {
        Self { period }
    }

    /// Sum of the weights `1..=period`
    #[inline]
    pub fn weight_sum(&self) -> f64 {
        let p = self.period.get() as f64;
        p * (p + 1.0) / 2.0
    }

    /// Average a fully defined series.
    pub fn compute(&self, data: &[f64]) -> Vec<Option<f64>> {
        let period = self.period.get();
        let weight_sum = self.weight_sum();

        (0..data.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &data[i + 1 - period..=i];
                let weighted: f64 = window
                    .iter()
                    .enumerate()
                    .map(|(j, &v)| v * (j + 1) as f64)
                    .sum();
                Some(weighted / weight_sum)
            })
            .collect()
    }

    /// Average a series that may contain undefined positions.
    ///
    /// Produces the same values as [`compute`](Self::compute) wherever the
    /// whole window is defined.
    pub fn compute_sparse(&self, data: &[Option<f64>]) -> Vec<Option<f64>> {
        let period = self.period.get();
        let weight_sum = self.weight_sum();

        (0..data.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &data[i + 1 - period..=i];
                let mut weighted = 0.0;
                for (j, v) in window.iter().enumerate() {
                    weighted += (*v)? * (j + 1) as f64;
                }
                Some(weighted / weight_sum)
            })
            .collect()
    }
}

// ============================================================
// HULL AVERAGE
// ============================================================

/// Hull moving average: `WMA(2 * WMA(n/2) - WMA(n), sqrt(n))`.
///
/// The half and square-root windows are floored and clamped to at least 1, so
/// `period = 1` degenerates to the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HullAverage {
    pub period: Period,
}

impl HullAverage {
    pub fn new(period: Period) -> Self {
        Self { period }
    }

    #[inline]
    pub fn half_period(&self) -> Period {
        Period::new_const((self.period.get() / 2).max(1))
    }

    #[inline]
    pub fn sqrt_period(&self) -> Period {
        Period::new_const(((self.period.get() as f64).sqrt() as usize).max(1))
    }

    /// Index of the first defined output, regardless of input length
    #[inline]
    pub fn first_defined_index(&self) -> usize {
        let full = self.period.get() - 1;
        full.saturating_add(self.sqrt_period().get() - 1)
    }

    pub fn compute(&self, data: &[f64]) -> Vec<Option<f64>> {
        let wma_half = WeightedAverage::new(self.half_period()).compute(data);
        let wma_full = WeightedAverage::new(self.period).compute(data);

        let raw: Vec<Option<f64>> = wma_half
            .iter()
            .zip(&wma_full)
            .map(|(&half, &full)| zip_with(half, full, |h, f| 2.0 * h - f))
            .collect();

        WeightedAverage::new(self.sqrt_period()).compute_sparse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(n: usize) -> Period {
        Period::new(n).unwrap()
    }

    #[test]
    fn test_wma_known_values() {
        let wma = WeightedAverage::new(period(3));
        let out = wma.compute(&[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(out.len(), 4);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        // (1*1 + 2*2 + 3*3) / 6
        assert!((out[2].unwrap() - 14.0 / 6.0).abs() < 1e-12);
        // (2*1 + 3*2 + 4*3) / 6
        assert!((out[3].unwrap() - 20.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_wma_newest_weighted_most() {
        let wma = WeightedAverage::new(period(2));
        let out = wma.compute(&[0.0, 3.0]);
        // (0*1 + 3*2) / 3
        assert_eq!(out[1], Some(2.0));
    }

    #[test]
    fn test_wma_empty_and_short() {
        let wma = WeightedAverage::new(period(5));
        assert!(wma.compute(&[]).is_empty());

        let out = wma.compute(&[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn test_wma_period_one_is_identity() {
        let data = [1.5, -2.25, 1e6, 0.1];
        let out = WeightedAverage::new(period(1)).compute(&data);
        for (o, d) in out.iter().zip(&data) {
            assert_eq!(*o, Some(*d));
        }
    }

    #[test]
    fn test_wma_constant_series_is_exact() {
        let data = vec![2.0; 50];
        let out = WeightedAverage::new(period(20)).compute(&data);
        assert!(out[19..].iter().all(|v| *v == Some(2.0)));
    }

    #[test]
    fn test_wma_sparse_propagates_undefined() {
        let wma = WeightedAverage::new(period(2));
        let out = wma.compute_sparse(&[Some(1.0), None, Some(3.0), Some(5.0)]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
        // (3*1 + 5*2) / 3
        assert!((out[3].unwrap() - 13.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_wma_sparse_matches_dense() {
        let data: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).cos() * 10.0).collect();
        let sparse: Vec<Option<f64>> = data.iter().copied().map(Some).collect();
        let wma = WeightedAverage::new(period(7));
        assert_eq!(wma.compute(&data), wma.compute_sparse(&sparse));
    }

    #[test]
    fn test_hma_sub_periods() {
        let hma = HullAverage::new(period(200));
        assert_eq!(hma.half_period().get(), 100);
        assert_eq!(hma.sqrt_period().get(), 14);
        assert_eq!(hma.first_defined_index(), 212);

        let hma = HullAverage::new(period(1));
        assert_eq!(hma.half_period().get(), 1);
        assert_eq!(hma.sqrt_period().get(), 1);
        assert_eq!(hma.first_defined_index(), 0);

        let hma = HullAverage::new(period(4));
        assert_eq!(hma.half_period().get(), 2);
        assert_eq!(hma.sqrt_period().get(), 2);
        assert_eq!(hma.first_defined_index(), 4);
    }

    #[test]
    fn test_hma_period_one_is_identity() {
        let data = [3.0, 1.25, -7.5, 1e-3, 42.0];
        let out = HullAverage::new(period(1)).compute(&data);
        for (o, d) in out.iter().zip(&data) {
            assert_eq!(*o, Some(*d));
        }
    }

    #[test]
    fn test_hma_warm_up_boundary() {
        let data: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let hma = HullAverage::new(period(16));
        let out = hma.compute(&data);

        let first = hma.first_defined_index();
        assert!(out[..first].iter().all(Option::is_none));
        assert!(out[first..].iter().all(Option::is_some));
    }

    #[test]
    fn test_hma_first_defined_saturates() {
        assert_eq!(HullAverage::new(period(usize::MAX)).first_defined_index(), usize::MAX);

        let out = HullAverage::new(period(usize::MAX)).compute(&[1.0; 4]);
        assert_eq!(out, vec![None; 4]);
    }

    #[test]
    fn test_hma_tracks_linear_series() {
        // Hull cancels the lag of a straight line exactly
        let data: Vec<f64> = (0..60).map(|i| 2.0 * i as f64 + 1.0).collect();
        let out = HullAverage::new(period(9)).compute(&data);
        for i in 20..60 {
            let v = out[i].unwrap();
            assert!((v - data[i]).abs() < 1e-9, "index {i}: {v} vs {}", data[i]);
        }
    }

    #[test]
    fn test_hma_short_input_all_undefined() {
        let out = HullAverage::new(period(10)).compute(&[1.0; 9]);
        assert_eq!(out, vec![None; 9]);
    }
}
