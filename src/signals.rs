//! Regime transitions derived from a direction series
//!
//! Turns the per-bar direction labels into discrete events: reversal signals
//! at every flip, and trend legs measuring how far price travelled while a
//! regime held.

use crate::{Direction, OHLC};

// ============================================================
// REVERSAL SIGNALS
// ============================================================

/// Side suggested by a regime flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SignalKind {
    /// Flip from `Up` to `Down`: price closed above the upper band
    Long,
    /// Flip from `Down` to `Up`: price closed below the lower band
    Short,
}

impl SignalKind {
    #[inline]
    pub fn from_transition(from: Direction, to: Direction) -> Option<Self> {
        match (from, to) {
            (Direction::Up, Direction::Down) => Some(SignalKind::Long),
            (Direction::Down, Direction::Up) => Some(SignalKind::Short),
            _ => None,
        }
    }
}

/// A regime flip at a specific bar
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Signal {
    pub index: usize,
    pub kind: SignalKind,
    /// Close of the bar that flipped the regime
    pub price: f64,
    pub timestamp: Option<i64>,
}

/// Iterate over `(index, from, to)` for every flip between two defined labels
fn transitions(
    directions: &[Option<Direction>],
) -> impl Iterator<Item = (usize, Direction, Direction)> + '_ {
    directions
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| match (w[0], w[1]) {
            (Some(from), Some(to)) if from != to => Some((i + 1, from, to)),
            _ => None,
        })
}

/// Number of regime flips. Gaps of undefined labels never count as a flip.
pub fn count_changes(directions: &[Option<Direction>]) -> usize {
    transitions(directions).count()
}

/// Emit a signal for every flip between two defined directions.
///
/// # Panics
///
/// If `directions` is longer than `bars`.
pub fn reversals<T: OHLC>(bars: &[T], directions: &[Option<Direction>]) -> Vec<Signal> {
    transitions(directions)
        .filter_map(|(index, from, to)| {
            let kind = SignalKind::from_transition(from, to)?;
            let bar = &bars[index];
            Some(Signal {
                index,
                kind,
                price: bar.close(),
                timestamp: bar.timestamp(),
            })
        })
        .collect()
}

// ============================================================
// TREND LEGS
// ============================================================

/// Price excursion while one regime held.
///
/// A leg opens at the close of the bar that flipped the regime. During `Down`
/// its end follows the highest high of the subsequent bars, during `Up` the
/// lowest low.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrendLeg {
    pub direction: Direction,
    pub start_index: usize,
    pub start_price: f64,
    pub end_index: usize,
    pub end_price: f64,
}

impl TrendLeg {
    fn open(direction: Direction, index: usize, price: f64) -> Self {
        Self {
            direction,
            start_index: index,
            start_price: price,
            end_index: index,
            end_price: price,
        }
    }

    /// Percentage move from start to end, `None` when the start price is zero
    pub fn move_percent(&self) -> Option<f64> {
        (self.start_price != 0.0)
            .then(|| (self.end_price - self.start_price) / self.start_price * 100.0)
    }

    /// Percentage move, only when it went the way the regime implies:
    /// a rise during `Down`, a fall during `Up`.
    pub fn excursion_percent(&self) -> Option<f64> {
        let favorable = match self.direction {
            Direction::Down => self.end_price > self.start_price,
            Direction::Up => self.end_price < self.start_price,
        };
        if favorable {
            self.move_percent()
        } else {
            None
        }
    }

    #[inline]
    pub fn bars(&self) -> usize {
        self.end_index - self.start_index
    }
}

/// Build one leg per regime flip.
///
/// The extreme is strict, so the earliest bar wins a tie. The regime in force
/// before the first flip produces no leg.
///
/// # Panics
///
/// If `directions` is longer than `bars`.
pub fn trend_legs<T: OHLC>(bars: &[T], directions: &[Option<Direction>]) -> Vec<TrendLeg> {
    let mut legs = Vec::new();
    let mut current: Option<TrendLeg> = None;
    let mut extreme: Option<f64> = None;

    for i in 1..directions.len() {
        match (directions[i - 1], directions[i]) {
            (Some(from), Some(to)) if from != to => {
                legs.extend(current.take());
                current = Some(TrendLeg::open(to, i, bars[i].close()));
                extreme = None;
            }
            (_, Some(dir)) => {
                let Some(leg) = current.as_mut().filter(|leg| leg.direction == dir) else {
                    continue;
                };
                let (price, better) = match dir {
                    Direction::Down => {
                        let high = bars[i].high();
                        (high, extreme.map_or(true, |e| high > e))
                    }
                    Direction::Up => {
                        let low = bars[i].low();
                        (low, extreme.map_or(true, |e| low < e))
                    }
                };
                if better {
                    extreme = Some(price);
                    leg.end_index = i;
                    leg.end_price = price;
                }
            }
            (_, None) => {}
        }
    }

    legs.extend(current);
    legs
}
