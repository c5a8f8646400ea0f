//! Implied volatility surface over every expiration of a snapshot.
//!
//! Points are out-of-the-money puts (moneyness below 1) with usable implied
//! volatility. When there are too few, out-of-the-money calls (moneyness
//! above 1) are used instead. The surface is sampled on a regular
//! days-to-expiry by strike grid: each node is interpolated linearly along
//! the strike axis within the two expiries bracketing it, then linearly
//! between those expiries. Nodes outside an expiry's quoted strike range are
//! left empty rather than extrapolated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{ChainSnapshot, ContractRecord, OptionType};
use crate::config::{IvBounds, SurfaceConfig};

/// Surface aggregation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// Too few qualifying out-of-the-money points on either side.
    #[error("Insufficient data for volatility surface: {found} points, {required} required")]
    InsufficientData {
        /// Best point count found.
        found: usize,
        /// Minimum required.
        required: usize,
    },
}

/// One observed input point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Days to expiry.
    pub dte_days: i64,
    /// Strike price.
    pub strike: f64,
    /// Implied volatility.
    pub iv: f64,
}

/// Gridded implied volatility surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSurface {
    /// Side the points were taken from.
    pub option_type: OptionType,
    /// Observed points.
    pub points: Vec<SurfacePoint>,
    /// Days-to-expiry axis, ascending.
    pub dte_axis: Vec<f64>,
    /// Strike axis, ascending.
    pub strike_axis: Vec<f64>,
    /// `iv[i][j]` at `dte_axis[i]`, `strike_axis[j]`.
    pub iv: Vec<Vec<Option<f64>>>,
}

/// Quoted smile of one expiry, strikes ascending and unique.
#[derive(Debug, Clone)]
struct Smile {
    dte: f64,
    strikes: Vec<f64>,
    ivs: Vec<f64>,
}

impl Smile {
    fn at(&self, strike: f64) -> Option<f64> {
        let (first, last) = (*self.strikes.first()?, *self.strikes.last()?);
        if strike < first || strike > last {
            return None;
        }
        let upper = self.strikes.partition_point(|k| *k < strike);
        if upper == 0 {
            return self.ivs.first().copied();
        }
        let (k0, k1) = (self.strikes[upper - 1], self.strikes[upper]);
        let (v0, v1) = (self.ivs[upper - 1], self.ivs[upper]);
        Some(lerp(k0, v0, k1, v1, strike))
    }
}

impl VolSurface {
    /// Build the surface from the whole snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` when neither side has `min_points`
    /// qualifying points.
    #[allow(clippy::cast_precision_loss)]
    pub fn build(
        snapshot: &ChainSnapshot,
        iv_bounds: &IvBounds,
        config: &SurfaceConfig,
    ) -> Result<Self, SurfaceError> {
        let collect = |side: OptionType| -> Vec<SurfacePoint> {
            snapshot
                .records()
                .iter()
                .filter(|r| r.option_type == side && is_otm(r) && iv_bounds.accepts(r.implied_volatility))
                .map(|r| SurfacePoint {
                    dte_days: r.dte_days,
                    strike: r.strike,
                    iv: r.implied_volatility,
                })
                .collect()
        };

        let mut option_type = OptionType::Put;
        let mut points = collect(OptionType::Put);
        if points.len() < config.min_points {
            let calls = collect(OptionType::Call);
            tracing::debug!(
                puts = points.len(),
                calls = calls.len(),
                required = config.min_points,
                "Too few OTM puts for surface, trying OTM calls"
            );
            if calls.len() < config.min_points {
                return Err(SurfaceError::InsufficientData {
                    found: points.len().max(calls.len()),
                    required: config.min_points,
                });
            }
            option_type = OptionType::Call;
            points = calls;
        }

        let smiles = smiles(&points);
        let (dte_min, dte_max) = bounds(points.iter().map(|p| p.dte_days as f64));
        let (strike_min, strike_max) = bounds(points.iter().map(|p| p.strike));
        let dte_axis = linspace(dte_min, dte_max, config.grid_points);
        let strike_axis = linspace(strike_min, strike_max, config.grid_points);

        let iv: Vec<Vec<Option<f64>>> = dte_axis
            .iter()
            .map(|&t| strike_axis.iter().map(|&k| interpolate(&smiles, t, k)).collect())
            .collect();

        tracing::debug!(
            side = %option_type,
            points = points.len(),
            expiries = smiles.len(),
            "Volatility surface built"
        );

        Ok(Self {
            option_type,
            points,
            dte_axis,
            strike_axis,
            iv,
        })
    }

    /// Number of grid nodes with a value.
    #[must_use]
    pub fn filled_nodes(&self) -> usize {
        self.iv.iter().flatten().filter(|v| v.is_some()).count()
    }
}

fn is_otm(record: &ContractRecord) -> bool {
    match record.option_type {
        OptionType::Put => record.moneyness < 1.0,
        OptionType::Call => record.moneyness > 1.0,
    }
}

/// Group points into per-expiry smiles; duplicate strikes are averaged.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn smiles(points: &[SurfacePoint]) -> Vec<Smile> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.dte_days.cmp(&b.dte_days).then(a.strike.total_cmp(&b.strike)));

    let mut smiles: Vec<Smile> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    for p in sorted {
        let dte = p.dte_days as f64;
        if smiles.last().is_none_or(|s| s.dte != dte) {
            smiles.push(Smile {
                dte,
                strikes: Vec::new(),
                ivs: Vec::new(),
            });
            counts.clear();
        }
        let Some(smile) = smiles.last_mut() else {
            continue;
        };
        if smile.strikes.last() == Some(&p.strike) {
            if let (Some(iv), Some(n)) = (smile.ivs.last_mut(), counts.last_mut()) {
                *iv = (*iv * *n as f64 + p.iv) / (*n as f64 + 1.0);
                *n += 1;
            }
        } else {
            smile.strikes.push(p.strike);
            smile.ivs.push(p.iv);
            counts.push(1);
        }
    }
    smiles
}

/// Interpolate at `(dte, strike)` between the bracketing smiles.
fn interpolate(smiles: &[Smile], dte: f64, strike: f64) -> Option<f64> {
    let upper = smiles.partition_point(|s| s.dte < dte);
    match (upper.checked_sub(1).and_then(|i| smiles.get(i)), smiles.get(upper)) {
        (_, Some(hi)) if hi.dte <= dte => hi.at(strike),
        (Some(lo), Some(hi)) => {
            let (v0, v1) = (lo.at(strike)?, hi.at(strike)?);
            Some(lerp(lo.dte, v0, hi.dte, v1, dte))
        }
        _ => None,
    }
}

fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if x1 <= x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// `n` evenly spaced values from `start` to `end`, both included.
#[allow(clippy::cast_precision_loss)]
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut axis: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            if let Some(last) = axis.last_mut() {
                *last = end;
            }
            axis
        }
    }
}
