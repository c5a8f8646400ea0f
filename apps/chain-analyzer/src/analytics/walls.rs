//! Open interest walls (support and resistance).
//!
//! Only strikes inside the relevance band around spot take part: the put wall
//! is the largest put open interest at or below spot, the call wall the
//! largest call open interest at or above spot.

use serde::{Deserialize, Serialize};

use super::strikes::{aggregate_by_strike, in_band};
use crate::chain::{ContractRecord, OptionType};
use crate::config::RelevanceBand;

/// A wall level. `strike` is `None` when no contract qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wall {
    /// Strike of the wall.
    pub strike: Option<f64>,
    /// Open interest at the wall (0 when undefined).
    pub open_interest: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct SideTotals {
    calls_oi: u64,
    puts_oi: u64,
}

/// One row of the bidirectional open interest profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OiStrike {
    /// Strike price.
    pub strike: f64,
    /// Call open interest.
    pub calls_oi: u64,
    /// Put open interest.
    pub puts_oi: u64,
    /// Put open interest negated.
    pub puts_oi_neg: i64,
}

/// Walls plus the in-band open interest profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OiWalls {
    /// Support: max put open interest at or below spot.
    pub put_wall: Wall,
    /// Resistance: max call open interest at or above spot.
    pub call_wall: Wall,
    /// In-band strikes, ascending, zero-filled per side.
    pub profile: Vec<OiStrike>,
}

impl OiWalls {
    /// Locate both walls for one expiration.
    #[must_use]
    pub fn compute(records: &[ContractRecord], spot: f64, band: &RelevanceBand) -> Self {
        let grouped = aggregate_by_strike(in_band(records, spot, band), |acc: &mut SideTotals, r| {
            match r.option_type {
                OptionType::Call => acc.calls_oi = acc.calls_oi.saturating_add(r.open_interest),
                OptionType::Put => acc.puts_oi = acc.puts_oi.saturating_add(r.open_interest),
            }
        });

        let put_wall = max_wall(
            grouped
                .iter()
                .filter(|(strike, t)| *strike <= spot && t.puts_oi > 0)
                .map(|(strike, t)| (*strike, t.puts_oi)),
        );
        let call_wall = max_wall(
            grouped
                .iter()
                .filter(|(strike, t)| *strike >= spot && t.calls_oi > 0)
                .map(|(strike, t)| (*strike, t.calls_oi)),
        );

        let profile = grouped
            .into_iter()
            .map(|(strike, t)| OiStrike {
                strike,
                calls_oi: t.calls_oi,
                puts_oi: t.puts_oi,
                puts_oi_neg: -i64::try_from(t.puts_oi).unwrap_or(i64::MAX),
            })
            .collect();

        Self {
            put_wall,
            call_wall,
            profile,
        }
    }
}

/// Largest open interest over ascending strikes; the lowest strike wins ties.
fn max_wall(candidates: impl Iterator<Item = (f64, u64)>) -> Wall {
    candidates.fold(Wall::default(), |best, (strike, oi)| {
        if best.strike.is_none() || oi > best.open_interest {
            Wall {
                strike: Some(strike),
                open_interest: oi,
            }
        } else {
            best
        }
    })
}
