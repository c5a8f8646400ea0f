//! Put/call ratios.

use serde::{Deserialize, Serialize};

use crate::chain::ContractRecord;

/// Put/call totals and ratios for one expiration.
///
/// A ratio is `None` when its call-side denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PutCallRatios {
    /// Total call open interest.
    pub call_oi: u64,
    /// Total put open interest.
    pub put_oi: u64,
    /// Total call volume.
    pub call_volume: u64,
    /// Total put volume.
    pub put_volume: u64,
    /// `put_oi / call_oi`.
    pub oi_ratio: Option<f64>,
    /// `put_volume / call_volume`.
    pub volume_ratio: Option<f64>,
}

impl PutCallRatios {
    /// Sum both sides and divide.
    #[must_use]
    pub fn compute(records: &[ContractRecord]) -> Self {
        let mut totals = Self::default();
        for r in records {
            if r.is_call() {
                totals.call_oi = totals.call_oi.saturating_add(r.open_interest);
                totals.call_volume = totals.call_volume.saturating_add(r.volume);
            } else {
                totals.put_oi = totals.put_oi.saturating_add(r.open_interest);
                totals.put_volume = totals.put_volume.saturating_add(r.volume);
            }
        }
        totals.oi_ratio = ratio(totals.put_oi, totals.call_oi);
        totals.volume_ratio = ratio(totals.put_volume, totals.call_volume);
        totals
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}
