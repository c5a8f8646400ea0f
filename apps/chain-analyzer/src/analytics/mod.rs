//! Metrics engine.
//!
//! Pure functions over one expiration's contracts (plus the volatility
//! surface over the whole snapshot):
//! - Gamma exposure profile and flip point
//! - Open interest walls
//! - Max Pain
//! - Put/call ratios
//! - Expected move
//! - Volume profile
//! - Activity ratios and drift score
//!
//! Metrics never fail. A value that cannot be computed for the given input
//! is reported as `None`, never as zero.
//!
//! # Example
//!
//! ```ignore
//! use chain_analyzer::analytics::ExpiryAnalysis;
//! use chain_analyzer::config::AnalyticsConfig;
//!
//! let expiry = snapshot.default_expiration().expect("non-empty chain");
//! let analysis = ExpiryAnalysis::compute(&snapshot, expiry, &AnalyticsConfig::default());
//! println!("flip: {:?}", analysis.gex.flip_point);
//! ```

mod bundle;
mod drift;
mod expected_move;
mod gex;
mod max_pain;
mod ratios;
mod strikes;
mod surface;
mod volume;
mod walls;

pub use bundle::ExpiryAnalysis;
pub use drift::{ActivityStrike, DriftAnalysis, DriftBias, DriftStrategy, activity_ratios};
pub use expected_move::ExpectedMove;
pub use gex::{GexProfile, GexStrike, flip_point};
pub use max_pain::{MaxPain, PayoutPoint};
pub use ratios::PutCallRatios;
pub use strikes::{aggregate_by_strike, in_band};
pub use surface::{SurfaceError, SurfacePoint, VolSurface};
pub use volume::{VolumeStrike, volume_profile};
pub use walls::{OiStrike, OiWalls, Wall};
