//! Chain export parser configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{CONTRACT_MULTIPLIER, HEADER_SCAN_LINES};

/// Parser configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Leading lines scanned for the spot price and timestamp.
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,
    /// Contract multiplier used for gamma exposure notional.
    #[serde(default = "default_contract_multiplier")]
    pub contract_multiplier: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_lines: default_header_lines(),
            contract_multiplier: default_contract_multiplier(),
        }
    }
}

const fn default_header_lines() -> usize {
    HEADER_SCAN_LINES
}

const fn default_contract_multiplier() -> f64 {
    CONTRACT_MULTIPLIER
}
