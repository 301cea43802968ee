//! 支撐/阻力接近旗標
//!
//! ```text
//! at_support    = (close - min(S1, S2, S3)) / close < tolerance
//! at_resistance = (max(R1, R2, R3) - close) / close < tolerance
//! ```
//!
//! 相對差距不取絕對值：收盤價跌破最低支撐時差距為負，也會被標記為
//! at_support。

use serde::{Deserialize, Serialize};

use super::levels::LevelSet;
use super::types::{DomainError, Result};

/// 正的有限容差比例，例如 0.001 代表 0.1%
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidTolerance(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(tolerance: Tolerance) -> Self {
        tolerance.0
    }
}

/// 一列的接近旗標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityFlags {
    pub at_support: bool,
    pub at_resistance: bool,
}

/// 計算單列旗標；沒有價位時返回 None（未定義，而不是 false）
pub fn flag_proximity(
    close: f64,
    levels: Option<&LevelSet>,
    tolerance: Tolerance,
) -> Option<ProximityFlags> {
    let levels = levels?;
    let support_gap = (close - levels.lowest_support()) / close;
    let resistance_gap = (levels.highest_resistance() - close) / close;

    Some(ProximityFlags {
        at_support: support_gap < tolerance.value(),
        at_resistance: resistance_gap < tolerance.value(),
    })
}
