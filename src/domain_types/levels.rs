//! 古典樞軸點（Pivot / Support / Resistance）
//!
//! ```text
//! P  = (H + L + C) / 3
//! S1 = 2P - H        R1 = 2P - L
//! S2 = P - (H - L)   R2 = P + (H - L)
//! S3 = L - 2(H - P)  R3 = H + 2(P - L)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data_point::Candle;
use super::time_series::CandleSeries;
use super::types::{DomainError, Result};

/// 一個週期導出的七個價位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub p: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
}

impl LevelSet {
    /// 由週期的 high / low / close 計算
    pub fn from_hlc(high: f64, low: f64, close: f64) -> Self {
        let p = (high + low + close) / 3.0;
        let range = high - low;

        Self {
            p,
            s1: 2.0 * p - high,
            s2: p - range,
            s3: low - 2.0 * (high - p),
            r1: 2.0 * p - low,
            r2: p + range,
            r3: high + 2.0 * (p - low),
        }
    }

    /// 依 P, S1, S2, S3, R1, R2, R3 順序輸出，與 `ColumnName::LEVELS` 對應
    pub fn values(&self) -> [f64; 7] {
        [self.p, self.s1, self.s2, self.s3, self.r1, self.r2, self.r3]
    }

    /// 最低支撐 min(S1, S2, S3)
    pub fn lowest_support(&self) -> f64 {
        self.s1.min(self.s2).min(self.s3)
    }

    /// 最高阻力 max(R1, R2, R3)
    pub fn highest_resistance(&self) -> f64 {
        self.r1.max(self.r2).max(self.r3)
    }

    /// S3 <= S2 <= S1 <= P <= R1 <= R2 <= R3
    pub fn is_ordered(&self) -> bool {
        let ordered = [self.s3, self.s2, self.s1, self.p, self.r1, self.r2, self.r3];
        ordered.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// 某個週期起點及其價位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodLevels {
    pub period_start: DateTime<Utc>,
    pub levels: LevelSet,
}

/// 樞軸點計算器
pub struct PivotCalculator;

impl PivotCalculator {
    /// 單一粗粒度K線的價位
    pub fn compute_levels(row: &Candle) -> LevelSet {
        LevelSet::from_hlc(row.high, row.low, row.close)
    }

    /// 對整個粗粒度序列逐列計算
    ///
    /// 序列必須帶有頻率（即重採樣的輸出），其時間戳視為週期起點。
    pub fn compute_all(coarse: &CandleSeries) -> Result<Vec<PeriodLevels>> {
        if coarse.frequency.is_none() {
            return Err(DomainError::InvalidConfig(format!(
                "序列 {} 沒有頻率，無法作為週期價位來源",
                coarse.symbol
            )));
        }
        coarse.ensure_canonical()?;

        let levels: Vec<PeriodLevels> = coarse
            .data
            .iter()
            .map(|row| PeriodLevels {
                period_start: row.timestamp,
                levels: Self::compute_levels(row),
            })
            .collect();

        debug!(symbol = %coarse.symbol, periods = levels.len(), "樞軸點計算完成");
        Ok(levels)
    }
}
