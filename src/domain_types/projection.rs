//! 將週期價位投影回細粒度時間軸
//!
//! 細粒度K線只能看到「已完成」週期的價位：對時間戳 t，先求其所屬週期的
//! 起點 `start(t)`，再取起點嚴格早於 `start(t)` 的最後一個週期價位。
//! 兩邊都已排序，因此以單次合併掃描完成 as-of 連接。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::frequency::Frequency;
use super::levels::{LevelSet, PeriodLevels};
use super::time_series::CandleSeries;
use super::types::{DomainError, Result};

/// 歷史不足的軟性警告：序列開頭沒有任何已完成週期可用的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientHistory {
    /// 缺少價位的列數
    pub rows: usize,
    /// 第一個有價位的時間戳；整段都沒有時為 None
    pub first_covered: Option<DateTime<Utc>>,
}

/// 投影結果，與細粒度序列逐列對齊
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedLevels {
    pub timestamps: Vec<DateTime<Utc>>,
    pub levels: Vec<Option<LevelSet>>,
}

impl ProjectedLevels {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// 若開頭有缺少價位的列，返回對應的警告
    pub fn insufficient_history(&self) -> Option<InsufficientHistory> {
        let rows = self.levels.iter().take_while(|l| l.is_none()).count();
        if rows == 0 {
            return None;
        }
        Some(InsufficientHistory {
            rows,
            first_covered: self.timestamps.get(rows).copied(),
        })
    }
}

/// 價位投影器
#[derive(Debug, Clone, Copy)]
pub struct LevelProjector {
    frequency: Frequency,
}

impl LevelProjector {
    pub fn new(frequency: Frequency) -> Result<Self> {
        frequency.validate()?;
        Ok(Self { frequency })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// 投影價位
    ///
    /// `levels_by_period` 必須依週期起點嚴格遞增，且每個起點都對齊本投影器
    /// 的頻率。
    pub fn project(
        &self,
        levels_by_period: &[PeriodLevels],
        fine: &CandleSeries,
    ) -> Result<ProjectedLevels> {
        fine.ensure_canonical()?;
        self.check_periods(levels_by_period)?;

        let mut timestamps = Vec::with_capacity(fine.len());
        let mut levels = Vec::with_capacity(fine.len());
        let mut cursor = 0usize;
        let mut active: Option<LevelSet> = None;

        for candle in &fine.data {
            let containing = self.frequency.period_start(candle.timestamp)?;
            while cursor < levels_by_period.len()
                && levels_by_period[cursor].period_start < containing
            {
                active = Some(levels_by_period[cursor].levels);
                cursor += 1;
            }
            timestamps.push(candle.timestamp);
            levels.push(active);
        }

        let projected = ProjectedLevels { timestamps, levels };

        match projected.insufficient_history() {
            Some(gap) => warn!(
                symbol = %fine.symbol,
                frequency = %self.frequency,
                rows = gap.rows,
                "歷史不足，開頭的K線沒有已完成週期的價位"
            ),
            None => debug!(symbol = %fine.symbol, rows = projected.len(), "價位投影完成"),
        }

        Ok(projected)
    }

    fn check_periods(&self, levels_by_period: &[PeriodLevels]) -> Result<()> {
        for (index, period) in levels_by_period.iter().enumerate() {
            if !self.frequency.is_period_start(period.period_start)? {
                return Err(DomainError::InvalidTimestamp(format!(
                    "第 {} 個週期起點 {} 未對齊頻率 {}",
                    index, period.period_start, self.frequency
                )));
            }
            if index > 0 && period.period_start <= levels_by_period[index - 1].period_start {
                return Err(DomainError::UnsortedTimestamps {
                    index,
                    timestamp: period.period_start,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_types::data_point::Candle;
    use chrono::{Duration, TimeZone};

    fn levels_at(start: DateTime<Utc>, base: f64) -> PeriodLevels {
        PeriodLevels {
            period_start: start,
            levels: LevelSet::from_hlc(base + 10.0, base - 10.0, base),
        }
    }

    #[test]
    fn test_boundary_candle_sees_previous_period_only() {
        let day1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let day2 = day1 + Duration::days(1);
        let periods = vec![levels_at(day1, 100.0), levels_at(day2, 200.0)];

        let candles = vec![
            Candle::new(day1 + Duration::hours(23), 1.0, 1.0, 1.0, 1.0, 1.0),
            Candle::new(day2, 1.0, 1.0, 1.0, 1.0, 1.0),
            Candle::new(day2 + Duration::hours(23), 1.0, 1.0, 1.0, 1.0, 1.0),
            Candle::new(day2 + Duration::days(1), 1.0, 1.0, 1.0, 1.0, 1.0),
        ];
        let fine = CandleSeries::from_candles("T", None, candles).unwrap();

        let projector = LevelProjector::new(Frequency::Day).unwrap();
        let projected = projector.project(&periods, &fine).unwrap();

        assert_eq!(projected.levels[0], None);
        assert_eq!(projected.levels[1].unwrap().p, 100.0);
        assert_eq!(projected.levels[2].unwrap().p, 100.0);
        assert_eq!(projected.levels[3].unwrap().p, 200.0);

        let gap = projected.insufficient_history().unwrap();
        assert_eq!(gap.rows, 1);
        assert_eq!(gap.first_covered, Some(day2));
    }

    #[test]
    fn test_misaligned_period_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
        let fine = CandleSeries::new("T", None);
        let projector = LevelProjector::new(Frequency::Day).unwrap();
        assert!(projector.project(&[levels_at(start, 1.0)], &fine).is_err());
    }
}
