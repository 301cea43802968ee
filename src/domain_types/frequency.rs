//! 頻率與日曆週期定義
//!
//! 所有週期邊界都集中在 [`Frequency::period_start`] 計算，採用 UTC：
//!
//! - `Hours(n)`：自 Unix epoch 起每 n 小時一個週期
//! - `Day`：每日 00:00
//! - `Week`：ISO 週，週一 00:00 開始
//! - `Month`：每月 1 日 00:00
//!
//! 週期為左閉右開區間 `[start, end)`。

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::{DomainError, Result};

/// 重採樣頻率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    /// n 小時（n > 0）
    Hours(u32),
    Day,
    Week,
    Month,
}

/// 左閉右開的日曆週期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

impl Frequency {
    /// 檢查頻率參數是否有效
    pub fn validate(&self) -> Result<()> {
        match self {
            Frequency::Hours(0) => Err(DomainError::InvalidFrequency(
                "小時倍數必須大於 0".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// 將時間戳向下取整到所屬週期的起點
    pub fn period_start(&self, timestamp: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.validate()?;

        let start = match self {
            Frequency::Hours(hours) => {
                let step = i64::from(*hours) * 3600;
                let secs = timestamp.timestamp().div_euclid(step) * step;
                DateTime::from_timestamp(secs, 0)
            }
            Frequency::Day => Some(midnight(timestamp.date_naive())),
            Frequency::Week => {
                let date = timestamp.date_naive();
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).map(midnight)
            }
            Frequency::Month => {
                let date = timestamp.date_naive();
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).map(midnight)
            }
        };

        start.ok_or_else(|| out_of_range(timestamp))
    }

    /// 時間戳所屬週期的下一個週期起點
    pub fn next_period_start(&self, timestamp: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let start = self.period_start(timestamp)?;

        let next = match self {
            Frequency::Hours(hours) => {
                start.checked_add_signed(TimeDelta::hours(i64::from(*hours)))
            }
            Frequency::Day => start.checked_add_days(Days::new(1)),
            Frequency::Week => start.checked_add_days(Days::new(7)),
            Frequency::Month => start.checked_add_months(Months::new(1)),
        };

        next.ok_or_else(|| out_of_range(timestamp))
    }

    /// 時間戳所屬的完整週期
    pub fn period_of(&self, timestamp: DateTime<Utc>) -> Result<Period> {
        Ok(Period {
            start: self.period_start(timestamp)?,
            end: self.next_period_start(timestamp)?,
        })
    }

    /// 時間戳是否恰好落在週期邊界上
    pub fn is_period_start(&self, timestamp: DateTime<Utc>) -> Result<bool> {
        Ok(self.period_start(timestamp)? == timestamp)
    }

    /// 欄位後綴，用於區分不同時間框架的同名欄位
    pub fn alias_suffix(&self) -> String {
        match self {
            Frequency::Hours(hours) => format!("{}h", hours),
            Frequency::Day => "1d".to_string(),
            Frequency::Week => "1w".to_string(),
            Frequency::Month => "1mo".to_string(),
        }
    }

    /// 顯示名稱
    pub fn display_name(&self) -> String {
        match self {
            Frequency::Hours(1) => "Hour".to_string(),
            Frequency::Hours(hours) => format!("{}Hours", hours),
            Frequency::Day => "Day".to_string(),
            Frequency::Week => "Week".to_string(),
            Frequency::Month => "Month".to_string(),
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn out_of_range(timestamp: DateTime<Utc>) -> DomainError {
    DomainError::InvalidTimestamp(format!("{} 超出可表示的日曆範圍", timestamp))
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alias_suffix())
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();

        let frequency = match normalized.as_str() {
            "h" | "hour" | "hourly" => Frequency::Hours(1),
            "d" | "1d" | "day" | "daily" => Frequency::Day,
            "w" | "1w" | "week" | "weekly" => Frequency::Week,
            "m" | "mo" | "1mo" | "month" | "monthly" => Frequency::Month,
            other => {
                let hours = other
                    .strip_suffix('h')
                    .and_then(|n| n.parse::<u32>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| DomainError::InvalidFrequency(s.to_string()))?;
                Frequency::Hours(hours)
            }
        };

        Ok(frequency)
    }
}

impl TryFrom<String> for Frequency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.alias_suffix()
    }
}
