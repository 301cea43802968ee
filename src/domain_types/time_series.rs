use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain_types::data_point::Candle;
use crate::domain_types::frequency::Frequency;
use crate::domain_types::types::{DomainError, Result};

/// 時間序列資料結構
///
/// `data` 依時間戳嚴格遞增排列；由 [`TimeSeries::from_points`] 或
/// [`TimeSeries::from_unsorted_points`] 建立的序列保證此順序。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeries<T> {
    pub symbol: String,
    pub frequency: Option<Frequency>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub data: Vec<T>,
}

/// OHLCV 序列
pub type CandleSeries = TimeSeries<Candle>;

/// 為時間序列數據點定義時間戳訪問特徵
pub trait HasTimestamp {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl HasTimestamp for Candle {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl<T> TimeSeries<T> {
    /// 創建空的時間序列
    pub fn new(symbol: impl Into<String>, frequency: Option<Frequency>) -> Self {
        Self {
            symbol: symbol.into(),
            frequency,
            start_time: None,
            end_time: None,
            data: Vec::new(),
        }
    }

    /// 獲取數據點數量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 檢查是否為空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 空序列視為輸入錯誤
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(DomainError::EmptySeries(self.symbol.clone()));
        }
        Ok(())
    }

    fn update_time_range(&mut self, timestamp: DateTime<Utc>) {
        if self.start_time.map_or(true, |start| timestamp < start) {
            self.start_time = Some(timestamp);
        }
        if self.end_time.map_or(true, |end| timestamp > end) {
            self.end_time = Some(timestamp);
        }
    }
}

impl<T> TimeSeries<T>
where
    T: HasTimestamp,
{
    /// 從已排序的數據點建立序列，時間戳必須嚴格遞增
    pub fn from_points(
        symbol: impl Into<String>,
        frequency: Option<Frequency>,
        points: Vec<T>,
    ) -> Result<Self> {
        let mut series = Self::new(symbol, frequency);
        series.data = points;
        series.ensure_canonical()?;
        series.recalculate_time_range();
        Ok(series)
    }

    /// 先依時間戳穩定排序，再建立序列；重複時間戳仍視為錯誤
    pub fn from_unsorted_points(
        symbol: impl Into<String>,
        frequency: Option<Frequency>,
        mut points: Vec<T>,
    ) -> Result<Self> {
        points.sort_by_key(|point| point.timestamp());
        Self::from_points(symbol, frequency, points)
    }

    /// 添加單個數據點
    pub fn add_point(&mut self, point: T) {
        self.update_time_range(point.timestamp());
        self.data.push(point);
    }

    /// 批量添加數據點
    pub fn add_points(&mut self, points: Vec<T>) {
        for point in points {
            self.add_point(point);
        }
    }

    /// 確認時間戳嚴格遞增（已排序且不重複）
    pub fn ensure_canonical(&self) -> Result<()> {
        for (index, pair) in self.data.windows(2).enumerate() {
            let (prev, next) = (pair[0].timestamp(), pair[1].timestamp());
            if next == prev {
                return Err(DomainError::DuplicateTimestamp {
                    index: index + 1,
                    timestamp: next,
                });
            }
            if next < prev {
                return Err(DomainError::UnsortedTimestamps {
                    index: index + 1,
                    timestamp: next,
                });
            }
        }
        Ok(())
    }

    /// 重新計算時間範圍
    pub fn recalculate_time_range(&mut self) {
        self.start_time = None;
        self.end_time = None;

        let timestamps: Vec<DateTime<Utc>> =
            self.data.iter().map(|point| point.timestamp()).collect();
        for timestamp in timestamps {
            self.update_time_range(timestamp);
        }
    }

    /// 獲取時間戳數組
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.data.iter().map(|point| point.timestamp()).collect()
    }
}

/// OHLCV 時間序列的專用實現
impl TimeSeries<Candle> {
    /// 建立 OHLCV 序列，並檢查價格與成交量
    ///
    /// 價格必須為有限數、成交量不可為負。high/low 一致性屬於資料品質報告
    /// 的範圍，這裡不拒絕。
    pub fn from_candles(
        symbol: impl Into<String>,
        frequency: Option<Frequency>,
        candles: Vec<Candle>,
    ) -> Result<Self> {
        let series = Self::from_unsorted_points(symbol, frequency, candles)?;
        series.ensure_valid_values()?;
        Ok(series)
    }

    /// 檢查每根K線的數值
    pub fn ensure_valid_values(&self) -> Result<()> {
        for (index, candle) in self.data.iter().enumerate() {
            if !candle.is_finite() {
                return Err(DomainError::InvalidCandle {
                    index,
                    reason: "價格或成交量不是有限數".to_string(),
                });
            }
            if candle.volume < 0.0 {
                return Err(DomainError::InvalidCandle {
                    index,
                    reason: format!("成交量為負: {}", candle.volume),
                });
            }
        }
        Ok(())
    }

    /// 獲取收盤價數組
    pub fn close_prices(&self) -> Vec<f64> {
        self.data.iter().map(|point| point.close).collect()
    }

    /// 獲取開盤價數組
    pub fn open_prices(&self) -> Vec<f64> {
        self.data.iter().map(|point| point.open).collect()
    }

    /// 獲取最高價數組
    pub fn high_prices(&self) -> Vec<f64> {
        self.data.iter().map(|point| point.high).collect()
    }

    /// 獲取最低價數組
    pub fn low_prices(&self) -> Vec<f64> {
        self.data.iter().map(|point| point.low).collect()
    }

    /// 獲取成交量數組
    pub fn volumes(&self) -> Vec<f64> {
        self.data.iter().map(|point| point.volume).collect()
    }
}
