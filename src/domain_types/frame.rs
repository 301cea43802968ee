//! Polars DataFrame 與領域類型之間的轉換

use chrono::{DateTime, Utc};
use polars::prelude::*;

use super::data_point::Candle;
use super::feature_table::FeatureTable;
use super::frequency::Frequency;
use super::resampler::Resampler;
use super::time_series::CandleSeries;
use super::types::{ColumnName, DomainError, Result};
use crate::utils::{datetimes_to_timestamps, micros_to_millis, nanos_to_millis, timestamp_ms_to_datetime};

/// 市場數據框架擴展 trait
pub trait MarketFrameExt {
    /// 檢查是否包含全部 OHLCV 欄位
    fn is_ohlcv(&self) -> bool;

    /// 缺少任何 OHLCV 欄位時返回錯誤
    fn require_ohlcv(&self) -> Result<()>;

    /// 讀取時間戳欄位（i64 毫秒或 Datetime）
    fn timestamp_values(&self) -> Result<Vec<DateTime<Utc>>>;

    /// 讀取時間戳欄位，null 或超出範圍的值為 None
    fn optional_timestamps(&self) -> Result<Vec<Option<DateTime<Utc>>>>;

    /// 讀取數值欄位為 f64，null 轉為 NaN
    fn f64_values(&self, name: &str) -> Result<Vec<f64>>;

    /// 轉換為 OHLCV 序列（會依時間戳排序）
    fn to_candle_series(&self, symbol: &str, frequency: Option<Frequency>) -> Result<CandleSeries>;

    /// 基本重採樣功能
    fn resample(&self, frequency: Frequency) -> Result<DataFrame>;
}

/// 時間戳欄位統一轉為毫秒，保留 null
fn timestamp_millis(df: &DataFrame) -> Result<Vec<Option<i64>>> {
    let column = df.column(ColumnName::TIMESTAMP)?;

    let (raw, to_millis): (Column, fn(i64) -> i64) = match column.dtype() {
        DataType::Datetime(TimeUnit::Milliseconds, _) => (column.cast(&DataType::Int64)?, |v| v),
        DataType::Datetime(TimeUnit::Microseconds, _) => {
            (column.cast(&DataType::Int64)?, micros_to_millis)
        }
        DataType::Datetime(TimeUnit::Nanoseconds, _) => {
            (column.cast(&DataType::Int64)?, nanos_to_millis)
        }
        dtype if dtype.is_integer() => (column.cast(&DataType::Int64)?, |v| v),
        other => {
            return Err(DomainError::InvalidTimestamp(format!(
                "時間戳欄位型別 {} 無法解析",
                other
            )))
        }
    };

    Ok(raw.i64()?.into_iter().map(|v| v.map(to_millis)).collect())
}

impl MarketFrameExt for DataFrame {
    fn is_ohlcv(&self) -> bool {
        ColumnName::OHLCV
            .iter()
            .all(|name| self.column(name).is_ok())
    }

    fn require_ohlcv(&self) -> Result<()> {
        match ColumnName::OHLCV.iter().find(|name| self.column(name).is_err()) {
            Some(missing) => Err(DomainError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    fn timestamp_values(&self) -> Result<Vec<DateTime<Utc>>> {
        timestamp_millis(self)?
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let millis = value.ok_or_else(|| {
                    DomainError::InvalidTimestamp(format!("第 {} 筆時間戳為空", index))
                })?;
                timestamp_ms_to_datetime(millis).ok_or_else(|| {
                    DomainError::InvalidTimestamp(format!("第 {} 筆時間戳超出範圍", index))
                })
            })
            .collect()
    }

    fn optional_timestamps(&self) -> Result<Vec<Option<DateTime<Utc>>>> {
        Ok(timestamp_millis(self)?
            .into_iter()
            .map(|value| value.and_then(timestamp_ms_to_datetime))
            .collect())
    }

    fn f64_values(&self, name: &str) -> Result<Vec<f64>> {
        // 無法轉換的值會成為 null，之後由序列檢查拒絕
        let casted = self.column(name)?.cast(&DataType::Float64)?;
        Ok(casted
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    fn to_candle_series(&self, symbol: &str, frequency: Option<Frequency>) -> Result<CandleSeries> {
        self.require_ohlcv()?;

        let timestamps = self.timestamp_values()?;
        let open = self.f64_values(ColumnName::OPEN)?;
        let high = self.f64_values(ColumnName::HIGH)?;
        let low = self.f64_values(ColumnName::LOW)?;
        let close = self.f64_values(ColumnName::CLOSE)?;
        let volume = self.f64_values(ColumnName::VOLUME)?;

        let candles = timestamps
            .into_iter()
            .enumerate()
            .map(|(i, ts)| Candle::new(ts, open[i], high[i], low[i], close[i], volume[i]))
            .collect();

        CandleSeries::from_candles(symbol, frequency, candles)
    }

    fn resample(&self, frequency: Frequency) -> Result<DataFrame> {
        let series = self.to_candle_series("frame", None)?;
        candles_to_dataframe(&Resampler::resample(&series, frequency)?)
    }
}

fn timestamp_column(timestamps: &[DateTime<Utc>]) -> Result<Column> {
    let series = Series::new(ColumnName::TIMESTAMP.into(), datetimes_to_timestamps(timestamps))
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into())
}

/// OHLCV 序列轉換為 DataFrame
pub fn candles_to_dataframe(series: &CandleSeries) -> Result<DataFrame> {
    let columns: Vec<Column> = vec![
        timestamp_column(&series.timestamps())?,
        Series::new(ColumnName::OPEN.into(), series.open_prices()).into(),
        Series::new(ColumnName::HIGH.into(), series.high_prices()).into(),
        Series::new(ColumnName::LOW.into(), series.low_prices()).into(),
        Series::new(ColumnName::CLOSE.into(), series.close_prices()).into(),
        Series::new(ColumnName::VOLUME.into(), series.volumes()).into(),
    ];
    Ok(DataFrame::new(columns)?)
}

impl FeatureTable {
    /// 由 DataFrame 建立特徵表
    ///
    /// `timestamp` 以外的欄位都轉為可空 f64；null 與 NaN 皆視為缺值。
    pub fn from_dataframe(df: &DataFrame, timeframe: Option<Frequency>) -> Result<Self> {
        let mut table = FeatureTable::new(df.timestamp_values()?, timeframe)?;

        for column in df.get_columns() {
            if column.name().as_str() == ColumnName::TIMESTAMP {
                continue;
            }
            let casted = column.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = casted
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            table.add_column(column.name().as_str(), values)?;
        }

        Ok(table)
    }

    /// 轉換為 DataFrame，缺值成為 null
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns().len() + 1);
        columns.push(timestamp_column(self.timestamps())?);
        for column in self.columns() {
            let values: Vec<Option<f64>> = column.values.clone();
            columns.push(Series::new(column.name.as_str().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_frame() -> DataFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let millis: Vec<i64> = (0..48)
            .map(|h| (start + Duration::hours(h)).timestamp_millis())
            .collect();
        let close: Vec<f64> = (0..48).map(|h| 100.0 + h as f64).collect();

        df!(
            "timestamp" => millis,
            "open" => close.clone(),
            "high" => close.iter().map(|c| c + 1.0).collect::<Vec<_>>(),
            "low" => close.iter().map(|c| c - 1.0).collect::<Vec<_>>(),
            "close" => close,
            "volume" => vec![1.0; 48],
        )
        .unwrap()
    }

    #[test]
    fn test_frame_to_candle_series() {
        let df = sample_frame();
        assert!(df.is_ohlcv());

        let series = df.to_candle_series("BTC", None).unwrap();
        assert_eq!(series.len(), 48);
        assert_eq!(series.data[1].open, 101.0);
        assert_eq!(
            series.data[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_column_is_input_error() {
        let df = sample_frame().drop("volume").unwrap();
        assert!(!df.is_ohlcv());
        assert_eq!(
            df.to_candle_series("BTC", None).unwrap_err(),
            DomainError::MissingColumn("volume".to_string())
        );
    }

    #[test]
    fn test_frame_resample_daily() {
        let daily = sample_frame().resample(Frequency::Day).unwrap();
        assert_eq!(daily.height(), 2);
        assert_eq!(daily.f64_values("volume").unwrap(), vec![24.0, 24.0]);
        assert_eq!(daily.f64_values("high").unwrap(), vec![124.0, 148.0]);
    }

    #[test]
    fn test_datetime_column_round_trips_through_series() {
        let series = sample_frame().to_candle_series("BTC", None).unwrap();
        let df = candles_to_dataframe(&series).unwrap();
        let again = df.to_candle_series("BTC", None).unwrap();
        assert_eq!(series.data, again.data);
    }
}
