//! 日曆週期重採樣
//!
//! 先以 [`Frequency::period_start`] 為每根K線計算週期起點，再把連續相同
//! 起點的K線切成一段並聚合。沒有K線的週期不會產生輸出。

use chrono::{DateTime, Utc};
use tracing::debug;

use super::aggregation::AggregationConfig;
use super::data_point::Candle;
use super::frequency::Frequency;
use super::time_series::CandleSeries;
use super::types::Result;

/// 一個非空週期內的K線切片
#[derive(Debug, Clone, Copy)]
pub struct PeriodSlice<'a> {
    pub start: DateTime<Utc>,
    pub candles: &'a [Candle],
}

/// 提供重採樣核心功能的結構
pub struct Resampler;

impl Resampler {
    /// 以標準 OHLCV 聚合重採樣
    pub fn resample(series: &CandleSeries, target_frequency: Frequency) -> Result<CandleSeries> {
        Self::resample_with(series, &AggregationConfig::new(target_frequency))
    }

    /// 以自訂聚合配置重採樣
    ///
    /// 輸出K線的時間戳為週期起點，序列頻率設為目標頻率。
    pub fn resample_with(series: &CandleSeries, config: &AggregationConfig) -> Result<CandleSeries> {
        let slices = Self::partition(series, config.target_frequency)?;

        let mut candles = Vec::with_capacity(slices.len());
        for slice in &slices {
            if let Some(candle) = Self::aggregate(slice, config) {
                candles.push(candle);
            }
        }

        debug!(
            symbol = %series.symbol,
            frequency = %config.target_frequency,
            input_rows = series.len(),
            output_rows = candles.len(),
            "重採樣完成"
        );

        CandleSeries::from_points(series.symbol.clone(), Some(config.target_frequency), candles)
    }

    /// 依週期邊界切分序列，只返回非空週期
    pub fn partition(series: &CandleSeries, frequency: Frequency) -> Result<Vec<PeriodSlice<'_>>> {
        series.ensure_canonical()?;

        let mut slices = Vec::new();
        let mut run_start = 0usize;
        let mut current: Option<DateTime<Utc>> = None;

        for (index, candle) in series.data.iter().enumerate() {
            let start = frequency.period_start(candle.timestamp)?;
            match current {
                Some(active) if active == start => {}
                Some(active) => {
                    slices.push(PeriodSlice {
                        start: active,
                        candles: &series.data[run_start..index],
                    });
                    run_start = index;
                    current = Some(start);
                }
                None => current = Some(start),
            }
        }

        if let Some(active) = current {
            slices.push(PeriodSlice {
                start: active,
                candles: &series.data[run_start..],
            });
        }

        Ok(slices)
    }

    fn aggregate(slice: &PeriodSlice<'_>, config: &AggregationConfig) -> Option<Candle> {
        let candles = slice.candles;
        Some(Candle {
            timestamp: slice.start,
            open: config.open_op.apply(candles.iter().map(|c| c.open))?,
            high: config.high_op.apply(candles.iter().map(|c| c.high))?,
            low: config.low_op.apply(candles.iter().map(|c| c.low))?,
            close: config.close_op.apply(candles.iter().map(|c| c.close))?,
            volume: config.volume_op.apply(candles.iter().map(|c| c.volume))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hourly_series(start: DateTime<Utc>, hours: i64) -> CandleSeries {
        let candles = (0..hours)
            .map(|i| {
                let base = 100.0 + i as f64;
                Candle::new(start + Duration::hours(i), base, base + 2.0, base - 2.0, base + 1.0, 10.0)
            })
            .collect();
        CandleSeries::from_candles("TEST", Some(Frequency::Hours(1)), candles).unwrap()
    }

    #[test]
    fn test_resample_hourly_to_daily() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = hourly_series(start, 48);

        let daily = Resampler::resample(&series, Frequency::Day).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily.frequency, Some(Frequency::Day));

        let first = &daily.data[0];
        assert_eq!(first.timestamp, start);
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 125.0);
        assert_eq!(first.low, 98.0);
        assert_eq!(first.close, 124.0);
        assert_eq!(first.volume, 240.0);
    }

    #[test]
    fn test_empty_periods_are_dropped() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut candles = hourly_series(start, 2).data;
        // 跳過整整兩天
        candles.push(Candle::new(start + Duration::days(3), 1.0, 2.0, 0.5, 1.5, 1.0));
        let series = CandleSeries::from_candles("GAP", None, candles).unwrap();

        let daily = Resampler::resample(&series, Frequency::Day).unwrap();
        assert_eq!(daily.timestamps(), vec![start, start + Duration::days(3)]);
    }

    #[test]
    fn test_partition_of_empty_series() {
        let series = CandleSeries::new("EMPTY", None);
        assert!(Resampler::partition(&series, Frequency::Week).unwrap().is_empty());
    }
}
