use chrono::TimeDelta;
use polars::prelude::DataFrame;
use std::collections::HashSet;
use tracing::{debug, info};

use super::report::DataQualityReport;
use crate::domain_types::{
    Candle, CandleSeries, ColumnName, DomainError, Frequency, MarketFrameExt, Resampler, Result,
};
use crate::utils::gap_between;

/// OHLCV 資料品質檢查器
#[derive(Debug, Clone)]
pub struct OhlcvInspector {
    /// 相鄰時間戳允許的最大間隔
    max_gap: TimeDelta,
}

impl Default for OhlcvInspector {
    fn default() -> Self {
        Self {
            max_gap: TimeDelta::hours(1),
        }
    }
}

type RowKey = (i64, [u64; 5]);

fn row_key(candle: &Candle) -> RowKey {
    (
        candle.timestamp.timestamp_millis(),
        [
            candle.open.to_bits(),
            candle.high.to_bits(),
            candle.low.to_bits(),
            candle.close.to_bits(),
            candle.volume.to_bits(),
        ],
    )
}

impl OhlcvInspector {
    /// 創建新的檢查器，預設最大間隔為 1 小時
    pub fn new() -> Self {
        Self::default()
    }

    /// 設置最大時間間隔
    pub fn with_max_gap(mut self, max_gap: TimeDelta) -> Self {
        self.max_gap = max_gap;
        self
    }

    pub fn max_gap(&self) -> TimeDelta {
        self.max_gap
    }

    /// 檢查原始K線，輸入可未排序、可含重複
    pub fn inspect(&self, candles: &[Candle]) -> DataQualityReport {
        let mut report = self.count_rows(candles);
        report.gaps_found = Some(self.count_gaps(candles));

        info!(report = %report.summary(), "原始資料品質檢查完成");
        report
    }

    /// 檢查重採樣後的序列，報告標記時間框架
    ///
    /// 較粗的週期本來就不連續，因此不檢查間隔。
    pub fn inspect_resampled(&self, series: &CandleSeries, frequency: Frequency) -> Result<DataQualityReport> {
        let resampled = Resampler::resample(series, frequency)?;
        let mut report = self.count_rows(&resampled.data);
        report.timeframe = Some(frequency.alias_suffix());

        info!(report = %report.summary(), "重採樣資料品質檢查完成");
        Ok(report)
    }

    /// 檢查 DataFrame；null 計入缺值
    ///
    /// 時間戳為 null 的列只計入缺值，不參與重複與間隔的計算。
    pub fn inspect_frame(&self, df: &DataFrame) -> Result<DataQualityReport> {
        df.require_ohlcv()?;

        let timestamps = df.optional_timestamps()?;
        let mut columns = Vec::with_capacity(5);
        for name in &ColumnName::OHLCV[1..] {
            columns.push(df.f64_values(name)?);
        }
        if columns.iter().any(|c| c.len() != timestamps.len()) {
            return Err(DomainError::Frame("欄位長度不一致".to_string()));
        }

        let mut candles = Vec::with_capacity(timestamps.len());
        let mut orphan_missing = [0usize; 5];
        for (i, ts) in timestamps.iter().enumerate() {
            let values = [columns[0][i], columns[1][i], columns[2][i], columns[3][i], columns[4][i]];
            match ts {
                Some(ts) => {
                    let [open, high, low, close, volume] = values;
                    candles.push(Candle::new(*ts, open, high, low, close, volume));
                }
                None => {
                    for (count, value) in orphan_missing.iter_mut().zip(values) {
                        if !value.is_finite() {
                            *count += 1;
                        }
                    }
                }
            }
        }

        let missing_timestamps = timestamps.len() - candles.len();
        let mut report = self.count_rows(&candles);
        report.row_count = timestamps.len();
        report.gaps_found = Some(self.count_gaps(&candles));
        report
            .missing_values
            .insert(ColumnName::TIMESTAMP.to_string(), missing_timestamps);
        for (name, count) in ColumnName::OHLCV[1..].iter().zip(orphan_missing) {
            *report.missing_values.entry(name.to_string()).or_insert(0) += count;
        }

        info!(report = %report.summary(), "DataFrame 資料品質檢查完成");
        Ok(report)
    }

    fn count_rows(&self, candles: &[Candle]) -> DataQualityReport {
        let mut report = DataQualityReport::new(candles.len());

        let mut missing = [0usize; 5];
        let mut seen_rows: HashSet<RowKey> = HashSet::with_capacity(candles.len());
        let mut seen_timestamps = HashSet::with_capacity(candles.len());

        for candle in candles {
            let values = [candle.open, candle.high, candle.low, candle.close, candle.volume];
            for (count, value) in missing.iter_mut().zip(values) {
                if !value.is_finite() {
                    *count += 1;
                }
            }

            if candle.is_finite() && !candle.is_consistent() {
                report.inconsistent_rows += 1;
            }
            if !seen_rows.insert(row_key(candle)) {
                report.duplicate_rows += 1;
            }
            if !seen_timestamps.insert(candle.timestamp) {
                report.duplicate_timestamps += 1;
            }
        }

        report
            .missing_values
            .insert(ColumnName::TIMESTAMP.to_string(), 0);
        for (name, count) in ColumnName::OHLCV[1..].iter().zip(missing) {
            report.missing_values.insert(name.to_string(), count);
        }

        report
    }

    fn count_gaps(&self, candles: &[Candle]) -> usize {
        let mut timestamps: Vec<_> = candles.iter().map(|c| c.timestamp).collect();
        timestamps.sort();

        let gaps = timestamps
            .windows(2)
            .filter(|pair| gap_between(&pair[0], &pair[1]) > self.max_gap)
            .count();

        debug!(gaps, max_gap_secs = self.max_gap.num_seconds(), "時間間隔檢查");
        gaps
    }
}
