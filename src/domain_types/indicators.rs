//! 趨勢指標
//!
//! 以 EMA 斜率判斷趨勢：EMA 上升為 1，下降為 -1，持平或第一列為 0。

use polars::prelude::*;

use super::feature_table::FeatureTable;
use super::types::{ColumnName, DomainError, Result};

/// 指數移動平均，alpha = 2 / (span + 1)，不做偏差調整
pub fn ema(values: &[Option<f64>], span: usize) -> Result<Vec<Option<f64>>> {
    if span == 0 {
        return Err(DomainError::InvalidConfig("EMA 週期必須大於 0".to_string()));
    }

    let series = Series::new(ColumnName::EMA.into(), values);
    let options = EWMOptions::default()
        .and_span(span)
        .and_adjust(false)
        .and_min_periods(1);

    let out = DataFrame::new(vec![series.into_column()])?
        .lazy()
        .select([col(ColumnName::EMA).ewm_mean(options)])
        .collect()?;

    Ok(out.column(ColumnName::EMA)?.f64()?.into_iter().collect())
}

/// 由 EMA 序列計算趨勢訊號
pub fn trend_signal(ema_values: &[Option<f64>]) -> Vec<i8> {
    let mut signals = Vec::with_capacity(ema_values.len());
    let mut prev: Option<f64> = None;

    for value in ema_values {
        let signal = match (prev, *value) {
            (Some(p), Some(v)) if v > p => 1,
            (Some(p), Some(v)) if v < p => -1,
            _ => 0,
        };
        signals.push(signal);
        prev = *value;
    }

    signals
}

/// 為特徵表添加技術指標功能的擴展 trait
pub trait IndicatorsExt {
    /// 在指定欄位上計算 EMA 與趨勢訊號，附加 `ema`、`trend_signal`
    fn with_trend(&mut self, column: &str, span: usize) -> Result<()>;
}

impl IndicatorsExt for FeatureTable {
    fn with_trend(&mut self, column: &str, span: usize) -> Result<()> {
        let ema_values = ema(self.require_column(column)?, span)?;
        let signals = trend_signal(&ema_values)
            .into_iter()
            .map(|s| Some(f64::from(s)))
            .collect();

        self.add_column(ColumnName::EMA, ema_values)?;
        self.add_column(ColumnName::TREND_SIGNAL, signals)?;
        Ok(())
    }
}
