//! 特徵管線
//!
//! 資料流：細粒度 OHLCV → 重採樣 → 樞軸點 → 價位投影 → 接近旗標
//! → 各時間框架特徵表 → 多時間框架合併。
//!
//! 每個步驟都是純轉換，不保留任何狀態；同樣的輸入永遠得到同樣的輸出。

use polars::prelude::DataFrame;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{validate_config, MergeConfig, PipelineConfig, PivotConfig};
use crate::domain_types::{
    flag_proximity, CandleSeries, ColumnName, FeatureTable, Frequency, IndicatorsExt,
    InsufficientHistory, LevelProjector, MarketFrameExt, MergedFeatureTable,
    MultiTimeframeMerger, PatternExt, PeriodLevels, PivotCalculator, ProjectedLevels, Resampler,
    Result,
};

/// 支撐/阻力路徑的輸出
#[derive(Debug, Clone)]
pub struct SupportResistanceOutput {
    /// 原始 OHLCV 加上 P..R3、at_support、at_resistance
    pub table: FeatureTable,
    /// 重採樣後的粗粒度序列
    pub coarse: CandleSeries,
    /// 每個週期的價位
    pub levels: Vec<PeriodLevels>,
    /// 投影回細粒度時間軸的價位
    pub projection: ProjectedLevels,
}

impl SupportResistanceOutput {
    pub fn insufficient_history(&self) -> Option<InsufficientHistory> {
        self.projection.insufficient_history()
    }
}

fn flag_value(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// 多時間框架特徵管線
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    /// 建立管線，配置無效時返回錯誤
    pub fn new(config: PipelineConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 計算支撐/阻力價位並投影回原始時間軸
    ///
    /// 歷史不足的列價位與旗標皆為缺值，不會被填成 0。
    pub fn support_resistance(
        series: &CandleSeries,
        config: &PivotConfig,
    ) -> Result<SupportResistanceOutput> {
        series.ensure_not_empty()?;
        series.ensure_canonical()?;
        series.ensure_valid_values()?;
        let tolerance = config.tolerance()?;

        let coarse = Resampler::resample(series, config.frequency)?;
        let levels = PivotCalculator::compute_all(&coarse)?;
        let projection = LevelProjector::new(config.frequency)?.project(&levels, series)?;

        let mut level_columns: [Vec<Option<f64>>; 7] = Default::default();
        let mut at_support = Vec::with_capacity(series.len());
        let mut at_resistance = Vec::with_capacity(series.len());

        for (candle, projected) in series.data.iter().zip(&projection.levels) {
            let values = projected.map(|l| l.values());
            for (k, column) in level_columns.iter_mut().enumerate() {
                column.push(values.map(|v| v[k]));
            }

            let flags = flag_proximity(candle.close, projected.as_ref(), tolerance);
            at_support.push(flags.map(|f| flag_value(f.at_support)));
            at_resistance.push(flags.map(|f| flag_value(f.at_resistance)));
        }

        let mut table = FeatureTable::from_series(series)?;
        for (name, values) in ColumnName::LEVELS.iter().zip(level_columns) {
            table.add_column(*name, values)?;
        }
        table.add_column(ColumnName::AT_SUPPORT, at_support)?;
        table.add_column(ColumnName::AT_RESISTANCE, at_resistance)?;

        debug!(
            symbol = %series.symbol,
            frequency = %config.frequency,
            periods = levels.len(),
            rows = table.len(),
            "支撐/阻力特徵完成"
        );

        Ok(SupportResistanceOutput {
            table,
            coarse,
            levels,
            projection,
        })
    }

    /// 基礎時間框架的特徵表：支撐/阻力再加上趨勢與型態
    pub fn base_features(&self, series: &CandleSeries) -> Result<FeatureTable> {
        let mut table = Self::support_resistance(series, &self.config.pivot)?.table;
        self.attach_signals(&mut table)?;
        Ok(table)
    }

    /// 將基礎序列重採樣到指定時間框架，並附加趨勢與型態欄位
    ///
    /// 序列本身已是該時間框架時不重採樣。
    pub fn timeframe_features(
        &self,
        series: &CandleSeries,
        frequency: Frequency,
    ) -> Result<FeatureTable> {
        series.ensure_not_empty()?;

        let resampled;
        let source = if series.frequency == Some(frequency) {
            series
        } else {
            resampled = Resampler::resample(series, frequency)?;
            &resampled
        };

        let mut table = FeatureTable::from_series(source)?;
        self.attach_signals(&mut table)?;

        debug!(timeframe = %frequency, rows = table.len(), "時間框架特徵完成");
        Ok(table)
    }

    /// 執行完整管線，輸出沒有缺值的合併特徵矩陣
    pub fn run(&self, base: &CandleSeries) -> Result<MergedFeatureTable> {
        base.ensure_not_empty()?;
        info!(
            symbol = %base.symbol,
            rows = base.len(),
            timeframes = ?self.config.higher_timeframes,
            parallel = self.config.parallel,
            "開始執行特徵管線"
        );

        let base_table = self.base_features(base)?;

        let higher: Vec<FeatureTable> = if self.config.parallel {
            self.config
                .higher_timeframes
                .par_iter()
                .map(|frequency| self.timeframe_features(base, *frequency))
                .collect::<Result<Vec<_>>>()?
        } else {
            self.config
                .higher_timeframes
                .iter()
                .map(|frequency| self.timeframe_features(base, *frequency))
                .collect::<Result<Vec<_>>>()?
        };

        MultiTimeframeMerger::new(self.config.merge.clone()).merge(&base_table, &higher)
    }

    /// 以 DataFrame 輸入執行完整管線
    pub fn run_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        let series = df.to_candle_series("frame", None)?;
        self.run(&series)?.table.to_dataframe()
    }

    fn attach_signals(&self, table: &mut FeatureTable) -> Result<()> {
        table.with_trend(ColumnName::CLOSE, self.config.trend_span)?;
        if self.config.detect_patterns {
            table.with_patterns()?;
        }
        Ok(())
    }
}

/// 以 DataFrame 輸入計算支撐/阻力欄位
pub fn support_resistance_frame(df: &DataFrame, config: &PivotConfig) -> Result<DataFrame> {
    let series = df.to_candle_series("frame", None)?;
    FeaturePipeline::support_resistance(&series, config)?
        .table
        .to_dataframe()
}

/// 合併已計算好的各時間框架 DataFrame
///
/// 每個較高時間框架的表以其頻率標記，欄位加上對應後綴。
pub fn merge_frames(
    base: &DataFrame,
    higher: &[(Frequency, DataFrame)],
    config: &MergeConfig,
) -> Result<DataFrame> {
    let base_table = FeatureTable::from_dataframe(base, None)?;
    let higher_tables = higher
        .iter()
        .map(|(frequency, df)| FeatureTable::from_dataframe(df, Some(*frequency)))
        .collect::<Result<Vec<_>>>()?;

    MultiTimeframeMerger::new(config.clone())
        .merge(&base_table, &higher_tables)?
        .table
        .to_dataframe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_types::{Candle, DomainError};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn hourly(days: i64) -> CandleSeries {
        // 2024-01-01 是週一
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = (0..days * 24)
            .map(|h| {
                let ts: DateTime<Utc> = start + Duration::hours(h);
                let base = 100.0 + (h as f64 * 0.3).sin() * 5.0;
                Candle::new(ts, base, base + 1.0, base - 1.0, base + 0.5, 10.0)
            })
            .collect();
        CandleSeries::from_candles("BTC", None, candles).unwrap()
    }

    #[test]
    fn test_support_resistance_columns() {
        let series = hourly(14);
        let output = FeaturePipeline::support_resistance(&series, &PivotConfig::default()).unwrap();

        assert_eq!(output.coarse.len(), 2);
        assert_eq!(output.levels.len(), 2);
        for name in ColumnName::LEVELS {
            assert!(output.table.column(name).is_some());
        }

        // 第一週沒有已完成的週期
        let gap = output.insufficient_history().unwrap();
        assert_eq!(gap.rows, 7 * 24);
        let p = output.table.column(ColumnName::P).unwrap();
        assert!(p[..7 * 24].iter().all(Option::is_none));
        assert_eq!(p[7 * 24], Some(output.levels[0].levels.p));

        let flags = output.table.column(ColumnName::AT_SUPPORT).unwrap();
        assert!(flags[..7 * 24].iter().all(Option::is_none));
        assert!(flags[7 * 24..].iter().all(|f| matches!(f, Some(v) if *v == 0.0 || *v == 1.0)));
    }

    #[test]
    fn test_empty_series_rejected() {
        let series = CandleSeries::new("BTC", None);
        let err = FeaturePipeline::support_resistance(&series, &PivotConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::EmptySeries(_)));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let config = PivotConfig::new(Frequency::Week, 0.0);
        let err = FeaturePipeline::support_resistance(&hourly(2), &config).unwrap_err();
        assert_eq!(err, DomainError::InvalidTolerance(0.0));
    }

    #[test]
    fn test_invalid_pipeline_config_rejected() {
        let config = PipelineConfig {
            trend_span: 0,
            ..PipelineConfig::default()
        };
        assert!(FeaturePipeline::new(config).is_err());
    }

    #[test]
    fn test_timeframe_features_identity() {
        let pipeline = FeaturePipeline::new(PipelineConfig::default()).unwrap();
        let daily = Resampler::resample(&hourly(3), Frequency::Day).unwrap();

        let table = pipeline.timeframe_features(&daily, Frequency::Day).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.timeframe(), Some(Frequency::Day));
        assert!(table.column(ColumnName::PATTERN_SIGNAL).is_some());
        assert!(table.column(ColumnName::TREND_SIGNAL).is_some());
    }

    #[test]
    fn test_run_produces_complete_table() {
        let config = PipelineConfig {
            merge: MergeConfig::closed_periods(),
            ..PipelineConfig::default()
        };
        let pipeline = FeaturePipeline::new(config).unwrap();
        let merged = pipeline.run(&hourly(21)).unwrap();

        assert!(merged.table.is_complete());
        assert_eq!(merged.report.timeframes, vec!["1d".to_string(), "1w".to_string()]);
        // 價位與週線都從第二週開始才有值
        assert_eq!(merged.report.output_rows, 14 * 24);
        assert!(merged.table.column("close_1w").is_some());
        assert!(merged.table.column("P_1d").is_none());
    }
}
