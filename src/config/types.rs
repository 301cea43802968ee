use serde::{Deserialize, Serialize};

use crate::config::validation::{ValidationError, ValidationUtils, Validator};
use crate::domain_types::{Frequency, Tolerance};

/// 樞軸點路徑配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    /// 計算樞軸點的週期
    pub frequency: Frequency,
    /// 接近支撐/阻力的容差（比例，例如 0.001 = 0.1%）
    pub tolerance: f64,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Week,
            tolerance: 0.001,
        }
    }
}

impl PivotConfig {
    pub fn new(frequency: Frequency, tolerance: f64) -> Self {
        Self {
            frequency,
            tolerance,
        }
    }

    /// 驗證後的容差
    pub fn tolerance(&self) -> crate::domain_types::Result<Tolerance> {
        Tolerance::new(self.tolerance)
    }
}

impl Validator for PivotConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.frequency
            .validate()
            .map_err(|e| ValidationError::InvalidValue(e.to_string()))?;
        ValidationUtils::positive(self.tolerance, "pivot.tolerance")?;

        Ok(())
    }
}

/// 多時間框架合併配置
///
/// 預設依標籤時間做 as-of 對齊；特徵管線預設改用只看已結束週期的模式。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// 較高時間框架的列只在其週期結束後才可見
    ///
    /// 關閉時以標籤時間做 as-of 對齊，適用於已是即時資料的輸入。
    pub closed_periods_only: bool,
}

impl MergeConfig {
    /// 只看已結束週期的合併配置
    pub fn closed_periods() -> Self {
        Self {
            closed_periods_only: true,
        }
    }
}

impl Validator for MergeConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// 完整特徵管線配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pivot: PivotConfig,
    /// 要合併的較高時間框架
    pub higher_timeframes: Vec<Frequency>,
    /// 趨勢 EMA 週期
    pub trend_span: usize,
    pub detect_patterns: bool,
    pub merge: MergeConfig,
    /// 以 rayon 並行計算各時間框架
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pivot: PivotConfig::default(),
            higher_timeframes: vec![Frequency::Day, Frequency::Week],
            trend_span: 20,
            detect_patterns: true,
            merge: MergeConfig::closed_periods(),
            parallel: true,
        }
    }
}

impl Validator for PipelineConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.pivot.validate()?;
        self.merge.validate()?;
        ValidationUtils::in_range(self.trend_span, 1, 10_000, "pipeline.trend_span")?;

        let mut seen = Vec::with_capacity(self.higher_timeframes.len());
        for frequency in &self.higher_timeframes {
            frequency
                .validate()
                .map_err(|e| ValidationError::InvalidValue(e.to_string()))?;
            let alias = frequency.alias_suffix();
            if seen.contains(&alias) {
                return Err(ValidationError::InvalidValue(format!(
                    "pipeline.higher_timeframes 中的 {} 重複",
                    alias
                )));
            }
            seen.push(alias);
        }

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證日誌級別
        ValidationUtils::not_empty(&self.level, "log.level")?;
        ValidationUtils::one_of(
            &self.level.to_lowercase(),
            &["trace", "debug", "info", "warn", "error"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
            "log.level",
        )?;

        // 驗證日誌格式
        ValidationUtils::one_of(
            &self.format.to_lowercase(),
            &["pretty", "compact"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
            "log.format",
        )?;

        Ok(())
    }
}
