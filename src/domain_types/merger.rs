//! 多時間框架特徵合併
//!
//! 以最細的基礎表為時間軸，把每個較高時間框架的表以 as-of 方式
//! （取時間戳 <= 基礎時間戳的最後一列）接到基礎表上，欄位名加上
//! 時間框架後綴。接完之後再整表向前填補一次，仍有缺值的列直接移除，
//! 輸出保證沒有缺值。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::feature_table::FeatureTable;
use super::types::{DomainError, Result};
use crate::config::MergeConfig;

/// 合併報告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub base_rows: usize,
    pub output_rows: usize,
    /// 因缺少歷史而移除的列數
    pub dropped_rows: usize,
    pub timeframes: Vec<String>,
}

/// 合併後的特徵矩陣，保證沒有缺值
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFeatureTable {
    pub table: FeatureTable,
    pub report: MergeReport,
}

/// 多時間框架合併器
#[derive(Debug, Clone, Default)]
pub struct MultiTimeframeMerger {
    config: MergeConfig,
}

impl MultiTimeframeMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// 合併基礎表與較高時間框架的表
    pub fn merge(&self, base: &FeatureTable, higher: &[FeatureTable]) -> Result<MergedFeatureTable> {
        if base.is_empty() {
            return Err(DomainError::EmptySeries("基礎時間框架".to_string()));
        }

        let mut merged = base.clone();
        let mut suffixes = HashSet::new();
        let mut timeframes = Vec::with_capacity(higher.len());

        for table in higher {
            let frequency = table.timeframe().ok_or_else(|| {
                DomainError::InvalidConfig("較高時間框架的表必須標記頻率".to_string())
            })?;
            let suffix = frequency.alias_suffix();
            if !suffixes.insert(suffix.clone()) {
                return Err(DomainError::InvalidConfig(format!(
                    "時間框架 {} 重複出現",
                    suffix
                )));
            }

            let visible_from = if self.config.closed_periods_only {
                table
                    .timestamps()
                    .iter()
                    .map(|ts| frequency.next_period_start(*ts))
                    .collect::<Result<Vec<_>>>()?
            } else {
                table.timestamps().to_vec()
            };
            let mapping = asof_indices(base.timestamps(), &visible_from);

            for column in table.columns() {
                let values = mapping
                    .iter()
                    .map(|index| index.and_then(|i| column.values[i]))
                    .collect();
                merged.insert_new_column(format!("{}_{}", column.name, suffix), values)?;
            }

            debug!(
                timeframe = %suffix,
                rows = table.len(),
                columns = table.columns().len(),
                "已對齊較高時間框架"
            );
            timeframes.push(suffix);
        }

        merged.forward_fill();
        let dropped_rows = merged.drop_incomplete_rows();

        if dropped_rows > 0 {
            warn!(
                dropped_rows,
                remaining = merged.len(),
                "歷史不足，已移除缺值的列"
            );
        }
        info!(
            base_rows = base.len(),
            output_rows = merged.len(),
            timeframes = ?timeframes,
            "多時間框架合併完成"
        );

        Ok(MergedFeatureTable {
            report: MergeReport {
                base_rows: base.len(),
                output_rows: merged.len(),
                dropped_rows,
                timeframes,
            },
            table: merged,
        })
    }
}

/// 對每個基礎時間戳，找出最後一個 `visible_from <= ts` 的來源列
///
/// 兩邊都必須已排序；單次合併掃描。
pub fn asof_indices(
    base_timestamps: &[DateTime<Utc>],
    visible_from: &[DateTime<Utc>],
) -> Vec<Option<usize>> {
    let mut mapping = Vec::with_capacity(base_timestamps.len());
    let mut cursor = 0usize;
    let mut last_valid: Option<usize> = None;

    for ts in base_timestamps {
        while cursor < visible_from.len() && visible_from[cursor] <= *ts {
            last_valid = Some(cursor);
            cursor += 1;
        }
        mapping.push(last_valid);
    }

    mapping
}
