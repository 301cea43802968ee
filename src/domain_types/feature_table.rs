//! 以時間戳為索引的特徵表
//!
//! 每個欄位是可為空的 f64 向量，缺值以 `None` 表示（歷史不足等），
//! 不會被靜默填成 0 或 NaN。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use super::time_series::CandleSeries;
use super::types::{ColumnName, DomainError, Result};

/// 單一特徵欄位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// 特徵表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    timeframe: Option<Frequency>,
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<FeatureColumn>,
}

/// 特徵表中的一列
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    table: &'a FeatureTable,
    index: usize,
}

impl<'a> FeatureRow<'a> {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.table.timestamps[self.index]
    }

    /// 取欄位值；欄位不存在或值缺失都返回 None
    pub fn get(&self, name: &str) -> Option<f64> {
        self.table.column(name).and_then(|values| values[self.index])
    }

    /// 依欄位順序的所有值
    pub fn values(&self) -> Vec<Option<f64>> {
        self.table
            .columns
            .iter()
            .map(|column| column.values[self.index])
            .collect()
    }
}

impl FeatureTable {
    /// 建立只有時間索引的空表，時間戳必須嚴格遞增
    pub fn new(timestamps: Vec<DateTime<Utc>>, timeframe: Option<Frequency>) -> Result<Self> {
        for (index, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(DomainError::UnsortedTimestamps {
                    index: index + 1,
                    timestamp: pair[1],
                });
            }
        }

        Ok(Self {
            timeframe,
            timestamps,
            columns: Vec::new(),
        })
    }

    /// 以 OHLCV 欄位初始化
    pub fn from_series(series: &CandleSeries) -> Result<Self> {
        let mut table = Self::new(series.timestamps(), series.frequency)?;
        table.add_dense_column(ColumnName::OPEN, series.open_prices())?;
        table.add_dense_column(ColumnName::HIGH, series.high_prices())?;
        table.add_dense_column(ColumnName::LOW, series.low_prices())?;
        table.add_dense_column(ColumnName::CLOSE, series.close_prices())?;
        table.add_dense_column(ColumnName::VOLUME, series.volumes())?;
        Ok(table)
    }

    pub fn timeframe(&self) -> Option<Frequency> {
        self.timeframe
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// 取欄位，不存在時返回缺欄錯誤
    pub fn require_column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.column(name)
            .ok_or_else(|| DomainError::MissingColumn(name.to_string()))
    }

    /// 新增或取代欄位；長度必須與時間索引一致
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.timestamps.len() {
            return Err(DomainError::InvalidConfig(format!(
                "欄位 {} 長度 {} 與索引長度 {} 不符",
                name,
                values.len(),
                self.timestamps.len()
            )));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(FeatureColumn { name, values }),
        }
        Ok(())
    }

    /// 新增欄位；同名欄位已存在時回傳錯誤而不取代
    pub fn insert_new_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<()> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(DomainError::InvalidConfig(format!("欄位 {} 已存在", name)));
        }
        self.add_column(name, values)
    }

    /// 新增沒有缺值的欄位
    pub fn add_dense_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        self.add_column(name, values.into_iter().map(Some).collect())
    }

    pub fn row(&self, index: usize) -> Option<FeatureRow<'_>> {
        (index < self.len()).then_some(FeatureRow { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = FeatureRow<'_>> {
        (0..self.len()).map(move |index| FeatureRow { table: self, index })
    }

    /// 該列所有欄位都有值
    pub fn is_row_complete(&self, index: usize) -> bool {
        self.columns.iter().all(|c| c.values[index].is_some())
    }

    /// 整張表沒有任何缺值
    pub fn is_complete(&self) -> bool {
        (0..self.len()).all(|index| self.is_row_complete(index))
    }

    /// 每個欄位以最後一個已知值向前填補，開頭的缺值保持缺失
    pub fn forward_fill(&mut self) {
        for column in &mut self.columns {
            let mut last = None;
            for value in column.values.iter_mut() {
                match value {
                    Some(v) => last = Some(*v),
                    None => *value = last,
                }
            }
        }
    }

    /// 移除仍有缺值的列，返回移除的列數
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.len()).map(|i| self.is_row_complete(i)).collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return 0;
        }

        self.timestamps = retain_by_mask(std::mem::take(&mut self.timestamps), &keep);
        for column in &mut self.columns {
            column.values = retain_by_mask(std::mem::take(&mut column.values), &keep);
        }
        dropped
    }
}

fn retain_by_mask<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(value, keep)| keep.then_some(value))
        .collect()
}
