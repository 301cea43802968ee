use serde::{Deserialize, Serialize};

use crate::domain_types::frequency::Frequency;

/// 聚合操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationOp {
    First,
    Last,
    Max,
    Min,
    Sum,
}

impl AggregationOp {
    /// 對一組值套用聚合，空輸入返回 None
    pub fn apply<I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;

        Some(match self {
            AggregationOp::First => first,
            AggregationOp::Last => iter.last().unwrap_or(first),
            AggregationOp::Max => iter.fold(first, f64::max),
            AggregationOp::Min => iter.fold(first, f64::min),
            AggregationOp::Sum => iter.fold(first, |acc, v| acc + v),
        })
    }
}

/// 資料聚合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub target_frequency: Frequency, // 目標頻率
    pub open_op: AggregationOp,      // 開盤價聚合操作
    pub high_op: AggregationOp,      // 最高價聚合操作
    pub low_op: AggregationOp,       // 最低價聚合操作
    pub close_op: AggregationOp,     // 收盤價聚合操作
    pub volume_op: AggregationOp,    // 成交量聚合操作
}

impl AggregationConfig {
    /// 創建一個新的聚合配置，使用標準的 OHLCV 聚合操作
    pub fn new(target_frequency: Frequency) -> Self {
        Self {
            target_frequency,
            open_op: AggregationOp::First, // 開盤價取第一個值
            high_op: AggregationOp::Max,   // 最高價取最大值
            low_op: AggregationOp::Min,    // 最低價取最小值
            close_op: AggregationOp::Last, // 收盤價取最後一個值
            volume_op: AggregationOp::Sum, // 成交量累加
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self::new(Frequency::Day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_ops() {
        let values = [3.0, 5.0, 1.0, 4.0];
        assert_eq!(AggregationOp::First.apply(values), Some(3.0));
        assert_eq!(AggregationOp::Last.apply(values), Some(4.0));
        assert_eq!(AggregationOp::Max.apply(values), Some(5.0));
        assert_eq!(AggregationOp::Min.apply(values), Some(1.0));
        assert_eq!(AggregationOp::Sum.apply(values), Some(13.0));
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(AggregationOp::Last.apply([7.0]), Some(7.0));
        assert_eq!(AggregationOp::Sum.apply(Vec::<f64>::new()), None);
    }
}
