//! 基本領域類型：錯誤與標準列名

use chrono::{DateTime, Utc};
use polars::prelude::PolarsError;
use thiserror::Error;

/// 錯誤分類
///
/// `Input` 表示輸入資料結構有問題，`Config` 表示呼叫參數無效。
/// 兩者都會中止整個呼叫。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Config,
}

/// 領域錯誤類型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("無效的時間戳: {0}")]
    InvalidTimestamp(String),

    #[error("時間戳未排序: 第 {index} 筆 ({timestamp}) 早於前一筆")]
    UnsortedTimestamps {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("重複的時間戳: 第 {index} 筆 ({timestamp})")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("序列為空: {0}")]
    EmptySeries(String),

    #[error("無效的K線資料: 第 {index} 筆, {reason}")]
    InvalidCandle { index: usize, reason: String },

    #[error("數據框架錯誤: {0}")]
    Frame(String),

    #[error("無效的頻率: {0}")]
    InvalidFrequency(String),

    #[error("無效的容差: {0}，必須為正的有限數")]
    InvalidTolerance(f64),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),
}

impl DomainError {
    /// 錯誤所屬的分類
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidFrequency(_)
            | DomainError::InvalidTolerance(_)
            | DomainError::InvalidConfig(_) => ErrorKind::Config,
            _ => ErrorKind::Input,
        }
    }
}

impl From<PolarsError> for DomainError {
    fn from(err: PolarsError) -> Self {
        match err {
            PolarsError::ColumnNotFound(name) => DomainError::MissingColumn(name.to_string()),
            other => DomainError::Frame(other.to_string()),
        }
    }
}

/// 領域結果類型
pub type Result<T> = std::result::Result<T, DomainError>;

/// 標準列名定義
pub struct ColumnName;

impl ColumnName {
    pub const TIMESTAMP: &'static str = "timestamp"; // 毫秒 i64 或 Datetime
    pub const OPEN: &'static str = "open";
    pub const HIGH: &'static str = "high";
    pub const LOW: &'static str = "low";
    pub const CLOSE: &'static str = "close";
    pub const VOLUME: &'static str = "volume";

    // 樞軸點
    pub const P: &'static str = "P";
    pub const S1: &'static str = "S1";
    pub const S2: &'static str = "S2";
    pub const S3: &'static str = "S3";
    pub const R1: &'static str = "R1";
    pub const R2: &'static str = "R2";
    pub const R3: &'static str = "R3";

    pub const AT_SUPPORT: &'static str = "at_support";
    pub const AT_RESISTANCE: &'static str = "at_resistance";

    // 趨勢與型態訊號
    pub const EMA: &'static str = "ema";
    pub const TREND_SIGNAL: &'static str = "trend_signal";
    pub const PATTERN_SIGNAL: &'static str = "pattern_signal";
    pub const BODY: &'static str = "body";
    pub const UPPER_SHADOW: &'static str = "upper_shadow";
    pub const LOWER_SHADOW: &'static str = "lower_shadow";

    /// OHLCV 必要欄位
    pub const OHLCV: [&'static str; 6] = [
        Self::TIMESTAMP,
        Self::OPEN,
        Self::HIGH,
        Self::LOW,
        Self::CLOSE,
        Self::VOLUME,
    ];

    /// 樞軸點欄位，依 P, S1..S3, R1..R3 順序
    pub const LEVELS: [&'static str; 7] = [
        Self::P,
        Self::S1,
        Self::S2,
        Self::S3,
        Self::R1,
        Self::R2,
        Self::R3,
    ];
}
