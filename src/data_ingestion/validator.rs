//! 資料品質檢查模組
//!
//! 產生原始或重採樣後 OHLCV 資料的品質報告：缺值、重複列、重複時間戳、
//! 價格不一致與時間空缺。報告只供參考，特徵計算仍要求輸入已是標準形式。
//!
//! # 使用範例
//!
//! ```rust,ignore
//! use mtf_features::data_ingestion::validator::OhlcvInspector;
//!
//! let report = OhlcvInspector::new()
//!     .with_max_gap(TimeDelta::hours(1))
//!     .inspect(&candles);
//! println!("{}", report.to_json()?);
//! ```

pub mod ohlcv_inspector;
pub mod report;

// 重新導出常用類型
pub use ohlcv_inspector::OhlcvInspector;
pub use report::DataQualityReport;
