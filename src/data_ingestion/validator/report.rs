use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 資料品質報告
///
/// 純報告：只計數，不修改也不拒絕輸入。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    /// 總列數
    pub row_count: usize,
    /// 每個欄位的缺值數（非有限數值也算缺值）
    pub missing_values: BTreeMap<String, usize>,
    /// 時間戳與數值完全相同的重複列
    pub duplicate_rows: usize,
    /// 時間戳重複的列
    pub duplicate_timestamps: usize,
    /// 價格關係不一致的列（high < max(open, close) 等）
    pub inconsistent_rows: usize,
    /// 相鄰時間戳間隔超過上限的次數；未檢查時為 None
    pub gaps_found: Option<usize>,
    /// 重採樣後的時間框架標籤
    pub timeframe: Option<String>,
}

impl DataQualityReport {
    /// 創建空報告
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            missing_values: BTreeMap::new(),
            duplicate_rows: 0,
            duplicate_timestamps: 0,
            inconsistent_rows: 0,
            gaps_found: None,
            timeframe: None,
        }
    }

    /// 所有欄位的缺值總數
    pub fn total_missing(&self) -> usize {
        self.missing_values.values().sum()
    }

    /// 沒有發現任何問題
    pub fn is_clean(&self) -> bool {
        self.total_missing() == 0
            && self.duplicate_rows == 0
            && self.duplicate_timestamps == 0
            && self.inconsistent_rows == 0
            && self.gaps_found.unwrap_or(0) == 0
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 單行摘要
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "rows={} missing={} duplicate_rows={} duplicate_timestamps={} inconsistent={}",
            self.row_count,
            self.total_missing(),
            self.duplicate_rows,
            self.duplicate_timestamps,
            self.inconsistent_rows
        );
        if let Some(gaps) = self.gaps_found {
            summary.push_str(&format!(" gaps={}", gaps));
        }
        if let Some(timeframe) = &self.timeframe {
            summary.push_str(&format!(" timeframe={}", timeframe));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean() {
        let report = DataQualityReport::new(0);
        assert!(report.is_clean());
        assert_eq!(report.summary(), "rows=0 missing=0 duplicate_rows=0 duplicate_timestamps=0 inconsistent=0");
    }

    #[test]
    fn test_report_json() {
        let mut report = DataQualityReport::new(3);
        report.missing_values.insert("close".to_string(), 1);
        report.gaps_found = Some(2);
        report.timeframe = Some("1d".to_string());

        assert!(!report.is_clean());
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["missing_values"]["close"], 1);
        assert_eq!(value["gaps_found"], 2);
        assert_eq!(value["timeframe"], "1d");
    }
}
