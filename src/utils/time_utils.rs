// time_utils.rs
//
// 提供時間轉換相關的工具函數，用於在 DataFrame 欄位與領域模型之間轉換時間格式。
// polars 的 Datetime 欄位可能是毫秒、微秒或納秒，統一換算為毫秒。

use chrono::{DateTime, TimeDelta, Utc};

/// 將 DateTime<Utc> 轉換為毫秒時間戳
pub fn datetime_to_timestamp_ms(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// 將毫秒時間戳轉換為 DateTime<Utc>，超出範圍時返回 None
pub fn timestamp_ms_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts)
}

/// 將 DateTime<Utc> 數組轉換為 i64 時間戳數組
pub fn datetimes_to_timestamps(datetimes: &[DateTime<Utc>]) -> Vec<i64> {
    datetimes.iter().map(datetime_to_timestamp_ms).collect()
}

/// 微秒時間戳換算為毫秒（向下取整）
pub fn micros_to_millis(ts: i64) -> i64 {
    ts.div_euclid(1_000)
}

/// 納秒時間戳換算為毫秒（向下取整）
pub fn nanos_to_millis(ts: i64) -> i64 {
    ts.div_euclid(1_000_000)
}

/// 兩個時間戳之間的間隔
pub fn gap_between(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> TimeDelta {
    *later - *earlier
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_timestamp_conversion() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let ts = datetime_to_timestamp_ms(&dt);
        assert_eq!(timestamp_ms_to_datetime(ts), Some(dt));
        assert_eq!(datetimes_to_timestamps(&[dt]), vec![ts]);
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert_eq!(timestamp_ms_to_datetime(i64::MAX), None);
    }

    #[test]
    fn test_unit_conversion_floors() {
        assert_eq!(micros_to_millis(1_999), 1);
        assert_eq!(nanos_to_millis(-1), -1);
    }

    #[test]
    fn test_gap_between() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(gap_between(&a, &b), TimeDelta::hours(3));
    }
}
