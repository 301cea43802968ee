#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use mtf_features::domain_types::{Candle, CandleSeries, Frequency};

/// 2024-01-01 00:00 UTC（週一）
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn candle_at(ts: DateTime<Utc>, close: f64) -> Candle {
    Candle::new(ts, close - 0.5, close + 1.0, close - 1.0, close, 100.0)
}

/// 從 `start` 起每隔 `step_hours` 小時一根的K線，價格平滑震盪
pub fn series_every(start: DateTime<Utc>, step_hours: i64, count: i64) -> CandleSeries {
    let candles = (0..count)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.25).sin() * 8.0 + i as f64 * 0.01;
            candle_at(start + Duration::hours(i * step_hours), close)
        })
        .collect();
    CandleSeries::from_candles("BTCUSDT", None, candles).unwrap()
}

pub fn hourly(days: i64) -> CandleSeries {
    series_every(monday(), 1, days * 24)
}

pub fn four_hourly(days: i64) -> CandleSeries {
    let mut series = series_every(monday(), 4, days * 6);
    series.frequency = Some(Frequency::Hours(4));
    series
}
