mod common;

use anyhow::Result;
use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mtf_features::domain_types::{
    AggregationConfig, AggregationOp, Candle, CandleSeries, DomainError, Frequency, Resampler,
};
use proptest::prelude::*;
use rstest::rstest;
use std::collections::BTreeMap;

use common::{hourly, monday, series_every};

#[rstest]
#[case::four_hours(hourly(2), Frequency::Hours(4), 12)]
#[case::daily(hourly(3), Frequency::Day, 3)]
#[case::weekly(hourly(14), Frequency::Week, 2)]
// 1 月 31 天 + 2 月 29 天（閏年）
#[case::monthly(series_every(monday(), 24, 60), Frequency::Month, 2)]
fn test_resample_row_counts(
    #[case] series: CandleSeries,
    #[case] frequency: Frequency,
    #[case] expected_rows: usize,
) -> Result<()> {
    let coarse = Resampler::resample(&series, frequency)?;

    assert_eq!(coarse.len(), expected_rows);
    assert_eq!(coarse.frequency, Some(frequency));
    for candle in &coarse.data {
        assert!(frequency.is_period_start(candle.timestamp)?);
    }
    let total: f64 = coarse.volumes().iter().sum();
    let expected: f64 = series.volumes().iter().sum();
    assert!((total - expected).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_weekly_periods_start_on_monday() -> Result<()> {
    // 從週三開始
    let wednesday = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
    let weekly = Resampler::resample(&series_every(wednesday, 1, 24 * 7), Frequency::Week)?;

    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly.data[0].timestamp, monday());
    assert_eq!(weekly.data[1].timestamp, monday() + Duration::days(7));
    Ok(())
}

#[test]
fn test_empty_periods_are_dropped() -> Result<()> {
    let mut candles = hourly(1).data;
    // 跳過第二天，直接到第三天
    let third_day = monday() + Duration::days(2);
    candles.extend((0..24).map(|h| common::candle_at(third_day + Duration::hours(h), 105.0)));
    let series = CandleSeries::from_candles("BTCUSDT", None, candles)?;

    let daily = Resampler::resample(&series, Frequency::Day)?;
    assert_eq!(daily.timestamps(), vec![monday(), third_day]);
    Ok(())
}

#[test]
fn test_unsorted_input_is_rejected() {
    let mut series = CandleSeries::new("BTCUSDT", None);
    series.add_point(common::candle_at(monday() + Duration::hours(1), 100.0));
    series.add_point(common::candle_at(monday(), 100.0));

    assert_matches!(
        Resampler::resample(&series, Frequency::Day),
        Err(DomainError::UnsortedTimestamps { index: 1, .. })
    );
}

#[test]
fn test_duplicate_timestamp_is_rejected() {
    let mut series = CandleSeries::new("BTCUSDT", None);
    series.add_point(common::candle_at(monday(), 100.0));
    series.add_point(common::candle_at(monday(), 101.0));

    assert_matches!(
        Resampler::resample(&series, Frequency::Day),
        Err(DomainError::DuplicateTimestamp { index: 1, .. })
    );
}

#[test]
fn test_custom_aggregation() -> Result<()> {
    let mut config = AggregationConfig::new(Frequency::Day);
    config.close_op = AggregationOp::Max;
    config.volume_op = AggregationOp::Last;

    let series = hourly(1);
    let daily = Resampler::resample_with(&series, &config)?;
    let max_close = series.close_prices().into_iter().fold(f64::MIN, f64::max);

    assert_eq!(daily.data[0].close, max_close);
    assert_eq!(daily.data[0].volume, 100.0);
    Ok(())
}

fn frequency_strategy() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Hours(4)),
        Just(Frequency::Hours(6)),
        Just(Frequency::Day),
        Just(Frequency::Week),
        Just(Frequency::Month),
    ]
}

fn candles_strategy() -> impl Strategy<Value = Vec<Candle>> {
    // 以分鐘為單位的偏移，涵蓋約 100 天
    prop::collection::btree_map(0i64..144_000, (50.0f64..150.0, 0.0f64..5.0, 0.0f64..1000.0), 1..300)
        .prop_map(|rows| {
            let start: DateTime<Utc> = Utc.with_ymd_and_hms(2023, 12, 28, 0, 0, 0).unwrap();
            rows.into_iter()
                .map(|(offset, (close, spread, volume))| {
                    Candle::new(
                        start + Duration::minutes(offset),
                        close,
                        close + spread,
                        close - spread,
                        close,
                        volume,
                    )
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn prop_resampled_rows_aggregate_their_period(
        candles in candles_strategy(),
        frequency in frequency_strategy(),
    ) {
        let series = CandleSeries::from_candles("PROP", None, candles.clone()).unwrap();
        let coarse = Resampler::resample(&series, frequency).unwrap();

        let mut groups: BTreeMap<DateTime<Utc>, Vec<Candle>> = BTreeMap::new();
        for candle in &candles {
            groups
                .entry(frequency.period_start(candle.timestamp).unwrap())
                .or_default()
                .push(*candle);
        }

        prop_assert_eq!(coarse.len(), groups.len());
        for (row, (start, members)) in coarse.data.iter().zip(&groups) {
            prop_assert_eq!(row.timestamp, *start);
            prop_assert_eq!(row.open, members[0].open);
            prop_assert_eq!(row.close, members[members.len() - 1].close);
            prop_assert_eq!(row.high, members.iter().map(|c| c.high).fold(f64::MIN, f64::max));
            prop_assert_eq!(row.low, members.iter().map(|c| c.low).fold(f64::MAX, f64::min));
            let volume: f64 = members.iter().map(|c| c.volume).sum();
            prop_assert!((row.volume - volume).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_no_period_spans_two_calendar_periods(
        candles in candles_strategy(),
        frequency in frequency_strategy(),
    ) {
        let series = CandleSeries::from_candles("PROP", None, candles).unwrap();
        let slices = Resampler::partition(&series, frequency).unwrap();

        for slice in &slices {
            let period = frequency.period_of(slice.start).unwrap();
            for candle in slice.candles {
                prop_assert!(period.contains(candle.timestamp));
            }
        }
        for pair in slices.windows(2) {
            prop_assert!(pair[0].start < pair[1].start);
        }
    }
}
