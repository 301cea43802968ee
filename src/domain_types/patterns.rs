//! K線型態分類
//!
//! 看漲：錘子線、看漲吞沒。看跌：射擊之星、看跌吞沒。
//! 同一列同時符合兩邊時以看跌為準。

use serde::{Deserialize, Serialize};

use super::data_point::Candle;
use super::feature_table::FeatureTable;
use super::types::{ColumnName, Result};

/// 型態訊號
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternSignal {
    Bullish,
    Bearish,
    Neutral,
}

impl From<PatternSignal> for f64 {
    fn from(signal: PatternSignal) -> Self {
        match signal {
            PatternSignal::Bullish => 1.0,
            PatternSignal::Bearish => -1.0,
            PatternSignal::Neutral => 0.0,
        }
    }
}

fn small_body(candle: &Candle) -> bool {
    candle.body().abs() < candle.range() * 0.3
}

pub fn is_hammer(candle: &Candle) -> bool {
    small_body(candle) && candle.lower_shadow() > 2.0 * candle.body().abs()
}

pub fn is_shooting_star(candle: &Candle) -> bool {
    small_body(candle) && candle.upper_shadow() > 2.0 * candle.body().abs()
}

pub fn is_bullish_engulfing(prev: &Candle, candle: &Candle) -> bool {
    candle.close > candle.open
        && prev.close < prev.open
        && candle.close > prev.open
        && candle.open < prev.close
}

pub fn is_bearish_engulfing(prev: &Candle, candle: &Candle) -> bool {
    candle.close < candle.open
        && prev.close > prev.open
        && candle.close < prev.open
        && candle.open > prev.close
}

/// 分類單根K線，第一根沒有前一根時吞沒規則不成立
pub fn classify(prev: Option<&Candle>, candle: &Candle) -> PatternSignal {
    let bullish_engulfing = prev.is_some_and(|p| is_bullish_engulfing(p, candle));
    let bearish_engulfing = prev.is_some_and(|p| is_bearish_engulfing(p, candle));

    if is_shooting_star(candle) || bearish_engulfing {
        PatternSignal::Bearish
    } else if is_hammer(candle) || bullish_engulfing {
        PatternSignal::Bullish
    } else {
        PatternSignal::Neutral
    }
}

/// 為特徵表添加型態欄位的擴展 trait
pub trait PatternExt {
    /// 附加 `pattern_signal`、`body`、`upper_shadow`、`lower_shadow`
    fn with_patterns(&mut self) -> Result<()>;
}

impl PatternExt for FeatureTable {
    fn with_patterns(&mut self) -> Result<()> {
        let candles: Vec<Option<Candle>> = {
            let open = self.require_column(ColumnName::OPEN)?;
            let high = self.require_column(ColumnName::HIGH)?;
            let low = self.require_column(ColumnName::LOW)?;
            let close = self.require_column(ColumnName::CLOSE)?;

            self.timestamps()
                .iter()
                .enumerate()
                .map(|(i, ts)| {
                    Some(Candle::new(*ts, open[i]?, high[i]?, low[i]?, close[i]?, 0.0))
                })
                .collect()
        };

        let mut signals = Vec::with_capacity(candles.len());
        let mut bodies = Vec::with_capacity(candles.len());
        let mut upper = Vec::with_capacity(candles.len());
        let mut lower = Vec::with_capacity(candles.len());

        for (i, candle) in candles.iter().enumerate() {
            let prev = if i > 0 { candles[i - 1].as_ref() } else { None };
            match candle {
                Some(c) => {
                    signals.push(Some(f64::from(classify(prev, c))));
                    bodies.push(Some(c.body()));
                    upper.push(Some(c.upper_shadow()));
                    lower.push(Some(c.lower_shadow()));
                }
                None => {
                    signals.push(None);
                    bodies.push(None);
                    upper.push(None);
                    lower.push(None);
                }
            }
        }

        self.add_column(ColumnName::PATTERN_SIGNAL, signals)?;
        self.add_column(ColumnName::BODY, bodies)?;
        self.add_column(ColumnName::UPPER_SHADOW, upper)?;
        self.add_column(ColumnName::LOWER_SHADOW, lower)?;
        Ok(())
    }
}
