pub mod types;
pub mod data_point;
pub mod frequency;
pub mod time_series;
pub mod aggregation;
pub mod resampler;
pub mod levels;
pub mod projection;
pub mod proximity;
pub mod feature_table;
pub mod merger;
pub mod indicators;
pub mod patterns;
pub mod frame;

pub use types::{ColumnName, DomainError, ErrorKind, Result};
pub use data_point::Candle;
pub use frequency::{Frequency, Period};
pub use time_series::{CandleSeries, HasTimestamp, TimeSeries};
pub use aggregation::{AggregationConfig, AggregationOp};
pub use resampler::{PeriodSlice, Resampler};
pub use levels::{LevelSet, PeriodLevels, PivotCalculator};
pub use projection::{InsufficientHistory, LevelProjector, ProjectedLevels};
pub use proximity::{flag_proximity, ProximityFlags, Tolerance};
pub use feature_table::{FeatureColumn, FeatureRow, FeatureTable};
pub use merger::{MergeReport, MergedFeatureTable, MultiTimeframeMerger};
pub use indicators::IndicatorsExt;
pub use patterns::{PatternExt, PatternSignal};
pub use frame::{candles_to_dataframe, MarketFrameExt};
