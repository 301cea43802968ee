// 模組定義
pub mod config;
pub mod domain_types;
pub mod data_ingestion;
pub mod monitor;
pub mod pipeline;
pub mod utils;

pub use pipeline::{merge_frames, support_resistance_frame, FeaturePipeline, SupportResistanceOutput};
