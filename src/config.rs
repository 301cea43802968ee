/// 配置模組
///
/// 每次呼叫時傳入的配置，不讀取檔案也不保存全域狀態。
/// 呼叫端可直接建構，或以 serde 反序列化。
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use types::*;
pub use validation::{validate_config, ValidationError, ValidationUtils, Validator};
