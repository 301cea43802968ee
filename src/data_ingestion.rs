pub mod validator;

pub use validator::{DataQualityReport, OhlcvInspector};
