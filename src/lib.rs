// Library interface for the omniPD critical power engine
// Allows integration tests and downstream tools to use the core directly

pub mod config;
pub mod cpmodel;
pub mod error;
pub mod import;
pub mod logging;
pub mod model;
pub mod models;
pub mod optimizer;
pub mod selection;
pub mod stats;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use cpmodel::{CpAnalyzer, CpFitResult, CpModelError};
pub use error::{OmniPdError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use model::ModelParams;
pub use models::{CurveError, MmpCurve};
