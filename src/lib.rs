// Library interface for gainrs modules
// This allows integration tests and benchmarks to access the core functionality

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod nutrition;
pub mod projection;
pub mod session;
pub mod store;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{GainError, Result, StorageError};
pub use export::{ExportFormat, PlanReport, TableStyle};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use nutrition::NutritionEngine;
pub use projection::WeightProjection;
pub use session::PlanSession;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, USER_DATA_KEY};
pub use validation::{IssueSeverity, ProfileValidator, ValidationIssue};
