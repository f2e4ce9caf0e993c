// Library interface for fitimport modules
// This allows integration tests to access the core functionality

pub mod decode;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;

// Re-export commonly used types for convenience
pub use decode::decode_messages;
pub use error::{DecodeError, ImportError, Result};
pub use import::{fit::FitImporter, ImportFormat, ImportManager};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{Coordinate, DecodeWarning, Interval, WorkoutImport, WorkoutSummary};
