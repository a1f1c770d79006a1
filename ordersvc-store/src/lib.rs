pub mod app_config;
pub mod error_tracking;
pub mod events;

pub use app_config::{Config, ConfigError};
pub use error_tracking::ApmErrorReporter;
pub use events::EventProducer;
