// Club Registry - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod club;
pub mod config;
pub mod export;
pub mod registration;
pub mod store;
pub mod telemetry;
pub mod validator;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use club::{Club, UnknownClub};
pub use config::{Config, ConfigError};
pub use export::{export_csv, write_csv};
pub use registration::{NewRegistration, Registration, DATE_FORMAT};
pub use store::{RegistrationStore, StoreError};
pub use validator::{validate, ErrorKind, Field, ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
