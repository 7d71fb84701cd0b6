//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WebShieldConfig (validated, immutable)
//!     → consumed once at startup by the server and its subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; rate-limit policies are deployment constants
//! - Runtime-tunable scan policy lives in `settings`, seeded from `[scanner]`
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, AuditBackend, AuditConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RateLimitConfig, ScannerConfig, WebShieldConfig, WindowPolicy, MAX_WINDOW_SECS,
};
