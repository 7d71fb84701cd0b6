//! WebShield: inline payload scanner with per-client rate limiting.

pub mod admin;
pub mod audit;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod scanner;
pub mod security;
pub mod settings;

pub use config::schema::WebShieldConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
