//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → middleware/ (per-client rate limiting)
//!     → handlers.rs / websocket.rs / admin
//!     → error.rs (ScanError → status + JSON detail)
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;
pub mod websocket;

pub use error::{ApiJson, ScanError};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
