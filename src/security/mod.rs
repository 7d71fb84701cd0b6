//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_id.rs (derive key from X-Forwarded-For)
//!     → rate_limit.rs (fixed window per client and category)
//!     → 429 with Retry-After, or pass to the handler
//! ```
//!
//! # Design Decisions
//! - Windows are in memory and per process
//! - A global toggle bypasses limiting entirely, without bookkeeping
//! - The window map is bounded; the least recently seen client goes first

pub mod client_id;
pub mod rate_limit;

pub use client_id::{client_id, ClientId, UNKNOWN_CLIENT};
pub use rate_limit::{RateCategory, RateDecision, RateLimiter};
