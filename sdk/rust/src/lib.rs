//! Typed async client for the WebShield HTTP API.

pub mod client;

pub use client::{
    LogEntry, RateLimitStats, RateLimitingStatus, ScanResult, ScanSettings, SdkError,
    SettingsPatch, ShieldClient,
};
