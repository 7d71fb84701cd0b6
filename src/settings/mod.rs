//! Runtime scan settings.
//!
//! # Data Flow
//! ```text
//! [scanner] config section → initial Settings
//! POST /config → SettingsUpdate → validate → SettingsHandle::update
//! every scan → SettingsHandle::read → Settings snapshot
//! ```
//!
//! # Design Decisions
//! - One lock guards the `{safe_mode, sensitivity}` pair, so readers never
//!   observe half of an update
//! - Validation runs before the lock is taken; a rejected update mutates nothing
//! - Handles are explicit values, not globals; each test owns its own

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::scanner::{ParseSensitivityError, Sensitivity};

/// The live policy consulted by every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub sensitivity: Sensitivity,
    pub safe_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            safe_mode: true,
        }
    }
}

/// A partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    /// Case-insensitive level name.
    #[serde(default)]
    pub sensitivity: Option<String>,
    #[serde(default)]
    pub safe_mode: Option<bool>,
}

/// Shared, lock-guarded settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsHandle {
    pub fn new(initial: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Consistent snapshot of both fields.
    pub fn read(&self) -> Settings {
        *self.inner.read()
    }

    /// Apply a partial update and return the resulting settings.
    ///
    /// Fails without mutating anything if `sensitivity` is not a known level.
    pub fn update(&self, update: SettingsUpdate) -> Result<Settings, ParseSensitivityError> {
        let sensitivity = update
            .sensitivity
            .as_deref()
            .map(str::parse::<Sensitivity>)
            .transpose()?;

        let mut current = self.inner.write();
        if let Some(level) = sensitivity {
            current.sensitivity = level;
        }
        if let Some(safe_mode) = update.safe_mode {
            current.safe_mode = safe_mode;
        }
        Ok(*current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(sensitivity: Option<&str>, safe_mode: Option<bool>) -> SettingsUpdate {
        SettingsUpdate {
            sensitivity: sensitivity.map(str::to_string),
            safe_mode,
        }
    }

    #[test]
    fn test_defaults() {
        let handle = SettingsHandle::default();
        assert_eq!(
            handle.read(),
            Settings { sensitivity: Sensitivity::Medium, safe_mode: true }
        );
    }

    #[test]
    fn test_sensitivity_is_normalized() {
        let handle = SettingsHandle::default();
        let updated = handle.update(update(Some("low"), None)).unwrap();
        assert_eq!(updated.sensitivity, Sensitivity::Low);
        assert_eq!(serde_json::to_value(updated).unwrap()["sensitivity"], "Low");
        assert!(updated.safe_mode);
    }

    #[test]
    fn test_invalid_sensitivity_changes_nothing() {
        let handle = SettingsHandle::new(Settings { sensitivity: Sensitivity::Paranoid, safe_mode: true });
        let err = handle.update(update(Some("extreme"), Some(false))).unwrap_err();
        assert_eq!(err.0, "extreme");
        assert_eq!(
            handle.read(),
            Settings { sensitivity: Sensitivity::Paranoid, safe_mode: true }
        );
    }

    #[test]
    fn test_partial_updates() {
        let handle = SettingsHandle::default();
        handle.update(update(None, Some(false))).unwrap();
        assert_eq!(handle.read().sensitivity, Sensitivity::Medium);
        assert!(!handle.read().safe_mode);

        handle.update(update(Some("PARANOID"), None)).unwrap();
        assert_eq!(handle.read(), Settings { sensitivity: Sensitivity::Paranoid, safe_mode: false });

        assert_eq!(handle.update(SettingsUpdate::default()).unwrap(), handle.read());
    }

    #[test]
    fn test_handles_are_isolated() {
        let a = SettingsHandle::default();
        let b = SettingsHandle::default();
        a.update(update(Some("Low"), Some(false))).unwrap();
        assert_eq!(b.read(), Settings::default());
    }

    #[test]
    fn test_no_torn_reads_under_concurrency() {
        let handle = SettingsHandle::default();
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        // Pairs are always (Low, false) or (Paranoid, true).
                        let (level, safe) = if i % 2 == 0 { ("Low", false) } else { ("Paranoid", true) };
                        handle.update(update(Some(level), Some(safe))).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..10_000 {
            let snapshot = handle.read();
            match snapshot.sensitivity {
                Sensitivity::Low => assert!(!snapshot.safe_mode),
                Sensitivity::Paranoid => assert!(snapshot.safe_mode),
                Sensitivity::Medium => assert!(snapshot.safe_mode),
            }
        }

        for w in writers {
            w.join().unwrap();
        }
    }
}
