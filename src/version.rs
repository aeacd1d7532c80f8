//! Application version tracking
//!
//! The client remembers which version last ran on the device. When a newer
//! build is loaded over an older one, the display surface is asked to reload
//! so cached assets are not mixed across versions.

use serde::Serialize;

use crate::{constants::version::STORAGE_KEY, storage::Storage};

/// Outcome of comparing the running version with the remembered one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VersionCheck {
    /// No version was remembered
    FirstRun,
    /// The remembered version is the running one
    Current,
    /// A different version ran before
    Updated {
        /// The version that ran before
        previous: String,
    },
}

impl VersionCheck {
    /// Returns whether the surface should reload
    pub fn needs_reload(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Compares `current` with the remembered version and remembers `current`
pub fn check<S: Storage + ?Sized>(storage: &mut S, current: &str) -> VersionCheck {
    let outcome = match storage.get(STORAGE_KEY) {
        None => VersionCheck::FirstRun,
        Some(previous) if previous == current => VersionCheck::Current,
        Some(previous) => {
            log::info!("updated from {previous} to {current}");
            VersionCheck::Updated { previous }
        }
    };
    storage.set(STORAGE_KEY, current.to_owned());
    outcome
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_first_run_does_not_reload() {
        let mut storage = MemoryStorage::default();
        let outcome = check(&mut storage, "1.0.3");
        assert_eq!(outcome, VersionCheck::FirstRun);
        assert!(!outcome.needs_reload());
        assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some("1.0.3"));
    }

    #[test]
    fn test_same_version() {
        let mut storage = MemoryStorage::default();
        check(&mut storage, "1.0.3");
        assert_eq!(check(&mut storage, "1.0.3"), VersionCheck::Current);
    }

    #[test]
    fn test_new_version_reloads_once() {
        let mut storage = MemoryStorage::default();
        check(&mut storage, "1.0.2");

        let outcome = check(&mut storage, "1.0.3");
        assert!(outcome.needs_reload());
        assert_eq!(
            outcome,
            VersionCheck::Updated {
                previous: "1.0.2".to_owned()
            }
        );
        assert_eq!(check(&mut storage, "1.0.3"), VersionCheck::Current);
    }
}
