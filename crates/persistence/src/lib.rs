#![deny(warnings)]

//! Persistence layer: per-user achievement files and the credential list.
//!
//! Both stores are flat files under one storage directory and are rewritten
//! whole on change. They assume a single writer per user.

mod achievements;
mod credentials;

pub use achievements::{earned_achievements, AchievementStore, JsonAchievementStore, MemoryAchievementStore};
pub use credentials::{validate_credentials, AuthError, CredentialStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Fresh, empty directory under the system temp dir.
    pub fn scratch_dir(tag: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("flip-tycoon-{tag}-{}-{n}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }
}
