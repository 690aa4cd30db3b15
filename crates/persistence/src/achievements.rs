use crate::PersistenceError;
use sim_core::{Achievement, AchievementId, Ledger, UserId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Per-player set of earned achievement ids.
pub trait AchievementStore {
    /// Earned ids in issuance order. Ids missing from the ledger are skipped.
    fn list_earned(&self, user: &UserId) -> Vec<AchievementId>;

    /// Grant `id` to `user`. Returns `Ok(true)` only when newly granted;
    /// repeats and ids unknown to the ledger return `Ok(false)`.
    fn issue(&mut self, user: &UserId, id: &str) -> Result<bool, PersistenceError>;

    fn has_achievement(&self, user: &UserId, id: AchievementId) -> bool {
        self.list_earned(user).contains(&id)
    }
}

/// Ledger entries for everything `user` has earned.
pub fn earned_achievements<S: AchievementStore + ?Sized>(store: &S, user: &UserId) -> Vec<&'static Achievement> {
    store.list_earned(user).into_iter().map(Ledger::get).collect()
}

fn known_ids(raw: &[String]) -> Vec<AchievementId> {
    raw.iter().filter_map(|s| AchievementId::parse(s)).collect()
}

/// One JSON array of id strings per user: `artifacts_<login>.json`.
#[derive(Debug, Clone)]
pub struct JsonAchievementStore {
    dir: PathBuf,
}

impl JsonAchievementStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn user_file(&self, user: &UserId) -> PathBuf {
        self.dir.join(format!("artifacts_{}.json", user.as_str()))
    }

    /// Raw ids on disk. A missing file is empty; an unreadable or corrupt
    /// one is logged and treated as empty.
    pub fn load_ids(&self, user: &UserId) -> Vec<String> {
        let path = self.user_file(user);
        if !path.exists() {
            return Vec::new();
        }
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "achievement file unreadable, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "achievement file corrupt, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save_ids(&self, user: &UserId, ids: &[String]) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(ids)?;
        fs::write(self.user_file(user), text)?;
        Ok(())
    }
}

impl AchievementStore for JsonAchievementStore {
    fn list_earned(&self, user: &UserId) -> Vec<AchievementId> {
        known_ids(&self.load_ids(user))
    }

    fn issue(&mut self, user: &UserId, id: &str) -> Result<bool, PersistenceError> {
        if Ledger::find(id).is_none() {
            return Ok(false);
        }
        let mut ids = self.load_ids(user);
        if ids.iter().any(|s| s == id) {
            return Ok(false);
        }
        ids.push(id.to_string());
        self.save_ids(user, &ids)?;
        info!(user = %user, achievement = id, "achievement issued");
        Ok(true)
    }
}

/// Volatile store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryAchievementStore {
    earned: BTreeMap<UserId, Vec<AchievementId>>,
}

impl MemoryAchievementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AchievementStore for MemoryAchievementStore {
    fn list_earned(&self, user: &UserId) -> Vec<AchievementId> {
        self.earned.get(user).cloned().unwrap_or_default()
    }

    fn issue(&mut self, user: &UserId, id: &str) -> Result<bool, PersistenceError> {
        let Some(entry) = Ledger::find(id) else {
            return Ok(false);
        };
        let list = self.earned.entry(user.clone()).or_default();
        if list.contains(&entry.id) {
            return Ok(false);
        }
        list.push(entry.id);
        Ok(true)
    }
}
