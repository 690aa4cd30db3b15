use crate::PersistenceError;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const MIN_PASSWORD_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("login and password must not contain spaces")]
    ContainsSpace,
    #[error("login must not contain path separators")]
    InvalidLogin,
    #[error("password too short (minimum 3 characters)")]
    PasswordTooShort,
    #[error("a user with this login already exists")]
    AlreadyExists,
    #[error("user not found")]
    UnknownUser,
    #[error("wrong password")]
    WrongPassword,
    #[error(transparent)]
    Storage(#[from] PersistenceError),
}

impl From<std::io::Error> for AuthError {
    fn from(e: std::io::Error) -> Self {
        AuthError::Storage(PersistenceError::Io(e))
    }
}

/// Shape rules shared by registration and the login screen.
pub fn validate_credentials(login: &str, password: &str) -> Result<(), AuthError> {
    if login.is_empty() {
        return Err(AuthError::EmptyLogin);
    }
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    if login.contains(char::is_whitespace) || password.contains(char::is_whitespace) {
        return Err(AuthError::ContainsSpace);
    }
    if login.contains(['/', '\\']) || login == "." || login == ".." {
        return Err(AuthError::InvalidLogin);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// Newline-delimited `login password` pairs in `users.txt`.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join("users.txt"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All users; blank and malformed lines are skipped.
    pub fn load_users(&self) -> Result<BTreeMap<String, String>, AuthError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let mut users = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split(' ').collect();
            let [login, password] = parts.as_slice() else {
                debug!(line, "skipping malformed credential line");
                continue;
            };
            users.insert((*login).to_string(), (*password).to_string());
        }
        Ok(users)
    }

    pub fn register(&self, login: &str, password: &str) -> Result<(), AuthError> {
        validate_credentials(login, password)?;
        if self.load_users()?.contains_key(login) {
            return Err(AuthError::AlreadyExists);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{login} {password}")?;
        info!(login, "user registered");
        Ok(())
    }

    pub fn authenticate(&self, login: &str, password: &str) -> Result<(), AuthError> {
        let users = self.load_users()?;
        match users.get(login) {
            None => Err(AuthError::UnknownUser),
            Some(stored) if stored != password => Err(AuthError::WrongPassword),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::scratch_dir;

    #[test]
    fn register_then_authenticate() {
        let store = CredentialStore::new(scratch_dir("auth"));
        store.register("alice", "secret").unwrap();
        store.authenticate("alice", "secret").unwrap();
        assert!(matches!(store.authenticate("alice", "nope"), Err(AuthError::WrongPassword)));
        assert!(matches!(store.authenticate("bob", "secret"), Err(AuthError::UnknownUser)));
    }

    #[test]
    fn duplicate_login_is_rejected() {
        let store = CredentialStore::new(scratch_dir("dup"));
        store.register("alice", "secret").unwrap();
        assert!(matches!(store.register("alice", "other"), Err(AuthError::AlreadyExists)));
    }

    #[test]
    fn validation_rules() {
        assert!(matches!(validate_credentials("", "abc"), Err(AuthError::EmptyLogin)));
        assert!(matches!(validate_credentials("a", ""), Err(AuthError::EmptyPassword)));
        assert!(matches!(validate_credentials("a b", "abc"), Err(AuthError::ContainsSpace)));
        assert!(matches!(validate_credentials("ab", "a c"), Err(AuthError::ContainsSpace)));
        assert!(matches!(validate_credentials("../x", "abc"), Err(AuthError::InvalidLogin)));
        assert!(matches!(validate_credentials("ab", "ab"), Err(AuthError::PasswordTooShort)));
        assert!(validate_credentials("ab", "abc").is_ok());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = scratch_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        let store = CredentialStore::new(&dir);
        fs::write(store.path(), "alice secret\n\njunk\nthree word line\nbob pw1\n").unwrap();
        let users = store.load_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users.get("bob").map(String::as_str), Some("pw1"));
    }

    #[test]
    fn missing_file_means_no_users() {
        let store = CredentialStore::new(scratch_dir("empty"));
        assert!(store.load_users().unwrap().is_empty());
    }
}
