#![deny(warnings)]

//! Core domain models and invariants for Flip Tycoon.
//!
//! This crate defines the serializable types shared by every branch of the
//! game: budgets, deals, portfolios, rivals and the achievement ledger,
//! together with the validation helpers that guard their invariants.

mod deal;
mod entity;
mod ledger;
mod portfolio;
mod rival;

pub use deal::{Deal, DealId, ProjectTier};
pub use entity::{BudgetChange, EconomicEntity, Role};
pub use ledger::{Achievement, AchievementId, Ledger};
pub use portfolio::Portfolio;
pub use rival::{BehaviorProfile, MarketState, Player, Rival, Style};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Currency amount in whole units. Budgets never go below zero, profits may.
pub type Money = i64;

/// Inclusive `[lo, hi]` range used by every configuration table.
///
/// Serialized as a two-element sequence, e.g. `[60000, 90000]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span<T>(pub T, pub T);

impl<T: Copy + PartialOrd> Span<T> {
    pub fn new(lo: T, hi: T) -> Self {
        Span(lo, hi)
    }

    pub fn lo(&self) -> T {
        self.0
    }

    pub fn hi(&self) -> T {
        self.1
    }

    pub fn contains(&self, value: T) -> bool {
        self.0 <= value && value <= self.1
    }

    /// A span is well formed when `lo <= hi`.
    pub fn is_ordered(&self) -> bool {
        self.0 <= self.1
    }
}

/// Identity of a registered player.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit session context handed to every operation that needs the
/// identity of the logged-in player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: UserId,
}

impl Session {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            user: UserId(login.into()),
        }
    }
}

/// Process-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for deterministic RNG; `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    /// Directory holding `users.txt` and the per-user achievement files.
    pub storage_dir: PathBuf,
    /// Optional YAML catalog overriding the built-in tables.
    pub catalog_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            storage_dir: PathBuf::from("storage"),
            catalog_path: None,
        }
    }
}

/// Errors for invalid choices and lookups in the core model.
///
/// None of these are fatal: callers report them and re-prompt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Project tier code outside 1..=3.
    #[error("unknown project tier: {0}")]
    UnknownTier(u8),
    /// Action code that the current branch does not offer.
    #[error("unknown action: {0}")]
    UnknownAction(String),
    /// Deal id not present in the portfolio.
    #[error("deal not found: {0}")]
    DealNotFound(DealId),
    /// The portfolio has no deals to act on.
    #[error("no active projects")]
    EmptyPortfolio,
    /// Range with `lo > hi`.
    #[error("inverted range [{0}, {1}]")]
    InvertedSpan(i64, i64),
    /// The branch already ended; no further actions are accepted.
    #[error("branch is over")]
    BranchOver,
}

/// Validate an integer span.
pub fn validate_span(span: &Span<Money>) -> Result<(), CoreError> {
    if !span.is_ordered() {
        return Err(CoreError::InvertedSpan(span.lo(), span.hi()));
    }
    Ok(())
}
