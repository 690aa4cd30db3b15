#![deny(warnings)]

//! Branch drivers and the project turn engine.
//!
//! Drivers own their branch state (player, rival, RNG) and return plain
//! report structs. Achievements come back as ids; issuing them is a separate
//! step (see [`dispatch`]) so a storage failure can never stall a game.

pub mod dispatch;
pub mod engine;
pub mod market;
pub mod negotiation;
pub mod projects;
pub mod triggers;

pub use dispatch::dispatch;
pub use engine::{Abandonment, ProjectStart, Settlement, TickReport, TurnEngine};
pub use market::{HeldDeal, Listing, MarketAction, MarketBranch, MarketEvent, MarketReport};
pub use negotiation::{NegotiationBranch, NegotiationReport};
pub use projects::{ProjectAction, ProjectBranch, ProjectReport};

use sim_core::{CoreError, EconomicEntity, Player};
use sim_econ::EconError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Econ(#[from] EconError),
}

/// Where a branch stands after the last step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchStatus {
    Ongoing,
    Won,
    Bankrupt,
    Exited,
}

impl BranchStatus {
    /// Bankruptcy is permanent, so it outranks a later recovery past the target.
    pub fn of(entity: &EconomicEntity) -> BranchStatus {
        if entity.is_bankrupt() {
            BranchStatus::Bankrupt
        } else if entity.has_won() {
            BranchStatus::Won
        } else {
            BranchStatus::Ongoing
        }
    }

    pub fn is_over(self) -> bool {
        self != BranchStatus::Ongoing
    }
}

/// Common surface of the three branch drivers.
pub trait Branch {
    fn title(&self) -> &'static str;
    fn player(&self) -> &Player;
    fn status(&self) -> BranchStatus;
    /// Leave the branch; later actions fail with `BranchOver`.
    fn exit(&mut self);
}

pub(crate) fn ensure_ongoing(status: BranchStatus) -> Result<(), RuntimeError> {
    if status.is_over() {
        return Err(CoreError::BranchOver.into());
    }
    Ok(())
}
