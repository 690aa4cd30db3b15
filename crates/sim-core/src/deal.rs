use crate::{CoreError, Money, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project tiers of the portfolio branch, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectTier {
    /// Light touch-up, one or two turns.
    Quick,
    /// Restoration or partial repair.
    Medium,
    /// Engine swap or full build; the "long" tier.
    Long,
}

impl ProjectTier {
    pub const ALL: [ProjectTier; 3] = [ProjectTier::Quick, ProjectTier::Medium, ProjectTier::Long];

    /// Menu code, 1-based.
    pub fn code(self) -> u8 {
        match self {
            ProjectTier::Quick => 1,
            ProjectTier::Medium => 2,
            ProjectTier::Long => 3,
        }
    }

    pub fn is_long(self) -> bool {
        self == ProjectTier::Long
    }
}

impl TryFrom<u8> for ProjectTier {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ProjectTier::Quick),
            2 => Ok(ProjectTier::Medium),
            3 => Ok(ProjectTier::Long),
            other => Err(CoreError::UnknownTier(other)),
        }
    }
}

/// Portfolio-unique handle of a deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DealId(pub u64);

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A time-boxed investment that freezes capital until it matures.
///
/// `elapsed <= duration` is not enforced; a deal is ready once
/// `elapsed >= duration`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub tier: ProjectTier,
    pub owner: Role,
    /// Paid upfront when the deal was created.
    pub purchase_price: Money,
    duration: u32,
    elapsed: u32,
    bonus: Money,
}

impl Deal {
    pub fn new(id: DealId, tier: ProjectTier, owner: Role, purchase_price: Money, duration: u32) -> Self {
        Self {
            id,
            tier,
            owner,
            purchase_price,
            duration,
            elapsed: 0,
            bonus: 0,
        }
    }

    pub fn advance_one_turn(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Shift the required duration and stack a profit modifier.
    ///
    /// Duration never drops below one turn.
    pub fn apply_event(&mut self, turns_delta: i32, bonus_delta: Money) {
        let next = i64::from(self.duration) + i64::from(turns_delta);
        self.duration = u32::try_from(next.max(1)).unwrap_or(u32::MAX);
        self.bonus += bonus_delta;
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn bonus(&self) -> Money {
        self.bonus
    }

    pub fn remaining_turns(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }
}
