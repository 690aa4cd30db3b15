use crate::Money;
use serde::{Deserialize, Serialize};

/// Who controls an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Human,
    Rival,
}

/// Result of a single budget adjustment, handed to presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetChange {
    /// Signed amount requested.
    pub delta: Money,
    /// Balance after clamping.
    pub balance: Money,
    /// True only on the adjustment that first drove the entity bankrupt.
    pub went_bankrupt: bool,
}

/// Budget state shared by the player and every rival.
///
/// The budget never goes negative. Reaching zero or below clamps it to zero
/// and marks the entity bankrupt for the rest of its life.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EconomicEntity {
    pub name: String,
    pub role: Role,
    budget: Money,
    bankrupt: bool,
    win_target: Option<Money>,
    completed_deals: Vec<Money>,
}

impl EconomicEntity {
    pub fn new(name: impl Into<String>, role: Role, budget: Money) -> Self {
        Self {
            name: name.into(),
            role,
            budget: budget.max(0),
            bankrupt: false,
            win_target: None,
            completed_deals: Vec::new(),
        }
    }

    pub fn with_win_target(mut self, target: Money) -> Self {
        self.win_target = Some(target);
        self
    }

    pub fn budget(&self) -> Money {
        self.budget
    }

    pub fn win_target(&self) -> Option<Money> {
        self.win_target
    }

    /// The sole financial-state mutator.
    pub fn adjust_budget(&mut self, amount: Money) -> BudgetChange {
        let was_bankrupt = self.bankrupt;
        let next = self.budget.saturating_add(amount);
        if next <= 0 {
            self.budget = 0;
            self.bankrupt = true;
        } else {
            self.budget = next;
        }
        BudgetChange {
            delta: amount,
            balance: self.budget,
            went_bankrupt: self.bankrupt && !was_bankrupt,
        }
    }

    pub fn is_bankrupt(&self) -> bool {
        self.bankrupt
    }

    pub fn has_won(&self) -> bool {
        match self.win_target {
            Some(target) => self.budget >= target,
            None => false,
        }
    }

    pub fn record_completed_deal(&mut self, profit: Money) {
        self.completed_deals.push(profit);
    }

    pub fn completed_deals(&self) -> &[Money] {
        &self.completed_deals
    }

    pub fn completed_count(&self) -> usize {
        self.completed_deals.len()
    }
}
