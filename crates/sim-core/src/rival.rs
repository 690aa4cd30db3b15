use crate::{EconomicEntity, Money, Portfolio, Role, Span};
use serde::{Deserialize, Serialize};

/// Behavioral archetype of a rival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Calm,
    Cunning,
    Aggressive,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Calm, Style::Cunning, Style::Aggressive];

    /// Position of the style in every per-style table.
    pub fn index(self) -> usize {
        match self {
            Style::Calm => 0,
            Style::Cunning => 1,
            Style::Aggressive => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Style> {
        Style::ALL.get(i).copied()
    }
}

/// Transient state of a rival in the market branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    /// Negotiation stage counter, advanced while the player waits.
    pub stage: u8,
    pub profit_range: Span<Money>,
    /// Outcome of the rival's own deal once finalized.
    pub profit: Option<Money>,
}

/// Branch-specific behavior of a rival. Fixed at construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum BehaviorProfile {
    Negotiation,
    Market(MarketState),
    Projects(Portfolio),
}

/// A computer-controlled competitor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rival {
    pub entity: EconomicEntity,
    pub style: Style,
    pub profile: BehaviorProfile,
}

impl Rival {
    pub fn negotiator(name: impl Into<String>, style: Style) -> Self {
        Self {
            entity: EconomicEntity::new(name, Role::Rival, 0),
            style,
            profile: BehaviorProfile::Negotiation,
        }
    }

    pub fn trader(name: impl Into<String>, style: Style, budget: Money, profit_range: Span<Money>) -> Self {
        Self {
            entity: EconomicEntity::new(name, Role::Rival, budget),
            style,
            profile: BehaviorProfile::Market(MarketState {
                stage: 0,
                profit_range,
                profit: None,
            }),
        }
    }

    pub fn project_maker(name: impl Into<String>, style: Style, budget: Money) -> Self {
        Self {
            entity: EconomicEntity::new(name, Role::Rival, budget),
            style,
            profile: BehaviorProfile::Projects(Portfolio::new()),
        }
    }

    pub fn market(&self) -> Option<&MarketState> {
        match &self.profile {
            BehaviorProfile::Market(m) => Some(m),
            _ => None,
        }
    }

    /// Advance the market negotiation stage. No-op outside market mode.
    pub fn progress_deal(&mut self) -> Option<u8> {
        match &mut self.profile {
            BehaviorProfile::Market(m) => {
                m.stage = m.stage.saturating_add(1);
                Some(m.stage)
            }
            _ => None,
        }
    }

    /// Close the rival's market deal. No-op outside market mode.
    pub fn finalize_profit(&mut self, amount: Money) -> bool {
        match &mut self.profile {
            BehaviorProfile::Market(m) => {
                m.profit = Some(amount);
                self.entity.adjust_budget(amount);
                true
            }
            _ => false,
        }
    }

    pub fn portfolio(&self) -> Option<&Portfolio> {
        match &self.profile {
            BehaviorProfile::Projects(p) => Some(p),
            _ => None,
        }
    }

    pub fn portfolio_mut(&mut self) -> Option<&mut Portfolio> {
        match &mut self.profile {
            BehaviorProfile::Projects(p) => Some(p),
            _ => None,
        }
    }
}

/// The human player within one branch.
///
/// The portfolio is attached lazily the first time the branch needs it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub entity: EconomicEntity,
    portfolio: Option<Portfolio>,
}

impl Player {
    pub fn new(name: impl Into<String>, budget: Money, win_target: Money) -> Self {
        Self {
            entity: EconomicEntity::new(name, Role::Human, budget).with_win_target(win_target),
            portfolio: None,
        }
    }

    pub fn portfolio(&self) -> Option<&Portfolio> {
        self.portfolio.as_ref()
    }

    pub fn portfolio_mut(&mut self) -> &mut Portfolio {
        self.portfolio.get_or_insert_with(Portfolio::new)
    }

    /// Split borrow used when a deal settles against the player's own budget.
    pub fn parts_mut(&mut self) -> (&mut EconomicEntity, &mut Portfolio) {
        let portfolio = self.portfolio.get_or_insert_with(Portfolio::new);
        (&mut self.entity, portfolio)
    }
}
