//! Branch 1: haggling over a single car with a fresh seller each round.

use crate::{ensure_ongoing, triggers, Branch, BranchStatus, RuntimeError};
use catalog::{Catalog, NegotiationAction, Outcome};
use sim_core::{AchievementId, BudgetChange, Money, Player, Rival, Style};
use sim_econ::{negotiate, GameRng};
use std::sync::Arc;
use tracing::info;

/// Result of one negotiation round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiationReport {
    pub round: u32,
    /// The seller this round was played against.
    pub rival_name: String,
    pub rival_style: Style,
    pub action: NegotiationAction,
    pub outcome: Outcome,
    /// Money moved; `None` when the deal collapsed.
    pub amount: Option<Money>,
    pub change: Option<BudgetChange>,
    pub achievements: Vec<AchievementId>,
    pub status: BranchStatus,
}

pub struct NegotiationBranch {
    catalog: Arc<Catalog>,
    rng: GameRng,
    player: Player,
    rival: Rival,
    round: u32,
    status: BranchStatus,
}

impl NegotiationBranch {
    pub fn new(name: impl Into<String>, catalog: Arc<Catalog>, mut rng: GameRng) -> Self {
        let setup = catalog.branches.negotiation;
        let rival = sim_ai::negotiation_rival(&mut rng);
        Self {
            player: Player::new(name, setup.starting_budget, setup.win_target),
            catalog,
            rng,
            rival,
            round: 0,
            status: BranchStatus::Ongoing,
        }
    }

    /// The seller the player faces this round.
    pub fn rival(&self) -> &Rival {
        &self.rival
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Play one round against the current seller, then bring in the next one.
    pub fn play(&mut self, action: NegotiationAction) -> Result<NegotiationReport, RuntimeError> {
        ensure_ongoing(self.status)?;
        self.round += 1;
        let (outcome, amount) = negotiate(&mut self.rng, &self.catalog.negotiation, action, self.rival.style)?;
        let mut change = None;
        let mut achievements = Vec::new();
        if let Some(amount) = amount {
            change = Some(self.player.entity.adjust_budget(amount));
            self.player.entity.record_completed_deal(amount);
            achievements.extend(triggers::first_deal(&self.player.entity));
            achievements.extend(triggers::ten_deals(&self.player.entity));
        }
        self.status = BranchStatus::of(&self.player.entity);
        info!(round = self.round, ?action, ?outcome, ?amount, budget = self.player.entity.budget(), "negotiation round");

        let next = sim_ai::negotiation_rival(&mut self.rng);
        let rival = std::mem::replace(&mut self.rival, next);
        Ok(NegotiationReport {
            round: self.round,
            rival_name: rival.entity.name,
            rival_style: rival.style,
            action,
            outcome,
            amount,
            change,
            achievements,
            status: self.status,
        })
    }
}

impl Branch for NegotiationBranch {
    fn title(&self) -> &'static str {
        "Branch 1: the haggle"
    }

    fn player(&self) -> &Player {
        &self.player
    }

    fn status(&self) -> BranchStatus {
        self.status
    }

    fn exit(&mut self) {
        if !self.status.is_over() {
            self.status = BranchStatus::Exited;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::CoreError;
    use sim_econ::seeded_rng;

    fn branch(seed: u64) -> NegotiationBranch {
        NegotiationBranch::new("alice", Arc::new(Catalog::default()), seeded_rng(Some(seed)))
    }

    #[test]
    fn starts_with_configured_budget() {
        let b = branch(1);
        assert_eq!(b.player().entity.budget(), 80_000);
        assert_eq!(b.player().entity.win_target(), Some(150_000));
        assert_eq!(b.status(), BranchStatus::Ongoing);
    }

    #[test]
    fn outcome_follows_matrix_and_books_deal() {
        let mut b = branch(7);
        let style = b.rival().style;
        let report = b.play(NegotiationAction::HardBargain).unwrap();
        assert_eq!(report.rival_style, style);
        let expected = Catalog::default().negotiation.outcome(NegotiationAction::HardBargain, style);
        assert_eq!(report.outcome, expected);
        let amount = report.amount.unwrap();
        assert_eq!(b.player().entity.budget(), 80_000 + amount);
        assert_eq!(b.player().entity.completed_count(), 1);
        assert_eq!(report.achievements, vec![AchievementId::FirstDeal]);
    }

    #[test]
    fn collapsed_deal_moves_nothing() {
        let mut b = branch(3);
        b.rival = Rival::negotiator("seller", Style::Cunning);
        let report = b.play(NegotiationAction::Outsmart).unwrap();
        assert_eq!(report.outcome, Outcome::Collapsed);
        assert_eq!(report.amount, None);
        assert!(report.achievements.is_empty());
        assert_eq!(b.player().entity.budget(), 80_000);
        assert_eq!(b.player().entity.completed_count(), 0);
    }

    #[test]
    fn exit_blocks_further_rounds() {
        let mut b = branch(2);
        b.exit();
        assert_eq!(b.status(), BranchStatus::Exited);
        assert_eq!(
            b.play(NegotiationAction::WalkAway).unwrap_err(),
            RuntimeError::Core(CoreError::BranchOver)
        );
    }

    #[test]
    fn heavy_losses_end_in_bankruptcy() {
        let mut b = branch(4);
        let mut last = BranchStatus::Ongoing;
        for _ in 0..20 {
            b.rival = Rival::negotiator("seller", Style::Aggressive);
            last = b.play(NegotiationAction::GrabQuickly).unwrap().status;
            if last.is_over() {
                break;
            }
        }
        assert_eq!(last, BranchStatus::Bankrupt);
        assert_eq!(b.player().entity.budget(), 0);
    }
}
