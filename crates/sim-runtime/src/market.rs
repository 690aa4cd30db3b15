//! Branch 2: buying listed cars and reselling them against a market rival.
//!
//! The branch alternates between two phases. While scouting, the player sees
//! one listing and may buy or skip it. A bought car either sells at once or
//! freezes for a few turns; during the freeze the player waits, sells at cost
//! or dumps at a loss, while the rival works its own deal in parallel.

use crate::{ensure_ongoing, triggers, Branch, BranchStatus, RuntimeError};
use catalog::{Catalog, QualityTier};
use rand::Rng;
use sim_core::{AchievementId, BudgetChange, CoreError, Money, Player, ProjectTier, Rival, Style};
use sim_econ::{draw, market_edge, sample, sample_turns, GameRng, MarketEdge};
use std::sync::Arc;
use tracing::{debug, info};

/// A car on offer.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    /// Index into the catalog's quality tiers.
    pub quality: usize,
    pub name: String,
    pub price: Money,
    pub freeze_chance: f64,
}

/// A bought car waiting for a buyer.
#[derive(Clone, Debug)]
pub struct HeldDeal {
    pub listing: Listing,
    pub freeze_turns: u32,
    pub waited: u32,
    pub rival: Rival,
    /// Rival table talk shown before the next decision.
    pub hint: Option<&'static str>,
}

impl HeldDeal {
    pub fn remaining(&self) -> u32 {
        self.freeze_turns.saturating_sub(self.waited)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketAction {
    Buy,
    Skip,
    Wait,
    SellAtCost,
    Dump,
}

impl MarketAction {
    pub const SCOUTING: [MarketAction; 2] = [MarketAction::Buy, MarketAction::Skip];
    pub const HOLDING: [MarketAction; 3] = [MarketAction::Wait, MarketAction::SellAtCost, MarketAction::Dump];
}

#[derive(Clone, Debug, PartialEq)]
pub enum MarketEvent {
    Skipped,
    Bought { price: Money, change: BudgetChange },
    RivalEntered { name: String, style: Style, budget: Money },
    SoldImmediately,
    Frozen { turns: u32 },
    Waited { remaining: u32, rival_stage: Option<&'static str> },
    SoldAtCost { change: BudgetChange },
    Dumped { loss: Money, change: BudgetChange },
    Settled {
        base_profit: Money,
        profit: Money,
        edge: MarketEdge,
        change: BudgetChange,
    },
    RivalFinalized { name: String, profit: Money, budget: Money },
    NewListing(Listing),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarketReport {
    pub events: Vec<MarketEvent>,
    pub achievements: Vec<AchievementId>,
    pub status: BranchStatus,
}

#[derive(Clone, Debug)]
enum Phase {
    Scouting(Listing),
    Holding(Box<HeldDeal>),
}

pub struct MarketBranch {
    catalog: Arc<Catalog>,
    rng: GameRng,
    player: Player,
    phase: Phase,
    status: BranchStatus,
}

fn quality(catalog: &Catalog, index: usize) -> Result<&QualityTier, RuntimeError> {
    catalog
        .market
        .qualities
        .get(index)
        .ok_or_else(|| CoreError::UnknownTier(u8::try_from(index).unwrap_or(u8::MAX)).into())
}

fn draw_listing(rng: &mut GameRng, catalog: &Catalog) -> Result<Listing, RuntimeError> {
    let tiers = catalog.market.qualities.len().max(1);
    let index = rng.gen_range(0..tiers);
    let q = quality(catalog, index)?;
    Ok(Listing {
        quality: index,
        name: q.name.clone(),
        price: sample(rng, catalog.market.price)?,
        freeze_chance: q.freeze_chance,
    })
}

fn wrong_phase(action: MarketAction) -> RuntimeError {
    CoreError::UnknownAction(format!("{action:?} is not available right now")).into()
}

impl MarketBranch {
    pub fn new(name: impl Into<String>, catalog: Arc<Catalog>, mut rng: GameRng) -> Result<Self, RuntimeError> {
        let setup = catalog.branches.market;
        let listing = draw_listing(&mut rng, &catalog)?;
        Ok(Self {
            player: Player::new(name, setup.starting_budget, setup.win_target),
            catalog,
            rng,
            phase: Phase::Scouting(listing),
            status: BranchStatus::Ongoing,
        })
    }

    /// The car on offer, while scouting.
    pub fn listing(&self) -> Option<&Listing> {
        match &self.phase {
            Phase::Scouting(l) => Some(l),
            Phase::Holding(_) => None,
        }
    }

    /// The frozen deal, while holding.
    pub fn held(&self) -> Option<&HeldDeal> {
        match &self.phase {
            Phase::Holding(h) => Some(h),
            Phase::Scouting(_) => None,
        }
    }

    pub fn available_actions(&self) -> &'static [MarketAction] {
        match self.phase {
            Phase::Scouting(_) => &MarketAction::SCOUTING,
            Phase::Holding(_) => &MarketAction::HOLDING,
        }
    }

    pub fn act(&mut self, action: MarketAction) -> Result<MarketReport, RuntimeError> {
        ensure_ongoing(self.status)?;
        let mut report = MarketReport {
            events: Vec::new(),
            achievements: Vec::new(),
            status: self.status,
        };
        match action {
            MarketAction::Skip => {
                if !matches!(self.phase, Phase::Scouting(_)) {
                    return Err(wrong_phase(action));
                }
                report.events.push(MarketEvent::Skipped);
                self.scout(&mut report)?;
            }
            MarketAction::Buy => {
                let Phase::Scouting(listing) = &self.phase else {
                    return Err(wrong_phase(action));
                };
                let listing = listing.clone();
                self.buy(listing, &mut report)?;
            }
            MarketAction::Wait => {
                let Phase::Holding(held) = &mut self.phase else {
                    return Err(wrong_phase(action));
                };
                held.waited += 1;
                let stage = held.rival.progress_deal();
                report.events.push(MarketEvent::Waited {
                    remaining: held.remaining(),
                    rival_stage: stage.and_then(sim_ai::market_stage),
                });
                if held.remaining() == 0 {
                    let held = held.as_ref().clone();
                    self.settle(held, &mut report)?;
                } else {
                    held.hint = sim_ai::pressure_hint(&mut self.rng, &held.rival, self.catalog.market.hint_chance);
                }
            }
            MarketAction::SellAtCost => {
                let held = self.take_held(action)?;
                let change = self.player.entity.adjust_budget(held.listing.price);
                report.events.push(MarketEvent::SoldAtCost { change });
                info!(price = held.listing.price, "sold at cost");
                self.close(held.rival, &mut report)?;
            }
            MarketAction::Dump => {
                let held = self.take_held(action)?;
                let loss = sample(&mut self.rng, self.catalog.market.dump_loss)?;
                self.player.entity.adjust_budget(held.listing.price);
                let after = self.player.entity.adjust_budget(-loss);
                report.events.push(MarketEvent::Dumped {
                    loss,
                    change: BudgetChange {
                        delta: held.listing.price - loss,
                        ..after
                    },
                });
                report.achievements.push(triggers::risky_abort());
                info!(price = held.listing.price, loss, "dumped at a loss");
                self.close(held.rival, &mut report)?;
            }
        }
        report.status = self.status;
        Ok(report)
    }

    fn take_held(&self, action: MarketAction) -> Result<HeldDeal, RuntimeError> {
        match &self.phase {
            Phase::Holding(held) => Ok(held.as_ref().clone()),
            Phase::Scouting(_) => Err(wrong_phase(action)),
        }
    }

    fn scout(&mut self, report: &mut MarketReport) -> Result<(), RuntimeError> {
        let listing = draw_listing(&mut self.rng, &self.catalog)?;
        debug!(quality = listing.quality, price = listing.price, "new listing");
        report.events.push(MarketEvent::NewListing(listing.clone()));
        self.phase = Phase::Scouting(listing);
        Ok(())
    }

    fn buy(&mut self, listing: Listing, report: &mut MarketReport) -> Result<(), RuntimeError> {
        let change = self.player.entity.adjust_budget(-listing.price);
        report.events.push(MarketEvent::Bought {
            price: listing.price,
            change,
        });
        if self.player.entity.is_bankrupt() {
            self.status = BranchStatus::Bankrupt;
            return Ok(());
        }

        let rival = sim_ai::market_rival(&mut self.rng, &self.catalog)?;
        report.events.push(MarketEvent::RivalEntered {
            name: rival.entity.name.clone(),
            style: rival.style,
            budget: rival.entity.budget(),
        });
        let freeze = quality(&self.catalog, listing.quality)?.freeze;
        let mut held = HeldDeal {
            listing,
            freeze_turns: 0,
            waited: 0,
            rival,
            hint: None,
        };
        if draw(&mut self.rng) > held.listing.freeze_chance {
            report.events.push(MarketEvent::SoldImmediately);
            return self.settle(held, report);
        }
        held.freeze_turns = sample_turns(&mut self.rng, freeze)?;
        report.events.push(MarketEvent::Frozen {
            turns: held.freeze_turns,
        });
        if held.freeze_turns == 0 {
            return self.settle(held, report);
        }
        held.hint = sim_ai::pressure_hint(&mut self.rng, &held.rival, self.catalog.market.hint_chance);
        self.phase = Phase::Holding(Box::new(held));
        Ok(())
    }

    /// Pay out a held car: capital back plus profit adjusted for market edge.
    fn settle(&mut self, held: HeldDeal, report: &mut MarketReport) -> Result<(), RuntimeError> {
        let q = quality(&self.catalog, held.listing.quality)?;
        let base_profit = sample(&mut self.rng, q.profit)?;
        let (profit, edge) = market_edge(
            base_profit,
            self.player.entity.budget(),
            held.rival.entity.budget(),
            &self.catalog.market,
        );
        self.player.entity.adjust_budget(held.listing.price);
        let after = self.player.entity.adjust_budget(profit);
        self.player.entity.record_completed_deal(profit);
        let tier = (held.freeze_turns >= self.catalog.market.long_freeze_turns).then_some(ProjectTier::Long);
        report
            .achievements
            .extend(triggers::deal_closed(&self.player.entity, profit, tier));
        report.events.push(MarketEvent::Settled {
            base_profit,
            profit,
            edge,
            change: BudgetChange {
                delta: held.listing.price + profit,
                ..after
            },
        });
        info!(quality = held.listing.quality, profit, ?edge, "car sold");
        self.close(held.rival, report)
    }

    /// The rival wraps up its own deal; the branch then moves on.
    fn close(&mut self, mut rival: Rival, report: &mut MarketReport) -> Result<(), RuntimeError> {
        if let Some(range) = rival.market().map(|m| m.profit_range) {
            let profit = sample(&mut self.rng, range)?;
            rival.finalize_profit(profit);
            report.events.push(MarketEvent::RivalFinalized {
                name: rival.entity.name.clone(),
                profit,
                budget: rival.entity.budget(),
            });
        }
        self.status = BranchStatus::of(&self.player.entity);
        if self.status.is_over() {
            return Ok(());
        }
        self.scout(report)
    }
}

impl Branch for MarketBranch {
    fn title(&self) -> &'static str {
        "Branch 2: the resale market"
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
