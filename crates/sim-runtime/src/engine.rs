//! Turn engine for the project branch.
//!
//! One [`TurnEngine::tick`] per round: advance every deal, settle what
//! matured, and report the achievements earned along the way. Starting and
//! abandoning projects happen between ticks.

use crate::{triggers, RuntimeError};
use catalog::Catalog;
use rand::Rng;
use sim_core::{
    AchievementId, BehaviorProfile, BudgetChange, CoreError, Deal, DealId, EconomicEntity, Money, Player, Portfolio, ProjectTier,
    Rival, Role,
};
use sim_econ::{roll_event, sample, sample_turns, EventKind, RolledEvent};
use tracing::{debug, info};

/// A deal that matured and was paid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub deal: Deal,
    /// Profit drawn from the tier range, before the deal's bonus.
    pub base_profit: Money,
    /// Realized profit: base plus bonus.
    pub profit: Money,
    /// Budget movement from applying the realized profit.
    pub change: BudgetChange,
    pub achievements: Vec<AchievementId>,
}

/// Everything that happened in one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub turn: u32,
    pub player: Vec<Settlement>,
    pub rival: Vec<Settlement>,
}

impl TickReport {
    pub fn achievements(&self) -> Vec<AchievementId> {
        self.player.iter().flat_map(|s| s.achievements.iter().copied()).collect()
    }
}

/// A freshly committed project, after its creation event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectStart {
    pub deal: Deal,
    pub event: Option<RolledEvent>,
    pub change: BudgetChange,
    pub achievements: Vec<AchievementId>,
}

/// A project sold off before maturity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Abandonment {
    pub deal: Deal,
    pub loss: Money,
    pub change: BudgetChange,
    pub achievements: Vec<AchievementId>,
}

/// Owns the authoritative turn counter of a project branch.
#[derive(Clone, Debug, Default)]
pub struct TurnEngine {
    turn: u32,
}

impl TurnEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks completed so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Advance both portfolios one turn and settle matured deals.
    ///
    /// Player settlements evaluate achievements on the post-settlement
    /// state; rival settlements never do.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
        player: &mut Player,
        rival: &mut Rival,
    ) -> Result<TickReport, RuntimeError> {
        self.turn += 1;
        let (entity, portfolio) = player.parts_mut();
        portfolio.advance_all();
        let Rival {
            entity: rival_entity,
            profile,
            ..
        } = rival;
        if let BehaviorProfile::Projects(p) = profile {
            p.advance_all();
        }

        let player_settled = settle_matured(catalog, rng, entity, portfolio)?;
        let rival_settled = match profile {
            BehaviorProfile::Projects(p) => settle_matured(catalog, rng, rival_entity, p)?,
            _ => Vec::new(),
        };
        debug!(turn = self.turn, player = player_settled.len(), rival = rival_settled.len(), "tick settled");
        Ok(TickReport {
            turn: self.turn,
            player: player_settled,
            rival: rival_settled,
        })
    }

    /// Commit the player to a new project of `tier`.
    pub fn start_project<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
        player: &mut Player,
        tier: ProjectTier,
    ) -> Result<ProjectStart, RuntimeError> {
        let (entity, portfolio) = player.parts_mut();
        let mut start = commit(catalog, rng, entity, portfolio, tier)?;
        if matches!(start.event, Some(e) if e.kind == EventKind::Boost) {
            start.achievements.push(triggers::lucky_event());
        }
        info!(deal = %start.deal.id, ?tier, price = start.deal.purchase_price, "project started");
        Ok(start)
    }

    /// Let the rival plan and commit its next project, if it wants one.
    pub fn rival_commit<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
        rival: &mut Rival,
    ) -> Result<Option<ProjectStart>, RuntimeError> {
        let Some(tier) = sim_ai::plan_project(rival, catalog) else {
            return Ok(None);
        };
        let Rival { entity, profile, .. } = rival;
        let BehaviorProfile::Projects(portfolio) = profile else {
            return Ok(None);
        };
        let start = commit(catalog, rng, entity, portfolio, tier)?;
        debug!(rival = %entity.name, ?tier, deal = %start.deal.id, "rival committed");
        Ok(Some(start))
    }

    /// Sell an in-flight project early at a sampled loss. The purchase price
    /// stays spent.
    pub fn abandon_project<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        rng: &mut R,
        player: &mut Player,
        id: DealId,
    ) -> Result<Abandonment, RuntimeError> {
        let (entity, portfolio) = player.parts_mut();
        if portfolio.is_empty() {
            return Err(CoreError::EmptyPortfolio.into());
        }
        if !portfolio.contains(id) {
            return Err(CoreError::DealNotFound(id).into());
        }
        let loss = sample(rng, catalog.abandon_loss)?;
        let deal = portfolio.remove(id).ok_or(CoreError::DealNotFound(id))?;
        let change = entity.adjust_budget(-loss);
        info!(deal = %deal.id, loss, "project abandoned");
        Ok(Abandonment {
            deal,
            loss,
            change,
            achievements: vec![triggers::risky_abort()],
        })
    }
}

/// Pay for a project, roll its creation event and file it.
fn commit<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
    entity: &mut EconomicEntity,
    portfolio: &mut Portfolio,
    tier: ProjectTier,
) -> Result<ProjectStart, RuntimeError> {
    let cfg = catalog.projects.get(tier);
    let price = sample(rng, cfg.buy)?;
    let duration = sample_turns(rng, cfg.freeze)?.max(1);
    let change = entity.adjust_budget(-price);
    let mut deal = Deal::new(portfolio.next_id(), tier, entity.role, price, duration);
    let event = roll_event(rng, &catalog.events)?;
    if let Some(e) = event {
        deal.apply_event(e.turns_delta, e.bonus);
    }
    portfolio.add(deal.clone());
    Ok(ProjectStart {
        deal,
        event,
        change,
        achievements: Vec::new(),
    })
}

fn settle_matured<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
    entity: &mut EconomicEntity,
    portfolio: &mut Portfolio,
) -> Result<Vec<Settlement>, RuntimeError> {
    let ready: Vec<DealId> = portfolio.matured().map(|d| d.id).collect();
    let mut settled = Vec::with_capacity(ready.len());
    for id in ready {
        let Some(tier) = portfolio.get(id).map(|d| d.tier) else {
            continue;
        };
        let base_profit = sample(rng, catalog.projects.get(tier).profit)?;
        let Some(deal) = portfolio.finish(id) else {
            continue;
        };
        let profit = base_profit + deal.bonus();
        let change = entity.adjust_budget(profit);
        entity.record_completed_deal(profit);
        let achievements = match entity.role {
            Role::Human => triggers::deal_closed(entity, profit, Some(deal.tier)),
            Role::Rival => Vec::new(),
        };
        settled.push(Settlement {
            change,
            deal,
            base_profit,
            profit,
            achievements,
        });
    }
    Ok(settled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::Style;
    use sim_econ::seeded_rng;

    fn player(budget: i64) -> Player {
        Player::new("player", budget, 900_000)
    }

    fn idle_rival() -> Rival {
        Rival::project_maker("rival", Style::Calm, 0)
    }

    fn no_events() -> Catalog {
        let mut c = Catalog::default();
        c.events.boost_below = 0.0;
        c.events.delay_below = 0.0;
        c
    }

    fn put(player: &mut Player, tier: ProjectTier, price: i64, duration: u32, bonus: i64) -> DealId {
        let (_, portfolio) = player.parts_mut();
        let mut deal = Deal::new(portfolio.next_id(), tier, Role::Human, price, duration);
        deal.apply_event(0, bonus);
        let id = deal.id;
        portfolio.add(deal);
        id
    }

    #[test]
    fn long_project_matures_after_five_ticks() {
        let c = no_events();
        let mut rng = seeded_rng(Some(3));
        let mut p = player(300_000);
        let mut r = idle_rival();
        let mut engine = TurnEngine::new();
        put(&mut p, ProjectTier::Long, 150_000, 5, 0);
        for _ in 0..4 {
            let report = engine.tick(&c, &mut rng, &mut p, &mut r).unwrap();
            assert!(report.player.is_empty());
        }
        let report = engine.tick(&c, &mut rng, &mut p, &mut r).unwrap();
        assert_eq!(engine.turn(), 5);
        assert_eq!(report.player.len(), 1);
        let s = &report.player[0];
        assert!(c.projects.long.profit.contains(s.profit));
        assert_eq!(p.entity.budget(), 300_000 + s.profit);
        assert_eq!(p.entity.completed_count(), 1);
        assert!(s.achievements.contains(&AchievementId::FirstDeal));
        assert!(s.achievements.contains(&AchievementId::LongProject));
        assert_eq!(s.achievements.contains(&AchievementId::BigProfit), s.profit >= 100_000);
        assert!(p.portfolio().unwrap().is_empty());
    }

    #[test]
    fn bonus_is_added_to_realized_profit() {
        let mut c = no_events();
        c.projects.quick.profit = sim_core::Span::new(10_000, 10_000);
        let mut rng = seeded_rng(Some(9));
        let mut p = player(100_000);
        let mut r = idle_rival();
        put(&mut p, ProjectTier::Quick, 70_000, 1, 20_000);
        let report = TurnEngine::new().tick(&c, &mut rng, &mut p, &mut r).unwrap();
        let s = &report.player[0];
        assert_eq!(s.base_profit, 10_000);
        assert_eq!(s.profit, 30_000);
        assert_eq!(p.entity.completed_deals(), &[30_000]);
        assert_eq!(p.entity.budget(), 130_000);
        assert_eq!(s.change.delta, 30_000);
    }

    #[test]
    fn abandonment_takes_loss_and_fires_risky_abort() {
        let mut c = no_events();
        c.abandon_loss = sim_core::Span::new(15_000, 15_000);
        let mut rng = seeded_rng(Some(1));
        let mut p = player(50_000);
        let id = put(&mut p, ProjectTier::Medium, 100_000, 3, 0);
        let out = TurnEngine::new().abandon_project(&c, &mut rng, &mut p, id).unwrap();
        assert_eq!(out.loss, 15_000);
        assert_eq!(out.achievements, vec![AchievementId::RiskyAbort]);
        assert_eq!(p.entity.budget(), 35_000);
        assert_eq!(out.change.delta, -15_000);
        assert_eq!(p.entity.completed_count(), 0);
        assert!(p.portfolio().unwrap().is_empty());
    }

    #[test]
    fn abandonment_loss_can_bankrupt() {
        let mut c = no_events();
        c.abandon_loss = sim_core::Span::new(20_000, 20_000);
        let mut rng = seeded_rng(Some(4));
        let mut p = player(10_000);
        let id = put(&mut p, ProjectTier::Long, 200_000, 5, 0);
        let out = TurnEngine::new().abandon_project(&c, &mut rng, &mut p, id).unwrap();
        assert!(out.change.went_bankrupt);
        assert_eq!(p.entity.budget(), 0);
        assert!(p.entity.is_bankrupt());
    }

    #[test]
    fn abandon_rejects_unknown_and_empty() {
        let c = no_events();
        let mut rng = seeded_rng(Some(1));
        let mut p = player(50_000);
        let mut engine = TurnEngine::new();
        assert!(matches!(
            engine.abandon_project(&c, &mut rng, &mut p, DealId(1)),
            Err(RuntimeError::Core(CoreError::EmptyPortfolio))
        ));
        put(&mut p, ProjectTier::Quick, 60_000, 1, 0);
        assert!(matches!(
            engine.abandon_project(&c, &mut rng, &mut p, DealId(99)),
            Err(RuntimeError::Core(CoreError::DealNotFound(DealId(99))))
        ));
    }

    #[test]
    fn boost_event_grants_lucky_event() {
        let mut c = Catalog::default();
        c.events.boost_below = 1.0;
        c.events.delay_below = 1.0;
        let mut rng = seeded_rng(Some(5));
        let mut p = player(300_000);
        let start = TurnEngine::new().start_project(&c, &mut rng, &mut p, ProjectTier::Quick).unwrap();
        let event = start.event.unwrap();
        assert_eq!(event.kind, EventKind::Boost);
        assert!(start.deal.duration() >= 1);
        assert!(c.events.boost_bonus.contains(start.deal.bonus()));
        assert_eq!(start.achievements, vec![AchievementId::LuckyEvent]);
        assert_eq!(p.entity.budget(), 300_000 - start.deal.purchase_price);
        assert_eq!(p.portfolio().unwrap().len(), 1);
    }

    #[test]
    fn delay_event_extends_and_penalizes() {
        let mut c = Catalog::default();
        c.events.boost_below = 0.0;
        c.events.delay_below = 1.0;
        c.projects.medium.freeze = sim_core::Span::new(2, 2);
        let mut rng = seeded_rng(Some(5));
        let mut p = player(300_000);
        let start = TurnEngine::new().start_project(&c, &mut rng, &mut p, ProjectTier::Medium).unwrap();
        assert_eq!(start.deal.duration(), 3);
        assert!(start.deal.bonus() <= -5_000 && start.deal.bonus() >= -15_000);
        assert!(start.achievements.is_empty());
    }

    #[test]
    fn overpriced_start_bankrupts() {
        let c = no_events();
        let mut rng = seeded_rng(Some(2));
        let mut p = player(10_000);
        let start = TurnEngine::new().start_project(&c, &mut rng, &mut p, ProjectTier::Quick).unwrap();
        assert!(start.change.went_bankrupt);
        assert!(p.entity.is_bankrupt());
    }

    #[test]
    fn rival_settles_without_achievements() {
        let c = no_events();
        let mut rng = seeded_rng(Some(11));
        let mut p = player(300_000);
        let mut r = Rival::project_maker("rival", Style::Calm, 250_000);
        let mut engine = TurnEngine::new();
        let start = engine.rival_commit(&c, &mut rng, &mut r).unwrap().unwrap();
        assert_eq!(start.deal.tier, ProjectTier::Quick);
        assert_eq!(start.deal.owner, Role::Rival);
        assert!(engine.rival_commit(&c, &mut rng, &mut r).unwrap().is_none());
        let mut rival_settled = Vec::new();
        for _ in 0..start.deal.duration() {
            rival_settled.extend(engine.tick(&c, &mut rng, &mut p, &mut r).unwrap().rival);
        }
        assert_eq!(rival_settled.len(), 1);
        assert!(rival_settled[0].achievements.is_empty());
        assert_eq!(r.entity.completed_count(), 1);
        assert!(r.portfolio().unwrap().is_empty());
    }
}
