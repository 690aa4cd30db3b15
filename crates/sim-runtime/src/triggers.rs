//! Achievement predicates over entity and deal state.
//!
//! Each predicate only decides; issuing is left to [`crate::dispatch`].

use sim_core::{AchievementId, EconomicEntity, Money, ProjectTier};

/// Single realized profit at or above this earns `big_profit`.
pub const BIG_PROFIT_THRESHOLD: Money = 100_000;
/// Completed deals needed for `ten_deals`.
pub const TEN_DEALS: usize = 10;

/// Fires only on the transition to exactly one completed deal.
pub fn first_deal(entity: &EconomicEntity) -> Option<AchievementId> {
    (entity.completed_count() == 1).then_some(AchievementId::FirstDeal)
}

pub fn ten_deals(entity: &EconomicEntity) -> Option<AchievementId> {
    (entity.completed_count() >= TEN_DEALS).then_some(AchievementId::TenDeals)
}

pub fn big_profit(amount: Money) -> Option<AchievementId> {
    (amount >= BIG_PROFIT_THRESHOLD).then_some(AchievementId::BigProfit)
}

pub fn long_project(tier: ProjectTier) -> Option<AchievementId> {
    tier.is_long().then_some(AchievementId::LongProject)
}

/// The caller already decided the abort was risky.
pub fn risky_abort() -> AchievementId {
    AchievementId::RiskyAbort
}

pub fn lucky_event() -> AchievementId {
    AchievementId::LuckyEvent
}

/// Everything a closed deal can earn, evaluated on post-close state.
pub fn deal_closed(entity: &EconomicEntity, profit: Money, tier: Option<ProjectTier>) -> Vec<AchievementId> {
    [
        first_deal(entity),
        ten_deals(entity),
        tier.and_then(long_project),
        big_profit(profit),
    ]
    .into_iter()
    .flatten()
    .collect()
}
