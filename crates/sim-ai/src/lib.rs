#![deny(warnings)]

//! Rival behavior: generation per branch, table talk, and project planning.

use catalog::{Catalog, TierConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use sim_core::{Money, ProjectTier, Rival, Style};
use sim_econ::{sample, EconError};
use tracing::debug;

fn random_style<R: Rng + ?Sized>(rng: &mut R) -> Style {
    Style::ALL[rng.gen_range(0..Style::ALL.len())]
}

/// Flavor name of a negotiation counterpart.
pub fn negotiator_name(style: Style) -> &'static str {
    match style {
        Style::Calm => "calm reseller",
        Style::Cunning => "cunning flipper",
        Style::Aggressive => "aggressive haggler",
    }
}

pub fn trader_name(style: Style) -> &'static str {
    match style {
        Style::Calm => "cautious flipper",
        Style::Cunning => "seasoned market player",
        Style::Aggressive => "reckless risk-taker",
    }
}

pub fn project_maker_name(style: Style) -> &'static str {
    match style {
        Style::Calm => "careful project builder",
        Style::Cunning => "experienced market master",
        Style::Aggressive => "aggressive swap enthusiast",
    }
}

/// Short behavioral description shown when a negotiation starts.
pub fn describe_behavior(style: Style) -> &'static str {
    match style {
        Style::Calm => "speaks slowly and sticks to the listed price",
        Style::Cunning => "hides defects and changes terms mid-sentence",
        Style::Aggressive => "pushes hard and threatens to walk away",
    }
}

/// A fresh seller for one negotiation round.
pub fn negotiation_rival<R: Rng + ?Sized>(rng: &mut R) -> Rival {
    let style = random_style(rng);
    Rival::negotiator(negotiator_name(style), style)
}

/// A market competitor with a style-dependent profit range.
pub fn market_rival<R: Rng + ?Sized>(rng: &mut R, catalog: &Catalog) -> Result<Rival, EconError> {
    let style = random_style(rng);
    let budget = sample(rng, catalog.market.rival_budget)?;
    let range = catalog.market.rival_profit[style.index()];
    debug!(?style, budget, "market rival generated");
    Ok(Rival::trader(trader_name(style), style, budget, range))
}

/// The project-branch competitor, with an empty portfolio attached.
pub fn project_rival<R: Rng + ?Sized>(rng: &mut R, catalog: &Catalog) -> Result<Rival, EconError> {
    let style = random_style(rng);
    let budget = sample(rng, catalog.project_rival_budget)?;
    debug!(?style, budget, "project rival generated");
    Ok(Rival::project_maker(project_maker_name(style), style, budget))
}

const MARKET_HINTS: [[&str; 2]; 3] = [
    [
        "the rival notes: the market is starting to sag",
        "the rival says: cars like this can sit for weeks",
    ],
    [
        "the rival says: the market is unpredictable",
        "the rival remarks: sometimes waiting pays off",
    ],
    [
        "the rival pushes: time is money, the market won't wait",
        "the rival scoffs: I'd have dumped it and bought another",
    ],
];

/// Occasional psychological pressure from a market rival.
pub fn pressure_hint<R: Rng + ?Sized>(rng: &mut R, rival: &Rival, hint_chance: f64) -> Option<&'static str> {
    if rng.gen::<f64>() >= hint_chance {
        return None;
    }
    MARKET_HINTS[rival.style.index()].choose(rng).copied()
}

/// Stage label of a rival's market deal.
pub fn market_stage(stage: u8) -> Option<&'static str> {
    match stage {
        1 => Some("preparing the car"),
        2 => Some("viewings and calls"),
        3 => Some("haggling with a buyer"),
        _ => None,
    }
}

/// Trivial utility: higher is better.
pub fn utility(margin_per_turn: f32, risk_weight: f32) -> f32 {
    (margin_per_turn * 0.7) + (risk_weight * 0.3)
}

fn appetite(style: Style, tier: ProjectTier) -> f32 {
    // Margin is in thousands per turn; appetite is on the same scale.
    let table: [[f32; 3]; 3] = [[12.0, 0.0, -12.0], [-6.0, 12.0, -6.0], [-12.0, 0.0, 12.0]];
    table[style.index()][tier.code() as usize - 1]
}

/// Expected profit per frozen turn, in thousands.
fn margin_per_turn(cfg: &TierConfig) -> f32 {
    let profit = (cfg.profit.lo() + cfg.profit.hi()) as f32 / 2.0;
    let turns = (cfg.freeze.lo() + cfg.freeze.hi()) as f32 / 2.0;
    profit / turns.max(1.0) / 1_000.0
}

/// Style-weighted score of committing to a tier.
pub fn project_utility(style: Style, tier: ProjectTier, cfg: &TierConfig) -> f32 {
    utility(margin_per_turn(cfg), appetite(style, tier))
}

/// Pick the project a rival starts next, if any.
///
/// A rival keeps one project in flight at a time and only commits to tiers
/// whose worst-case price it can cover.
pub fn plan_project(rival: &Rival, catalog: &Catalog) -> Option<ProjectTier> {
    let portfolio = rival.portfolio()?;
    if !portfolio.is_empty() || rival.entity.is_bankrupt() {
        return None;
    }
    let budget: Money = rival.entity.budget();
    ProjectTier::ALL
        .into_iter()
        .filter(|t| catalog.projects.get(*t).buy.hi() < budget)
        .map(|t| (t, project_utility(rival.style, t, catalog.projects.get(t))))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, _)| t)
}
