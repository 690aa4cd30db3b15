#![deny(warnings)]

//! Versionable configuration tables for every branch of the game.
//!
//! `Catalog::default()` carries the built-in balance; a YAML file with the
//! same shape can replace it without recompiling (see `assets/catalog.yaml`).

use serde::{Deserialize, Serialize};
use sim_core::{Money, ProjectTier, Span, Style};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid yaml: {0}")]
    InvalidYaml(String),
    #[error("invalid table {table}: {reason}")]
    Invalid { table: &'static str, reason: String },
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogError::InvalidYaml(e.to_string())
    }
}

/// Starting conditions of a branch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchSetup {
    pub starting_budget: Money,
    pub win_target: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchSetups {
    pub negotiation: BranchSetup,
    pub market: BranchSetup,
    pub projects: BranchSetup,
}

/// Ranges for one project tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub name: String,
    pub buy: Span<Money>,
    pub profit: Span<Money>,
    pub freeze: Span<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectTable {
    pub quick: TierConfig,
    pub medium: TierConfig,
    pub long: TierConfig,
}

impl ProjectTable {
    pub fn get(&self, tier: ProjectTier) -> &TierConfig {
        match tier {
            ProjectTier::Quick => &self.quick,
            ProjectTier::Medium => &self.medium,
            ProjectTier::Long => &self.long,
        }
    }
}

/// Thresholds and magnitudes of the one-off project events.
///
/// A uniform draw below `boost_below` boosts the deal; a draw in
/// `[boost_below, delay_below)` delays it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    pub boost_below: f64,
    pub delay_below: f64,
    pub boost_turns: i32,
    pub delay_turns: i32,
    pub boost_bonus: Span<Money>,
    pub delay_penalty: Span<Money>,
}

/// Player strategies in the negotiation branch, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationAction {
    HardBargain,
    GrabQuickly,
    Outsmart,
    WalkAway,
}

impl NegotiationAction {
    pub const ALL: [NegotiationAction; 4] = [
        NegotiationAction::HardBargain,
        NegotiationAction::GrabQuickly,
        NegotiationAction::Outsmart,
        NegotiationAction::WalkAway,
    ];

    pub fn from_code(code: u8) -> Option<NegotiationAction> {
        NegotiationAction::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    pub fn index(self) -> usize {
        match self {
            NegotiationAction::HardBargain => 0,
            NegotiationAction::GrabQuickly => 1,
            NegotiationAction::Outsmart => 2,
            NegotiationAction::WalkAway => 3,
        }
    }
}

/// Financial outcome class of a negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Collapsed,
    SmallGain,
    SolidProfit,
    SmallLoss,
    HeavyLoss,
    Jackpot,
    Flat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeValues {
    pub small_gain: Span<Money>,
    pub solid_profit: Span<Money>,
    pub small_loss: Span<Money>,
    pub heavy_loss: Span<Money>,
    pub jackpot: Span<Money>,
    pub flat: Span<Money>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationTable {
    /// Rows by action, columns by rival style.
    pub matrix: [[Outcome; 3]; 4],
    pub values: OutcomeValues,
}

impl NegotiationTable {
    pub fn outcome(&self, action: NegotiationAction, style: Style) -> Outcome {
        self.matrix[action.index()][style.index()]
    }

    /// Money range for an outcome; a collapsed deal moves no money.
    pub fn range(&self, outcome: Outcome) -> Option<Span<Money>> {
        let v = &self.values;
        match outcome {
            Outcome::Collapsed => None,
            Outcome::SmallGain => Some(v.small_gain),
            Outcome::SolidProfit => Some(v.solid_profit),
            Outcome::SmallLoss => Some(v.small_loss),
            Outcome::HeavyLoss => Some(v.heavy_loss),
            Outcome::Jackpot => Some(v.jackpot),
            Outcome::Flat => Some(v.flat),
        }
    }
}

/// One car quality grade of the market branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityTier {
    pub name: String,
    pub freeze_chance: f64,
    pub freeze: Span<u32>,
    pub profit: Span<Money>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketTable {
    pub price: Span<Money>,
    pub qualities: Vec<QualityTier>,
    pub rival_budget: Span<Money>,
    /// Rival profit range, indexed by style.
    pub rival_profit: [Span<Money>; 3],
    pub dump_loss: Span<Money>,
    /// Percentage applied to the player's profit when the rival is richer.
    pub rival_edge_pct: Money,
    /// Percentage applied when the player is richer.
    pub player_edge_pct: Money,
    pub hint_chance: f64,
    /// A freeze at least this long counts as a long project.
    pub long_freeze_turns: u32,
}

/// All tables consumed by the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub branches: BranchSetups,
    pub projects: ProjectTable,
    pub events: EventTable,
    pub abandon_loss: Span<Money>,
    pub project_rival_budget: Span<Money>,
    pub negotiation: NegotiationTable,
    pub market: MarketTable,
}

fn tier(name: &str, buy: (Money, Money), profit: (Money, Money), freeze: (u32, u32)) -> TierConfig {
    TierConfig {
        name: name.to_string(),
        buy: Span::new(buy.0, buy.1),
        profit: Span::new(profit.0, profit.1),
        freeze: Span::new(freeze.0, freeze.1),
    }
}

fn quality(name: &str, chance: f64, freeze: (u32, u32), profit: (Money, Money)) -> QualityTier {
    QualityTier {
        name: name.to_string(),
        freeze_chance: chance,
        freeze: Span::new(freeze.0, freeze.1),
        profit: Span::new(profit.0, profit.1),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        use Outcome::*;
        Self {
            branches: BranchSetups {
                negotiation: BranchSetup {
                    starting_budget: 80_000,
                    win_target: 150_000,
                },
                market: BranchSetup {
                    starting_budget: 150_000,
                    win_target: 350_000,
                },
                projects: BranchSetup {
                    starting_budget: 300_000,
                    win_target: 900_000,
                },
            },
            projects: ProjectTable {
                quick: tier("quick project: light touch-up", (60_000, 90_000), (8_000, 25_000), (1, 2)),
                medium: tier("medium project: restoration", (90_000, 140_000), (20_000, 50_000), (2, 4)),
                long: tier("long project: engine swap", (120_000, 200_000), (45_000, 120_000), (3, 6)),
            },
            events: EventTable {
                boost_below: 0.06,
                delay_below: 0.18,
                boost_turns: -1,
                delay_turns: 1,
                boost_bonus: Span::new(15_000, 40_000),
                delay_penalty: Span::new(5_000, 15_000),
            },
            abandon_loss: Span::new(8_000, 20_000),
            project_rival_budget: Span::new(150_000, 300_000),
            negotiation: NegotiationTable {
                matrix: [
                    [SolidProfit, SmallGain, SmallLoss],
                    [Flat, SmallGain, HeavyLoss],
                    [SmallGain, Collapsed, HeavyLoss],
                    [Flat, SolidProfit, Collapsed],
                ],
                values: OutcomeValues {
                    small_gain: Span::new(3_000, 10_000),
                    solid_profit: Span::new(12_000, 30_000),
                    small_loss: Span::new(-8_000, -3_000),
                    heavy_loss: Span::new(-30_000, -15_000),
                    jackpot: Span::new(35_000, 65_000),
                    flat: Span::new(-2_000, 2_000),
                },
            },
            market: MarketTable {
                price: Span::new(80_000, 160_000),
                qualities: vec![
                    quality("wreck with risks", 0.25, (0, 1), (-15_000, 5_000)),
                    quality("tired budget car", 0.45, (1, 2), (-5_000, 12_000)),
                    quality("mid-market car", 0.65, (1, 3), (3_000, 25_000)),
                    quality("well-kept car", 0.80, (2, 4), (10_000, 40_000)),
                    quality("rare liquid gem", 0.92, (3, 5), (25_000, 70_000)),
                ],
                rival_budget: Span::new(120_000, 190_000),
                rival_profit: [
                    Span::new(-5_000, 20_000),
                    Span::new(-15_000, 40_000),
                    Span::new(-40_000, 90_000),
                ],
                dump_loss: Span::new(5_000, 20_000),
                rival_edge_pct: 85,
                player_edge_pct: 110,
                hint_chance: 0.35,
                long_freeze_turns: 3,
            },
        }
    }
}

fn check_money(table: &'static str, span: &Span<Money>) -> Result<(), CatalogError> {
    if !span.is_ordered() {
        return Err(CatalogError::Invalid {
            table,
            reason: format!("inverted range [{}, {}]", span.lo(), span.hi()),
        });
    }
    Ok(())
}

fn check_turns(table: &'static str, span: &Span<u32>) -> Result<(), CatalogError> {
    if !span.is_ordered() {
        return Err(CatalogError::Invalid {
            table,
            reason: format!("inverted turn range [{}, {}]", span.lo(), span.hi()),
        });
    }
    Ok(())
}

fn check_probability(table: &'static str, p: f64) -> Result<(), CatalogError> {
    if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
        return Err(CatalogError::Invalid {
            table,
            reason: format!("probability {p} outside [0,1]"),
        });
    }
    Ok(())
}

impl Catalog {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_yaml_str(&text)?;
        info!(path = %path.as_ref().display(), "catalog loaded");
        Ok(catalog)
    }

    /// Built-in tables unless a path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for setup in [&self.branches.negotiation, &self.branches.market, &self.branches.projects] {
            if setup.starting_budget <= 0 || setup.win_target <= setup.starting_budget {
                return Err(CatalogError::Invalid {
                    table: "branches",
                    reason: format!(
                        "start {} must be positive and below target {}",
                        setup.starting_budget, setup.win_target
                    ),
                });
            }
        }
        for t in ProjectTier::ALL {
            let cfg = self.projects.get(t);
            check_money("projects", &cfg.buy)?;
            check_money("projects", &cfg.profit)?;
            check_turns("projects", &cfg.freeze)?;
            if cfg.freeze.lo() == 0 {
                return Err(CatalogError::Invalid {
                    table: "projects",
                    reason: format!("{} must freeze for at least one turn", cfg.name),
                });
            }
        }
        check_probability("events", self.events.boost_below)?;
        check_probability("events", self.events.delay_below)?;
        if self.events.boost_below > self.events.delay_below {
            return Err(CatalogError::Invalid {
                table: "events",
                reason: "boost threshold above delay threshold".into(),
            });
        }
        check_money("events", &self.events.boost_bonus)?;
        check_money("events", &self.events.delay_penalty)?;
        check_money("abandon_loss", &self.abandon_loss)?;
        check_money("project_rival_budget", &self.project_rival_budget)?;
        let v = &self.negotiation.values;
        for span in [&v.small_gain, &v.solid_profit, &v.small_loss, &v.heavy_loss, &v.jackpot, &v.flat] {
            check_money("negotiation", span)?;
        }
        let m = &self.market;
        if m.qualities.is_empty() {
            return Err(CatalogError::Invalid {
                table: "market",
                reason: "no quality tiers".into(),
            });
        }
        check_money("market", &m.price)?;
        check_money("market", &m.rival_budget)?;
        check_money("market", &m.dump_loss)?;
        for span in &m.rival_profit {
            check_money("market", span)?;
        }
        for q in &m.qualities {
            check_probability("market", q.freeze_chance)?;
            check_turns("market", &q.freeze)?;
            check_money("market", &q.profit)?;
        }
        check_probability("market", m.hint_chance)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_are_valid() {
        Catalog::default().validate().unwrap();
    }

    #[test]
    fn shipped_yaml_matches_defaults() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/catalog.yaml");
        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded, Catalog::default());
    }

    #[test]
    fn yaml_roundtrip() {
        let text = Catalog::default().to_yaml().unwrap();
        let back = Catalog::from_yaml_str(&text).unwrap();
        assert_eq!(back, Catalog::default());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut c = Catalog::default();
        c.projects.long.profit = Span::new(120_000, 45_000);
        let err = c.validate().unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { table: "projects", .. }));
    }

    #[test]
    fn crossed_event_thresholds_are_rejected() {
        let mut c = Catalog::default();
        c.events.boost_below = 0.5;
        c.events.delay_below = 0.2;
        assert!(c.validate().is_err());
    }

    #[test]
    fn negotiation_matrix_lookup() {
        let c = Catalog::default();
        let n = &c.negotiation;
        assert_eq!(n.outcome(NegotiationAction::HardBargain, Style::Calm), Outcome::SolidProfit);
        assert_eq!(n.outcome(NegotiationAction::Outsmart, Style::Cunning), Outcome::Collapsed);
        assert_eq!(n.outcome(NegotiationAction::WalkAway, Style::Aggressive), Outcome::Collapsed);
        assert_eq!(n.range(Outcome::Collapsed), None);
        assert_eq!(n.range(Outcome::HeavyLoss), Some(Span::new(-30_000, -15_000)));
    }

    #[test]
    fn action_codes_are_one_based() {
        assert_eq!(NegotiationAction::from_code(1), Some(NegotiationAction::HardBargain));
        assert_eq!(NegotiationAction::from_code(4), Some(NegotiationAction::WalkAway));
        assert_eq!(NegotiationAction::from_code(0), None);
        assert_eq!(NegotiationAction::from_code(5), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Catalog::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
