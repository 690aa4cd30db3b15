//! Branch 3: a portfolio of restoration projects raced against a rival.

use crate::engine::{Abandonment, ProjectStart, TickReport, TurnEngine};
use crate::{ensure_ongoing, Branch, BranchStatus, RuntimeError};
use catalog::Catalog;
use sim_core::{AchievementId, DealId, Player, ProjectTier, Rival};
use sim_econ::GameRng;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectAction {
    Start(ProjectTier),
    Abandon(DealId),
    Wait,
}

/// What one step of the branch produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectReport {
    Tick {
        tick: TickReport,
        /// The rival's new project, if it committed to one.
        rival_start: Option<ProjectStart>,
        status: BranchStatus,
    },
    Started { start: ProjectStart, status: BranchStatus },
    Abandoned { abandonment: Abandonment, status: BranchStatus },
    Waited { status: BranchStatus },
}

impl ProjectReport {
    /// Achievements the player earned in this step.
    pub fn achievements(&self) -> Vec<AchievementId> {
        match self {
            ProjectReport::Tick { tick, .. } => tick.achievements(),
            ProjectReport::Started { start, .. } => start.achievements.clone(),
            ProjectReport::Abandoned { abandonment, .. } => abandonment.achievements.clone(),
            ProjectReport::Waited { .. } => Vec::new(),
        }
    }

    pub fn status(&self) -> BranchStatus {
        match self {
            ProjectReport::Tick { status, .. }
            | ProjectReport::Started { status, .. }
            | ProjectReport::Abandoned { status, .. }
            | ProjectReport::Waited { status } => *status,
        }
    }
}

/// Each round is a tick followed by one player action.
pub struct ProjectBranch {
    catalog: Arc<Catalog>,
    rng: GameRng,
    engine: TurnEngine,
    player: Player,
    rival: Rival,
    status: BranchStatus,
}

impl ProjectBranch {
    pub fn new(name: impl Into<String>, catalog: Arc<Catalog>, mut rng: GameRng) -> Result<Self, RuntimeError> {
        let setup = catalog.branches.projects;
        let rival = sim_ai::project_rival(&mut rng, &catalog)?;
        let mut player = Player::new(name, setup.starting_budget, setup.win_target);
        player.portfolio_mut();
        info!(rival = %rival.entity.name, budget = rival.entity.budget(), "project branch opened");
        Ok(Self {
            catalog,
            rng,
            engine: TurnEngine::new(),
            player,
            rival,
            status: BranchStatus::Ongoing,
        })
    }

    pub fn turn(&self) -> u32 {
        self.engine.turn()
    }

    pub fn rival(&self) -> &Rival {
        &self.rival
    }

    /// Advance the world one turn; the rival may then commit to a project.
    pub fn next_turn(&mut self) -> Result<ProjectReport, RuntimeError> {
        ensure_ongoing(self.status)?;
        let tick = self
            .engine
            .tick(&self.catalog, &mut self.rng, &mut self.player, &mut self.rival)?;
        self.status = BranchStatus::of(&self.player.entity);
        let rival_start = if self.status.is_over() {
            None
        } else {
            self.engine.rival_commit(&self.catalog, &mut self.rng, &mut self.rival)?
        };
        Ok(ProjectReport::Tick {
            tick,
            rival_start,
            status: self.status,
        })
    }

    pub fn act(&mut self, action: ProjectAction) -> Result<ProjectReport, RuntimeError> {
        ensure_ongoing(self.status)?;
        let report = match action {
            ProjectAction::Start(tier) => {
                let start = self
                    .engine
                    .start_project(&self.catalog, &mut self.rng, &mut self.player, tier)?;
                self.status = BranchStatus::of(&self.player.entity);
                ProjectReport::Started {
                    start,
                    status: self.status,
                }
            }
            ProjectAction::Abandon(id) => {
                let abandonment = self
                    .engine
                    .abandon_project(&self.catalog, &mut self.rng, &mut self.player, id)?;
                self.status = BranchStatus::of(&self.player.entity);
                ProjectReport::Abandoned {
                    abandonment,
                    status: self.status,
                }
            }
            ProjectAction::Wait => ProjectReport::Waited { status: self.status },
        };
        Ok(report)
    }
}

impl Branch for ProjectBranch {
    fn title(&self) -> &'static str {
        "Branch 3: the project garage"
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
    use sim_core::{CoreError, Span};
    use sim_econ::seeded_rng;

    fn quiet_catalog() -> Catalog {
        let mut c = Catalog::default();
        c.events.boost_below = 0.0;
        c.events.delay_below = 0.0;
        c
    }

    fn branch(catalog: Catalog, seed: u64) -> ProjectBranch {
        ProjectBranch::new("alice", Arc::new(catalog), seeded_rng(Some(seed))).unwrap()
    }

    #[test]
    fn opens_with_empty_portfolio() {
        let b = branch(Catalog::default(), 1);
        assert_eq!(b.player().entity.budget(), 300_000);
        assert!(b.player().portfolio().unwrap().is_empty());
        assert_eq!(b.turn(), 0);
        assert!(b.rival().portfolio().is_some());
    }

    #[test]
    fn rival_commits_after_first_tick() {
        let mut b = branch(quiet_catalog(), 2);
        let report = b.next_turn().unwrap();
        let ProjectReport::Tick { rival_start, .. } = report else {
            panic!("expected a tick");
        };
        let start = rival_start.unwrap();
        assert!(start.achievements.is_empty());
        assert_eq!(b.rival().portfolio().unwrap().len(), 1);
        assert_eq!(b.turn(), 1);
    }

    #[test]
    fn started_project_pays_out_after_its_freeze() {
        let mut c = quiet_catalog();
        c.projects.long.freeze = Span::new(5, 5);
        c.projects.long.buy = Span::new(150_000, 150_000);
        let mut b = branch(c, 3);
        let started = b.act(ProjectAction::Start(ProjectTier::Long)).unwrap();
        assert_eq!(started.status(), BranchStatus::Ongoing);
        assert_eq!(b.player().entity.budget(), 150_000);

        let mut earned = Vec::new();
        for _ in 0..5 {
            earned.extend(b.next_turn().unwrap().achievements());
        }
        assert!(earned.contains(&AchievementId::FirstDeal));
        assert!(earned.contains(&AchievementId::LongProject));
        assert!(b.player().portfolio().unwrap().is_empty());
        assert!((150_000 + 45_000..=150_000 + 120_000).contains(&b.player().entity.budget()));
    }

    #[test]
    fn abandoning_past_the_budget_ends_the_branch() {
        let mut c = quiet_catalog();
        c.projects.long.buy = Span::new(290_000, 290_000);
        c.abandon_loss = Span::new(20_000, 20_000);
        let mut b = branch(c, 6);
        let ProjectReport::Started { start, .. } = b.act(ProjectAction::Start(ProjectTier::Long)).unwrap() else {
            panic!("expected a start");
        };
        assert_eq!(b.player().entity.budget(), 10_000);
        let report = b.act(ProjectAction::Abandon(start.deal.id)).unwrap();
        assert_eq!(report.status(), BranchStatus::Bankrupt);
        assert!(report.achievements().contains(&AchievementId::RiskyAbort));
        assert!(b.player().entity.is_bankrupt());
        assert!(b.next_turn().is_err());
    }

    #[test]
    fn abandon_unknown_deal_is_an_error() {
        let mut b = branch(quiet_catalog(), 4);
        b.act(ProjectAction::Start(ProjectTier::Quick)).unwrap();
        assert_eq!(
            b.act(ProjectAction::Abandon(DealId(42))).unwrap_err(),
            RuntimeError::Core(CoreError::DealNotFound(DealId(42)))
        );
    }

    #[test]
    fn reaching_target_wins() {
        let mut c = quiet_catalog();
        c.projects.quick.profit = Span::new(700_000, 700_000);
        c.projects.quick.freeze = Span::new(1, 1);
        let mut b = branch(c, 5);
        b.act(ProjectAction::Start(ProjectTier::Quick)).unwrap();
        let report = b.next_turn().unwrap();
        assert_eq!(report.status(), BranchStatus::Won);
        assert!(report.achievements().contains(&AchievementId::BigProfit));
        assert!(b.next_turn().is_err());
    }
}
