use catalog::{Catalog, NegotiationAction};
use persistence::{AchievementStore, MemoryAchievementStore};
use proptest::prelude::*;
use sim_core::{AchievementId, ProjectTier, Session, Span};
use sim_econ::seeded_rng;
use sim_runtime::{
    dispatch, Branch, BranchStatus, MarketAction, MarketBranch, NegotiationBranch, ProjectAction, ProjectBranch,
};
use std::sync::Arc;

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::default())
}

/// Start a medium project whenever nothing is in flight, otherwise wait.
fn play_projects(seed: u64, rounds: usize) -> (ProjectBranch, Vec<AchievementId>) {
    let mut b = ProjectBranch::new("alice", catalog(), seeded_rng(Some(seed))).unwrap();
    let mut earned = Vec::new();
    for _ in 0..rounds {
        let tick = b.next_turn().unwrap();
        earned.extend(tick.achievements());
        if tick.status().is_over() {
            break;
        }
        let idle = b.player().portfolio().map_or(true, |p| p.is_empty());
        let action = if idle {
            ProjectAction::Start(ProjectTier::Medium)
        } else {
            ProjectAction::Wait
        };
        let step = b.act(action).unwrap();
        earned.extend(step.achievements());
        if step.status().is_over() {
            break;
        }
    }
    (b, earned)
}

#[test]
fn same_seed_replays_project_branch() {
    let (a, earned_a) = play_projects(77, 30);
    let (b, earned_b) = play_projects(77, 30);
    assert_eq!(a.player().entity.budget(), b.player().entity.budget());
    assert_eq!(a.player().entity.completed_deals(), b.player().entity.completed_deals());
    assert_eq!(a.rival().entity.budget(), b.rival().entity.budget());
    assert_eq!(earned_a, earned_b);
}

#[test]
fn project_branch_books_deals_and_dispatches_once() {
    let (b, earned) = play_projects(2024, 40);
    assert!(b.player().entity.completed_count() >= 1);
    assert!(earned.contains(&AchievementId::FirstDeal));

    let mut store = MemoryAchievementStore::new();
    let session = Session::new("alice");
    let granted = dispatch(&mut store, &session, &earned);
    assert_eq!(granted.iter().filter(|id| **id == AchievementId::FirstDeal).count(), 1);
    assert!(dispatch(&mut store, &session, &earned).is_empty());
    assert!(store.has_achievement(&session.user, AchievementId::FirstDeal));
}

#[test]
fn negotiation_runs_until_a_terminal_state_or_cap() {
    let mut b = NegotiationBranch::new("bob", catalog(), seeded_rng(Some(5)));
    let mut rounds = 0;
    while !b.status().is_over() && rounds < 200 {
        b.play(NegotiationAction::HardBargain).unwrap();
        rounds += 1;
    }
    assert!(b.player().entity.completed_count() >= 1);
    assert!(b.player().entity.budget() >= 0);
    if b.status() == BranchStatus::Won {
        assert!(b.player().entity.budget() >= 150_000);
    }
}

#[test]
fn market_branch_buys_and_settles() {
    let mut c = Catalog::default();
    c.market.price = Span::new(80_000, 100_000);
    let mut b = MarketBranch::new("carol", Arc::new(c), seeded_rng(Some(11))).unwrap();
    for _ in 0..100 {
        if b.status().is_over() {
            break;
        }
        let action = if b.held().is_some() {
            MarketAction::Wait
        } else {
            MarketAction::Buy
        };
        b.act(action).unwrap();
    }
    assert!(b.player().entity.completed_count() >= 1);
    assert!(b.player().entity.budget() >= 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn project_budgets_stay_non_negative(seed in any::<u64>(), plan in proptest::collection::vec(0u8..5, 1..25)) {
        let mut b = ProjectBranch::new("p", catalog(), seeded_rng(Some(seed))).unwrap();
        for step in plan {
            if b.next_turn().unwrap().status().is_over() {
                break;
            }
            let action = match step {
                1..=3 => ProjectAction::Start(ProjectTier::try_from(step).unwrap()),
                4 => match b.player().portfolio().and_then(|p| p.iter().next()) {
                    Some(deal) => ProjectAction::Abandon(deal.id),
                    None => ProjectAction::Wait,
                },
                _ => ProjectAction::Wait,
            };
            let status = b.act(action).unwrap().status();
            prop_assert!(b.player().entity.budget() >= 0);
            prop_assert!(b.rival().entity.budget() >= 0);
            if status.is_over() {
                break;
            }
        }
        prop_assert!(b.player().entity.budget() >= 0);
    }
}
