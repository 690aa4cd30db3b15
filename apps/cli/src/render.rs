//! Text for the structured reports the branches return.

use catalog::{Catalog, NegotiationAction, Outcome};
use sim_core::{Achievement, Deal, EconomicEntity, Money};
use sim_econ::{EventKind, MarketEdge};
use sim_runtime::{Abandonment, BranchStatus, MarketEvent, ProjectStart, Settlement};

/// `1234567` -> `1,234,567`.
pub fn money(v: Money) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn budget_line(entity: &EconomicEntity) -> String {
    match entity.win_target() {
        Some(target) => format!("Budget: {} / goal {}", money(entity.budget()), money(target)),
        None => format!("Budget: {}", money(entity.budget())),
    }
}

pub fn action_label(action: NegotiationAction) -> &'static str {
    match action {
        NegotiationAction::HardBargain => "Haggle hard",
        NegotiationAction::GrabQuickly => "Grab it quickly",
        NegotiationAction::Outsmart => "Try to outsmart the seller",
        NegotiationAction::WalkAway => "Walk away and come back later",
    }
}

pub fn outcome_line(outcome: Outcome, amount: Option<Money>) -> String {
    let amount = amount.map(money).unwrap_or_default();
    match outcome {
        Outcome::Collapsed => "The seller got angry and the deal fell through.".to_string(),
        Outcome::SmallGain => format!("You squeezed out a small margin: +{amount}."),
        Outcome::SolidProfit => format!("A solid deal, the car resells well: +{amount}."),
        Outcome::SmallLoss => format!("You overpaid a little: {amount}."),
        Outcome::HeavyLoss => format!("Hidden defects surfaced, a painful loss: {amount}."),
        Outcome::Jackpot => format!("A collector snapped it up: +{amount}!"),
        Outcome::Flat => format!("You broke roughly even: {amount}."),
    }
}

pub fn market_event_line(event: &MarketEvent) -> Option<String> {
    let line = match event {
        MarketEvent::Skipped => "You pass on this one.".to_string(),
        MarketEvent::Bought { price, change } => {
            format!("You bought the car for {}. Budget: {}.", money(*price), money(change.balance))
        }
        MarketEvent::RivalEntered { name, budget, .. } => {
            format!("A {name} is working the same market (budget {}).", money(*budget))
        }
        MarketEvent::SoldImmediately => "A buyer showed up right away.".to_string(),
        MarketEvent::Frozen { turns } => format!("The car is stuck on the lot for {turns} turn(s)."),
        MarketEvent::Waited { remaining, rival_stage } => {
            let mut line = format!("You wait. Turns left: {remaining}.");
            if let Some(stage) = rival_stage {
                line.push_str(&format!(" Rival: {stage}."));
            }
            line
        }
        MarketEvent::SoldAtCost { change } => {
            format!("You sold at cost. Budget: {}.", money(change.balance))
        }
        MarketEvent::Dumped { loss, change } => format!(
            "You dumped the car and lost {}. Budget: {}.",
            money(*loss),
            money(change.balance)
        ),
        MarketEvent::Settled {
            profit, edge, change, ..
        } => {
            let edge = match edge {
                MarketEdge::Rival => " The richer rival squeezed your margin.",
                MarketEdge::Player => " Your deeper pockets sold it with confidence.",
                MarketEdge::Even => "",
            };
            format!("Sold! Result: {}.{edge} Budget: {}.", money(*profit), money(change.balance))
        }
        MarketEvent::RivalFinalized { name, profit, budget } => format!(
            "The {name} closed a deal: {} (budget {}).",
            money(*profit),
            money(*budget)
        ),
        MarketEvent::NewListing(_) => return None,
    };
    Some(line)
}

pub fn deal_line(deal: &Deal, catalog: &Catalog) -> String {
    format!(
        "{} {} | paid {} | {} turn(s) left",
        deal.id,
        catalog.projects.get(deal.tier).name,
        money(deal.purchase_price),
        deal.remaining_turns()
    )
}

pub fn start_line(start: &ProjectStart, catalog: &Catalog) -> String {
    let mut line = format!(
        "Started {} for {}, ready in {} turn(s).",
        catalog.projects.get(start.deal.tier).name,
        money(start.deal.purchase_price),
        start.deal.duration()
    );
    match start.event.map(|e| e.kind) {
        Some(EventKind::Boost) => line.push_str(&format!(
            " A collector is already interested: +{} on completion.",
            money(start.deal.bonus())
        )),
        Some(EventKind::Delay) => line.push_str(&format!(
            " Parts are delayed: {} on completion.",
            money(start.deal.bonus())
        )),
        None => {}
    }
    line
}

pub fn settlement_line(s: &Settlement, catalog: &Catalog) -> String {
    format!(
        "{} {} is done: profit {}. Budget: {}.",
        s.deal.id,
        catalog.projects.get(s.deal.tier).name,
        money(s.profit),
        money(s.change.balance)
    )
}

pub fn rival_settlement_line(s: &Settlement) -> String {
    format!("The rival finished a project: profit {}.", money(s.profit))
}

pub fn abandonment_line(a: &Abandonment) -> String {
    format!(
        "{} sold early at a loss of {}. Budget: {}.",
        a.deal.id,
        money(a.loss),
        money(a.change.balance)
    )
}

pub fn status_line(status: BranchStatus) -> Option<&'static str> {
    match status {
        BranchStatus::Ongoing => None,
        BranchStatus::Won => Some("You reached your goal. Branch complete!"),
        BranchStatus::Bankrupt => Some("You went broke. Branch over."),
        BranchStatus::Exited => Some("You left the branch."),
    }
}

pub fn achievement_line(a: &Achievement) -> String {
    format!("{}: {}", a.name, a.description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{DealId, ProjectTier, Role};

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0), "0");
        assert_eq!(money(999), "999");
        assert_eq!(money(150_000), "150,000");
        assert_eq!(money(-1_234_567), "-1,234,567");
    }

    #[test]
    fn collapsed_outcome_has_no_amount() {
        assert!(!outcome_line(Outcome::Collapsed, None).contains('+'));
        assert!(outcome_line(Outcome::SolidProfit, Some(20_000)).contains("+20,000"));
    }

    #[test]
    fn rival_text_is_gender_neutral() {
        let mut lines: Vec<String> = NegotiationAction::ALL.iter().map(|a| action_label(*a).to_string()).collect();
        lines.extend(market_event_line(&MarketEvent::RivalFinalized {
            name: "dealer".into(),
            profit: 10_000,
            budget: 200_000,
        }));
        for line in lines {
            let words: Vec<&str> = line.split(|c: char| !c.is_alphabetic()).collect();
            for pronoun in ["he", "him", "his", "she", "her"] {
                assert!(!words.iter().any(|w| w.eq_ignore_ascii_case(pronoun)), "{line}");
            }
        }
    }

    #[test]
    fn deal_line_names_the_tier() {
        let c = Catalog::default();
        let d = Deal::new(DealId(3), ProjectTier::Long, Role::Human, 150_000, 4);
        let line = deal_line(&d, &c);
        assert!(line.starts_with("#3 long project"));
        assert!(line.contains("4 turn(s) left"));
    }

    #[test]
    fn new_listing_is_rendered_by_the_screen() {
        let l = sim_runtime::Listing {
            quality: 0,
            name: "x".into(),
            price: 1,
            freeze_chance: 0.5,
        };
        assert!(market_event_line(&MarketEvent::NewListing(l)).is_none());
        assert!(status_line(BranchStatus::Ongoing).is_none());
    }
}
