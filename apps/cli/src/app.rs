use crate::console::{Console, EXIT_SENTINEL};
use crate::render;
use anyhow::Result;
use catalog::{Catalog, NegotiationAction};
use persistence::{earned_achievements, AchievementStore, AuthError, CredentialStore};
use rand::Rng;
use sim_core::{AchievementId, CoreError, DealId, Ledger, ProjectTier, Session, SimConfig};
use sim_econ::{seeded_rng, GameRng};
use sim_runtime::{
    dispatch, Branch, MarketAction, MarketBranch, NegotiationBranch, ProjectAction, ProjectBranch, ProjectReport,
    RuntimeError,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;

/// Session-independent state shared by every screen.
pub struct App<S> {
    catalog: Arc<Catalog>,
    credentials: CredentialStore,
    store: S,
    rng: GameRng,
}

impl<S: AchievementStore> App<S> {
    pub fn new(config: &SimConfig, catalog: Catalog, store: S) -> Self {
        Self {
            catalog: Arc::new(catalog),
            credentials: CredentialStore::new(&config.storage_dir),
            store,
            rng: seeded_rng(config.rng_seed),
        }
    }

    /// Auth menu until the player quits.
    pub fn run<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>) -> Result<()> {
        loop {
            con.say("")?;
            con.say("1. Register")?;
            con.say("2. Log in")?;
            con.say("3. Quit")?;
            match con.choose("Choice", 3)? {
                Some(1) => self.register(con)?,
                Some(2) => {
                    if let Some(session) = self.login(con)? {
                        self.main_menu(con, &session)?;
                    }
                }
                _ => {
                    con.say("Goodbye!")?;
                    return Ok(());
                }
            }
        }
    }

    fn read_credentials<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>) -> Result<Option<(String, String)>> {
        let Some(login) = con.prompt("Login")? else {
            return Ok(None);
        };
        let Some(password) = con.prompt("Password")? else {
            return Ok(None);
        };
        Ok(Some((login, password)))
    }

    fn register<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>) -> Result<()> {
        let Some((login, password)) = self.read_credentials(con)? else {
            return Ok(());
        };
        match self.credentials.register(&login, &password) {
            Ok(()) => con.say("Registered. You can log in now.")?,
            Err(AuthError::Storage(e)) => return Err(e.into()),
            Err(e) => con.say(format!("Registration failed: {e}."))?,
        }
        Ok(())
    }

    fn login<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>) -> Result<Option<Session>> {
        let Some((login, password)) = self.read_credentials(con)? else {
            return Ok(None);
        };
        match self.credentials.authenticate(&login, &password) {
            Ok(()) => {
                let session = Session::new(login);
                info!(user = %session.user, "logged in");
                con.say(format!("Welcome, {}!", session.user))?;
                self.show_achievements(con, &session)?;
                Ok(Some(session))
            }
            Err(AuthError::Storage(e)) => Err(e.into()),
            Err(e) => {
                con.say(format!("Login failed: {e}."))?;
                Ok(None)
            }
        }
    }

    fn show_achievements<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>, session: &Session) -> Result<()> {
        let earned = earned_achievements(&self.store, &session.user);
        if earned.is_empty() {
            con.say("No achievements yet.")?;
            return Ok(());
        }
        con.say(format!("Achievements ({}/{}):", earned.len(), Ledger::all().len()))?;
        for a in earned {
            con.say(format!("  {}", render::achievement_line(a)))?;
        }
        Ok(())
    }

    fn main_menu<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>, session: &Session) -> Result<()> {
        loop {
            con.say("")?;
            con.say("1. Branch 1: the haggle")?;
            con.say("2. Branch 2: the resale market")?;
            con.say("3. Branch 3: the project garage")?;
            con.say("4. My achievements")?;
            con.say("5. Log out")?;
            con.say(format!("(type {EXIT_SENTINEL} at any prompt to leave a branch)"))?;
            match con.choose("Choice", 5)? {
                Some(1) => self.play_negotiation(con, session)?,
                Some(2) => self.play_market(con, session)?,
                Some(3) => self.play_projects(con, session)?,
                Some(4) => self.show_achievements(con, session)?,
                _ => {
                    info!(user = %session.user, "logged out");
                    return Ok(());
                }
            }
        }
    }

    fn branch_rng(&mut self) -> GameRng {
        seeded_rng(Some(self.rng.gen()))
    }

    /// Issue triggered achievements and announce the new ones.
    fn award<R: BufRead, W: Write>(
        &mut self,
        con: &mut Console<R, W>,
        session: &Session,
        triggered: &[AchievementId],
    ) -> Result<()> {
        for id in dispatch(&mut self.store, session, triggered) {
            con.say(format!("*** Achievement unlocked: {} ***", render::achievement_line(Ledger::get(id))))?;
        }
        Ok(())
    }

    fn finish<B: Branch, R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>, branch: &mut B) -> Result<()> {
        branch.exit();
        if let Some(line) = render::status_line(branch.status()) {
            con.say(line)?;
        }
        con.say(render::budget_line(&branch.player().entity))?;
        Ok(())
    }

    fn play_negotiation<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>, session: &Session) -> Result<()> {
        let mut b = NegotiationBranch::new(session.user.as_str(), self.catalog.clone(), self.branch_rng());
        con.say(b.title())?;
        while !b.status().is_over() {
            con.say("")?;
            con.say(render::budget_line(&b.player().entity))?;
            let rival = b.rival();
            con.say(format!(
                "A {} is selling a car. The seller {}.",
                rival.entity.name,
                sim_ai::describe_behavior(rival.style)
            ))?;
            for (i, action) in NegotiationAction::ALL.iter().enumerate() {
                con.say(format!("{}. {}", i + 1, render::action_label(*action)))?;
            }
            let Some(action) = con.choose("Your move", 4)?.and_then(NegotiationAction::from_code) else {
                break;
            };
            let report = b.play(action)?;
            con.say(render::outcome_line(report.outcome, report.amount))?;
            self.award(con, session, &report.achievements)?;
        }
        self.finish(con, &mut b)
    }

    fn play_market<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>, session: &Session) -> Result<()> {
        let mut b = MarketBranch::new(session.user.as_str(), self.catalog.clone(), self.branch_rng())?;
        con.say(b.title())?;
        while !b.status().is_over() {
            con.say("")?;
            con.say(render::budget_line(&b.player().entity))?;
            let action = if let Some(listing) = b.listing() {
                con.say(format!("On offer: {}, asking {}.", listing.name, render::money(listing.price)))?;
                con.say("1. Buy")?;
                con.say("2. Skip")?;
                con.choose("Your move", 2)?.map(|n| MarketAction::SCOUTING[usize::from(n) - 1])
            } else if let Some(held) = b.held() {
                if let Some(hint) = held.hint {
                    con.say(format!("\"{hint}\""))?;
                }
                con.say(format!("Your {} is waiting for a buyer: {} turn(s) left.", held.listing.name, held.remaining()))?;
                con.say("1. Wait")?;
                con.say("2. Sell at cost")?;
                con.say("3. Dump at a loss")?;
                con.choose("Your move", 3)?.map(|n| MarketAction::HOLDING[usize::from(n) - 1])
            } else {
                None
            };
            let Some(action) = action else {
                break;
            };
            let report = b.act(action)?;
            for event in &report.events {
                if let Some(line) = render::market_event_line(event) {
                    con.say(line)?;
                }
            }
            self.award(con, session, &report.achievements)?;
        }
        self.finish(con, &mut b)
    }

    fn play_projects<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>, session: &Session) -> Result<()> {
        let mut b = ProjectBranch::new(session.user.as_str(), self.catalog.clone(), self.branch_rng())?;
        con.say(b.title())?;
        con.say(format!(
            "Your rival: {} (budget {}).",
            b.rival().entity.name,
            render::money(b.rival().entity.budget())
        ))?;
        'turns: while !b.status().is_over() {
            let report = b.next_turn()?;
            con.say("")?;
            con.say(format!("--- Turn {} ---", b.turn()))?;
            self.show_project_report(con, session, &report)?;
            if report.status().is_over() {
                break;
            }
            con.say(render::budget_line(&b.player().entity))?;
            if let Some(p) = b.player().portfolio() {
                for deal in p.iter() {
                    con.say(format!("  {}", render::deal_line(deal, &self.catalog)))?;
                }
            }
            loop {
                for tier in ProjectTier::ALL {
                    let cfg = self.catalog.projects.get(tier);
                    con.say(format!(
                        "{}. {} ({}..{})",
                        tier.code(),
                        cfg.name,
                        render::money(cfg.buy.lo()),
                        render::money(cfg.buy.hi())
                    ))?;
                }
                con.say("4. Sell a project early")?;
                con.say("5. Wait for next turn")?;
                let action = match con.choose("Your move", 5)? {
                    None => break 'turns,
                    Some(n @ 1..=3) => ProjectAction::Start(ProjectTier::try_from(n)?),
                    Some(4) => match self.pick_deal(con)? {
                        Some(id) => ProjectAction::Abandon(id),
                        None => continue,
                    },
                    Some(_) => ProjectAction::Wait,
                };
                match b.act(action) {
                    Ok(report) => {
                        self.show_project_report(con, session, &report)?;
                        break;
                    }
                    Err(RuntimeError::Core(e @ (CoreError::EmptyPortfolio | CoreError::DealNotFound(_)))) => {
                        con.say(format!("Can't do that: {e}."))?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        self.finish(con, &mut b)
    }

    fn pick_deal<R: BufRead, W: Write>(&mut self, con: &mut Console<R, W>) -> Result<Option<DealId>> {
        let Some(line) = con.prompt("Project number")? else {
            return Ok(None);
        };
        match line.trim_start_matches('#').parse::<u64>() {
            Ok(n) => Ok(Some(DealId(n))),
            Err(_) => {
                con.say("That is not a project number.")?;
                Ok(None)
            }
        }
    }

    fn show_project_report<R: BufRead, W: Write>(
        &mut self,
        con: &mut Console<R, W>,
        session: &Session,
        report: &ProjectReport,
    ) -> Result<()> {
        match report {
            ProjectReport::Tick { tick, rival_start, .. } => {
                for s in &tick.player {
                    con.say(render::settlement_line(s, &self.catalog))?;
                }
                for s in &tick.rival {
                    con.say(render::rival_settlement_line(s))?;
                }
                if let Some(start) = rival_start {
                    con.say(format!(
                        "The rival took on a {}.",
                        self.catalog.projects.get(start.deal.tier).name
                    ))?;
                }
            }
            ProjectReport::Started { start, .. } => con.say(render::start_line(start, &self.catalog))?,
            ProjectReport::Abandoned { abandonment, .. } => con.say(render::abandonment_line(abandonment))?,
            ProjectReport::Waited { .. } => {}
        }
        let achievements = report.achievements();
        if !achievements.is_empty() {
            self.award(con, session, &achievements)?;
        }
        if report.status().is_over() {
            info!(user = %session.user, status = ?report.status(), "project branch ended");
        }
        Ok(())
    }
}
