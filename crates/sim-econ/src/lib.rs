#![deny(warnings)]

//! Economic models: seeded sampling and price adjustments for Flip Tycoon.
//!
//! This module provides validated utilities for:
//! - Seeded RNG construction for reproducible sessions
//! - Inclusive range sampling for prices, profits and durations
//! - One-off project event rolls against configured thresholds
//! - Negotiation outcome resolution and the market-edge profit adjustment

use catalog::{EventTable, MarketTable, NegotiationAction, NegotiationTable, Outcome};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sim_core::{Money, Span, Style};
use thiserror::Error;

/// RNG used across the game; a fixed seed replays a session exactly.
pub type GameRng = ChaCha8Rng;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Range with `lo > hi`.
    #[error("inverted range [{0}, {1}]")]
    InvertedRange(i64, i64),
    /// Probability must lie in [0, 1].
    #[error("invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Build the session RNG, from a seed when one is given.
pub fn seeded_rng(seed: Option<u64>) -> GameRng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Uniform integer in `[lo, hi]`.
///
/// Example:
/// let mut rng = seeded_rng(Some(1));
/// let v = sample(&mut rng, Span::new(8_000, 20_000)).unwrap();
/// assert!((8_000..=20_000).contains(&v));
pub fn sample<R: Rng + ?Sized>(rng: &mut R, span: Span<Money>) -> Result<Money, EconError> {
    if !span.is_ordered() {
        return Err(EconError::InvertedRange(span.lo(), span.hi()));
    }
    Ok(rng.gen_range(span.lo()..=span.hi()))
}

/// Uniform turn count in `[lo, hi]`.
pub fn sample_turns<R: Rng + ?Sized>(rng: &mut R, span: Span<u32>) -> Result<u32, EconError> {
    if !span.is_ordered() {
        return Err(EconError::InvertedRange(i64::from(span.lo()), i64::from(span.hi())));
    }
    Ok(rng.gen_range(span.lo()..=span.hi()))
}

/// Uniform draw in `[0, 1)`.
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// True with probability `p`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> Result<bool, EconError> {
    if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
        return Err(EconError::InvalidProbability(p));
    }
    Ok(draw(rng) < p)
}

/// Kind of one-off event attached to a project at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A collector showed up: shorter build, extra profit.
    Boost,
    /// Trouble in the workshop: longer build, part of the profit lost.
    Delay,
}

/// A rolled event with the deltas to apply to the deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RolledEvent {
    pub kind: EventKind,
    pub turns_delta: i32,
    pub bonus: Money,
}

/// Map a uniform draw onto the event thresholds.
pub fn classify_draw(value: f64, table: &EventTable) -> Option<EventKind> {
    if value < table.boost_below {
        Some(EventKind::Boost)
    } else if value < table.delay_below {
        Some(EventKind::Delay)
    } else {
        None
    }
}

/// Roll the single event a new project may receive.
pub fn roll_event<R: Rng + ?Sized>(rng: &mut R, table: &EventTable) -> Result<Option<RolledEvent>, EconError> {
    let value = draw(rng);
    let rolled = match classify_draw(value, table) {
        Some(EventKind::Boost) => Some(RolledEvent {
            kind: EventKind::Boost,
            turns_delta: table.boost_turns,
            bonus: sample(rng, table.boost_bonus)?,
        }),
        Some(EventKind::Delay) => Some(RolledEvent {
            kind: EventKind::Delay,
            turns_delta: table.delay_turns,
            bonus: -sample(rng, table.delay_penalty)?,
        }),
        None => None,
    };
    Ok(rolled)
}

/// Resolve one negotiation: the outcome class and, unless the deal
/// collapsed, the amount of money it moves.
pub fn negotiate<R: Rng + ?Sized>(
    rng: &mut R,
    table: &NegotiationTable,
    action: NegotiationAction,
    style: Style,
) -> Result<(Outcome, Option<Money>), EconError> {
    let outcome = table.outcome(action, style);
    let amount = match table.range(outcome) {
        Some(span) => Some(sample(rng, span)?),
        None => None,
    };
    Ok((outcome, amount))
}

/// Which side of the market holds the edge on a sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketEdge {
    Rival,
    Player,
    Even,
}

/// Adjust a sale result by relative wealth: a richer rival squeezes the
/// player, a richer player sells with confidence. Truncates toward zero.
///
/// Example:
/// let (v, edge) = market_edge(10_000, 100_000, 200_000, &table);
/// assert_eq!((v, edge), (8_500, MarketEdge::Rival));
pub fn market_edge(amount: Money, player_budget: Money, rival_budget: Money, table: &MarketTable) -> (Money, MarketEdge) {
    if rival_budget > player_budget {
        (amount * table.rival_edge_pct / 100, MarketEdge::Rival)
    } else if rival_budget < player_budget {
        (amount * table.player_edge_pct / 100, MarketEdge::Player)
    } else {
        (amount, MarketEdge::Even)
    }
}
