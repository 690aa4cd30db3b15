use crate::{Deal, DealId};
use serde::{Deserialize, Serialize};

/// In-flight deals of one entity.
///
/// Deals carry no ordering dependency on each other; the vector order is
/// insertion order and only matters for menu listings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Portfolio {
    deals: Vec<Deal>,
    next_id: u64,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh id for a deal about to be added to this portfolio.
    pub fn next_id(&mut self) -> DealId {
        self.next_id += 1;
        DealId(self.next_id)
    }

    /// Insert a deal. Returns false and leaves the portfolio untouched when
    /// a deal with the same id is already present.
    pub fn add(&mut self, deal: Deal) -> bool {
        if self.contains(deal.id) {
            return false;
        }
        self.next_id = self.next_id.max(deal.id.0);
        self.deals.push(deal);
        true
    }

    pub fn advance_all(&mut self) {
        for deal in &mut self.deals {
            deal.advance_one_turn();
        }
    }

    /// Deals currently ready; nothing is removed.
    pub fn matured(&self) -> impl Iterator<Item = &Deal> + '_ {
        self.deals.iter().filter(|d| d.is_ready())
    }

    /// Remove a matured deal after its profit has been applied.
    pub fn finish(&mut self, id: DealId) -> Option<Deal> {
        self.take(id)
    }

    /// Remove a deal abandoned before maturity.
    pub fn remove(&mut self, id: DealId) -> Option<Deal> {
        self.take(id)
    }

    fn take(&mut self, id: DealId) -> Option<Deal> {
        let pos = self.deals.iter().position(|d| d.id == id)?;
        Some(self.deals.remove(pos))
    }

    pub fn contains(&self, id: DealId) -> bool {
        self.deals.iter().any(|d| d.id == id)
    }

    pub fn get(&self, id: DealId) -> Option<&Deal> {
        self.deals.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Deal> + '_ {
        self.deals.iter()
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}
