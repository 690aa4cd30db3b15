use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a collectible achievement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstDeal,
    TenDeals,
    BigProfit,
    LongProject,
    RiskyAbort,
    LuckyEvent,
}

impl AchievementId {
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstDeal => "first_deal",
            AchievementId::TenDeals => "ten_deals",
            AchievementId::BigProfit => "big_profit",
            AchievementId::LongProject => "long_project",
            AchievementId::RiskyAbort => "risky_abort",
            AchievementId::LuckyEvent => "lucky_event",
        }
    }

    pub fn parse(s: &str) -> Option<AchievementId> {
        Ledger::find(s).map(|a| a.id)
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
}

static ENTRIES: [Achievement; 6] = [
    Achievement {
        id: AchievementId::FirstDeal,
        name: "First Blood",
        description: "Closed the first successful deal",
    },
    Achievement {
        id: AchievementId::TenDeals,
        name: "Real Flipper",
        description: "Closed 10 deals",
    },
    Achievement {
        id: AchievementId::BigProfit,
        name: "Fat Payday",
        description: "Earned over 100,000 on one deal",
    },
    Achievement {
        id: AchievementId::LongProject,
        name: "Patient Mechanic",
        description: "Finished a long project",
    },
    Achievement {
        id: AchievementId::RiskyAbort,
        name: "On the Edge",
        description: "Sold a project early at a loss",
    },
    Achievement {
        id: AchievementId::LuckyEvent,
        name: "Cosmic Luck",
        description: "A rare project boost fired",
    },
];

/// Static achievement catalog.
pub struct Ledger;

impl Ledger {
    pub fn all() -> &'static [Achievement] {
        &ENTRIES
    }

    /// Look up by persisted identifier; unknown ids yield `None`.
    pub fn find(id: &str) -> Option<&'static Achievement> {
        ENTRIES.iter().find(|a| a.id.as_str() == id)
    }

    pub fn get(id: AchievementId) -> &'static Achievement {
        // ENTRIES lists every variant exactly once, in declaration order.
        &ENTRIES[id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_resolves_to_itself() {
        for a in Ledger::all() {
            assert_eq!(Ledger::get(a.id).id, a.id);
            assert_eq!(AchievementId::parse(a.id.as_str()), Some(a.id));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(Ledger::find("golden_wrench").is_none());
        assert_eq!(AchievementId::parse(""), None);
    }

    #[test]
    fn serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&AchievementId::BigProfit).unwrap();
        assert_eq!(json, "\"big_profit\"");
    }
}
