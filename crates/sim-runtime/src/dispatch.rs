use persistence::AchievementStore;
use sim_core::{AchievementId, Session};
use tracing::warn;

/// Hand triggered achievements to the store for the session's player.
///
/// Returns the ids granted for the first time. Store failures are logged and
/// never reach the simulation.
pub fn dispatch<S: AchievementStore + ?Sized>(store: &mut S, session: &Session, triggered: &[AchievementId]) -> Vec<AchievementId> {
    let mut granted = Vec::new();
    for id in triggered {
        match store.issue(&session.user, id.as_str()) {
            Ok(true) => granted.push(*id),
            Ok(false) => {}
            Err(e) => warn!(user = %session.user, achievement = %id, error = %e, "achievement not saved"),
        }
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryAchievementStore;

    #[test]
    fn repeats_are_not_reported_twice() {
        let mut store = MemoryAchievementStore::new();
        let session = Session::new("alice");
        let first = dispatch(&mut store, &session, &[AchievementId::FirstDeal, AchievementId::BigProfit]);
        assert_eq!(first, vec![AchievementId::FirstDeal, AchievementId::BigProfit]);
        let again = dispatch(&mut store, &session, &[AchievementId::BigProfit]);
        assert!(again.is_empty());
        assert_eq!(store.list_earned(&session.user).len(), 2);
    }
}
