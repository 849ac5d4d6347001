//! MeshMind services: partner matching, usage quota, conversation insight,
//! partnerships and chat.
//!
//! Every operation takes an explicit [`Principal`] for the caller. The
//! language model sits behind the `brain-core` [`PartnerRanker`] and
//! [`InsightGenerator`] traits, so the services never see raw model text.
//!
//! # Architecture
//!
//! ```text
//!  POST /communities/:id/aiMatch
//!          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │                     MATCHING ENGINE                      │
//! │                                                          │
//! │  1. Membership + quota check (read-only)                 │
//! │         ↓                                                │
//! │  2. Requester goals, unpaired members with goals         │
//! │         ↓  (none → matched: 0, nothing charged)          │
//! │  3. Reserve one quota unit (conditional upsert)          │
//! │         ↓                                                │
//! │  4. PartnerRanker::rank → validated 1-based ordinals     │
//! │         ↓                                                │
//! │  5. One pending match per ordinal, best first            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`PartnerRanker`]: brain_core::PartnerRanker
//! [`InsightGenerator`]: brain_core::InsightGenerator

mod chat;
mod community;
mod engine;
mod error;
mod goals;
mod insight;
mod partnership;
mod principal;
mod usage;
mod users;

pub use chat::ChatService;
pub use community::{CommunityService, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use engine::{CreatedMatch, MatchOutcome, MatchingEngine};
pub use error::{MatchingError, Result};
pub use goals::{GoalEdit, GoalService};
pub use insight::InsightService;
pub use partnership::{MatchView, PartnershipService};
pub use principal::{Principal, Tier};
pub use usage::{UsagePolicy, UsageSnapshot, DEFAULT_FREE_LIMIT};
pub use users::UserService;

#[cfg(test)]
pub(crate) mod test_support {
    use database::{community, goal, matches, user, Community, Database, IdentityProfile, LearningGoal, NewGoal};

    use crate::principal::{Principal, Tier};

    pub async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    pub async fn test_principal(db: &Database, name: &str, tier: Tier) -> Principal {
        let profile = IdentityProfile {
            external_id: format!("idp|{name}"),
            email: format!("{name}@example.com"),
            name: name.to_string(),
            image_url: None,
        };
        let user = user::upsert_identity(db.pool(), &profile).await.unwrap();
        Principal::new(user, tier)
    }

    /// Community created by the first member, joined by the rest.
    pub async fn test_community(db: &Database, name: &str, members: &[&Principal]) -> Community {
        let (creator, rest) = members.split_first().unwrap();
        let created = community::create_community(db.pool(), name, None, creator.id())
            .await
            .unwrap();
        for member in rest {
            community::join(db.pool(), member.id(), &created.id)
                .await
                .unwrap();
        }
        created
    }

    pub async fn add_goal(
        db: &Database,
        owner: &Principal,
        community_id: &str,
        title: &str,
    ) -> LearningGoal {
        let new_goal = NewGoal {
            title: title.to_string(),
            description: None,
        };
        goal::create_goal(db.pool(), owner.id(), community_id, &new_goal)
            .await
            .unwrap()
    }

    /// alice and bob in "Web" with an accepted match; returns the match id.
    pub async fn active_pair(db: &Database) -> (Principal, Principal, String) {
        let alice = test_principal(db, "alice", Tier::Standard).await;
        let bob = test_principal(db, "bob", Tier::Standard).await;
        let web = test_community(db, "Web", &[&alice, &bob]).await;
        let created = matches::create_match(db.pool(), alice.id(), bob.id(), &web.id)
            .await
            .unwrap();
        matches::activate(db.pool(), &created.id).await.unwrap();
        (alice, bob, created.id)
    }
}
