//! Direct partner requests and the pending/active match lifecycle.

use database::{community, goal, matches, user, LearningGoal, Match, MatchDetails, MatchStatus};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::community::require_member;
use crate::error::{MatchingError, Result};
use crate::principal::Principal;

/// A match as shown in the pending/active lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub details: MatchDetails,
    pub partner_goals: Vec<LearningGoal>,
    /// Only filled for active matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_goals: Option<Vec<LearningGoal>>,
}

#[derive(Debug, Clone)]
pub struct PartnershipService {
    pool: SqlitePool,
}

impl PartnershipService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ask a fellow community member to partner up.
    pub async fn request_match(
        &self,
        principal: &Principal,
        partner_id: &str,
        community_id: &str,
    ) -> Result<Match> {
        if partner_id == principal.id() {
            return Err(MatchingError::BadRequest(
                "cannot request a match with yourself".to_string(),
            ));
        }

        require_member(&self.pool, principal.id(), community_id).await?;
        user::get_user(&self.pool, partner_id).await?;
        if !community::is_member(&self.pool, partner_id, community_id).await? {
            return Err(MatchingError::BadRequest(
                "partner is not a member of this community".to_string(),
            ));
        }

        if let Some(existing) =
            matches::find_pair(&self.pool, principal.id(), partner_id, community_id).await?
        {
            return Err(MatchingError::Conflict(format!(
                "a {} match already exists with this user",
                existing.status
            )));
        }

        let created =
            matches::create_match(&self.pool, principal.id(), partner_id, community_id).await?;
        tracing::info!(match_id = %created.id, community_id, "Match requested");
        Ok(created)
    }

    /// Load a match the caller participates in; others see `NotFound`.
    async fn participant_match(&self, principal: &Principal, match_id: &str) -> Result<Match> {
        let found = matches::get_match(&self.pool, match_id).await?;
        if !found.involves(principal.id()) {
            return Err(MatchingError::NotFound {
                entity: "Match",
                id: match_id.to_string(),
            });
        }
        Ok(found)
    }

    /// Accept a pending match, opening its conversation.
    pub async fn accept(&self, principal: &Principal, match_id: &str) -> Result<Match> {
        self.participant_match(principal, match_id).await?;
        let (accepted, _) = matches::activate(&self.pool, match_id).await?;
        Ok(accepted)
    }

    /// Decline a pending match.
    pub async fn decline(&self, principal: &Principal, match_id: &str) -> Result<Match> {
        self.participant_match(principal, match_id).await?;
        Ok(matches::decline(&self.pool, match_id).await?)
    }

    /// One match from the caller's side.
    pub async fn get_match(&self, principal: &Principal, match_id: &str) -> Result<MatchDetails> {
        Ok(matches::get_details(&self.pool, match_id, principal.id()).await?)
    }

    async fn views(&self, principal: &Principal, status: MatchStatus) -> Result<Vec<MatchView>> {
        let listed = matches::list_for_user(&self.pool, principal.id(), status).await?;

        let mut views = Vec::with_capacity(listed.len());
        for details in listed {
            let community_id = &details.record.community_id;
            let partner_goals =
                goal::goals_for_user(&self.pool, &details.partner.id, community_id).await?;
            let my_goals = if status == MatchStatus::Active {
                Some(goal::goals_for_user(&self.pool, principal.id(), community_id).await?)
            } else {
                None
            };
            views.push(MatchView {
                details,
                partner_goals,
                my_goals,
            });
        }
        Ok(views)
    }

    /// Pending matches involving the caller, newest first.
    pub async fn pending_matches(&self, principal: &Principal) -> Result<Vec<MatchView>> {
        self.views(principal, MatchStatus::Pending).await
    }

    /// Active matches involving the caller, newest first.
    pub async fn active_matches(&self, principal: &Principal) -> Result<Vec<MatchView>> {
        self.views(principal, MatchStatus::Active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Tier;
    use crate::test_support::{add_goal, test_community, test_db, test_principal};

    #[tokio::test]
    async fn test_request_accept_flow() {
        let db = test_db().await;
        let alice = test_principal(&db, "alice", Tier::Standard).await;
        let bob = test_principal(&db, "bob", Tier::Standard).await;
        let web = test_community(&db, "Web", &[&alice, &bob]).await;
        add_goal(&db, &bob, &web.id, "Hooks").await;
        let service = PartnershipService::new(db.pool().clone());

        let requested = service.request_match(&alice, bob.id(), &web.id).await.unwrap();
        assert_eq!(requested.status, MatchStatus::Pending);

        let pending = service.pending_matches(&bob).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].details.partner.name, "alice");
        assert!(pending[0].my_goals.is_none());

        let accepted = service.accept(&bob, &requested.id).await.unwrap();
        assert_eq!(accepted.status, MatchStatus::Active);

        let active = service.active_matches(&alice).await.unwrap();
        assert_eq!(active[0].partner_goals[0].title, "Hooks");
        assert_eq!(active[0].my_goals.as_deref().map(<[_]>::len), Some(0));

        // Already active
        assert!(matches!(
            service.decline(&alice, &requested.id).await,
            Err(MatchingError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_request_rules() {
        let db = test_db().await;
        let alice = test_principal(&db, "alice", Tier::Standard).await;
        let bob = test_principal(&db, "bob", Tier::Standard).await;
        let carol = test_principal(&db, "carol", Tier::Standard).await;
        let web = test_community(&db, "Web", &[&alice, &bob]).await;
        let service = PartnershipService::new(db.pool().clone());

        assert!(matches!(
            service.request_match(&alice, alice.id(), &web.id).await,
            Err(MatchingError::BadRequest(_))
        ));
        assert!(matches!(
            service.request_match(&alice, carol.id(), &web.id).await,
            Err(MatchingError::BadRequest(_))
        ));
        assert!(matches!(
            service.request_match(&carol, alice.id(), &web.id).await,
            Err(MatchingError::NotMember(_))
        ));

        let first = service.request_match(&alice, bob.id(), &web.id).await.unwrap();
        // Either direction conflicts while pending
        assert!(matches!(
            service.request_match(&bob, alice.id(), &web.id).await,
            Err(MatchingError::Conflict(_))
        ));

        // Declined pairs stay excluded
        service.decline(&bob, &first.id).await.unwrap();
        assert!(matches!(
            service.request_match(&alice, bob.id(), &web.id).await,
            Err(MatchingError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_outsider_cannot_see_or_act() {
        let db = test_db().await;
        let alice = test_principal(&db, "alice", Tier::Standard).await;
        let bob = test_principal(&db, "bob", Tier::Standard).await;
        let eve = test_principal(&db, "eve", Tier::Standard).await;
        let web = test_community(&db, "Web", &[&alice, &bob]).await;
        let service = PartnershipService::new(db.pool().clone());
        let requested = service.request_match(&alice, bob.id(), &web.id).await.unwrap();

        assert!(matches!(
            service.accept(&eve, &requested.id).await,
            Err(MatchingError::NotFound { .. })
        ));
        assert!(matches!(
            service.get_match(&eve, &requested.id).await,
            Err(MatchingError::NotFound { .. })
        ));
        assert_eq!(
            service.get_match(&bob, &requested.id).await.unwrap().partner.name,
            "alice"
        );
    }
}
