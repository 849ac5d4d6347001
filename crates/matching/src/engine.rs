//! The matching engine: one ranking call per run, strictly validated.
//!
//! A run loads the requester's goals, assembles eligible candidates (members
//! of the community with at least one goal and no existing match record with
//! the requester), asks the [`PartnerRanker`] once and turns each returned
//! ordinal into a pending match.
//!
//! Quota is charged only when the ranker is actually invoked: an empty
//! candidate set returns early without touching the counter, while a failed
//! or rejected ranking keeps the charge.

use std::sync::Arc;

use brain_core::{GoalSummary, LearnerProfile, PartnerRanker};
use database::{community, goal, matches, DatabaseError, LearningGoal, Match};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::community::require_member;
use crate::error::{MatchingError, Result};
use crate::principal::Principal;
use crate::usage::{UsagePolicy, UsageSnapshot};

/// A match created by a run, with the partner's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMatch {
    #[serde(flatten)]
    pub record: Match,
    pub partner: String,
}

/// Result of one matching run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub matched: usize,
    pub matches: Vec<CreatedMatch>,
    pub usage: UsageSnapshot,
}

fn summarize(goals: &[LearningGoal]) -> Vec<GoalSummary> {
    goals
        .iter()
        .map(|g| GoalSummary::new(g.title.clone(), g.description.clone()))
        .collect()
}

pub struct MatchingEngine {
    pool: SqlitePool,
    ranker: Arc<dyn PartnerRanker>,
    usage: UsagePolicy,
}

impl MatchingEngine {
    pub fn new(pool: SqlitePool, ranker: Arc<dyn PartnerRanker>, usage: UsagePolicy) -> Self {
        Self {
            pool,
            ranker,
            usage,
        }
    }

    /// The caller's current usage.
    pub async fn usage_status(&self, principal: &Principal) -> Result<UsageSnapshot> {
        self.usage.snapshot(&self.pool, principal).await
    }

    /// Candidates for the requester in a community, in stable member order.
    async fn eligible_candidates(
        &self,
        principal: &Principal,
        community_id: &str,
    ) -> Result<Vec<LearnerProfile>> {
        let members =
            community::list_members(&self.pool, community_id, Some(principal.id())).await?;
        let paired = matches::paired_user_ids(&self.pool, principal.id(), community_id).await?;

        let unpaired: Vec<_> = members
            .into_iter()
            .filter(|member| !paired.contains(&member.id))
            .collect();
        let ids: Vec<String> = unpaired.iter().map(|member| member.id.clone()).collect();
        let mut goals = goal::goals_for_users(&self.pool, &ids, community_id).await?;

        let mut candidates = Vec::with_capacity(unpaired.len());
        let mut without_goals = 0usize;
        for member in unpaired {
            match goals.remove(&member.id) {
                Some(member_goals) if !member_goals.is_empty() => {
                    candidates.push(LearnerProfile {
                        goals: summarize(&member_goals),
                        user_id: member.id,
                        name: member.name,
                    });
                }
                _ => without_goals += 1,
            }
        }

        tracing::debug!(
            community_id,
            already_paired = paired.len(),
            without_goals,
            eligible = candidates.len(),
            "Assembled match candidates"
        );
        Ok(candidates)
    }

    /// Run matching for the caller in one community.
    ///
    /// Produces 0 to 3 new pending matches with the caller as initiator.
    pub async fn run(&self, principal: &Principal, community_id: &str) -> Result<MatchOutcome> {
        require_member(&self.pool, principal.id(), community_id).await?;
        let usage = self.usage.check(&self.pool, principal).await?;

        let own_goals = goal::goals_for_user(&self.pool, principal.id(), community_id).await?;
        let requester = LearnerProfile {
            user_id: principal.id().to_string(),
            name: principal.name().to_string(),
            goals: summarize(&own_goals),
        };

        let candidates = self.eligible_candidates(principal, community_id).await?;
        if candidates.is_empty() {
            tracing::info!(user_id = principal.id(), community_id, "No eligible match candidates");
            return Ok(MatchOutcome {
                matched: 0,
                matches: Vec::new(),
                usage,
            });
        }

        let usage = self.usage.reserve(&self.pool, principal).await?;

        let ordinals = self
            .ranker
            .rank(&requester, &candidates)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = principal.id(), community_id, error = %e, "Partner ranking failed");
                MatchingError::Upstream(e)
            })?;

        let mut created = Vec::with_capacity(ordinals.len());
        for ordinal in ordinals {
            let Some(partner) = ordinal.checked_sub(1).and_then(|idx| candidates.get(idx)) else {
                continue;
            };

            match matches::create_match(&self.pool, principal.id(), &partner.user_id, community_id)
                .await
            {
                Ok(record) => created.push(CreatedMatch {
                    record,
                    partner: partner.name.clone(),
                }),
                // A concurrent request paired them first
                Err(DatabaseError::AlreadyExists { .. }) => {
                    tracing::warn!(partner_id = %partner.user_id, community_id, "Skipping already matched partner");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            user_id = principal.id(),
            community_id,
            candidates = candidates.len(),
            matched = created.len(),
            "Matching run complete"
        );

        Ok(MatchOutcome {
            matched: created.len(),
            matches: created,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Tier;
    use crate::test_support::{add_goal, test_community, test_db, test_principal};
    use brain_core::PromptMatchmaker;
    use database::{usage, Database, MatchStatus};
    use mock_brain::{DelayedBrain, FailingBrain, FixedRanker, ScriptedBrain};

    /// Community "Web" where alice (requester) and `others` each have a goal.
    async fn fixture(db: &Database, others: &[(&str, &str)]) -> (Principal, Vec<Principal>, String) {
        let alice = test_principal(db, "alice", Tier::Standard).await;
        let mut members = vec![alice.clone()];
        for (name, _) in others {
            members.push(test_principal(db, name, Tier::Standard).await);
        }
        let refs: Vec<&Principal> = members.iter().collect();
        let web = test_community(db, "Web", &refs).await;

        add_goal(db, &alice, &web.id, "Learn React basics").await;
        for (member, (_, goal)) in members[1..].iter().zip(others) {
            add_goal(db, member, &web.id, goal).await;
        }
        (alice, members[1..].to_vec(), web.id)
    }

    fn engine(db: &Database, ranker: Arc<dyn PartnerRanker>, limit: i64) -> MatchingEngine {
        MatchingEngine::new(db.pool().clone(), ranker, UsagePolicy::new(limit))
    }

    #[tokio::test]
    async fn test_react_end_to_end() {
        let db = test_db().await;
        let (alice, others, web) = fixture(&db, &[("bob", "React Hooks deep dive")]).await;
        let brain = Arc::new(ScriptedBrain::new("[1]"));
        let ranker = Arc::new(PromptMatchmaker::new(brain.clone()));

        let outcome = engine(&db, ranker, 2).run(&alice, &web).await.unwrap();

        assert_eq!(outcome.matched, 1);
        let created = &outcome.matches[0];
        assert_eq!(created.partner, "bob");
        assert_eq!(created.record.user1_id, alice.id());
        assert_eq!(created.record.user2_id, others[0].id());
        assert_eq!(created.record.status, MatchStatus::Pending);
        assert_eq!(outcome.usage.used, 1);
        assert_eq!(outcome.usage.remaining, Some(1));

        assert_eq!(brain.calls(), 1);
        let prompt = &brain.prompts()[0];
        assert!(prompt.contains("- Learn React basics"));
        assert!(prompt.contains("1. bob"));
        assert!(prompt.contains("React Hooks deep dive"));
    }

    #[tokio::test]
    async fn test_no_candidates_skips_ranker_and_quota() {
        let db = test_db().await;
        let (alice, _, web) = fixture(&db, &[]).await;
        let ranker = Arc::new(FixedRanker::new(vec![1]));

        let outcome = engine(&db, ranker.clone(), 2).run(&alice, &web).await.unwrap();

        assert_eq!(outcome.matched, 0);
        assert!(outcome.matches.is_empty());
        assert_eq!(ranker.calls(), 0);
        assert_eq!(usage::used(db.pool(), alice.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_candidates_without_goals_or_existing_matches_excluded() {
        let db = test_db().await;
        let (alice, others, web) = fixture(
            &db,
            &[("bob", "React Hooks"), ("carol", "React Native"), ("dave", "Vue")],
        )
        .await;
        // erin joins without goals
        let erin = test_principal(&db, "erin", Tier::Standard).await;
        database::community::join(db.pool(), erin.id(), &web).await.unwrap();
        // carol already declined alice
        let declined = matches::create_match(db.pool(), others[1].id(), alice.id(), &web)
            .await
            .unwrap();
        matches::decline(db.pool(), &declined.id).await.unwrap();

        let ranker = Arc::new(FixedRanker::new(vec![2]));
        let outcome = engine(&db, ranker.clone(), 2).run(&alice, &web).await.unwrap();

        assert_eq!(ranker.offered(), vec![vec!["bob".to_string(), "dave".to_string()]]);
        assert_eq!(outcome.matches[0].partner, "dave");
    }

    #[tokio::test]
    async fn test_valid_replies_create_matches_in_order() {
        for reply in ["[]", "[3]", "[3, 1]", "[2, 3, 1]"] {
            let db = test_db().await;
            let (alice, _, web) = fixture(
                &db,
                &[("bob", "Hooks"), ("carol", "Next.js"), ("dave", "JavaScript")],
            )
            .await;
            let ranker = Arc::new(PromptMatchmaker::new(ScriptedBrain::new(reply)));

            let outcome = engine(&db, ranker, 2).run(&alice, &web).await.unwrap();

            let expected: Vec<usize> = serde_json::from_str(reply).unwrap();
            let names = ["bob", "carol", "dave"];
            let partners: Vec<_> = outcome.matches.iter().map(|m| m.partner.as_str()).collect();
            let wanted: Vec<_> = expected.iter().map(|o| names[o - 1]).collect();
            assert_eq!(outcome.matched, expected.len());
            assert_eq!(partners, wanted, "reply {reply}");
            assert!(outcome
                .matches
                .iter()
                .all(|m| m.record.status == MatchStatus::Pending));
        }
    }

    #[tokio::test]
    async fn test_invalid_reply_creates_nothing_but_charges() {
        for reply in ["[0]", "[4]", "[1, 7]", "[1, 2, 3, 1]", "I think bob"] {
            let db = test_db().await;
            let (alice, _, web) = fixture(
                &db,
                &[("bob", "Hooks"), ("carol", "Next.js"), ("dave", "JavaScript")],
            )
            .await;
            let ranker = Arc::new(PromptMatchmaker::new(ScriptedBrain::new(reply)));

            let result = engine(&db, ranker, 2).run(&alice, &web).await;

            assert!(matches!(result, Err(MatchingError::Upstream(_))), "reply {reply}");
            assert!(matches::matches_in_community(db.pool(), alice.id(), &web)
                .await
                .unwrap()
                .is_empty());
            assert_eq!(usage::used(db.pool(), alice.id()).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces() {
        let db = test_db().await;
        let (alice, _, web) = fixture(&db, &[("bob", "Hooks")]).await;
        let brain = Arc::new(FailingBrain::new("down"));
        let ranker = Arc::new(PromptMatchmaker::new(brain.clone()));

        let result = engine(&db, ranker, 2).run(&alice, &web).await;

        assert!(matches!(result, Err(MatchingError::Upstream(_))));
        assert_eq!(brain.calls(), 1);
    }

    #[tokio::test]
    async fn test_quota_exhausted_refuses_without_calling() {
        let db = test_db().await;
        let (alice, _, web) = fixture(&db, &[("bob", "Hooks")]).await;
        usage::try_increment(db.pool(), alice.id(), 2).await.unwrap();
        usage::try_increment(db.pool(), alice.id(), 2).await.unwrap();
        let ranker = Arc::new(FixedRanker::new(vec![1]));

        let result = engine(&db, ranker.clone(), 2).run(&alice, &web).await;

        match result {
            Err(MatchingError::QuotaExceeded(snapshot)) => {
                assert_eq!(snapshot.used, 2);
                assert_eq!(snapshot.remaining, Some(0));
            }
            other => panic!("expected quota error, got {:?}", other),
        }
        assert_eq!(ranker.calls(), 0);
        assert_eq!(usage::used(db.pool(), alice.id()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_privileged_runs_uncounted() {
        let db = test_db().await;
        let (alice, _, web) = fixture(&db, &[("bob", "Hooks"), ("carol", "Next.js")]).await;
        let pro = Principal::new(alice.user.clone(), Tier::Privileged);
        let ranker = Arc::new(FixedRanker::new(vec![1]));
        let engine = engine(&db, ranker, 1);

        let first = engine.run(&pro, &web).await.unwrap();
        let second = engine.run(&pro, &web).await.unwrap();

        assert_eq!(first.matches[0].partner, "bob");
        // bob is now paired, so carol is candidate 1
        assert_eq!(second.matches[0].partner, "carol");
        assert!(second.usage.is_pro);
        assert_eq!(usage::used(db.pool(), alice.id()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_at_last_unit() {
        let db = test_db().await;
        let (alice, _, web) = fixture(&db, &[("bob", "Hooks"), ("carol", "Next.js")]).await;
        usage::try_increment(db.pool(), alice.id(), 2).await.unwrap();
        let brain = DelayedBrain::with_millis(ScriptedBrain::new("[]"), 50);
        let engine = engine(&db, Arc::new(PromptMatchmaker::new(brain)), 2);

        let (a, b) = tokio::join!(engine.run(&alice, &web), engine.run(&alice, &web));

        let ok = [&a, &b].iter().filter(|r| r.is_ok()).count();
        let refused = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(MatchingError::QuotaExceeded(_))))
            .count();
        assert_eq!((ok, refused), (1, 1));
        assert_eq!(usage::used(db.pool(), alice.id()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_member_rejected() {
        let db = test_db().await;
        let (_, _, web) = fixture(&db, &[("bob", "Hooks")]).await;
        let outsider = test_principal(&db, "outsider", Tier::Standard).await;
        let ranker = Arc::new(FixedRanker::new(vec![1]));

        assert!(matches!(
            engine(&db, ranker.clone(), 2).run(&outsider, &web).await,
            Err(MatchingError::NotMember(_))
        ));
        assert!(matches!(
            engine(&db, ranker, 2).run(&outsider, "missing").await,
            Err(MatchingError::NotFound { .. })
        ));
    }
}
