//! Learning goals, scoped to a community and mutated only by their owner.

use database::{goal, validation, GoalUpdate, LearningGoal, NewGoal};
use sqlx::SqlitePool;

use crate::community::require_member;
use crate::error::{MatchingError, Result};
use crate::principal::Principal;

/// Raw goal edit as received from a client.
#[derive(Debug, Clone, Default)]
pub struct GoalEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct GoalService {
    pool: SqlitePool,
}

impl GoalService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The caller's goals in a community they belong to.
    pub async fn list(&self, principal: &Principal, community_id: &str) -> Result<Vec<LearningGoal>> {
        require_member(&self.pool, principal.id(), community_id).await?;
        Ok(goal::goals_for_user(&self.pool, principal.id(), community_id).await?)
    }

    /// Add a goal for the caller in a community they belong to.
    pub async fn create(
        &self,
        principal: &Principal,
        community_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<LearningGoal> {
        require_member(&self.pool, principal.id(), community_id).await?;

        let new_goal = NewGoal {
            title: validation::validate_goal_title(title)?,
            description: validation::validate_description(description)?,
        };
        Ok(goal::create_goal(&self.pool, principal.id(), community_id, &new_goal).await?)
    }

    async fn owned(&self, principal: &Principal, goal_id: &str) -> Result<LearningGoal> {
        let found = goal::get_goal(&self.pool, goal_id).await?;
        if found.user_id != principal.id() {
            return Err(MatchingError::Forbidden(
                "only the owner can change a goal".to_string(),
            ));
        }
        Ok(found)
    }

    /// Edit one of the caller's goals.
    pub async fn update(
        &self,
        principal: &Principal,
        goal_id: &str,
        edit: &GoalEdit,
    ) -> Result<LearningGoal> {
        self.owned(principal, goal_id).await?;

        let update = GoalUpdate {
            title: edit
                .title
                .as_deref()
                .map(validation::validate_goal_title)
                .transpose()?,
            description: validation::validate_description(edit.description.as_deref())?,
            is_completed: edit.is_completed,
        };
        Ok(goal::update_goal(&self.pool, goal_id, &update).await?)
    }

    /// Delete one of the caller's goals.
    pub async fn delete(&self, principal: &Principal, goal_id: &str) -> Result<()> {
        self.owned(principal, goal_id).await?;
        Ok(goal::delete_goal(&self.pool, goal_id).await?)
    }
}
