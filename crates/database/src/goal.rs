//! Learning goal storage, scoped to a (user, community) pair.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{GoalUpdate, LearningGoal, NewGoal};

const GOAL_COLUMNS: &str =
    "id, user_id, community_id, title, description, is_completed, created_at, updated_at";

/// Create a goal for a user in a community.
pub async fn create_goal(
    pool: &SqlitePool,
    user_id: &str,
    community_id: &str,
    goal: &NewGoal,
) -> Result<LearningGoal> {
    let query = format!(
        r#"
        INSERT INTO learning_goals (id, user_id, community_id, title, description)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {GOAL_COLUMNS}
        "#
    );

    let created = sqlx::query_as::<_, LearningGoal>(&query)
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(community_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .fetch_one(pool)
        .await?;

    Ok(created)
}

/// Get a goal by ID.
pub async fn get_goal(pool: &SqlitePool, id: &str) -> Result<LearningGoal> {
    let query = format!("SELECT {GOAL_COLUMNS} FROM learning_goals WHERE id = ?");

    sqlx::query_as::<_, LearningGoal>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "LearningGoal",
            id: id.to_string(),
        })
}

/// Goals of one user in one community, oldest first.
pub async fn goals_for_user(
    pool: &SqlitePool,
    user_id: &str,
    community_id: &str,
) -> Result<Vec<LearningGoal>> {
    let query = format!(
        r#"
        SELECT {GOAL_COLUMNS}
        FROM learning_goals
        WHERE user_id = ? AND community_id = ?
        ORDER BY created_at, rowid
        "#
    );

    let goals = sqlx::query_as::<_, LearningGoal>(&query)
        .bind(user_id)
        .bind(community_id)
        .fetch_all(pool)
        .await?;

    Ok(goals)
}

/// Goals of many users in one community, grouped by user id.
///
/// Users without goals are absent from the map.
pub async fn goals_for_users(
    pool: &SqlitePool,
    user_ids: &[String],
    community_id: &str,
) -> Result<HashMap<String, Vec<LearningGoal>>> {
    let mut grouped: HashMap<String, Vec<LearningGoal>> = HashMap::new();
    if user_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {GOAL_COLUMNS} FROM learning_goals WHERE community_id = "
    ));
    builder.push_bind(community_id);
    builder.push(" AND user_id IN (");
    let mut separated = builder.separated(", ");
    for user_id in user_ids {
        separated.push_bind(user_id);
    }
    separated.push_unseparated(") ORDER BY created_at, rowid");

    let goals = builder
        .build_query_as::<LearningGoal>()
        .fetch_all(pool)
        .await?;

    for goal in goals {
        grouped.entry(goal.user_id.clone()).or_default().push(goal);
    }

    Ok(grouped)
}

/// Apply a partial update to a goal.
pub async fn update_goal(pool: &SqlitePool, id: &str, update: &GoalUpdate) -> Result<LearningGoal> {
    let query = format!(
        r#"
        UPDATE learning_goals
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            is_completed = COALESCE(?, is_completed),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        RETURNING {GOAL_COLUMNS}
        "#
    );

    sqlx::query_as::<_, LearningGoal>(&query)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.is_completed)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "LearningGoal",
            id: id.to_string(),
        })
}

/// Delete a goal by ID.
pub async fn delete_goal(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM learning_goals
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "LearningGoal",
            id: id.to_string(),
        });
    }

    Ok(())
}
