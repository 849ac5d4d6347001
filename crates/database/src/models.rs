//! Database models.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account linked to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Internal UUID.
    pub id: String,
    /// Stable id issued by the identity provider.
    pub external_id: String,
    /// Primary email address.
    pub email: String,
    /// Display name
    pub name: String,
    /// Avatar URL, if the provider supplied one.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Profile fields supplied by the identity provider on each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// A named learning space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// User who created the community, if still present.
    pub created_by: Option<String>,
    pub created_at: String,
}

/// One page of the community directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPage {
    pub items: Vec<Community>,
    /// Offset of the next page; `None` on the last one.
    pub next_offset: Option<i64>,
}

/// A user's membership in a community, joined with the community itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Membership row id.
    pub membership_id: String,
    pub user_id: String,
    pub joined_at: String,
    #[sqlx(flatten)]
    pub community: Community,
}

/// A learning goal owned by one user within one community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LearningGoal {
    pub id: String,
    pub user_id: String,
    pub community_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a new learning goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update for a learning goal. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Active,
    Declined,
}

impl MatchStatus {
    /// Column value stored in the `matches.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Active => "active",
            MatchStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pairing of two users within one community.
///
/// `user1_id` is the user who initiated the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub community_id: String,
    pub status: MatchStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Match {
    /// Whether the given user is one of the two participants.
    pub fn involves(&self, user_id: &str) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The other participant, seen from `user_id`.
    pub fn partner_id(&self, user_id: &str) -> &str {
        if self.user1_id == user_id {
            &self.user2_id
        } else {
            &self.user1_id
        }
    }
}

/// The chat thread attached to an active match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub match_id: String,
    pub last_message_at: Option<String>,
    pub created_at: String,
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

/// A chat message joined with its sender's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub sender_name: String,
    pub created_at: String,
}

/// Per-user count of matching-engine invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounter {
    pub user_id: String,
    pub used: i64,
    pub updated_at: String,
}

/// Aggregate counts shown on a user's dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub goal_count: i64,
    pub completed_goal_count: i64,
    pub community_count: i64,
    pub pending_match_count: i64,
    pub active_match_count: i64,
}

/// A user as returned by search: no timestamps, no external id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}
