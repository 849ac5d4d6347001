//! Application state shared across handlers.

use std::sync::Arc;

use brain_core::{InsightGenerator, PartnerRanker};
use database::Database;
use matching::{
    ChatService, CommunityService, GoalService, InsightService, MatchingEngine,
    PartnershipService, UsagePolicy, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Bearer token the identity gateway must present, if any.
    pub identity_token: Option<Arc<str>>,
    pub engine: Arc<MatchingEngine>,
    pub insight: Arc<InsightService>,
    pub communities: CommunityService,
    pub goals: GoalService,
    pub partnerships: PartnershipService,
    pub chat: ChatService,
    pub users: UserService,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        ranker: Arc<dyn PartnerRanker>,
        generator: Arc<dyn InsightGenerator>,
        usage: UsagePolicy,
        identity_token: Option<String>,
    ) -> Self {
        let pool = db.pool().clone();
        Self {
            identity_token: identity_token.map(Arc::from),
            engine: Arc::new(MatchingEngine::new(pool.clone(), ranker, usage)),
            insight: Arc::new(InsightService::new(pool.clone(), generator)),
            communities: CommunityService::new(pool.clone()),
            goals: GoalService::new(pool.clone()),
            partnerships: PartnershipService::new(pool.clone()),
            chat: ChatService::new(pool.clone()),
            users: UserService::new(pool),
            db,
        }
    }
}
