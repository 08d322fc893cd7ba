//! Shared setup for service tests

use std::sync::Arc;

use super::ReviewService;
use crate::config::Config;
use crate::models::{Team, TeamMember};
use crate::selector::DeclaredOrder;
use crate::storage::memory::MemoryStorage;

pub(crate) type TestService = ReviewService<MemoryStorage>;

/// Service over fresh in-memory storage, candidates in id order
pub(crate) fn service() -> TestService {
    service_with(Config::default())
}

pub(crate) fn service_with(config: Config) -> TestService {
    ReviewService::with_order(MemoryStorage::new(), &config, Arc::new(DeclaredOrder))
}

/// Register `team` with active members named after their ids
pub(crate) async fn register(service: &TestService, team: &str, ids: &[&str]) {
    let members = ids
        .iter()
        .map(|id| TeamMember::new(*id, id.to_uppercase()))
        .collect();
    service.add_team(Team::new(team, members)).await.unwrap();
}
