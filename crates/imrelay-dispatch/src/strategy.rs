//! Online-push strategies (§4.2). Choice is static per deployment,
//! configured by discovery flavor.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use imrelay_core::traits::{GatewayPush, OnlinePushResult};
use imrelay_core::types::UserId;
use imrelay_core::AppResult;

/// Resolves which gateway instance(s) own which users. No production
/// implementation lives here (the gateway's own connection lifecycle is
/// a non-goal, §1); this is the seam a deployment's service-discovery
/// client plugs into.
pub trait GatewayDiscovery: Send + Sync + std::fmt::Debug + 'static {
    /// Every gateway instance, for fan-out-all.
    fn instances(&self) -> Vec<Arc<dyn GatewayPush>>;

    /// The single gateway instance a user's connection is pinned to by
    /// the deployment's consistent-hash ring, with a host label for
    /// grouping/logging.
    fn owning_instance(&self, user_id: UserId) -> (String, Arc<dyn GatewayPush>);
}

/// An online-push strategy, pluggable per deployment.
#[async_trait]
pub trait OnlinePushStrategy: Send + Sync + std::fmt::Debug + 'static {
    async fn push(&self, payload: &[u8], targets: &[UserId]) -> AppResult<Vec<OnlinePushResult>>;
}

/// Broadcast to every gateway instance in parallel, bounded by
/// `max_concurrent_workers` (floor 3). Failure of one instance does not
/// fail the dispatch; per user, the last result reporting
/// `online_push = true` wins.
#[derive(Debug)]
pub struct FanOutAllStrategy {
    instances: Vec<Arc<dyn GatewayPush>>,
    max_concurrent_workers: usize,
}

impl FanOutAllStrategy {
    pub fn new(instances: Vec<Arc<dyn GatewayPush>>, max_concurrent_workers: usize) -> Self {
        Self {
            instances,
            max_concurrent_workers: max_concurrent_workers.max(3),
        }
    }
}

#[async_trait]
impl OnlinePushStrategy for FanOutAllStrategy {
    async fn push(&self, payload: &[u8], targets: &[UserId]) -> AppResult<Vec<OnlinePushResult>> {
        let per_instance: Vec<AppResult<Vec<OnlinePushResult>>> = stream::iter(&self.instances)
            .map(|gateway| async move { gateway.push_to_users(payload, targets).await })
            .buffer_unordered(self.max_concurrent_workers)
            .collect()
            .await;

        let mut merged: HashMap<UserId, OnlinePushResult> = HashMap::new();
        for result in per_instance {
            match result {
                Ok(results) => {
                    for r in results {
                        merged
                            .entry(r.user_id)
                            .and_modify(|existing| {
                                if r.online_push {
                                    *existing = r.clone();
                                }
                            })
                            .or_insert(r);
                    }
                }
                Err(err) => tracing::warn!(error = %err, "gateway instance push failed, continuing fan-out"),
            }
        }
        Ok(merged.into_values().collect())
    }
}

/// Group users by owning gateway host and send one RPC per host.
#[derive(Debug)]
pub struct ConsistentHashStrategy {
    discovery: Arc<dyn GatewayDiscovery>,
}

impl ConsistentHashStrategy {
    pub fn new(discovery: Arc<dyn GatewayDiscovery>) -> Self {
        Self { discovery }
    }
}

#[async_trait]
impl OnlinePushStrategy for ConsistentHashStrategy {
    async fn push(&self, payload: &[u8], targets: &[UserId]) -> AppResult<Vec<OnlinePushResult>> {
        let mut by_host: HashMap<String, (Arc<dyn GatewayPush>, Vec<UserId>)> = HashMap::new();
        for &user_id in targets {
            let (host, gateway) = self.discovery.owning_instance(user_id);
            by_host.entry(host).or_insert_with(|| (gateway, Vec::new())).1.push(user_id);
        }

        let mut merged = Vec::new();
        for (host, (gateway, users)) in by_host {
            match gateway.push_to_users(payload, &users).await {
                Ok(results) => merged.extend(results),
                Err(err) => {
                    tracing::warn!(error = %err, host, "gateway host push failed, continuing fan-out")
                }
            }
        }
        Ok(merged)
    }
}

/// No gateway instances are reachable; every target is treated as
/// offline-capable.
#[derive(Debug, Default)]
pub struct EmptyStrategy;

#[async_trait]
impl OnlinePushStrategy for EmptyStrategy {
    async fn push(&self, _payload: &[u8], _targets: &[UserId]) -> AppResult<Vec<OnlinePushResult>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubGateway {
        online: Vec<UserId>,
    }

    #[async_trait]
    impl GatewayPush for StubGateway {
        async fn push_to_users(&self, _payload: &[u8], user_ids: &[UserId]) -> AppResult<Vec<OnlinePushResult>> {
            Ok(user_ids
                .iter()
                .map(|&user_id| OnlinePushResult {
                    user_id,
                    online_push: self.online.contains(&user_id),
                    platform_id: None,
                    error: None,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn fan_out_all_merges_across_instances() {
        let a = UserId::new();
        let b = UserId::new();
        let strategy = FanOutAllStrategy::new(
            vec![
                Arc::new(StubGateway { online: vec![a] }),
                Arc::new(StubGateway { online: vec![b] }),
            ],
            1,
        );
        let results = strategy.push(b"payload", &[a, b]).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.online_push));
    }

    #[tokio::test]
    async fn fan_out_all_enforces_worker_floor() {
        let strategy = FanOutAllStrategy::new(Vec::new(), 1);
        assert_eq!(strategy.max_concurrent_workers, 3);
    }

    #[tokio::test]
    async fn empty_strategy_returns_nothing() {
        let results = EmptyStrategy.push(b"x", &[UserId::new()]).await.unwrap();
        assert!(results.is_empty());
    }
}
