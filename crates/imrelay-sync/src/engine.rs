//! The incremental version sync decision procedure and delta extraction
//! (§4.4).

use std::collections::HashMap;

use imrelay_core::AppResult;

use crate::log::{ChangeRecord, OpType, VersionLog};
use crate::traits::VersionSource;
use crate::version_id::VersionId;

/// How the engine classified a target's sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Full,
    Equal,
    Query,
}

/// The insert/update/delete id sets extracted from a version log, with
/// the sort-change version surfaced separately.
#[derive(Debug, Clone, Default)]
pub struct DeltaIds {
    pub insert: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
    pub sort_version: Option<u64>,
}

/// Scan a log once, producing three disjoint id sets. An entity may
/// appear multiple times; the last op wins, which already makes a
/// trailing delete win over an earlier insert/update with no extra
/// logic. A sort-change record never enters the three sets.
pub fn extract_delta(records: &[ChangeRecord]) -> DeltaIds {
    let mut last_op: HashMap<&str, OpType> = HashMap::new();
    let mut sort_version = None;

    for record in records {
        match record.op {
            OpType::SortChange => sort_version = Some(record.version),
            op => {
                last_op.insert(&record.eid, op);
            }
        }
    }

    let mut delta = DeltaIds {
        sort_version,
        ..Default::default()
    };
    for (eid, op) in last_op {
        match op {
            OpType::Insert => delta.insert.push(eid.to_string()),
            OpType::Update => delta.update.push(eid.to_string()),
            OpType::Delete => delta.delete.push(eid.to_string()),
            OpType::SortChange => unreachable!("sort-change records are filtered above"),
        }
    }
    delta
}

/// A completed single-target sync response.
#[derive(Debug, Clone)]
pub struct SyncResponse<Entity> {
    pub version_id: VersionId,
    pub version: u64,
    pub full: bool,
    pub delete: Vec<String>,
    pub insert: Vec<Entity>,
    pub update: Vec<Entity>,
    pub sort_version: Option<u64>,
}

fn is_truncated(log: &VersionLog) -> bool {
    log.logs.len() as u64 != log.log_len
}

/// Downgrade to `Full` if the fetched log no longer matches the client's
/// claimed version, per step 4.
fn downgrade_if_stale(tag: Tag, log: &VersionLog, client_version_id: &VersionId, client_version_number: u64) -> Tag {
    if &log.id != client_version_id || log.version < client_version_number || is_truncated(log) {
        Tag::Full
    } else {
        tag
    }
}

/// Run the single-target decision procedure and build its response.
pub async fn sync_single<Entity>(
    source: &dyn VersionSource<Entity>,
    version_key: &str,
    client_version_id: Option<VersionId>,
    client_version_number: u64,
    window_limit: u64,
) -> AppResult<SyncResponse<Entity>>
where
    Entity: Send + Sync + 'static,
{
    let valid_client_version = client_version_id
        .as_ref()
        .map(|id| id.validate())
        .unwrap_or(false)
        && client_version_number > 0;

    let cache_latest = source.cache_latest(version_key).await?;

    enum Fetched {
        Latest(crate::log::LatestVersion, Tag),
        Log(VersionLog, Tag),
    }

    let fetched = match cache_latest {
        Some(latest) => {
            if !valid_client_version {
                Fetched::Latest(latest, Tag::Full)
            } else if client_version_id.as_ref() != Some(&latest.id) {
                Fetched::Latest(latest, Tag::Full)
            } else if client_version_number == latest.version {
                Fetched::Latest(latest, Tag::Equal)
            } else {
                let log = source
                    .versions(version_key, client_version_number, window_limit)
                    .await?;
                Fetched::Log(log, Tag::Query)
            }
        }
        None => {
            if valid_client_version {
                let log = source
                    .versions(version_key, client_version_number, window_limit)
                    .await?;
                Fetched::Log(log, Tag::Query)
            } else {
                let log = source.versions(version_key, 0, 0).await?;
                Fetched::Log(log, Tag::Full)
            }
        }
    };

    match fetched {
        Fetched::Latest(latest, tag) => Ok(SyncResponse {
            version_id: latest.id,
            version: latest.version,
            full: matches!(tag, Tag::Full),
            delete: Vec::new(),
            insert: Vec::new(),
            update: Vec::new(),
            sort_version: None,
        }),
        Fetched::Log(log, tag) => {
            let fallback_client_id = VersionId::new(String::new());
            let client_id_for_check = client_version_id.as_ref().unwrap_or(&fallback_client_id);
            let tag = downgrade_if_stale(tag, &log, client_id_for_check, client_version_number);

            let delta = extract_delta(&log.logs);
            let insert = if delta.insert.is_empty() {
                Vec::new()
            } else {
                source.find(version_key, &delta.insert).await?
            };
            let update = if delta.update.is_empty() {
                Vec::new()
            } else {
                source.find(version_key, &delta.update).await?
            };

            Ok(SyncResponse {
                version_id: log.id,
                version: log.version,
                full: matches!(tag, Tag::Full),
                delete: delta.delete,
                insert,
                update,
                sort_version: delta.sort_version,
            })
        }
    }
}

/// One target in a batch sync request.
#[derive(Debug, Clone)]
pub struct BatchTarget {
    pub version_key: String,
    pub client_version_id: Option<VersionId>,
    pub client_version_number: u64,
}

/// The per-target responses from a batch sync call. Each entry carries
/// its own `sort_version`, same as a single-target [`SyncResponse`].
#[derive(Debug, Clone)]
pub struct BatchSyncResponse<Entity> {
    pub targets: Vec<(String, SyncResponse<Entity>)>,
}

/// Run the decision procedure for every target independently. Targets
/// resolving to `Query` each fetch their own log; `Full`/`Equal` targets
/// reuse their own `cacheLatest` lookup. On the first error from any
/// target's `Versions`/`Find` call, the whole batch fails (§7's
/// propagation rule).
pub async fn sync_batch<Entity>(
    source: &dyn VersionSource<Entity>,
    targets: &[BatchTarget],
    window_limit: u64,
) -> AppResult<BatchSyncResponse<Entity>>
where
    Entity: Send + Sync + 'static,
{
    let futures_iter = targets.iter().map(|target| async move {
        let response = sync_single(
            source,
            &target.version_key,
            target.client_version_id.clone(),
            target.client_version_number,
            window_limit,
        )
        .await;
        (target.version_key.clone(), response)
    });

    let results = futures::future::join_all(futures_iter).await;
    let mut targets_out = Vec::with_capacity(results.len());
    for (key, response) in results {
        targets_out.push((key, response?));
    }
    Ok(BatchSyncResponse { targets: targets_out })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entity(String);

    struct FakeSource {
        latest: Option<crate::log::LatestVersion>,
        log: Mutex<Option<VersionLog>>,
        find_calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl VersionSource<Entity> for FakeSource {
        async fn cache_latest(&self, _version_key: &str) -> AppResult<Option<crate::log::LatestVersion>> {
            Ok(self.latest.clone())
        }

        async fn versions(&self, _version_key: &str, _from: u64, _limit: u64) -> AppResult<VersionLog> {
            Ok(self.log.lock().unwrap().clone().expect("log configured"))
        }

        async fn find(&self, _version_key: &str, ids: &[String]) -> AppResult<Vec<Entity>> {
            self.find_calls.lock().unwrap().push(ids.to_vec());
            Ok(ids.iter().map(|id| Entity(id.clone())).collect())
        }
    }

    fn change(eid: &str, op: OpType, version: u64) -> ChangeRecord {
        ChangeRecord {
            eid: eid.to_string(),
            op,
            version,
        }
    }

    #[tokio::test]
    async fn invalid_client_version_with_cache_returns_full() {
        let source = FakeSource {
            latest: Some(crate::log::LatestVersion {
                id: VersionId::new("v2"),
                version: 9,
            }),
            log: Mutex::new(None),
            find_calls: Mutex::new(Vec::new()),
        };
        let resp = sync_single(&source, "owner-1", None, 0, 200).await.unwrap();
        assert!(resp.full);
        assert_eq!(resp.version, 9);
        assert!(resp.insert.is_empty());
    }

    #[tokio::test]
    async fn matching_version_is_equal() {
        let source = FakeSource {
            latest: Some(crate::log::LatestVersion {
                id: VersionId::new("v2"),
                version: 9,
            }),
            log: Mutex::new(None),
            find_calls: Mutex::new(Vec::new()),
        };
        let resp = sync_single(&source, "owner-1", Some(VersionId::new("v2")), 9, 200)
            .await
            .unwrap();
        assert!(!resp.full);
        assert_eq!(resp.version_id, VersionId::new("v2"));
        assert!(resp.insert.is_empty() && resp.update.is_empty() && resp.delete.is_empty());
    }

    #[tokio::test]
    async fn stale_version_queries_and_extracts_delta() {
        let log = VersionLog {
            id: VersionId::new("v2"),
            version: 12,
            logs: vec![
                change("a", OpType::Insert, 10),
                change("a", OpType::Update, 11),
                change("b", OpType::Delete, 12),
                change("c", OpType::SortChange, 12),
            ],
            log_len: 4,
        };
        let source = FakeSource {
            latest: Some(crate::log::LatestVersion {
                id: VersionId::new("v2"),
                version: 12,
            }),
            log: Mutex::new(Some(log)),
            find_calls: Mutex::new(Vec::new()),
        };
        let resp = sync_single(&source, "owner-1", Some(VersionId::new("v2")), 9, 200)
            .await
            .unwrap();
        assert!(!resp.full);
        assert_eq!(resp.update, vec![Entity("a".to_string())]);
        assert_eq!(resp.delete, vec!["b".to_string()]);
        assert_eq!(resp.sort_version, Some(12));
        assert!(resp.insert.is_empty());
    }

    #[tokio::test]
    async fn truncated_log_downgrades_to_full() {
        let log = VersionLog {
            id: VersionId::new("v2"),
            version: 12,
            logs: vec![change("a", OpType::Insert, 12)],
            log_len: 5,
        };
        let source = FakeSource {
            latest: Some(crate::log::LatestVersion {
                id: VersionId::new("v2"),
                version: 12,
            }),
            log: Mutex::new(Some(log)),
            find_calls: Mutex::new(Vec::new()),
        };
        let resp = sync_single(&source, "owner-1", Some(VersionId::new("v2")), 9, 200)
            .await
            .unwrap();
        assert!(resp.full);
    }

    #[tokio::test]
    async fn no_cache_configured_dumps_full_log() {
        let log = VersionLog {
            id: VersionId::new("v3"),
            version: 4,
            logs: vec![change("x", OpType::Insert, 1), change("y", OpType::Insert, 2)],
            log_len: 2,
        };
        let source = FakeSource {
            latest: None,
            log: Mutex::new(Some(log)),
            find_calls: Mutex::new(Vec::new()),
        };
        let resp = sync_single(&source, "owner-1", None, 0, 200).await.unwrap();
        assert!(resp.full);
        assert_eq!(resp.insert.len(), 2);
    }

    #[tokio::test]
    async fn batch_runs_each_target_independently() {
        let log = VersionLog {
            id: VersionId::new("v2"),
            version: 12,
            logs: vec![change("a", OpType::Insert, 12)],
            log_len: 1,
        };
        let source = FakeSource {
            latest: Some(crate::log::LatestVersion {
                id: VersionId::new("v2"),
                version: 12,
            }),
            log: Mutex::new(Some(log)),
            find_calls: Mutex::new(Vec::new()),
        };
        let targets = vec![
            BatchTarget {
                version_key: "owner-1".to_string(),
                client_version_id: Some(VersionId::new("v2")),
                client_version_number: 9,
            },
            BatchTarget {
                version_key: "owner-2".to_string(),
                client_version_id: Some(VersionId::new("v2")),
                client_version_number: 12,
            },
        ];
        let results = sync_batch(&source, &targets, 200).await.unwrap();
        assert_eq!(results.targets.len(), 2);
        assert!(!results.targets[1].1.full);
    }
}
