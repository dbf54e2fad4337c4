//! Webhook hook-point wiring for the dispatcher (§4.2, §6).

use std::collections::HashMap;
use std::sync::Arc;

use imrelay_core::traits::{HookFilter, HookOutcome, HookPoint, WebhookClient};
use imrelay_core::AppResult;
use serde::Serialize;

/// Dispatches to a webhook client per hook point, honoring each point's
/// declarative filter. A missing client, or a hook with no registered
/// filter (or a filter that doesn't match), both mean "call nothing,
/// proceed unchanged".
#[derive(Debug, Default, Clone)]
pub struct HookInvoker {
    client: Option<Arc<dyn WebhookClient>>,
    filters: HashMap<HookPoint, HookFilter>,
}

impl HookInvoker {
    pub fn new(client: Option<Arc<dyn WebhookClient>>, filters: HashMap<HookPoint, HookFilter>) -> Self {
        Self { client, filters }
    }

    fn enabled(&self, hook: HookPoint, content_type: i32, attention_id: &str) -> bool {
        self.client.is_some()
            && self
                .filters
                .get(&hook)
                .map(|f| f.matches(content_type, attention_id))
                .unwrap_or(false)
    }

    /// Call a synchronous `before*` hook. `Ok(None)` means the hook is
    /// disabled or absent and the caller should proceed with `payload`
    /// unchanged.
    pub async fn before<T: Serialize + Sync>(
        &self,
        hook: HookPoint,
        content_type: i32,
        attention_id: &str,
        payload: &T,
    ) -> AppResult<Option<HookOutcome<Vec<u8>>>> {
        if !self.enabled(hook, content_type, attention_id) {
            return Ok(None);
        }
        let client = self.client.as_ref().expect("checked by enabled()");
        let encoded = serde_json::to_vec(payload)?;
        Ok(Some(client.call_before(hook, &encoded).await?))
    }

    /// Fire an `after*` hook, best-effort: encode or transport failures
    /// are swallowed, never surfaced to the triggering operation.
    pub async fn after<T: Serialize + Sync>(&self, hook: HookPoint, content_type: i32, attention_id: &str, payload: &T) {
        if !self.enabled(hook, content_type, attention_id) {
            return;
        }
        let Some(client) = &self.client else { return };
        let Ok(encoded) = serde_json::to_vec(payload) else {
            return;
        };
        client.call_after(hook, &encoded).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct RejectingClient;

    #[async_trait]
    impl WebhookClient for RejectingClient {
        async fn call_before(&self, _hook: HookPoint, _payload: &[u8]) -> AppResult<HookOutcome<Vec<u8>>> {
            Ok(HookOutcome::Reject("blocked".to_string()))
        }
        async fn call_after(&self, _hook: HookPoint, _payload: &[u8]) {}
    }

    #[tokio::test]
    async fn disabled_hook_is_skipped() {
        let invoker = HookInvoker::new(Some(Arc::new(RejectingClient)), HashMap::new());
        let outcome = invoker
            .before(HookPoint::BeforeOnlinePush, 101, "conv-1", &"payload")
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn enabled_hook_can_reject() {
        let mut filters = HashMap::new();
        filters.insert(
            HookPoint::BeforeOnlinePush,
            HookFilter {
                enable: true,
                ..Default::default()
            },
        );
        let invoker = HookInvoker::new(Some(Arc::new(RejectingClient)), filters);
        let outcome = invoker
            .before(HookPoint::BeforeOnlinePush, 101, "conv-1", &"payload")
            .await
            .unwrap();
        assert!(matches!(outcome, Some(HookOutcome::Reject(_))));
    }
}
