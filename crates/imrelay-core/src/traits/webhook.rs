//! Webhook interceptor trait (§6 External Interfaces).
//!
//! `before*` hooks run synchronously and may fail the triggering operation
//! or rewrite fields on it; `after*` hooks run fire-and-forget and never
//! affect the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Recognized hook points. Friend- and message-operation before/after pairs
/// beyond the push and read-receipt hooks are out of scope here (§1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPoint {
    BeforeOnlinePush,
    BeforeOfflinePush,
    BeforeGroupOnlinePush,
    AfterRevokeMsg,
    AfterSingleMsgRead,
    AfterGroupMsgRead,
}

impl HookPoint {
    /// `before*` hooks are synchronous and can short-circuit the operation.
    pub fn is_synchronous(self) -> bool {
        matches!(
            self,
            Self::BeforeOnlinePush | Self::BeforeOfflinePush | Self::BeforeGroupOnlinePush
        )
    }
}

/// One bound of a content-type filter: a single type or an inclusive range
/// (`"100-200"` in the wire format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRange {
    pub start: i32,
    pub end: i32,
}

impl TypeRange {
    pub fn single(value: i32) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.start && value <= self.end
    }

    /// Parse either `"100"` or `"100-200"`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.split_once('-') {
            Some((lo, hi)) => {
                let start = lo
                    .trim()
                    .parse()
                    .map_err(|_| crate::AppError::client(format!("invalid type range: {raw}")))?;
                let end = hi
                    .trim()
                    .parse()
                    .map_err(|_| crate::AppError::client(format!("invalid type range: {raw}")))?;
                Ok(Self { start, end })
            }
            None => {
                let value = raw
                    .trim()
                    .parse()
                    .map_err(|_| crate::AppError::client(format!("invalid type range: {raw}")))?;
                Ok(Self::single(value))
            }
        }
    }
}

/// Declarative filter attached to a hook registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookFilter {
    pub enable: bool,
    pub timeout: Option<Duration>,
    /// Only fire for these conversation or group ids; `None` means all.
    pub attention_ids: Option<Vec<String>>,
    pub allowed_types: Option<Vec<TypeRange>>,
    pub denied_types: Option<Vec<TypeRange>>,
}

impl HookFilter {
    /// Whether a message of `content_type` addressed to `attention_id`
    /// should trigger this hook, given its declarative filter.
    pub fn matches(&self, content_type: i32, attention_id: &str) -> bool {
        if !self.enable {
            return false;
        }
        if let Some(ids) = &self.attention_ids {
            if !ids.iter().any(|id| id == attention_id) {
                return false;
            }
        }
        if let Some(denied) = &self.denied_types {
            if denied.iter().any(|r| r.contains(content_type)) {
                return false;
            }
        }
        if let Some(allowed) = &self.allowed_types {
            return allowed.iter().any(|r| r.contains(content_type));
        }
        true
    }
}

/// Outcome of a synchronous `before*` hook invocation.
#[derive(Debug, Clone)]
pub enum HookOutcome<T> {
    /// Proceed with the (possibly rewritten) payload.
    Continue(T),
    /// Abort the triggering operation.
    Reject(String),
}

/// The webhook interceptor boundary. No production HTTP transport is
/// implemented here (§1 lists it as a non-goal); this trait is the seam a
/// deployment's transport adapter plugs into.
#[async_trait]
pub trait WebhookClient: Send + Sync + std::fmt::Debug + 'static {
    /// Invoke a synchronous `before*` hook, passing the JSON-encoded
    /// payload and receiving back a possibly-rewritten one.
    async fn call_before(&self, hook: HookPoint, payload: &[u8]) -> AppResult<HookOutcome<Vec<u8>>>;

    /// Fire an `after*` hook. Best-effort: callers must not let failures
    /// here affect the triggering operation.
    async fn call_after(&self, hook: HookPoint, payload: &[u8]);
}
