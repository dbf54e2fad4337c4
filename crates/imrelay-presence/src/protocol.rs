//! The presence pub/sub wire format (§6 External Interfaces).
//!
//! `"<userID>:<platformID>:<online|offline>[,<platformID>:<online|offline>]*"`.
//! An empty platform list after applying a delta means the user is
//! offline.

use imrelay_core::types::UserId;
use imrelay_core::{AppError, AppResult};

/// One platform's reported state within a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformState {
    pub platform_id: i32,
    pub online: bool,
}

/// A parsed presence delta for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceDelta {
    pub user_id: UserId,
    pub platforms: Vec<PlatformState>,
}

fn parse_state(raw: &str) -> AppResult<bool> {
    match raw {
        "online" => Ok(true),
        "offline" => Ok(false),
        other => Err(AppError::client(format!("unknown presence state: {other}"))),
    }
}

/// Parse one presence pub/sub payload.
pub fn parse(payload: &str) -> AppResult<PresenceDelta> {
    let mut parts = payload.split(':');
    let user_raw = parts
        .next()
        .ok_or_else(|| AppError::client("empty presence payload"))?;
    let user_id: UserId = user_raw
        .parse()
        .map_err(|_| AppError::client(format!("invalid user id in presence payload: {user_raw}")))?;

    let rest: String = parts.collect::<Vec<_>>().join(":");
    if rest.is_empty() {
        return Err(AppError::client("presence payload missing platform states"));
    }

    let mut platforms = Vec::new();
    for entry in rest.split(',') {
        let mut fields = entry.splitn(2, ':');
        let platform_raw = fields
            .next()
            .ok_or_else(|| AppError::client("missing platform id"))?;
        let state_raw = fields
            .next()
            .ok_or_else(|| AppError::client("missing platform state"))?;
        let platform_id: i32 = platform_raw
            .parse()
            .map_err(|_| AppError::client(format!("invalid platform id: {platform_raw}")))?;
        let online = parse_state(state_raw)?;
        platforms.push(PlatformState { platform_id, online });
    }

    Ok(PresenceDelta { user_id, platforms })
}

/// The online platform ids remaining after applying a delta's states.
pub fn online_platforms(delta: &PresenceDelta) -> Vec<i32> {
    delta
        .platforms
        .iter()
        .filter(|p| p.online)
        .map(|p| p.platform_id)
        .collect()
}
