//! Offline-push job handler: consumes the `to-offline-push` topic and
//! invokes the vendor adapter (§4.5).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use imrelay_core::traits::{BrokerHandler, BrokerRecord, OfflinePushOptions, OfflinePusher};
use imrelay_core::AppResult;
use imrelay_dispatch::OfflinePushRecord;
use imrelay_message::{Message, MsgStatus};

/// Handles records off the offline-push queue: promotes delivery status,
/// derives push text, and calls the vendor adapter. Vendor failures are
/// logged and counted, never retried — the broker's at-least-once
/// delivery already gave the message one chance (§4.5, §7).
#[derive(Debug)]
pub struct OfflinePushHandler {
    pusher: Arc<dyn OfflinePusher>,
    failed_push_count: AtomicU64,
}

impl OfflinePushHandler {
    pub fn new(pusher: Arc<dyn OfflinePusher>) -> Self {
        Self {
            pusher,
            failed_push_count: AtomicU64::new(0),
        }
    }

    pub fn failed_push_count(&self) -> u64 {
        self.failed_push_count.load(Ordering::Relaxed)
    }

    /// Uses the message's `OfflinePushInfo` verbatim when present, falling
    /// back to the content type's default title/text (§4.5). Either way,
    /// an empty content falls back to the title.
    fn derive_title_and_content(msg: &Message) -> (String, String) {
        let (title, mut content) = match &msg.offline_push_info {
            Some(info) if info.is_present() => (info.title.clone(), info.desc.clone()),
            _ => {
                let default = msg.content_type.default_push_title();
                (default.to_string(), default.to_string())
            }
        };
        if content.is_empty() {
            content = title.clone();
        }
        (title, content)
    }
}

#[async_trait]
impl BrokerHandler for OfflinePushHandler {
    async fn handle(&self, record: BrokerRecord) -> AppResult<()> {
        let decoded: OfflinePushRecord = serde_json::from_slice(&record.payload)?;
        let mut msg = decoded.msg;
        if msg.status == MsgStatus::Sending {
            msg.status = MsgStatus::SendSuccess;
        }

        let (title, desc) = Self::derive_title_and_content(&msg);
        let opts = OfflinePushOptions {
            signal_client_msg_id: Some(msg.client_msg_id.clone()),
            ios_push_sound: msg.offline_push_info.as_ref().and_then(|i| i.ios_push_sound.clone()),
            ios_badge_count: msg.offline_push_info.as_ref().and_then(|i| i.ios_badge_count),
            ex: msg
                .offline_push_info
                .as_ref()
                .map(|i| i.ex.clone())
                .filter(|ex| !ex.is_empty()),
        };

        if let Err(err) = self
            .pusher
            .push(&decoded.offline_user_ids, &title, &desc, &opts)
            .await
        {
            self.failed_push_count.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                error = %err,
                server_msg_id = %msg.server_msg_id,
                "offline push failed, not retried"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use imrelay_core::types::{MsgId, UserId};
    use imrelay_message::{ContentType, MsgOptions, OfflinePushInfo, Recv, SessionType};
    use uuid::Uuid;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingPusher {
        calls: Mutex<Vec<(Vec<UserId>, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl OfflinePusher for RecordingPusher {
        async fn push(
            &self,
            user_ids: &[UserId],
            title: &str,
            content: &str,
            _opts: &OfflinePushOptions,
        ) -> AppResult<()> {
            if self.fail {
                return Err(imrelay_core::AppError::transient("vendor unavailable"));
            }
            self.calls
                .lock()
                .unwrap()
                .push((user_ids.to_vec(), title.to_string(), content.to_string()));
            Ok(())
        }
    }

    fn base_msg() -> Message {
        Message {
            server_msg_id: MsgId::from_uuid(Uuid::nil()),
            client_msg_id: "c1".to_string(),
            sender: UserId::new(),
            recv: Recv::User(UserId::new()),
            session_type: SessionType::Single,
            content_type: ContentType::TEXT,
            content: b"hi".to_vec(),
            send_time: 1,
            seq: 1,
            at_user_ids: Vec::new(),
            offline_push_info: None,
            options: MsgOptions::new(),
            status: MsgStatus::Sending,
        }
    }

    #[tokio::test]
    async fn uses_default_title_when_no_offline_push_info() {
        let pusher = Arc::new(RecordingPusher::default());
        let handler = OfflinePushHandler::new(pusher.clone());
        let target = UserId::new();
        let record = OfflinePushRecord {
            msg: base_msg(),
            offline_user_ids: vec![target],
        };
        handler
            .handle(BrokerRecord {
                partition_key: "n_x".to_string(),
                payload: serde_json::to_vec(&record).unwrap(),
            })
            .await
            .unwrap();

        let calls = pusher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "New message");
    }

    #[tokio::test]
    async fn uses_explicit_offline_push_info_when_present() {
        let pusher = Arc::new(RecordingPusher::default());
        let handler = OfflinePushHandler::new(pusher.clone());
        let mut msg = base_msg();
        msg.offline_push_info = Some(OfflinePushInfo {
            title: "Custom".to_string(),
            desc: "Custom body".to_string(),
            ex: String::new(),
            ios_badge_count: None,
            ios_push_sound: None,
        });
        let record = OfflinePushRecord {
            msg,
            offline_user_ids: vec![UserId::new()],
        };
        handler
            .handle(BrokerRecord {
                partition_key: "n_x".to_string(),
                payload: serde_json::to_vec(&record).unwrap(),
            })
            .await
            .unwrap();

        let calls = pusher.calls.lock().unwrap();
        assert_eq!(calls[0].1, "Custom");
        assert_eq!(calls[0].2, "Custom body");
    }

    #[tokio::test]
    async fn explicit_title_with_empty_desc_falls_back_to_title() {
        let pusher = Arc::new(RecordingPusher::default());
        let handler = OfflinePushHandler::new(pusher.clone());
        let mut msg = base_msg();
        msg.offline_push_info = Some(OfflinePushInfo {
            title: "Custom".to_string(),
            desc: String::new(),
            ex: String::new(),
            ios_badge_count: None,
            ios_push_sound: None,
        });
        let record = OfflinePushRecord {
            msg,
            offline_user_ids: vec![UserId::new()],
        };
        handler
            .handle(BrokerRecord {
                partition_key: "n_x".to_string(),
                payload: serde_json::to_vec(&record).unwrap(),
            })
            .await
            .unwrap();

        let calls = pusher.calls.lock().unwrap();
        assert_eq!(calls[0].1, "Custom");
        assert_eq!(calls[0].2, "Custom");
    }

    #[tokio::test]
    async fn vendor_failure_is_counted_and_not_propagated() {
        let pusher = Arc::new(RecordingPusher {
            fail: true,
            ..Default::default()
        });
        let handler = OfflinePushHandler::new(pusher);
        let record = OfflinePushRecord {
            msg: base_msg(),
            offline_user_ids: vec![UserId::new()],
        };
        let result = handler
            .handle(BrokerRecord {
                partition_key: "n_x".to_string(),
                payload: serde_json::to_vec(&record).unwrap(),
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(handler.failed_push_count(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let handler = OfflinePushHandler::new(Arc::new(RecordingPusher::default()));
        let result = handler
            .handle(BrokerRecord {
                partition_key: "n_x".to_string(),
                payload: b"not json".to_vec(),
            })
            .await;
        assert!(result.is_err());
    }
}
