//! Broker adapter wiring the dispatcher to the `to-push` consumer loop.

use std::sync::Arc;

use async_trait::async_trait;
use imrelay_core::traits::{BrokerHandler, BrokerRecord};
use imrelay_core::AppResult;
use imrelay_message::Message;

use crate::dispatcher::Dispatcher;

/// Decodes a [`Message`] off the `to-push` topic and runs it through
/// [`Dispatcher::dispatch`].
#[derive(Debug)]
pub struct DispatchHandler {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl BrokerHandler for DispatchHandler {
    async fn handle(&self, record: BrokerRecord) -> AppResult<()> {
        let msg: Message = serde_json::from_slice(&record.payload)?;
        self.dispatcher.dispatch(msg).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use imrelay_core::types::{MsgId, UserId};
    use imrelay_core::AppResult;
    use imrelay_message::{ContentType, Message, MsgOptions, MsgStatus, Recv, SessionType};
    use uuid::Uuid;

    use super::*;
    use crate::group::GroupMembershipSource;
    use crate::hook::HookInvoker;
    use crate::queue::OfflinePushQueue;
    use crate::strategy::EmptyStrategy;
    use imrelay_core::traits::{BrokerProducer, BrokerRecord as CoreBrokerRecord};
    use imrelay_presence::PresenceCache;

    #[derive(Debug)]
    struct NoopGroups;

    #[async_trait]
    impl GroupMembershipSource for NoopGroups {
        async fn members(&self, _group_id: imrelay_core::types::GroupId) -> AppResult<Vec<UserId>> {
            Ok(Vec::new())
        }

        async fn do_not_disturb(
            &self,
            _group_id: imrelay_core::types::GroupId,
            _candidates: &[UserId],
        ) -> AppResult<Vec<UserId>> {
            Ok(Vec::new())
        }

        async fn cleanup_dismissed_group(&self, _group_id: imrelay_core::types::GroupId) -> AppResult<()> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct CountingProducer {
        count: AtomicUsize,
    }

    #[async_trait]
    impl BrokerProducer for CountingProducer {
        async fn publish(&self, _topic: &str, _record: CoreBrokerRecord) -> AppResult<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn decodes_and_dispatches_a_message() {
        use imrelay_presence::source::PresenceSource;
        use imrelay_presence::{OnlineUsersPage, Phase, PresencePhase};

        #[derive(Debug)]
        struct EmptySource;

        #[async_trait]
        impl PresenceSource for EmptySource {
            async fn scan_online_users(&self, _cursor: Option<&str>) -> AppResult<OnlineUsersPage> {
                Ok(OnlineUsersPage::default())
            }

            async fn fetch_platforms(&self, _user_ids: &[UserId]) -> AppResult<Vec<(UserId, Vec<i32>)>> {
                Ok(Vec::new())
            }
        }

        let phase = PresencePhase::new();
        let presence = Arc::new(
            PresenceCache::full(Arc::new(EmptySource), &Default::default(), &phase)
                .await
                .unwrap(),
        );
        phase.advance_to(Phase::DoSubscribeOver);

        let producer = Arc::new(CountingProducer::default());
        let dispatcher = Arc::new(Dispatcher::new(
            presence,
            Arc::new(EmptyStrategy),
            HookInvoker::new(None, Default::default()),
            Arc::new(NoopGroups),
            Arc::new(OfflinePushQueue::new(producer.clone())),
        ));

        let handler = DispatchHandler::new(dispatcher);

        let msg = Message {
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
            status: MsgStatus::SendSuccess,
        }
        .encapsulate();
        let payload = serde_json::to_vec(&msg).unwrap();

        handler
            .handle(BrokerRecord {
                partition_key: msg.conversation_id().to_string(),
                payload,
            })
            .await
            .unwrap();

        assert_eq!(producer.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        use imrelay_presence::source::PresenceSource;
        use imrelay_presence::{OnlineUsersPage, Phase, PresencePhase};

        #[derive(Debug)]
        struct EmptySource;

        #[async_trait]
        impl PresenceSource for EmptySource {
            async fn scan_online_users(&self, _cursor: Option<&str>) -> AppResult<OnlineUsersPage> {
                Ok(OnlineUsersPage::default())
            }

            async fn fetch_platforms(&self, _user_ids: &[UserId]) -> AppResult<Vec<(UserId, Vec<i32>)>> {
                Ok(Vec::new())
            }
        }

        let phase = PresencePhase::new();
        let presence = Arc::new(
            PresenceCache::full(Arc::new(EmptySource), &Default::default(), &phase)
                .await
                .unwrap(),
        );
        phase.advance_to(Phase::DoSubscribeOver);

        let producer = Arc::new(CountingProducer::default());
        let dispatcher = Arc::new(Dispatcher::new(
            presence,
            Arc::new(EmptyStrategy),
            HookInvoker::new(None, Default::default()),
            Arc::new(NoopGroups),
            Arc::new(OfflinePushQueue::new(producer.clone())),
        ));

        let handler = DispatchHandler::new(dispatcher);

        let result = handler
            .handle(BrokerRecord {
                partition_key: "whatever".to_string(),
                payload: b"not json".to_vec(),
            })
            .await;

        assert!(result.is_err());
    }
}
