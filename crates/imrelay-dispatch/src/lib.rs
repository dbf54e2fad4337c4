//! # imrelay-dispatch
//!
//! The push dispatcher (§4.2): online-push strategies, group handling,
//! webhook hook points, and offline fan-out onto the `to-offline-push`
//! queue.

pub mod dispatcher;
pub mod group;
pub mod handler;
pub mod hook;
pub mod queue;
pub mod strategy;

pub use dispatcher::Dispatcher;
pub use group::GroupMembershipSource;
pub use handler::DispatchHandler;
pub use hook::HookInvoker;
pub use queue::{OfflinePushQueue, OfflinePushRecord};
pub use strategy::{ConsistentHashStrategy, EmptyStrategy, FanOutAllStrategy, GatewayDiscovery, OnlinePushStrategy};
