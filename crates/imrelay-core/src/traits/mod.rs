//! External-collaborator traits (§6 External Interfaces).
//!
//! Each trait here is a seam the crate's domain logic calls through but
//! never implements in production: the offline-push vendor, the gateway's
//! online-push RPC, the webhook interceptor, and the message broker. All
//! four are explicit non-goals for a production adapter (§1); what lives
//! here is the contract, not the transport.

pub mod broker;
pub mod push;
pub mod webhook;

pub use broker::{BrokerConsumer, BrokerHandler, BrokerProducer, BrokerRecord};
pub use push::{GatewayPush, OfflinePushOptions, OfflinePusher, OnlinePushResult};
pub use webhook::{HookFilter, HookOutcome, HookPoint, TypeRange, WebhookClient};
