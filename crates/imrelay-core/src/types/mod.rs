//! Shared domain identifiers.

pub mod id;

pub use id::{ConnId, GroupId, MsgId, UserId};
