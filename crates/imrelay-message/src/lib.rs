//! # imrelay-message
//!
//! Message options and routing (§4.1): the option vector that governs
//! storage/push/unread/sync behavior, conversation ID derivation, and the
//! `Encapsulate` canonicalization step every message goes through on
//! intake.

pub mod content_type;
pub mod conversation;
pub mod message;
pub mod options;

pub use content_type::ContentType;
pub use conversation::{ConversationId, SessionType};
pub use message::{Message, MsgStatus, OfflinePushInfo, Recv};
pub use options::{MsgOptions, OptionKey};
