//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: message log entries and their wire projection
//! - `record`: login record, account identity, user instance id
//! - `identity`: resolution of the identity values of a session
//! - `auth`: the fixed credential allow-list

mod auth;
mod identity;
mod message;
mod record;

pub use auth::{ALLOWED_CREDENTIALS, Credential, authenticate};
pub use identity::{IdentityResolver, SessionIdentity, generate_user_instance_id};
pub use message::{DEFAULT_GREETING, Message, MessageRole, OutgoingMessage};
pub use record::{AccountIdentity, GUEST_EMAIL, SessionRecord, UserInstanceId};
