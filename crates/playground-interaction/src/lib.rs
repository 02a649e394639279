//! Chat request coordination and session lifecycle.

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod lifecycle;

pub use backend::{ChatBackend, ChatReply, ChatRequest, HttpChatBackend};
pub use coordinator::{ChatCoordinator, SendOutcome, SendState};
pub use error::{AuthError, ChatError};
pub use lifecycle::{SessionLifecycle, View};
