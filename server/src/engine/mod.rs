//! Protocol-agnostic chat core: the shared room registry, the per-connection
//! session state machine, and the command router it dispatches through.

pub mod error;
pub mod events;
pub mod registry;
pub mod room;
pub mod router;
pub mod session;
pub mod user_session;
pub mod validation;
