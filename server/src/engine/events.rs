use uuid::Uuid;

use super::error::ChatError;

/// Unique identifier for a connected session (one per connection).
pub type SessionId = Uuid;

/// Outbound event queued for one session. The line layer turns each event
/// into one or more text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Banner and login prompt sent right after the connection opens.
    Greeting { server_name: String },

    /// Name accepted.
    Welcome { name: String },

    /// Sent to the session entering a room.
    EnterRoom { room: String },

    /// Another user joined the recipient's room.
    Join { room: String, name: String },

    /// A user left the room. `is_self` marks the copy sent to the leaver.
    Part {
        room: String,
        name: String,
        is_self: bool,
    },

    /// Chat line broadcast to a room.
    Message { from: String, content: String },

    /// Private message delivered to a single session.
    PrivateMessage { from: String, content: String },

    /// Member list of the recipient's current room.
    Names { members: Vec<MemberInfo> },

    /// Every active room with its member count.
    RoomList { rooms: Vec<RoomInfo> },

    Help,

    /// Quit acknowledgment, last event before the connection closes.
    Bye,

    /// Error reported to the session that caused it.
    Error(ChatError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    /// True for the recipient's own entry.
    pub is_self: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    pub member_count: usize,
}
