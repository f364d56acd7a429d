use thiserror::Error;

/// Non-fatal errors raised while handling one session's input.
///
/// The `Display` text of each variant is exactly what the offending client
/// receives, one line per `\n`-separated segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Sorry, invalid name.")]
    InvalidName,

    #[error("Sorry, name taken.")]
    NameTaken,

    #[error("Sorry, name reserved.")]
    NameReserved,

    #[error(
        "You are not in a room.\nType /join <room> to join a room.\nType /rooms to see the available rooms"
    )]
    NotInRoom,

    #[error("Type \"/pm <user> <message>\" to write a private message.")]
    MalformedPmSyntax,

    #[error("There is no user {0}.")]
    UnknownPmTarget(String),

    #[error("Type /join <room> to join a room.")]
    MissingRoomName,

    #[error("Sorry, invalid room name.")]
    InvalidRoomName,
}

impl ChatError {
    /// Static code used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::NameTaken => "name_taken",
            Self::NameReserved => "name_reserved",
            Self::NotInRoom => "not_in_room",
            Self::MalformedPmSyntax => "malformed_pm_syntax",
            Self::UnknownPmTarget(_) => "unknown_pm_target",
            Self::MissingRoomName => "missing_room_name",
            Self::InvalidRoomName => "invalid_room_name",
        }
    }
}
