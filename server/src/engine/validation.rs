use super::error::ChatError;

/// Maximum display name length (characters).
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum room name length (characters).
pub const MAX_ROOM_NAME_LENGTH: usize = 50;

/// Validate a candidate display name: 1-32 chars, no whitespace or control characters.
pub fn validate_name(name: &str) -> Result<(), ChatError> {
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(ChatError::InvalidName);
    }
    if name.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ChatError::InvalidName);
    }
    Ok(())
}

/// Validate a room name: 1-50 chars, no control characters. Inner spaces are allowed.
pub fn validate_room_name(name: &str) -> Result<(), ChatError> {
    if name.is_empty() {
        return Err(ChatError::MissingRoomName);
    }
    if name.chars().count() > MAX_ROOM_NAME_LENGTH {
        return Err(ChatError::InvalidRoomName);
    }
    if name.chars().any(char::is_control) {
        return Err(ChatError::InvalidRoomName);
    }
    Ok(())
}
