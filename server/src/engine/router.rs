//! Command routing for chat input.
//!
//! Maps a raw line to either a command with its argument or a plain chat
//! message. Matching is exact and case-sensitive: `/users` is a command,
//! `/Users` is chat.

/// A chat command, identified by its keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// List the members of the current room.
    Users,
    /// List every active room.
    Rooms,
    /// Move to another room, creating it if needed.
    Join,
    /// Leave the current room.
    Leave,
    /// Send a private message.
    Pm,
    /// Show the command summary.
    Help,
    /// Leave the room and close the connection.
    Quit,
}

impl Command {
    /// Every command, in help-text order.
    pub const ALL: [Command; 7] = [
        Command::Users,
        Command::Rooms,
        Command::Join,
        Command::Pm,
        Command::Help,
        Command::Leave,
        Command::Quit,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Command::Users => "/users",
            Command::Rooms => "/rooms",
            Command::Join => "/join",
            Command::Leave => "/leave",
            Command::Pm => "/pm",
            Command::Help => "/help",
            Command::Quit => "/quit",
        }
    }

    /// One-line description shown by `/help`.
    pub fn summary(self) -> &'static str {
        match self {
            Command::Users => "See the users in the room",
            Command::Rooms => "See the available rooms",
            Command::Join => "Join a room",
            Command::Leave => "Leave the current room",
            Command::Pm => "Send a private message to another user",
            Command::Help => "Show the help",
            Command::Quit => "Quit",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.keyword() == word)
    }

    /// Whether `word` would be read as a command keyword.
    pub fn is_keyword(word: &str) -> bool {
        Self::from_keyword(word).is_some()
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Result of routing one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed<'a> {
    /// A command and its argument (empty when none was given).
    Command(Command, &'a str),
    /// Anything else is chat, passed through untouched.
    Chat(&'a str),
}

/// Route a line received while chatting.
pub fn route(line: &str) -> Routed<'_> {
    if let Some(cmd) = Command::from_keyword(line) {
        return Routed::Command(cmd, "");
    }

    if let Some((head, rest)) = line.split_once(char::is_whitespace)
        && let Some(cmd) = Command::from_keyword(head)
    {
        return Routed::Command(cmd, rest.trim_start());
    }

    Routed::Chat(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keyword_has_empty_argument() {
        assert_eq!(route("/users"), Routed::Command(Command::Users, ""));
        assert_eq!(route("/quit"), Routed::Command(Command::Quit, ""));
        assert_eq!(route("/join"), Routed::Command(Command::Join, ""));
    }

    #[test]
    fn test_keyword_with_argument() {
        assert_eq!(route("/join lounge"), Routed::Command(Command::Join, "lounge"));
        assert_eq!(
            route("/pm bob hello there"),
            Routed::Command(Command::Pm, "bob hello there")
        );
    }

    #[test]
    fn test_whitespace_run_after_keyword_is_skipped() {
        assert_eq!(
            route("/join \t  back room"),
            Routed::Command(Command::Join, "back room")
        );
    }

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(route("hello everyone"), Routed::Chat("hello everyone"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(route("/USERS"), Routed::Chat("/USERS"));
        assert_eq!(route("/Join lounge"), Routed::Chat("/Join lounge"));
    }

    #[test]
    fn test_unknown_slash_word_is_chat() {
        assert_eq!(route("/me waves"), Routed::Chat("/me waves"));
        assert_eq!(route("/usersx"), Routed::Chat("/usersx"));
    }

    #[test]
    fn test_leading_whitespace_is_chat() {
        assert_eq!(route(" /users"), Routed::Chat(" /users"));
    }

    #[test]
    fn test_keyword_table_roundtrips() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_keyword(cmd.keyword()), Some(cmd));
            assert!(Command::is_keyword(&cmd.to_string()));
        }
        assert!(!Command::is_keyword("alice"));
    }
}
