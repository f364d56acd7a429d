use crate::engine::events::{ChatEvent, MemberInfo, RoomInfo};
use crate::engine::router::Command;

/// Helpers to build reply lines. All functions return lines without a
/// terminator (the writer appends \r\n).
pub const LOGIN_PROMPT: &str = "Login Name?";
pub const END_OF_LIST: &str = "end of list";
pub const ROOMS_HEADER: &str = "Active rooms are:";
pub const HELP_HEADER: &str = "* Type the following commands:";
pub const QUIT_ACK: &str = "BYE";

/// Welcome to the XYZ chat server
pub fn banner(server_name: &str) -> String {
    format!("Welcome to the {server_name} chat server")
}

/// Welcome, alice!
pub fn welcome(name: &str) -> String {
    format!("Welcome, {name}!")
}

/// Entering room: lounge
pub fn entering_room(room: &str) -> String {
    format!("Entering room: {room}")
}

/// * new user joined lounge: alice
pub fn user_joined(room: &str, name: &str) -> String {
    format!("* new user joined {room}: {name}")
}

/// * user has left lounge: alice
pub fn user_left(room: &str, name: &str) -> String {
    format!("* user has left {room}: {name}")
}

/// alice (this is you)
pub fn this_is_you(name: &str) -> String {
    format!("{name} (this is you)")
}

/// alice: hello
pub fn chat(from: &str, content: &str) -> String {
    format!("{from}: {}", sanitize(content))
}

/// *PM* alice: hello
pub fn private_message(from: &str, content: &str) -> String {
    format!("*PM* {from}: {}", sanitize(content))
}

/// `* name` per member, then the sentinel.
pub fn user_list(members: &[MemberInfo]) -> Vec<String> {
    let mut lines: Vec<String> = members
        .iter()
        .map(|m| {
            if m.is_self {
                format!("* {}", this_is_you(&m.name))
            } else {
                format!("* {}", m.name)
            }
        })
        .collect();
    lines.push(END_OF_LIST.to_string());
    lines
}

/// Header, `* room (count)` per room, then the sentinel.
pub fn room_list(rooms: &[RoomInfo]) -> Vec<String> {
    let mut lines = Vec::with_capacity(rooms.len() + 2);
    lines.push(ROOMS_HEADER.to_string());
    lines.extend(
        rooms
            .iter()
            .map(|r| format!("* {} ({})", r.name, r.member_count)),
    );
    lines.push(END_OF_LIST.to_string());
    lines
}

pub fn help() -> Vec<String> {
    let mut lines = vec![HELP_HEADER.to_string()];
    lines.extend(
        Command::ALL
            .iter()
            .map(|cmd| format!("{}\t{}", cmd.keyword(), cmd.summary())),
    );
    lines
}

/// Convert a ChatEvent to text lines for its recipient.
pub fn event_lines(event: &ChatEvent) -> Vec<String> {
    match event {
        ChatEvent::Greeting { server_name } => {
            vec![banner(server_name), LOGIN_PROMPT.to_string()]
        }
        ChatEvent::Welcome { name } => vec![welcome(name)],
        ChatEvent::EnterRoom { room } => vec![entering_room(room)],
        ChatEvent::Join { room, name } => vec![user_joined(room, name)],
        ChatEvent::Part {
            room,
            name,
            is_self,
        } => {
            if *is_self {
                vec![user_left(room, &this_is_you(name))]
            } else {
                vec![user_left(room, name)]
            }
        }
        ChatEvent::Message { from, content } => vec![chat(from, content)],
        ChatEvent::PrivateMessage { from, content } => vec![private_message(from, content)],
        ChatEvent::Names { members } => user_list(members),
        ChatEvent::RoomList { rooms } => room_list(rooms),
        ChatEvent::Help => help(),
        ChatEvent::Bye => vec![QUIT_ACK.to_string()],
        ChatEvent::Error(e) => e.to_string().lines().map(str::to_string).collect(),
    }
}

/// Strip \r\n so user content can never start a new protocol line.
fn sanitize(content: &str) -> String {
    content.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::ChatError;

    #[test]
    fn test_greeting() {
        let lines = event_lines(&ChatEvent::Greeting {
            server_name: "XYZ".into(),
        });
        assert_eq!(lines, vec!["Welcome to the XYZ chat server", "Login Name?"]);
    }

    #[test]
    fn test_welcome_and_room_entry() {
        assert_eq!(
            event_lines(&ChatEvent::Welcome {
                name: "alice".into()
            }),
            vec!["Welcome, alice!"]
        );
        assert_eq!(
            event_lines(&ChatEvent::EnterRoom {
                room: "DEFAULT".into()
            }),
            vec!["Entering room: DEFAULT"]
        );
    }

    #[test]
    fn test_join_and_part() {
        assert_eq!(
            event_lines(&ChatEvent::Join {
                room: "lounge".into(),
                name: "bob".into()
            }),
            vec!["* new user joined lounge: bob"]
        );
        assert_eq!(
            event_lines(&ChatEvent::Part {
                room: "lounge".into(),
                name: "bob".into(),
                is_self: false
            }),
            vec!["* user has left lounge: bob"]
        );
        assert_eq!(
            event_lines(&ChatEvent::Part {
                room: "lounge".into(),
                name: "bob".into(),
                is_self: true
            }),
            vec!["* user has left lounge: bob (this is you)"]
        );
    }

    #[test]
    fn test_user_list_ends_with_sentinel() {
        let lines = event_lines(&ChatEvent::Names {
            members: vec![
                MemberInfo {
                    name: "alice".into(),
                    is_self: true,
                },
                MemberInfo {
                    name: "bob".into(),
                    is_self: false,
                },
            ],
        });
        assert_eq!(lines, vec!["* alice (this is you)", "* bob", "end of list"]);
    }

    #[test]
    fn test_empty_room_list() {
        let lines = event_lines(&ChatEvent::RoomList { rooms: vec![] });
        assert_eq!(lines, vec!["Active rooms are:", "end of list"]);
    }

    #[test]
    fn test_room_list() {
        let lines = event_lines(&ChatEvent::RoomList {
            rooms: vec![RoomInfo {
                name: "lounge".into(),
                member_count: 3,
            }],
        });
        assert_eq!(lines, vec!["Active rooms are:", "* lounge (3)", "end of list"]);
    }

    #[test]
    fn test_chat_and_pm() {
        assert_eq!(
            event_lines(&ChatEvent::Message {
                from: "alice".into(),
                content: "hi all".into()
            }),
            vec!["alice: hi all"]
        );
        assert_eq!(
            event_lines(&ChatEvent::PrivateMessage {
                from: "alice".into(),
                content: "psst".into()
            }),
            vec!["*PM* alice: psst"]
        );
    }

    #[test]
    fn test_content_cannot_inject_lines() {
        let lines = event_lines(&ChatEvent::Message {
            from: "alice".into(),
            content: "one\r\ntwo".into(),
        });
        assert_eq!(lines, vec!["alice: one  two"]);
    }

    #[test]
    fn test_help_lists_every_command() {
        let lines = event_lines(&ChatEvent::Help);
        assert_eq!(lines[0], HELP_HEADER);
        for cmd in Command::ALL {
            assert!(
                lines.iter().any(|l| l.starts_with(cmd.keyword())),
                "missing {cmd}"
            );
        }
    }

    #[test]
    fn test_errors_split_into_lines() {
        let lines = event_lines(&ChatEvent::Error(ChatError::NotInRoom));
        assert_eq!(
            lines,
            vec![
                "You are not in a room.",
                "Type /join <room> to join a room.",
                "Type /rooms to see the available rooms",
            ]
        );
        assert_eq!(
            event_lines(&ChatEvent::Error(ChatError::MalformedPmSyntax)),
            vec!["Type \"/pm <user> <message>\" to write a private message."]
        );
    }

    #[test]
    fn test_bye() {
        assert_eq!(event_lines(&ChatEvent::Bye), vec!["BYE"]);
    }
}
