use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ChatError;
use super::events::{ChatEvent, MemberInfo, SessionId};
use super::registry::RoomRegistry;
use super::router::{self, Command, Routed};
use super::user_session::SessionHandle;
use super::validation;

/// Room every session enters once its name is accepted.
pub const DEFAULT_ROOM: &str = "DEFAULT";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the client to pick a display name.
    AwaitingName,
    /// Name accepted; lines are commands or chat.
    Chatting,
}

/// What the connection should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Per-connection session state machine.
///
/// The session is the only writer of its own fields; everything shared goes
/// through the [`RoomRegistry`]. Replies to this session are queued on its
/// own outbound sender, so they stay ordered with events from other sessions.
pub struct Session {
    id: SessionId,
    state: SessionState,
    name: Option<String>,
    current_room: Option<String>,
    outbound: mpsc::Sender<ChatEvent>,
    registry: Arc<RoomRegistry>,
    default_room: String,
    connected_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        registry: Arc<RoomRegistry>,
        outbound: mpsc::Sender<ChatEvent>,
        default_room: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::AwaitingName,
            name: None,
            current_room: None,
            outbound,
            registry,
            default_room: default_room.into(),
            connected_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn current_room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    /// Queue the banner and login prompt.
    pub fn greet(&self, server_name: &str) {
        self.send(ChatEvent::Greeting {
            server_name: server_name.to_string(),
        });
    }

    /// Handle one input line (line terminator already stripped).
    pub fn on_line(&mut self, line: &str) -> Flow {
        let result = match self.state {
            SessionState::AwaitingName => self.accept_name(line).map(|()| Flow::Continue),
            SessionState::Chatting => self.handle_chat(line),
        };

        match result {
            Ok(flow) => flow,
            Err(e) => {
                debug!(session_id = %self.id, code = e.code(), "command rejected");
                self.send(ChatEvent::Error(e));
                Flow::Continue
            }
        }
    }

    /// Transport-level cleanup. Leaves the room silently (no departure notice)
    /// and releases the name.
    pub fn disconnect(&mut self) {
        let Some(name) = self.name.clone() else {
            return;
        };

        if let Some(room) = self.current_room.take() {
            self.registry.remove_member(&room, &name);
        }
        self.registry.release_name(&name, self.id);

        let online_secs = (Utc::now() - self.connected_at).num_seconds();
        info!(session_id = %self.id, %name, online_secs, "session ended");
    }

    // ── Name negotiation ────────────────────────────────────────────

    fn accept_name(&mut self, line: &str) -> Result<(), ChatError> {
        let Some(name) = line.split_whitespace().next() else {
            return Err(ChatError::InvalidName);
        };

        if !self.registry.is_name_free(name) {
            return Err(ChatError::NameTaken);
        }
        if Command::is_keyword(name) {
            return Err(ChatError::NameReserved);
        }
        validation::validate_name(name)?;

        // The free check above is advisory; the claim is the atomic step.
        if !self.registry.claim_name(name, self.id) {
            return Err(ChatError::NameTaken);
        }

        self.name = Some(name.to_string());
        self.state = SessionState::Chatting;
        info!(session_id = %self.id, %name, "name accepted");

        self.send(ChatEvent::Welcome {
            name: name.to_string(),
        });
        let room = self.default_room.clone();
        self.enter_room(&room);
        Ok(())
    }

    // ── Chat ────────────────────────────────────────────────────────

    fn handle_chat(&mut self, line: &str) -> Result<Flow, ChatError> {
        match router::route(line) {
            Routed::Command(cmd, arg) => self.dispatch(cmd, arg),
            Routed::Chat(text) => {
                self.say(text)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, cmd: Command, arg: &str) -> Result<Flow, ChatError> {
        match cmd {
            Command::Users => self.list_users()?,
            Command::Rooms => self.list_rooms(),
            Command::Join => self.join(arg)?,
            Command::Leave => self.leave()?,
            Command::Pm => self.private_message(arg)?,
            Command::Help => self.send(ChatEvent::Help),
            Command::Quit => {
                self.quit();
                return Ok(Flow::Close);
            }
        }
        Ok(Flow::Continue)
    }

    fn say(&self, text: &str) -> Result<(), ChatError> {
        let room = self.current_room.as_deref().ok_or(ChatError::NotInRoom)?;
        let name = self.identity();
        let event = ChatEvent::Message {
            from: name.clone(),
            content: text.to_string(),
        };
        self.registry.broadcast(room, &event, Some(&name));
        Ok(())
    }

    fn list_users(&self) -> Result<(), ChatError> {
        let room = self.current_room.as_deref().ok_or(ChatError::NotInRoom)?;
        let me = self.identity();
        let members = self
            .registry
            .member_names(room)
            .into_iter()
            .map(|name| MemberInfo {
                is_self: name == me,
                name,
            })
            .collect();
        self.send(ChatEvent::Names { members });
        Ok(())
    }

    fn list_rooms(&self) {
        self.send(ChatEvent::RoomList {
            rooms: self.registry.list_rooms(),
        });
    }

    fn join(&mut self, arg: &str) -> Result<(), ChatError> {
        let room = arg.trim();
        validation::validate_room_name(room)?;

        if self.current_room.is_some() {
            self.leave()?;
        }
        self.enter_room(room);
        Ok(())
    }

    fn enter_room(&mut self, room: &str) {
        let name = self.identity();
        self.registry.join(room, &name, self.handle());
        self.current_room = Some(room.to_string());

        self.send(ChatEvent::EnterRoom {
            room: room.to_string(),
        });
        self.registry.broadcast(
            room,
            &ChatEvent::Join {
                room: room.to_string(),
                name: name.clone(),
            },
            Some(&name),
        );
        info!(%name, %room, "joined room");

        // Echo the member list to the newcomer.
        if let Err(e) = self.list_users() {
            warn!(%name, %room, error = %e, "member list unavailable after join");
        }
    }

    fn leave(&mut self) -> Result<(), ChatError> {
        let room = self.current_room.take().ok_or(ChatError::NotInRoom)?;
        let name = self.identity();

        self.registry.broadcast(
            &room,
            &ChatEvent::Part {
                room: room.clone(),
                name: name.clone(),
                is_self: false,
            },
            Some(&name),
        );
        self.send(ChatEvent::Part {
            room: room.clone(),
            name: name.clone(),
            is_self: true,
        });
        self.registry.remove_member(&room, &name);

        info!(%name, %room, "left room");
        Ok(())
    }

    fn private_message(&self, arg: &str) -> Result<(), ChatError> {
        let Some((target, body)) = arg.split_once(char::is_whitespace) else {
            return Err(ChatError::MalformedPmSyntax);
        };
        let body = body.trim_start();
        if body.is_empty() {
            return Err(ChatError::MalformedPmSyntax);
        }

        let Some(handle) = self.registry.find_member(target) else {
            return Err(ChatError::UnknownPmTarget(target.to_string()));
        };

        let from = self.identity();
        if !handle.send(ChatEvent::PrivateMessage {
            from: from.clone(),
            content: body.to_string(),
        }) {
            warn!(%from, %target, "dropped private message (queue full or closed)");
        }
        Ok(())
    }

    fn quit(&mut self) {
        let name = self.identity();
        if let Some(room) = self.current_room.take() {
            self.registry.broadcast(
                &room,
                &ChatEvent::Part {
                    room: room.clone(),
                    name: name.clone(),
                    is_self: false,
                },
                Some(&name),
            );
            self.registry.remove_member(&room, &name);
        }
        self.send(ChatEvent::Bye);
        info!(%name, "quit");
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn identity(&self) -> String {
        self.name.clone().unwrap_or_default()
    }

    fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.id, &self.outbound)
    }

    fn send(&self, event: ChatEvent) {
        if self.outbound.try_send(event).is_err() {
            warn!(session_id = %self.id, "dropped reply (queue full or closed)");
        }
    }
}
