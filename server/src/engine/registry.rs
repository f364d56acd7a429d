use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};

use super::events::{ChatEvent, RoomInfo, SessionId};
use super::room::RoomState;
use super::user_session::SessionHandle;

/// The shared room registry. Every session holds an `Arc` to the same
/// registry; all membership state lives here.
///
/// Check-then-act sequences run under a single map entry lock: name claims
/// go through the `names` entry API, and removing a member deletes the
/// emptied room under the same room entry guard, so a room cannot disappear
/// while a concurrent join is adding to it.
pub struct RoomRegistry {
    /// All rooms, keyed by room name.
    rooms: DashMap<String, RoomState>,
    /// Claimed display names -> owning session.
    names: DashMap<String, SessionId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            names: DashMap::new(),
        }
    }

    // ── Names ───────────────────────────────────────────────────────

    /// True iff no live session holds this name. Checks the claim index, not
    /// room membership, so a session between rooms still owns its name.
    pub fn is_name_free(&self, name: &str) -> bool {
        !self.names.contains_key(name)
    }

    /// Claim a name for a session. Returns false if it is already held.
    pub fn claim_name(&self, name: &str, session_id: SessionId) -> bool {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(session_id);
                true
            }
        }
    }

    /// Release a name, but only if `session_id` still owns it.
    pub fn release_name(&self, name: &str, session_id: SessionId) {
        self.names.remove_if(name, |_, owner| *owner == session_id);
    }

    // ── Rooms ───────────────────────────────────────────────────────

    /// Create an empty room if it does not exist yet.
    pub fn create_room_if_absent(&self, room: &str) {
        if let Entry::Vacant(slot) = self.rooms.entry(room.to_string()) {
            slot.insert(RoomState::new(room.to_string()));
            info!(%room, "room created");
        }
    }

    /// Register a member in an existing room. Returns false if the room is absent.
    pub fn add_member(&self, room: &str, name: &str, handle: SessionHandle) -> bool {
        match self.rooms.get_mut(room) {
            Some(mut state) => {
                state.members.insert(name.to_string(), handle);
                true
            }
            None => false,
        }
    }

    /// Create the room if needed and add the member in one step.
    /// Returns true if the room was created by this call.
    pub fn join(&self, room: &str, name: &str, handle: SessionHandle) -> bool {
        let mut created = false;
        self.rooms
            .entry(room.to_string())
            .or_insert_with(|| {
                created = true;
                RoomState::new(room.to_string())
            })
            .members
            .insert(name.to_string(), handle);

        if created {
            info!(%room, "room created");
        }
        created
    }

    /// Remove a member. Deletes the room when its membership becomes empty.
    /// Both steps run under the room's entry lock, so no reader ever sees
    /// the room with zero members.
    pub fn remove_member(&self, room: &str, name: &str) -> Option<SessionHandle> {
        let Entry::Occupied(mut entry) = self.rooms.entry(room.to_string()) else {
            return None;
        };

        let removed = entry.get_mut().members.remove(name);
        if removed.is_some() && entry.get().members.is_empty() {
            let (_, state) = entry.remove_entry();
            let age_secs = (Utc::now() - state.created_at).num_seconds();
            info!(%room, age_secs, "room removed");
        }
        removed
    }

    /// Every room with its member count, sorted by room name.
    pub fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut rooms: Vec<RoomInfo> = self
            .rooms
            .iter()
            .map(|r| RoomInfo {
                name: r.name.clone(),
                member_count: r.member_count(),
            })
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        rooms
    }

    /// Snapshot of a room's membership (empty if the room does not exist).
    pub fn members_of(&self, room: &str) -> HashMap<String, SessionHandle> {
        self.rooms
            .get(room)
            .map(|r| r.members.clone())
            .unwrap_or_default()
    }

    /// Member names of a room in lexical order.
    pub fn member_names(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|r| r.member_names())
            .unwrap_or_default()
    }

    /// Scan every room for a member with exactly this name.
    pub fn find_member(&self, name: &str) -> Option<SessionHandle> {
        self.rooms
            .iter()
            .find_map(|r| r.members.get(name).cloned())
    }

    pub fn room_exists(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Broadcast an event to all members of a room, optionally excluding one member.
    pub fn broadcast(&self, room: &str, event: &ChatEvent, exclude: Option<&str>) {
        let Some(state) = self.rooms.get(room) else {
            return;
        };

        for (member, handle) in &state.members {
            if Some(member.as_str()) == exclude {
                continue;
            }
            if !handle.send(event.clone()) {
                warn!(%room, %member, "dropped event for session (queue full or closed)");
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
