use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::user_session::SessionHandle;

/// In-memory state for a single room.
#[derive(Debug)]
pub struct RoomState {
    pub name: String,
    /// Members keyed by display name.
    pub members: HashMap<String, SessionHandle>,
    pub created_at: DateTime<Utc>,
}

impl RoomState {
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Member names in lexical order.
    pub fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.keys().cloned().collect();
        names.sort();
        names
    }
}
