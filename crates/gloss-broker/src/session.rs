//! Per-tab session table owned by the coordinator
//!
//! Sessions are created lazily on first toggle or request and removed when
//! the tab closes. The table lives inside the coordinator task and is only
//! touched from its own event-loop turns, so it needs no locking.

use std::collections::HashMap;

/// Identifier of a tab's injection context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab {}", self.0)
    }
}

/// Coordinator-side record of one tab.
#[derive(Debug, Clone)]
pub struct TabSession {
    pub tab_id: TabId,
    pub overlay_open: bool,
}

impl TabSession {
    fn new(tab_id: TabId) -> Self {
        Self {
            tab_id,
            overlay_open: false,
        }
    }
}

/// Session table keyed by tab id.
#[derive(Default)]
pub struct SessionTable {
    sessions: HashMap<TabId, TabSession>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session, creating it on first use.
    pub fn get_or_create(&mut self, tab_id: TabId) -> &mut TabSession {
        self.sessions
            .entry(tab_id)
            .or_insert_with(|| TabSession::new(tab_id))
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabSession> {
        self.sessions.get(&tab_id)
    }

    /// Remove a session on tab close. Returns the removed entry, if any.
    pub fn remove(&mut self, tab_id: TabId) -> Option<TabSession> {
        self.sessions.remove(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_create_and_unique_keys() {
        let mut table = SessionTable::new();
        assert!(table.get(TabId(1)).is_none());

        table.get_or_create(TabId(1)).overlay_open = true;
        table.get_or_create(TabId(2));
        // Second lookup returns the same entry, not a fresh one.
        assert!(table.get_or_create(TabId(1)).overlay_open);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remove_on_tab_close() {
        let mut table = SessionTable::new();
        table.get_or_create(TabId(7));
        assert!(table.remove(TabId(7)).is_some());
        assert!(table.remove(TabId(7)).is_none());
        assert!(table.is_empty());
    }
}
