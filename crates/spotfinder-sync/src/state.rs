use std::fmt;

/// Lifecycle of a mounted view's synchronizer.
///
/// `TornDown` is terminal. After an attach failure the view settles in
/// `Idle`: it keeps the list from its one-shot load but no longer updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Subscribing,
    Active,
    Refreshing,
    TornDown,
}

impl SyncState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncState::TornDown)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncState::Idle => "idle",
            SyncState::Subscribing => "subscribing",
            SyncState::Active => "active",
            SyncState::Refreshing => "refreshing",
            SyncState::TornDown => "torn_down",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_torn_down_is_terminal() {
        assert!(SyncState::TornDown.is_terminal());
        for state in [
            SyncState::Idle,
            SyncState::Subscribing,
            SyncState::Active,
            SyncState::Refreshing,
        ] {
            assert!(!state.is_terminal(), "{state} should not be terminal");
        }
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(SyncState::TornDown.to_string(), "torn_down");
        assert_eq!(SyncState::Refreshing.to_string(), "refreshing");
    }
}
