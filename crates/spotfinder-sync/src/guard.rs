/// Sequence numbers for refreshes.
///
/// Every refresh is tagged by [`RefreshGuard::issue`]; a result is applied
/// only if its tag is newer than the last one applied, so a slow response can
/// never overwrite a fresher list.
#[derive(Debug, Default)]
pub struct RefreshGuard {
    issued: u64,
    applied: u64,
}

impl RefreshGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns `true` and records `seq` as applied when it is newer than
    /// anything applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq > self.applied && seq <= self.issued {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let mut guard = RefreshGuard::new();
        assert_eq!(guard.issue(), 1);
        assert_eq!(guard.issue(), 2);
        assert_eq!(guard.issue(), 3);
    }

    #[test]
    fn in_order_results_are_accepted() {
        let mut guard = RefreshGuard::new();
        let first = guard.issue();
        assert!(guard.accept(first));
        let second = guard.issue();
        assert!(guard.accept(second));
        assert_eq!(guard.last_applied(), second);
    }

    #[test]
    fn older_result_after_newer_is_discarded() {
        let mut guard = RefreshGuard::new();
        let older = guard.issue();
        let newer = guard.issue();
        assert!(guard.accept(newer));
        assert!(!guard.accept(older));
        assert_eq!(guard.last_applied(), newer);
    }

    #[test]
    fn duplicate_result_is_discarded() {
        let mut guard = RefreshGuard::new();
        let seq = guard.issue();
        assert!(guard.accept(seq));
        assert!(!guard.accept(seq));
    }

    #[test]
    fn never_issued_sequence_is_rejected() {
        let mut guard = RefreshGuard::new();
        assert!(!guard.accept(7));
        assert_eq!(guard.last_applied(), 0);
    }
}
