//! Shared diagnostic log
//!
//! Every recoverable failure in the data pool surfaces here instead of
//! panicking or returning errors the callers would have to thread through
//! every declaration call. A misconfigured name produces an invisible
//! entity and a log entry, never a stopped frame loop.

/// Upper bound on retained entries. Once full, new entries are counted
/// but dropped, so a runaway failure can't grow memory frame over frame.
pub const MAX_DIAGNOSTICS: usize = 256;

/// What went wrong. All kinds are non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    /// A name did not resolve in a registry; the mutating call no-opped.
    NotFound,
    /// A second add with an existing name; the first mapping was kept.
    DuplicateName,
    /// Column access with an invalid index; get returned a sentinel.
    IndexOutOfRange,
    /// Column growth failed; the pending push was dropped.
    AllocationFailure,
    /// A row could not become a live instance; it is permanently skipped.
    MaterializationFailure,
    /// Lifecycle notice (scene switches, force-finalization, teardown).
    Info,
}

impl DiagKind {
    pub fn label(self) -> &'static str {
        match self {
            DiagKind::NotFound => "not found",
            DiagKind::DuplicateName => "duplicate name",
            DiagKind::IndexOutOfRange => "index out of range",
            DiagKind::AllocationFailure => "allocation failure",
            DiagKind::MaterializationFailure => "materialization failure",
            DiagKind::Info => "info",
        }
    }
}

/// One logged event.
#[derive(Debug, Clone)]
pub struct Diag {
    pub kind: DiagKind,
    pub message: String,
}

/// Bounded in-engine event log, drained by the app layer once per frame.
#[derive(Default)]
pub struct DiagLog {
    entries: Vec<Diag>,
    /// Entries discarded because the log was full.
    dropped: usize,
}

impl DiagLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagKind, message: impl Into<String>) {
        if self.entries.len() >= MAX_DIAGNOSTICS {
            self.dropped += 1;
            return;
        }
        self.entries.push(Diag {
            kind,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many retained entries have the given kind.
    pub fn count_of(&self, kind: DiagKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diag> {
        self.entries.iter()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Take everything logged so far, leaving the log empty.
    pub fn take_all(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_count() {
        let mut log = DiagLog::new();
        log.push(DiagKind::NotFound, "camera: no entry named 'X'");
        log.push(DiagKind::Info, "scene switch");
        log.push(DiagKind::NotFound, "grid box: no entry named 'Y'");

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_of(DiagKind::NotFound), 2);
        assert_eq!(log.count_of(DiagKind::DuplicateName), 0);
    }

    #[test]
    fn test_bounded() {
        let mut log = DiagLog::new();
        for i in 0..MAX_DIAGNOSTICS + 10 {
            log.push(DiagKind::Info, format!("entry {}", i));
        }
        assert_eq!(log.len(), MAX_DIAGNOSTICS);
        assert_eq!(log.dropped(), 10);
    }

    #[test]
    fn test_take_all_empties() {
        let mut log = DiagLog::new();
        log.push(DiagKind::Info, "a");
        let taken = log.take_all();
        assert_eq!(taken.len(), 1);
        assert!(log.is_empty());
    }
}
