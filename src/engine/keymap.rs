//! Name registry
//!
//! An insertion-ordered name <-> slot map, one per entity category. Lookup
//! is a linear scan; per-category counts stay small enough that anything
//! fancier would not pay for itself.
//!
//! The registry serves two roles:
//! - unique entity names (`add` rejects duplicates, index == row),
//! - per-row string tables such as texture paths (`push_key` appends
//!   without a uniqueness check, `set_key` renames a slot in place).

use super::diag::{DiagKind, DiagLog};

#[derive(Default)]
pub struct NameRegistry {
    keys: Vec<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unique name, returning its new index (== previous size).
    ///
    /// A second add with an existing name is rejected: the original mapping
    /// is kept, `None` is returned, and a `DuplicateName` diagnostic is
    /// emitted.
    pub fn add(&mut self, key: &str, diag: &mut DiagLog) -> Option<usize> {
        if self.keys.iter().any(|k| k == key) {
            diag.push(
                DiagKind::DuplicateName,
                format!("name '{}' already registered", key),
            );
            return None;
        }
        self.keys.push(key.to_string());
        Some(self.keys.len() - 1)
    }

    /// Append a key with no uniqueness check (string-table role).
    pub fn push_key(&mut self, key: &str) {
        self.keys.push(key.to_string());
    }

    /// Linear scan; `None` on miss.
    pub fn get_index(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Reverse-resolve a slot to its key.
    pub fn get_key(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// Rename a slot in place without moving data.
    /// Out of range is a logged no-op.
    pub fn set_key(&mut self, index: usize, key: &str, diag: &mut DiagLog) {
        match self.keys.get_mut(index) {
            Some(slot) => *slot = key.to_string(),
            None => diag.push(
                DiagKind::IndexOutOfRange,
                format!("registry: set_key {} of {}", index, self.keys.len()),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Remove `[start, end)`, renumbering everything after it.
    /// Used only by whole-scene deletion; invalid bounds are a no-op.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        if start < end && end <= self.keys.len() {
            self.keys.drain(start..end);
        }
    }

    pub fn free(&mut self) {
        self.keys = Vec::new();
    }
}

/// Derive a name not yet present in `registry` by appending `_1`, `_2`, ...
/// The base itself is returned when it is free.
pub fn generate_unique_name(registry: &NameRegistry, base: &str) -> String {
    if registry.get_index(base).is_none() {
        return base.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{}_{}", base, counter);
        if registry.get_index(&candidate).is_none() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_returns_sequential_indices() {
        let mut diag = DiagLog::new();
        let mut reg = NameRegistry::new();
        assert_eq!(reg.add("a", &mut diag), Some(0));
        assert_eq!(reg.add("b", &mut diag), Some(1));
        assert_eq!(reg.add("c", &mut diag), Some(2));
        assert_eq!(reg.get_index("b"), Some(1));
        assert_eq!(reg.get_key(2), Some("c"));
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut diag = DiagLog::new();
        let mut reg = NameRegistry::new();
        reg.add("a", &mut diag);
        assert_eq!(reg.add("a", &mut diag), None);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get_index("a"), Some(0));
        assert_eq!(diag.count_of(DiagKind::DuplicateName), 1);
    }

    #[test]
    fn test_get_index_miss() {
        let reg = NameRegistry::new();
        assert_eq!(reg.get_index("missing"), None);
    }

    #[test]
    fn test_set_key_renames_in_place() {
        let mut diag = DiagLog::new();
        let mut reg = NameRegistry::new();
        reg.add("old", &mut diag);
        reg.add("other", &mut diag);

        reg.set_key(0, "new", &mut diag);
        assert_eq!(reg.get_index("new"), Some(0));
        assert_eq!(reg.get_index("old"), None);
        assert_eq!(reg.get_index("other"), Some(1));

        reg.set_key(9, "nope", &mut diag);
        assert_eq!(diag.count_of(DiagKind::IndexOutOfRange), 1);
    }

    #[test]
    fn test_push_key_allows_duplicates() {
        let mut reg = NameRegistry::new();
        reg.push_key("tex.png");
        reg.push_key("tex.png");
        assert_eq!(reg.len(), 2);
        // get_index resolves to the first occurrence.
        assert_eq!(reg.get_index("tex.png"), Some(0));
    }

    #[test]
    fn test_remove_range() {
        let mut diag = DiagLog::new();
        let mut reg = NameRegistry::new();
        for name in ["a", "b", "c", "d"] {
            reg.add(name, &mut diag);
        }
        reg.remove_range(1, 3);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get_index("a"), Some(0));
        assert_eq!(reg.get_index("d"), Some(1));
    }

    #[test]
    fn test_generate_unique_name() {
        let mut diag = DiagLog::new();
        let mut reg = NameRegistry::new();
        assert_eq!(generate_unique_name(&reg, "box"), "box");
        reg.add("box", &mut diag);
        assert_eq!(generate_unique_name(&reg, "box"), "box_1");
        reg.add("box_1", &mut diag);
        assert_eq!(generate_unique_name(&reg, "box"), "box_2");
    }
}
