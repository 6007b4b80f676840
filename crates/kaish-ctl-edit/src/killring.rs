//! Fixed-capacity circular buffer of killed text.

/// Capacity is fixed at 32.
pub const CAPACITY: usize = 32;

/// Ring of previously killed text, indexed by `next` (next write
/// position) and `last_put` (most recently yanked). Null entries are
/// permitted until the ring has been filled.
#[derive(Debug, Clone)]
pub struct KillRing {
    entries: Vec<Option<String>>,
    next: usize,
    last_put: Option<usize>,
}

impl KillRing {
    pub fn new() -> Self {
        Self {
            entries: vec![None; CAPACITY],
            next: 0,
            last_put: None,
        }
    }

    /// Records a newly killed span of text, advancing the write cursor.
    pub fn kill(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.entries[self.next] = Some(text);
        self.last_put = Some(self.next);
        self.next = (self.next + 1) % CAPACITY;
    }

    /// Appends `text` to the most recently killed entry instead of
    /// starting a new one (consecutive kills in the same direction merge
    /// in most shells' kill rings; supported here for `kill-line`
    /// sequences).
    pub fn append_to_last(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.last_put.and_then(|i| self.entries[i].as_mut()) {
            Some(existing) => existing.push_str(text),
            None => self.kill(text.to_string()),
        }
    }

    pub fn prepend_to_last(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.last_put.and_then(|i| self.entries[i].as_mut()) {
            Some(existing) => *existing = format!("{text}{existing}"),
            None => self.kill(text.to_string()),
        }
    }

    /// The text to insert on `put`: the most recently
    /// killed entry.
    pub fn current(&self) -> Option<&str> {
        self.last_put
            .and_then(|i| self.entries[i].as_deref())
    }

    /// Counts the populated entries, for `put-pop`'s cycle period.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `put-pop`: cycles `last_put` one step further back (toward older
    /// entries), with period equal to the number of non-empty entries.
    /// Returns the newly current text.
    pub fn pop(&mut self) -> Option<&str> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let cur = self.last_put?;
        let mut idx = cur;
        loop {
            idx = (idx + CAPACITY - 1) % CAPACITY;
            if self.entries[idx].is_some() {
                break;
            }
        }
        self.last_put = Some(idx);
        self.entries[idx].as_deref()
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_is_most_recently_killed() {
        let mut r = KillRing::new();
        r.kill("first");
        r.kill("second");
        assert_eq!(r.current(), Some("second"));
    }

    #[test]
    fn capacity_never_exceeded() {
        let mut r = KillRing::new();
        for i in 0..(CAPACITY * 3) {
            r.kill(format!("entry-{i}"));
        }
        assert!(r.len() <= CAPACITY);
    }

    #[test]
    fn put_pop_cycles_with_period_equal_to_count() {
        let mut r = KillRing::new();
        r.kill("a");
        r.kill("b");
        r.kill("c");
        // last_put = c. pop -> b, pop -> a, pop -> c (period 3).
        assert_eq!(r.pop(), Some("b"));
        assert_eq!(r.pop(), Some("a"));
        assert_eq!(r.pop(), Some("c"));
    }

    #[test]
    fn empty_ring_has_no_current() {
        let r = KillRing::new();
        assert_eq!(r.current(), None);
    }
}
