//! Recorded command history and incremental search.

use std::collections::VecDeque;

/// An immutable recorded command, with a monotonically increasing
/// sequence number. Neighbor linkage is implicit in the
/// backing `VecDeque`'s order rather than stored pointers, which keeps
/// "deletion preserves ordering of remaining entries" trivially true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seq: u64,
    pub text: String,
}

/// The full recorded history, oldest first. Backed by a config-supplied
/// `max_entries` cap.
#[derive(Debug, Clone)]
pub struct HistoryList {
    entries: VecDeque<HistoryEntry>,
    next_seq: u64,
    max_entries: usize,
}

impl HistoryList {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_seq: 1,
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, text: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(HistoryEntry {
            seq,
            text: text.into(),
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn get_by_seq(&self, seq: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.seq == seq)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Clears all entries (the `history -c` supplemented builtin).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The last `n` entries, most recent last (the `history [n]`
    /// supplemented builtin).
    pub fn last_n(&self, n: usize) -> Vec<&HistoryEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    /// Loads entries from a newline-separated history file.
    pub fn load_lines(&mut self, lines: impl Iterator<Item = String>) {
        for line in lines {
            if !line.is_empty() {
                self.push(line);
            }
        }
    }

    /// Renders entries for saving, newline-separated.
    pub fn save_lines(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction (vi `N` relative to the search that found
    /// the current entry).
    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

/// Incremental history search state.
#[derive(Debug, Clone)]
pub struct HistorySearch {
    pattern: String,
    direction: SearchDirection,
    /// The entry index (position in iteration order) the search is
    /// currently positioned at, if any match has been found.
    position: Option<usize>,
    last_pattern: Option<String>,
    last_direction: Option<SearchDirection>,
}

impl HistorySearch {
    pub fn new(direction: SearchDirection) -> Self {
        Self {
            pattern: String::new(),
            direction,
            position: None,
            last_pattern: None,
            last_direction: None,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn push_char(&mut self, c: char) {
        self.pattern.push(c);
    }

    pub fn backspace(&mut self) {
        self.pattern.pop();
    }

    /// Walks `history` from the current position in `self.direction`
    /// until a match is found or the list end is reached.
    /// Anchored (`^prefix`) patterns match only the entry's start; glob
    /// patterns compile as shortest-match; otherwise a literal substring
    /// search is used.
    pub fn search(&mut self, history: &HistoryList, start_seq: Option<u64>) -> Option<&str> {
        let anchored = self.pattern.starts_with('^');
        let needle = self.pattern.strip_prefix('^').unwrap_or(&self.pattern);
        if needle.is_empty() {
            self.position = None;
            return None;
        }

        let is_glob = needle.contains(['*', '?', '[']);
        let matches = |text: &str| -> bool {
            if anchored {
                if is_glob {
                    glob_match(needle, text, true)
                } else {
                    text.starts_with(needle)
                }
            } else if is_glob {
                glob_match(needle, text, false)
            } else {
                text.contains(needle)
            }
        };

        let entries: Vec<&HistoryEntry> = history.iter().collect();
        let start_idx = match start_seq {
            Some(seq) => entries.iter().position(|e| e.seq == seq),
            None => None,
        };

        let order: Box<dyn Iterator<Item = usize>> = match self.direction {
            SearchDirection::Backward => {
                let from = start_idx.unwrap_or(entries.len());
                Box::new((0..from).rev())
            }
            SearchDirection::Forward => {
                let from = start_idx.map(|i| i + 1).unwrap_or(0);
                Box::new(from..entries.len())
            }
        };

        for i in order {
            if matches(&entries[i].text) {
                self.position = Some(i);
                return Some(entries[i].text.as_str());
            }
        }
        None
    }

    /// Accept: remembers the pattern/direction for `n`/`N` repeat.
    pub fn accept(&mut self) {
        self.last_pattern = Some(self.pattern.clone());
        self.last_direction = Some(self.direction);
    }

    pub fn repeat(&self) -> Option<(String, SearchDirection)> {
        Some((self.last_pattern.clone()?, self.last_direction?))
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }
}

/// A minimal shortest-match glob matcher (`*`, `?`, `[set]`) for history
/// search patterns.
/// `anchored` requires the match to start at position 0; it is always
/// allowed to end anywhere in the text (a "shortest match" contains
/// search, not a full match).
fn glob_match(pattern: &str, text: &str, anchored: bool) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    fn matches_from(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => true,
            Some('*') => {
                for end in 0..=t.len() {
                    if matches_from(&p[1..], &t[end..]) {
                        return true;
                    }
                }
                false
            }
            Some('?') => !t.is_empty() && matches_from(&p[1..], &t[1..]),
            Some('[') => {
                if let Some(close) = p.iter().position(|&c| c == ']') {
                    if close > 1 && !t.is_empty() && p[1..close].contains(&t[0]) {
                        return matches_from(&p[close + 1..], &t[1..]);
                    }
                }
                false
            }
            Some(&c) => !t.is_empty() && t[0] == c && matches_from(&p[1..], &t[1..]),
        }
    }

    if anchored {
        matches_from(&p, &t)
    } else {
        (0..=t.len()).any(|start| matches_from(&p, &t[start..]))
    }
}

/// Exposes the shortest-match glob matcher to `complete.rs`'s filter
/// chains, which reuse the same pattern language as history search.
pub(crate) fn glob_match_pub(pattern: &str, text: &str) -> bool {
    glob_match(pattern, text, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> HistoryList {
        let mut h = HistoryList::new(100);
        h.push("ls");
        h.push("cat foo");
        h.push("ls -la");
        h
    }

    #[test]
    fn anchored_backward_search_finds_most_recent_prefix_match() {
        let history = sample_history();
        let mut search = HistorySearch::new(SearchDirection::Backward);
        search.push_char('^');
        search.push_char('l');
        search.push_char('s');
        let found = search.search(&history, None);
        assert_eq!(found, Some("ls -la"));
    }

    #[test]
    fn repeat_after_accept_selects_next_match() {
        let history = sample_history();
        let mut search = HistorySearch::new(SearchDirection::Backward);
        search.push_char('^');
        search.push_char('l');
        search.push_char('s');
        let matched_seq = {
            search.search(&history, None);
            history.iter().nth(search.position.unwrap()).unwrap().seq
        };
        search.accept();

        let mut next = HistorySearch::new(SearchDirection::Backward);
        next.push_char('^');
        next.push_char('l');
        next.push_char('s');
        let found = next.search(&history, Some(matched_seq));
        assert_eq!(found, Some("ls"));
    }

    #[test]
    fn history_caps_at_max_entries() {
        let mut h = HistoryList::new(2);
        h.push("a");
        h.push("b");
        h.push("c");
        assert_eq!(h.len(), 2);
        assert_eq!(h.last().unwrap().text, "c");
    }

    #[test]
    fn glob_pattern_matches_shortest_span() {
        assert!(glob_match("a*c", "xaybzc", false));
        assert!(!glob_match("a*c", "xbyz", false));
    }
}
