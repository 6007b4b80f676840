//! The modal editor state machine.
//!
//! "Operator pending" and "expect char" are fields on this struct, not
//! separate `Mode` variants, so any keymap can coexist with them. Key-to-command dispatch itself is a terminal-layer
//! concern; this module exposes the command set as plain methods so any
//! keymap can drive it.

use crate::buffer::EditBuffer;
use crate::history::{HistoryList, SearchDirection};
use crate::killring::KillRing;
use crate::motion::{self, Inclusivity, Motion, WordKind};
use crate::undo::{UndoHistory, UndoSnapshot};
use crate::wordclass::is_semiword_char;

/// The active editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Insert,
    Emacs,
    ViInsert,
    ViCommand,
    ViExpectChar,
    ViSearch,
    Suspended,
}

/// An operator awaiting a motion to determine its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Copy,
    Kill,
    Change,
    CopyChange,
}

/// The signed-decimal count prefix with its three fields: `sign`,
/// `abs`, and the captured `multiplier` from a pending operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count {
    sign: Option<i8>,
    abs: Option<u32>,
}

const COUNT_MAX: u32 = 999_999_999;

impl Count {
    /// Feeds one decimal digit. `0` as the very first digit (no sign, no
    /// prior digits) is not a count digit — the caller should route it
    /// to beginning-of-line instead.
    pub fn feed_digit(&mut self, d: u32) {
        self.abs = Some(
            self.abs
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(d)
                .min(COUNT_MAX),
        );
    }

    pub fn is_leading_zero(&self) -> bool {
        self.sign.is_none() && self.abs.is_none()
    }

    pub fn toggle_sign(&mut self) {
        self.sign = Some(-self.sign.unwrap_or(1));
    }

    pub fn is_empty(&self) -> bool {
        self.sign.is_none() && self.abs.is_none()
    }

    /// Resolves to an unsigned repeat count (vi motions always repeat a
    /// positive number of times; the sign affects direction-bearing
    /// commands that inspect it separately via `is_negative`).
    pub fn value(&self) -> u32 {
        self.abs.unwrap_or(1).max(1)
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Some(-1)
    }

    /// Combines a pending operator's captured count with the motion's
    /// own count prefix.
    pub fn combine(operator_count: u32, motion_count: u32) -> u32 {
        operator_count.saturating_mul(motion_count).min(COUNT_MAX)
    }
}

/// A character-seeking motion kind, for `;`/`,` find-repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FindKind {
    ForwardFind,
    BackwardFind,
    ForwardTill,
    BackwardTill,
}

/// The last non-insert edit command, stored as an opaque handle for
/// `redo`.
#[derive(Debug, Clone)]
enum LastEdit {
    DeleteChar,
    BackwardDeleteChar,
    DeleteSemiword,
    KillLine,
    KillForward,
    KillBackward,
    ChangeCase { start: usize, end: usize },
    ReplaceChar { at: usize, with: char },
    OperatorRange { op: Operator, start: usize, end: usize },
}

/// Result of [`EditorFSM::accept_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedLine {
    pub text: String,
}

/// The modal line editor.
pub struct EditorFSM {
    buffer: EditBuffer,
    undo: UndoHistory,
    kill_ring: KillRing,
    mode: Mode,
    count: Count,
    operator_pending: Option<Operator>,
    operator_count: Option<u32>,
    last_find: Option<(FindKind, char)>,
    last_edit: Option<LastEdit>,
    overwrite: bool,
    history_search: Option<crate::history::HistorySearch>,
    pre_search_buffer: Option<EditBuffer>,
    /// The last accepted history search, kept around so `n`/`N` can
    /// repeat it without the caller re-entering a pattern.
    last_search: Option<crate::history::HistorySearch>,
    /// Start index and char length of the text most recently inserted by
    /// `put`/`put_pop`, so a following `put_pop` knows exactly what span
    /// to replace regardless of where `cursor_on_last` left the cursor.
    last_put_start: usize,
    last_put_len: usize,
    /// Set by a bare `ESC` in emacs mode; the keymap consumes this on
    /// the very next byte to dispatch a two-byte Meta command (e.g.
    /// `Meta-y` for `put_pop`) without a dedicated escape-sequence mode.
    escape_pending: bool,
}

impl EditorFSM {
    pub fn new(mode: Mode) -> Self {
        Self {
            buffer: EditBuffer::new(),
            undo: UndoHistory::new(),
            kill_ring: KillRing::new(),
            mode,
            count: Count::default(),
            operator_pending: None,
            operator_count: None,
            last_find: None,
            last_edit: None,
            overwrite: false,
            history_search: None,
            pre_search_buffer: None,
            last_search: None,
            last_put_start: 0,
            last_put_len: 0,
            escape_pending: false,
        }
    }

    /// Records a bare `ESC` so the next byte can be dispatched as a
    /// two-byte Meta command.
    pub fn note_escape(&mut self) {
        self.escape_pending = true;
    }

    /// Consumes and returns whether an `ESC` is awaiting its Meta byte.
    pub fn take_escape_pending(&mut self) -> bool {
        std::mem::take(&mut self.escape_pending)
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    /// Loads a new history entry into the buffer. Switching to a
    /// different history entry clears the undo stack and seeds it with
    /// the original entry value.
    pub fn load_entry(&mut self, seq: u64, text: &str) {
        self.buffer = EditBuffer::from_str(text);
        self.undo.reset_for_entry(seq, self.buffer.cursor(), text);
    }

    fn snapshot_before_edit(&mut self) {
        self.undo
            .save_if_changed(self.buffer.cursor(), &self.buffer.as_string());
    }

    // -- count prefix -----------------------------------------------

    pub fn feed_count_digit(&mut self, d: u32) -> bool {
        if d == 0 && self.count.is_leading_zero() {
            return false; // route to beginning-of-line instead
        }
        self.count.feed_digit(d);
        true
    }

    pub fn toggle_count_sign(&mut self) {
        self.count.toggle_sign();
    }

    fn take_count(&mut self) -> u32 {
        let v = self.count.value();
        self.count = Count::default();
        v
    }

    pub fn has_pending_count(&self) -> bool {
        !self.count.is_empty()
    }

    // -- operator pending / motions -----------------------------------

    /// Begins an operator awaiting a motion (vi `d`, `c`, `y`, `cc`-style
    /// double-operator handled by the caller checking
    /// `operator_pending()` before calling this again).
    pub fn begin_operator(&mut self, op: Operator) {
        self.operator_count = Some(self.take_count());
        self.operator_pending = Some(op);
        self.mode = Mode::ViExpectChar;
    }

    pub fn operator_pending(&self) -> Option<Operator> {
        self.operator_pending
    }

    fn range_for(&mut self, motion: Motion, extra: Option<char>) -> Option<(usize, usize, Inclusivity)> {
        let motion_count = self.take_count();
        let count = match self.operator_count.take() {
            Some(oc) => Count::combine(oc, motion_count),
            None => motion_count,
        };
        let chars = self.buffer.chars();
        let cursor = self.buffer.cursor();
        let len = chars.len();

        let new_pos = match motion {
            Motion::CharForward => motion::char_forward(len, cursor, count),
            Motion::CharBackward => motion::char_backward(cursor, count),
            Motion::WordForward(k) => motion::word_forward(chars, cursor, k, count),
            Motion::WordBackward(k) => motion::word_backward(chars, cursor, k, count),
            Motion::WordEndForward(k) => motion::word_end_forward(chars, cursor, k, count),
            Motion::BeginningOfLine => motion::beginning_of_line(),
            Motion::EndOfLine => motion::end_of_line(len),
            Motion::FirstNonBlank => motion::first_non_blank(chars),
            Motion::AbsoluteColumn => motion::absolute_column(len, extra.map(|c| c as u32).unwrap_or(0)),
            Motion::FindCharForward => {
                let c = extra?;
                self.last_find = Some((FindKind::ForwardFind, c));
                motion::find_char_forward(chars, cursor, c, count)?
            }
            Motion::FindCharBackward => {
                let c = extra?;
                self.last_find = Some((FindKind::BackwardFind, c));
                motion::find_char_backward(chars, cursor, c, count)?
            }
            Motion::TillCharForward => {
                let c = extra?;
                self.last_find = Some((FindKind::ForwardTill, c));
                motion::till_char_forward(chars, cursor, c, count)?
            }
            Motion::TillCharBackward => {
                let c = extra?;
                self.last_find = Some((FindKind::BackwardTill, c));
                motion::till_char_backward(chars, cursor, c, count)?
            }
            Motion::FindRepeat => {
                let (kind, c) = self.last_find?;
                match kind {
                    FindKind::ForwardFind => motion::find_char_forward(chars, cursor, c, count)?,
                    FindKind::BackwardFind => motion::find_char_backward(chars, cursor, c, count)?,
                    FindKind::ForwardTill => motion::till_char_forward(chars, cursor, c, count)?,
                    FindKind::BackwardTill => motion::till_char_backward(chars, cursor, c, count)?,
                }
            }
        };

        Some((cursor.min(new_pos), cursor.max(new_pos), motion.inclusivity()))
    }

    /// Applies a motion: if an operator is pending, acts on the range
    /// between the old and new cursor (extended by one for inclusive
    /// motions), clearing the pending operator; otherwise just moves the
    /// cursor.
    pub fn apply_motion(&mut self, motion: Motion, extra: Option<char>) {
        let Some((mut start, mut end, inclusivity)) = self.range_for(motion, extra) else {
            self.operator_pending = None;
            self.mode = if matches!(self.mode, Mode::ViExpectChar) {
                Mode::ViCommand
            } else {
                self.mode
            };
            return;
        };

        if inclusivity == Inclusivity::Inclusive {
            end = (end + 1).min(self.buffer.len());
        }

        match self.operator_pending.take() {
            None => self.buffer.set_cursor(end.max(start).min(self.buffer.len())),
            Some(op) => {
                self.snapshot_before_edit();
                if start > end {
                    std::mem::swap(&mut start, &mut end);
                }
                match op {
                    Operator::Copy => {
                        let text = self.buffer.chars()[start..end].iter().collect::<String>();
                        self.kill_ring.kill(text);
                        self.buffer.set_cursor(start);
                    }
                    Operator::Kill => {
                        let removed = self.buffer.delete_range(start, end);
                        self.kill_ring.kill(removed);
                    }
                    Operator::Change | Operator::CopyChange => {
                        let removed = self.buffer.delete_range(start, end);
                        if op == Operator::CopyChange {
                            self.kill_ring.kill(removed);
                        }
                        self.mode = Mode::ViInsert;
                    }
                }
                self.last_edit = Some(LastEdit::OperatorRange { op, start, end });
                if op != Operator::Change && op != Operator::CopyChange {
                    self.mode = Mode::ViCommand;
                }
            }
        }
    }

    // -- edit commands --------------------------------------------------

    pub fn self_insert(&mut self, c: char) {
        self.snapshot_before_edit();
        let count = self.take_count();
        for _ in 0..count {
            self.buffer.self_insert(c, self.overwrite);
        }
    }

    pub fn set_overwrite(&mut self, on: bool) {
        self.overwrite = on;
    }

    pub fn delete_char(&mut self) {
        self.snapshot_before_edit();
        let count = self.take_count();
        let start = self.buffer.cursor();
        let end = (start + count as usize).min(self.buffer.len());
        self.buffer.delete_range(start, end);
        self.buffer.set_cursor(start);
        self.last_edit = Some(LastEdit::DeleteChar);
    }

    pub fn backward_delete_char(&mut self) {
        self.snapshot_before_edit();
        let count = self.take_count();
        let end = self.buffer.cursor();
        let start = end.saturating_sub(count as usize);
        self.buffer.delete_range(start, end);
        self.last_edit = Some(LastEdit::BackwardDeleteChar);
    }

    /// A *semiword* is a maximal run of non-blank, non-punctuation
    /// characters.
    pub fn delete_semiword(&mut self) {
        self.snapshot_before_edit();
        let cursor = self.buffer.cursor();
        let chars = self.buffer.chars();
        let mut end = cursor;
        while end < chars.len() && chars[end].is_whitespace() {
            end += 1;
        }
        while end < chars.len() && is_semiword_char(chars[end]) {
            end += 1;
        }
        self.buffer.delete_range(cursor, end);
        self.last_edit = Some(LastEdit::DeleteSemiword);
    }

    pub fn kill_line(&mut self) {
        self.snapshot_before_edit();
        let removed = self.buffer.delete_range(0, self.buffer.len());
        self.kill_ring.kill(removed);
        self.last_edit = Some(LastEdit::KillLine);
    }

    pub fn kill_forward(&mut self) {
        self.snapshot_before_edit();
        let cursor = self.buffer.cursor();
        let removed = self.buffer.delete_range(cursor, self.buffer.len());
        self.kill_ring.append_to_last(&removed);
        self.last_edit = Some(LastEdit::KillForward);
    }

    pub fn kill_backward(&mut self) {
        self.snapshot_before_edit();
        let cursor = self.buffer.cursor();
        let removed = self.buffer.delete_range(0, cursor);
        self.kill_ring.prepend_to_last(&removed);
        self.last_edit = Some(LastEdit::KillBackward);
    }

    /// `put`: insert the kill-ring's current entry before or after the
    /// cursor. `after` controls
    /// whether insertion starts just past the cursor (vi `p`) or at the
    /// cursor (vi `P`); `cursor_on_last` places the cursor on the last
    /// inserted character rather than just after it.
    pub fn put(&mut self, after: bool, cursor_on_last: bool) {
        let Some(text) = self.kill_ring.current().map(str::to_string) else {
            return;
        };
        self.snapshot_before_edit();
        let at = if after {
            (self.buffer.cursor() + 1).min(self.buffer.len())
        } else {
            self.buffer.cursor()
        };
        self.buffer.insert(at, &text);
        self.last_put_start = at;
        self.last_put_len = text.chars().count();
        if cursor_on_last && !text.is_empty() {
            self.buffer.set_cursor(at + text.chars().count() - 1);
        }
    }

    /// `put-pop`: replaces the last-put text with the next-older
    /// kill-ring entry, at the exact span `put`/a prior `put_pop` left
    /// behind. Repeatable — each call cycles one step further back,
    /// with period equal to the number of non-empty ring entries.
    pub fn put_pop(&mut self) {
        let Some(text) = self.kill_ring.pop().map(str::to_string) else {
            return;
        };
        self.snapshot_before_edit();
        let start = self.last_put_start;
        let end = (start + self.last_put_len).min(self.buffer.len());
        self.buffer.replace_range(start, end, &text);
        self.last_put_len = text.chars().count();
    }

    fn apply_undo_snapshot(&mut self, snap: UndoSnapshot) {
        self.buffer = EditBuffer::from_str(&snap.contents);
        self.buffer.set_cursor(snap.cursor);
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.undo().cloned() {
            Some(snap) => {
                self.apply_undo_snapshot(snap);
                true
            }
            None => false,
        }
    }

    pub fn undo_all(&mut self) -> bool {
        match self.undo.undo_all().cloned() {
            Some(snap) => {
                self.apply_undo_snapshot(snap);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo().cloned() {
            Some(snap) => {
                self.apply_undo_snapshot(snap);
                true
            }
            None => false,
        }
    }

    /// "cancel-undo": steps forward through the undo stack by one
    /// entry — the mirror of `undo`, which steps backward, not a
    /// repeat of it. `cmd_undo` and `cmd_cancel_undo` share the same
    /// stepping primitive in the original implementation with the
    /// offset sign flipped (negative for undo, positive for
    /// cancel-undo), so this recovers a state a prior `undo`/`undo_all`
    /// stepped past.
    pub fn cancel_undo(&mut self) -> bool {
        match self.undo.redo().cloned() {
            Some(snap) => {
                self.apply_undo_snapshot(snap);
                true
            }
            None => false,
        }
    }

    /// Replays the last non-insert edit command against its captured
    /// argument and starting state. Distinct from `redo`, which walks
    /// the undo stack forward.
    pub fn replay_last_edit(&mut self) {
        let Some(last) = self.last_edit.clone() else {
            return;
        };
        match last {
            LastEdit::DeleteChar => self.delete_char(),
            LastEdit::BackwardDeleteChar => self.backward_delete_char(),
            LastEdit::DeleteSemiword => self.delete_semiword(),
            LastEdit::KillLine => self.kill_line(),
            LastEdit::KillForward => self.kill_forward(),
            LastEdit::KillBackward => self.kill_backward(),
            LastEdit::ChangeCase { start, end } => self.change_case(start, end),
            LastEdit::ReplaceChar { at, with } => self.replace_char(at, with),
            LastEdit::OperatorRange { op, start, end } => {
                self.snapshot_before_edit();
                match op {
                    Operator::Copy => {
                        let text = self
                            .buffer
                            .chars()
                            .get(start..end)
                            .map(|s| s.iter().collect::<String>())
                            .unwrap_or_default();
                        self.kill_ring.kill(text);
                    }
                    Operator::Kill => {
                        let removed = self.buffer.delete_range(start, end);
                        self.kill_ring.kill(removed);
                    }
                    Operator::Change | Operator::CopyChange => {
                        self.buffer.delete_range(start, end);
                        self.mode = Mode::ViInsert;
                    }
                }
            }
        }
    }

    /// vi `~`: toggles case over `[start, end)`, `count`-repeatable.
    pub fn change_case(&mut self, start: usize, end: usize) {
        self.snapshot_before_edit();
        let end = end.min(self.buffer.len());
        for i in start..end {
            if let Some(c) = self.buffer.char_at(i) {
                let flipped = if c.is_uppercase() {
                    c.to_lowercase().next().unwrap_or(c)
                } else {
                    c.to_uppercase().next().unwrap_or(c)
                };
                self.buffer.replace_range(i, i + 1, &flipped.to_string());
            }
        }
        self.buffer.set_cursor(end.min(self.buffer.len()));
        self.last_edit = Some(LastEdit::ChangeCase { start, end });
    }

    pub fn change_case_count(&mut self) {
        let count = self.take_count();
        let start = self.buffer.cursor();
        let end = start + count as usize;
        self.change_case(start, end);
    }

    /// vi `r`: replaces the character at `at` with `with`.
    pub fn replace_char(&mut self, at: usize, with: char) {
        self.snapshot_before_edit();
        if at < self.buffer.len() {
            self.buffer.replace_range(at, at + 1, &with.to_string());
            self.buffer.set_cursor(at);
        }
        self.last_edit = Some(LastEdit::ReplaceChar { at, with });
    }

    pub fn replace_char_count(&mut self, with: char) {
        let count = self.take_count();
        let start = self.buffer.cursor();
        let end = (start + count as usize).min(self.buffer.len());
        if end - start < count as usize {
            return; // not enough characters to replace; vi rings the bell and no-ops
        }
        self.snapshot_before_edit();
        let replacement: String = std::iter::repeat(with).take(count as usize).collect();
        self.buffer.replace_range(start, end, &replacement);
        self.buffer.set_cursor(start);
        self.last_edit = Some(LastEdit::ReplaceChar { at: start, with });
    }

    pub fn vi_append(&mut self) {
        self.buffer.set_cursor((self.buffer.cursor() + 1).min(self.buffer.len()));
        self.mode = Mode::ViInsert;
    }

    pub fn vi_append_end(&mut self) {
        self.buffer.set_cursor(self.buffer.len());
        self.mode = Mode::ViInsert;
    }

    pub fn vi_insert_beginning(&mut self) {
        self.buffer.set_cursor(0);
        self.mode = Mode::ViInsert;
    }

    /// vi `S`/`cc`: clears the whole line and enters insert mode.
    pub fn vi_substitute(&mut self) {
        self.snapshot_before_edit();
        let removed = self.buffer.delete_range(0, self.buffer.len());
        self.kill_ring.kill(removed);
        self.mode = Mode::ViInsert;
    }

    /// Spawns an external editor on a temp file containing the current
    /// buffer, then reads it back. `editor` is the command to run (e.g. from
    /// `$VISUAL`/`$EDITOR`); `spawn` is injected so tests don't need a
    /// real terminal or editor binary.
    pub fn vi_edit_and_accept(
        &mut self,
        editor: &str,
        spawn: impl FnOnce(&str, &std::path::Path) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", self.buffer.as_string())?;
        file.flush()?;
        let path = file.path().to_path_buf();
        spawn(editor, &path)?;
        let contents = std::fs::read_to_string(&path)?;
        let trimmed = contents.strip_suffix('\n').unwrap_or(&contents);
        self.snapshot_before_edit();
        self.buffer = EditBuffer::from_str(trimmed);
        Ok(())
    }

    // -- completion ---------------------------------------------------

    /// Splices a `CompletionEngine::resolve` result into the buffer,
    /// replacing the source word `[word_start, cursor)` with the
    /// resolved insertion text.
    pub fn apply_completion(&mut self, word_start: usize, insertion: &str) {
        self.snapshot_before_edit();
        let cursor = self.buffer.cursor();
        self.buffer.replace_range(word_start, cursor, insertion);
    }

    // -- history search ---------------------------------------------

    pub fn begin_history_search(&mut self, direction: SearchDirection) {
        self.pre_search_buffer = Some(self.buffer.clone());
        self.history_search = Some(crate::history::HistorySearch::new(direction));
        self.mode = Mode::ViSearch;
    }

    pub fn history_search_push(&mut self, c: char, history: &HistoryList, current_seq: Option<u64>) {
        if let Some(search) = &mut self.history_search {
            search.push_char(c);
            if let Some(found) = search.search(history, current_seq).map(str::to_string) {
                self.buffer = EditBuffer::from_str(&found);
            }
        }
    }

    /// Accept: leaves the matched entry as the current edit line.
    pub fn accept_history_search(&mut self) {
        if let Some(mut search) = self.history_search.take() {
            search.accept();
            self.last_search = Some(search);
        }
        self.pre_search_buffer = None;
        self.mode = Mode::ViCommand;
    }

    /// The sequence number of the history entry currently loaded into
    /// the buffer, if any — used to resume a repeated search from where
    /// the last match left off.
    pub fn current_entry_seq(&self) -> Option<u64> {
        self.undo.current_entry_seq()
    }

    /// Repeats the last accepted history search (vi `n`), or its
    /// opposite direction (vi `N`), continuing from the currently loaded
    /// entry. No-op if no search has ever been accepted, or if the
    /// repeat finds no further match.
    pub fn repeat_history_search(&mut self, history: &HistoryList, reverse: bool) -> bool {
        let Some((pattern, direction)) = self.last_search.as_ref().and_then(|s| s.repeat()) else {
            return false;
        };
        let direction = if reverse { direction.reversed() } else { direction };
        let mut search = crate::history::HistorySearch::new(direction);
        for c in pattern.chars() {
            search.push_char(c);
        }
        let current_seq = self.current_entry_seq();
        let Some(found) = search.search(history, current_seq).map(str::to_string) else {
            return false;
        };
        self.buffer = EditBuffer::from_str(&found);
        search.accept();
        self.last_search = Some(search);
        true
    }

    /// Abort: restores the prior state.
    pub fn abort_history_search(&mut self) {
        if let Some(prior) = self.pre_search_buffer.take() {
            self.buffer = prior;
        }
        self.history_search = None;
        self.mode = Mode::ViCommand;
    }

    pub fn is_searching(&self) -> bool {
        self.history_search.is_some()
    }

    // -- accept -------------------------------------------------------

    /// Finalizes any active history search, appends a trailing newline,
    /// and returns the line ready for the parser collaborator.
    pub fn accept_line(&mut self) -> AcceptedLine {
        if self.is_searching() {
            self.accept_history_search();
        }
        let text = self.buffer.as_string();
        AcceptedLine { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_backspace_redo_matches_spec_scenario_4() {
        let mut fsm = EditorFSM::new(Mode::Emacs);
        fsm.load_entry(1, "");
        fsm.self_insert('a');
        fsm.self_insert('b');
        fsm.self_insert('c');
        fsm.backward_delete_char();
        fsm.backward_delete_char();
        assert_eq!(fsm.buffer().as_string(), "a");
        fsm.redo();
        assert_eq!(fsm.buffer().as_string(), "ab");
    }

    #[test]
    fn vi_word_delete_with_count_deletes_two_words() {
        let mut fsm = EditorFSM::new(Mode::ViCommand);
        fsm.load_entry(1, "foo bar baz");
        fsm.buffer.set_cursor(0);
        fsm.begin_operator(Operator::Kill);
        fsm.feed_count_digit(2);
        fsm.apply_motion(Motion::WordForward(WordKind::Vi), None);
        assert_eq!(fsm.buffer().as_string(), "baz");
    }

    #[test]
    fn combined_operator_and_motion_counts_multiply() {
        let mut fsm = EditorFSM::new(Mode::ViCommand);
        fsm.load_entry(1, "one two three four five");
        fsm.buffer.set_cursor(0);
        fsm.feed_count_digit(3);
        fsm.begin_operator(Operator::Kill);
        fsm.feed_count_digit(2);
        fsm.apply_motion(Motion::WordForward(WordKind::Vi), None);
        // 3d2w deletes six words; the line only has five, so everything
        // up to the end is removed.
        assert_eq!(fsm.buffer().as_string(), "");
    }

    #[test]
    fn put_pop_cycles_to_the_next_older_kill_ring_entry() {
        let mut fsm = EditorFSM::new(Mode::Emacs);
        fsm.load_entry(1, "");
        fsm.self_insert('a');
        fsm.self_insert('b');
        fsm.self_insert('c');
        fsm.apply_motion(Motion::BeginningOfLine, None);
        fsm.kill_line(); // kills "abc"
        fsm.self_insert('x');
        fsm.self_insert('y');
        fsm.apply_motion(Motion::BeginningOfLine, None);
        fsm.kill_line(); // kills "xy", now the current entry

        fsm.put(true, true);
        assert_eq!(fsm.buffer().as_string(), "xy");

        fsm.put_pop();
        assert_eq!(fsm.buffer().as_string(), "abc");
    }

    #[test]
    fn kill_ring_length_never_exceeds_capacity() {
        let mut fsm = EditorFSM::new(Mode::Emacs);
        fsm.load_entry(1, "");
        for i in 0..64 {
            fsm.self_insert('x');
            fsm.self_insert(char::from_u32('0' as u32 + (i % 10)).unwrap());
            fsm.kill_line();
        }
        assert!(fsm.kill_ring().len() <= crate::killring::CAPACITY);
    }

    #[test]
    fn history_search_anchored_then_abort_restores_prior_buffer() {
        let mut fsm = EditorFSM::new(Mode::ViCommand);
        fsm.load_entry(1, "original");
        let mut history = HistoryList::new(10);
        history.push("ls");
        history.push("cat foo");
        history.push("ls -la");

        fsm.begin_history_search(SearchDirection::Backward);
        fsm.history_search_push('^', &history, None);
        fsm.history_search_push('l', &history, None);
        fsm.history_search_push('s', &history, None);
        assert_eq!(fsm.buffer().as_string(), "ls -la");

        fsm.abort_history_search();
        assert_eq!(fsm.buffer().as_string(), "original");
    }

    #[test]
    fn cursor_bounds_hold_after_arbitrary_edits() {
        let mut fsm = EditorFSM::new(Mode::Emacs);
        fsm.load_entry(1, "hello world");
        fsm.backward_delete_char();
        fsm.backward_delete_char();
        fsm.self_insert('!');
        assert!(fsm.buffer().cursor() <= fsm.buffer().len());
    }
}
