//! Motion commands.
//!
//! Each motion is a pure function `(chars, cursor, count) -> new_cursor`
//! plus a fixed inclusive/exclusive classification, so the operator
//! application logic in `fsm.rs` never has to special-case a motion by
//! name.

use crate::wordclass::{classify, is_blank, CharClass};

/// Whether a motion's endpoint is included in the range an operator acts
/// on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusivity {
    Inclusive,
    Exclusive,
}

/// The vi "word" flavor a word motion uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    /// Maximal run of non-blanks.
    Big,
    /// `[A-Za-z0-9_]` run, or maximal run of other non-blank chars.
    Vi,
}

fn same_word_class(chars: &[char], kind: WordKind, i: usize, j: usize) -> bool {
    match kind {
        WordKind::Big => true, // big-word treats any non-blank run as one word
        WordKind::Vi => classify(chars[i]) == classify(chars[j]),
    }
}

/// Moves forward to the start of the next word, `count` times.
pub fn word_forward(chars: &[char], mut cursor: usize, kind: WordKind, count: u32) -> usize {
    let len = chars.len();
    for _ in 0..count.max(1) {
        if cursor >= len {
            break;
        }
        // Skip the rest of the current word.
        if !is_blank(chars[cursor]) {
            let start_class_ok = |i: usize| same_word_class(chars, kind, cursor, i);
            while cursor < len && !is_blank(chars[cursor]) && start_class_ok(cursor) {
                cursor += 1;
            }
        }
        // Skip blanks.
        while cursor < len && is_blank(chars[cursor]) {
            cursor += 1;
        }
    }
    cursor
}

/// Moves backward to the start of the previous word, `count` times.
pub fn word_backward(chars: &[char], mut cursor: usize, kind: WordKind, count: u32) -> usize {
    for _ in 0..count.max(1) {
        if cursor == 0 {
            break;
        }
        cursor -= 1;
        while cursor > 0 && is_blank(chars[cursor]) {
            cursor -= 1;
        }
        if !is_blank(chars[cursor]) {
            let class_at = |i: usize| same_word_class(chars, kind, cursor, i);
            while cursor > 0 && !is_blank(chars[cursor - 1]) && class_at(cursor - 1) {
                cursor -= 1;
            }
        }
    }
    cursor
}

/// Moves forward to the end of the word (inclusive motion), `count`
/// times.
pub fn word_end_forward(chars: &[char], mut cursor: usize, kind: WordKind, count: u32) -> usize {
    let len = chars.len();
    if len == 0 {
        return 0;
    }
    for _ in 0..count.max(1) {
        if cursor + 1 >= len {
            cursor = len.saturating_sub(1);
            continue;
        }
        cursor += 1;
        while cursor < len && is_blank(chars[cursor]) {
            cursor += 1;
        }
        if cursor >= len {
            cursor = len - 1;
            break;
        }
        let class_at = |i: usize| same_word_class(chars, kind, cursor, i);
        while cursor + 1 < len && !is_blank(chars[cursor + 1]) && class_at(cursor + 1) {
            cursor += 1;
        }
    }
    cursor
}

pub fn char_forward(len: usize, cursor: usize, count: u32) -> usize {
    (cursor + count.max(1) as usize).min(len)
}

pub fn char_backward(cursor: usize, count: u32) -> usize {
    cursor.saturating_sub(count.max(1) as usize)
}

pub fn beginning_of_line() -> usize {
    0
}

pub fn end_of_line(len: usize) -> usize {
    len
}

/// First non-blank character on the line.
pub fn first_non_blank(chars: &[char]) -> usize {
    chars.iter().position(|&c| !is_blank(c)).unwrap_or(chars.len())
}

pub fn absolute_column(len: usize, col: u32) -> usize {
    (col as usize).min(len)
}

/// Finds the `count`-th occurrence of `target` after `cursor`
/// (exclusive of the current position), or `None` if not found
/// (inclusive motion — lands on the character itself).
pub fn find_char_forward(chars: &[char], cursor: usize, target: char, count: u32) -> Option<usize> {
    let mut pos = cursor;
    for _ in 0..count.max(1) {
        pos = (pos + 1..chars.len()).find(|&i| chars[i] == target)?;
    }
    Some(pos)
}

pub fn find_char_backward(chars: &[char], cursor: usize, target: char, count: u32) -> Option<usize> {
    let mut pos = cursor;
    for _ in 0..count.max(1) {
        pos = (0..pos).rev().find(|&i| chars[i] == target)?;
    }
    Some(pos)
}

/// `till`-char lands one position short of the target, unlike
/// `find_char_*` which lands on it.
pub fn till_char_forward(chars: &[char], cursor: usize, target: char, count: u32) -> Option<usize> {
    find_char_forward(chars, cursor, target, count).map(|p| p.saturating_sub(1))
}

pub fn till_char_backward(chars: &[char], cursor: usize, target: char, count: u32) -> Option<usize> {
    find_char_backward(chars, cursor, target, count).map(|p| p + 1)
}

/// Classification table for each named motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    CharForward,
    CharBackward,
    WordForward(WordKind),
    WordBackward(WordKind),
    WordEndForward(WordKind),
    BeginningOfLine,
    EndOfLine,
    FirstNonBlank,
    AbsoluteColumn,
    FindCharForward,
    FindCharBackward,
    TillCharForward,
    TillCharBackward,
    FindRepeat,
}

impl Motion {
    pub fn inclusivity(self) -> Inclusivity {
        match self {
            Motion::CharForward
            | Motion::WordEndForward(_)
            | Motion::FindCharForward
            | Motion::FindCharBackward
            | Motion::TillCharForward
            | Motion::TillCharBackward
            | Motion::FindRepeat => Inclusivity::Inclusive,
            Motion::CharBackward
            | Motion::WordForward(_)
            | Motion::WordBackward(_)
            | Motion::BeginningOfLine
            | Motion::EndOfLine
            | Motion::FirstNonBlank
            | Motion::AbsoluteColumn => Inclusivity::Exclusive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigword_forward_skips_whole_nonblank_run() {
        let chars: Vec<char> = "foo.bar baz".chars().collect();
        let next = word_forward(&chars, 0, WordKind::Big, 1);
        assert_eq!(next, 8); // start of "baz"
    }

    #[test]
    fn viword_forward_stops_at_punctuation_boundary() {
        let chars: Vec<char> = "foo.bar".chars().collect();
        let next = word_forward(&chars, 0, WordKind::Vi, 1);
        assert_eq!(next, 3); // start of "."
    }

    #[test]
    fn word_backward_lands_on_word_start() {
        let chars: Vec<char> = "foo bar".chars().collect();
        let prev = word_backward(&chars, 7, WordKind::Big, 1);
        assert_eq!(prev, 4);
    }

    #[test]
    fn till_char_forward_stops_short_of_target() {
        let chars: Vec<char> = "abcdef".chars().collect();
        assert_eq!(till_char_forward(&chars, 0, 'd', 1), Some(2));
    }
}
