//! Byte-to-command dispatch for the emacs and vi keymaps, covering the
//! commands `EditorFSM` actually exposes.

use kaish_ctl_edit::fsm::{EditorFSM, Mode, Operator};
use kaish_ctl_edit::history::SearchDirection;
use kaish_ctl_edit::motion::{Motion, WordKind};

const CTRL_A: u8 = 0x01;
const CTRL_B: u8 = 0x02;
const CTRL_D: u8 = 0x04;
const CTRL_E: u8 = 0x05;
const CTRL_F: u8 = 0x06;
const CTRL_H: u8 = 0x08;
const CTRL_K: u8 = 0x0b;
const CTRL_L: u8 = 0x0c;
const CTRL_N: u8 = 0x0e;
const CTRL_P: u8 = 0x10;
const CTRL_R: u8 = 0x12;
const CTRL_U: u8 = 0x15;
const CTRL_W: u8 = 0x17;
const CTRL_Y: u8 = 0x19;
const CTRL_UNDERSCORE: u8 = 0x1f;
const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// What the shell's main loop should do after feeding a byte to the
/// keymap: most bytes just mutate the `EditorFSM` in place, but a few
/// require the loop itself to act (redraw the screen, accept the line,
/// cancel and re-prompt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The FSM was updated; redraw from its buffer.
    Continue,
    /// Repaint the whole line (`Ctrl-L`).
    Redraw,
    /// The line is complete; hand it to the executor.
    Accept(String),
    /// `Ctrl-C`: discard the current line without running it.
    Cancel,
    /// End of input (`Ctrl-D` on an empty buffer).
    Eof,
}

/// Dispatches one input byte against the active mode's keymap.
pub fn dispatch(fsm: &mut EditorFSM, byte: u8) -> Action {
    match fsm.mode() {
        Mode::Emacs | Mode::Insert => emacs(fsm, byte),
        Mode::ViInsert => vi_insert(fsm, byte),
        Mode::ViCommand => vi_command(fsm, byte),
        Mode::ViExpectChar => vi_expect_char(fsm, byte),
        Mode::ViSearch => vi_search(fsm, byte),
        Mode::Suspended => Action::Continue,
    }
}

fn emacs(fsm: &mut EditorFSM, byte: u8) -> Action {
    if fsm.take_escape_pending() {
        if byte == b'y' {
            fsm.put_pop();
        }
        return Action::Continue;
    }

    match byte {
        b'\n' | b'\r' => return Action::Accept(fsm.accept_line().text),
        0x03 => return Action::Cancel,
        CTRL_D if fsm.buffer().is_empty() => return Action::Eof,
        CTRL_D => fsm.delete_char(),
        CTRL_A => fsm.apply_motion(Motion::BeginningOfLine, None),
        CTRL_E => fsm.apply_motion(Motion::EndOfLine, None),
        CTRL_B => fsm.apply_motion(Motion::CharBackward, None),
        CTRL_F => fsm.apply_motion(Motion::CharForward, None),
        CTRL_H | DEL => fsm.backward_delete_char(),
        CTRL_K => fsm.kill_line(),
        CTRL_U => {
            fsm.apply_motion(Motion::BeginningOfLine, None);
            fsm.kill_line();
        }
        CTRL_W => fsm.delete_semiword(),
        CTRL_Y => fsm.put(true, true),
        CTRL_L => return Action::Redraw,
        CTRL_R => {
            fsm.begin_history_search(SearchDirection::Backward);
        }
        CTRL_N => fsm.begin_history_search(SearchDirection::Forward),
        CTRL_P => fsm.begin_history_search(SearchDirection::Backward),
        ESC => fsm.note_escape(),
        c if (0x20..0x7f).contains(&c) => fsm.self_insert(c as char),
        _ => {}
    }
    Action::Continue
}

fn vi_insert(fsm: &mut EditorFSM, byte: u8) -> Action {
    match byte {
        b'\n' | b'\r' => return Action::Accept(fsm.accept_line().text),
        ESC => fsm.set_mode(Mode::ViCommand),
        CTRL_H | DEL => fsm.backward_delete_char(),
        CTRL_W => fsm.delete_semiword(),
        CTRL_U => {
            fsm.apply_motion(Motion::BeginningOfLine, None);
            fsm.kill_line();
        }
        c if (0x20..0x7f).contains(&c) => fsm.self_insert(c as char),
        _ => {}
    }
    Action::Continue
}

fn vi_command(fsm: &mut EditorFSM, byte: u8) -> Action {
    if byte.is_ascii_digit() && !(byte == b'0' && !fsm.has_pending_count()) {
        fsm.feed_count_digit((byte - b'0') as u32);
        return Action::Continue;
    }

    match byte {
        b'\n' | b'\r' => return Action::Accept(fsm.accept_line().text),
        0x03 => return Action::Cancel,
        b'h' => fsm.apply_motion(Motion::CharBackward, None),
        b'l' | b' ' => fsm.apply_motion(Motion::CharForward, None),
        b'0' => fsm.apply_motion(Motion::BeginningOfLine, None),
        b'$' => fsm.apply_motion(Motion::EndOfLine, None),
        b'^' => fsm.apply_motion(Motion::FirstNonBlank, None),
        b'w' => fsm.apply_motion(Motion::WordForward(WordKind::Vi), None),
        b'W' => fsm.apply_motion(Motion::WordForward(WordKind::Big), None),
        b'b' => fsm.apply_motion(Motion::WordBackward(WordKind::Vi), None),
        b'B' => fsm.apply_motion(Motion::WordBackward(WordKind::Big), None),
        b'e' => fsm.apply_motion(Motion::WordEndForward(WordKind::Vi), None),
        b'x' => fsm.delete_char(),
        b'X' => fsm.backward_delete_char(),
        b'd' => fsm.begin_operator(Operator::Kill),
        b'c' => fsm.begin_operator(Operator::Change),
        b'y' => fsm.begin_operator(Operator::Copy),
        b'p' => fsm.put(true, false),
        b'P' => fsm.put(false, false),
        b'u' => {
            fsm.undo();
        }
        b'U' => {
            fsm.undo_all();
        }
        CTRL_UNDERSCORE => {
            fsm.cancel_undo();
        }
        0x12 => {
            fsm.redo();
        }
        b'.' => fsm.replay_last_edit(),
        b'~' => fsm.change_case_count(),
        b'r' => fsm.set_mode(Mode::ViExpectChar),
        b'i' => fsm.vi_insert_beginning(),
        b'a' => fsm.vi_append(),
        b'A' => fsm.vi_append_end(),
        b'I' => fsm.vi_insert_beginning(),
        b's' => fsm.vi_substitute(),
        b'f' | b'F' | b't' | b'T' => fsm.set_mode(Mode::ViExpectChar),
        b'/' => fsm.begin_history_search(SearchDirection::Backward),
        b'?' => fsm.begin_history_search(SearchDirection::Forward),
        _ => {}
    }
    Action::Continue
}

fn vi_expect_char(fsm: &mut EditorFSM, byte: u8) -> Action {
    if (0x20..0x7f).contains(&byte) {
        let c = byte as char;
        if let Some(op) = fsm.operator_pending() {
            let _ = op;
            fsm.apply_motion(Motion::FindCharForward, Some(c));
        } else {
            fsm.replace_char_count(c);
        }
    }
    fsm.set_mode(Mode::ViCommand);
    Action::Continue
}

fn vi_search(fsm: &mut EditorFSM, byte: u8) -> Action {
    match byte {
        b'\n' | b'\r' => fsm.accept_history_search(),
        0x03 | ESC => fsm.abort_history_search(),
        CTRL_H | DEL => { /* handled via history_search_push in the main loop, which owns the HistoryList */ }
        c if (0x20..0x7f).contains(&c) => { /* pushed by the main loop, which has access to HistoryList */
            let _ = c;
        }
        _ => {}
    }
    Action::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emacs_enter_accepts_the_line() {
        let mut fsm = EditorFSM::new(Mode::Emacs);
        fsm.load_entry(1, "echo hi");
        let action = dispatch(&mut fsm, b'\n');
        assert_eq!(action, Action::Accept("echo hi\n".to_string()));
    }

    #[test]
    fn emacs_ctrl_a_then_ctrl_k_clears_the_line() {
        let mut fsm = EditorFSM::new(Mode::Emacs);
        fsm.load_entry(1, "echo hi");
        dispatch(&mut fsm, CTRL_A);
        dispatch(&mut fsm, CTRL_K);
        assert!(fsm.buffer().is_empty());
    }

    #[test]
    fn vi_esc_then_insert_switches_modes() {
        let mut fsm = EditorFSM::new(Mode::ViInsert);
        dispatch(&mut fsm, ESC);
        assert_eq!(fsm.mode(), Mode::ViCommand);
        dispatch(&mut fsm, b'i');
        assert_eq!(fsm.mode(), Mode::ViInsert);
    }

    #[test]
    fn vi_dw_deletes_a_word() {
        let mut fsm = EditorFSM::new(Mode::ViCommand);
        fsm.load_entry(1, "foo bar");
        dispatch(&mut fsm, b'd');
        dispatch(&mut fsm, b'w');
        assert_eq!(fsm.buffer().as_string(), "bar");
    }
}
