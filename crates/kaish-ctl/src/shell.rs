//! The interactive main loop.

use std::io::Read;
use std::os::fd::AsRawFd;

use kaish_ctl_builtins::complete::CompleteRegistry;
use kaish_ctl_builtins::traits::{Executor, SimpleAliasTable, StdinTerminal};
use kaish_ctl_edit::complete::{
    common_prefix, filter_prefix, generate_external_commands, generate_files, quote_insert,
    Category, Classification, CompletionCandidate, CompletionContext, CompletionEngine,
    FilterChain,
};
use kaish_ctl_edit::fsm::{EditorFSM, Mode};
use kaish_ctl_edit::history::{HistoryList, SearchDirection};
use kaish_ctl_job::{JobTable, NotifyMode, Waiter};
use kaish_ctl_signal::{SigState, TrapPolicy, TrapTable};

use crate::config::Config;

/// Builtin command names, offered as `Command`-position completion
/// candidates alongside `PATH` executables.
const BUILTIN_NAMES: &[&str] = &[
    "exit", "kill", "jobs", "fg", "bg", "disown", "wait", "suspend", "exec", "trap", "complete",
    "history",
];

/// Reserved words, offered as `Command`-position completion candidates.
const KEYWORDS: &[&str] = &["for", "in", "do", "done", "case", "esac", "function"];

/// Owns every piece of mutable state the interactive loop threads
/// through builtins and the editor.
pub struct Shell<E: Executor> {
    pub sig: SigState,
    pub traps: TrapTable,
    pub jobs: JobTable,
    pub waiter: Waiter,
    pub fsm: EditorFSM,
    pub history: HistoryList,
    pub completions: CompleteRegistry,
    pub aliases: SimpleAliasTable,
    pub terminal: StdinTerminal,
    pub executor: E,
    pub login_shell: bool,
    history_path: std::path::PathBuf,
    /// The word start and remaining candidate list from the last Tab
    /// press, so an immediately repeated Tab with no intervening edit
    /// selects the first listed candidate instead of recomputing.
    pending_completion: Option<(usize, Vec<CompletionCandidate>)>,
    /// `$?` — the exit status of the last command run, consulted by a
    /// bare `exit` with no operand.
    last_status: i32,
    /// Set by the `exit` builtin once it has passed its busy-jobs gate
    /// and run the `EXIT` trap; the REPL loop ends the process with
    /// this code once it observes it.
    pub exit_requested: Option<i32>,
}

impl<E: Executor> Shell<E> {
    pub fn new(config: &Config, executor: E, login_shell: bool) -> anyhow::Result<Self> {
        let mut sig = SigState::new();
        sig.install_shell_handlers(true, true)?;

        let mut traps = TrapTable::new(TrapPolicy::Posix);
        for &ignored in sig.preexisting_ignored() {
            traps.note_initially_ignored(ignored);
        }

        let mode = match config.edit_mode {
            crate::config::EditMode::Emacs => Mode::Emacs,
            crate::config::EditMode::Vi => Mode::ViCommand,
        };

        let mut history = HistoryList::new(config.history_max_entries);
        let history_path = config.resolved_history_file();
        if let Ok(text) = std::fs::read_to_string(&history_path) {
            history.load_lines(text.lines().map(str::to_string));
        }

        let notify = if config.async_notify {
            NotifyMode::Asynchronous
        } else {
            NotifyMode::Synchronous
        };

        Ok(Self {
            sig,
            traps,
            jobs: JobTable::new(),
            waiter: Waiter::new(notify),
            fsm: EditorFSM::new(mode),
            history,
            completions: CompleteRegistry::new(),
            aliases: SimpleAliasTable::new(),
            terminal: StdinTerminal::default(),
            executor,
            login_shell,
            history_path,
            pending_completion: None,
            last_status: 0,
            exit_requested: None,
        })
    }

    /// Persists history back to disk.
    pub fn save_history(&self) -> std::io::Result<()> {
        if let Some(parent) = self.history_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.history_path, self.history.save_lines())
    }

    /// Drains any pending reaped children and asynchronously-notified
    /// job status lines, printing them the way
    /// bash prints background-job completion notices between prompts.
    pub fn poll_jobs(&mut self) -> Vec<String> {
        let drained = self.sig.drain(&self.traps, |sig, cmd| {
            tracing::debug!(signal = sig.get(), command = cmd, "trap fired");
        });
        let lines = self.waiter.apply(&mut self.jobs, &drained.reaped);
        self.jobs.reap_notified_done();
        lines
    }

    /// Resolves the word at the cursor into completion candidates: at
    /// command position this is `PATH` executables plus builtins and
    /// keywords (excluding slash-bearing words, which always fall
    /// through to file completion); everywhere else, and for any
    /// slash-bearing word, it's a directory listing rooted at the
    /// word's own directory component. A per-command completion
    /// function (the spec's first two lookup steps for arguments) has
    /// no collaborator to autoload from here, so arguments go straight
    /// to file completion.
    fn generate_candidates(&self, ctx: &CompletionContext) -> Vec<CompletionCandidate> {
        if !ctx.word.contains('/') && matches!(ctx.classification, Classification::Command) {
            let path_env = std::env::var("PATH").unwrap_or_default();
            let mut candidates = generate_external_commands(&path_env, &ctx.word);
            candidates.extend(filter_prefix(BUILTIN_NAMES, &ctx.word, Category::Command));
            candidates.extend(filter_prefix(KEYWORDS, &ctx.word, Category::Word));
            return candidates;
        }

        let slash_idx = ctx.word.rfind('/');
        let dir_prefix = slash_idx.map(|i| &ctx.word[..=i]).unwrap_or("");
        let dir_path = match slash_idx {
            Some(0) => std::path::PathBuf::from("/"),
            Some(i) => std::path::PathBuf::from(&ctx.word[..i]),
            None => std::path::PathBuf::from("."),
        };
        let file_prefix = slash_idx.map(|i| &ctx.word[i + 1..]).unwrap_or(&ctx.word);

        let mut candidates = generate_files(&dir_path, file_prefix);
        for c in &mut candidates {
            c.origin = format!("{dir_prefix}{}", c.origin);
            c.display = format!("{dir_prefix}{}", c.display);
        }
        candidates
    }

    /// Drives `Tab` completion. A second Tab with the word unchanged
    /// since the last one accepts the first of the previously listed
    /// candidates, matching the common-prefix-then-select-first flow of
    /// scenario 6; otherwise it generates fresh candidates, splices the
    /// sole match or common prefix into the buffer, and returns the
    /// remaining candidates' display strings for the caller to print.
    pub fn complete(&mut self) -> Vec<String> {
        let line = self.fsm.buffer().as_string();
        let cursor = self.fsm.buffer().cursor();
        let ctx = CompletionContext::classify(&line, cursor);

        if let Some((word_start, candidates)) = self.pending_completion.take() {
            if word_start == ctx.word_start && ctx.word == common_prefix(&candidates) {
                if let Some(first) = candidates.first() {
                    let mut text = quote_insert(&first.origin, ctx.quote);
                    if first.terminate {
                        text.push(' ');
                    }
                    self.fsm.apply_completion(ctx.word_start, &text);
                }
                return Vec::new();
            }
        }

        let candidates = self.generate_candidates(&ctx);
        let engine = CompletionEngine::new();
        let (insertion, remaining) = engine.resolve(candidates, &FilterChain::new(), ctx.quote);
        self.fsm.apply_completion(ctx.word_start, &insertion);

        if remaining.len() > 1 {
            let list = remaining.iter().map(|c| c.display.clone()).collect();
            self.pending_completion = Some((ctx.word_start, remaining));
            list
        } else {
            Vec::new()
        }
    }

    /// One REPL iteration: reads raw bytes until a line is accepted,
    /// canceled, or EOF is hit.
    pub fn read_line(&mut self, seq: u64) -> crate::keymap::Action {
        self.fsm.load_entry(seq, "");
        self.pending_completion = None;
        let stdin = std::io::stdin();
        let fd = stdin.as_raw_fd();
        let mut byte = [0u8; 1];
        let mut locked = stdin.lock();

        loop {
            for line in self.poll_jobs() {
                println!("{line}");
            }

            match self.sig.wait_for_input(fd, None, &self.traps, |_, _| {}) {
                kaish_ctl_signal::InputReady::Interrupted(_) => {
                    return crate::keymap::Action::Cancel;
                }
                kaish_ctl_signal::InputReady::Timeout => continue,
                kaish_ctl_signal::InputReady::Ready => {}
            }

            if locked.read(&mut byte).unwrap_or(0) == 0 {
                return crate::keymap::Action::Eof;
            }

            if self.fsm.is_searching() {
                match byte[0] {
                    b'\n' | b'\r' => {
                        self.fsm.accept_history_search();
                        continue;
                    }
                    0x1b | 0x03 => {
                        self.fsm.abort_history_search();
                        continue;
                    }
                    0x08 | 0x7f => continue,
                    c if (0x20..0x7f).contains(&c) => {
                        self.fsm
                            .history_search_push(c as char, &self.history, None);
                        continue;
                    }
                    _ => continue,
                }
            }

            // `n`/`N` repeat the last accepted history search; this
            // needs `self.history`, which `keymap::dispatch` can't see.
            if self.fsm.mode() == Mode::ViCommand && matches!(byte[0], b'n' | b'N') {
                self.fsm
                    .repeat_history_search(&self.history, byte[0] == b'N');
                continue;
            }

            // Tab-completion needs the filesystem/`PATH`/completion
            // registry, none of which `keymap::dispatch` can see.
            if byte[0] == 0x09 {
                print_candidate_list(&self.complete());
                continue;
            }

            let action = crate::keymap::dispatch(&mut self.fsm, byte[0]);
            if !matches!(action, crate::keymap::Action::Continue) {
                return action;
            }
        }
    }

    /// Runs one accepted line through the configured executor, then
    /// records it in history.
    pub async fn run_line(&mut self, line: &str) -> anyhow::Result<kaish_ctl_types::ExitStatus> {
        let trimmed = line.trim_end_matches('\n');
        if !trimmed.is_empty() {
            self.history.push(trimmed.to_string());
        }

        let status = if let Some(status) = self.dispatch_builtin(trimmed)? {
            status
        } else {
            self.executor
                .exec_wcs(trimmed)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?
        };

        self.last_status = status.code();
        Ok(status)
    }

    /// Recognizes and runs a builtin command by name, printing its output lines; returns `None` for anything
    /// else so the caller falls through to the `Executor` collaborator.
    fn dispatch_builtin(&mut self, line: &str) -> anyhow::Result<Option<kaish_ctl_types::ExitStatus>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        let result = match name {
            "exit" => {
                let r = kaish_ctl_builtins::exit::exit(
                    &args,
                    &self.jobs,
                    &self.traps,
                    self.last_status,
                    |sig, cmd| tracing::debug!(signal = sig.get(), command = cmd, "trap fired"),
                );
                if let Ok((_, code)) = &r {
                    self.exit_requested = Some(*code);
                }
                Some(r)
            }
            "kill" => Some(kaish_ctl_builtins::kill::kill(&args, &self.jobs)),
            "jobs" => Some(kaish_ctl_builtins::jobs::jobs(&args, &mut self.jobs)),
            "fg" => Some(kaish_ctl_builtins::fgbg::fg(
                &args,
                &mut self.jobs,
                &mut self.sig,
                &self.traps,
                &self.terminal,
                |sig, cmd| tracing::debug!(signal = sig.get(), command = cmd, "trap fired"),
            )),
            "bg" => Some(kaish_ctl_builtins::fgbg::bg(&args, &mut self.jobs)),
            "disown" => Some(kaish_ctl_builtins::disown::disown(&args, &mut self.jobs)),
            "wait" => Some(kaish_ctl_builtins::wait::wait(
                &args,
                &mut self.jobs,
                &mut self.sig,
                &self.traps,
                |sig, cmd| tracing::debug!(signal = sig.get(), command = cmd, "trap fired"),
            )),
            "suspend" => Some(kaish_ctl_builtins::suspend::suspend(&args, self.login_shell)),
            "trap" => Some(kaish_ctl_builtins::trap::trap(&args, &mut self.traps)),
            "complete" => Some(kaish_ctl_builtins::complete::complete(&args, &mut self.completions)),
            "history" => Some(kaish_ctl_builtins::history::history(&args, &mut self.history)),
            "exec" => Some(kaish_ctl_builtins::exec::exec(&args, &self.jobs, &self.sig)),
            _ => None,
        };

        let Some(result) = result else { return Ok(None) };

        match result {
            Ok((lines, code)) => {
                for line in lines {
                    println!("{line}");
                }
                Ok(Some(kaish_ctl_types::ExitStatus::Exited(code)))
            }
            Err(e) => {
                eprintln!("{e}");
                Ok(Some(kaish_ctl_types::ExitStatus::Exited(e.exit_code())))
            }
        }
    }
}

/// Prints a completion candidate list the way interactive `ls`/shells
/// do: column-wrapped to the terminal width (falling back to 80 when
/// it can't be read, e.g. when stdout isn't a tty), with directory
/// entries (trailing `/`, per `generate_files`) highlighted.
fn print_candidate_list(names: &[String]) {
    use owo_colors::OwoColorize;

    if names.is_empty() {
        return;
    }

    let term_width = terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(80);
    let col_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(1) + 2;
    let cols = (term_width / col_width).max(1);

    for row in names.chunks(cols) {
        let mut line = String::new();
        for name in row {
            let padded = format!("{name:<col_width$}");
            if name.ends_with('/') {
                line.push_str(&padded.cyan().to_string());
            } else {
                line.push_str(&padded);
            }
        }
        println!("{}", line.trim_end());
    }
}

/// Reverse incremental search direction helper kept separate from
/// `Shell` so unit tests can exercise it without a real terminal.
pub fn search_direction_for(byte: u8) -> Option<SearchDirection> {
    match byte {
        0x12 => Some(SearchDirection::Backward), // Ctrl-R
        0x0e => Some(SearchDirection::Forward),  // Ctrl-N used reverse of Ctrl-P
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaish_ctl_builtins::traits::NullExecutor;

    #[test]
    fn new_shell_installs_handlers_without_erroring() {
        let config = Config::default();
        let shell = Shell::new(&config, NullExecutor, false);
        assert!(shell.is_ok());
    }
}
