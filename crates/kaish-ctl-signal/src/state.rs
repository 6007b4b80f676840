//! Process-wide signal disposition and the synchronous drain point.
//!
//! The signal handler body installed by this module does the absolute
//! minimum required to be async-signal-safe: it sets a handful of
//! `AtomicBool`s and returns. Everything else — reaping, trap dispatch,
//! window-change handling — happens later, synchronously, when the main
//! loop calls [`SigState::drain`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{self, SigHandler, SigSet, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::SigError;
use crate::trap::{TrapCommand, TrapTable};
use crate::SignalNum;

/// Latches set only from inside the signal handler. `Arc`-shared so the
/// handler (a bare `extern "C" fn`) can reach them through a process-wide
/// static without unsafe mutable globals.
struct Latches {
    any: AtomicBool,
    chld: AtomicBool,
    int: AtomicBool,
    winch: AtomicBool,
    /// One flag per signal number 0..=64; real-time signals index past 31
    /// and are bounds-checked against the platform's actual `SIGRTMAX`.
    per_signal: [AtomicBool; 64],
}

impl Latches {
    fn new() -> Self {
        Self {
            any: AtomicBool::new(false),
            chld: AtomicBool::new(false),
            int: AtomicBool::new(false),
            winch: AtomicBool::new(false),
            per_signal: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }
}

// A single process-wide instance the handler can reach. `OnceLock` keeps
// this out of `unsafe` territory entirely; the handler only ever touches
// atomics through it.
static LATCHES: std::sync::OnceLock<Arc<Latches>> = std::sync::OnceLock::new();

fn latches() -> &'static Arc<Latches> {
    LATCHES.get_or_init(|| Arc::new(Latches::new()))
}

/// The only code that runs inside the actual signal handler context.
/// Sets flags; nothing else.
extern "C" fn shell_handler(raw: i32) {
    let l = latches();
    l.any.store(true, Ordering::SeqCst);
    if (raw as usize) < l.per_signal.len() {
        l.per_signal[raw as usize].store(true, Ordering::SeqCst);
    }
    if raw == Signal::SIGCHLD as i32 {
        l.chld.store(true, Ordering::SeqCst);
    } else if raw == Signal::SIGINT as i32 {
        l.int.store(true, Ordering::SeqCst);
    } else if raw == Signal::SIGWINCH as i32 {
        l.winch.store(true, Ordering::SeqCst);
    }
}

/// Outcome of [`SigState::wait_for_child`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Reaped(Vec<ReapedChild>),
    Interrupted(SignalNum),
    TrapExecuted(SignalNum),
}

/// Outcome of [`SigState::wait_for_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputReady {
    Ready,
    Timeout,
    Interrupted(SignalNum),
}

/// One reaped child, surfaced to the caller of [`SigState::drain`] so
/// `kaish-ctl-job::Waiter` can update the job table without this crate
/// knowing about jobs at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReapedChild {
    pub pid: i32,
    pub status: RawWaitStatus,
}

/// A thin, `nix`-independent mirror of `WaitStatus` so downstream crates
/// don't need to depend on `nix` themselves just to read a reap result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawWaitStatus {
    Exited(i32),
    Signaled(i32, bool),
    Stopped(i32),
    Continued,
}

fn convert(status: WaitStatus) -> Option<(i32, RawWaitStatus)> {
    match status {
        WaitStatus::Exited(pid, code) => Some((pid.as_raw(), RawWaitStatus::Exited(code))),
        WaitStatus::Signaled(pid, sig, core) => {
            Some((pid.as_raw(), RawWaitStatus::Signaled(sig as i32, core)))
        }
        WaitStatus::Stopped(pid, sig) => Some((pid.as_raw(), RawWaitStatus::Stopped(sig as i32))),
        WaitStatus::Continued(pid) => Some((pid.as_raw(), RawWaitStatus::Continued)),
        WaitStatus::StillAlive | WaitStatus::PtraceEvent(..) | WaitStatus::PtraceSyscall(..) => {
            None
        }
    }
}

/// Result of [`SigState::drain`]: what was reaped and what trap ran last.
#[derive(Debug, Default)]
pub struct DrainResult {
    pub reaped: Vec<ReapedChild>,
    pub last_trap_signal: Option<SignalNum>,
    pub winch: bool,
}

/// Process-wide signal disposition, caught-flag array, and blocking
/// masks.
pub struct SigState {
    /// Signals whose disposition was `SIG_IGN` before the shell touched
    /// them; these must remain ignored across `exec`.
    preexisting_ignored: Vec<SignalNum>,
    interactive: bool,
    job_control: bool,
    /// Non-zero while a trap body is executing, to block re-entrant
    /// dispatch; `0` signal
    /// numbers never occur so `0` doubles as "none".
    trap_in_flight: i32,
}

impl SigState {
    /// Constructs a fresh `SigState` without installing anything. Call
    /// [`SigState::install_shell_handlers`] once the shell knows whether
    /// it is interactive and whether job control is enabled.
    pub fn new() -> Self {
        Self {
            preexisting_ignored: Vec::new(),
            interactive: false,
            job_control: false,
            trap_in_flight: 0,
        }
    }

    fn disposition(sig: Signal) -> Result<SigHandler, SigError> {
        // SAFETY: `sigaction` with no handler installed (query form) has
        // no preconditions beyond `sig` being a valid signal number.
        #[allow(unsafe_code)]
        unsafe {
            signal::sigaction(
                sig,
                &signal::SigAction::new(
                    SigHandler::SigDfl,
                    signal::SaFlags::empty(),
                    SigSet::empty(),
                ),
            )
        }
        .map(|old| old.handler())
        .map_err(|e| SigError::system("query signal disposition", e.into()))
    }

    /// Installs the shell's handlers: SIGCHLD unconditionally, SIGINT and
    /// SIGWINCH when `interactive`, SIGTERM/SIGQUIT ignored always,
    /// SIGTSTP/SIGTTIN/SIGTTOU ignored under job control. Remembers which
    /// signals were already `SIG_IGN` so `restore_for_exec` can preserve
    /// that.
    pub fn install_shell_handlers(
        &mut self,
        interactive: bool,
        job_control: bool,
    ) -> Result<(), SigError> {
        self.interactive = interactive;
        self.job_control = job_control;

        for sig in [Signal::SIGTERM, Signal::SIGQUIT] {
            self.remember_if_ignored(sig)?;
            ignore(sig)?;
        }

        if job_control {
            for sig in [Signal::SIGTSTP, Signal::SIGTTIN, Signal::SIGTTOU] {
                self.remember_if_ignored(sig)?;
                ignore(sig)?;
            }
        }

        install_handler(Signal::SIGCHLD)?;
        if interactive {
            install_handler(Signal::SIGINT)?;
            install_handler(Signal::SIGWINCH)?;
        }

        Ok(())
    }

    fn remember_if_ignored(&mut self, sig: Signal) -> Result<(), SigError> {
        if Self::disposition(sig)? == SigHandler::SigIgn {
            self.preexisting_ignored.push(SignalNum::new(sig as i32));
        }
        Ok(())
    }

    /// Signals whose disposition was `SIG_IGN` before
    /// [`SigState::install_shell_handlers`] touched them. The caller
    /// seeds `TrapTable::note_initially_ignored` from this set so the
    /// POSIX "may not re-trap a signal ignored on entry" rule has
    /// something to check against.
    pub fn preexisting_ignored(&self) -> &[SignalNum] {
        &self.preexisting_ignored
    }

    /// Undoes `install_shell_handlers`: signals remembered as
    /// pre-existing-ignore stay ignored; everything else reverts to
    /// default. When `about_to_exec`
    /// is false (a *temporary* restore, e.g. around a foreground
    /// command), SIGCHLD is left blocked rather than defaulted so no
    /// child-exit event is lost while it's unblocked elsewhere.
    pub fn restore_for_exec(&self, about_to_exec: bool) -> Result<(), SigError> {
        for sig in [
            Signal::SIGTERM,
            Signal::SIGQUIT,
            Signal::SIGTSTP,
            Signal::SIGTTIN,
            Signal::SIGTTOU,
            Signal::SIGINT,
            Signal::SIGWINCH,
        ] {
            if self
                .preexisting_ignored
                .contains(&SignalNum::new(sig as i32))
            {
                ignore(sig)?;
            } else {
                default(sig)?;
            }
        }

        if about_to_exec {
            default(Signal::SIGCHLD)?;
        } else {
            block(&[Signal::SIGCHLD])?;
        }
        Ok(())
    }

    /// Blocks every signal across `fork`. Returns the prior mask so the parent can
    /// restore it with [`SigState::unblock_after_forking`].
    pub fn block_while_forking(&self) -> Result<SigSet, SigError> {
        let mut all = SigSet::empty();
        all.fill();
        let mut old = SigSet::empty();
        signal::sigprocmask(signal::SigmaskHow::SIG_SETMASK, Some(&all), Some(&mut old))
            .map_err(|e| SigError::system("block signals for fork", e.into()))?;
        Ok(old)
    }

    /// Unblocks signals after `fork`. In the child, additionally resets
    /// the caught-flag array.
    pub fn unblock_after_forking(&self, child: bool, prior_mask: SigSet) -> Result<(), SigError> {
        if child {
            let l = latches();
            l.any.store(false, Ordering::SeqCst);
            l.chld.store(false, Ordering::SeqCst);
            l.int.store(false, Ordering::SeqCst);
            l.winch.store(false, Ordering::SeqCst);
            for flag in &l.per_signal {
                flag.store(false, Ordering::SeqCst);
            }
        }
        signal::sigprocmask(signal::SigmaskHow::SIG_SETMASK, Some(&prior_mask), None)
            .map_err(|e| SigError::system("unblock signals after fork", e.into()))
    }

    /// Synchronously consumes received flags: reaps any children via
    /// WNOHANG/WUNTRACED, then runs pending trap commands in
    /// signal-number order. Returns the reaped children plus the signal number
    /// whose trap ran last (for the `wait` builtin).
    ///
    /// `traps` provides the command text to run; this function does not
    /// execute shell syntax itself — the caller (the `Executor`
    /// collaborator) is handed the command string for each triggered
    /// trap via `on_trap`.
    pub fn drain(
        &mut self,
        traps: &TrapTable,
        mut on_trap: impl FnMut(SignalNum, &str),
    ) -> DrainResult {
        let l = latches();
        let mut result = DrainResult::default();

        if !l.any.swap(false, Ordering::SeqCst) {
            return result;
        }

        if l.chld.swap(false, Ordering::SeqCst) {
            result.reaped = self.reap_all();
        }

        if l.winch.swap(false, Ordering::SeqCst) {
            result.winch = true;
        }

        // SIGINT's own latch is left for `wait_for_child`/`wait_for_input`
        // to observe directly; it is not itself "trappable work" here
        // unless the user installed a SIGINT trap, handled below like any
        // other signal.

        for n in 1_usize..l.per_signal.len() {
            if !l.per_signal[n].swap(false, Ordering::SeqCst) {
                continue;
            }
            let sig = SignalNum::new(n as i32);
            if let Some(TrapCommand::Run(cmd)) = traps.get(sig) {
                if self.trap_in_flight != 0 && n as i32 != 0 {
                    // Re-entrant trap dispatch is suppressed, except EXIT,
                    // which has its own dedicated path in the executor
                    // collaborator and never arrives here via a raw
                    // signal number.
                    continue;
                }
                self.trap_in_flight = n as i32;
                on_trap(sig, cmd);
                self.trap_in_flight = 0;
                result.last_trap_signal = Some(sig);
            }
        }

        result
    }

    fn reap_all(&self) -> Vec<ReapedChild> {
        let mut out = Vec::new();
        loop {
            match waitpid(
                Pid::from_raw(-1),
                Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED),
            ) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => match convert(status) {
                    Some((pid, status)) => out.push(ReapedChild { pid, status }),
                    None => break,
                },
                Err(nix::errno::Errno::ECHILD) => break,
                Err(nix::errno::Errno::EINTR) => continue,
                Err(_) => break,
            }
        }
        out
    }

    /// Blocks until a child is reaped or SIGINT observed: unblocks
    /// SIGCHLD (and SIGINT when `interruptible`) and loops on
    /// `sigsuspend`.
    pub fn wait_for_child(
        &mut self,
        interruptible: bool,
        traps: &TrapTable,
        mut on_trap: impl FnMut(SignalNum, &str),
    ) -> WaitOutcome {
        let l = latches();
        loop {
            if interruptible && l.int.swap(false, Ordering::SeqCst) {
                return WaitOutcome::Interrupted(SignalNum::new(Signal::SIGINT as i32));
            }

            let mut wait_mask = SigSet::all();
            wait_mask.remove(Signal::SIGCHLD);
            if interruptible {
                wait_mask.remove(Signal::SIGINT);
            }
            let _ = signal::sigsuspend(&wait_mask);

            let drained = self.drain(traps, &mut on_trap);
            if !drained.reaped.is_empty() {
                return WaitOutcome::Reaped(drained.reaped);
            }
            if let Some(sig) = drained.last_trap_signal {
                return WaitOutcome::TrapExecuted(sig);
            }
            if interruptible && l.int.swap(false, Ordering::SeqCst) {
                return WaitOutcome::Interrupted(SignalNum::new(Signal::SIGINT as i32));
            }
        }
    }

    /// `pselect`-equivalent wait for readiness on `fd`, honoring traps
    /// the same way `wait_for_child` does.
    pub fn wait_for_input(
        &mut self,
        fd: std::os::unix::io::RawFd,
        deadline_ms: Option<u64>,
        traps: &TrapTable,
        mut on_trap: impl FnMut(SignalNum, &str),
    ) -> InputReady {
        use nix::sys::select::{pselect, FdSet};
        use nix::sys::time::TimeSpec;

        let l = latches();
        let deadline = deadline_ms.map(|ms| {
            std::time::Instant::now() + Duration::from_millis(ms)
        });

        loop {
            if l.int.load(Ordering::SeqCst) {
                l.int.store(false, Ordering::SeqCst);
                return InputReady::Interrupted(SignalNum::new(Signal::SIGINT as i32));
            }

            let mut fds = FdSet::new();
            // SAFETY: `fd` is a caller-owned, open descriptor for the
            // duration of this call.
            #[allow(unsafe_code)]
            unsafe {
                fds.insert(std::os::fd::BorrowedFd::borrow_raw(fd));
            }

            let remaining = deadline.map(|d| {
                let now = std::time::Instant::now();
                if now >= d {
                    Duration::ZERO
                } else {
                    d - now
                }
            });
            if let Some(rem) = remaining {
                if rem.is_zero() {
                    return InputReady::Timeout;
                }
            }

            let ts = remaining.map(|r| TimeSpec::from_duration(r));
            let mut unblock = SigSet::empty();
            unblock.add(Signal::SIGCHLD);
            unblock.add(Signal::SIGINT);

            match pselect(None, &mut fds, None, None, ts.as_ref(), &unblock) {
                Ok(n) if n > 0 => {
                    let drain_result = self.drain(traps, &mut on_trap);
                    if drain_result.last_trap_signal.is_some() {
                        continue;
                    }
                    return InputReady::Ready;
                }
                Ok(_) => {
                    self.drain(traps, &mut on_trap);
                    if deadline.is_some() {
                        return InputReady::Timeout;
                    }
                    continue;
                }
                Err(nix::errno::Errno::EINTR) => {
                    self.drain(traps, &mut on_trap);
                    continue;
                }
                Err(_) => return InputReady::Timeout,
            }
        }
    }
}

impl Default for SigState {
    fn default() -> Self {
        Self::new()
    }
}

fn ignore(sig: Signal) -> Result<(), SigError> {
    // SAFETY: `SIG_IGN` is a well-defined disposition; no handler code
    // runs.
    #[allow(unsafe_code)]
    unsafe {
        signal::sigaction(
            sig,
            &signal::SigAction::new(SigHandler::SigIgn, signal::SaFlags::empty(), SigSet::empty()),
        )
    }
    .map(|_| ())
    .map_err(|e| SigError::system("ignore signal", e.into()))
}

fn default(sig: Signal) -> Result<(), SigError> {
    // SAFETY: `SIG_DFL` is a well-defined disposition; no handler code
    // runs.
    #[allow(unsafe_code)]
    unsafe {
        signal::sigaction(
            sig,
            &signal::SigAction::new(SigHandler::SigDfl, signal::SaFlags::empty(), SigSet::empty()),
        )
    }
    .map(|_| ())
    .map_err(|e| SigError::system("reset signal to default", e.into()))
}

fn install_handler(sig: Signal) -> Result<(), SigError> {
    // SAFETY: `shell_handler` only touches `AtomicBool`s behind a
    // process-wide `Arc`, making it async-signal-safe.
    #[allow(unsafe_code)]
    unsafe {
        signal::sigaction(
            sig,
            &signal::SigAction::new(
                SigHandler::Handler(shell_handler),
                signal::SaFlags::SA_RESTART,
                SigSet::empty(),
            ),
        )
    }
    .map(|_| ())
    .map_err(|e| SigError::system("install signal handler", e.into()))
}

fn block(sigs: &[Signal]) -> Result<(), SigError> {
    let mut set = SigSet::empty();
    for s in sigs {
        set.add(*s);
    }
    signal::sigprocmask(signal::SigmaskHow::SIG_BLOCK, Some(&set), None)
        .map_err(|e| SigError::system("block signals", e.into()))
}
