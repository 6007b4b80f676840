//! PTY-based integration tests for the interactive REPL.
//!
//! These spawn the real `kaish-ctl` binary in a pseudo-terminal and
//! exercise the pieces of the loop that actually render output to it:
//! command execution, builtins, and Tab-completion's candidate list.
//!
//! Only runs on Unix. Each test gets its own PTY + child process.

#![cfg(unix)]
#![allow(unsafe_code)]

use std::io::{Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd};
use std::process::Command;
use std::time::{Duration, Instant};

use nix::libc;
use nix::pty::openpty;
use nix::sys::termios;

const PROMPT: &str = "会sh> ";

fn kaish_ctl_bin() -> String {
    env!("CARGO_BIN_EXE_kaish-ctl").to_string()
}

/// A PTY-backed `kaish-ctl` session for testing.
struct PtySession {
    master: std::fs::File,
    child: std::process::Child,
}

impl PtySession {
    fn new(dir: &std::path::Path) -> Self {
        let pty = openpty(None, None).expect("openpty failed");

        let mut attrs = termios::tcgetattr(&pty.slave).expect("tcgetattr");
        attrs.local_flags.remove(termios::LocalFlags::ECHO);
        attrs.local_flags.insert(termios::LocalFlags::ISIG);
        termios::tcsetattr(&pty.slave, termios::SetArg::TCSANOW, &attrs).expect("tcsetattr");

        let slave_fd = pty.slave.as_raw_fd();

        // SAFETY: duplicating fds for the child and giving it a fresh
        // session with the PTY as controlling terminal.
        let child = unsafe {
            use std::os::unix::process::CommandExt;
            let mut cmd = Command::new(kaish_ctl_bin());
            cmd.current_dir(dir)
                .env("PATH", std::env::var("PATH").unwrap_or_default())
                .stdin(std::process::Stdio::from_raw_fd(libc::dup(slave_fd)))
                .stdout(std::process::Stdio::from_raw_fd(libc::dup(slave_fd)))
                .stderr(std::process::Stdio::from_raw_fd(libc::dup(slave_fd)));

            cmd.pre_exec(move || {
                libc::setsid();
                libc::ioctl(0, libc::TIOCSCTTY, 0);
                Ok(())
            });

            cmd.spawn().expect("failed to spawn kaish-ctl")
        };

        drop(pty.slave);

        let master_fd = pty.master.as_raw_fd();
        // SAFETY: fcntl with F_GETFL/F_SETFL on a valid fd is safe.
        unsafe {
            let flags = libc::fcntl(master_fd, libc::F_GETFL);
            libc::fcntl(master_fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
        }

        // SAFETY: converting the OwnedFd to a raw fd and wrapping in File.
        let raw_fd = pty.master.into_raw_fd();
        let master = unsafe { std::fs::File::from_raw_fd(raw_fd) };

        let mut session = PtySession { master, child };
        session
            .wait_for(PROMPT, Duration::from_secs(5))
            .expect("never got initial prompt");
        session
    }

    fn send_bytes(&mut self, bytes: &[u8]) {
        self.master.write_all(bytes).expect("write to pty failed");
    }

    fn send_line(&mut self, line: &str) {
        self.send_bytes(line.as_bytes());
        self.send_bytes(b"\n");
    }

    fn read_available(&mut self) -> String {
        let mut buf = [0u8; 4096];
        let mut output = String::new();
        loop {
            match self.master.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => output.push_str(&String::from_utf8_lossy(&buf[..n])),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => panic!("read error: {e}"),
            }
        }
        output
    }

    fn wait_for(&mut self, expected: &str, timeout: Duration) -> Result<String, String> {
        let start = Instant::now();
        let mut accumulated = String::new();

        while start.elapsed() < timeout {
            let chunk = self.read_available();
            if !chunk.is_empty() {
                accumulated.push_str(&chunk);
                if accumulated.contains(expected) {
                    return Ok(accumulated);
                }
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        Err(format!(
            "timeout waiting for {expected:?} in output:\n---\n{accumulated}\n---"
        ))
    }

    fn run_command(&mut self, cmd: &str) -> String {
        self.send_line(cmd);
        match self.wait_for(PROMPT, Duration::from_secs(5)) {
            Ok(output) => output,
            Err(e) => panic!("command {cmd:?} failed: {e}"),
        }
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        let _ = write!(self.master, "exit\n");
        std::thread::sleep(Duration::from_millis(100));
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn prompt_appears_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let _session = PtySession::new(dir.path());
}

#[test]
fn echoed_command_runs_through_the_real_executor() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = PtySession::new(dir.path());
    let output = session.run_command("echo hello-from-kaish-ctl");
    assert!(
        output.contains("hello-from-kaish-ctl"),
        "expected command output, got:\n{output}"
    );
}

#[test]
fn jobs_builtin_reports_no_jobs_initially() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = PtySession::new(dir.path());
    let output = session.run_command("jobs");
    assert!(
        output.contains("no jobs"),
        "expected 'no jobs', got:\n{output}"
    );
}

#[test]
fn tab_completion_lists_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("alpha1"), "").unwrap();
    std::fs::write(dir.path().join("alpha2"), "").unwrap();
    std::fs::write(dir.path().join("beta"), "").unwrap();

    let mut session = PtySession::new(dir.path());
    session.send_bytes(b"cat al");
    session.send_bytes(&[0x09]); // Tab

    let output = session
        .wait_for("alpha2", Duration::from_secs(3))
        .expect("completion candidates never printed");
    assert!(
        output.contains("alpha1") && output.contains("alpha2"),
        "expected both alpha1 and alpha2 listed, got:\n{output}"
    );
}
