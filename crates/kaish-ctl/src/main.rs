//! `kaish-ctl`: interactive control core of a POSIX shell — signal/trap
//! engine, job control, and line editing. A thin binary: tracing init,
//! config load, then the REPL loop: no OpenTelemetry export or other
//! surface beyond stderr logging is needed here.

mod config;
mod external;
mod keymap;
mod shell;

use std::io::Write;

use anyhow::Context;
use owo_colors::OwoColorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use external::ExternalExecutor;
use shell::Shell;

const PROMPT: &str = "会sh> ";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("kaish_ctl=info".parse().context("invalid default log directive")?),
        )
        .init();

    let config = Config::load().context("failed to load configuration")?;
    tracing::info!(edit_mode = ?config.edit_mode, "starting kaish-ctl");

    let login_shell = std::env::args().next().is_some_and(|a| a.starts_with('-'));
    let mut shell = Shell::new(&config, ExternalExecutor::default(), login_shell)
        .context("failed to initialize shell state")?;

    let mut seq = 1u64;
    loop {
        print!("{}", PROMPT.cyan().bold());
        std::io::stdout().flush().ok();

        match shell.read_line(seq) {
            keymap::Action::Accept(line) => {
                seq += 1;
                match shell.run_line(&line).await {
                    Ok(status) => tracing::debug!(code = status.code(), "command finished"),
                    Err(e) => eprintln!("kaish-ctl: {e}"),
                }
                if let Some(code) = shell.exit_requested {
                    shell.save_history().context("failed to save history")?;
                    std::process::exit(code);
                }
            }
            keymap::Action::Cancel => println!(),
            keymap::Action::Redraw => continue,
            keymap::Action::Eof => break,
            keymap::Action::Continue => continue,
        }
    }

    shell.save_history().context("failed to save history")?;
    Ok(())
}
